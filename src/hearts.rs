use rand::{rngs::StdRng, Rng, SeedableRng};

/// One heart spawns per timer tick.
pub const SPAWN_INTERVAL_MS: u64 = 400;

// Keep the last 40 hearts, then append one; the live set never exceeds 41.
const KEEP_LAST: usize = 40;

// Hearts start below the bottom edge and drift past the top.
const START_Y: f32 = 110.0;
const EXIT_Y: f32 = -10.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

pub const PALETTE: [Rgb; 5] = [
    Rgb { r: 255, g: 77, b: 77 },   // #ff4d4d
    Rgb { r: 255, g: 0, b: 102 },   // #ff0066
    Rgb { r: 255, g: 133, b: 162 }, // #ff85a2
    Rgb { r: 255, g: 204, b: 213 }, // #ffccd5
    Rgb { r: 255, g: 77, b: 109 },  // #ff4d6d
];

/// A single floating heart. Fields are fixed at spawn; only membership in
/// the field changes afterwards.
#[derive(Clone, Debug)]
pub struct Heart {
    pub id: u64,
    pub x: f32,        // percent of viewport width, 0..100
    pub y: f32,        // percent start offset, always START_Y
    pub size: f32,     // 15..40
    pub duration: f32, // seconds to cross the viewport, 5..15
    pub delay: f32,    // seconds before it starts moving, 0..2
    pub color: Rgb,
    pub born: f32, // field clock at spawn; anchors the float-up animation
}

pub struct HeartField {
    rng: StdRng,
    next_id: u64,
    t: f32,
    hearts: Vec<Heart>,
}

impl HeartField {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            next_id: 0,
            t: 0.0,
            hearts: Vec::new(),
        }
    }

    /// Spawn one heart, evicting the oldest beyond the window first.
    pub fn tick(&mut self) {
        if self.hearts.len() > KEEP_LAST {
            let cut = self.hearts.len() - KEEP_LAST;
            self.hearts.drain(..cut);
        }
        let heart = Heart {
            id: self.next_id,
            x: self.rng.gen::<f32>() * 100.0,
            y: START_Y,
            size: 15.0 + self.rng.gen::<f32>() * 25.0,
            duration: 5.0 + self.rng.gen::<f32>() * 10.0,
            delay: self.rng.gen::<f32>() * 2.0,
            color: PALETTE[self.rng.gen_range(0..PALETTE.len())],
            born: self.t,
        };
        self.next_id += 1;
        self.hearts.push(heart);
    }

    /// Advance the field clock. Only rendering cares; tick() does not.
    pub fn advance(&mut self, dt: f32) {
        self.t += dt;
    }

    pub fn hearts(&self) -> &[Heart] {
        &self.hearts
    }

    pub fn len(&self) -> usize {
        self.hearts.len()
    }

    /// Current vertical percent for a heart, or None while it is still
    /// waiting out its delay or has already drifted off the top.
    pub fn altitude(&self, heart: &Heart) -> Option<f32> {
        let run = self.t - heart.born - heart.delay;
        if run < 0.0 {
            return None;
        }
        let p = run / heart.duration;
        if p >= 1.0 {
            return None;
        }
        Some(heart.y + (EXIT_Y - heart.y) * p)
    }
}
