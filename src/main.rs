mod hearts;
mod logger;
mod message;
mod ui;

use std::io::{self, Stdout};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{
        self, BeginSynchronizedUpdate, DisableLineWrap, EnableLineWrap, EndSynchronizedUpdate,
        EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;

use hearts::{HeartField, SPAWN_INTERVAL_MS};
use message::{MessageState, NoteClient, DEFAULT_MODEL, GEMINI_BASE_URL};

const DT_CLAMP: f32 = 0.05;

#[derive(Parser, Debug, Clone)]
#[command(name = "heartfall")]
#[command(about = "Floating hearts and an AI love note, in the terminal")]
struct Cli {
    /// Generative-language API key (falls back to the API_KEY environment
    /// variable; with no key the call fails and a fallback note is shown)
    #[arg(long)]
    api_key: Option<String>,

    /// Text-generation model id
    #[arg(long, default_value = DEFAULT_MODEL)]
    model: String,

    /// Seed for the heart animation (random when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Force monochrome (no colors)
    #[arg(long, default_value_t = false)]
    mono: bool,

    /// Append diagnostics to this file (logging disabled when omitted)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

enum Cmd {
    SpawnHeart,
    Note(String),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.log_file {
        logger::init(path)?;
    }

    let api_key = cli
        .api_key
        .clone()
        .or_else(|| std::env::var("API_KEY").ok())
        .unwrap_or_default();
    let client = NoteClient::new(GEMINI_BASE_URL, api_key, cli.model.clone());

    let seed = cli.seed.unwrap_or_else(rand::random);
    let mut field = HeartField::new(seed);
    let mut note = MessageState::default();

    let (tx, mut rx) = mpsc::channel::<Cmd>(64);
    let ticker = spawn_heart_ticker(tx.clone(), Duration::from_millis(SPAWN_INTERVAL_MS));

    let mut terminal = setup_terminal()?;
    let started = Instant::now();
    let mut last = Instant::now();

    loop {
        // Drain timer ticks and settled notes from the background tasks.
        while let Ok(cmd) = rx.try_recv() {
            match cmd {
                Cmd::SpawnHeart => field.tick(),
                Cmd::Note(text) => note.settle(text),
            }
        }

        let now = Instant::now();
        let dt = (now - last).as_secs_f32().min(DT_CLAMP);
        last = now;
        field.advance(dt);

        let spin = (started.elapsed().as_millis() / 100) as usize;
        ui::draw_frame(&mut terminal, &field, &note, spin, cli.mono)?;

        if event::poll(Duration::from_millis(33))? {
            if let Event::Key(k) = event::read()? {
                if k.kind == KeyEventKind::Press {
                    match k.code {
                        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => break,
                        KeyCode::Char('m') | KeyCode::Char('M') | KeyCode::Enter => {
                            // No-op while a request is already in flight.
                            if note.start() {
                                let client = client.clone();
                                let tx = tx.clone();
                                tokio::spawn(async move {
                                    let text = client.request_note().await;
                                    // If we quit mid-request the receiver is
                                    // gone and the late note is dropped.
                                    tx.send(Cmd::Note(text)).await.ok();
                                });
                            }
                        }
                        _ => {}
                    }
                }
            }
        }
    }

    // Stop the spawn timer before the terminal goes back to normal.
    ticker.abort();
    restore_terminal(&mut terminal)?;
    Ok(())
}

fn spawn_heart_ticker(tx: mpsc::Sender<Cmd>, every: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut t = tokio::time::interval(every);
        t.tick().await; // interval yields immediately once; skip that
        loop {
            t.tick().await;
            if tx.send(Cmd::SpawnHeart).await.is_err() {
                break;
            }
        }
    })
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    terminal::enable_raw_mode()?;
    let mut out = io::stdout();
    execute!(out, EnterAlternateScreen, DisableLineWrap, cursor::Hide)?;
    let backend = CrosstermBackend::new(out);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;
    Ok(terminal)
}

fn restore_terminal(term: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    let mut out = io::stdout();
    execute!(
        out,
        BeginSynchronizedUpdate,
        cursor::Show,
        EnableLineWrap,
        LeaveAlternateScreen,
        EndSynchronizedUpdate
    )?;
    terminal::disable_raw_mode()?;
    term.show_cursor()?;
    Ok(())
}
