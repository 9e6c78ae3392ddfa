use std::io::Stdout;

use anyhow::Result;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame, Terminal,
};

use crate::hearts::{Heart, HeartField};
use crate::message::MessageState;

const SPINNER: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

struct Ink {
    title: Color,
    accent: Color,
    body: Color,
    border: Color,
    stars: Color,
    dim: Color,
}

fn ink(mono: bool) -> Ink {
    if mono {
        Ink {
            title: Color::White,
            accent: Color::White,
            body: Color::Gray,
            border: Color::Gray,
            stars: Color::White,
            dim: Color::DarkGray,
        }
    } else {
        Ink {
            title: Color::Rgb(225, 29, 72),
            accent: Color::Rgb(244, 63, 94),
            body: Color::Rgb(190, 18, 60),
            border: Color::Rgb(253, 164, 175),
            stars: Color::Rgb(251, 191, 36),
            dim: Color::Rgb(251, 113, 133),
        }
    }
}

pub fn draw_frame(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    field: &HeartField,
    message: &MessageState,
    spin: usize,
    mono: bool,
) -> Result<()> {
    terminal.draw(|f| {
        let area = f.size();
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(2)])
            .split(area);

        render_hearts(f, area, field, mono);
        render_card(f, rows[0], message, spin, mono);
        render_footer(f, rows[1], mono);
    })?;
    Ok(())
}

fn heart_glyph(size: f32) -> char {
    if size < 23.0 {
        '♡'
    } else if size < 32.0 {
        '♥'
    } else {
        '❤'
    }
}

/// Paint every on-screen heart straight into the frame buffer. The card and
/// footer draw over this layer afterwards.
fn render_hearts(f: &mut Frame, area: Rect, field: &HeartField, mono: bool) {
    if area.width == 0 || area.height == 0 {
        return;
    }
    let buf = f.buffer_mut();
    for heart in field.hearts() {
        let Some(alt) = field.altitude(heart) else {
            continue;
        };
        if !(0.0..=100.0).contains(&alt) {
            continue;
        }
        let col = area.x + ((heart.x / 100.0) * (area.width - 1) as f32) as u16;
        let row = area.y + ((alt / 100.0) * (area.height - 1) as f32) as u16;
        let fg = heart_color(heart, mono);
        buf.get_mut(col, row).set_char(heart_glyph(heart.size)).set_fg(fg);
    }
}

fn heart_color(heart: &Heart, mono: bool) -> Color {
    if mono {
        Color::Gray
    } else {
        Color::Rgb(heart.color.r, heart.color.g, heart.color.b)
    }
}

fn render_card(f: &mut Frame, area: Rect, message: &MessageState, spin: usize, mono: bool) {
    let ink = ink(mono);

    let mut lines = vec![
        Line::from(Span::styled("❤", Style::default().fg(ink.title))),
        Line::from(""),
        Line::from(Span::styled(
            "Flavia,",
            Style::default().fg(ink.title).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "eu te amo",
            Style::default().fg(ink.accent).add_modifier(Modifier::ITALIC),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Este espaço foi criado para celebrar o amor que sinto por você. \
Cada coração flutuante representa um momento feliz ao seu lado.",
            Style::default().fg(ink.body),
        )),
        Line::from(""),
    ];

    if message.is_loading {
        let frame_ch = SPINNER[spin % SPINNER.len()];
        lines.push(Line::from(Span::styled(
            format!("{frame_ch} Inspirando-se..."),
            Style::default().fg(ink.accent),
        )));
    } else {
        lines.push(Line::from(vec![
            Span::styled("m ", Style::default().fg(ink.title).add_modifier(Modifier::BOLD)),
            Span::styled("Mensagem para Você", Style::default().fg(ink.accent)),
        ]));
    }

    if message.is_visible {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("“{}”", message.text),
            Style::default().fg(ink.body).add_modifier(Modifier::ITALIC),
        )));
        lines.push(Line::from(Span::styled(
            "✶ ✶ ✶",
            Style::default().fg(ink.stars),
        )));
    }

    let width = area.width.saturating_sub(4).min(52).max(20);
    // Rough wrapped-line count at the card's inner width, plus borders.
    let inner = width.saturating_sub(2).max(1) as usize;
    let height: u16 = lines
        .iter()
        .map(|l| (l.width().max(1) + inner - 1) / inner)
        .sum::<usize>() as u16
        + 2;
    let card = centered_rect(area, width, height.min(area.height));

    f.render_widget(Clear, card);
    let p = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(ink.border)),
        );
    f.render_widget(p, card);
}

fn render_footer(f: &mut Frame, area: Rect, mono: bool) {
    let ink = ink(mono);
    let lines = vec![
        Line::from(Span::styled(
            "PARA SEMPRE, FLAVIA",
            Style::default().fg(ink.dim).add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled("q", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" sair   "),
            Span::styled("m", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" mensagem"),
        ]),
    ];
    let p = Paragraph::new(lines).alignment(Alignment::Center);
    f.render_widget(p, area);
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
