use itertools::Itertools;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};

use matrix_recall::Stage;

use super::{ACCENT, WARN};

const RULES: [&str; 6] = [
    "Earn 250 points for every correct tile.",
    "Get a perfect round for a bonus of 100 extra points per tile.",
    "No mistakes: 1 more tile in the next trial, and the grid may grow.",
    "1 mistake: the number of tiles stays the same.",
    "2+ mistakes: 1 fewer tile in the next trial, and the grid may shrink.",
    "A new game starts with 3 fewer tiles than your last game's final trial.",
];

/// Centered rectangle wide enough for `lines`, clipped to `area`
fn centered(area: Rect, lines: &[Line], padding: u16) -> Rect {
    let widest = lines.iter().map(Line::width).max().unwrap_or(0) as u16;
    let width = (widest + padding * 2 + 2).min(area.width);
    let height = (lines.len() as u16 + 2).min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

fn panel(lines: Vec<Line<'static>>, title: &str, area: Rect, buf: &mut Buffer) {
    let rect = centered(area, &lines, 2);
    Clear.render(rect, buf);
    Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title.to_string())
                .title_alignment(Alignment::Center),
        )
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(rect, buf);
}

/// How-to-play screen, before a game or over a paused one
pub struct Instructions {
    pub in_session: bool,
}

impl Widget for Instructions {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let bold = Style::default().add_modifier(Modifier::BOLD);

        let mut lines = vec![
            Line::from(Span::styled("Memory Matrix Instructions", bold.fg(ACCENT))),
            Line::from(""),
            Line::from("A pattern of tiles will flash on the grid."),
            Line::from("Remember it, then pick the same tiles."),
            Line::from(""),
        ];
        lines.extend(RULES.iter().map(|rule| Line::from(format!("• {rule}"))));
        lines.push(Line::from(""));
        lines.push(if self.in_session {
            Line::from(Span::styled("(b)ack to game", bold.fg(ACCENT)))
        } else {
            Line::from(Span::styled("(s)tart game   (q)uit", bold.fg(WARN)))
        });

        panel(lines, "How To Play", area, buf);
    }
}

pub struct PauseMenu {
    pub sound: bool,
}

impl Widget for PauseMenu {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let item = Style::default().fg(ACCENT);
        let highlighted = Style::default().fg(Color::White).bg(ACCENT);

        let lines = vec![
            Line::from(Span::styled(
                "Paused",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled("(r) Resume", item)),
            Line::from(Span::styled("(n) Restart", item)),
            if self.sound {
                Line::from(Span::styled("(m) Mute Sound", item))
            } else {
                Line::from(Span::styled("(m) Unmute Sound", highlighted))
            },
            Line::from(Span::styled("(q) Quit", item)),
            Line::from(Span::styled("(?) How To Play", item)),
        ];

        panel(lines, "Menu", area, buf);
    }
}

pub struct Finished {
    pub score: u32,
    pub trials: u32,
}

impl Widget for Finished {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let lines = vec![
            Line::from(Span::styled(
                "Game Complete!",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(format!("Your final score is: {}", self.score)),
            Line::from(Span::styled(
                format!("{} trials played", self.trials),
                Style::default().fg(Color::Gray),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "(s) Play Again   (q)uit",
                Style::default().fg(WARN).add_modifier(Modifier::BOLD),
            )),
        ];

        panel(lines, "Results", area, buf);
    }
}

/// Key hints for the running stages
pub fn controls(stage: Stage) -> Paragraph<'static> {
    let keys: &[(&str, &str)] = match stage {
        Stage::Waiting => &[
            ("←↓↑→/hjkl", "move"),
            ("enter/space", "pick"),
            ("p", "pause"),
            ("esc", "quit"),
        ],
        _ => &[("p", "pause"), ("esc", "quit")],
    };

    let text = keys.iter().map(|(k, v)| format!("({k}) {v}")).join("  ");

    Paragraph::new(Span::styled(
        text,
        Style::default()
            .fg(Color::Gray)
            .add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center)
}
