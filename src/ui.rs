pub mod board;
pub mod menus;

use std::time::Duration;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{LineGauge, Paragraph, Widget},
};

use matrix_recall::{snapshot::Snapshot, Phase, Stage};

use crate::App;

const HORIZONTAL_MARGIN: u16 = 2;
const VERTICAL_MARGIN: u16 = 1;

pub const ACCENT: Color = Color::Rgb(0, 191, 255);
pub const WARN: Color = Color::Rgb(249, 115, 22);

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let snapshot = self.game.snapshot();

        match snapshot.phase {
            Phase::Instructions => {
                menus::Instructions { in_session: false }.render(area, buf);
            }
            Phase::Paused { help: true, .. } => {
                menus::Instructions { in_session: true }.render(area, buf);
            }
            Phase::Paused { help: false, .. } => {
                let chunks = frame_layout(area);
                header(&snapshot).render(chunks[0], buf);
                menus::PauseMenu { sound: self.sound }.render(chunks[1], buf);
            }
            Phase::Finished => {
                menus::Finished {
                    score: snapshot.score,
                    trials: snapshot.total_trials,
                }
                .render(area, buf);
            }
            Phase::Running(stage) => {
                let chunks = frame_layout(area);
                header(&snapshot).render(chunks[0], buf);

                let cursor = (stage == Stage::Waiting).then(|| self.cursor_index());
                board::Board {
                    snapshot: &snapshot,
                    cursor,
                }
                .render(chunks[1], buf);

                if stage == Stage::GetReady {
                    board::countdown(snapshot.countdown).render(chunks[1], buf);
                }

                match snapshot.display_left {
                    Some(left) => {
                        display_bar(left, self.game.settings().timing.display).render(chunks[2], buf)
                    }
                    None => status_line(self, &snapshot, stage).render(chunks[2], buf),
                }
                menus::controls(stage).render(chunks[3], buf);
            }
        }
    }
}

fn frame_layout(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1), // header
            Constraint::Min(3),    // board
            Constraint::Length(1), // status
            Constraint::Length(1), // controls
        ])
        .split(area)
}

fn header(snapshot: &Snapshot) -> Paragraph<'static> {
    let label = Style::default().fg(Color::Gray);
    let value = Style::default().add_modifier(Modifier::BOLD);

    Paragraph::new(Line::from(vec![
        Span::styled("TILES ", label),
        Span::styled(snapshot.target_size.to_string(), value),
        Span::raw("   "),
        Span::styled("TRIAL ", label),
        Span::styled(
            format!("{} of {}", snapshot.trial_number, snapshot.total_trials),
            value,
        ),
        Span::raw("   "),
        Span::styled("SCORE ", label),
        Span::styled(snapshot.score.to_string(), value),
    ]))
    .alignment(Alignment::Center)
}

/// Shrinking bar for the time left to memorize the pattern
fn display_bar(left: Duration, total: Duration) -> LineGauge<'static> {
    let ratio = if total.is_zero() {
        0.0
    } else {
        (left.as_secs_f64() / total.as_secs_f64()).clamp(0.0, 1.0)
    };

    LineGauge::default()
        .label(Span::styled(
            "Memorize...",
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        ))
        .filled_style(Style::default().fg(ACCENT))
        .unfilled_style(Style::default().fg(Color::DarkGray))
        .ratio(ratio)
}

fn status_line(app: &App, snapshot: &Snapshot, stage: Stage) -> Paragraph<'static> {
    let text = match stage {
        Stage::GetReady => String::from("Get ready"),
        Stage::Showing => String::from("Memorize..."),
        Stage::Waiting if snapshot.remaining_picks > 0 => format!(
            "You have {} tile{} left to find.",
            snapshot.remaining_picks,
            if snapshot.remaining_picks > 1 { "s" } else { "" }
        ),
        Stage::Waiting => String::new(),
        Stage::Feedback => {
            let trial = app.game.current_trial();
            let points = trial.and_then(|t| t.score).unwrap_or_default();
            let perfect = trial.is_some_and(|t| {
                app.game
                    .settings()
                    .scoring
                    .is_perfect(t.correct.len(), t.mistakes(), t.target_size)
            });
            if perfect {
                format!("Perfect! +{points}")
            } else {
                format!("+{points}")
            }
        }
    };

    let style = match stage {
        Stage::Showing => Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        Stage::Feedback => Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        _ => Style::default().fg(Color::Gray),
    };

    Paragraph::new(Span::styled(text, style)).alignment(Alignment::Center)
}
