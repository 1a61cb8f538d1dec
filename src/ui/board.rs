use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Widget},
};

use matrix_recall::{snapshot::Snapshot, CellMark};

use super::{ACCENT, WARN};

const GAP: u16 = 1;
const MAX_CELL_HEIGHT: u16 = 5;
const IDLE: Color = Color::Rgb(55, 47, 45);

/// The tile grid, sized to fit the area and centered in it
pub struct Board<'a> {
    pub snapshot: &'a Snapshot,
    /// Highlighted cell, only while picks are accepted
    pub cursor: Option<usize>,
}

impl Widget for Board<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let grid = self.snapshot.grid;
        let (rows, cols) = (grid.rows as u16, grid.cols as u16);

        let max_w = area.width.saturating_sub(GAP * (cols - 1)) / cols;
        let max_h = area.height.saturating_sub(GAP * (rows - 1)) / rows;
        // terminal cells are roughly twice as tall as wide
        let cell_h = max_h.min(max_w / 2).min(MAX_CELL_HEIGHT);
        if cell_h == 0 {
            Paragraph::new("terminal too small")
                .alignment(Alignment::Center)
                .render(area, buf);
            return;
        }
        let cell_w = cell_h * 2;

        let total_w = cols * cell_w + GAP * (cols - 1);
        let total_h = rows * cell_h + GAP * (rows - 1);
        let left = area.x + (area.width - total_w) / 2;
        let top = area.y + (area.height - total_h) / 2;

        for (index, cell) in self.snapshot.cells.iter().enumerate() {
            let Some((row, col)) = grid.position(index) else {
                continue;
            };
            let rect = Rect::new(
                left + col as u16 * (cell_w + GAP),
                top + row as u16 * (cell_h + GAP),
                cell_w,
                cell_h,
            );
            render_cell(cell.mark, self.cursor == Some(index), rect, buf);
        }
    }
}

fn render_cell(mark: CellMark, under_cursor: bool, rect: Rect, buf: &mut Buffer) {
    let fill = match mark {
        CellMark::Idle => IDLE,
        CellMark::Shown | CellMark::Correct => ACCENT,
        CellMark::Incorrect => WARN,
    };
    buf.set_style(rect, Style::default().bg(fill));

    if under_cursor && rect.height >= 2 {
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Thick)
            .border_style(Style::default().fg(Color::Yellow).bg(fill))
            .render(rect, buf);
    } else if under_cursor {
        buf.set_style(rect, Style::default().bg(Color::Yellow));
    }

    if mark == CellMark::Incorrect {
        let mid = Rect::new(rect.x, rect.y + rect.height / 2, rect.width, 1);
        Paragraph::new("×")
            .style(
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )
            .alignment(Alignment::Center)
            .render(mid, buf);
    }
}

/// Countdown bubble drawn over the board before each trial
pub fn countdown(value: u32) -> Countdown {
    Countdown { value }
}

pub struct Countdown {
    value: u32,
}

impl Widget for Countdown {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let text = if self.value > 0 {
            self.value.to_string()
        } else {
            String::from("Go!")
        };

        let width = 9.min(area.width);
        let height = 3.min(area.height);
        let rect = Rect::new(
            area.x + (area.width - width) / 2,
            area.y + (area.height - height) / 2,
            width,
            height,
        );

        Clear.render(rect, buf);
        Paragraph::new(text)
            .alignment(Alignment::Center)
            .style(
                Style::default()
                    .fg(Color::White)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .block(Block::default().borders(Borders::ALL))
            .render(rect, buf);
    }
}
