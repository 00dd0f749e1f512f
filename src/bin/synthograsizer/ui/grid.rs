//! Grid widget - one row per note or drum, one column per step

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use synthograsizer::{
    sequencing::{note_to_frequency, GridKind},
    voices::DrumType,
    Engine,
};

use super::Cursor;

const LABEL_WIDTH: usize = 8;

pub fn render_grid(frame: &mut Frame, area: Rect, engine: &Engine, kind: GridKind, cursor: &Cursor) {
    let (grid, title) = match kind {
        GridKind::Melody => (engine.melody(), " Melody "),
        GridKind::Drum => (engine.drums(), " Drums "),
    };
    let focused = cursor.grid == kind;
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if focused { Color::Cyan } else { Color::DarkGray }));

    let playhead = engine.is_playing().then(|| engine.current_step());
    let config = engine.config();

    // Highest note on top
    let rows: Vec<usize> = match kind {
        GridKind::Melody => (0..grid.rows()).rev().collect(),
        GridKind::Drum => (0..grid.rows()).collect(),
    };

    let lines: Vec<Line> = rows
        .into_iter()
        .map(|row| {
            let label = match kind {
                GridKind::Melody => {
                    let hz = note_to_frequency(row as i32, config.scale, config.key, config.transpose);
                    format!("{hz:>6.0}Hz")
                }
                GridKind::Drum => DrumType::from_row(row).map(DrumType::name).unwrap_or("?").to_string(),
            };
            let mut spans = vec![Span::styled(
                format!("{label:<width$.width$} ", width = LABEL_WIDTH),
                Style::default().fg(Color::DarkGray),
            )];

            for step in 0..grid.steps() {
                let active = grid.get(row, step);
                let mut style = Style::default().fg(if active { Color::Green } else { Color::DarkGray });
                if playhead == Some(step) {
                    style = style.bg(Color::Rgb(40, 40, 60));
                }
                if focused && cursor.row == row && cursor.step == step {
                    style = style.add_modifier(Modifier::REVERSED);
                }
                let glyph = if active { "■" } else if step % 4 == 0 { "┆" } else { "·" };
                spans.push(Span::styled(format!("{glyph} "), style));
            }
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
