//! Spectrum widget
//!
//! Draws the engine's byte-scaled frequency data as bars, log-spaced so the
//! low end gets most of the width.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, Sparkline},
    Frame,
};

/// Lowest bin shown; bin 0 is DC
const FIRST_BIN: f64 = 1.0;

pub fn render_spectrum(frame: &mut Frame, area: Rect, bins: &[u8]) {
    let block = Block::default().title(" Spectrum ").borders(Borders::ALL);
    let width = block.inner(area).width as usize;
    let bars = log_spaced(bins, width);

    let sparkline = Sparkline::default()
        .block(block)
        .data(&bars)
        .max(u8::MAX as u64)
        .style(Style::default().fg(Color::Green));
    frame.render_widget(sparkline, area);
}

/// Peak of each log-spaced band, one band per column.
fn log_spaced(bins: &[u8], columns: usize) -> Vec<u64> {
    if bins.len() < 2 || columns == 0 {
        return vec![0; columns];
    }
    let ratio = bins.len() as f64 / FIRST_BIN;
    (0..columns)
        .map(|col| {
            let lo = (FIRST_BIN * ratio.powf(col as f64 / columns as f64)) as usize;
            let hi = (FIRST_BIN * ratio.powf((col + 1) as f64 / columns as f64)) as usize;
            let hi = hi.clamp(lo + 1, bins.len());
            bins[lo.min(bins.len() - 1)..hi].iter().copied().max().unwrap_or(0) as u64
        })
        .collect()
}
