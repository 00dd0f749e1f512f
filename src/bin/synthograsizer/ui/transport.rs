//! Transport bar widget - tempo, play state, step, kit and effect switches

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use synthograsizer::Engine;

pub fn render_transport(frame: &mut Frame, area: Rect, engine: &Engine, sample_rate: f32) {
    let block = Block::default().title(" synthograsizer ").borders(Borders::ALL);
    let config = engine.config();
    let playing = engine.is_playing();

    let switch = |name: &'static str, on: bool| {
        Span::styled(
            format!("{name} "),
            Style::default().fg(if on { Color::Magenta } else { Color::DarkGray }),
        )
    };

    let chain = engine.chain();
    let chain = if chain.is_empty() {
        "-".to_string()
    } else {
        chain.iter().map(|i| (i + 1).to_string()).collect::<Vec<_>>().join(">")
    };

    let line = Line::from(vec![
        Span::styled(format!(" BPM: {:.0}  ", config.bpm), Style::default().fg(Color::Cyan)),
        Span::styled(
            if playing { "▶ Playing  " } else { "■ Stopped  " },
            Style::default().fg(if playing { Color::Green } else { Color::Yellow }),
        ),
        Span::styled(
            format!("Step {:>2}/{}  ", engine.current_step() + 1, engine.pattern_length()),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            format!("{} {}  Kit: {}  ", config.key.name(), config.scale.name(), config.drum_kit.name()),
            Style::default().fg(Color::White),
        ),
        switch("FM", config.synthesis.fm.enabled),
        switch("Delay", config.effects.delay.enabled),
        switch("Dist", config.effects.distortion.enabled),
        switch("Reverb", config.effects.reverb.enabled),
        Span::styled(
            format!(" Saved: {}/8  Chain: {chain}  ", engine.saved_patterns().len()),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(format!("{:.1}kHz", sample_rate / 1000.0), Style::default().fg(Color::DarkGray)),
    ]);

    frame.render_widget(Paragraph::new(line).block(block), area);
}
