//! TUI for synthograsizer
//!
//! The engine lives here, on the UI thread, and is polled once per frame.

mod grid;
mod spectrum;
mod transport;

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    DefaultTerminal, Frame,
};
use std::time::Duration;

use synthograsizer::{
    engine::Effect,
    recovery,
    sequencing::{GridKind, MELODY_ROWS},
    voices::DRUM_TYPES,
    Engine,
};

use grid::render_grid;
use spectrum::render_spectrum;
use transport::render_transport;

const BPM_STEP: f32 = 5.0;

/// Where the cursor is and which grid it edits
#[derive(Debug, Clone, Copy)]
pub struct Cursor {
    pub grid: GridKind,
    pub row: usize,
    pub step: usize,
}

pub struct UiApp {
    engine: Engine,
    sample_rate: f32,
    cursor: Cursor,
    /// Last saved pattern, target of the chain key
    last_saved: Option<usize>,
    /// One-line feedback for the help bar
    status: Option<String>,
    spectrum: Vec<u8>,
    should_quit: bool,
}

impl UiApp {
    pub fn new(engine: Engine, sample_rate: f32) -> Self {
        Self {
            engine,
            sample_rate,
            cursor: Cursor {
                grid: GridKind::Melody,
                row: 0,
                step: 0,
            },
            last_saved: None,
            status: None,
            spectrum: Vec::new(),
            should_quit: false,
        }
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.engine.poll();
            self.spectrum = self.engine.frequency_data();
            if let Some(notice) = recovery::drain().pop() {
                self.status = Some(notice);
            }

            terminal.draw(|frame| self.render(frame))?;

            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyCode) {
        self.status = None;
        let engine = &mut self.engine;

        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char(' ') => {
                if engine.is_playing() {
                    engine.stop();
                } else {
                    engine.play();
                }
            }
            KeyCode::Up => self.cursor.row = self.cursor.row.saturating_sub(1),
            KeyCode::Down => self.cursor.row = (self.cursor.row + 1).min(self.rows() - 1),
            KeyCode::Left => self.cursor.step = self.cursor.step.saturating_sub(1),
            KeyCode::Right => {
                self.cursor.step = (self.cursor.step + 1).min(engine.pattern_length() - 1);
            }
            KeyCode::Tab => {
                self.cursor.grid = match self.cursor.grid {
                    GridKind::Melody => GridKind::Drum,
                    GridKind::Drum => GridKind::Melody,
                };
                self.cursor.row = self.cursor.row.min(self.rows() - 1);
            }
            KeyCode::Enter => {
                let Cursor { grid, row, step } = self.cursor;
                if let Err(err) = engine.toggle_cell(grid, row, step) {
                    self.status = Some(err.to_string());
                }
            }
            KeyCode::Char('s') => match engine.save_sequence() {
                Ok(index) => {
                    self.last_saved = Some(index);
                    self.status = Some(format!("saved pattern {}", index + 1));
                }
                Err(err) => self.status = Some(err.to_string()),
            },
            KeyCode::Char(c @ '1'..='8') => {
                let index = c as usize - '1' as usize;
                self.status = Some(match engine.load_sequence(index) {
                    Ok(()) => format!("loaded pattern {}", index + 1),
                    Err(err) => err.to_string(),
                });
                self.cursor.step = self.cursor.step.min(self.engine.pattern_length() - 1);
            }
            KeyCode::Char('c') => {
                self.status = Some(match self.last_saved {
                    Some(index) => match engine.add_to_chain(index) {
                        Ok(()) => format!("chained pattern {}", index + 1),
                        Err(err) => err.to_string(),
                    },
                    None => "save a pattern first".to_string(),
                });
            }
            KeyCode::Char('x') => engine.clear_chain(),
            KeyCode::Char('r') => engine.randomize(),
            KeyCode::Char('v') => engine.variation(),
            KeyCode::Char('k') => engine.update_config(|config| config.drum_kit = config.drum_kit.next()),
            KeyCode::Char('f') => {
                engine.update_config(|config| config.synthesis.fm.enabled = !config.synthesis.fm.enabled);
            }
            KeyCode::Char('d') => toggle_effect(engine, Effect::Delay),
            KeyCode::Char('t') => toggle_effect(engine, Effect::Distortion),
            KeyCode::Char('e') => toggle_effect(engine, Effect::Reverb),
            KeyCode::Char('+') | KeyCode::Char('=') => {
                let bpm = engine.config().bpm + BPM_STEP;
                engine.set_bpm(bpm.min(300.0));
            }
            KeyCode::Char('-') => {
                let bpm = engine.config().bpm - BPM_STEP;
                engine.set_bpm(bpm.max(20.0));
            }
            _ => {}
        }
    }

    fn rows(&self) -> usize {
        self.cursor.grid.rows()
    }

    fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(MELODY_ROWS as u16 + 2),
                Constraint::Length(DRUM_TYPES as u16 + 2),
                Constraint::Min(6),
                Constraint::Length(1),
            ])
            .split(frame.area());

        render_transport(frame, chunks[0], &self.engine, self.sample_rate);
        render_grid(frame, chunks[1], &self.engine, GridKind::Melody, &self.cursor);
        render_grid(frame, chunks[2], &self.engine, GridKind::Drum, &self.cursor);
        render_spectrum(frame, chunks[3], &self.spectrum);

        let help = self.status.clone().unwrap_or_else(|| {
            " [Space] Play/Stop  [Enter] Toggle  [Tab] Grid  [S] Save  [1-8] Load  [C] Chain  [X] Clear chain  \
             [R] Random  [V] Vary  [K] Kit  [F] FM  [D/T/E] Delay/Dist/Reverb  [+/-] BPM  [Q] Quit"
                .to_string()
        });
        let help = Paragraph::new(help).style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[4]);
    }
}

fn toggle_effect(engine: &mut Engine, effect: Effect) {
    let effects = &engine.config().effects;
    let enabled = match effect {
        Effect::Delay => effects.delay.enabled,
        Effect::Distortion => effects.distortion.enabled,
        Effect::Reverb => effects.reverb.enabled,
    };
    engine.set_effect_enabled(effect, !enabled);
}
