pub mod arpeggiator;
pub mod grid;
pub mod pattern;
pub mod scale;

pub use arpeggiator::ArpPattern;
pub use grid::{Grid, GridKind, DEFAULT_STEPS, DRUM_ROWS, MELODY_ROWS};
pub use pattern::{PatternSnapshot, PatternStore, MAX_SAVED_PATTERNS};
pub use scale::{note_to_frequency, Key, Scale};
