use thiserror::Error;

use crate::sequencing::grid::GridKind;

/// Errors surfaced to the caller. Everything else is a logged recovery.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Maximum number of saved sequences reached ({max}). Please delete one to save a new sequence.")]
    PatternLimit { max: usize },

    #[error("no saved pattern at index {index} ({saved} saved)")]
    UnknownPattern { index: usize, saved: usize },

    #[error("pattern length must be at least 1 step, got {0}")]
    InvalidLength(usize),

    #[error("{kind:?} grid has no cell at row {row}, step {step}")]
    CellOutOfRange {
        kind: GridKind,
        row: usize,
        step: usize,
    },

    #[error("quantize value must divide 16 (1, 2, 4, 8 or 16), got {0}")]
    InvalidQuantize(usize),

    #[cfg(feature = "serde")]
    #[error("pattern serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
