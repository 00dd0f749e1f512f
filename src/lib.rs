/// Report a recovery on the control thread. See [`recovery`].
macro_rules! log_recovery {
    ($($arg:tt)*) => {
        $crate::recovery::report(format_args!($($arg)*))
    };
}
pub(crate) use log_recovery;

pub mod config; // Session configuration
pub mod dsp;
pub mod engine; // Transport, scheduling and the audio graph
pub mod error;
pub mod graph; // Composable audio graph nodes
pub mod recovery;
pub mod sequencing; // Grids, scales, arpeggiator and saved patterns
pub mod synth; // Melodic voices
pub mod voices; // Drum kits

pub use config::Configuration;
pub use engine::{Engine, MixBus};
pub use error::{EngineError, Result};

pub const MAX_BLOCK_SIZE: usize = 2048;
