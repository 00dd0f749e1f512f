// Purpose: Melodic voice construction and the voice/command types handed to
// the render bus. Drum recipes live in `voices`.

pub mod melodic;
pub mod message;
pub mod voice;

pub use melodic::{trigger_fm_note, trigger_note};
pub use message::GraphCommand;
pub use voice::{Sends, Voice};
