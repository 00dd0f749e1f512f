//! Composable building blocks for constructing voices.
//!
//! Graph nodes wrap the low-level DSP primitives with what a triggered voice
//! needs: a place on the audio clock, automated parameters and block-based
//! rendering. The `extensions` module adds fluent helpers so recipes read as
//! signal chains:
//!
//! ```
//! use synthograsizer::dsp::{automation::AutomationParam, envelope::adsr};
//! use synthograsizer::graph::{extensions::NodeExt, filter::FilterNode, oscillator::OscNode};
//!
//! let now = 0.0;
//! let voice = OscNode::sawtooth(220.0)
//!     .play(now, now + 0.16)
//!     .through(FilterNode::lowpass(1000.0))
//!     .amplify(AutomationParam::from_breakpoints(&adsr(0.01, 0.05, 0.5, 0.1, 1.0), now));
//! # let _ = voice;
//! ```

/// Gain stage driven by an automation timeline.
pub mod amplify;
/// Fluent combinators (`.through()`, `.amplify()`, `.shape()`).
pub mod extensions;
/// State-variable filter node with an automated cutoff.
pub mod filter;
/// Equal-level sum of parallel sources.
pub mod mix;
/// Core traits shared by all graph nodes.
pub mod node;
/// One-shot noise table playback.
pub mod noise;
/// Scheduled audio-band oscillator with FM, detune and vibrato.
pub mod oscillator;
/// Oversampled waveshaper node.
pub mod shaper;
/// Serial chaining of two nodes (source → processor).
pub mod through;

pub use node::{GraphNode, RenderCtx};
