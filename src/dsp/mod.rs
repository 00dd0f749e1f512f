//! Low-level DSP primitives used by the graph nodes and the mixing bus.
//!
//! Everything here is plain signal math over `f32` samples. Tables (noise,
//! shaping curves, room impulses, FFT partitions) are built on the control
//! thread; the per-sample processors only read them.

/// Spectrum snapshots of the bus output.
pub mod analyzer;
/// Time-stamped parameter automation (set / linear / exponential ramps).
pub mod automation;
/// Soft-knee dynamics compressor.
pub mod compressor;
/// Fractional delay line.
pub mod delay;
/// Shaping curves and the oversampled waveshaper.
pub mod distortion;
/// Envelope breakpoint builders.
pub mod envelope;
/// State-variable filter implementation with multiple responses.
pub mod filter;
pub mod lfo;
pub mod mix;
pub mod noise;
/// Phase-accumulator oscillator waveforms.
pub mod oscillator;
/// Procedural room impulse and partitioned convolution.
pub mod reverb;

pub use automation::AutomationParam;
pub use envelope::{Breakpoint, Curve};
