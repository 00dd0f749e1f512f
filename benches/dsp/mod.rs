//! Benchmarks for low-level DSP primitives.

mod automation;
mod compressor;
mod distortion;
mod filter;
mod oscillator;
mod reverb;

pub use automation::bench_automation;
pub use compressor::bench_compressor;
pub use distortion::bench_distortion;
pub use filter::bench_filter;
pub use oscillator::bench_oscillator;
pub use reverb::bench_reverb;
