//! Benchmarks for DSP primitives and full voices on the mixing bus.
//!
//! Run with: cargo bench
//!
//! Reference timing at 48kHz sample rate:
//!   - 64 samples  = 1.33ms deadline
//!   - 128 samples = 2.67ms deadline
//!   - 256 samples = 5.33ms deadline
//!   - 512 samples = 10.67ms deadline
//!
//! Benchmark groups:
//!   - dsp/*        Primitives (oscillator, filter, automation, shaper, convolver, compressor)
//!   - scenarios/*  Melodic and drum voices, and the bus with effects

use criterion::{criterion_group, criterion_main};

mod dsp;
mod scenarios;

/// Common buffer sizes used in audio applications.
pub const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512];

pub const SAMPLE_RATE: f32 = 48_000.0;

criterion_group!(
    benches,
    dsp::bench_oscillator,
    dsp::bench_filter,
    dsp::bench_automation,
    dsp::bench_distortion,
    dsp::bench_reverb,
    dsp::bench_compressor,
    scenarios::bench_voices,
    scenarios::bench_mix,
);
criterion_main!(benches);
