//! Scenario benchmarks: whole voices and the mixing bus under load.

mod mix;
mod voices;

pub use mix::bench_mix;
pub use voices::bench_voices;
