//! Benchmarks for breakpoint automation, evaluated per sample.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use synthograsizer::dsp::{
    automation::AutomationParam,
    envelope::{adsr, sweep, Curve},
};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

fn run(param: &mut AutomationParam, buffer: &mut [f32]) {
    let dt = 1.0 / SAMPLE_RATE as f64;
    for (i, out) in buffer.iter_mut().enumerate() {
        *out = param.value_at(0.005 + i as f64 * dt);
    }
}

pub fn bench_automation(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/automation");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Inside the attack ramp
        let mut linear = AutomationParam::from_breakpoints(&adsr(0.01, 0.05, 0.5, 0.1, 1.0), 0.0);
        group.bench_with_input(BenchmarkId::new("adsr_linear", size), &size, |b, _| {
            b.iter(|| run(black_box(&mut linear), &mut buffer))
        });

        // Kick-style pitch drop
        let mut exponential =
            AutomationParam::from_breakpoints(&sweep(150.0, 0.01, 0.5, Curve::Exponential), 0.0);
        group.bench_with_input(BenchmarkId::new("pitch_exponential", size), &size, |b, _| {
            b.iter(|| run(black_box(&mut exponential), &mut buffer))
        });
    }

    group.finish();
}
