//! Benchmarks for the 4x oversampled waveshaper.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use synthograsizer::dsp::distortion::{distortion_curve, Waveshaper};

use crate::BLOCK_SIZES;

pub fn bench_distortion(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/distortion");

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.05).sin()).collect();

        for (name, amount) in [("light", 10.0), ("heavy", 90.0)] {
            let mut shaper = Waveshaper::new(distortion_curve(amount));
            let mut buffer = input.clone();
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    buffer.copy_from_slice(&input);
                    shaper.render(black_box(&mut buffer));
                })
            });
        }
    }

    group.finish();
}
