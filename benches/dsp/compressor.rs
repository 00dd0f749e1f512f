//! Benchmarks for the bus compressor.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use synthograsizer::{config::CompressorConfig, dsp::compressor::Compressor};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_compressor(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/compressor");

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.03).sin() * 0.9).collect();

        let mut compressor = Compressor::new(&CompressorConfig::default(), SAMPLE_RATE);
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("default", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                compressor.render(black_box(&mut buffer));
            })
        });
    }

    group.finish();
}
