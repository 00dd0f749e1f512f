//! Benchmarks for partitioned convolution reverb.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use rand::{rngs::StdRng, SeedableRng};
use synthograsizer::dsp::reverb::{reverb_impulse, Convolver};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_reverb(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/reverb");
    let mut rng = StdRng::seed_from_u64(1);

    for &size in BLOCK_SIZES {
        // Impulse followed by a quiet tail
        let input: Vec<f32> = (0..size)
            .map(|i| {
                if i < 10 {
                    1.0 - (i as f32 / 10.0)
                } else {
                    (i as f32 * 0.05).sin() * 0.1
                }
            })
            .collect();

        for (name, room) in [("small_room", 10.0), ("large_room", 80.0)] {
            let impulse = reverb_impulse(room, SAMPLE_RATE, &mut rng);
            let mut convolver = Convolver::from_impulse(&impulse, SAMPLE_RATE);
            let mut buffer = input.clone();
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    buffer.copy_from_slice(&input);
                    convolver.render(black_box(&mut buffer));
                })
            });
        }
    }

    group.finish();
}
