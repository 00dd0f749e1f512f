//! Benchmarks for the mixing bus with many voices and every effect on.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use synthograsizer::{
    dsp::oscillator::Waveform,
    engine::audio_graph,
    synth::trigger_note,
    Configuration,
};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_mix(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/mix");

    let mut config = Configuration::default();
    config.effects.delay.enabled = true;
    config.effects.distortion.enabled = true;
    config.effects.reverb.enabled = true;
    // Long enough that no voice retires during the run
    config.synthesis.envelope.release_ms = 10_000.0;

    for voices in [4usize, 16, 64] {
        for &size in BLOCK_SIZES {
            let (mut graph, mut bus) = audio_graph(SAMPLE_RATE, &config);
            graph.resume();

            let mut buffer = vec![0.0f32; size];
            let name = format!("{voices}_voices_fx");
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    // Top the bus back up once the previous batch has rung out
                    if bus.voice_count() == 0 {
                        let now = graph.now();
                        for i in 0..voices {
                            let frequency = 110.0 * (1.0 + i as f32 / 8.0);
                            graph.start_voice(trigger_note(&config, frequency, Waveform::Sawtooth, now));
                        }
                    }
                    bus.render(black_box(&mut buffer))
                })
            });
        }
    }

    group.finish();
}
