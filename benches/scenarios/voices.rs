//! Benchmarks for complete voices as the sequencer builds them.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use rand::{rngs::StdRng, SeedableRng};
use synthograsizer::{
    dsp::oscillator::Waveform,
    graph::RenderCtx,
    synth::{trigger_fm_note, trigger_note, Voice},
    voices::{trigger_drum, DrumKit, DrumType},
    Configuration,
};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

fn render(voice: &mut Voice, buffer: &mut [f32], ctx: &RenderCtx) {
    buffer.fill(0.0);
    voice.render(buffer, ctx);
}

pub fn bench_voices(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/voices");
    // Inside the decay stage of every default voice
    let ctx = RenderCtx::new(SAMPLE_RATE, 0.02);
    let mut rng = StdRng::seed_from_u64(3);

    let mut filtered = Configuration::default();
    filtered.synthesis.filter.envelope_amount = 50.0;

    let mut unison = Configuration::default();
    unison.synthesis.voice.unison = 4;
    unison.synthesis.voice.detune = 12.0;
    unison.synthesis.fm.index = 5.0;
    unison.synthesis.fm.ratio = 2.0;

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        let mut saw = trigger_note(&filtered, 220.0, Waveform::Sawtooth, 0.0);
        group.bench_with_input(BenchmarkId::new("saw_filter_env", size), &size, |b, _| {
            b.iter(|| render(black_box(&mut saw), &mut buffer, &ctx))
        });

        let mut fm = trigger_fm_note(&unison, 220.0, 0.0);
        group.bench_with_input(BenchmarkId::new("fm_unison_4", size), &size, |b, _| {
            b.iter(|| render(black_box(&mut fm), &mut buffer, &ctx))
        });

        for kit in DrumKit::ALL {
            for drum in [DrumType::Kick, DrumType::Snare, DrumType::Cymbal] {
                let mut hit = trigger_drum(kit, drum, 1.0, 0.0, SAMPLE_RATE, &mut rng);
                let name = format!("{}_{}", kit.name(), drum.name());
                group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                    b.iter(|| render(black_box(&mut hit), &mut buffer, &ctx))
                });
            }
        }
    }

    group.finish();
}
