//! Melodic voices: standard (one waveform) and FM.

/*
Melodic Voice
=============

    [osc]  ┐
    [osc]  ┼──→ (+) ──→ [filter] ──→ [gain: ADSR] ──→ bus (+ sends)
    [osc]  ┘
     unison copies, detuned

Every note is a one-shot: the envelope runs attack → decay → release
back-to-back and the oscillators stop exactly when the release ends, so the
voice lifetime is attack + decay + release.

Unison
------

Copy i (for i in 1..count) is detuned by

    cents_i = ±detune · ceil(i / 2)     (+ for even i, - for odd i)

so the stack spreads symmetrically: 0, -d, +d, -2d, +2d, ...

FM
--

The carrier's frequency is pushed around by a modulator:

    f_carrier(t) = f + (index · 10) · modulator(t)
    f_modulator  = f · ratio

Each unison copy is a full carrier/modulator pair with the same detune, so
the timbre is identical across the stack.
*/

use crate::{
    config::{Configuration, LfoDestination},
    dsp::{
        automation::AutomationParam,
        envelope::{filter_sweep, Adsr},
        oscillator::Waveform,
    },
    graph::{extensions::NodeExt, filter::FilterNode, mix::Sum, oscillator::OscNode, GraphNode},
    synth::voice::{Sends, Voice},
};

/// FM depth in Hz per unit of modulation index.
pub const FM_DEPTH_SCALE: f32 = 10.0;

/// Cents offset for unison copy `index` (copy 0 is undetuned).
pub fn unison_detune(index: usize, detune: f32) -> f32 {
    if index == 0 {
        return 0.0;
    }
    let sign = if index % 2 == 0 { 1.0 } else { -1.0 };
    sign * detune * index.div_ceil(2) as f32
}

/// Amplitude envelope read from the configuration (ms and percent).
pub fn envelope_of(config: &Configuration) -> Adsr {
    let env = &config.synthesis.envelope;
    Adsr::new(
        env.attack_ms / 1000.0,
        env.decay_ms / 1000.0,
        env.sustain / 100.0,
        env.release_ms / 1000.0,
    )
}

/// Standard voice: `waveform` oscillators at `frequency`.
pub fn trigger_note(config: &Configuration, frequency: f32, waveform: Waveform, now: f64) -> Voice {
    build(config, now, |cents, stop| {
        OscNode::new(waveform, frequency)
            .with_detune(cents)
            .play(now, stop)
    })
}

/// FM voice: carrier/modulator pairs from the FM settings.
pub fn trigger_fm_note(config: &Configuration, frequency: f32, now: f64) -> Voice {
    let fm = config.synthesis.fm.clone();
    build(config, now, |cents, stop| {
        let modulator = OscNode::new(fm.modulator, frequency * fm.ratio)
            .with_detune(cents)
            .play(now, stop);
        OscNode::new(fm.carrier, frequency)
            .with_detune(cents)
            .with_fm(modulator, fm.index * FM_DEPTH_SCALE)
            .play(now, stop)
    })
}

fn build<F>(config: &Configuration, now: f64, mut oscillator: F) -> Voice
where
    F: FnMut(f32, f64) -> OscNode,
{
    let mut config = config.clone();
    config.repair();

    let envelope = envelope_of(&config);
    let stop = now + envelope.lifetime();
    let synthesis = &config.synthesis;

    let vibrato = match synthesis.lfo.active_destination() {
        LfoDestination::Pitch => Some((synthesis.lfo.waveform, synthesis.lfo.rate, synthesis.lfo.depth() * 100.0)),
        _ => None,
    };

    let oscillators: Vec<Box<dyn GraphNode>> = (0..synthesis.voice.unison.max(1))
        .map(|i| {
            let osc = oscillator(unison_detune(i, synthesis.voice.detune), stop);
            match vibrato {
                Some((waveform, rate, cents)) => osc.with_vibrato(waveform, rate, cents).boxed(),
                None => osc.boxed(),
            }
        })
        .collect();

    let filter = &synthesis.filter;
    let cutoff_sweep = filter_sweep(
        filter.cutoff,
        filter.envelope_amount / 100.0,
        envelope.attack,
        envelope.decay,
        envelope.release,
    );
    let filter = FilterNode::new(filter.kind, filter.cutoff, filter.q)
        .with_cutoff(&cutoff_sweep, now)
        .tracking_lfo();

    let gain = AutomationParam::from_breakpoints(&envelope.breakpoints(config.volumes.melody), now);

    let graph = Sum::new(oscillators).through(filter).amplify(gain);

    let effects = &config.effects;
    Voice::new(graph.boxed(), now, stop).with_sends(Sends {
        delay: effects.delay.enabled,
        distortion: effects.distortion.enabled,
        reverb: effects.reverb.enabled,
    })
}
