//! Closed and open hi-hats.
//!
//! A very high square wave gives the metallic ring; filtered noise gives the
//! sizzle. Closed and open hats are the same recipe with a short or long
//! decay.
//!
//! | Kit     | Square       | Noise filter        | Closed | Open  |
//! |---------|--------------|---------------------|--------|-------|
//! | default | 6 kHz        | bandpass 10 kHz     | 50 ms  | 300 ms |
//! | analog  | 8 / 7.5 kHz, highpassed | bandpass 9 / 8 kHz | 60 ms | 400 ms |
//! | digital | 12 / 10 kHz  | highpass 9 kHz      | 40 ms  | 300 ms |
//!
//! The analog closed hat layers a second, shorter burst 10 ms after the first.

use crate::{
    dsp::{
        envelope::{stages, sweep, Curve},
        oscillator::Waveform,
    },
    graph::{extensions::NodeExt, filter::FilterNode, mix::Sum},
    synth::voice::Voice,
};

use super::{digital_curve, Strike};

fn default_hat(hit: &mut Strike, decay: f64) -> Voice {
    let level = hit.volume / 5.0;

    let ring = hit
        .tone(Waveform::Square, 6000.0, decay)
        .amplify(hit.gain(&sweep(level, 0.01, decay, Curve::Exponential)));

    let sizzle = hit
        .noise(decay as f32, 0.0)
        .through(FilterNode::bandpass(10_000.0))
        .amplify(hit.gain(&sweep(level, 0.01, decay, Curve::Exponential)));

    hit.finish(vec![ring.boxed(), sizzle.boxed()], decay)
}

pub(super) fn default_closed(hit: &mut Strike) -> Voice {
    default_hat(hit, 0.05)
}

pub(super) fn default_open(hit: &mut Strike) -> Voice {
    default_hat(hit, 0.3)
}

pub(super) fn analog_closed(hit: &mut Strike) -> Voice {
    let level = hit.volume / 4.0;

    let ring = hit
        .tone(Waveform::Square, 8000.0, 0.06)
        .through(FilterNode::highpass(7000.0).with_q(3.0))
        .amplify(hit.gain(&sweep(level, 0.01, 0.06, Curve::Exponential)));

    let bursts = Sum::new(vec![hit.noise(0.06, 0.0).boxed(), hit.noise(0.03, 0.01).boxed()]);
    let sizzle = bursts
        .through(FilterNode::bandpass(9000.0).with_q(1.2))
        .amplify(hit.gain(&sweep(level, 0.01, 0.06, Curve::Exponential)));

    hit.finish(vec![ring.boxed(), sizzle.boxed()], 0.06)
}

pub(super) fn analog_open(hit: &mut Strike) -> Voice {
    let level = hit.volume / 4.0;

    let ring = hit
        .tone(Waveform::Square, 7500.0, 0.4)
        .through(FilterNode::highpass(6000.0).with_q(2.0))
        .amplify(hit.gain(&sweep(level, 0.01, 0.4, Curve::Exponential)));

    let sizzle = hit
        .noise(0.4, 0.0)
        .through(FilterNode::bandpass(8000.0).with_q(0.9))
        .amplify(hit.gain(&sweep(level, 0.01, 0.4, Curve::Exponential)));

    hit.finish(vec![ring.boxed(), sizzle.boxed()], 0.4)
}

pub(super) fn digital_closed(hit: &mut Strike) -> Voice {
    let ring = hit
        .tone(Waveform::Square, 12_000.0, 0.04)
        .shape(digital_curve())
        .amplify(hit.gain(&sweep(hit.volume / 6.0, 0.01, 0.04, Curve::Exponential)));

    let sizzle = hit
        .noise(0.04, 0.0)
        .through(FilterNode::highpass(9000.0))
        .amplify(hit.gain(&sweep(hit.volume / 5.0, 0.001, 0.04, Curve::Linear)));

    hit.finish(vec![ring.boxed(), sizzle.boxed()], 0.04)
}

pub(super) fn digital_open(hit: &mut Strike) -> Voice {
    let v = hit.volume;

    let ring = hit
        .tone(Waveform::Square, 10_000.0, 0.3)
        .shape(digital_curve())
        .amplify(hit.gain(&stages(v / 6.0, &[(0.1, v / 8.0), (0.3, 0.001)], Curve::Linear)));

    let sizzle = hit
        .noise(0.3, 0.0)
        .through(FilterNode::highpass(9000.0))
        .amplify(hit.gain(&stages(v / 5.0, &[(0.1, v / 7.0), (0.3, 0.001)], Curve::Linear)));

    hit.finish(vec![ring.boxed(), sizzle.boxed()], 0.3)
}
