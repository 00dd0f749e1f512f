//! Snare drum.
//!
//! Two layers with independent decays: a tonal body for the drum head and a
//! noise burst standing in for the wires under it.
//!
//! # Kits
//!
//! - **default**: plain triangle at 100 Hz plus unfiltered noise, both gone
//!   in 100 ms.
//! - **analog**: triangle sliding 140 → 80 Hz through a bandpass at 800 Hz,
//!   with noise through a wide (Q 0.7) bandpass at 2 kHz.
//! - **digital**: sawtooth snapping 200 → 100 Hz in 50 ms, noise hard-clipped
//!   to ±0.8 before its gain stage.

use crate::{
    dsp::{
        envelope::{sweep, Curve},
        oscillator::Waveform,
    },
    graph::{extensions::NodeExt, filter::FilterNode},
    synth::voice::Voice,
};

use super::{digital_curve, noise_clip_curve, Strike};

pub(super) fn default(hit: &mut Strike) -> Voice {
    let body = hit
        .tone(Waveform::Triangle, 100.0, 0.1)
        .amplify(hit.gain(&sweep(hit.volume / 2.0, 0.01, 0.1, Curve::Exponential)));

    let wires = hit
        .noise(0.1, 0.0)
        .amplify(hit.gain(&sweep(hit.volume / 2.0, 0.01, 0.1, Curve::Exponential)));

    hit.finish(vec![body.boxed(), wires.boxed()], 0.1)
}

pub(super) fn analog(hit: &mut Strike) -> Voice {
    let body = hit
        .osc(Waveform::Triangle, &sweep(140.0, 80.0, 0.2, Curve::Exponential), 0.2)
        .through(FilterNode::bandpass(800.0).with_q(1.5))
        .amplify(hit.gain(&sweep(hit.volume / 2.0, 0.01, 0.2, Curve::Exponential)));

    let wires = hit
        .noise(0.2, 0.0)
        .through(FilterNode::bandpass(2000.0).with_q(0.7))
        .amplify(hit.gain(&sweep(hit.volume * 0.7, 0.01, 0.2, Curve::Exponential)));

    hit.finish(vec![body.boxed(), wires.boxed()], 0.2)
}

pub(super) fn digital(hit: &mut Strike) -> Voice {
    let body = hit
        .osc(Waveform::Sawtooth, &sweep(200.0, 100.0, 0.05, Curve::Linear), 0.15)
        .shape(digital_curve())
        .amplify(hit.gain(&sweep(hit.volume * 0.5, 0.01, 0.15, Curve::Exponential)));

    let wires = hit
        .noise(0.15, 0.0)
        .shape(noise_clip_curve())
        .amplify(hit.gain(&sweep(hit.volume * 0.8, 0.01, 0.15, Curve::Exponential)));

    hit.finish(vec![body.boxed(), wires.boxed()], 0.15)
}
