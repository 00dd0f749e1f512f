//! Tom.
//!
//! A triangle with a downward pitch sweep and an amplitude decay of the same
//! length, somewhere between a kick and a snare body.
//!
//! # Kits
//!
//! - **default**: 90 → 45 Hz over 150 ms.
//! - **analog**: 100 → 60 Hz under a resonant lowpass closing 200 → 80 Hz.
//! - **digital**: a sharp linear drop 120 → 60 Hz in 50 ms, then on to 40 Hz;
//!   the level eases to 70% before fading.

use crate::{
    dsp::{
        envelope::{stages, sweep, Curve},
        oscillator::Waveform,
    },
    graph::{extensions::NodeExt, filter::FilterNode},
    synth::voice::Voice,
};

use super::{digital_curve, Strike};

pub(super) fn default(hit: &mut Strike) -> Voice {
    let body = hit
        .osc(Waveform::Triangle, &sweep(90.0, 45.0, 0.15, Curve::Exponential), 0.15)
        .amplify(hit.gain(&sweep(hit.volume, 0.01, 0.15, Curve::Exponential)));

    hit.finish(vec![body.boxed()], 0.15)
}

pub(super) fn analog(hit: &mut Strike) -> Voice {
    let filter = FilterNode::lowpass(200.0)
        .with_q(1.5)
        .with_cutoff(&sweep(200.0, 80.0, 0.2, Curve::Exponential), hit.now);

    let body = hit
        .osc(Waveform::Triangle, &sweep(100.0, 60.0, 0.2, Curve::Exponential), 0.2)
        .through(filter)
        .amplify(hit.gain(&sweep(hit.volume * 1.1, 0.01, 0.2, Curve::Exponential)));

    hit.finish(vec![body.boxed()], 0.2)
}

pub(super) fn digital(hit: &mut Strike) -> Voice {
    let v = hit.volume;
    let pitch = stages(120.0, &[(0.05, 60.0), (0.2, 40.0)], Curve::Linear);

    let body = hit
        .osc(Waveform::Triangle, &pitch, 0.2)
        .shape(digital_curve())
        .amplify(hit.gain(&stages(v, &[(0.05, v * 0.7), (0.2, 0.001)], Curve::Linear)));

    hit.finish(vec![body.boxed()], 0.2)
}
