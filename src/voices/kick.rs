//! Kick drum.
//!
//! A sine body whose pitch falls away fast, which is where the "punch"
//! comes from. The amplitude follows the pitch down on an exponential curve.
//!
//! # Kits
//!
//! - **default**: 150 Hz diving to almost nothing over half a second.
//! - **analog**: 120 → 30 Hz through a resonant lowpass (Q 2) that closes
//!   from 400 to 50 Hz in the first 100 ms, with 20% more level.
//! - **digital**: two-stage dive 80 → 40 → 20 Hz, driven 50% harder into the
//!   shaping curve for crunch.

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
        .osc(Waveform::Sine, &sweep(150.0, 0.01, 0.5, Curve::Exponential), 0.5)
        .amplify(hit.gain(&sweep(hit.volume, 0.001, 0.5, Curve::Exponential)));

    hit.finish(vec![body.boxed()], 0.5)
}

pub(super) fn analog(hit: &mut Strike) -> Voice {
    let filter = FilterNode::lowpass(400.0)
        .with_q(2.0)
        .with_cutoff(&sweep(400.0, 50.0, 0.1, Curve::Exponential), hit.now);

    let body = hit
        .osc(Waveform::Sine, &sweep(120.0, 30.0, 0.4, Curve::Exponential), 0.4)
        .through(filter)
        .amplify(hit.gain(&sweep(hit.volume * 1.2, 0.001, 0.4, Curve::Exponential)));

    hit.finish(vec![body.boxed()], 0.4)
}

pub(super) fn digital(hit: &mut Strike) -> Voice {
    let pitch = stages(80.0, &[(0.1, 40.0), (0.3, 20.0)], Curve::Exponential);

    let body = hit
        .osc(Waveform::Sine, &pitch, 0.3)
        .shape(digital_curve())
        .amplify(hit.gain(&sweep(hit.volume * 1.5, 0.001, 0.3, Curve::Exponential)));

    hit.finish(vec![body.boxed()], 0.3)
}
