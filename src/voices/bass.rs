//! 808 bass.
//!
//! A long sine drop in the sub range: the tuned boom that sits under a kick.
//!
//! # Kits
//!
//! - **default**: 50 → 30 Hz over 0.7 s.
//! - **analog**: 60 → 30 Hz over 0.8 s behind a lowpass that snaps shut
//!   from 200 to 50 Hz, 30% hotter.
//! - **digital**: linear glide 50 → 45 → 35 Hz with a stepped level that
//!   fades out at 0.9 s.

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
    let boom = hit
        .osc(Waveform::Sine, &sweep(50.0, 30.0, 0.7, Curve::Exponential), 0.7)
        .amplify(hit.gain(&sweep(hit.volume, 0.01, 0.7, Curve::Exponential)));

    hit.finish(vec![boom.boxed()], 0.7)
}

pub(super) fn analog(hit: &mut Strike) -> Voice {
    let filter = FilterNode::lowpass(200.0)
        .with_q(1.2)
        .with_cutoff(&sweep(200.0, 50.0, 0.1, Curve::Exponential), hit.now);

    let boom = hit
        .osc(Waveform::Sine, &sweep(60.0, 30.0, 0.8, Curve::Exponential), 0.8)
        .through(filter)
        .amplify(hit.gain(&sweep(hit.volume * 1.3, 0.01, 0.8, Curve::Exponential)));

    hit.finish(vec![boom.boxed()], 0.8)
}

pub(super) fn digital(hit: &mut Strike) -> Voice {
    let v = hit.volume;
    let pitch = stages(50.0, &[(0.1, 45.0), (0.6, 35.0)], Curve::Linear);
    let level = stages(v * 1.2, &[(0.1, v), (0.3, v * 0.8), (0.9, 0.001)], Curve::Linear);

    let boom = hit
        .osc(Waveform::Sine, &pitch, 0.9)
        .shape(digital_curve())
        .amplify(hit.gain(&level));

    hit.finish(vec![boom.boxed()], 0.9)
}
