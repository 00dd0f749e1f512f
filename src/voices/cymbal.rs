//! Cymbal.
//!
//! The longest hit in every kit: a high oscillator for the bell plus a long
//! burst of filtered noise for the wash. The noise can outlast the bell, so a
//! cymbal lives as long as its longest layer.
//!
//! # Kits
//!
//! - **default**: 8 kHz triangle for 0.8 s, one second of noise above 8 kHz.
//! - **analog**: 7 kHz square highpassed at 9 kHz for 1 s, 1.2 s of noise
//!   through a very wide bandpass at 10 kHz.
//! - **digital**: 12 kHz square with a stepped linear decay, two noise layers
//!   (the second 50 ms late and half as long) highpassed at 10 kHz.

use crate::{
    dsp::{
        envelope::{stages, sweep, Curve},
        oscillator::Waveform,
    },
    graph::{extensions::NodeExt, filter::FilterNode, mix::Sum},
    synth::voice::Voice,
};

use super::{digital_curve, Strike};

pub(super) fn default(hit: &mut Strike) -> Voice {
    let bell = hit
        .tone(Waveform::Triangle, 8000.0, 0.8)
        .amplify(hit.gain(&sweep(hit.volume / 8.0, 0.01, 0.8, Curve::Exponential)));

    let wash = hit
        .noise(1.0, 0.0)
        .through(FilterNode::highpass(8000.0))
        .amplify(hit.gain(&sweep(hit.volume / 5.0, 0.01, 0.8, Curve::Exponential)));

    hit.finish(vec![bell.boxed(), wash.boxed()], 1.0)
}

pub(super) fn analog(hit: &mut Strike) -> Voice {
    let bell = hit
        .tone(Waveform::Square, 7000.0, 1.0)
        .through(FilterNode::highpass(9000.0).with_q(1.5))
        .amplify(hit.gain(&sweep(hit.volume / 6.0, 0.01, 1.0, Curve::Exponential)));

    let wash = hit
        .noise(1.2, 0.0)
        .through(FilterNode::bandpass(10_000.0).with_q(0.5))
        .amplify(hit.gain(&sweep(hit.volume / 4.0, 0.01, 1.0, Curve::Exponential)));

    hit.finish(vec![bell.boxed(), wash.boxed()], 1.2)
}

pub(super) fn digital(hit: &mut Strike) -> Voice {
    let v = hit.volume;

    let bell = hit
        .tone(Waveform::Square, 12_000.0, 0.8)
        .shape(digital_curve())
        .amplify(hit.gain(&stages(
            v / 8.0,
            &[(0.1, v / 12.0), (0.4, v / 20.0), (0.8, 0.001)],
            Curve::Linear,
        )));

    let layers = Sum::new(vec![hit.noise(0.8, 0.0).boxed(), hit.noise(0.4, 0.05).boxed()]);
    let wash = layers
        .through(FilterNode::highpass(10_000.0))
        .amplify(hit.gain(&stages(
            v / 6.0,
            &[(0.1, v / 10.0), (0.4, v / 15.0), (0.8, 0.001)],
            Curve::Linear,
        )));

    hit.finish(vec![bell.boxed(), wash.boxed()], 0.8)
}
