/*
Arpeggiator
===========

Turns one triggered note into a short run of the same note across octaves.
Each octave offset is +12 on the note index, which the scale mapping decodes
as exactly one octave.

    octaves = 3, note N:

    up        N      N+12   N+24
    down      N+24   N+12   N
    up-down   N      N+12   N+24   N+12      (no repeated peak, no repeated root)
    random    six picks from {N, N+12, N+24}

Notes are played one after another, `spacing` apart:

    spacing = (60 / bpm) / rate    seconds     (rate = notes per beat)
*/

use std::time::Duration;

use rand::Rng;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::ArpeggiatorConfig;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ArpPattern {
    #[default]
    Up,
    Down,
    #[cfg_attr(feature = "serde", serde(rename = "updown"))]
    UpDown,
    Random,
}

/// Expand `note` into the run the pattern plays. Disabled means the note alone.
pub fn expand<R: Rng + ?Sized>(note: i32, config: &ArpeggiatorConfig, rng: &mut R) -> Vec<i32> {
    if !config.enabled {
        return vec![note];
    }

    let octaves = config.octaves.max(1) as i32;
    let at = |octave: i32| note + 12 * octave;

    match config.pattern {
        ArpPattern::Up => (0..octaves).map(at).collect(),
        ArpPattern::Down => (0..octaves).rev().map(at).collect(),
        ArpPattern::UpDown => (0..octaves).chain((1..octaves - 1).rev()).map(at).collect(),
        ArpPattern::Random => (0..octaves * 2).map(|_| at(rng.gen_range(0..octaves))).collect(),
    }
}

/// Gap between consecutive arpeggio notes.
pub fn spacing(bpm: f32, rate: f32) -> Duration {
    let seconds = 60.0 / bpm as f64 / rate as f64;
    if seconds.is_finite() && seconds > 0.0 {
        Duration::from_secs_f64(seconds)
    } else {
        Duration::ZERO
    }
}
