/*
Effect Returns
==============

Three send effects hang off the bus. Each runs all the time; enabling or
disabling only moves its return gain.

    voice ─┬──────────────────────────────────────→ (+) dry
           ├─→ [delay line] ─┬─→ × delay mix ─────→ (+)
           │        ↑        │
           │   [LP 350 Hz] ← × feedback
           ├─→ [waveshaper] ─→ × 0.5 ──────────────→ (+)
           └─→ [convolver] ──→ × reverb mix ───────→ (+)

Delay
-----

The feedback path runs through a 350 Hz lowpass (Q 1), so each echo comes
back darker than the one before:

    line_in[n]  = send[n] + LP(feedback · line_out[n])
    line_out[n] = line_in[n - time · sr]

Distortion and reverb are thin wrappers around `dsp::distortion` and
`dsp::reverb`; their curve and kernel are rebuilt on the control thread and
swapped in whole.
*/

use std::sync::Arc;

use crate::{
    dsp::{
        delay::{DelayLine, MAX_DELAY_SECONDS},
        distortion::Waveshaper,
        filter::SVFilter,
        reverb::Convolver,
    },
    MAX_BLOCK_SIZE,
};

/// Return gain of the distortion send while enabled.
pub const DISTORTION_RETURN: f32 = 0.5;

const DAMPING_HZ: f32 = 350.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Delay,
    Distortion,
    Reverb,
}

impl Effect {
    pub const ALL: [Effect; 3] = [Effect::Delay, Effect::Distortion, Effect::Reverb];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Effect::Delay => "delay",
            Effect::Distortion => "distortion",
            Effect::Reverb => "reverb",
        }
    }
}

pub struct DelayNetwork {
    line: DelayLine,
    damping: SVFilter,
    damping_g: f32,
    damping_k: f32,
    delay_samples: f32,
    feedback: f32,
}

impl DelayNetwork {
    pub fn new(sample_rate: f32, time: f32, feedback: f32) -> Self {
        let mut network = Self {
            line: DelayLine::new(MAX_DELAY_SECONDS, sample_rate),
            damping: SVFilter::lowpass(DAMPING_HZ),
            damping_g: SVFilter::compute_g(DAMPING_HZ, sample_rate),
            damping_k: SVFilter::compute_k(1.0),
            delay_samples: 0.0,
            feedback: 0.0,
        };
        network.set(time, feedback, sample_rate);
        network
    }

    /// Delay time in seconds and feedback gain (0..1).
    pub fn set(&mut self, time: f32, feedback: f32, sample_rate: f32) {
        let time = if time.is_finite() { time.clamp(0.0, MAX_DELAY_SECONDS) } else { 0.0 };
        // Reads happen before the write, so the newest sample is already one old.
        self.delay_samples = (time * sample_rate - 1.0).max(0.0);
        self.feedback = if feedback.is_finite() { feedback.clamp(0.0, 1.0) } else { 0.0 };
    }

    pub fn feedback(&self) -> f32 {
        self.feedback
    }

    /// Replace the send in `buffer` with the delay output.
    pub fn process(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            let delayed = self.line.read(self.delay_samples);
            let returned = self
                .damping
                .process(delayed * self.feedback, self.damping_k, self.damping_g);
            self.line.write(*sample + returned);
            *sample = delayed;
        }
    }
}

pub struct DistortionStage {
    shaper: Waveshaper,
}

impl DistortionStage {
    pub fn new(curve: Arc<[f32]>) -> Self {
        Self {
            shaper: Waveshaper::new(curve),
        }
    }

    /// Swap in a new curve; the old one is handed back to be dropped.
    pub fn set_curve(&mut self, curve: Arc<[f32]>) -> Arc<[f32]> {
        self.shaper.set_curve(curve)
    }

    pub fn process(&mut self, buffer: &mut [f32]) {
        self.shaper.render(buffer);
    }
}

pub struct ReverbStage {
    convolver: Box<Convolver>,
}

impl ReverbStage {
    pub fn new(convolver: Box<Convolver>) -> Self {
        Self { convolver }
    }

    /// Swap in a new room; the old one is handed back to be dropped.
    pub fn replace(&mut self, convolver: Box<Convolver>) -> Box<Convolver> {
        std::mem::replace(&mut self.convolver, convolver)
    }

    pub fn process(&mut self, buffer: &mut [f32]) {
        debug_assert!(buffer.len() <= MAX_BLOCK_SIZE);
        self.convolver.render(buffer);
    }
}
