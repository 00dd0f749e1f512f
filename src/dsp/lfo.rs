//! Low Frequency Oscillator (LFO).

/*
Low Frequency Oscillators
=========================

An LFO is an oscillator slowed down below hearing (roughly 0.01 to 20 Hz).
Nobody listens to it directly; its output moves some other parameter.

  rate        cycles per second of the modulation
  depth       how far the target parameter is pushed at the LFO's peaks
  bipolar     output swings -1..+1, so the target moves both up and down


Routes
------

Only one route is live at a time.

  pitch       vibrato. Each oscillator of a new note gets its own LFO,
              depth in cents: amount% of 100 cents.

                  f(t) = f0 · 2^(lfo(t) · depth / 1200)

  filter      voice filter cutoffs are scaled by 2^(lfo · depth), so at full
              depth the cutoff sweeps one octave either side of its setting.

  amplitude   lfo · depth is added to the master gain (tremolo).

  none        the LFO keeps running but nothing listens.


Shapes
------

  sine        smooth sweep, the classic vibrato
  triangle    constant-speed sweep
  sawtooth    ramp up, snap back; rhythmic
  square      switches between two values; gated tremolo

The waveform math is shared with the audio oscillators (`dsp::oscillator`).
The bus LFO advances once per render block rather than once per sample: at
20 Hz and a 128-sample block that is still more than 18 updates per cycle.
*/

use crate::dsp::oscillator::Waveform;

/// Control-rate oscillator, bipolar output in [-1, 1].
#[derive(Debug, Clone)]
pub struct Lfo {
    waveform: Waveform,
    rate_hz: f32,
    phase: f32,
}

impl Lfo {
    pub fn new(waveform: Waveform, rate_hz: f32) -> Self {
        Self {
            waveform,
            rate_hz,
            phase: 0.0,
        }
    }

    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.waveform = waveform;
    }

    pub fn set_rate(&mut self, rate_hz: f32) {
        self.rate_hz = rate_hz;
    }

    pub fn rate(&self) -> f32 {
        self.rate_hz
    }

    /// Current value without advancing.
    #[inline]
    pub fn value(&self) -> f32 {
        self.waveform.at(self.phase)
    }

    /// Return the current value and advance by `frames` samples.
    #[inline]
    pub fn advance(&mut self, frames: usize, sample_rate: f32) -> f32 {
        let out = self.value();
        self.phase += self.rate_hz * frames as f32 / sample_rate;
        self.phase -= self.phase.floor();
        out
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }
}

/// Convert bipolar signal (-1.0 to +1.0) to unipolar (0.0 to 1.0).
#[inline]
pub fn bipolar_to_unipolar(bipolar: f32) -> f32 {
    (bipolar + 1.0) * 0.5
}

/// Frequency multiplier for a pitch offset in cents.
///
/// # Example
/// ```
/// use synthograsizer::dsp::lfo::cents_to_ratio;
/// assert!((cents_to_ratio(1200.0) - 2.0).abs() < 1e-6);
/// ```
#[inline]
pub fn cents_to_ratio(cents: f32) -> f32 {
    (cents / 1200.0).exp2()
}
