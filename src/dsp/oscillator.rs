use std::f32::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Phase-Accumulator Oscillator
============================

Every periodic waveform here is a function of a normalised phase in [0, 1).
Each sample the phase advances by frequency / sample_rate and wraps:

    phase(n+1) = fract(phase(n) + f / sr)

Because the increment is recomputed per sample, the frequency can change on
every sample (pitch sweeps, vibrato, FM) without clicks: the waveform stays
continuous and only its speed changes.

  phase:    0      0.25     0.5     0.75     1
  sine      0  →   +1   →   0   →   -1   →   0
  square   +1  ----------- -1 -------------- +1
  sawtooth  0  →  +0.5  →  ±1   → -0.5   →   0   (jump at 0.5)
  triangle  0  →   +1   →   0   →   -1   →   0

The non-sine shapes are naive (not band-limited). At the high pitches the
drum kits use (6-12 kHz squares) this aliases, which is part of their metallic
character.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Waveform {
    #[default]
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

impl Waveform {
    pub const ALL: [Waveform; 4] = [
        Waveform::Sine,
        Waveform::Square,
        Waveform::Sawtooth,
        Waveform::Triangle,
    ];

    /// Evaluate the waveform at a normalised phase in [0, 1).
    #[inline]
    pub fn at(self, phase: f32) -> f32 {
        match self {
            Waveform::Sine => (TAU * phase).sin(),
            Waveform::Square => {
                if phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Sawtooth => {
                if phase < 0.5 {
                    2.0 * phase
                } else {
                    2.0 * phase - 2.0
                }
            }
            Waveform::Triangle => {
                if phase < 0.25 {
                    4.0 * phase
                } else if phase < 0.75 {
                    2.0 - 4.0 * phase
                } else {
                    4.0 * phase - 4.0
                }
            }
        }
    }

    pub fn next(self) -> Self {
        match self {
            Waveform::Sine => Waveform::Square,
            Waveform::Square => Waveform::Sawtooth,
            Waveform::Sawtooth => Waveform::Triangle,
            Waveform::Triangle => Waveform::Sine,
        }
    }
}

pub struct OscillatorBlock {
    waveform: Waveform,
    phase: f32,
}

impl OscillatorBlock {
    pub fn new(waveform: Waveform) -> Self {
        Self {
            waveform,
            phase: 0.0,
        }
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    /// Produce one sample at `frequency` and advance the phase.
    #[inline]
    pub fn next_sample(&mut self, frequency: f32, sample_rate: f32) -> f32 {
        let out = self.waveform.at(self.phase);
        self.phase += frequency / sample_rate;
        // Negative frequencies (deep FM) run the phase backwards.
        self.phase -= self.phase.floor();
        out
    }

    /// Fill `buffer` at a constant frequency.
    pub fn render(&mut self, buffer: &mut [f32], frequency: f32, sample_rate: f32) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample(frequency, sample_rate);
        }
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_sine() {
        let sample_rate = 48_000.0;
        let frequency = 440.0;
        let mut osc = OscillatorBlock::new(Waveform::Sine);
        let mut buffer = vec![0.0f32; 128];
        osc.render(&mut buffer, frequency, sample_rate);

        // sample n should be sin(2pi f n / sr)
        let sample_index = 12;
        let expected = (TAU * frequency * sample_index as f32 / sample_rate).sin();
        let actual = buffer[sample_index];
        assert!(
            (actual - expected).abs() < 1e-4,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn shapes_stay_in_unit_range() {
        for waveform in Waveform::ALL {
            for i in 0..1000 {
                let value = waveform.at(i as f32 / 1000.0);
                assert!(
                    (-1.0..=1.0).contains(&value),
                    "{waveform:?} out of range at {i}: {value}"
                );
            }
        }
    }

    #[test]
    fn triangle_peaks_at_quarter_phase() {
        assert!((Waveform::Triangle.at(0.25) - 1.0).abs() < 1e-6);
        assert!((Waveform::Triangle.at(0.75) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn negative_frequency_keeps_phase_wrapped() {
        let mut osc = OscillatorBlock::new(Waveform::Sawtooth);
        for _ in 0..1000 {
            let sample = osc.next_sample(-3000.0, 48_000.0);
            assert!(sample.is_finite() && sample.abs() <= 1.0);
        }
    }
}
