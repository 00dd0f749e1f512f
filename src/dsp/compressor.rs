//! Soft-knee dynamics compressor.

/*
Dynamics Compression
====================

A compressor turns loud passages down. Below the threshold the signal passes
unchanged; above it, every `ratio` dB of input produces only 1 dB of output.

    out dB
      │                 ____----  slope 1/ratio
      │             _--‾
      │          _-‾   ← knee (quadratic blend)
      │        ╱
      │      ╱  slope 1
      └──────────────────→ in dB
             T-W/2  T  T+W/2

Static curve, with x the input level in dB, T threshold, W knee width, R ratio:

    2(x - T) < -W      y = x
    |2(x - T)| <= W    y = x + (1/R - 1)(x - T + W/2)² / (2W)
    2(x - T) > W       y = T + (x - T) / R

Gain reduction g = y - x is smoothed with one-pole filters: `attack` governs
how fast reduction increases, `release` how fast it lets go. A fixed makeup
gain (60 % of the reduction a full-scale signal would get) restores loudness,
as a browser DynamicsCompressorNode does.
*/

use crate::config::CompressorConfig;

const MIN_LEVEL_DB: f32 = -120.0;

#[inline]
fn to_db(gain: f32) -> f32 {
    if gain <= 0.0 {
        MIN_LEVEL_DB
    } else {
        (20.0 * gain.log10()).max(MIN_LEVEL_DB)
    }
}

#[inline]
fn from_db(db: f32) -> f32 {
    10f32.powf(db / 20.0)
}

/// One-pole coefficient for a time constant in seconds.
#[inline]
fn coefficient(seconds: f32, sample_rate: f32) -> f32 {
    if seconds <= 0.0 {
        0.0
    } else {
        (-1.0 / (seconds * sample_rate)).exp()
    }
}

pub struct Compressor {
    threshold_db: f32,
    knee_db: f32,
    ratio: f32,
    attack_coeff: f32,
    release_coeff: f32,
    makeup: f32,
    /// Current smoothed gain reduction in dB (always <= 0).
    reduction_db: f32,
    sample_rate: f32,
}

impl Compressor {
    pub fn new(config: &CompressorConfig, sample_rate: f32) -> Self {
        let mut compressor = Self {
            threshold_db: 0.0,
            knee_db: 0.0,
            ratio: 1.0,
            attack_coeff: 0.0,
            release_coeff: 0.0,
            makeup: 1.0,
            reduction_db: 0.0,
            sample_rate,
        };
        compressor.configure(config);
        compressor
    }

    /// Apply new settings without resetting the current gain reduction.
    pub fn configure(&mut self, config: &CompressorConfig) {
        self.threshold_db = config.threshold_db;
        self.knee_db = config.knee_db.max(0.0);
        self.ratio = config.ratio.max(1.0);
        self.attack_coeff = coefficient(config.attack, self.sample_rate);
        self.release_coeff = coefficient(config.release, self.sample_rate);
        self.makeup = from_db(-0.6 * self.static_gain_db(0.0));
    }

    /// Static curve gain (<= 0 dB) for an input level in dB.
    pub fn static_gain_db(&self, level_db: f32) -> f32 {
        let over = level_db - self.threshold_db;
        let width = self.knee_db;
        let slope = 1.0 / self.ratio - 1.0;

        if 2.0 * over < -width {
            0.0
        } else if width > 0.0 && (2.0 * over).abs() <= width {
            let x = over + width / 2.0;
            slope * x * x / (2.0 * width)
        } else {
            slope * over
        }
    }

    pub fn reduction_db(&self) -> f32 {
        self.reduction_db
    }

    #[inline]
    pub fn process(&mut self, sample: f32) -> f32 {
        let target = self.static_gain_db(to_db(sample.abs()));
        let coeff = if target < self.reduction_db {
            self.attack_coeff
        } else {
            self.release_coeff
        };
        self.reduction_db = target + (self.reduction_db - target) * coeff;
        sample * from_db(self.reduction_db) * self.makeup
    }

    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    pub fn reset(&mut self) {
        self.reduction_db = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compressor() -> Compressor {
        Compressor::new(&CompressorConfig::default(), 48_000.0)
    }

    #[test]
    fn quiet_signal_below_knee_is_untouched() {
        let comp = compressor();
        // Knee starts at -24 - 15 = -39 dB.
        assert_eq!(comp.static_gain_db(-60.0), 0.0);
        assert_eq!(comp.static_gain_db(-40.0), 0.0);
    }

    #[test]
    fn above_knee_follows_ratio() {
        let comp = compressor();
        // -6 dB is 18 dB over: output -24 + 18/12 = -22.5, gain -16.5.
        let gain = comp.static_gain_db(-6.0);
        assert!((gain + 16.5).abs() < 1e-4, "gain {gain}");
    }

    #[test]
    fn knee_is_continuous() {
        let comp = compressor();
        let edge = -24.0 + 15.0;
        let inside = comp.static_gain_db(edge - 1e-3);
        let outside = comp.static_gain_db(edge + 1e-3);
        assert!((inside - outside).abs() < 1e-2, "{inside} vs {outside}");
    }

    #[test]
    fn loud_signal_is_reduced_after_attack() {
        let mut comp = compressor();
        let mut last = 0.0;
        for _ in 0..4800 {
            last = comp.process(0.9);
        }
        assert!(comp.reduction_db() < -10.0);
        assert!(last < 0.9, "expected compression, got {last}");
    }

    #[test]
    fn reduction_recovers_on_silence() {
        let mut comp = compressor();
        for _ in 0..4800 {
            comp.process(0.9);
        }
        for _ in 0..48_000 {
            comp.process(0.0);
        }
        assert!(comp.reduction_db() > -0.5);
    }

    #[test]
    fn ratio_one_is_transparent_apart_from_makeup() {
        let config = CompressorConfig {
            ratio: 1.0,
            ..CompressorConfig::default()
        };
        let mut comp = Compressor::new(&config, 48_000.0);
        assert!((comp.process(0.5) - 0.5).abs() < 1e-6);
    }
}
