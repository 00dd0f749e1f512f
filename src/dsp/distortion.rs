//! Distortion / Waveshaping
//!
//! Distortion adds harmonics by reshaping the waveform through a transfer
//! curve. Here the curve is a lookup table sampled over the input range
//! [-1, 1]; inputs between table entries are linearly interpolated and inputs
//! outside the range clamp to the end entries.
//!
//! # The Shaping Curve
//!
//! The drum kits and the distortion send share one family of curves:
//!
//!   x    = 2i / N - 1                              (i in 0..N)
//!   f(x) = (3 + k) · x · 20° / (π + k · |x|)       (20° in radians)
//!
//! `k` is the drive. At k = 0 the curve is a straight line with slope 1/3;
//! larger k bends the ends over into a soft knee. The curve never reaches ±1,
//! so the shaper doubles as an attenuator.
//!
//! # Oversampling
//!
//! Shaping creates harmonics above the input's bandwidth, and anything past
//! Nyquist folds back as aliasing. The shaper runs at 4× the sample rate:
//! each input sample is linearly interpolated into four sub-samples, each is
//! shaped, and the four results are averaged back down to one.
//!
//! # Drive Values
//!
//!   0    = Clean (linear, -9.5 dB)
//!   1    = Distortion send at 100%
//!   10   = Digital drum kit crunch

use std::f32::consts::PI;
use std::sync::Arc;

/// Entries in every generated shaping curve.
pub const CURVE_SAMPLES: usize = 44_100;

const OVERSAMPLE: usize = 4;

/// Sample the shaping family for drive `k` at `len` points.
pub fn shaping_curve(k: f32, len: usize) -> Vec<f32> {
    let deg = PI / 180.0;
    let n = len as f32;
    (0..len)
        .map(|i| {
            let x = i as f32 * 2.0 / n - 1.0;
            (3.0 + k) * x * 20.0 * deg / (PI + k * x.abs())
        })
        .collect()
}

/// Curve for the distortion send. `amount` is a 0..100 percentage.
pub fn distortion_curve(amount: f32) -> Arc<[f32]> {
    let k = if amount.is_finite() {
        (amount / 100.0).clamp(0.0, 1.0)
    } else {
        0.0
    };
    shaping_curve(k, CURVE_SAMPLES).into()
}

/// `clamp(x · drive, ±ceiling)` sampled over [-1, 1].
pub fn hard_clip_curve(drive: f32, ceiling: f32, len: usize) -> Arc<[f32]> {
    let n = len as f32;
    (0..len)
        .map(|i| {
            let x = i as f32 * 2.0 / n - 1.0;
            (x * drive).clamp(-ceiling, ceiling)
        })
        .collect::<Vec<_>>()
        .into()
}

/// Table-lookup waveshaper with 4× oversampling.
///
/// The curve is shared: the control thread builds it once and hands the same
/// `Arc` to every voice or stage that uses it.
pub struct Waveshaper {
    curve: Arc<[f32]>,
    previous: f32,
}

impl Waveshaper {
    pub fn new(curve: Arc<[f32]>) -> Self {
        Self {
            curve,
            previous: 0.0,
        }
    }

    /// Swap the curve and return the old one. Takes effect on the next sample.
    pub fn set_curve(&mut self, curve: Arc<[f32]>) -> Arc<[f32]> {
        std::mem::replace(&mut self.curve, curve)
    }

    pub fn curve(&self) -> &Arc<[f32]> {
        &self.curve
    }

    /// Look up `x` on the curve with linear interpolation.
    #[inline]
    pub fn shape(&self, x: f32) -> f32 {
        let len = self.curve.len();
        match len {
            0 => x,
            1 => self.curve[0],
            _ => {
                let position = ((x + 1.0) * 0.5 * (len - 1) as f32).clamp(0.0, (len - 1) as f32);
                let index = position.floor() as usize;
                let frac = position - index as f32;
                let a = self.curve[index];
                let b = self.curve[(index + 1).min(len - 1)];
                a + (b - a) * frac
            }
        }
    }

    #[inline]
    pub fn process(&mut self, sample: f32) -> f32 {
        if !sample.is_finite() {
            return 0.0;
        }
        let mut acc = 0.0;
        for step in 1..=OVERSAMPLE {
            let t = step as f32 / OVERSAMPLE as f32;
            let sub = self.previous + (sample - self.previous) * t;
            acc += self.shape(sub);
        }
        self.previous = sample;
        acc / OVERSAMPLE as f32
    }

    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    pub fn reset(&mut self) {
        self.previous = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_drive_curve_is_linear() {
        let curve = shaping_curve(0.0, 1001);
        // f(x) = x / 3 at k = 0.
        for (i, &value) in curve.iter().enumerate().step_by(100) {
            let x = i as f32 * 2.0 / 1001.0 - 1.0;
            assert!((value - x / 3.0).abs() < 1e-5, "index {i}: {value}");
        }
    }

    #[test]
    fn curve_is_odd_and_bounded() {
        let curve = shaping_curve(10.0, CURVE_SAMPLES);
        assert!(curve.iter().all(|v| v.abs() < 1.0));
        assert!(curve[0] < 0.0);
        assert!(curve[CURVE_SAMPLES - 1] > 0.0);
        // x = 0 lands exactly on index N/2.
        assert!(curve[CURVE_SAMPLES / 2].abs() < 1e-6);
    }

    #[test]
    fn distortion_amount_is_clamped() {
        let loud = distortion_curve(500.0);
        let full = distortion_curve(100.0);
        assert_eq!(&loud[..], &full[..]);

        let nan = distortion_curve(f32::NAN);
        let clean = distortion_curve(0.0);
        assert_eq!(&nan[..], &clean[..]);
    }

    #[test]
    fn hard_clip_curve_saturates_at_ceiling() {
        let curve = hard_clip_curve(3.0, 0.8, 1000);
        assert_eq!(curve[0], -0.8);
        assert_eq!(curve[999], 0.8);
        let shaper = Waveshaper::new(curve);
        assert!((shaper.shape(0.1) - 0.3).abs() < 0.01);
    }

    #[test]
    fn shape_clamps_out_of_range_input() {
        let shaper = Waveshaper::new(hard_clip_curve(1.0, 1.0, 101));
        assert!((shaper.shape(5.0) - shaper.shape(1.0)).abs() < 1e-6);
        assert!((shaper.shape(-5.0) - shaper.shape(-1.0)).abs() < 1e-6);
    }

    #[test]
    fn oversampled_dc_settles_on_curve_value() {
        let mut shaper = Waveshaper::new(distortion_curve(50.0));
        let mut last = 0.0;
        for _ in 0..8 {
            last = shaper.process(0.5);
        }
        assert!((last - shaper.shape(0.5)).abs() < 1e-6);
    }

    #[test]
    fn non_finite_input_is_silenced() {
        let mut shaper = Waveshaper::new(distortion_curve(10.0));
        assert_eq!(shaper.process(f32::NAN), 0.0);
        assert!(shaper.process(0.2).is_finite());
    }
}
