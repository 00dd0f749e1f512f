use std::f32::consts::PI;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
| type              | passes          | rejects      |
| ----------------- | --------------- | ------------ |
| low-pass          | below cutoff    | above cutoff |
| high-pass         | above cutoff    | below cutoff |
| band-pass         | around cutoff   | both sides   |
| notch / band-stop | outside         | around cutoff|

Resonance is expressed as Q. The SVF damping term is k = 1 / Q, so Q = 0.707
is a flat (Butterworth) response and larger Q narrows the band-pass and adds
a peak to the low/high-pass responses at cutoff.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FilterType {
    #[default]
    LowPass,
    HighPass,
    BandPass,
    Notch,
}

impl FilterType {
    pub fn next(self) -> Self {
        match self {
            FilterType::LowPass => FilterType::HighPass,
            FilterType::HighPass => FilterType::BandPass,
            FilterType::BandPass => FilterType::Notch,
            FilterType::Notch => FilterType::LowPass,
        }
    }
}

pub struct FilterOutputs {
    pub lowpass: f32,
    pub bandpass: f32,
    pub highpass: f32,
    pub notch: f32,
}

/// Smallest Q accepted; keeps k finite.
const MIN_Q: f32 = 0.0001;

pub struct SVFilter {
    ic1eq: f32, // First integrator's memory
    ic2eq: f32, // Second integrator's memory

    pub cutoff_hz: f32,
    pub q: f32,
    filter_type: FilterType,
}

impl SVFilter {
    pub fn new(filter_type: FilterType, cutoff_hz: f32, q: f32) -> Self {
        Self {
            ic1eq: 0.0,
            ic2eq: 0.0,
            cutoff_hz,
            q,
            filter_type,
        }
    }

    pub fn lowpass(cutoff_hz: f32) -> Self {
        Self::new(FilterType::LowPass, cutoff_hz, 1.0)
    }

    pub fn highpass(cutoff_hz: f32) -> Self {
        Self::new(FilterType::HighPass, cutoff_hz, 1.0)
    }

    pub fn bandpass(cutoff_hz: f32) -> Self {
        Self::new(FilterType::BandPass, cutoff_hz, 1.0)
    }

    pub fn filter_type(&self) -> FilterType {
        self.filter_type
    }

    /// TPT integrator gain for a cutoff, clamped below Nyquist.
    #[inline]
    pub fn compute_g(cutoff_hz: f32, sample_rate: f32) -> f32 {
        let nyquist_guard = sample_rate * 0.49;
        let cutoff = cutoff_hz.clamp(1.0, nyquist_guard);
        (PI * cutoff / sample_rate).tan()
    }

    #[inline]
    pub fn compute_k(q: f32) -> f32 {
        1.0 / q.max(MIN_Q)
    }

    pub fn next_sample(&mut self, sample: f32, k: f32, g: f32) -> FilterOutputs {
        let h = 1.0 / (1.0 + g * (g + k));
        let v3 = sample - self.ic2eq;
        let v1 = h * (self.ic1eq + g * v3);
        let v2 = self.ic2eq + g * v1;

        self.ic1eq = 2.0 * v1 - self.ic1eq;
        self.ic2eq = 2.0 * v2 - self.ic2eq;

        FilterOutputs {
            lowpass: v2,
            bandpass: v1,
            highpass: sample - k * v1 - v2,
            notch: sample - k * v1,
        }
    }

    /// Filter one sample with explicit coefficients (for swept cutoffs).
    #[inline]
    pub fn process(&mut self, sample: f32, k: f32, g: f32) -> f32 {
        let outputs = self.next_sample(sample, k, g);
        match self.filter_type {
            FilterType::LowPass => outputs.lowpass,
            FilterType::HighPass => outputs.highpass,
            // Constant 0 dB peak band-pass.
            FilterType::BandPass => outputs.bandpass * k,
            FilterType::Notch => outputs.notch,
        }
    }

    pub fn render(&mut self, buffer: &mut [f32], sample_rate: f32) {
        let g = Self::compute_g(self.cutoff_hz, sample_rate);
        let k = Self::compute_k(self.q);

        for sample in buffer.iter_mut() {
            *sample = self.process(*sample, k, g);
        }
    }

    pub fn reset(&mut self) {
        self.ic1eq = 0.0;
        self.ic2eq = 0.0;
    }

    pub fn set_cutoff(&mut self, cutoff: f32) {
        self.cutoff_hz = cutoff;
    }

    pub fn set_q(&mut self, q: f32) {
        self.q = q;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::oscillator::{OscillatorBlock, Waveform};

    const SAMPLE_RATE: f32 = 48_000.0;

    fn sine(freq: f32, len: usize) -> Vec<f32> {
        let mut osc = OscillatorBlock::new(Waveform::Sine);
        let mut buffer = vec![0.0f32; len];
        osc.render(&mut buffer, freq, SAMPLE_RATE);
        buffer
    }

    fn peak_after_transient(buffer: &[f32]) -> f32 {
        let skip = buffer.len().min(32);
        buffer
            .get(skip..)
            .unwrap_or(buffer)
            .iter()
            .fold(0.0f32, |acc, &x| acc.max(x.abs()))
    }

    #[test]
    fn test_lowpass_basic() {
        let mut filter = SVFilter::lowpass(500.0);
        let mut buffer = vec![1.0; 256];

        filter.render(&mut buffer, SAMPLE_RATE);

        assert!(buffer[255] > 0.99, "DC should pass, got {}", buffer[255]);
    }

    #[test]
    fn test_highpass_basic() {
        let mut filter = SVFilter::highpass(500.0);
        let mut buffer = vec![1.0; 512];

        filter.render(&mut buffer, SAMPLE_RATE);

        assert!(buffer[511].abs() < 0.001, "DC should be blocked, got {}", buffer[511]);
    }

    #[test]
    fn test_lowpass_filters_high_freq() {
        let mut filter = SVFilter::lowpass(500.0);
        let mut buffer = sine(5_000.0, 256);

        filter.render(&mut buffer, SAMPLE_RATE);

        let peak = peak_after_transient(&buffer);
        assert!(
            peak < 0.3,
            "Expected high freq attenuation, got peak: {}",
            peak
        );
    }

    #[test]
    fn test_bandpass_emphasizes_cutoff_frequency() {
        let mut filter = SVFilter::new(FilterType::BandPass, 1_000.0, 2.0);

        let mut pass = sine(1_000.0, 1024);
        filter.render(&mut pass, SAMPLE_RATE);
        let pass_peak = peak_after_transient(&pass);

        filter.reset();
        let mut off = sine(200.0, 1024);
        filter.render(&mut off, SAMPLE_RATE);
        let off_peak = peak_after_transient(&off);

        assert!(
            pass_peak > off_peak * 2.0,
            "expected bandpass to emphasize cutoff freq, got pass_peak={}, off_peak={}",
            pass_peak,
            off_peak
        );
    }

    #[test]
    fn test_notch_rejects_cutoff_frequency() {
        let mut filter = SVFilter::new(FilterType::Notch, 1_000.0, 2.0);

        let mut center = sine(1_000.0, 2048);
        filter.render(&mut center, SAMPLE_RATE);
        let center_peak = center[1024..].iter().fold(0.0f32, |a, &x| a.max(x.abs()));

        filter.reset();
        let mut off = sine(200.0, 2048);
        filter.render(&mut off, SAMPLE_RATE);
        let off_peak = off[1024..].iter().fold(0.0f32, |a, &x| a.max(x.abs()));

        assert!(
            center_peak * 2.0 < off_peak,
            "expected notch to reject center freq, got center_peak={}, off_peak={}",
            center_peak,
            off_peak
        );
    }

    #[test]
    fn higher_q_boosts_lowpass_at_cutoff() {
        let mut filter = SVFilter::new(FilterType::LowPass, 1_000.0, 0.5);
        let mut low_q = sine(1_000.0, 1024);
        filter.render(&mut low_q, SAMPLE_RATE);
        let peak_low_q = peak_after_transient(&low_q);

        let mut filter = SVFilter::new(FilterType::LowPass, 1_000.0, 4.0);
        let mut high_q = sine(1_000.0, 1024);
        filter.render(&mut high_q, SAMPLE_RATE);
        let peak_high_q = peak_after_transient(&high_q);

        assert!(
            peak_high_q > peak_low_q * 1.5,
            "High Q should boost signal: high_q={}, low_q={}",
            peak_high_q,
            peak_low_q
        );
    }

    #[test]
    fn cutoff_above_nyquist_stays_stable() {
        let mut filter = SVFilter::lowpass(40_000.0);
        let mut buffer = sine(440.0, 512);
        filter.render(&mut buffer, SAMPLE_RATE);
        assert!(buffer.iter().all(|s| s.is_finite()));
    }
}
