//! Reverb - Convolution with a Synthesized Room
//!
//! A room's sound is fully described by its impulse response: what comes out
//! when a single click goes in. Convolving any signal with that response
//! places the signal in the room. Here the "room" is procedurally generated
//! decaying noise, so there is no sample data to load.
//!
//! # Impulse
//!
//! ```text
//! size   s in [0, 1]          (percent / 100)
//! length sr × (0.5 + 3s)      samples
//! decay  0.5 + 5s
//! h[i]   noise[i] × (1 - i/length)^decay
//! ```
//!
//! Bigger rooms ring longer and their tails fall away more steeply at the
//! end, so the overall level stays reasonable. The impulse is then power
//! normalized: scaled so its RMS matches a fixed calibration, the same as a
//! browser `ConvolverNode` with `normalize = true`.
//!
//! # Uniform Partitioned Convolution
//!
//! Direct convolution with a multi-second response costs tens of thousands of
//! multiplies per sample. Instead the response is cut into partitions of
//! `PARTITION` samples, each transformed once with a 2·PARTITION FFT:
//!
//! ```text
//! h = [h0 | h1 | h2 | ... | hK-1]        H_k = FFT(h_k zero-padded)
//! ```
//!
//! Every PARTITION input samples, the last 2·PARTITION inputs are transformed
//! (overlap-save) into X, pushed into a history of past spectra, and
//!
//! ```text
//! Y = Σ_k X[now - k] · H_k
//! y = IFFT(Y), keep the last PARTITION samples
//! ```
//!
//! The output lags the input by one partition (512 samples, ~11 ms at 48 kHz).
//! All buffers and FFT plans are created up front, so the render thread only
//! does arithmetic.

use std::sync::Arc;

use rand::Rng;
use rustfft::{num_complex::Complex, Fft, FftPlanner};

/// Samples per partition; also the convolver latency.
pub const PARTITION: usize = 512;
const FFT_SIZE: usize = PARTITION * 2;

/// RMS floor used by power normalization.
const MIN_POWER: f32 = 0.000125;
/// Target level after normalization.
const GAIN_CALIBRATION: f32 = 0.00125;
const GAIN_CALIBRATION_SAMPLE_RATE: f32 = 44_100.0;

/// Decaying-noise room response for a 0..100 `size`.
pub fn reverb_impulse<R: Rng + ?Sized>(size: f32, sample_rate: f32, rng: &mut R) -> Vec<f32> {
    let s = if size.is_finite() {
        (size / 100.0).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let length = ((sample_rate * (0.5 + s * 3.0)) as usize).max(1);
    let decay = 0.5 + s * 5.0;

    (0..length)
        .map(|i| {
            let noise: f32 = rng.gen_range(-1.0..1.0);
            noise * (1.0 - i as f32 / length as f32).powf(decay)
        })
        .collect()
}

/// Gain that brings `impulse` to the calibrated RMS level.
pub fn normalization_scale(impulse: &[f32], sample_rate: f32) -> f32 {
    if impulse.is_empty() {
        return 1.0;
    }
    let power = (impulse.iter().map(|x| x * x).sum::<f32>() / impulse.len() as f32).sqrt();
    let power = if power.is_finite() && power >= MIN_POWER {
        power
    } else {
        MIN_POWER
    };
    (1.0 / power) * GAIN_CALIBRATION * GAIN_CALIBRATION_SAMPLE_RATE / sample_rate
}

/// Frequency-domain partitions of an impulse response plus the FFT plans that
/// produced them.
pub struct ConvolutionKernel {
    partitions: Vec<Vec<Complex<f32>>>,
    forward: Arc<dyn Fft<f32>>,
    inverse: Arc<dyn Fft<f32>>,
}

impl ConvolutionKernel {
    /// Transform `impulse` as-is.
    pub fn new(impulse: &[f32]) -> Self {
        let mut planner = FftPlanner::new();
        let forward = planner.plan_fft_forward(FFT_SIZE);
        let inverse = planner.plan_fft_inverse(FFT_SIZE);
        let mut scratch = vec![Complex::new(0.0, 0.0); forward.get_inplace_scratch_len()];

        let partitions = impulse
            .chunks(PARTITION)
            .map(|chunk| {
                let mut spectrum = vec![Complex::new(0.0, 0.0); FFT_SIZE];
                for (bin, &sample) in spectrum.iter_mut().zip(chunk) {
                    bin.re = sample;
                }
                forward.process_with_scratch(&mut spectrum, &mut scratch);
                spectrum
            })
            .collect();

        Self {
            partitions,
            forward,
            inverse,
        }
    }

    /// Power-normalize `impulse` before transforming it.
    pub fn normalized(impulse: &[f32], sample_rate: f32) -> Self {
        let scale = normalization_scale(impulse, sample_rate);
        let scaled: Vec<f32> = impulse.iter().map(|x| x * scale).collect();
        Self::new(&scaled)
    }

    pub fn partition_count(&self) -> usize {
        self.partitions.len()
    }
}

/// Streaming overlap-save convolver.
pub struct Convolver {
    kernel: ConvolutionKernel,
    /// Past input spectra, newest at `head`.
    history: Vec<Vec<Complex<f32>>>,
    head: usize,
    /// Previous and current input partitions, back to back.
    input: Vec<f32>,
    output: Vec<f32>,
    position: usize,
    work: Vec<Complex<f32>>,
    accumulator: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
}

impl Convolver {
    pub fn new(kernel: ConvolutionKernel) -> Self {
        let count = kernel.partition_count().max(1);
        let scratch_len = kernel
            .forward
            .get_inplace_scratch_len()
            .max(kernel.inverse.get_inplace_scratch_len());
        Self {
            history: vec![vec![Complex::new(0.0, 0.0); FFT_SIZE]; count],
            head: 0,
            input: vec![0.0; FFT_SIZE],
            output: vec![0.0; PARTITION],
            position: 0,
            work: vec![Complex::new(0.0, 0.0); FFT_SIZE],
            accumulator: vec![Complex::new(0.0, 0.0); FFT_SIZE],
            scratch: vec![Complex::new(0.0, 0.0); scratch_len],
            kernel,
        }
    }

    /// Build from a raw room response, power-normalized for `sample_rate`.
    pub fn from_impulse(impulse: &[f32], sample_rate: f32) -> Self {
        Self::new(ConvolutionKernel::normalized(impulse, sample_rate))
    }

    pub fn latency(&self) -> usize {
        PARTITION
    }

    #[inline]
    pub fn process(&mut self, sample: f32) -> f32 {
        let out = self.output[self.position];
        self.input[PARTITION + self.position] = sample;
        self.position += 1;
        if self.position == PARTITION {
            self.position = 0;
            self.convolve_block();
        }
        out
    }

    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    fn convolve_block(&mut self) {
        let count = self.history.len();
        self.head = (self.head + 1) % count;

        let spectrum = &mut self.history[self.head];
        for (bin, &sample) in spectrum.iter_mut().zip(self.input.iter()) {
            *bin = Complex::new(sample, 0.0);
        }
        self.kernel
            .forward
            .process_with_scratch(spectrum, &mut self.scratch);

        self.accumulator.fill(Complex::new(0.0, 0.0));
        for (k, partition) in self.kernel.partitions.iter().enumerate() {
            let past = &self.history[(self.head + count - k) % count];
            for ((acc, x), h) in self.accumulator.iter_mut().zip(past).zip(partition) {
                *acc += x * h;
            }
        }

        self.work.copy_from_slice(&self.accumulator);
        self.kernel
            .inverse
            .process_with_scratch(&mut self.work, &mut self.scratch);

        // rustfft leaves the inverse unscaled.
        let scale = 1.0 / FFT_SIZE as f32;
        for (out, bin) in self.output.iter_mut().zip(&self.work[PARTITION..]) {
            *out = bin.re * scale;
        }

        self.input.copy_within(PARTITION.., 0);
    }

    pub fn reset(&mut self) {
        for spectrum in &mut self.history {
            spectrum.fill(Complex::new(0.0, 0.0));
        }
        self.input.fill(0.0);
        self.output.fill(0.0);
        self.position = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    const SAMPLE_RATE: f32 = 48_000.0;

    #[test]
    fn impulse_length_and_decay_follow_size() {
        let mut rng = StdRng::seed_from_u64(1);
        let small = reverb_impulse(0.0, SAMPLE_RATE, &mut rng);
        let large = reverb_impulse(100.0, SAMPLE_RATE, &mut rng);

        assert_eq!(small.len(), 24_000);
        assert_eq!(large.len(), 168_000);
        assert!(large.iter().all(|x| x.abs() < 1.0));

        // The tail envelope (1 - i/len)^5.5 is tiny near the end.
        let tail = &large[large.len() - 1000..];
        assert!(tail.iter().all(|x| x.abs() < 1e-8));
    }

    #[test]
    fn normalization_hits_calibrated_rms() {
        let impulse = vec![0.5f32; 1000];
        let scale = normalization_scale(&impulse, 44_100.0);
        let rms = 0.5 * scale;
        assert!((rms - GAIN_CALIBRATION).abs() < 1e-7, "rms {rms}");
    }

    #[test]
    fn silent_impulse_uses_power_floor() {
        let scale = normalization_scale(&[0.0; 64], 44_100.0);
        assert!((scale - GAIN_CALIBRATION / MIN_POWER).abs() < 1e-3);
    }

    #[test]
    fn unit_impulse_is_a_pure_delay() {
        let mut convolver = Convolver::new(ConvolutionKernel::new(&[1.0]));
        let mut buffer = vec![0.0f32; PARTITION * 3];
        buffer[10] = 1.0;
        convolver.render(&mut buffer);

        let peak_index = buffer
            .iter()
            .enumerate()
            .fold((0, 0.0f32), |(bi, bv), (i, &v)| if v.abs() > bv { (i, v.abs()) } else { (bi, bv) })
            .0;
        assert_eq!(peak_index, 10 + PARTITION);
        assert!((buffer[10 + PARTITION] - 1.0).abs() < 1e-4);
    }

    #[test]
    fn matches_direct_convolution_across_partitions() {
        let mut rng = StdRng::seed_from_u64(3);
        let impulse: Vec<f32> = (0..1300).map(|_| rng.gen_range(-1.0..1.0)).collect();
        let input: Vec<f32> = (0..PARTITION * 5).map(|_| rng.gen_range(-1.0..1.0)).collect();

        let mut convolver = Convolver::new(ConvolutionKernel::new(&impulse));
        let mut output = input.clone();
        convolver.render(&mut output);

        for n in (PARTITION..input.len()).step_by(97) {
            let m = n - PARTITION;
            let direct: f32 = (0..=m.min(impulse.len() - 1))
                .map(|k| impulse[k] * input[m - k])
                .sum();
            assert!(
                (output[n] - direct).abs() < 1e-2,
                "sample {n}: fft {} vs direct {direct}",
                output[n]
            );
        }
    }
}
