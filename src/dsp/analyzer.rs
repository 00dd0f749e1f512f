//! Spectrum analyzer
//!
//! Byte-scaled magnitude spectrum of the most recent output, in the shape a
//! browser AnalyserNode reports: 2048-point FFT, Blackman window, 0.8
//! smoothing between snapshots, -100..-30 dB mapped onto 0..255.

use std::f32::consts::PI;
use std::sync::{
    atomic::{AtomicU32, AtomicU64, Ordering},
    Arc,
};

use rustfft::{num_complex::Complex, Fft, FftPlanner};

pub const FFT_SIZE: usize = 2048;
/// Number of bins in each snapshot.
pub const FREQUENCY_BIN_COUNT: usize = FFT_SIZE / 2;

const MIN_DECIBELS: f32 = -100.0;
const MAX_DECIBELS: f32 = -30.0;
const SMOOTHING: f32 = 0.8;

/// The last `FFT_SIZE` output samples, shared between the render thread
/// (single writer) and the analyzer.
///
/// The writer overwrites the oldest samples and never waits, so a reader that
/// falls behind always sees the newest audio. A read that races a write may
/// mix samples from two neighbouring blocks; for a display that is fine.
pub struct SampleTap {
    samples: Box<[AtomicU32]>,
    written: AtomicU64,
}

impl SampleTap {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            samples: (0..FFT_SIZE).map(|_| AtomicU32::new(0)).collect(),
            written: AtomicU64::new(0),
        })
    }

    /// Append a block. Render thread only.
    pub fn write(&self, block: &[f32]) {
        let mut position = self.written.load(Ordering::Relaxed);
        for &sample in block {
            self.samples[(position % FFT_SIZE as u64) as usize].store(sample.to_bits(), Ordering::Relaxed);
            position += 1;
        }
        self.written.store(position, Ordering::Release);
    }

    /// Copy the window into `out`, oldest first.
    fn read_into(&self, out: &mut [f32]) {
        let end = self.written.load(Ordering::Acquire);
        for (i, slot) in out.iter_mut().enumerate().take(FFT_SIZE) {
            let index = ((end + i as u64) % FFT_SIZE as u64) as usize;
            *slot = f32::from_bits(self.samples[index].load(Ordering::Relaxed));
        }
    }
}

/// FFT analyzer reading the render thread's output window.
pub struct SpectrumAnalyzer {
    tap: Arc<SampleTap>,
    history: Vec<f32>,
    window: Vec<f32>,
    fft: Arc<dyn Fft<f32>>,
    buffer: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    /// Smoothed linear magnitudes.
    smoothed: Vec<f32>,
}

impl SpectrumAnalyzer {
    pub fn new(tap: Arc<SampleTap>) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(FFT_SIZE);

        // Blackman window, alpha = 0.16
        let alpha = 0.16;
        let a0 = 0.5 * (1.0 - alpha);
        let a1 = 0.5;
        let a2 = 0.5 * alpha;
        let window = (0..FFT_SIZE)
            .map(|i| {
                let x = i as f32 / FFT_SIZE as f32;
                a0 - a1 * (2.0 * PI * x).cos() + a2 * (4.0 * PI * x).cos()
            })
            .collect();

        let scratch = vec![Complex::new(0.0, 0.0); fft.get_inplace_scratch_len()];

        Self {
            tap,
            history: vec![0.0; FFT_SIZE],
            window,
            fft,
            buffer: vec![Complex::new(0.0, 0.0); FFT_SIZE],
            scratch,
            smoothed: vec![0.0; FREQUENCY_BIN_COUNT],
        }
    }

    /// Take a snapshot of the most recent output: one byte per bin, 0 at
    /// -100 dB and 255 at -30 dB.
    pub fn frequency_data(&mut self) -> Vec<u8> {
        self.tap.read_into(&mut self.history);

        for (i, (slot, sample)) in self.buffer.iter_mut().zip(&self.history).enumerate() {
            *slot = Complex::new(sample * self.window[i], 0.0);
        }
        self.fft.process_with_scratch(&mut self.buffer, &mut self.scratch);

        let range = MAX_DECIBELS - MIN_DECIBELS;
        self.smoothed
            .iter_mut()
            .zip(&self.buffer)
            .map(|(smoothed, bin)| {
                let magnitude = bin.norm() / FFT_SIZE as f32;
                *smoothed = SMOOTHING * *smoothed + (1.0 - SMOOTHING) * magnitude;
                let db = if *smoothed > 0.0 {
                    20.0 * smoothed.log10()
                } else {
                    MIN_DECIBELS
                };
                (255.0 * (db - MIN_DECIBELS) / range).clamp(0.0, 255.0) as u8
            })
            .collect()
    }
}
