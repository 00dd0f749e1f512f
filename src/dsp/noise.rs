//! White noise tables.

use rand::Rng;

/// Generate `len` samples of uniform white noise in [-1, 1).
pub fn noise_table<R: Rng + ?Sized>(len: usize, rng: &mut R) -> Vec<f32> {
    (0..len).map(|_| rng.gen_range(-1.0f32..1.0)).collect()
}

/// Number of samples covering `seconds` at `sample_rate`.
pub fn samples_for(seconds: f32, sample_rate: f32) -> usize {
    (seconds * sample_rate).max(0.0) as usize
}
