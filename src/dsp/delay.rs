/// Longest delay the effect network supports, in seconds.
pub const MAX_DELAY_SECONDS: f32 = 2.0;

/// Ring-buffer delay line with fractional (linearly interpolated) reads.
pub struct DelayLine {
    buffer: Vec<f32>,
    write_pos: usize,
}

impl DelayLine {
    /// Allocate a line that can hold `max_seconds` at `sample_rate`.
    pub fn new(max_seconds: f32, sample_rate: f32) -> Self {
        let capacity = ((max_seconds * sample_rate).ceil() as usize).max(1) + 1;
        Self {
            buffer: vec![0.0; capacity],
            write_pos: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Read the sample written `delay_samples` ago (fractional).
    #[inline]
    pub fn read(&self, delay_samples: f32) -> f32 {
        let len = self.buffer.len();
        let delay = delay_samples.clamp(0.0, (len - 1) as f32);
        let whole = delay.floor() as usize;
        let frac = delay - whole as f32;

        // write_pos is the next slot to write, so the newest sample is one back.
        let newest = (self.write_pos + len - 1) % len;
        let a = self.buffer[(newest + len - whole) % len];
        let b = self.buffer[(newest + len - (whole + 1).min(len - 1)) % len];
        a + (b - a) * frac
    }

    #[inline]
    pub fn write(&mut self, sample: f32) {
        self.buffer[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % self.buffer.len();
    }

    /// Sum of squared samples currently held in the line.
    pub fn energy(&self) -> f32 {
        self.buffer.iter().map(|s| s * s).sum()
    }

    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }
}
