//! Buffer summing and gain helpers used by the mixing bus.

/*
Mixing is addition. Every voice renders into its own scratch block and is
added onto the bus; each effect return is added the same way, scaled by its
send gain.

    bus[n] = Σ voice_i[n]              (dry)
    bus[n] += Σ return_e[n]            (wet)

Sums of full-scale signals can exceed ±1. The master gain and compressor pull
the level back down, and `clip` is the final ceiling before the device.
*/

/// Add `b` into `a`.
#[inline]
pub fn sum_in_place(a: &mut [f32], b: &[f32]) {
    debug_assert_eq!(a.len(), b.len());

    for (sa, &sb) in a.iter_mut().zip(b.iter()) {
        *sa += sb;
    }
}

/// Add `b × gain` into `a`. Skips the work entirely at zero gain.
#[inline]
pub fn sum_scaled(a: &mut [f32], b: &[f32], gain: f32) {
    debug_assert_eq!(a.len(), b.len());
    if gain == 0.0 {
        return;
    }
    for (sa, &sb) in a.iter_mut().zip(b.iter()) {
        *sa += sb * gain;
    }
}

#[inline]
pub fn apply_gain(buffer: &mut [f32], gain: f32) {
    for sample in buffer.iter_mut() {
        *sample *= gain;
    }
}

/// Clamp to ±1, replacing non-finite samples with silence.
#[inline]
pub fn clip(buffer: &mut [f32]) {
    for sample in buffer.iter_mut() {
        *sample = if sample.is_finite() {
            sample.clamp(-1.0, 1.0)
        } else {
            0.0
        };
    }
}
