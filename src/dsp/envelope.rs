/*
Envelope Breakpoints
====================

Envelopes here are not running state machines. A voice knows its whole life
at the moment it is triggered (attack, decay, release, and when it stops), so
an envelope is computed once as a list of breakpoints and handed to an
`AutomationParam`, which evaluates it sample by sample on the render thread.

Vocabulary
----------

  breakpoint  (time, target, curve): reach `target` at `time` seconds after
              the trigger, travelling along `curve` from the previous point.

  curve       Set (jump), Linear (straight line) or Exponential (geometric).

  peak        The level reached at the end of the attack. For melody voices
              this is the melody volume.


Amplitude: Linear ADSR
----------------------

  Level
   peak ┐     ╱╲
        │    ╱  ╲
 peak·S │   ╱    ╲╲
        │  ╱        ╲╲
    0.0 └─╱────────────╲╲──→ Time
          A     D      R
          0     a     a+d   a+d+r

The sequencer has no note-off: every note is a fixed-length one-shot, so the
release starts right after the decay and the hold stage has zero length. Total
lifetime is exactly attack + decay + release.

    t = 0          set     0
    t = a          linear  peak
    t = a + d      linear  peak × sustain
    t = a + d + r  linear  0


Pitch and Filter: Exponential Sweeps
------------------------------------

We hear pitch logarithmically, so a pitch drop from 150 Hz to 50 Hz sounds
natural when each equal slice of time covers an equal musical interval. That
is an exponential ramp:

    f(t) = f0 · (f1 / f0) ^ (t / T)

An exponential ramp can never reach zero (0 / anything breaks the ratio), so
every exponential target is clamped to EXP_FLOOR (0.001). Ramping "to silence"
means ramping to -60 dB, which is inaudible.
*/

/// Smallest target an exponential ramp may aim for.
pub const EXP_FLOOR: f32 = 0.001;

/// Cutoff ceiling for the filter envelope.
pub const MAX_CUTOFF_HZ: f32 = 20_000.0;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Curve {
    Set,
    Linear,
    Exponential,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Breakpoint {
    /// Seconds after the trigger.
    pub time: f64,
    pub target: f32,
    pub curve: Curve,
}

impl Breakpoint {
    pub fn set(time: f64, target: f32) -> Self {
        Self {
            time,
            target,
            curve: Curve::Set,
        }
    }

    pub fn linear(time: f64, target: f32) -> Self {
        Self {
            time,
            target,
            curve: Curve::Linear,
        }
    }

    /// Exponential breakpoint with its target clamped to `EXP_FLOOR`.
    pub fn exponential(time: f64, target: f32) -> Self {
        Self {
            time,
            target: exp_target(target),
            curve: Curve::Exponential,
        }
    }

    pub fn with_curve(time: f64, target: f32, curve: Curve) -> Self {
        match curve {
            Curve::Set => Self::set(time, target),
            Curve::Linear => Self::linear(time, target),
            Curve::Exponential => Self::exponential(time, target),
        }
    }
}

#[inline]
pub fn exp_target(value: f32) -> f32 {
    if value.is_finite() {
        value.max(EXP_FLOOR)
    } else {
        EXP_FLOOR
    }
}

/// Attack/decay/release times in seconds, sustain as a 0..1 fraction of peak.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Adsr {
    pub attack: f32,
    pub decay: f32,
    pub sustain: f32,
    pub release: f32,
}

impl Adsr {
    pub fn new(attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        Self {
            attack: attack.max(0.0),
            decay: decay.max(0.0),
            sustain: sustain.clamp(0.0, 1.0),
            release: release.max(0.0),
        }
    }

    /// Total lifetime: attack + decay + release.
    pub fn lifetime(&self) -> f64 {
        self.attack as f64 + self.decay as f64 + self.release as f64
    }

    pub fn breakpoints(&self, peak: f32) -> [Breakpoint; 4] {
        adsr(self.attack, self.decay, self.sustain, self.release, peak)
    }
}

/// Linear amplitude envelope: 0 → peak → peak·sustain → 0.
pub fn adsr(attack: f32, decay: f32, sustain: f32, release: f32, peak: f32) -> [Breakpoint; 4] {
    let a = attack as f64;
    let d = decay as f64;
    let r = release as f64;
    [
        Breakpoint::set(0.0, 0.0),
        Breakpoint::linear(a, peak),
        Breakpoint::linear(a + d, peak * sustain),
        Breakpoint::linear(a + d + r, 0.0),
    ]
}

/// Filter cutoff envelope. Empty when `amount` (0..1) is not positive.
///
/// Opens linearly from `base` toward `min(base × 5, 20 kHz)` by `amount` over
/// the attack, then closes exponentially back to `base` by the voice end.
pub fn filter_sweep(base: f32, amount: f32, attack: f32, decay: f32, release: f32) -> Vec<Breakpoint> {
    if amount.is_nan() || amount <= 0.0 {
        return Vec::new();
    }
    let max = (base * 5.0).min(MAX_CUTOFF_HZ);
    let peak = base + (max - base) * amount;
    let a = attack as f64;
    let end = a + decay as f64 + release as f64;
    vec![
        Breakpoint::set(0.0, base),
        Breakpoint::linear(a, peak),
        Breakpoint::exponential(end, base),
    ]
}

/// Two-point sweep from `start` to `end` over `duration` seconds.
pub fn sweep(start: f32, end: f32, duration: f64, curve: Curve) -> [Breakpoint; 2] {
    [
        Breakpoint::set(0.0, start),
        Breakpoint::with_curve(duration, end, curve),
    ]
}

/// Multi-stage envelope: hold `start`, then visit each `(time, target)` along
/// `curve`.
pub fn stages(start: f32, points: &[(f64, f32)], curve: Curve) -> Vec<Breakpoint> {
    let mut out = Vec::with_capacity(points.len() + 1);
    out.push(Breakpoint::set(0.0, start));
    out.extend(
        points
            .iter()
            .map(|&(time, target)| Breakpoint::with_curve(time, target, curve)),
    );
    out
}
