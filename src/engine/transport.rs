/*
Transport
=========

Two states, Stopped and Playing. While playing, a tick fires every sixteenth
note:

    interval = 60 / bpm / 4   seconds       (120 bpm → 125 ms)

Odd steps are pushed late by the swing amount, a fixed 50 ms at 100%:

    step:      0     1       2     3
    ticks:     |     |       |     |
    plays:     |       |     |       |      (swing 50% → +25 ms on 1 and 3)

Every play() and stop() starts a new generation. Deferred work remembers the
generation it was scheduled in and is discarded if the transport has moved
on, so a stop always leaves the step counter at 0.
*/

use std::time::Duration;

use crate::log_recovery;

/// Delay applied to odd steps at 100% swing.
pub const MAX_SWING: Duration = Duration::from_millis(50);

/// Sixteenth-note tick interval at `bpm`.
pub fn tick_interval(bpm: f32) -> Duration {
    let seconds = 60.0 / bpm as f64 / 4.0;
    if seconds.is_finite() && seconds > 0.0 {
        Duration::from_secs_f64(seconds)
    } else {
        Duration::ZERO
    }
}

/// Swing offset for `step` at `amount` percent.
pub fn swing_delay(step: usize, amount: f32) -> Duration {
    if step % 2 == 0 || !amount.is_finite() {
        return Duration::ZERO;
    }
    MAX_SWING.mul_f64((amount / 100.0).clamp(0.0, 1.0) as f64)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportState {
    Stopped,
    Playing,
}

#[derive(Debug)]
pub struct Transport {
    state: TransportState,
    current_step: usize,
    generation: u64,
}

impl Transport {
    pub fn new() -> Self {
        Self {
            state: TransportState::Stopped,
            current_step: 0,
            generation: 0,
        }
    }

    pub fn state(&self) -> TransportState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == TransportState::Playing
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Start from step 0. Returns false (and changes nothing) if already playing.
    pub fn play(&mut self) -> bool {
        if self.is_playing() {
            return false;
        }
        self.state = TransportState::Playing;
        self.current_step = 0;
        self.generation += 1;
        true
    }

    pub fn stop(&mut self) {
        self.state = TransportState::Stopped;
        self.current_step = 0;
        self.generation += 1;
    }

    /// Pull an out-of-range step back to 0.
    pub fn sanitize(&mut self, steps: usize) {
        if self.current_step >= steps {
            log_recovery!("step index {} is outside [0, {steps}), restarting at 0", self.current_step);
            self.current_step = 0;
        }
    }

    /// Move to the next step. Returns true when the loop wrapped to 0.
    pub fn advance(&mut self, steps: usize) -> bool {
        self.current_step = (self.current_step + 1) % steps.max(1);
        self.current_step == 0
    }
}

impl Default for Transport {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_is_a_sixteenth() {
        assert_eq!(tick_interval(120.0), Duration::from_millis(125));
        assert_eq!(tick_interval(60.0), Duration::from_millis(250));
        assert_eq!(tick_interval(0.0), Duration::ZERO);
    }

    #[test]
    fn swing_only_delays_odd_steps() {
        assert_eq!(swing_delay(0, 100.0), Duration::ZERO);
        assert_eq!(swing_delay(1, 100.0), Duration::from_millis(50));
        assert_eq!(swing_delay(3, 50.0), Duration::from_millis(25));
        assert_eq!(swing_delay(5, 0.0), Duration::ZERO);
        assert_eq!(swing_delay(1, 400.0), Duration::from_millis(50));
    }

    #[test]
    fn play_is_idempotent_and_stop_resets() {
        let mut transport = Transport::new();
        assert!(transport.play());
        let generation = transport.generation();
        transport.advance(16);
        assert!(!transport.play());
        assert_eq!(transport.current_step(), 1);
        assert_eq!(transport.generation(), generation);

        transport.stop();
        assert_eq!(transport.current_step(), 0);
        assert_eq!(transport.state(), TransportState::Stopped);
        assert!(transport.generation() > generation);
    }

    #[test]
    fn advance_wraps_and_reports_it() {
        let mut transport = Transport::new();
        transport.play();
        let wraps = (0..32).filter(|_| transport.advance(16)).count();
        assert_eq!(wraps, 2);
        assert_eq!(transport.current_step(), 0);
    }

    #[test]
    fn out_of_range_step_is_reset() {
        let mut transport = Transport::new();
        transport.play();
        for _ in 0..10 {
            transport.advance(16);
        }
        transport.sanitize(8);
        assert_eq!(transport.current_step(), 0);
    }
}
