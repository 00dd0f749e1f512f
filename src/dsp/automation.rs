use crate::dsp::envelope::{Breakpoint, Curve};

/*
Time-Stamped Parameter Automation
=================================

An automation parameter is a value that follows a timeline of events. Each
event says "reach this value at this absolute time" and how to get there:

  Set          jump to the value at the event time and hold it
  Linear       ramp in a straight line from the previous event to this one
  Exponential  ramp geometrically from the previous event to this one

    value
      │            ╱‾‾‾‾‾╲
      │           ╱       ╲___
      │  ────────╱            ‾‾‾‾‾‾‾───────
      └───────────────────────────────────→ time
       set      linear  linear    exp

Evaluating at time t:

  - find the last event at or before t (prev) and the first event after t (next)
  - if next is a ramp, interpolate from (prev.time, prev.value) to
    (next.time, next.value)
  - otherwise hold prev.value (or the default before the first event)

Exponential interpolation is

    v(t) = v0 · (v1 / v0) ^ ((t - t0) / (t1 - t0))

which only makes sense when v0 and v1 are non-zero with the same sign. In every
other case the value holds at v0 until the ramp ends. Envelope helpers clamp
exponential targets to a small positive floor so this never bites in practice.

Times are absolute seconds on the audio clock. Rendering queries move forward
in time, so a cursor makes lookups O(1) amortised.
*/

#[derive(Debug, Clone, Copy, PartialEq)]
struct Event {
    time: f64,
    value: f32,
    curve: Curve,
}

#[derive(Debug, Clone)]
pub struct AutomationParam {
    default: f32,
    events: Vec<Event>,
    /// Index of the first event strictly after the last query time.
    cursor: usize,
    last_query: f64,
}

impl AutomationParam {
    pub fn new(default: f32) -> Self {
        Self {
            default,
            events: Vec::new(),
            cursor: 0,
            last_query: f64::NEG_INFINITY,
        }
    }

    /// A param that already holds `value` from time zero.
    pub fn constant(value: f32) -> Self {
        let mut param = Self::new(value);
        param.set_value_at_time(value, 0.0);
        param
    }

    /// A param that follows `breakpoints`, offset to absolute time `start`.
    /// Before the first breakpoint it holds the first target.
    pub fn from_breakpoints(breakpoints: &[Breakpoint], start: f64) -> Self {
        let default = breakpoints.first().map_or(0.0, |bp| bp.target);
        let mut param = Self::new(default);
        param.apply(breakpoints, start);
        param
    }

    fn insert(&mut self, event: Event) {
        let index = self.events.partition_point(|e| e.time <= event.time);
        self.events.insert(index, event);
        self.cursor = 0;
        self.last_query = f64::NEG_INFINITY;
    }

    pub fn set_value_at_time(&mut self, value: f32, time: f64) {
        self.insert(Event {
            time,
            value,
            curve: Curve::Set,
        });
    }

    pub fn linear_ramp_to_value_at_time(&mut self, value: f32, time: f64) {
        self.insert(Event {
            time,
            value,
            curve: Curve::Linear,
        });
    }

    pub fn exponential_ramp_to_value_at_time(&mut self, value: f32, time: f64) {
        self.insert(Event {
            time,
            value,
            curve: Curve::Exponential,
        });
    }

    /// Schedule breakpoints whose times are offsets from `start`.
    pub fn apply(&mut self, breakpoints: &[Breakpoint], start: f64) {
        for bp in breakpoints {
            self.insert(Event {
                time: start + bp.time,
                value: bp.target,
                curve: bp.curve,
            });
        }
    }

    /// Time of the last scheduled event, if any.
    pub fn end_time(&self) -> Option<f64> {
        self.events.last().map(|e| e.time)
    }

    /// Drop events that can no longer influence values at or after `time`.
    ///
    /// Keeps the event in effect at `time` so ramps that start from it stay
    /// anchored.
    pub fn prune_before(&mut self, time: f64) {
        let in_effect = self.events.partition_point(|e| e.time <= time);
        if in_effect >= 2 {
            self.events.drain(..in_effect - 1);
            self.cursor = 0;
            self.last_query = f64::NEG_INFINITY;
        }
    }

    pub fn value_at(&mut self, time: f64) -> f32 {
        if time < self.last_query {
            self.cursor = 0;
        }
        self.last_query = time;

        while self.cursor < self.events.len() && self.events[self.cursor].time <= time {
            self.cursor += 1;
        }

        let prev = self.cursor.checked_sub(1).map(|i| self.events[i]);
        let next = self.events.get(self.cursor);

        let Some(prev) = prev else {
            return self.default;
        };

        match next {
            Some(next) if next.curve == Curve::Linear => {
                let progress = ((time - prev.time) / (next.time - prev.time)) as f32;
                prev.value + (next.value - prev.value) * progress
            }
            Some(next) if next.curve == Curve::Exponential => {
                let same_sign = prev.value * next.value > 0.0;
                if !same_sign {
                    return prev.value;
                }
                let progress = ((time - prev.time) / (next.time - prev.time)) as f32;
                prev.value * (next.value / prev.value).powf(progress)
            }
            _ => prev.value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32, tol: f32) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn default_holds_before_first_event() {
        let mut param = AutomationParam::new(0.25);
        param.set_value_at_time(1.0, 1.0);
        assert_eq!(param.value_at(0.5), 0.25);
        assert_eq!(param.value_at(1.0), 1.0);
        assert_eq!(param.value_at(5.0), 1.0);
    }

    #[test]
    fn linear_ramp_interpolates_from_previous_event() {
        let mut param = AutomationParam::new(0.0);
        param.set_value_at_time(0.0, 0.0);
        param.linear_ramp_to_value_at_time(1.0, 1.0);

        assert!(approx(param.value_at(0.25), 0.25, 1e-6));
        assert!(approx(param.value_at(0.5), 0.5, 1e-6));
        assert_eq!(param.value_at(1.0), 1.0);
        assert_eq!(param.value_at(2.0), 1.0);
    }

    #[test]
    fn exponential_ramp_is_geometric() {
        let mut param = AutomationParam::new(0.0);
        param.set_value_at_time(100.0, 0.0);
        param.exponential_ramp_to_value_at_time(1.0, 2.0);

        // Halfway in time is the geometric mean.
        let mid = param.value_at(1.0);
        assert!(approx(mid, 10.0, 1e-3), "expected 10.0, got {mid}");
    }

    #[test]
    fn exponential_ramp_to_zero_holds() {
        let mut param = AutomationParam::new(0.0);
        param.set_value_at_time(1.0, 0.0);
        param.exponential_ramp_to_value_at_time(0.0, 1.0);

        assert_eq!(param.value_at(0.5), 1.0);
        assert_eq!(param.value_at(1.5), 0.0);
    }

    #[test]
    fn out_of_order_queries_reset_cursor() {
        let mut param = AutomationParam::new(0.0);
        param.set_value_at_time(0.0, 0.0);
        param.linear_ramp_to_value_at_time(10.0, 10.0);

        assert!(approx(param.value_at(8.0), 8.0, 1e-5));
        assert!(approx(param.value_at(2.0), 2.0, 1e-5));
    }

    #[test]
    fn prune_keeps_event_in_effect() {
        let mut param = AutomationParam::new(0.0);
        param.set_value_at_time(0.2, 0.0);
        param.set_value_at_time(0.4, 1.0);
        param.set_value_at_time(0.6, 2.0);
        param.linear_ramp_to_value_at_time(1.0, 4.0);

        param.prune_before(2.5);
        assert!(approx(param.value_at(3.0), 0.8, 1e-5));
        assert_eq!(param.end_time(), Some(4.0));
    }

    #[test]
    fn same_time_events_apply_in_insertion_order() {
        let mut param = AutomationParam::new(0.0);
        param.set_value_at_time(0.5, 1.0);
        param.set_value_at_time(0.9, 1.0);
        assert_eq!(param.value_at(1.0), 0.9);
    }
}
