//! Time-ordered task queue for the control thread.
//!
//! The transport tick, swing-deferred steps and arpeggio notes are all
//! one-shot tasks keyed by control-clock time. Tasks due at the same instant
//! run in the order they were scheduled.

use std::{
    cmp::{Ordering, Reverse},
    collections::BinaryHeap,
    time::Duration,
};

struct Entry<T> {
    at: Duration,
    seq: u64,
    task: T,
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        (self.at, self.seq) == (other.at, other.seq)
    }
}

impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Entry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.at, self.seq).cmp(&(other.at, other.seq))
    }
}

pub struct Scheduler<T> {
    queue: BinaryHeap<Reverse<Entry<T>>>,
    next_seq: u64,
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            queue: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    pub fn schedule(&mut self, at: Duration, task: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Reverse(Entry { at, seq, task }));
    }

    /// Earliest task due at or before `now`, with its scheduled time.
    pub fn pop_due(&mut self, now: Duration) -> Option<(Duration, T)> {
        match self.queue.peek() {
            Some(Reverse(entry)) if entry.at <= now => {}
            _ => return None,
        }
        self.queue.pop().map(|Reverse(entry)| (entry.at, entry.task))
    }

    /// When the next task falls due.
    pub fn next_due(&self) -> Option<Duration> {
        self.queue.peek().map(|Reverse(entry)| entry.at)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Keep only the tasks `keep` approves of.
    pub fn retain(&mut self, mut keep: impl FnMut(&T) -> bool) {
        self.queue.retain(|Reverse(entry)| keep(&entry.task));
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn pops_in_time_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(ms(30), "c");
        scheduler.schedule(ms(10), "a");
        scheduler.schedule(ms(20), "b");

        assert_eq!(scheduler.next_due(), Some(ms(10)));
        assert_eq!(scheduler.pop_due(ms(5)), None);

        let due: Vec<_> = std::iter::from_fn(|| scheduler.pop_due(ms(25))).collect();
        assert_eq!(due, vec![(ms(10), "a"), (ms(20), "b")]);
        assert_eq!(scheduler.len(), 1);
    }

    #[test]
    fn ties_keep_schedule_order() {
        let mut scheduler = Scheduler::new();
        for name in ["first", "second", "third"] {
            scheduler.schedule(ms(10), name);
        }
        let due: Vec<_> = std::iter::from_fn(|| scheduler.pop_due(ms(10)).map(|(_, t)| t)).collect();
        assert_eq!(due, vec!["first", "second", "third"]);
    }

    #[test]
    fn retain_drops_rejected_tasks() {
        let mut scheduler = Scheduler::new();
        for n in 0..6 {
            scheduler.schedule(ms(n), n);
        }
        scheduler.retain(|&n| n % 2 == 0);
        assert_eq!(scheduler.len(), 3);
        scheduler.clear();
        assert!(scheduler.is_empty());
    }
}
