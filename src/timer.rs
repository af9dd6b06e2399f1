//! One-shot timers measured from session start
//!
//! The render loop polls the queue at the top of every frame, so a timer
//! callback never lands in the middle of a frame's update/draw pass.

use std::time::Duration;

struct Pending<E> {
    due: Duration,
    /// Scheduling order, breaks ties between equal deadlines
    seq: u64,
    event: E,
}

/// Queue of one-shot timers carrying an event each
pub struct Timers<E> {
    pending: Vec<Pending<E>>,
    next_seq: u64,
}

impl<E> Timers<E> {
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
            next_seq: 0,
        }
    }

    /// Schedule `event` to fire once `delay` has elapsed since session start
    pub fn schedule(&mut self, delay: Duration, event: E) {
        self.pending.push(Pending {
            due: delay,
            seq: self.next_seq,
            event,
        });
        self.next_seq += 1;
    }

    /// Remove and return every event due at `now`, earliest first
    ///
    /// Each event is returned exactly once.
    pub fn drain_due(&mut self, now: Duration) -> Vec<E> {
        let mut due: Vec<Pending<E>> = Vec::new();
        let mut i = 0;
        while i < self.pending.len() {
            if self.pending[i].due <= now {
                due.push(self.pending.swap_remove(i));
            } else {
                i += 1;
            }
        }
        due.sort_by_key(|p| (p.due, p.seq));
        due.into_iter().map(|p| p.event).collect()
    }
}

impl<E> Default for Timers<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_fires_once_at_deadline() {
        let mut timers = Timers::new();
        timers.schedule(ms(3000), "converge");

        assert!(timers.drain_due(ms(2999)).is_empty());
        assert_eq!(timers.drain_due(ms(3000)), vec!["converge"]);
        assert!(timers.drain_due(ms(10_000)).is_empty());
        assert!(timers.pending.is_empty());
    }

    #[test]
    fn test_late_poll_returns_in_deadline_order() {
        let mut timers = Timers::new();
        timers.schedule(ms(6000), 2);
        timers.schedule(ms(3000), 1);
        timers.schedule(ms(3000), 3);
        assert_eq!(timers.drain_due(ms(7000)), vec![1, 3, 2]);
        assert!(timers.pending.is_empty());
    }
}
