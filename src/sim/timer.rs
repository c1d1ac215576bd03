//! Virtual-time timer queue
//!
//! Delayed callbacks are stored as events and released by advancing the clock, so a round
//! can be driven frame by frame in the browser or stepped instantly in tests.

/// A queued event with its due time. `seq` keeps equal due times in scheduling order.
#[derive(Debug, Clone)]
struct Pending<E> {
    due_ms: f64,
    seq: u64,
    event: E,
}

#[derive(Debug, Clone)]
pub struct TimerQueue<E> {
    now_ms: f64,
    next_seq: u64,
    pending: Vec<Pending<E>>,
}

impl<E> Default for TimerQueue<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> TimerQueue<E> {
    pub fn new() -> Self {
        Self {
            now_ms: 0.0,
            next_seq: 0,
            pending: Vec::new(),
        }
    }

    /// Current virtual time
    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Fire `event` once `delay_ms` of virtual time has passed. Negative delays count as 0.
    pub fn schedule(&mut self, delay_ms: f64, event: E) {
        let delay = if delay_ms.is_finite() {
            delay_ms.max(0.0)
        } else {
            0.0
        };
        self.pending.push(Pending {
            due_ms: self.now_ms + delay,
            seq: self.next_seq,
            event,
        });
        self.next_seq += 1;
    }

    /// Move the clock forward. Time never runs backwards.
    pub fn advance(&mut self, delta_ms: f64) {
        if delta_ms.is_finite() && delta_ms > 0.0 {
            self.now_ms += delta_ms;
        }
    }

    /// Remove and return the earliest event that is due, if any
    pub fn pop_due(&mut self) -> Option<E> {
        let index = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, p)| p.due_ms <= self.now_ms)
            .min_by(|(_, a), (_, b)| a.due_ms.total_cmp(&b.due_ms).then(a.seq.cmp(&b.seq)))
            .map(|(i, _)| i)?;
        Some(self.pending.remove(index).event)
    }

    /// Time until the next event fires, if any is queued
    pub fn next_due_in(&self) -> Option<f64> {
        self.pending
            .iter()
            .map(|p| (p.due_ms - self.now_ms).max(0.0))
            .min_by(f64::total_cmp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nothing_fires_early() {
        let mut timers = TimerQueue::new();
        timers.schedule(100.0, "a");
        timers.advance(99.0);
        assert_eq!(timers.pop_due(), None);
        timers.advance(1.0);
        assert_eq!(timers.pop_due(), Some("a"));
        assert!(timers.is_empty());
    }

    #[test]
    fn test_fires_in_due_order() {
        let mut timers = TimerQueue::new();
        timers.schedule(2200.0, 2);
        timers.schedule(1000.0, 0);
        timers.schedule(1600.0, 1);
        timers.advance(5000.0);
        assert_eq!(timers.pop_due(), Some(0));
        assert_eq!(timers.pop_due(), Some(1));
        assert_eq!(timers.pop_due(), Some(2));
        assert_eq!(timers.pop_due(), None);
    }

    #[test]
    fn test_ties_keep_schedule_order() {
        let mut timers = TimerQueue::new();
        timers.schedule(10.0, "first");
        timers.schedule(10.0, "second");
        timers.advance(10.0);
        assert_eq!(timers.pop_due(), Some("first"));
        assert_eq!(timers.pop_due(), Some("second"));
    }

    #[test]
    fn test_schedule_is_relative_to_now() {
        let mut timers = TimerQueue::new();
        timers.advance(500.0);
        timers.schedule(100.0, ());
        assert_eq!(timers.next_due_in(), Some(100.0));
        timers.advance(-50.0);
        assert_eq!(timers.now_ms(), 500.0);
        timers.schedule(-5.0, ());
        assert_eq!(timers.pop_due(), Some(()));
        assert_eq!(timers.len(), 1);
    }
}
