//! Scheduler - Timers for the only asynchronous step in the widget.
//!
//! The widget is single-threaded and cooperative. The debounce stage is the
//! one place that needs to resume on a later turn, so it asks a
//! [`Scheduler`] for a timeout instead of spawning anything.
//!
//! [`TimerQueue`] is a host-pumped implementation over a virtual clock:
//! the host calls [`TimerQueue::advance`] from its event loop (or a test
//! calls it directly) and due callbacks fire in deadline order, ties broken
//! by registration order.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use spark_bin::scheduler::{Scheduler, TimerQueue};
//!
//! let timers = TimerQueue::new();
//! timers.set_timeout(Duration::from_millis(50), Box::new(|| println!("fired")));
//! timers.advance(Duration::from_millis(50)); // prints
//! ```

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::time::Duration;

/// Identifies a scheduled timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// Callback run when a timeout fires.
pub type TimerCallback = Box<dyn FnOnce()>;

/// Source of one-shot timeouts.
pub trait Scheduler {
    /// Run `callback` once after `delay`.
    fn set_timeout(&self, delay: Duration, callback: TimerCallback) -> TimerId;

    /// Cancel a timeout. Unknown or already fired ids are ignored.
    fn clear_timeout(&self, id: TimerId);
}

// =============================================================================
// TIMER QUEUE
// =============================================================================

/// Deterministic timer queue driven by an explicit clock.
pub struct TimerQueue {
    now: Cell<Duration>,
    next_id: Cell<u64>,
    /// Keyed by (deadline, id) so iteration order is fire order.
    timers: RefCell<BTreeMap<(Duration, TimerId), TimerCallback>>,
}

impl Default for TimerQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerQueue {
    /// Create an empty queue with the clock at zero.
    pub fn new() -> Self {
        Self {
            now: Cell::new(Duration::ZERO),
            next_id: Cell::new(0),
            timers: RefCell::new(BTreeMap::new()),
        }
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.now.get()
    }

    /// Number of timeouts waiting to fire.
    pub fn pending(&self) -> usize {
        self.timers.borrow().len()
    }

    /// Deadline of the next timeout, if any.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.borrow().keys().next().map(|(deadline, _)| *deadline)
    }

    /// Move the clock forward by `by`, firing everything that becomes due.
    /// Returns the number of callbacks run.
    pub fn advance(&self, by: Duration) -> usize {
        self.advance_to(self.now.get() + by)
    }

    /// Move the clock to `at` (never backwards), firing everything due.
    ///
    /// Callbacks may schedule new timeouts; those fire in the same call when
    /// their deadline is not later than `at`.
    pub fn advance_to(&self, at: Duration) -> usize {
        let mut fired = 0;
        loop {
            let due = {
                let mut timers = self.timers.borrow_mut();
                match timers.keys().next().copied() {
                    Some(key) if key.0 <= at => timers.remove(&key).map(|cb| (key.0, cb)),
                    _ => None,
                }
            };
            let Some((deadline, callback)) = due else { break };
            if deadline > self.now.get() {
                self.now.set(deadline);
            }
            callback();
            fired += 1;
        }
        if at > self.now.get() {
            self.now.set(at);
        }
        fired
    }

    /// Fire everything pending, however far away.
    pub fn run_all(&self) -> usize {
        let mut fired = 0;
        while let Some(deadline) = self.next_deadline() {
            fired += self.advance_to(deadline);
        }
        fired
    }
}

impl Scheduler for TimerQueue {
    fn set_timeout(&self, delay: Duration, callback: TimerCallback) -> TimerId {
        let id = TimerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        let deadline = self.now.get() + delay;
        self.timers.borrow_mut().insert((deadline, id), callback);
        id
    }

    fn clear_timeout(&self, id: TimerId) {
        self.timers.borrow_mut().retain(|(_, timer), _| *timer != id);
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_fires_at_deadline() {
        let timers = TimerQueue::new();
        let fired = Rc::new(Cell::new(false));
        let f = fired.clone();
        timers.set_timeout(ms(100), Box::new(move || f.set(true)));

        assert_eq!(timers.advance(ms(99)), 0);
        assert!(!fired.get());
        assert_eq!(timers.advance(ms(1)), 1);
        assert!(fired.get());
        assert_eq!(timers.pending(), 0);
    }

    #[test]
    fn test_least_delay_first() {
        let timers = TimerQueue::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        for (name, delay) in [("slow", 30), ("fast", 10), ("mid", 20), ("fast-2", 10)] {
            let o = order.clone();
            timers.set_timeout(ms(delay), Box::new(move || o.borrow_mut().push(name)));
        }

        timers.advance(ms(30));
        assert_eq!(*order.borrow(), vec!["fast", "fast-2", "mid", "slow"]);
    }

    #[test]
    fn test_clear_timeout() {
        let timers = TimerQueue::new();
        let fired = Rc::new(Cell::new(0));
        let f = fired.clone();
        let id = timers.set_timeout(ms(10), Box::new(move || f.set(f.get() + 1)));

        timers.clear_timeout(id);
        timers.clear_timeout(id);
        timers.advance(ms(20));
        assert_eq!(fired.get(), 0);
    }

    #[test]
    fn test_callback_sees_deadline_as_now() {
        let timers = Rc::new(TimerQueue::new());
        let seen = Rc::new(Cell::new(Duration::ZERO));
        let (t, s) = (timers.clone(), seen.clone());
        timers.set_timeout(ms(40), Box::new(move || s.set(t.now())));

        timers.advance(ms(100));
        assert_eq!(seen.get(), ms(40));
        assert_eq!(timers.now(), ms(100));
    }

    #[test]
    fn test_run_all() {
        let timers = TimerQueue::new();
        timers.set_timeout(ms(5), Box::new(|| {}));
        timers.set_timeout(ms(5000), Box::new(|| {}));
        assert_eq!(timers.run_all(), 2);
        assert_eq!(timers.now(), ms(5000));
    }
}
