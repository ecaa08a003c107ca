//! Teardown Registry - Single release path for everything a widget creates.
//!
//! Construction registers a cleanup for each subscription, listener, effect,
//! timer and resource it sets up. [`Teardown::run`] executes them once, most
//! recent first, so later setup steps (which may depend on earlier ones) are
//! released before what they depend on.
//!
//! Running twice is a no-op. A cleanup registered once the run has started
//! is executed immediately.

use std::cell::{Cell, RefCell};

use tracing::debug;

use crate::reactive::{untracked, Cleanup};

/// LIFO list of cleanups with idempotent disposal.
#[derive(Default)]
pub struct Teardown {
    cleanups: RefCell<Vec<(&'static str, Cleanup)>>,
    disposed: Cell<bool>,
}

impl Teardown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `cleanup` under a short label used in logs.
    pub fn add(&self, label: &'static str, cleanup: impl FnOnce() + 'static) {
        if self.disposed.get() {
            debug!(label, "cleanup registered after teardown, running now");
            untracked(cleanup);
            return;
        }
        self.cleanups.borrow_mut().push((label, Box::new(cleanup)));
    }

    /// Number of cleanups waiting to run.
    pub fn len(&self) -> usize {
        self.cleanups.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.get()
    }

    /// Run every cleanup, newest first. Returns how many ran; a second call
    /// returns 0.
    pub fn run(&self) -> usize {
        if self.disposed.replace(true) {
            return 0;
        }

        let mut ran = 0;
        // Pop one at a time so no borrow is held while a cleanup runs.
        loop {
            let next = self.cleanups.borrow_mut().pop();
            let Some((label, cleanup)) = next else {
                break;
            };
            debug!(label, "teardown");
            untracked(cleanup);
            ran += 1;
        }
        ran
    }
}

impl Drop for Teardown {
    fn drop(&mut self) {
        self.run();
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    fn recorder() -> (Rc<RefCell<Vec<&'static str>>>, impl Fn(&'static str) -> Box<dyn FnOnce()>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let l = log.clone();
        let make = move |name: &'static str| {
            let l = l.clone();
            Box::new(move || l.borrow_mut().push(name)) as Box<dyn FnOnce()>
        };
        (log, make)
    }

    #[test]
    fn test_runs_lifo_once() {
        let (log, make) = recorder();
        let teardown = Teardown::new();
        teardown.add("a", make("a"));
        teardown.add("b", make("b"));
        teardown.add("c", make("c"));

        assert_eq!(teardown.run(), 3);
        assert_eq!(teardown.run(), 0);
        assert_eq!(*log.borrow(), vec!["c", "b", "a"]);
        assert!(teardown.is_disposed());
        assert!(teardown.is_empty());
    }

    #[test]
    fn test_add_after_run_executes_immediately() {
        let (log, make) = recorder();
        let teardown = Teardown::new();
        teardown.run();

        teardown.add("late", make("late"));
        assert_eq!(*log.borrow(), vec!["late"]);
        assert!(teardown.is_empty());
    }

    #[test]
    fn test_cleanup_registering_cleanup() {
        let (log, make) = recorder();
        let teardown = Rc::new(Teardown::new());
        let t = Rc::downgrade(&teardown);
        let inner = make("inner");
        teardown.add("outer", move || {
            if let Some(t) = t.upgrade() {
                t.add("inner", inner);
            }
        });

        teardown.run();
        assert_eq!(*log.borrow(), vec!["inner"]);
    }

    #[test]
    fn test_drop_runs_pending() {
        let (log, make) = recorder();
        {
            let teardown = Teardown::new();
            teardown.add("x", make("x"));
        }
        assert_eq!(*log.borrow(), vec!["x"]);
    }
}
