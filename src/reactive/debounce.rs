//! Debounce - Rate-limited view of a derived value.
//!
//! [`debounced`] watches an upstream [`Derived`] eagerly (so upstream
//! dependency tracking and any upstream side effects stay immediate) and
//! republishes its value into an output [`Signal`] only after the upstream
//! has been quiet for the configured window.
//!
//! - The first value is published immediately.
//! - Every upstream change cancels the pending timer and starts a new one.
//! - When the timer fires, the output receives upstream's value at that
//!   moment, which is the settled value of the burst.
//!
//! The output never holds a value newer than upstream's current value.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use tracing::debug;

use super::derived::Derived;
use super::effect::{effect, Effect};
use super::signal::{signal, Signal};
use crate::scheduler::{Scheduler, TimerId};

/// A debounced copy of a derived value.
pub struct Debounced<T> {
    output: Signal<T>,
    pending: Rc<Cell<Option<TimerId>>>,
    scheduler: Rc<dyn Scheduler>,
    watcher: Effect,
}

/// Debounce `upstream` by `delay`, using `scheduler` for the quiet window.
pub fn debounced<T: Clone + 'static>(
    upstream: &Derived<T>,
    delay: Duration,
    scheduler: Rc<dyn Scheduler>,
) -> Debounced<T> {
    let output = signal(upstream.get_untracked());
    let pending: Rc<Cell<Option<TimerId>>> = Rc::new(Cell::new(None));

    let watcher = {
        let upstream = upstream.clone();
        let output = output.clone();
        let pending = pending.clone();
        let scheduler = scheduler.clone();
        let mut primed = false;

        effect(move || {
            // Pull (and track) upstream so the next dependency write reaches us.
            upstream.get();
            if !primed {
                primed = true;
                return;
            }

            if let Some(id) = pending.take() {
                scheduler.clear_timeout(id);
            }

            let fire = {
                let upstream = upstream.clone();
                let output = output.clone();
                let pending = pending.clone();
                move || {
                    pending.set(None);
                    debug!(delay_ms = delay.as_millis() as u64, "debounced value published");
                    output.set(upstream.get_untracked());
                }
            };
            pending.set(Some(scheduler.set_timeout(delay, Box::new(fire))));
        })
    };

    Debounced {
        output,
        pending,
        scheduler,
        watcher,
    }
}

impl<T: Clone + 'static> Debounced<T> {
    /// The published value (tracked).
    pub fn get(&self) -> T {
        self.output.get()
    }

    /// The output cell, for wiring further derivations.
    pub fn signal(&self) -> &Signal<T> {
        &self.output
    }

    /// Whether a publish is waiting for the quiet window to elapse.
    pub fn is_pending(&self) -> bool {
        self.pending.get().is_some()
    }

    /// Cancel the pending publish, if any.
    pub fn cancel(&self) {
        if let Some(id) = self.pending.take() {
            self.scheduler.clear_timeout(id);
        }
    }

    /// Cancel the pending publish and stop watching upstream. Idempotent.
    pub fn dispose(&self) {
        self.cancel();
        self.watcher.stop();
    }
}

// =============================================================================
// Tests
// =============================================================================
