//! Effect - Eager side-effecting subscriptions.
//!
//! An effect runs its body immediately on creation, tracks what the body
//! reads, and re-runs whenever one of those sources changes. Re-runs happen
//! synchronously when the triggering write (or the enclosing batch)
//! completes, never on a later turn.
//!
//! The body may return a cleanup closure. The previous cleanup always runs
//! before the body runs again and once more when the effect is stopped.
//!
//! # Example
//!
//! ```ignore
//! use spark_bin::reactive::{effect, signal};
//!
//! let width = signal(800.0);
//! let w = width.clone();
//! let fx = effect(move || {
//!     println!("width is {}", w.get());
//! });
//!
//! width.set(640.0); // prints again
//! fx.stop();
//! ```

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use tracing::trace;

use super::runtime::{self, Dependencies, Job, NodeId, Subscriber};

/// Cleanup closure returned by an effect body.
pub type Cleanup = Box<dyn FnOnce()>;

/// Anything an effect body may return.
pub trait IntoCleanup {
    fn into_cleanup(self) -> Option<Cleanup>;
}

impl IntoCleanup for () {
    fn into_cleanup(self) -> Option<Cleanup> {
        None
    }
}

impl IntoCleanup for Cleanup {
    fn into_cleanup(self) -> Option<Cleanup> {
        Some(self)
    }
}

impl IntoCleanup for Option<Cleanup> {
    fn into_cleanup(self) -> Option<Cleanup> {
        self
    }
}

type Body = Box<dyn FnMut() -> Option<Cleanup>>;

struct EffectInner {
    id: NodeId,
    body: RefCell<Body>,
    cleanup: RefCell<Option<Cleanup>>,
    sources: RefCell<Dependencies>,
    pending: Cell<bool>,
    disposed: Cell<bool>,
    runs: Cell<u64>,
    this: Weak<EffectInner>,
}

impl EffectInner {
    fn run(&self) {
        self.pending.set(false);
        if self.disposed.get() {
            return;
        }

        if let Some(cleanup) = self.cleanup.borrow_mut().take() {
            cleanup();
        }

        let (cleanup, deps) = runtime::tracked(|| {
            let mut body = self.body.borrow_mut();
            body()
        });
        *self.cleanup.borrow_mut() = cleanup;
        self.runs.set(self.runs.get() + 1);
        trace!(effect = self.id, runs = self.runs.get(), "effect ran");

        let weak: Weak<dyn Subscriber> = self.this.clone();
        runtime::rebind(self.id, &weak, &self.sources, deps);

        // Stopped from inside its own body.
        if self.disposed.get() {
            self.dispose_now();
        }
    }

    fn dispose(&self) {
        if self.disposed.replace(true) {
            return;
        }
        self.dispose_now();
    }

    fn dispose_now(&self) {
        runtime::unbind(self.id, &self.sources);
        // `try_borrow_mut` fails only while the body runs; `run` finishes the job.
        let cleanup = match self.cleanup.try_borrow_mut() {
            Ok(mut slot) => slot.take(),
            Err(_) => None,
        };
        if let Some(cleanup) = cleanup {
            cleanup();
        }
    }
}

impl Subscriber for EffectInner {
    fn mark_dirty(&self) {
        if self.disposed.get() || self.pending.replace(true) {
            return;
        }
        let job: Weak<dyn Job> = self.this.clone();
        runtime::schedule(job);
    }
}

impl Job for EffectInner {
    fn run_job(&self) {
        self.run();
    }

    fn cancel_pending(&self) {
        self.pending.set(false);
    }
}

/// Handle to a running effect.
///
/// Dropping the handle stops the effect. Keep it alive (for instance in a
/// teardown registry) for as long as the effect should run.
#[must_use = "dropping an Effect stops it immediately"]
pub struct Effect {
    inner: Rc<EffectInner>,
}

impl Effect {
    /// Stop the effect and run its last cleanup. Idempotent.
    pub fn stop(&self) {
        self.inner.dispose();
    }

    /// Whether [`stop`](Self::stop) has been called.
    pub fn is_stopped(&self) -> bool {
        self.inner.disposed.get()
    }

    /// Number of times the body has run.
    pub fn run_count(&self) -> u64 {
        self.inner.runs.get()
    }

    /// Convert into a boxed closure that stops the effect.
    pub fn into_cleanup(self) -> Cleanup {
        Box::new(move || self.stop())
    }
}

impl Drop for Effect {
    fn drop(&mut self) {
        self.inner.dispose();
    }
}

/// Create an effect and run it once immediately.
pub fn effect<C, F>(mut body: F) -> Effect
where
    C: IntoCleanup,
    F: FnMut() -> C + 'static,
{
    let inner = Rc::new_cyclic(|this| EffectInner {
        id: runtime::next_node_id(),
        body: RefCell::new(Box::new(move || body().into_cleanup())),
        cleanup: RefCell::new(None),
        sources: RefCell::new(Vec::new()),
        pending: Cell::new(false),
        disposed: Cell::new(false),
        runs: Cell::new(0),
        this: this.clone(),
    });
    inner.run();
    Effect { inner }
}

// =============================================================================
// Tests
// =============================================================================
