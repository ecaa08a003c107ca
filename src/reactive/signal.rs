//! Signal - Mutable reactive cell.
//!
//! A [`Signal`] owns a value, a version counter and an ordered list of
//! subscribers. Reading it inside a derived/effect evaluation registers a
//! dependency edge. Writing it bumps the version and notifies subscribers
//! synchronously (effects run when the write's implicit batch closes).
//!
//! # Equality policy
//!
//! - [`signal`] notifies on every write, even when the value is unchanged.
//!   Revocable handle churn relies on this.
//! - [`signal_dedup`] compares with `PartialEq` and swallows writes of an
//!   equal value (no version bump, no notification).
//!
//! # Example
//!
//! ```ignore
//! use spark_bin::reactive::signal;
//!
//! let count = signal(0);
//! let _sub = count.subscribe(|v| println!("count = {v}"));
//! count.set(1);
//! assert_eq!(count.get(), 1);
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use super::runtime::{self, NodeId, Source, Subscriber, Subscribers};

type EqualityFn<T> = fn(&T, &T) -> bool;
type Callback<T> = Rc<dyn Fn(&T)>;

struct SignalInner<T> {
    id: NodeId,
    value: RefCell<T>,
    version: Cell<u64>,
    equality: Option<EqualityFn<T>>,
    nodes: Subscribers,
    callbacks: RefCell<Vec<(u64, Callback<T>)>>,
    next_callback: Cell<u64>,
}

impl<T: 'static> Source for SignalInner<T> {
    fn node_id(&self) -> NodeId {
        self.id
    }

    fn add_subscriber(&self, id: NodeId, subscriber: Weak<dyn Subscriber>) {
        self.nodes.add(id, subscriber);
    }

    fn remove_subscriber(&self, id: NodeId) {
        self.nodes.remove(id);
    }
}

/// A mutable reactive value.
///
/// Cloning a `Signal` creates another handle to the same cell.
pub struct Signal<T> {
    inner: Rc<SignalInner<T>>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("value", &*self.inner.value.borrow())
            .field("version", &self.inner.version.get())
            .finish()
    }
}

/// Create a signal that notifies on every write.
pub fn signal<T: Clone + 'static>(value: T) -> Signal<T> {
    Signal::with_policy(value, None)
}

/// Create a signal that ignores writes of a value equal to the current one.
pub fn signal_dedup<T: Clone + PartialEq + 'static>(value: T) -> Signal<T> {
    Signal::with_policy(value, Some(<T as PartialEq>::eq))
}

impl<T: Clone + 'static> Signal<T> {
    fn with_policy(value: T, equality: Option<EqualityFn<T>>) -> Self {
        Self {
            inner: Rc::new(SignalInner {
                id: runtime::next_node_id(),
                value: RefCell::new(value),
                version: Cell::new(0),
                equality,
                nodes: Subscribers::default(),
                callbacks: RefCell::new(Vec::new()),
                next_callback: Cell::new(0),
            }),
        }
    }

    /// Read the value, registering a dependency if called during an evaluation.
    pub fn get(&self) -> T {
        self.track();
        self.inner.value.borrow().clone()
    }

    /// Read the value without registering a dependency.
    pub fn get_untracked(&self) -> T {
        self.inner.value.borrow().clone()
    }

    /// Borrow the value for the duration of `f` (tracked).
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.track();
        f(&*self.inner.value.borrow())
    }

    /// Store `value` and notify subscribers.
    pub fn set(&self, value: T) {
        if let Some(eq) = self.inner.equality {
            if eq(&*self.inner.value.borrow(), &value) {
                return;
            }
        }
        *self.inner.value.borrow_mut() = value;
        self.notify();
    }

    /// Mutate the value in place and notify subscribers.
    ///
    /// Always notifies, regardless of the equality policy.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        f(&mut *self.inner.value.borrow_mut());
        self.notify();
    }

    /// Number of writes that reached subscribers.
    pub fn version(&self) -> u64 {
        self.inner.version.get()
    }

    /// Number of derived/effect nodes currently depending on this signal.
    pub fn dependent_count(&self) -> usize {
        self.inner.nodes.len()
    }

    /// Register a callback run with the new value after every notifying write.
    ///
    /// Callbacks run in registration order. Dropping the returned
    /// [`Subscription`] removes the callback.
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let id = self.inner.next_callback.get();
        self.inner.next_callback.set(id + 1);
        self.inner
            .callbacks
            .borrow_mut()
            .push((id, Rc::new(callback)));

        let weak = Rc::downgrade(&self.inner);
        Subscription {
            unsubscribe: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.callbacks.borrow_mut().retain(|(cb_id, _)| *cb_id != id);
                }
            })),
        }
    }

    fn track(&self) {
        runtime::track(self.inner.clone() as Rc<dyn Source>);
    }

    fn notify(&self) {
        let version = self.inner.version.get() + 1;
        self.inner.version.set(version);
        tracing::trace!(signal = self.inner.id, version, "signal write");

        runtime::batch(|| {
            self.inner.nodes.mark_all_dirty();

            let callbacks: Vec<Callback<T>> = self
                .inner
                .callbacks
                .borrow()
                .iter()
                .map(|(_, cb)| Rc::clone(cb))
                .collect();
            if !callbacks.is_empty() {
                let snapshot = self.inner.value.borrow().clone();
                for callback in callbacks {
                    callback(&snapshot);
                }
            }
        });
    }
}

/// RAII guard for a [`Signal::subscribe`] callback.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Unsubscribe now. Same as dropping the guard.
    pub fn cancel(mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
