//! Derived - Lazily recomputed values with dynamic dependency tracking.
//!
//! A [`Derived`] caches the result of its compute function. The dependency
//! set is exactly the set of sources read during the latest evaluation;
//! sources that were read last time but not this time are dropped.
//!
//! Invalidation is pushed, evaluation is pulled:
//!
//! - A dependency write marks the derived dirty and forwards the mark to its
//!   own subscribers, without evaluating anything.
//! - The next [`Derived::get`] re-runs the compute function once, no matter
//!   how many dependencies changed in between.
//!
//! The compute function receives the previously cached value (`None` on the
//! first run). Resource-owning deriveds use it to release what the previous
//! generation produced.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::error;

use super::runtime::{self, Dependencies, NodeId, Source, Subscriber, Subscribers};

type ComputeFn<T> = Box<dyn FnMut(Option<&T>) -> T>;

struct DerivedInner<T> {
    id: NodeId,
    compute: RefCell<ComputeFn<T>>,
    value: RefCell<Option<T>>,
    dirty: Cell<bool>,
    evaluating: Cell<bool>,
    version: Cell<u64>,
    sources: RefCell<Dependencies>,
    subscribers: Subscribers,
    this: Weak<DerivedInner<T>>,
}

impl<T: 'static> DerivedInner<T> {
    fn refresh(&self) {
        if !self.dirty.get() {
            return;
        }
        if self.evaluating.get() {
            error!(derived = self.id, "derived read during its own evaluation");
            return;
        }

        self.dirty.set(false);
        self.evaluating.set(true);
        let (next, deps) = {
            let previous = self.value.borrow();
            runtime::tracked(|| {
                let mut compute = self.compute.borrow_mut();
                compute((*previous).as_ref())
            })
        };
        self.evaluating.set(false);

        *self.value.borrow_mut() = Some(next);
        self.version.set(self.version.get() + 1);

        let weak: Weak<dyn Subscriber> = self.this.clone();
        runtime::rebind(self.id, &weak, &self.sources, deps);
    }
}

impl<T: 'static> Subscriber for DerivedInner<T> {
    fn mark_dirty(&self) {
        if self.dirty.replace(true) {
            return;
        }
        self.subscribers.mark_all_dirty();
    }
}

impl<T: 'static> Source for DerivedInner<T> {
    fn node_id(&self) -> NodeId {
        self.id
    }

    fn add_subscriber(&self, id: NodeId, subscriber: Weak<dyn Subscriber>) {
        self.subscribers.add(id, subscriber);
    }

    fn remove_subscriber(&self, id: NodeId) {
        self.subscribers.remove(id);
    }
}

impl<T> Drop for DerivedInner<T> {
    fn drop(&mut self) {
        runtime::unbind(self.id, &self.sources);
    }
}

/// A cached, dependency-tracked computation.
///
/// Cloning a `Derived` creates another handle to the same node.
pub struct Derived<T> {
    inner: Rc<DerivedInner<T>>,
}

impl<T> Clone for Derived<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Derived<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Derived")
            .field("value", &*self.inner.value.borrow())
            .field("dirty", &self.inner.dirty.get())
            .field("version", &self.inner.version.get())
            .finish()
    }
}

/// Create a derived value from a compute function.
pub fn derived<T: Clone + 'static>(mut compute: impl FnMut() -> T + 'static) -> Derived<T> {
    Derived::new(Box::new(move |_| compute()))
}

/// Create a derived value whose compute function sees its previous result.
pub fn derived_with_previous<T: Clone + 'static>(
    compute: impl FnMut(Option<&T>) -> T + 'static,
) -> Derived<T> {
    Derived::new(Box::new(compute))
}

impl<T: Clone + 'static> Derived<T> {
    fn new(compute: ComputeFn<T>) -> Self {
        let inner = Rc::new_cyclic(|this| DerivedInner {
            id: runtime::next_node_id(),
            compute: RefCell::new(compute),
            value: RefCell::new(None),
            dirty: Cell::new(true),
            evaluating: Cell::new(false),
            version: Cell::new(0),
            sources: RefCell::new(Vec::new()),
            subscribers: Subscribers::default(),
            this: this.clone(),
        });
        Self { inner }
    }

    /// Current value, recomputing first if dirty. Registers a dependency when
    /// called during an evaluation.
    pub fn get(&self) -> T {
        self.inner.refresh();
        runtime::track(self.inner.clone() as Rc<dyn Source>);
        self.cached()
    }

    /// Current value, recomputing first if dirty, without registering a
    /// dependency.
    pub fn get_untracked(&self) -> T {
        self.inner.refresh();
        self.cached()
    }

    /// Borrow the current value (tracked).
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let value = self.get();
        f(&value)
    }

    /// Whether the next read will re-run the compute function.
    pub fn is_dirty(&self) -> bool {
        self.inner.dirty.get()
    }

    /// Number of completed evaluations.
    pub fn version(&self) -> u64 {
        self.inner.version.get()
    }

    /// Number of sources read by the latest evaluation.
    pub fn dependency_count(&self) -> usize {
        self.inner.sources.borrow().len()
    }

    fn cached(&self) -> T {
        self.inner
            .value
            .borrow()
            .clone()
            .expect("derived value read inside its own first evaluation")
    }
}

// =============================================================================
// Tests
// =============================================================================
