//! Reactive Runtime - Evaluation context, batching and the effect queue.
//!
//! The runtime is thread-local. Two widget instances living on different
//! threads never see each other's tracking frames or pending effects.
//!
//! # Tracking
//!
//! Every derived/effect evaluation pushes a frame. A read of a [`Source`]
//! while a frame is on top records that source in the frame. When the
//! evaluation finishes the frame is popped and its sources become the exact
//! dependency set of the node (dynamic tracking).
//!
//! # Propagation
//!
//! Writes are implicit batches. Invalidation is pushed synchronously through
//! the graph; effects reached by the push are queued once and run when the
//! outermost batch closes.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use tracing::{error, trace};

/// Identity of a node in the reactive graph.
pub type NodeId = u64;

/// Upper bound on effect runs in a single flush. Hitting it means an effect
/// keeps invalidating itself.
const MAX_EFFECT_RUNS_PER_FLUSH: usize = 100_000;

// =============================================================================
// NODE TRAITS
// =============================================================================

/// Something that can be read inside a tracking frame.
pub(crate) trait Source {
    fn node_id(&self) -> NodeId;
    fn add_subscriber(&self, id: NodeId, subscriber: Weak<dyn Subscriber>);
    fn remove_subscriber(&self, id: NodeId);
}

/// Something that depends on sources and must hear about their changes.
pub(crate) trait Subscriber {
    fn mark_dirty(&self);
}

/// A queued unit of eager work (an effect).
pub(crate) trait Job {
    fn run_job(&self);
    /// Forget a queued run that will never happen, so the next
    /// invalidation schedules the job again.
    fn cancel_pending(&self);
}

/// Ordered subscriber list shared by signals and deriveds.
#[derive(Default)]
pub(crate) struct Subscribers {
    entries: RefCell<Vec<(NodeId, Weak<dyn Subscriber>)>>,
}

impl Subscribers {
    pub(crate) fn add(&self, id: NodeId, subscriber: Weak<dyn Subscriber>) {
        let mut entries = self.entries.borrow_mut();
        if !entries.iter().any(|(existing, _)| *existing == id) {
            entries.push((id, subscriber));
        }
    }

    pub(crate) fn remove(&self, id: NodeId) {
        self.entries.borrow_mut().retain(|(existing, _)| *existing != id);
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Mark every live subscriber dirty, in subscription order.
    /// Dead entries are dropped on the way.
    pub(crate) fn mark_all_dirty(&self) {
        let live: Vec<Rc<dyn Subscriber>> = {
            let mut entries = self.entries.borrow_mut();
            entries.retain(|(_, weak)| weak.strong_count() > 0);
            entries.iter().filter_map(|(_, weak)| weak.upgrade()).collect()
        };
        for subscriber in live {
            subscriber.mark_dirty();
        }
    }
}

/// Dependency set recorded by one evaluation.
pub(crate) type Dependencies = Vec<Rc<dyn Source>>;

/// Replace `current` with `next`, unsubscribing from dropped sources and
/// subscribing to new ones.
pub(crate) fn rebind(
    id: NodeId,
    subscriber: &Weak<dyn Subscriber>,
    current: &RefCell<Dependencies>,
    next: Dependencies,
) {
    let previous = current.replace(Vec::new());
    for old in &previous {
        if !next.iter().any(|source| source.node_id() == old.node_id()) {
            old.remove_subscriber(id);
        }
    }
    for source in &next {
        if !previous.iter().any(|old| old.node_id() == source.node_id()) {
            source.add_subscriber(id, subscriber.clone());
        }
    }
    *current.borrow_mut() = next;
}

/// Unsubscribe from every source in `current`.
pub(crate) fn unbind(id: NodeId, current: &RefCell<Dependencies>) {
    for source in current.replace(Vec::new()) {
        source.remove_subscriber(id);
    }
}

// =============================================================================
// RUNTIME STATE
// =============================================================================

struct Runtime {
    next_id: Cell<NodeId>,
    /// `None` frames come from `untracked`.
    frames: RefCell<Vec<Option<Dependencies>>>,
    batch_depth: Cell<usize>,
    flushing: Cell<bool>,
    queue: RefCell<VecDeque<Weak<dyn Job>>>,
}

impl Runtime {
    fn new() -> Self {
        Self {
            next_id: Cell::new(1),
            frames: RefCell::new(Vec::new()),
            batch_depth: Cell::new(0),
            flushing: Cell::new(false),
            queue: RefCell::new(VecDeque::new()),
        }
    }
}

thread_local! {
    static RUNTIME: Runtime = Runtime::new();
}

/// Allocate a fresh node id.
pub(crate) fn next_node_id() -> NodeId {
    RUNTIME.with(|rt| {
        let id = rt.next_id.get();
        rt.next_id.set(id + 1);
        id
    })
}

/// Record a read of `source` in the innermost tracking frame, if any.
pub(crate) fn track(source: Rc<dyn Source>) {
    RUNTIME.with(|rt| {
        let mut frames = rt.frames.borrow_mut();
        if let Some(Some(frame)) = frames.last_mut() {
            let id = source.node_id();
            if !frame.iter().any(|existing| existing.node_id() == id) {
                frame.push(source);
            }
        }
    });
}

/// Run `f` inside a fresh tracking frame and return what it read.
pub(crate) fn tracked<R>(f: impl FnOnce() -> R) -> (R, Dependencies) {
    RUNTIME.with(|rt| rt.frames.borrow_mut().push(Some(Vec::new())));
    let result = f();
    let deps = RUNTIME.with(|rt| rt.frames.borrow_mut().pop().flatten().unwrap_or_default());
    (result, deps)
}

/// Run `f` without recording any reads into the surrounding evaluation.
pub fn untracked<R>(f: impl FnOnce() -> R) -> R {
    RUNTIME.with(|rt| rt.frames.borrow_mut().push(None));
    let result = f();
    RUNTIME.with(|rt| rt.frames.borrow_mut().pop());
    result
}

/// Whether a derived or effect is currently evaluating on this thread.
pub fn is_tracking() -> bool {
    RUNTIME.with(|rt| matches!(rt.frames.borrow().last(), Some(Some(_))))
}

// =============================================================================
// BATCHING
// =============================================================================

/// Group several writes so that effects observe them together.
///
/// Effects invalidated inside `f` run once, after the outermost batch
/// closes. Deriveds are lazy and never evaluate mid-batch unless read.
pub(crate) fn batch<R>(f: impl FnOnce() -> R) -> R {
    RUNTIME.with(|rt| rt.batch_depth.set(rt.batch_depth.get() + 1));
    let result = f();
    let outermost = RUNTIME.with(|rt| {
        let depth = rt.batch_depth.get() - 1;
        rt.batch_depth.set(depth);
        depth == 0
    });
    if outermost {
        flush_effects();
    }
    result
}

/// Queue an effect for the next flush.
pub(crate) fn schedule(job: Weak<dyn Job>) {
    RUNTIME.with(|rt| rt.queue.borrow_mut().push_back(job));
}

/// Run queued effects until the queue is empty.
///
/// Re-entrant calls (an effect writing a cell) return immediately; the
/// outer flush picks up anything they queued.
pub(crate) fn flush_effects() {
    let already_flushing = RUNTIME.with(|rt| rt.flushing.replace(true));
    if already_flushing {
        return;
    }

    let mut runs = 0usize;
    loop {
        let next = RUNTIME.with(|rt| rt.queue.borrow_mut().pop_front());
        let Some(job) = next else { break };
        if let Some(job) = job.upgrade() {
            runs += 1;
            if runs > MAX_EFFECT_RUNS_PER_FLUSH {
                error!(runs, "effect loop did not settle, dropping remaining effects");
                job.cancel_pending();
                let dropped: Vec<_> = RUNTIME.with(|rt| rt.queue.borrow_mut().drain(..).collect());
                for job in dropped.iter().filter_map(Weak::upgrade) {
                    job.cancel_pending();
                }
                break;
            }
            job.run_job();
        }
    }
    trace!(runs, "effects flushed");

    RUNTIME.with(|rt| rt.flushing.set(false));
}

// =============================================================================
// Tests
// =============================================================================
