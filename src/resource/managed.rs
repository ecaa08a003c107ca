//! Managed Resource - Handle lifetime bound to a derived's generations.
//!
//! A [`ManagedResource`] is a derived value whose every evaluation mints a
//! new handle from the current content and releases the handle produced by
//! the previous evaluation (received through the previous-value parameter).
//!
//! # Invariants
//!
//! 1. At most one live handle per slot.
//! 2. The new handle exists before the old one is revoked, so there is never
//!    a moment without a valid handle.
//! 3. After K evaluations, K-1 handles have been released and 1 is live.
//! 4. [`ManagedResource::release`] revokes the final live handle exactly
//!    once; a later evaluation never revokes it again.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::{debug, warn};

use super::store::{ResourceHandle, ResourceKind, ResourceStore};
use crate::reactive::{derived_with_previous, Derived};

/// Book-keeping shared between the derived's compute function and the
/// teardown path.
struct Slot {
    kind: ResourceKind,
    store: Rc<dyn ResourceStore>,
    live: RefCell<Option<ResourceHandle>>,
    generation: Cell<u64>,
    released: Cell<u64>,
}

impl Slot {
    fn install(&self, next: ResourceHandle, previous: Option<&ResourceHandle>) {
        let generation = self.generation.get() + 1;
        self.generation.set(generation);
        let superseded = self.live.replace(Some(next));

        if let Some(old) = previous {
            // Skip handles the teardown path already released.
            if superseded.as_ref() == Some(old) {
                self.revoke(old);
            }
        }
        debug!(kind = ?self.kind, generation, "resource generation installed");
    }

    fn revoke(&self, handle: &ResourceHandle) {
        match self.store.revoke(handle) {
            Ok(()) => self.released.set(self.released.get() + 1),
            Err(err) => warn!(%err, kind = ?self.kind, "resource release failed"),
        }
    }
}

/// A derived handle with one live generation at a time.
pub struct ManagedResource {
    handle: Derived<ResourceHandle>,
    slot: Rc<Slot>,
}

/// Bind handle creation/destruction to the recomputation of `content`.
///
/// `content` runs inside the derived's evaluation, so every cell it reads
/// becomes a dependency.
pub fn managed_resource(
    store: Rc<dyn ResourceStore>,
    kind: ResourceKind,
    mut content: impl FnMut() -> String + 'static,
) -> ManagedResource {
    let slot = Rc::new(Slot {
        kind,
        store,
        live: RefCell::new(None),
        generation: Cell::new(0),
        released: Cell::new(0),
    });

    let handle = {
        let slot = slot.clone();
        derived_with_previous(move |previous: Option<&ResourceHandle>| {
            let body = content();
            let next = slot.store.create(&body, slot.kind);
            slot.install(next.clone(), previous);
            next
        })
    };

    ManagedResource { handle, slot }
}

impl ManagedResource {
    /// Current handle (tracked), minting a new generation if inputs changed.
    pub fn get(&self) -> ResourceHandle {
        self.handle.get()
    }

    /// The underlying derived node.
    pub fn derived(&self) -> &Derived<ResourceHandle> {
        &self.handle
    }

    /// The live handle without evaluating anything.
    pub fn live(&self) -> Option<ResourceHandle> {
        self.slot.live.borrow().clone()
    }

    /// Number of handles minted so far.
    pub fn generation(&self) -> u64 {
        self.slot.generation.get()
    }

    /// Number of handles released so far.
    pub fn released(&self) -> u64 {
        self.slot.released.get()
    }

    /// Release the final live handle. Idempotent.
    pub fn release(&self) {
        let live = self.slot.live.borrow_mut().take();
        if let Some(handle) = live {
            self.slot.revoke(&handle);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
