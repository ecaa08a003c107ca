//! Events - Pointer listener registry for one widget instance.
//!
//! Stands in for the DOM listeners the widget attaches: pointer-down on the
//! divider, pointer-up and pointer-leave on the document, pointer-move over
//! the widget root. The host forwards raw pointer events to
//! [`ListenerRegistry::dispatch`]; listeners are removed through the cleanup
//! closure returned by [`ListenerRegistry::on`].
//!
//! # Example
//!
//! ```ignore
//! let listeners = ListenerRegistry::new();
//! let off = listeners.on(Target::Divider, PointerKind::Down, |event| {
//!     println!("grab at {}", event.client_x);
//! });
//!
//! listeners.dispatch(Target::Divider, &PointerEvent::down(240.0));
//! off();
//! ```

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};
use tracing::trace;

/// Element a listener is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    /// The drag handle between editors and preview.
    Divider,
    /// The hosting document (receives releases outside the widget).
    Document,
    /// The widget root.
    Root,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerKind {
    Down,
    Up,
    Move,
    Leave,
}

/// A pointer event in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub client_x: f64,
}

impl PointerEvent {
    pub fn down(client_x: f64) -> Self {
        Self { kind: PointerKind::Down, client_x }
    }

    pub fn up(client_x: f64) -> Self {
        Self { kind: PointerKind::Up, client_x }
    }

    pub fn moved(client_x: f64) -> Self {
        Self { kind: PointerKind::Move, client_x }
    }

    pub fn leave(client_x: f64) -> Self {
        Self { kind: PointerKind::Leave, client_x }
    }
}

pub type PointerHandler = Rc<dyn Fn(&PointerEvent)>;

struct Listener {
    id: usize,
    target: Target,
    kind: PointerKind,
    handler: PointerHandler,
}

#[derive(Default)]
struct Registry {
    listeners: Vec<Listener>,
    next_id: usize,
}

/// Listener table owned by one widget instance.
#[derive(Clone, Default)]
pub struct ListenerRegistry {
    inner: Rc<RefCell<Registry>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `handler` to `kind` events on `target`. Returns the removal
    /// closure; calling it after the registry is gone does nothing.
    pub fn on<F>(&self, target: Target, kind: PointerKind, handler: F) -> impl FnOnce() + use<F>
    where
        F: Fn(&PointerEvent) + 'static,
    {
        let id = {
            let mut reg = self.inner.borrow_mut();
            let id = reg.next_id;
            reg.next_id += 1;
            reg.listeners.push(Listener {
                id,
                target,
                kind,
                handler: Rc::new(handler),
            });
            id
        };

        let registry: Weak<RefCell<Registry>> = Rc::downgrade(&self.inner);
        move || {
            if let Some(registry) = registry.upgrade() {
                registry.borrow_mut().listeners.retain(|l| l.id != id);
            }
        }
    }

    /// Deliver `event` to every listener on `target` for its kind, in
    /// registration order. Returns `true` if any listener ran.
    pub fn dispatch(&self, target: Target, event: &PointerEvent) -> bool {
        // Snapshot so handlers may add or remove listeners.
        let handlers: Vec<PointerHandler> = self
            .inner
            .borrow()
            .listeners
            .iter()
            .filter(|l| l.target == target && l.kind == event.kind)
            .map(|l| l.handler.clone())
            .collect();

        trace!(?target, kind = ?event.kind, listeners = handlers.len(), "pointer dispatch");
        for handler in &handlers {
            handler(event);
        }
        !handlers.is_empty()
    }

    /// Number of attached listeners.
    pub fn len(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// =============================================================================
// Tests
// =============================================================================
