//! Preview Pipeline - Sources to published preview handle.
//!
//! ```text
//! markup ──────────────────────────────┐
//! style  ──▶ style handle  (managed) ──┼──▶ document ──▶ debounce ──▶ preview handle (managed)
//! script ──▶ script handle (managed) ──┘     (derived)
//! ```
//!
//! Style and script handles follow their sources immediately. The
//! assembled document is debounced, and only the settled document gets a
//! preview handle, so typing does not reload the preview on every key.

use std::rc::Rc;
use std::time::Duration;

use tracing::debug;

use crate::config::Sources;
use crate::document::assemble;
use crate::reactive::{debounced, derived, signal, Debounced, Derived, Signal};
use crate::resource::{managed_resource, ManagedResource, ResourceHandle, ResourceKind, ResourceStore};
use crate::scheduler::Scheduler;
use crate::state::Tab;

/// The source cells and every stage derived from them.
pub struct PreviewPipeline {
    markup: Signal<String>,
    style: Signal<String>,
    script: Signal<String>,
    style_handle: Rc<ManagedResource>,
    script_handle: Rc<ManagedResource>,
    document: Derived<String>,
    settled: Debounced<String>,
    preview: ManagedResource,
}

impl PreviewPipeline {
    pub fn new(
        sources: &Sources,
        store: Rc<dyn ResourceStore>,
        scheduler: Rc<dyn Scheduler>,
        delay: Duration,
    ) -> Self {
        // Plain cells: an edit that restores identical text still republishes.
        let markup = signal(sources.markup().to_owned());
        let style = signal(sources.style().to_owned());
        let script = signal(sources.script().to_owned());

        let style_handle = Rc::new({
            let style = style.clone();
            managed_resource(store.clone(), ResourceKind::Style, move || style.get())
        });
        let script_handle = Rc::new({
            let script = script.clone();
            managed_resource(store.clone(), ResourceKind::Script, move || script.get())
        });

        let document = {
            let markup = markup.clone();
            let style_handle = style_handle.clone();
            let script_handle = script_handle.clone();
            derived(move || {
                let style = style_handle.get();
                let script = script_handle.get();
                markup.with(|markup| assemble(markup, &style, &script))
            })
        };

        let settled = debounced(&document, delay, scheduler);

        let preview = {
            let settled = settled.signal().clone();
            managed_resource(store, ResourceKind::Document, move || settled.get())
        };

        debug!(delay_ms = delay.as_millis() as u64, "preview pipeline built");
        Self {
            markup,
            style,
            script,
            style_handle,
            script_handle,
            document,
            settled,
            preview,
        }
    }

    pub fn markup(&self) -> &Signal<String> {
        &self.markup
    }

    pub fn style(&self) -> &Signal<String> {
        &self.style
    }

    pub fn script(&self) -> &Signal<String> {
        &self.script
    }

    /// Source cell behind an editor tab.
    pub fn source(&self, tab: Tab) -> Option<&Signal<String>> {
        match tab {
            Tab::Markup => Some(&self.markup),
            Tab::Style => Some(&self.style),
            Tab::Script => Some(&self.script),
            Tab::Preview => None,
        }
    }

    /// The undebounced composite document.
    pub fn document(&self) -> &Derived<String> {
        &self.document
    }

    /// The debounced composite document.
    pub fn settled_document(&self) -> String {
        self.settled.get()
    }

    /// Whether an edit is waiting for the quiet window.
    pub fn is_pending(&self) -> bool {
        self.settled.is_pending()
    }

    /// Current preview handle (tracked).
    pub fn preview_handle(&self) -> ResourceHandle {
        self.preview.get()
    }

    /// Preview handle last minted, without evaluating.
    pub fn live_preview(&self) -> Option<ResourceHandle> {
        self.preview.live()
    }

    pub fn style_handle(&self) -> Option<ResourceHandle> {
        self.style_handle.live()
    }

    pub fn script_handle(&self) -> Option<ResourceHandle> {
        self.script_handle.live()
    }

    /// Cancel the pending publish and release every live handle.
    /// Idempotent.
    pub fn dispose(&self) {
        self.settled.dispose();
        self.preview.release();
        self.script_handle.release();
        self.style_handle.release();
    }
}

// =============================================================================
// Tests
// =============================================================================
