//! Headless Host - In-memory collaborators.
//!
//! Records everything the widget asks of its surface, lets the caller emit
//! viewport widths and type into editors, and keeps resources in a
//! [`BlobStore`] with timers on a [`TimerQueue`]. Used by the test suite and
//! by hosts that drive the widget without a browser.
//!
//! # Example
//!
//! ```ignore
//! let host = HeadlessHost::new();
//! let bin = create_bin(BinConfig::new().with_container("#bin"), host.services());
//!
//! host.viewport.emit(1024.0);
//! host.editors.editor(Tab::Script).unwrap().type_text("console.log(1)");
//! host.timers.advance(Duration::from_secs(1));
//! ```

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use super::{EditorFactory, EditorRef, HostServices, Surface, ViewportSource};
use crate::reactive::Cleanup;
use crate::resource::{BlobStore, ResourceHandle};
use crate::scheduler::TimerQueue;
use crate::state::{Presentation, RootBounds, Tab};

// =============================================================================
// SURFACE
// =============================================================================

/// A [`Surface`] that records calls.
#[derive(Default)]
pub struct HeadlessSurface {
    mounted: RefCell<Option<String>>,
    properties: RefCell<BTreeMap<String, String>>,
    presentations: RefCell<Vec<Presentation>>,
    preview_sources: RefCell<Vec<ResourceHandle>>,
    reloads: Cell<usize>,
    stylesheets: RefCell<Vec<String>>,
    bounds: Cell<RootBounds>,
}

impl HeadlessSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mounted_in(&self) -> Option<String> {
        self.mounted.borrow().clone()
    }

    pub fn property(&self, name: &str) -> Option<String> {
        self.properties.borrow().get(name).cloned()
    }

    /// Latest presentation applied.
    pub fn presentation(&self) -> Option<Presentation> {
        self.presentations.borrow().last().copied()
    }

    /// Every presentation applied, oldest first.
    pub fn presentation_history(&self) -> Vec<Presentation> {
        self.presentations.borrow().clone()
    }

    /// Current preview source.
    pub fn preview_source(&self) -> Option<ResourceHandle> {
        self.preview_sources.borrow().last().cloned()
    }

    /// Every preview source ever set, oldest first.
    pub fn preview_history(&self) -> Vec<ResourceHandle> {
        self.preview_sources.borrow().clone()
    }

    pub fn reloads(&self) -> usize {
        self.reloads.get()
    }

    pub fn stylesheets(&self) -> Vec<String> {
        self.stylesheets.borrow().clone()
    }

    /// Geometry reported by [`Surface::root_bounds`].
    pub fn set_bounds(&self, bounds: RootBounds) {
        self.bounds.set(bounds);
    }
}

impl Surface for HeadlessSurface {
    fn mount(&self, container: &str) {
        *self.mounted.borrow_mut() = Some(container.to_owned());
    }

    fn set_style_property(&self, name: &str, value: &str) {
        self.properties
            .borrow_mut()
            .insert(name.to_owned(), value.to_owned());
    }

    fn apply_presentation(&self, presentation: &Presentation) {
        self.presentations.borrow_mut().push(*presentation);
    }

    fn set_preview_source(&self, handle: &ResourceHandle) {
        self.preview_sources.borrow_mut().push(handle.clone());
    }

    fn reload_preview(&self) {
        self.reloads.set(self.reloads.get() + 1);
    }

    fn root_bounds(&self) -> RootBounds {
        self.bounds.get()
    }

    fn inject_stylesheet(&self, css: &str) {
        self.stylesheets.borrow_mut().push(css.to_owned());
    }
}

// =============================================================================
// VIEWPORT
// =============================================================================

type Observers = RefCell<Vec<(usize, Rc<dyn Fn(f64)>)>>;

/// A [`ViewportSource`] the caller drives with [`ManualViewport::emit`].
#[derive(Clone, Default)]
pub struct ManualViewport {
    observers: Rc<Observers>,
    next_id: Rc<Cell<usize>>,
}

impl ManualViewport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report a new width to every observer.
    pub fn emit(&self, width: f64) {
        let observers: Vec<_> = self
            .observers
            .borrow()
            .iter()
            .map(|(_, f)| f.clone())
            .collect();
        for observer in observers {
            observer(width);
        }
    }

    pub fn observer_count(&self) -> usize {
        self.observers.borrow().len()
    }
}

impl ViewportSource for ManualViewport {
    fn observe(&self, on_resize: Rc<dyn Fn(f64)>) -> Cleanup {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.observers.borrow_mut().push((id, on_resize));

        let observers: Weak<Observers> = Rc::downgrade(&self.observers);
        Box::new(move || {
            if let Some(observers) = observers.upgrade() {
                observers.borrow_mut().retain(|(i, _)| *i != id);
            }
        })
    }
}

// =============================================================================
// EDITORS
// =============================================================================

/// A plain-text editor standing in for the rich editor component.
pub struct HeadlessEditor {
    tab: Tab,
    text: RefCell<String>,
    on_change: Rc<dyn Fn(&str)>,
}

impl HeadlessEditor {
    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn text(&self) -> String {
        self.text.borrow().clone()
    }

    /// Replace the document, notifying the widget like a user edit would.
    pub fn type_text(&self, text: &str) {
        *self.text.borrow_mut() = text.to_owned();
        (self.on_change)(text);
    }
}

/// An [`EditorFactory`] producing [`HeadlessEditor`]s.
#[derive(Default)]
pub struct HeadlessEditors {
    created: RefCell<Vec<Rc<HeadlessEditor>>>,
}

impl HeadlessEditors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recently created editor for `tab`.
    pub fn editor(&self, tab: Tab) -> Option<Rc<HeadlessEditor>> {
        self.created
            .borrow()
            .iter()
            .rev()
            .find(|e| e.tab == tab)
            .cloned()
    }

    pub fn count(&self) -> usize {
        self.created.borrow().len()
    }
}

impl EditorFactory for HeadlessEditors {
    fn create_editor(&self, tab: Tab, initial: &str, on_change: Rc<dyn Fn(&str)>) -> EditorRef {
        let editor = Rc::new(HeadlessEditor {
            tab,
            text: RefCell::new(initial.to_owned()),
            on_change,
        });
        self.created.borrow_mut().push(editor.clone());
        editor
    }
}

// =============================================================================
// HOST
// =============================================================================

/// All headless collaborators, kept as concrete types for inspection.
#[derive(Clone)]
pub struct HeadlessHost {
    pub surface: Rc<HeadlessSurface>,
    pub viewport: ManualViewport,
    pub editors: Rc<HeadlessEditors>,
    pub store: Rc<BlobStore>,
    pub timers: Rc<TimerQueue>,
}

impl Default for HeadlessHost {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessHost {
    pub fn new() -> Self {
        let surface = HeadlessSurface::new();
        surface.set_bounds(RootBounds {
            left: 0.0,
            width: 1000.0,
            divider_width: 0.0,
        });
        Self {
            surface: Rc::new(surface),
            viewport: ManualViewport::new(),
            editors: Rc::new(HeadlessEditors::new()),
            store: Rc::new(BlobStore::new()),
            timers: Rc::new(TimerQueue::new()),
        }
    }

    /// The collaborators as trait objects for `create_bin`.
    pub fn services(&self) -> HostServices {
        HostServices {
            surface: self.surface.clone(),
            viewport: Rc::new(self.viewport.clone()),
            editors: self.editors.clone(),
            store: self.store.clone(),
            scheduler: self.timers.clone(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
