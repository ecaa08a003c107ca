//! Host Module - Collaborators the widget talks to but does not implement.
//!
//! The reactive core never touches a real document. Everything outside it
//! (the rendered surface, the viewport size source, the text editors, the
//! resource store and the timer source) is reached through the traits
//! here, bundled into [`HostServices`].
//!
//! [`headless`] provides in-memory implementations for tests and
//! non-browser hosts.

pub mod headless;

use std::any::Any;
use std::rc::Rc;

use crate::reactive::Cleanup;
use crate::resource::{ResourceHandle, ResourceStore};
use crate::scheduler::Scheduler;
use crate::state::{Presentation, RootBounds, Tab};

/// The rendered widget root as seen by the core.
pub trait Surface {
    /// Attach the root under `container`.
    fn mount(&self, container: &str);

    /// Set a CSS custom property on the root.
    fn set_style_property(&self, name: &str, value: &str);

    /// Apply classes, labels and control states.
    fn apply_presentation(&self, presentation: &Presentation);

    /// Point the preview browsing context at `handle`.
    fn set_preview_source(&self, handle: &ResourceHandle);

    /// Reload the preview browsing context in place.
    fn reload_preview(&self);

    /// Current geometry of the root and the divider.
    fn root_bounds(&self) -> RootBounds;

    /// Insert a process-wide stylesheet.
    fn inject_stylesheet(&self, css: &str);
}

/// Source of widget width changes (a resize observer in a browser).
pub trait ViewportSource {
    /// Start reporting widths to `on_resize`. The returned cleanup stops it.
    fn observe(&self, on_resize: Rc<dyn Fn(f64)>) -> Cleanup;
}

/// Opaque editor instance owned by the editor collaborator.
pub type EditorRef = Rc<dyn Any>;

/// Creates the three text editors.
pub trait EditorFactory {
    /// Create an editor for `tab` holding `initial`. The editor calls
    /// `on_change` with its full text whenever the document changes.
    fn create_editor(&self, tab: Tab, initial: &str, on_change: Rc<dyn Fn(&str)>) -> EditorRef;
}

/// Everything a widget instance needs from its host.
#[derive(Clone)]
pub struct HostServices {
    pub surface: Rc<dyn Surface>,
    pub viewport: Rc<dyn ViewportSource>,
    pub editors: Rc<dyn EditorFactory>,
    pub store: Rc<dyn ResourceStore>,
    pub scheduler: Rc<dyn Scheduler>,
}
