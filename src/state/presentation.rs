//! Presentation - Styling attributes derived from the layout cells.
//!
//! The rendering layer never reads the layout cells directly. It consumes a
//! [`Presentation`] snapshot: boolean flags, the active tab and the
//! effective split, plus helpers that produce class names and labels.

use super::layout::LayoutState;
use super::split::Expand;
use super::tab::Tab;
use crate::reactive::{derived, Derived};

bitflags::bitflags! {
    /// Boolean presentation attributes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct LayoutFlags: u8 {
        const COMPACT = 1 << 0;
        const RESIZING = 1 << 1;
        /// The preview tab radio is selectable.
        const PREVIEW_TAB_ENABLED = 1 << 2;
        const PREVIEW_EXPANDED = 1 << 3;
        const EDITORS_EXPANDED = 1 << 4;
    }
}

/// Label shown on an expand button that is not engaged.
pub const EXPAND_IDLE_LABEL: &str = "↔️";
/// Editor expand button label while the editors fill the widget.
pub const EDITORS_EXPANDED_LABEL: &str = "⏮️";
/// Preview expand button label while the preview fills the widget.
pub const PREVIEW_EXPANDED_LABEL: &str = "⏭️";

/// Custom property carrying the effective split.
pub const SPLIT_PROPERTY: &str = "--resizer-split";

/// One snapshot of everything the renderer needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Presentation {
    pub flags: LayoutFlags,
    pub active_tab: Tab,
    /// Effective split in `[0, 1]`.
    pub split: f64,
}

impl Presentation {
    pub fn is_compact(&self) -> bool {
        self.flags.contains(LayoutFlags::COMPACT)
    }

    pub fn is_resizing(&self) -> bool {
        self.flags.contains(LayoutFlags::RESIZING)
    }

    /// Class list of the widget root.
    pub fn root_class(&self) -> String {
        let mut class = String::from("bin");
        if self.is_compact() {
            class.push_str(" bin--mini-mode");
        }
        if self.is_resizing() {
            class.push_str(" bin--resizing");
        }
        class
    }

    /// Class list of a pane.
    pub fn pane_class(&self, pane: Tab) -> String {
        let mut class = match pane {
            Tab::Preview => String::from("bin__preview"),
            editor => format!("bin__editor bin__editor--{}", editor.lang()),
        };
        if self.active_tab == pane {
            class.push_str(" bin__editor--active");
        }
        class
    }

    pub fn editor_expand_label(&self) -> &'static str {
        if self.flags.contains(LayoutFlags::EDITORS_EXPANDED) {
            EDITORS_EXPANDED_LABEL
        } else {
            EXPAND_IDLE_LABEL
        }
    }

    pub fn preview_expand_label(&self) -> &'static str {
        if self.flags.contains(LayoutFlags::PREVIEW_EXPANDED) {
            PREVIEW_EXPANDED_LABEL
        } else {
            EXPAND_IDLE_LABEL
        }
    }

    /// Whether the preview expand button moves to the front of its row.
    pub fn preview_expand_first(&self) -> bool {
        self.flags.contains(LayoutFlags::PREVIEW_EXPANDED)
    }

    /// Value of [`SPLIT_PROPERTY`].
    pub fn split_value(&self) -> String {
        self.split.to_string()
    }
}

/// Derive the presentation snapshot from a layout.
pub fn presentation(layout: &LayoutState) -> Derived<Presentation> {
    let active_tab = layout.active_tab().clone();
    let ratio = layout.split_ratio().clone();
    let expand = layout.split_override().clone();
    let dragging = layout.dragging().clone();
    let compact = layout.compact().clone();

    derived(move || {
        let expand = expand.get();
        let compact = compact.get();

        let mut flags = LayoutFlags::empty();
        flags.set(LayoutFlags::COMPACT, compact);
        flags.set(LayoutFlags::PREVIEW_TAB_ENABLED, compact);
        flags.set(LayoutFlags::RESIZING, dragging.get());
        flags.set(LayoutFlags::PREVIEW_EXPANDED, expand == Some(Expand::Preview));
        flags.set(LayoutFlags::EDITORS_EXPANDED, expand == Some(Expand::Editors));

        Presentation {
            flags,
            active_tab: active_tab.get(),
            split: expand.map_or_else(|| ratio.get(), Expand::ratio),
        }
    })
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::layout::LayoutOptions;
    use crate::state::split::RootBounds;

    #[test]
    fn test_compact_root_class() {
        let layout = LayoutState::new(LayoutOptions::default());
        let view = presentation(&layout);

        let p = view.get();
        assert_eq!(p.root_class(), "bin bin--mini-mode");
        assert!(p.flags.contains(LayoutFlags::PREVIEW_TAB_ENABLED));

        layout.resize_viewport(1024.0);
        let p = view.get();
        assert_eq!(p.root_class(), "bin");
        assert!(!p.flags.contains(LayoutFlags::PREVIEW_TAB_ENABLED));
    }

    #[test]
    fn test_resizing_flag_follows_drag() {
        let layout = LayoutState::new(LayoutOptions::default());
        layout.resize_viewport(1024.0);
        let view = presentation(&layout);

        layout.pointer_down(
            300.0,
            RootBounds {
                left: 0.0,
                width: 1000.0,
                divider_width: 6.0,
            },
        );
        assert_eq!(view.get().root_class(), "bin bin--resizing");
        layout.pointer_up();
        assert!(!view.get().is_resizing());
    }

    #[test]
    fn test_pane_classes() {
        let layout = LayoutState::new(LayoutOptions::default());
        let p = presentation(&layout).get();

        assert_eq!(
            p.pane_class(Tab::Script),
            "bin__editor bin__editor--js bin__editor--active"
        );
        assert_eq!(p.pane_class(Tab::Style), "bin__editor bin__editor--css");
        assert_eq!(p.pane_class(Tab::Preview), "bin__preview");
    }

    #[test]
    fn test_expand_labels_and_split() {
        let layout = LayoutState::new(LayoutOptions {
            split: 0.6,
            ..LayoutOptions::default()
        });
        let view = presentation(&layout);
        assert_eq!(view.get().split, 0.6);
        assert_eq!(view.get().split_value(), "0.6");

        layout.toggle_expand(Expand::Preview);
        let p = view.get();
        assert_eq!(p.split, 0.0);
        assert_eq!(p.preview_expand_label(), PREVIEW_EXPANDED_LABEL);
        assert_eq!(p.editor_expand_label(), EXPAND_IDLE_LABEL);
        assert!(p.preview_expand_first());

        layout.toggle_expand(Expand::Editors);
        let p = view.get();
        assert_eq!(p.split, 1.0);
        assert_eq!(p.editor_expand_label(), EDITORS_EXPANDED_LABEL);
        assert!(!p.preview_expand_first());
    }
}
