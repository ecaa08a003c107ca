//! Layout State - Tab, split and drag cells with their transition rules.
//!
//! Every external event maps to one transition method. The methods only
//! write cells; presentation is derived from those cells elsewhere (see
//! [`super::presentation`]).
//!
//! # Invariant
//!
//! `active_tab == Tab::Preview` is only legal while the layout is compact.
//! Selecting the preview tab in split layout is rejected, and a viewport
//! resize that leaves compact layout while the preview tab is active forces
//! the tab back to [`DEFAULT_TAB`].
//!
//! # Example
//!
//! ```ignore
//! let layout = LayoutState::new(LayoutOptions::default());
//! layout.resize_viewport(1200.0);
//! assert!(!layout.select_tab(Tab::Preview));
//! layout.resize_viewport(600.0);
//! assert!(layout.select_tab(Tab::Preview));
//! ```

use tracing::{debug, trace};

use super::split::{self, Expand, RootBounds};
use super::tab::{Tab, DEFAULT_TAB};
use crate::reactive::{batch, derived, effect, signal_dedup, Derived, Effect, Signal};

/// Widths at or below this many pixels use the compact layout.
pub const COMPACT_BREAKPOINT_PX: f64 = 700.0;

/// Initial values for a [`LayoutState`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutOptions {
    pub split: f64,
    pub initial_tab: Tab,
    /// Always use the compact layout.
    pub split_mode: bool,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            split: split::DEFAULT_SPLIT,
            initial_tab: DEFAULT_TAB,
            split_mode: false,
        }
    }
}

/// The UI state cells of one widget instance.
pub struct LayoutState {
    active_tab: Signal<Tab>,
    split_ratio: Signal<f64>,
    split_override: Signal<Option<Expand>>,
    dragging: Signal<bool>,
    viewport_width: Signal<f64>,
    compact: Derived<bool>,
    split_mode: bool,
}

impl LayoutState {
    pub fn new(options: LayoutOptions) -> Self {
        let viewport_width = signal_dedup(0.0_f64);
        let split_mode = options.split_mode;
        let compact = {
            let width = viewport_width.clone();
            derived(move || split_mode || width.get() <= COMPACT_BREAKPOINT_PX)
        };

        // The viewport is unmeasured (width 0) until the host starts
        // observing, so the layout begins compact and any initial tab is legal.
        Self {
            active_tab: signal_dedup(options.initial_tab),
            split_ratio: signal_dedup(split::clamp_split(options.split)),
            split_override: signal_dedup(None),
            dragging: signal_dedup(false),
            viewport_width,
            compact,
            split_mode,
        }
    }

    // =========================================================================
    // CELLS
    // =========================================================================

    pub fn active_tab(&self) -> &Signal<Tab> {
        &self.active_tab
    }

    pub fn split_ratio(&self) -> &Signal<f64> {
        &self.split_ratio
    }

    pub fn split_override(&self) -> &Signal<Option<Expand>> {
        &self.split_override
    }

    pub fn dragging(&self) -> &Signal<bool> {
        &self.dragging
    }

    pub fn viewport_width(&self) -> &Signal<f64> {
        &self.viewport_width
    }

    pub fn compact(&self) -> &Derived<bool> {
        &self.compact
    }

    pub fn is_compact(&self) -> bool {
        self.compact.get_untracked()
    }

    pub fn is_split_mode(&self) -> bool {
        self.split_mode
    }

    /// Split currently applied (tracked): the override if set, else the ratio.
    pub fn effective_split(&self) -> f64 {
        split::effective_split(self.split_ratio.get(), self.split_override.get())
    }

    // =========================================================================
    // TRANSITIONS
    // =========================================================================

    /// Pointer pressed on the divider: start dragging, drop any expand
    /// override and jump to the pointer position.
    pub fn pointer_down(&self, pointer_x: f64, bounds: RootBounds) {
        batch(|| {
            self.dragging.set(true);
            self.apply_pointer(pointer_x, bounds);
            self.split_override.set(None);
        });
        debug!(ratio = self.split_ratio.get_untracked(), "resize started");
    }

    /// Pointer moved anywhere over the widget. Returns `true` if the ratio
    /// was recomputed (only while dragging).
    pub fn pointer_move(&self, pointer_x: f64, bounds: RootBounds) -> bool {
        if !self.dragging.get_untracked() {
            return false;
        }
        self.apply_pointer(pointer_x, bounds);
        true
    }

    /// Pointer released, or left the window.
    pub fn pointer_up(&self) {
        if self.dragging.get_untracked() {
            self.dragging.set(false);
            debug!(ratio = self.split_ratio.get_untracked(), "resize finished");
        }
    }

    fn apply_pointer(&self, pointer_x: f64, bounds: RootBounds) {
        match split::split_from_pointer(pointer_x, bounds) {
            Some(ratio) => {
                trace!(pointer_x, ratio, "split ratio from pointer");
                self.split_ratio.set(ratio);
            }
            None => trace!(width = bounds.width, "widget too narrow, ratio kept"),
        }
    }

    /// Select a tab. Returns `false` (and leaves the tab unchanged) when the
    /// preview tab is asked for outside the compact layout.
    pub fn select_tab(&self, tab: Tab) -> bool {
        if tab == Tab::Preview && !self.is_compact() {
            debug!("preview tab rejected outside compact layout");
            return false;
        }
        self.active_tab.set(tab);
        true
    }

    /// Toggle full-width display of one side.
    pub fn toggle_expand(&self, side: Expand) {
        let next = split::toggle_expand(self.split_override.get_untracked(), side);
        debug!(?next, "expand override");
        self.split_override.set(next);
    }

    /// New viewport width from the host's size observer.
    pub fn resize_viewport(&self, width: f64) {
        batch(|| {
            self.viewport_width.set(width);
            self.enforce_tab_invariant();
        });
    }

    fn enforce_tab_invariant(&self) {
        if self.active_tab.get_untracked() == Tab::Preview && !self.compact.get_untracked() {
            debug!(fallback = %DEFAULT_TAB, "left compact layout on preview tab");
            self.active_tab.set(DEFAULT_TAB);
        }
    }

    /// Effect that restores the tab invariant whenever the active tab or the
    /// compact flag changes, including writes made directly to the
    /// [`active_tab`](Self::active_tab) cell.
    pub fn tab_guard(&self) -> Effect {
        let tab = self.active_tab.clone();
        let compact = self.compact.clone();
        effect(move || {
            if tab.get() == Tab::Preview && !compact.get() {
                debug!(fallback = %DEFAULT_TAB, "preview tab outside compact layout");
                tab.set(DEFAULT_TAB);
            }
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::split::{MAX_SPLIT, MIN_SPLIT};

    const BOUNDS: RootBounds = RootBounds {
        left: 0.0,
        width: 1000.0,
        divider_width: 0.0,
    };

    fn wide() -> LayoutState {
        let layout = LayoutState::new(LayoutOptions::default());
        layout.resize_viewport(1200.0);
        layout
    }

    #[test]
    fn test_starts_compact_until_measured() {
        let layout = LayoutState::new(LayoutOptions::default());
        assert!(layout.is_compact());
        layout.resize_viewport(701.0);
        assert!(!layout.is_compact());
        layout.resize_viewport(700.0);
        assert!(layout.is_compact());
    }

    #[test]
    fn test_split_mode_is_always_compact() {
        let layout = LayoutState::new(LayoutOptions {
            split_mode: true,
            ..LayoutOptions::default()
        });
        layout.resize_viewport(1920.0);
        assert!(layout.is_compact());
        assert!(layout.select_tab(Tab::Preview));
    }

    #[test]
    fn test_initial_split_is_clamped() {
        let layout = LayoutState::new(LayoutOptions {
            split: 0.95,
            ..LayoutOptions::default()
        });
        assert_eq!(layout.split_ratio().get(), MAX_SPLIT);
    }

    #[test]
    fn test_preview_rejected_in_split_layout() {
        let layout = wide();
        layout.select_tab(Tab::Markup);

        assert!(!layout.select_tab(Tab::Preview));
        assert_eq!(layout.active_tab().get(), Tab::Markup);
    }

    #[test]
    fn test_leaving_compact_on_preview_forces_default_tab() {
        let layout = LayoutState::new(LayoutOptions::default());
        layout.resize_viewport(500.0);
        assert!(layout.select_tab(Tab::Preview));

        layout.resize_viewport(900.0);
        assert_eq!(layout.active_tab().get(), DEFAULT_TAB);
    }

    #[test]
    fn test_tab_guard_catches_direct_writes() {
        let layout = wide();
        let _guard = layout.tab_guard();

        layout.active_tab().set(Tab::Preview);
        assert_eq!(layout.active_tab().get(), Tab::Script);
    }

    #[test]
    fn test_drag_updates_ratio_only_while_dragging() {
        let layout = wide();

        assert!(!layout.pointer_move(100.0, BOUNDS));
        assert_eq!(layout.split_ratio().get(), 0.5);

        layout.pointer_down(500.0, BOUNDS);
        assert!(layout.dragging().get());
        assert!(layout.pointer_move(-3000.0, BOUNDS));
        assert_eq!(layout.split_ratio().get(), MIN_SPLIT);

        layout.pointer_up();
        assert!(!layout.dragging().get());
        assert!(!layout.pointer_move(900.0, BOUNDS));
        assert_eq!(layout.split_ratio().get(), MIN_SPLIT);
    }

    #[test]
    fn test_pointer_down_clears_override() {
        let layout = wide();
        layout.toggle_expand(Expand::Editors);
        assert_eq!(layout.effective_split(), 1.0);

        layout.pointer_down(500.0, BOUNDS);
        assert_eq!(layout.split_override().get(), None);
        assert!((layout.effective_split() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_expand_toggles() {
        let layout = wide();
        layout.toggle_expand(Expand::Preview);
        assert_eq!(layout.effective_split(), 0.0);
        layout.toggle_expand(Expand::Editors);
        assert_eq!(layout.effective_split(), 1.0);
        layout.toggle_expand(Expand::Editors);
        assert_eq!(layout.effective_split(), 0.5);
    }

    #[test]
    fn test_narrow_widget_keeps_ratio() {
        let layout = wide();
        let narrow = RootBounds {
            width: 15.0,
            ..BOUNDS
        };
        layout.pointer_down(7.0, narrow);
        assert_eq!(layout.split_ratio().get(), 0.5);
    }
}
