//! Split - Divider geometry and the manual expand override.
//!
//! The split ratio is the editors' share of the widget width. Dragging the
//! divider maps the pointer position into `[MIN_SPLIT, MAX_SPLIT]`; the
//! expand buttons override the ratio with a full-width pane.

/// Smallest ratio reachable by dragging.
pub const MIN_SPLIT: f64 = 0.2;
/// Largest ratio reachable by dragging.
pub const MAX_SPLIT: f64 = 0.8;
/// Ratio used when none (or an unusable one) is configured.
pub const DEFAULT_SPLIT: f64 = 0.5;
/// Dead zone at each edge of the widget, in pixels.
pub const EDGE_MARGIN_PX: f64 = 10.0;

/// Linear interpolation parameter of `value` between `a` and `b`.
pub fn inverse_lerp(a: f64, b: f64, value: f64) -> f64 {
    (value - a) / (b - a)
}

/// Clamp `n` into `[lo, hi]`.
pub fn clamp(lo: f64, hi: f64, n: f64) -> f64 {
    lo.max(n.min(hi))
}

/// Clamp a configured ratio into the draggable range.
pub fn clamp_split(ratio: f64) -> f64 {
    if ratio.is_finite() {
        clamp(MIN_SPLIT, MAX_SPLIT, ratio)
    } else {
        DEFAULT_SPLIT
    }
}

/// Where the widget sits on screen, as measured by the host.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RootBounds {
    /// Left edge of the widget in client coordinates.
    pub left: f64,
    /// Widget width in pixels.
    pub width: f64,
    /// Width of the divider element in pixels.
    pub divider_width: f64,
}

/// Split ratio for a pointer at `pointer_x` (client coordinates).
///
/// Returns `None` when the widget is too narrow for a meaningful ratio.
pub fn split_from_pointer(pointer_x: f64, bounds: RootBounds) -> Option<f64> {
    let pos = pointer_x - bounds.divider_width / 2.0 - bounds.left;
    let ratio = inverse_lerp(EDGE_MARGIN_PX, bounds.width - EDGE_MARGIN_PX, pos);
    if !ratio.is_finite() || bounds.width <= 2.0 * EDGE_MARGIN_PX {
        return None;
    }
    Some(clamp(MIN_SPLIT, MAX_SPLIT, ratio))
}

/// Which side a manual expand gives the full width to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Expand {
    /// Preview only (ratio 0).
    Preview,
    /// Editors only (ratio 1).
    Editors,
}

impl Expand {
    pub fn ratio(self) -> f64 {
        match self {
            Expand::Preview => 0.0,
            Expand::Editors => 1.0,
        }
    }
}

/// Toggle `side` on or off. Turning one side on replaces the other.
pub fn toggle_expand(current: Option<Expand>, side: Expand) -> Option<Expand> {
    if current == Some(side) {
        None
    } else {
        Some(side)
    }
}

/// Split actually applied: the override if any, otherwise the ratio.
pub fn effective_split(ratio: f64, expand: Option<Expand>) -> f64 {
    expand.map_or(ratio, Expand::ratio)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn bounds(width: f64) -> RootBounds {
        RootBounds {
            left: 100.0,
            width,
            divider_width: 8.0,
        }
    }

    #[test]
    fn test_center_pointer_is_half() {
        // Center of the widget, compensated for the divider half-width.
        let b = bounds(1000.0);
        let ratio = split_from_pointer(100.0 + 500.0 + 4.0, b).unwrap();
        assert!((ratio - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_out_of_bounds_pointer_clamps() {
        let b = bounds(1000.0);
        assert_eq!(split_from_pointer(-5000.0, b), Some(MIN_SPLIT));
        assert_eq!(split_from_pointer(5000.0, b), Some(MAX_SPLIT));
    }

    #[test]
    fn test_degenerate_width() {
        assert_eq!(split_from_pointer(50.0, bounds(20.0)), None);
        assert_eq!(split_from_pointer(50.0, bounds(0.0)), None);
    }

    #[test]
    fn test_toggle_expand() {
        assert_eq!(toggle_expand(None, Expand::Editors), Some(Expand::Editors));
        assert_eq!(toggle_expand(Some(Expand::Editors), Expand::Editors), None);
        assert_eq!(
            toggle_expand(Some(Expand::Editors), Expand::Preview),
            Some(Expand::Preview)
        );
    }

    #[test]
    fn test_effective_split() {
        assert_eq!(effective_split(0.6, None), 0.6);
        assert_eq!(effective_split(0.6, Some(Expand::Preview)), 0.0);
        assert_eq!(effective_split(0.6, Some(Expand::Editors)), 1.0);
    }

    #[test]
    fn test_clamp_split() {
        assert_eq!(clamp_split(0.95), MAX_SPLIT);
        assert_eq!(clamp_split(0.05), MIN_SPLIT);
        assert_eq!(clamp_split(f64::NAN), DEFAULT_SPLIT);
    }

    proptest! {
        #[test]
        fn prop_pointer_ratio_in_range(
            pointer in -1.0e7f64..1.0e7,
            left in -1.0e4f64..1.0e4,
            width in 21.0f64..1.0e5,
            divider in 0.0f64..50.0,
        ) {
            let b = RootBounds { left, width, divider_width: divider };
            let ratio = split_from_pointer(pointer, b).unwrap();
            prop_assert!((MIN_SPLIT..=MAX_SPLIT).contains(&ratio));
        }
    }
}
