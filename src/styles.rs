//! Styles - Process-wide stylesheet, injected once.
//!
//! The first widget constructed in a process inserts [`STYLESHEET`] through
//! its surface. Later widgets reuse it. The sheet is never removed by an
//! instance teardown; it lives as long as the process.

use std::sync::Once;

use tracing::debug;

use crate::host::Surface;

static INJECT: Once = Once::new();

/// Base layout rules for the widget's class names and custom properties.
pub const STYLESHEET: &str = r#".bin {
  --resizer-split: 0.5;
  display: flex;
  flex-direction: column;
  width: var(--bin-width, 100%);
  height: var(--bin-height, 360px);
  position: relative;
}
.bin__widget {
  display: flex;
  flex: 1;
  min-height: 0;
}
.bin__editors {
  flex: 0 0 calc(var(--resizer-split) * 100%);
  overflow: hidden;
}
.bin__editor {
  display: none;
  height: 100%;
}
.bin__editor--active {
  display: block;
}
.bin__resizer {
  flex: 0 0 6px;
  cursor: col-resize;
}
.bin__preview {
  flex: 1;
  border: 0;
}
.bin--resizing {
  user-select: none;
  cursor: col-resize;
}
.bin--resizing .bin__preview {
  pointer-events: none;
}
.bin--mini-mode .bin__resizer,
.bin--mini-mode .bin__menu {
  display: none;
}
.bin--mini-mode .bin__editors {
  flex-basis: 100%;
}
.bin--mini-mode .bin__preview:not(.bin__editor--active) {
  display: none;
}
"#;

/// Inject [`STYLESHEET`] through `surface` unless some widget already did.
/// Returns `true` if this call injected it.
pub fn ensure_stylesheet(surface: &dyn Surface) -> bool {
    let mut injected = false;
    INJECT.call_once(|| {
        surface.inject_stylesheet(STYLESHEET);
        injected = true;
        debug!("stylesheet injected");
    });
    injected
}

/// Whether the stylesheet has been injected in this process.
pub fn stylesheet_injected() -> bool {
    INJECT.is_completed()
}

// =============================================================================
// Tests
// =============================================================================
