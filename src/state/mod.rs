//! State Module - UI state machine of the widget
//!
//! - **Tab** - Pane identifiers and parsing
//! - **Split** - Divider geometry, clamping, expand override
//! - **Layout** - The mutable cells and their transition rules
//! - **Presentation** - Derived styling attributes for the renderer

mod layout;
mod presentation;
mod split;
mod tab;

pub use layout::*;
pub use presentation::*;
pub use split::*;
pub use tab::*;
