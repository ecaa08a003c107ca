//! Reactive Pipeline
//!
//! Connects the source cells to the preview the host displays.
//!
//! ```text
//! source cells → style/script handles → document → debounce → preview handle → preview effect
//! ```
//!
//! ## Key Design Principles
//!
//! - **Pure Deriveds**: the document is a pure function of markup and the two handles
//! - **Side Effects in Effect**: only the widget's preview effect touches the surface
//! - **One live handle per stage**: every handle is released when superseded or disposed

mod preview;

pub use preview::PreviewPipeline;
