//! # spark-bin
//!
//! Reactive core of an embeddable live code playground.
//!
//! Three source panes (markup, style, script) feed a sandboxed preview that
//! is rebuilt as the user types. This crate is the dataflow behind it: a
//! small signal engine, a debounced document pipeline whose revocable
//! preview handles track the reactive graph exactly, a UI state machine for
//! tabs and the split divider, and a teardown registry that releases all of
//! it deterministically.
//!
//! ## Architecture
//!
//! ```text
//! source cells → style/script handles → document → debounce → preview handle
//! pointer/viewport events → layout cells → presentation → host surface
//! ```
//!
//! The editors, the rendered surface, the resource store and the timer
//! source are host collaborators behind the traits in [`host`].
//!
//! ## Modules
//!
//! - [`reactive`] - Signals, deriveds, effects, debounce
//! - [`resource`] - Revocable handles and their lifecycle manager
//! - [`document`] - Composite preview document and error bridge messages
//! - [`state`] - Tabs, split geometry, layout transitions, presentation
//! - [`pipeline`] - Sources to published preview
//! - [`widget`] - `create_bin` and the instance handle

pub mod config;
pub mod document;
pub mod error;
pub mod events;
pub mod host;
pub mod pipeline;
pub mod reactive;
pub mod resource;
pub mod scheduler;
pub mod state;
pub mod styles;
pub mod teardown;
pub mod widget;

// Re-export commonly used items
pub use config::{BinConfig, Sources, SplitInput};
pub use document::{assemble, PreviewMessage, ScriptError};
pub use error::{BinError, Result};
pub use events::{ListenerRegistry, PointerEvent, PointerKind, Target};
pub use host::{EditorFactory, EditorRef, HostServices, Surface, ViewportSource};
pub use pipeline::PreviewPipeline;
pub use reactive::{
    debounced, derived, derived_with_previous, effect, signal, signal_dedup, untracked, Cleanup, Debounced, Derived, Effect, Signal, Subscription,
};
pub use resource::{managed_resource, BlobStore, ManagedResource, ResourceHandle, ResourceKind, ResourceStore};
pub use scheduler::{Scheduler, TimerId, TimerQueue};
pub use state::{Expand, LayoutFlags, LayoutState, Presentation, RootBounds, Tab};
pub use teardown::Teardown;
pub use widget::{create_bin, BinHandle, Editors};
