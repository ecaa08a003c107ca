//! Reactive - Dependency-tracking data binding for the playground.
//!
//! The primitives here exist to serve the widget's derived-state graph:
//!
//! - [`Signal`]: mutable cell with change notification
//! - [`Derived`]: cached computation, pull-evaluated, push-invalidated
//! - [`Effect`]: eager side effect with cleanup
//! - [`Debounced`]: derived value republished after a quiet window
//!
//! # Data flow
//!
//! ```text
//! signal.set() → mark dependents dirty → queue effects → flush when the batch closes
//! derived.get() → re-run compute if dirty → rebind to what it read
//! ```
//!
//! Tracking state is thread-local, so independent widget instances on
//! different threads never observe each other's evaluations.

pub mod debounce;
pub mod derived;
pub mod effect;
pub mod runtime;
pub mod signal;

pub use debounce::{debounced, Debounced};
pub use derived::{derived, derived_with_previous, Derived};
pub use effect::{effect, Cleanup, Effect, IntoCleanup};
pub use runtime::{is_tracking, untracked};
pub(crate) use runtime::batch;
pub use signal::{signal, signal_dedup, Signal, Subscription};
