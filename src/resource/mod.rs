//! Resources - Revocable preview handles and their lifecycle.
//!
//! - [`store`]: the external handle provider and an in-memory implementation
//! - [`managed`]: binds handle generations to a derived's recomputation

pub mod managed;
pub mod store;

pub use managed::{managed_resource, ManagedResource};
pub use store::{BlobStore, ResourceHandle, ResourceKind, ResourceStore};
