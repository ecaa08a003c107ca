//! Resource Store - Revocable content locators.
//!
//! The preview is fed through temporary locators (object URLs in a browser
//! host). A [`ResourceStore`] mints them from content and revokes them; the
//! widget never assumes anything about the locator format.
//!
//! [`BlobStore`] is an in-memory store used by headless hosts and tests.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use tracing::debug;

use crate::error::{BinError, Result};

/// What a resource contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Script,
    Style,
    Document,
}

impl ResourceKind {
    /// MIME type attached to the content.
    pub fn mime(self) -> &'static str {
        match self {
            ResourceKind::Script => "text/javascript",
            ResourceKind::Style => "text/css",
            ResourceKind::Document => "text/html",
        }
    }
}

/// An opaque, revocable locator.
///
/// Cheap to clone; equality is by locator text.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ResourceHandle(Rc<str>);

impl ResourceHandle {
    pub fn new(locator: impl AsRef<str>) -> Self {
        Self(Rc::from(locator.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ResourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResourceHandle({})", self.0)
    }
}

impl fmt::Display for ResourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Mints and revokes locators.
pub trait ResourceStore {
    /// Create a new locator for `content`.
    fn create(&self, content: &str, kind: ResourceKind) -> ResourceHandle;

    /// Release a locator. Errors if the handle is unknown or already revoked.
    fn revoke(&self, handle: &ResourceHandle) -> Result<()>;

    /// Content behind a live locator.
    fn resolve(&self, handle: &ResourceHandle) -> Option<String>;
}

// =============================================================================
// BLOB STORE
// =============================================================================

struct Blob {
    kind: ResourceKind,
    content: String,
}

/// In-memory [`ResourceStore`] with `blob:spark-bin/<n>` locators.
#[derive(Default)]
pub struct BlobStore {
    blobs: RefCell<HashMap<ResourceHandle, Blob>>,
    created: Cell<u64>,
    revoked: Cell<u64>,
}

impl BlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live locators.
    pub fn live(&self) -> usize {
        self.blobs.borrow().len()
    }

    /// Number of live locators of one kind.
    pub fn live_of(&self, kind: ResourceKind) -> usize {
        self.blobs
            .borrow()
            .values()
            .filter(|blob| blob.kind == kind)
            .count()
    }

    /// Total locators ever created.
    pub fn created(&self) -> u64 {
        self.created.get()
    }

    /// Total successful revocations.
    pub fn revoked(&self) -> u64 {
        self.revoked.get()
    }

    /// Kind of a live locator.
    pub fn kind_of(&self, handle: &ResourceHandle) -> Option<ResourceKind> {
        self.blobs.borrow().get(handle).map(|blob| blob.kind)
    }
}

impl ResourceStore for BlobStore {
    fn create(&self, content: &str, kind: ResourceKind) -> ResourceHandle {
        let n = self.created.get() + 1;
        self.created.set(n);
        let handle = ResourceHandle::new(format!("blob:spark-bin/{n}"));
        self.blobs.borrow_mut().insert(
            handle.clone(),
            Blob {
                kind,
                content: content.to_owned(),
            },
        );
        debug!(%handle, mime = kind.mime(), bytes = content.len(), "resource created");
        handle
    }

    fn revoke(&self, handle: &ResourceHandle) -> Result<()> {
        match self.blobs.borrow_mut().remove(handle) {
            Some(_) => {
                self.revoked.set(self.revoked.get() + 1);
                debug!(%handle, "resource revoked");
                Ok(())
            }
            None => Err(BinError::unknown_resource(handle.as_str())),
        }
    }

    fn resolve(&self, handle: &ResourceHandle) -> Option<String> {
        self.blobs
            .borrow()
            .get(handle)
            .map(|blob| blob.content.clone())
    }
}

// =============================================================================
// Tests
// =============================================================================
