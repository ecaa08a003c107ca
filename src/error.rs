//! Error types.
//!
//! Errors stay inside the widget: callers at the widget boundary log them and
//! degrade instead of propagating.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, BinError>;

#[derive(Debug, Error)]
pub enum BinError {
    #[error("invalid configuration: {0}")]
    Config(#[source] serde_json::Error),

    #[error("malformed preview message: {0}")]
    Message(#[source] serde_json::Error),

    #[error("unknown resource handle: {handle}")]
    UnknownResource { handle: String },
}

impl BinError {
    #[must_use]
    pub fn unknown_resource(handle: impl Into<String>) -> Self {
        Self::UnknownResource {
            handle: handle.into(),
        }
    }
}
