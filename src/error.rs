//! Error types for filekv
//!
//! Provides a unified error type for all store operations.

use thiserror::Error;

/// Result type alias using StoreError
pub type Result<T> = std::result::Result<T, StoreError>;

/// Unified error type for store operations
///
/// Every failure an operation can hit maps onto one of these variants, so
/// callers can tell a key conflict from a missing key from a genuine I/O
/// problem. The boolean convenience wrappers on `FileStore` collapse all of
/// them to `false` after logging the cause.
#[derive(Debug, Error)]
pub enum StoreError {
    // -------------------------------------------------------------------------
    // Key-level outcomes
    // -------------------------------------------------------------------------
    /// Exclusive create targeted a key whose file already exists
    #[error("key conflict: {0} already exists")]
    Conflict(String),

    /// Read or delete targeted a key with no file on disk
    #[error("key not found: {0}")]
    NotFound(String),

    /// Key rendering ends with the temp suffix reserved by the write
    /// discipline
    #[error("invalid key: {0} ends with the reserved temp suffix")]
    InvalidKey(String),

    // -------------------------------------------------------------------------
    // I/O and data errors
    // -------------------------------------------------------------------------
    /// Any other filesystem-level failure (permissions, disk full,
    /// corrupt compressed stream, truncated read)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The factory rejected the bytes read back for a value
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl StoreError {
    /// Classify an `io::Error` raised while reading or deleting `name`'s file.
    ///
    /// A missing file carries key-level meaning on those paths; everything
    /// else stays a plain I/O failure.
    pub(crate) fn from_io(err: std::io::Error, name: &str) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(name.to_string()),
            _ => Self::Io(err),
        }
    }
}
