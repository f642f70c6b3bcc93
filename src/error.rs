//! Error types for the image cache engine
//!
//! Provides unified error handling using thiserror.
//!
//! None of these errors cross the cache store boundary: storage faults are
//! absorbed inside `ImageCache` (the store degrades to an empty record),
//! fetch faults are mapped to the loader's failed state, and decode faults
//! are mapped to the placeholder render path.

use thiserror::Error;

// == Error Enum ==
/// Unified error type for storage, fetch and decode faults.
#[derive(Error, Debug)]
pub enum Error {
    /// The storage medium rejected a write for capacity
    #[error("storage quota exceeded: record needs {needed} bytes, quota is {quota}")]
    QuotaExceeded {
        /// Size of the rejected record
        needed: usize,
        /// Capacity of the medium in bytes
        quota: usize,
    },

    /// The storage medium failed at the I/O level
    #[error("storage I/O failure: {0}")]
    Io(#[from] std::io::Error),

    /// The image request failed in transport (includes timeouts)
    #[error("image request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The image endpoint answered with a non-success status
    #[error("image endpoint returned status {0}")]
    UnexpectedStatus(u16),

    /// The resolved payload is not renderable base64
    #[error("image payload is not valid base64: {0}")]
    Decode(#[from] base64::DecodeError),
}

// == Result Type Alias ==
/// Convenience Result type for the image cache engine.
pub type Result<T> = std::result::Result<T, Error>;
