//! Cache Entry Module
//!
//! Defines the structure of individual cached images and the composite key
//! they are stored under.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

// == Cached Image ==
/// A single cached image payload with its insertion time.
///
/// Serialized field names are part of the persisted record layout and must
/// not change: `{ "data": <payload>, "timestamp": <ms since epoch> }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedImage {
    /// Opaque payload blob (data-URI or base64-encoded image)
    pub data: String,
    /// Insertion timestamp (Unix milliseconds)
    pub timestamp: u64,
}

impl CachedImage {
    // == Constructor ==
    /// Creates a new cached image stamped with the current time.
    pub fn new(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            timestamp: current_timestamp_ms(),
        }
    }

    // == Age ==
    /// Milliseconds elapsed since insertion, as seen from `now`.
    ///
    /// Saturates at zero if the entry's timestamp lies in the future
    /// (clock adjustments between sessions).
    pub fn age_ms(&self, now: u64) -> u64 {
        now.saturating_sub(self.timestamp)
    }
}

// == Composite Key ==
/// Builds the composite lookup key for a (resource, partition) pair.
///
/// The persisted format is `<file_name>_<folder>`. File names containing
/// underscores can collide with another pair; callers supply server-side
/// file and folder names, which keeps the key space flat in practice.
pub fn composite_key(file_name: &str, folder: &str) -> String {
    format!("{}_{}", file_name, folder)
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
