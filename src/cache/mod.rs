//! Cache Module
//!
//! Provides the bounded, TTL-expiring image cache persisted through a
//! single-slot storage medium.

mod entry;
mod medium;
mod stats;
mod store;


// Re-export public types
pub use entry::{composite_key, current_timestamp_ms, CachedImage};
pub use medium::{FileMedium, MemoryMedium, StorageMedium};
pub use stats::CacheStats;
pub use store::ImageCache;

use std::time::Duration;

// == Public Constants ==
/// Maximum number of cached images by default
pub const DEFAULT_MAX_ENTRIES: usize = 50;

/// Default time-to-live for cached images
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);
