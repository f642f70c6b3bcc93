//! Configuration Module
//!
//! Handles loading and managing engine configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::cache::{DEFAULT_MAX_ENTRIES, DEFAULT_TTL};
use crate::viewport::{DEFAULT_THRESHOLD, DEFAULT_VISIBILITY_MARGIN};

/// Engine configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of cached images
    pub max_entries: usize,
    /// Time-to-live in seconds for cached images
    pub ttl_secs: u64,
    /// Path of the single-slot persistent record
    pub storage_path: PathBuf,
    /// Base address of the image endpoint
    pub base_url: String,
    /// Fraction of a region that must intersect the viewport before loading
    pub visibility_threshold: f32,
    /// Margin in logical pixels by which the viewport is expanded
    pub visibility_margin: f32,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `IMAGE_CACHE_MAX_ENTRIES` - Maximum cached images (default: 50)
    /// - `IMAGE_CACHE_TTL_SECS` - TTL in seconds (default: 86400)
    /// - `IMAGE_CACHE_PATH` - Persistent record path (default: image_cache.json)
    /// - `IMAGE_BASE_URL` - Image endpoint base address (default: empty, demo serves its own)
    /// - `VISIBILITY_THRESHOLD` - Intersection fraction (default: 0.1)
    /// - `VISIBILITY_MARGIN` - Viewport margin in px (default: 50)
    pub fn from_env() -> Self {
        Self {
            max_entries: env::var("IMAGE_CACHE_MAX_ENTRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_ENTRIES),
            ttl_secs: env::var("IMAGE_CACHE_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_TTL.as_secs()),
            storage_path: env::var("IMAGE_CACHE_PATH")
                .ok()
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("image_cache.json")),
            base_url: env::var("IMAGE_BASE_URL").unwrap_or_default(),
            visibility_threshold: env::var("VISIBILITY_THRESHOLD")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_THRESHOLD),
            visibility_margin: env::var("VISIBILITY_MARGIN")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_VISIBILITY_MARGIN),
        }
    }

    /// Time-to-live as a [`Duration`].
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            ttl_secs: DEFAULT_TTL.as_secs(),
            storage_path: PathBuf::from("image_cache.json"),
            base_url: String::new(),
            visibility_threshold: DEFAULT_THRESHOLD,
            visibility_margin: DEFAULT_VISIBILITY_MARGIN,
        }
    }
}
