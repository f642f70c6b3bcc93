//! covercache - lazy image fetch-and-cache engine
//!
//! Bounded, time-expiring image caching with visibility-triggered loading:
//! a persistent single-slot cache store, a one-shot visibility notifier, a
//! cache-first loader with single-flight fetches, and the cover-image
//! display primitive the rest of an application renders through.

pub mod cache;
pub mod config;
pub mod display;
pub mod error;
pub mod loader;
pub mod net;
pub mod viewport;

pub use cache::{CacheStats, FileMedium, ImageCache, MemoryMedium, StorageMedium};
pub use config::Config;
pub use display::{CoverImage, CoverProps, ImageView};
pub use error::{Error, Result};
pub use loader::{ImageLoader, LoadState};
pub use net::ImageFetcher;
pub use viewport::{viewport_channel, Region, Viewport, VisibilityConfig, VisibilityWatcher};
