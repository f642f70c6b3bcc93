//! Viewport Module
//!
//! Scroll geometry and the one-shot visibility notifier that defers image
//! loading until a region is about to be seen.

mod region;
mod watcher;

// Re-export public types
pub use region::{Region, Viewport};
pub use watcher::{
    viewport_channel, ViewportFeed, VisibilityConfig, VisibilityWatcher, DEFAULT_THRESHOLD,
    DEFAULT_VISIBILITY_MARGIN,
};
