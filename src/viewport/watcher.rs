//! Visibility Watcher Module
//!
//! One-shot notifier that resolves the first time a region intersects the
//! margin-expanded viewport by at least the configured threshold fraction.

use tokio::sync::watch;

use super::region::{Region, Viewport};

// == Public Constants ==
/// Default fraction of a region that must be inside the window
pub const DEFAULT_THRESHOLD: f32 = 0.1;

/// Default margin in logical pixels by which the viewport is expanded
pub const DEFAULT_VISIBILITY_MARGIN: f32 = 50.0;

/// Stream of viewport updates a watcher subscribes to.
pub type ViewportFeed = watch::Receiver<Viewport>;

/// Creates a viewport feed seeded with `initial`.
///
/// The sender side belongs to whoever owns the scroll position; every
/// watcher holds a cheap receiver clone.
pub fn viewport_channel(initial: Viewport) -> (watch::Sender<Viewport>, ViewportFeed) {
    watch::channel(initial)
}

// == Visibility Config ==
/// Intersection threshold and viewport margin for a watcher.
#[derive(Debug, Clone, Copy)]
pub struct VisibilityConfig {
    /// Fraction of the region that must intersect the window, `0.0..=1.0`
    pub threshold: f32,
    /// Logical pixels by which the window is expanded on both ends
    pub margin: f32,
}

impl Default for VisibilityConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            margin: DEFAULT_VISIBILITY_MARGIN,
        }
    }
}

// == Visibility Watcher ==
/// One-shot visibility notifier for a single region.
///
/// `wait_visible` consumes the watcher, so an instance can fire at most
/// once; once it resolves, the subscription is gone for good and the region
/// leaving and re-entering view cannot fire it again. Dropping the returned
/// future is teardown.
#[derive(Debug)]
pub struct VisibilityWatcher {
    feed: ViewportFeed,
    region: Region,
    config: VisibilityConfig,
}

impl VisibilityWatcher {
    /// Attaches a watcher for `region` to a viewport feed.
    pub fn new(feed: ViewportFeed, region: Region, config: VisibilityConfig) -> Self {
        Self {
            feed,
            region,
            config,
        }
    }

    /// Resolves with `true` the first time the region is visible, checking
    /// the current viewport immediately on attach. Resolves with `false` if
    /// the feed closes before visibility is ever reached.
    pub async fn wait_visible(mut self) -> bool {
        loop {
            let viewport = *self.feed.borrow_and_update();
            let fraction = self.region.visible_fraction(&viewport, self.config.margin);
            if fraction > 0.0 && fraction >= self.config.threshold {
                return true;
            }
            if self.feed.changed().await.is_err() {
                return false;
            }
        }
    }
}
