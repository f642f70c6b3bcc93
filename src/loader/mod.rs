//! Image Loader Module
//!
//! Per-instance orchestration of "use cache / fetch from network / fall back
//! to placeholder", plus the shared service that display instances load
//! through.

mod inflight;

pub use inflight::{FetchOutcome, Flight, InflightRegistry};

use tracing::debug;

use crate::cache::{composite_key, ImageCache};
use crate::net::ImageFetcher;

// == Load State ==
/// Lifecycle of one display instance's load attempt.
///
/// `Idle` covers everything before the visibility signal. A failure is final
/// for the instance; a fresh mount starts a fresh attempt.
#[derive(Debug, Clone)]
pub enum LoadState {
    /// Mounted, waiting for the region to become visible
    Idle,
    /// Visibility fired; cache checked, fetch possibly in flight
    Loading,
    /// Payload resolved (from cache or network)
    Loaded(String),
    /// Fetch failed; nothing was cached
    Failed,
}

impl LoadState {
    pub fn is_idle(&self) -> bool {
        matches!(self, LoadState::Idle)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadState::Loaded(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, LoadState::Failed)
    }
}

// == Image Loader ==
/// Shared load service: cache-first lookup with single-flight network fetch.
///
/// Cloning shares the cache, the HTTP client and the in-flight registry.
#[derive(Debug, Clone)]
pub struct ImageLoader {
    cache: ImageCache,
    fetcher: ImageFetcher,
    inflight: InflightRegistry,
}

impl ImageLoader {
    /// Creates a loader over an injected cache and fetcher.
    pub fn new(cache: ImageCache, fetcher: ImageFetcher) -> Self {
        Self {
            cache,
            fetcher,
            inflight: InflightRegistry::new(),
        }
    }

    /// The cache this loader writes through to.
    pub fn cache(&self) -> &ImageCache {
        &self.cache
    }

    /// Resolves the payload for one (resource, partition) pair.
    ///
    /// Cache hit: returns the cached payload, no network. Cache miss: joins
    /// the in-flight fetch for the key, or leads a new one. The fetch runs
    /// as a detached task that writes through to the cache on success, so
    /// dropping this future never cancels the request; a response arriving
    /// with no observer left still lands in the cache.
    pub async fn load(&self, file_name: &str, folder: &str) -> FetchOutcome {
        if let Some(payload) = self.cache.get(file_name, folder) {
            debug!("image served from cache: {}/{}", folder, file_name);
            return Some(payload);
        }

        let key = composite_key(file_name, folder);
        let mut rx = match self.inflight.join_or_lead(&key) {
            Flight::Joined(rx) => {
                debug!("joining in-flight fetch for {}", key);
                rx
            }
            Flight::Leader(rx) => {
                self.spawn_fetch(key, file_name.to_string(), folder.to_string());
                rx
            }
        };

        rx.recv().await.unwrap_or(None)
    }

    /// Spawns the detached fetch-and-write-through task for a led flight.
    fn spawn_fetch(&self, key: String, file_name: String, folder: String) {
        let cache = self.cache.clone();
        let fetcher = self.fetcher.clone();
        let inflight = self.inflight.clone();

        tokio::spawn(async move {
            let outcome = match fetcher.fetch_base64(&file_name, &folder).await {
                Ok(payload) => {
                    cache.set(&file_name, &folder, &payload);
                    Some(payload)
                }
                Err(err) => {
                    debug!("image fetch failed for {}/{}: {}", folder, file_name, err);
                    None
                }
            };
            inflight.complete(&key, outcome);
        });
    }
}
