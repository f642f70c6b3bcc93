//! Cache Store Module
//!
//! Bounded, time-expiring image cache persisted as one aggregate record in a
//! single storage slot. Every operation reads the record, mutates it, and
//! writes it back in full.
//!
//! Every operation is total: malformed persisted state, serialization
//! failures and storage-medium errors degrade to "cache empty" and are only
//! visible in the diagnostic log, never to the caller.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tracing::{debug, warn};

use crate::cache::{composite_key, current_timestamp_ms, CacheStats, CachedImage, StorageMedium};

/// The aggregate record: composite key -> cached image.
type Record = HashMap<String, CachedImage>;

// == Image Cache ==
/// Handle to the image cache service.
///
/// Cloning the handle shares the same store, preserving single-instance
/// semantics per process; constructing a second `ImageCache` (e.g. in tests)
/// yields a fully isolated store.
#[derive(Clone)]
pub struct ImageCache {
    inner: Arc<Mutex<StoreInner>>,
}

struct StoreInner {
    /// Persistent single-slot medium holding the serialized record
    medium: Box<dyn StorageMedium>,
    /// Maximum number of entries allowed
    max_entries: usize,
    /// Time-to-live in milliseconds
    ttl_ms: u64,
}

impl std::fmt::Debug for ImageCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageCache").finish_non_exhaustive()
    }
}

impl ImageCache {
    // == Constructors ==
    /// Creates a cache backed by `medium` with the given capacity and TTL.
    pub fn new(medium: Box<dyn StorageMedium>, max_entries: usize, ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(StoreInner {
                medium,
                max_entries,
                ttl_ms: ttl.as_millis() as u64,
            })),
        }
    }

    /// Creates a cache backed by an unbounded in-process slot.
    pub fn in_memory(max_entries: usize, ttl: Duration) -> Self {
        Self::new(
            Box::new(crate::cache::MemoryMedium::new()),
            max_entries,
            ttl,
        )
    }

    // == Get ==
    /// Looks up the payload cached for `(file_name, folder)`.
    ///
    /// An entry older than the TTL is deleted from the record on the spot
    /// and reported as absent, so a miss can mutate persisted state.
    pub fn get(&self, file_name: &str, folder: &str) -> Option<String> {
        let key = composite_key(file_name, folder);
        let now = current_timestamp_ms();

        let mut inner = self.lock();
        let mut record = inner.load_record();

        if let Some(entry) = record.get(&key) {
            if entry.age_ms(now) > inner.ttl_ms {
                record.remove(&key);
                inner.persist(&mut record);
                debug!("expired image dropped on read: {}", key);
                return None;
            }
            return Some(entry.data.clone());
        }
        None
    }

    // == Set ==
    /// Caches `payload` under `(file_name, folder)`, stamped with now.
    ///
    /// Inserting a new key at capacity first evicts entries in ascending
    /// `timestamp` order until the record is back under the bound.
    /// Overwriting an existing key refreshes its timestamp without evicting.
    pub fn set(&self, file_name: &str, folder: &str, payload: &str) {
        let key = composite_key(file_name, folder);

        let mut inner = self.lock();
        let mut record = inner.load_record();

        if !record.contains_key(&key) {
            while record.len() >= inner.max_entries {
                if !evict_oldest(&mut record) {
                    break;
                }
            }
        }

        record.insert(key, CachedImage::new(payload));
        inner.persist(&mut record);
    }

    // == Remove ==
    /// Deletes one entry if present; no-op otherwise.
    pub fn remove(&self, file_name: &str, folder: &str) {
        let key = composite_key(file_name, folder);

        let mut inner = self.lock();
        let mut record = inner.load_record();

        if record.remove(&key).is_some() {
            inner.persist(&mut record);
        }
    }

    // == Clear ==
    /// Discards the entire record, slot included.
    ///
    /// Invoked when the active user session ends, so one account's cached
    /// imagery never leaks into the next session on a shared device.
    pub fn clear(&self) {
        self.lock().medium.clear();
    }

    // == Purge Expired ==
    /// Drops every entry past its TTL and returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = current_timestamp_ms();

        let mut inner = self.lock();
        let mut record = inner.load_record();

        let removed = purge_expired_entries(&mut record, inner.ttl_ms, now);
        if removed > 0 {
            inner.persist(&mut record);
        }
        removed
    }

    // == Stats ==
    /// Diagnostic snapshot of the record. Never used for control flow.
    pub fn stats(&self) -> CacheStats {
        let now = current_timestamp_ms();

        let inner = self.lock();
        let record = inner.load_record();

        CacheStats {
            total_images: record.len(),
            expired_images: record
                .values()
                .filter(|entry| entry.age_ms(now) > inner.ttl_ms)
                .count(),
            cache_size_bytes_estimate: serde_json::to_string(&record)
                .map(|raw| raw.len())
                .unwrap_or(0),
            oldest_timestamp: record.values().map(|entry| entry.timestamp).min(),
        }
    }

    /// Acquires the store lock, recovering from poisoning so that a panic in
    /// one consumer can never take the cache down with it.
    fn lock(&self) -> MutexGuard<'_, StoreInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl StoreInner {
    /// Reads and deserializes the record; unreadable state is treated as an
    /// empty collection.
    fn load_record(&self) -> Record {
        match self.medium.load() {
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(record) => record,
                Err(err) => {
                    debug!("unreadable cache record treated as empty: {}", err);
                    Record::new()
                }
            },
            None => Record::new(),
        }
    }

    /// Writes the record back in full.
    ///
    /// A rejected write triggers a purge of all TTL-expired entries and one
    /// silent retry; a second failure is logged and dropped.
    fn persist(&mut self, record: &mut Record) {
        let serialized = match serde_json::to_string(record) {
            Ok(raw) => raw,
            Err(err) => {
                debug!("cache record not serializable, skipping write: {}", err);
                return;
            }
        };

        if let Err(err) = self.medium.save(&serialized) {
            warn!("cache write rejected ({}), purging expired entries and retrying", err);
            purge_expired_entries(record, self.ttl_ms, current_timestamp_ms());
            match serde_json::to_string(record) {
                Ok(retry) => {
                    if let Err(err) = self.medium.save(&retry) {
                        debug!("cache write still failing after purge: {}", err);
                    }
                }
                Err(err) => debug!("cache record not serializable after purge: {}", err),
            }
        }
    }
}

/// Removes the entry with the smallest `timestamp`. Ties are broken by key
/// ordering so eviction stays deterministic. Returns false on an empty record.
fn evict_oldest(record: &mut Record) -> bool {
    let oldest = record
        .iter()
        .min_by(|a, b| a.1.timestamp.cmp(&b.1.timestamp).then_with(|| a.0.cmp(b.0)))
        .map(|(key, _)| key.clone());

    match oldest {
        Some(key) => {
            record.remove(&key);
            debug!("evicted oldest cached image: {}", key);
            true
        }
        None => false,
    }
}

/// Drops every entry older than `ttl_ms`. Returns how many were removed.
fn purge_expired_entries(record: &mut Record, ttl_ms: u64, now: u64) -> usize {
    let before = record.len();
    record.retain(|_, entry| entry.age_ms(now) <= ttl_ms);
    before - record.len()
}
