//! In-Flight Registry Module
//!
//! Tracks pending fetches by composite key so that concurrent loads of the
//! same image share one network request instead of duplicating it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::broadcast;

/// Outcome of a fetch: the payload, or `None` on any failure.
pub type FetchOutcome = Option<String>;

// == Flight ==
/// What a caller got back from the registry.
#[derive(Debug)]
pub enum Flight {
    /// No fetch was pending; this caller owns the request and must call
    /// [`InflightRegistry::complete`] when it resolves
    Leader(broadcast::Receiver<FetchOutcome>),
    /// Another caller's fetch is pending; its outcome will be shared
    Joined(broadcast::Receiver<FetchOutcome>),
}

// == In-Flight Registry ==
/// Shared map of pending fetches, keyed by composite key.
#[derive(Debug, Clone, Default)]
pub struct InflightRegistry {
    inner: Arc<Mutex<HashMap<String, broadcast::Sender<FetchOutcome>>>>,
}

impl InflightRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Joins the pending flight for `key`, or registers a new one with this
    /// caller as leader. The receiver is subscribed before the flight can
    /// complete, so the outcome cannot be missed.
    pub fn join_or_lead(&self, key: &str) -> Flight {
        let mut flights = self.lock();
        if let Some(tx) = flights.get(key) {
            return Flight::Joined(tx.subscribe());
        }
        let (tx, rx) = broadcast::channel(1);
        flights.insert(key.to_string(), tx);
        Flight::Leader(rx)
    }

    /// Resolves the flight for `key`, delivering `outcome` to every
    /// subscriber. The key is unregistered first, so a caller arriving after
    /// a failure starts a fresh flight instead of inheriting the old result.
    pub fn complete(&self, key: &str, outcome: FetchOutcome) {
        let tx = self.lock().remove(key);
        if let Some(tx) = tx {
            let _ = tx.send(outcome);
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, broadcast::Sender<FetchOutcome>>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
