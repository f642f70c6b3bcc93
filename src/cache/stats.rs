//! Cache Statistics Module
//!
//! Diagnostic snapshot of the persisted record. Never used for control flow.

use chrono::{DateTime, Utc};
use serde::Serialize;

// == Cache Stats ==
/// Point-in-time view of the cache record.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Number of entries currently in the record
    pub total_images: usize,
    /// Number of entries already past their TTL
    pub expired_images: usize,
    /// Serialized size of the record in bytes
    pub cache_size_bytes_estimate: usize,
    /// Insertion time of the oldest entry (Unix milliseconds), None when empty
    pub oldest_timestamp: Option<u64>,
}

impl CacheStats {
    /// Oldest insertion time formatted as RFC 3339, for log output.
    pub fn oldest_rfc3339(&self) -> Option<String> {
        self.oldest_timestamp
            .and_then(|ms| DateTime::<Utc>::from_timestamp_millis(ms as i64))
            .map(|dt| dt.to_rfc3339())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_default() {
        let stats = CacheStats::default();
        assert_eq!(stats.total_images, 0);
        assert_eq!(stats.expired_images, 0);
        assert_eq!(stats.cache_size_bytes_estimate, 0);
        assert!(stats.oldest_timestamp.is_none());
        assert!(stats.oldest_rfc3339().is_none());
    }

    #[test]
    fn test_oldest_rfc3339_formatting() {
        let stats = CacheStats {
            total_images: 1,
            expired_images: 0,
            cache_size_bytes_estimate: 64,
            oldest_timestamp: Some(0),
        };

        assert_eq!(stats.oldest_rfc3339().unwrap(), "1970-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_stats_serialize() {
        let stats = CacheStats {
            total_images: 3,
            expired_images: 1,
            cache_size_bytes_estimate: 512,
            oldest_timestamp: Some(42),
        };

        let json = serde_json::to_string(&stats).unwrap();
        assert!(json.contains("total_images"));
        assert!(json.contains("expired_images"));
        assert!(json.contains("cache_size_bytes_estimate"));
        assert!(json.contains("oldest_timestamp"));
    }
}
