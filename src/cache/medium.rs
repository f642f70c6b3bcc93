//! Storage Medium Module
//!
//! Abstracts the persistent, synchronous, single-slot medium the cache
//! record lives in. The store serializes the full aggregate record into one
//! slot; the medium only ever sees an opaque string, keeping encoding
//! concerns out of the storage contract.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};

// == Storage Medium Trait ==
/// A synchronous single-slot string store.
///
/// `load` and `clear` are infallible from the caller's point of view; a
/// medium that cannot produce its slot reports an empty one. Only `save`
/// can fail, and the cache store absorbs that failure too.
pub trait StorageMedium: Send {
    /// Reads the slot. Returns `None` when the slot is empty or unreadable.
    fn load(&self) -> Option<String>;

    /// Replaces the slot with `record` in full.
    fn save(&mut self, record: &str) -> Result<()>;

    /// Discards the slot.
    fn clear(&mut self);
}

// == File Medium ==
/// Stores the record as a single file on disk.
#[derive(Debug)]
pub struct FileMedium {
    path: PathBuf,
}

impl FileMedium {
    /// Creates a medium backed by the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StorageMedium for FileMedium {
    fn load(&self) -> Option<String> {
        fs::read_to_string(&self.path).ok()
    }

    fn save(&mut self, record: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, record)?;
        Ok(())
    }

    fn clear(&mut self) {
        if let Err(err) = fs::remove_file(&self.path) {
            if err.kind() != std::io::ErrorKind::NotFound {
                debug!("could not remove cache file {:?}: {}", self.path, err);
            }
        }
    }
}

// == Memory Medium ==
/// In-process slot with an optional byte quota.
///
/// The quota makes the capacity-rejection path of the underlying medium
/// reproducible: `save` fails once the serialized record outgrows it.
#[derive(Debug, Default)]
pub struct MemoryMedium {
    slot: Option<String>,
    quota: Option<usize>,
}

impl MemoryMedium {
    /// Creates an empty unbounded medium.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty medium that rejects records larger than `bytes`.
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            slot: None,
            quota: Some(bytes),
        }
    }

    /// Creates a medium whose slot already holds `raw` (corrupt-state tests).
    pub fn with_contents(raw: impl Into<String>) -> Self {
        Self {
            slot: Some(raw.into()),
            quota: None,
        }
    }
}

impl StorageMedium for MemoryMedium {
    fn load(&self) -> Option<String> {
        self.slot.clone()
    }

    fn save(&mut self, record: &str) -> Result<()> {
        if let Some(quota) = self.quota {
            if record.len() > quota {
                return Err(Error::QuotaExceeded {
                    needed: record.len(),
                    quota,
                });
            }
        }
        self.slot = Some(record.to_string());
        Ok(())
    }

    fn clear(&mut self) {
        self.slot = None;
    }
}
