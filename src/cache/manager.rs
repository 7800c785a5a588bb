//! Cache manager for persisting results to disk
//!
//! Provides a `CacheManager` that stores serializable data in named JSON
//! slots together with the instant it was produced. Freshness is decided by
//! the reader, not by the storage.

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Wrapper struct for a slot stored on disk
#[derive(Debug, Serialize, Deserialize)]
struct SlotEntry<T> {
    /// The cached data
    data: T,
    /// When the data was produced
    timestamp: DateTime<Utc>,
}

/// Contents of a slot read back from disk
#[derive(Debug, Clone, PartialEq)]
pub struct CachedData<T> {
    pub data: T,
    pub timestamp: DateTime<Utc>,
}

impl<T> CachedData<T> {
    /// Whether the slot is younger than `ttl` at `now`
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: chrono::Duration) -> bool {
        now - self.timestamp < ttl
    }
}

/// Manages reading and writing cache slots on disk
///
/// Slots live as JSON files in an XDG-compliant cache directory
/// (`~/.cache/farmweather/` on Linux), one file per slot name.
#[derive(Debug, Clone)]
pub struct CacheManager {
    /// Directory where cache files are stored
    cache_dir: PathBuf,
}

impl CacheManager {
    /// Creates a new CacheManager using the XDG-compliant cache directory
    ///
    /// Returns `None` if the cache directory cannot be determined (e.g., no home directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "farmweather")?;
        let cache_dir = project_dirs.cache_dir().to_path_buf();
        Some(Self { cache_dir })
    }

    /// Creates a new CacheManager with a custom cache directory
    pub fn with_dir(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    /// Returns the path to the file backing the given slot
    fn cache_path(&self, slot: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", slot))
    }

    /// Ensures the cache directory exists
    fn ensure_dir(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.cache_dir)
    }

    /// Overwrites a slot with `data` produced at `timestamp`
    pub fn write<T: Serialize>(
        &self,
        slot: &str,
        data: &T,
        timestamp: DateTime<Utc>,
    ) -> std::io::Result<()> {
        self.ensure_dir()?;

        let entry = SlotEntry { data, timestamp };
        let json = serde_json::to_string_pretty(&entry)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        // Write then rename so a reader never sees a half-written slot
        let path = self.cache_path(slot);
        let tmp_path = path.with_extension(format!("{}.tmp", std::process::id()));
        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, &path)
    }

    /// Reads a slot
    ///
    /// Returns `None` if the slot doesn't exist or cannot be parsed.
    pub fn read<T: DeserializeOwned>(&self, slot: &str) -> Option<CachedData<T>> {
        let content = fs::read_to_string(self.cache_path(slot)).ok()?;
        let entry: SlotEntry<T> = serde_json::from_str(&content).ok()?;

        Some(CachedData {
            data: entry.data,
            timestamp: entry.timestamp,
        })
    }
}
