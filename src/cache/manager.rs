//! Cache manager for persisting API responses to disk
//!
//! Provides a `CacheManager` that stores serializable data to JSON files with
//! expiry timestamps, supporting graceful degradation when the API is unavailable.

use chrono::{DateTime, Duration, Utc};
use serde::{de::DeserializeOwned, de::IgnoredAny, Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

/// File extension used for every managed cache entry
const ENTRY_EXTENSION: &str = "json";

/// Errors that can occur when writing to or enumerating the cache
#[derive(Debug, Error)]
pub enum CacheError {
    /// Directory creation, file write or removal failed
    #[error("Cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The value could not be serialized
    #[error("Cache serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Wrapper struct for cached data stored on disk
#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry<T> {
    /// When the data was cached
    created_at: DateTime<Utc>,
    /// When the cache entry expires
    expires_at: DateTime<Utc>,
    /// The cached data
    data: T,
}

/// Result of reading from cache, including metadata about cache freshness
#[derive(Debug)]
pub struct CachedData<T> {
    /// The cached data
    pub data: T,
    /// When the data was originally cached
    pub created_at: DateTime<Utc>,
    /// When the entry stops being fresh
    pub expires_at: DateTime<Utc>,
    /// Whether the cache entry has expired
    pub is_expired: bool,
}

/// Read-only description of one stored entry, used for `cache info`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheInfoEntry {
    /// Storage key (file name without the `.json` extension)
    pub key: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub is_expired: bool,
    /// Size of the entry on disk in bytes
    pub size: u64,
}

/// Manages reading and writing cached data to disk
///
/// Each entry lives in its own `<key>.json` file under the configured directory and
/// records its creation and expiry timestamps. Expired entries are still returned
/// (with `is_expired = true`) so callers can fall back to them when the API fails.
#[derive(Debug, Clone)]
pub struct CacheManager {
    /// Directory where cache files are stored
    cache_dir: PathBuf,
}

impl CacheManager {
    /// Creates a CacheManager rooted at the given directory
    ///
    /// The directory is not touched until the first write.
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    /// Returns the path to a cache file for the given key
    fn cache_path(&self, key: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.{}", key, ENTRY_EXTENSION))
    }

    /// Ensures the cache directory exists
    fn ensure_dir(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.cache_dir)
    }

    /// Writes data to the cache with the given time-to-live
    ///
    /// Any existing entry under `key` is replaced. A negative `ttl` produces an
    /// entry that is already expired.
    ///
    /// # Arguments
    /// * `key` - Unique identifier for the cache entry (e.g., "weekend_Belgium_2023")
    /// * `data` - The data to cache (must implement Serialize)
    /// * `ttl` - How long the cache entry should be considered fresh
    ///
    /// # Returns
    /// * `Ok(())` on success
    /// * `Err(CacheError)` if directory creation, serialization or the file write fails
    pub fn write<T: Serialize>(&self, key: &str, data: &T, ttl: Duration) -> Result<(), CacheError> {
        self.ensure_dir()?;

        let now = Utc::now();
        let entry = CacheEntry {
            created_at: now,
            expires_at: now + ttl,
            data,
        };

        let json = serde_json::to_string_pretty(&entry)?;
        fs::write(self.cache_path(key), json)?;
        Ok(())
    }

    /// Reads data from the cache
    ///
    /// Returns `None` if the entry doesn't exist, cannot be read, or cannot be parsed;
    /// a corrupt entry is indistinguishable from a cold cache.
    /// Returns `Some(CachedData)` with `is_expired = true` if the entry exists but has
    /// expired.
    pub fn read<T: DeserializeOwned>(&self, key: &str) -> Option<CachedData<T>> {
        let path = self.cache_path(key);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                if e.kind() != ErrorKind::NotFound {
                    debug!(key, error = %e, "cache read failed, treating as miss");
                }
                return None;
            }
        };

        let entry: CacheEntry<T> = match serde_json::from_str(&content) {
            Ok(entry) => entry,
            Err(e) => {
                debug!(key, error = %e, "cache entry is corrupt, treating as miss");
                return None;
            }
        };

        Some(CachedData {
            data: entry.data,
            created_at: entry.created_at,
            expires_at: entry.expires_at,
            is_expired: Utc::now() > entry.expires_at,
        })
    }

    /// Removes every managed entry, returning how many were deleted
    ///
    /// Managed entries are the `*.json` files directly inside the cache directory that
    /// hold a cache envelope; other files are left alone. Removal continues past a
    /// failing file and the first failure is returned once the rest are gone. A
    /// missing directory is an empty cache, not an error.
    pub fn clear(&self) -> Result<usize, CacheError> {
        let mut removed = 0;
        let mut first_error = None;
        for entry in self.managed_entries()? {
            match fs::remove_file(&entry.path) {
                Ok(()) => removed += 1,
                Err(e) => {
                    debug!(key = %entry.key, error = %e, "failed to remove cache entry");
                    first_error.get_or_insert(e);
                }
            }
        }
        debug!(removed, dir = %self.cache_dir.display(), "cache cleared");
        match first_error {
            Some(e) => Err(e.into()),
            None => Ok(removed),
        }
    }

    /// Lists all managed entries along with the absolute cache location
    ///
    /// Entries are sorted by key.
    pub fn info(&self) -> Result<(Vec<CacheInfoEntry>, PathBuf), CacheError> {
        let location = std::path::absolute(&self.cache_dir)?;
        let now = Utc::now();

        let mut entries: Vec<CacheInfoEntry> = self
            .managed_entries()?
            .into_iter()
            .map(|entry| CacheInfoEntry {
                key: entry.key,
                created_at: entry.created_at,
                expires_at: entry.expires_at,
                is_expired: now > entry.expires_at,
                size: entry.size,
            })
            .collect();

        entries.sort_by(|a, b| a.key.cmp(&b.key));
        Ok((entries, location))
    }

    /// Entry files that parse as a cache envelope; empty when the directory does not exist
    fn managed_entries(&self) -> std::io::Result<Vec<ManagedEntry>> {
        let dir = match fs::read_dir(&self.cache_dir) {
            Ok(dir) => dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let mut entries = Vec::new();
        for dir_entry in dir {
            let dir_entry = dir_entry?;
            let path = dir_entry.path();
            let is_candidate = dir_entry.file_type()?.is_file()
                && path.extension().is_some_and(|ext| ext == ENTRY_EXTENSION);
            if !is_candidate {
                continue;
            }
            let Some(key) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
                continue;
            };

            let content = match fs::read_to_string(&path) {
                Ok(content) => content,
                Err(e) => {
                    debug!(key = %key, error = %e, "skipping unreadable file");
                    continue;
                }
            };
            let envelope: CacheEntry<IgnoredAny> = match serde_json::from_str(&content) {
                Ok(envelope) => envelope,
                Err(e) => {
                    debug!(key = %key, error = %e, "skipping file without a cache envelope");
                    continue;
                }
            };

            entries.push(ManagedEntry {
                path,
                key,
                created_at: envelope.created_at,
                expires_at: envelope.expires_at,
                size: content.len() as u64,
            });
        }
        Ok(entries)
    }
}

/// An entry file found on disk along with its envelope metadata
struct ManagedEntry {
    path: PathBuf,
    key: String,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    size: u64,
}
