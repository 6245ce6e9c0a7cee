//! Cache-backed fetching with stale fallback
//!
//! Every remote read goes through [`ResilientFetch::fetch`]:
//!
//! 1. A fresh cache entry is returned without touching the network.
//! 2. Otherwise the remote source is called once.
//! 3. If the call fails and any cached value exists (fresh or not), that value is
//!    returned with [`STALE_CACHE_WARNING`].
//! 4. If the call fails with nothing cached, the error propagates.
//! 5. On success the raw payload is mapped; a mapping error propagates and the cache
//!    is left untouched, otherwise the raw payload is written back and the mapped
//!    value returned.
//!
//! The cache stores the raw API payload. Cached payloads go through the same mapping
//! on the way out, so anything derived from the clock reflects read time.

use std::future::Future;

use chrono::Duration;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::cache::{CacheError, CacheKey, CacheManager};
use crate::data::{ApiError, MappingError};

/// Warning attached to results served from cache after a remote failure
pub const STALE_CACHE_WARNING: &str = "⚠️ API unavailable. Showing stale cached data.";

/// Errors that abort a fetch
#[derive(Debug, Error)]
pub enum FetchError {
    /// The remote call failed and there was nothing cached to fall back to
    #[error("{0}")]
    RemoteUnavailable(#[source] ApiError),

    /// The remote answered with data that could not be mapped
    #[error("Malformed data from API: {0}")]
    MappingFailed(#[from] MappingError),

    /// The fresh response could not be written to the cache
    #[error(transparent)]
    Storage(#[from] CacheError),
}

/// Outcome of a fetch
///
/// `value` is `None` when the remote answered successfully with nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchResult<T> {
    pub value: Option<T>,
    /// Set only when `value` came from cache because the remote call failed
    pub warning: Option<String>,
}

impl<T> FetchResult<T> {
    fn fresh(value: T) -> Self {
        Self {
            value: Some(value),
            warning: None,
        }
    }

    fn stale(value: T) -> Self {
        Self {
            value: Some(value),
            warning: Some(STALE_CACHE_WARNING.to_string()),
        }
    }

    fn not_found() -> Self {
        Self {
            value: None,
            warning: None,
        }
    }

    /// Whether the value was served from cache after a remote failure
    pub fn is_stale(&self) -> bool {
        self.warning.is_some()
    }
}

/// Runs remote reads through a [`CacheManager`] with a fixed time-to-live
#[derive(Debug, Clone)]
pub struct ResilientFetch {
    cache: CacheManager,
    ttl: Duration,
}

impl ResilientFetch {
    pub fn new(cache: CacheManager, ttl: Duration) -> Self {
        Self { cache, ttl }
    }

    pub fn cache(&self) -> &CacheManager {
        &self.cache
    }

    /// Fetches `key`, preferring fresh cache, then the remote, then stale cache
    ///
    /// # Arguments
    /// * `key` - Cache entry addressed by this request
    /// * `remote` - Performs the single remote call; `Ok(None)` means "nothing found"
    /// * `map` - Converts the raw payload into the caller's domain value
    ///
    /// An `Ok(None)` from the remote is returned as an empty result and never cached.
    pub async fn fetch<Raw, T, F, Fut, M>(
        &self,
        key: &CacheKey,
        remote: F,
        map: M,
    ) -> Result<FetchResult<T>, FetchError>
    where
        Raw: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<Raw>, ApiError>>,
        M: Fn(&Raw) -> Result<T, MappingError>,
    {
        let cached = self.cache.read::<Raw>(key.as_str()).and_then(|entry| {
            match map(&entry.data) {
                Ok(value) => Some((value, entry.is_expired)),
                Err(e) => {
                    debug!(%key, error = %e, "cached payload no longer maps, treating as miss");
                    None
                }
            }
        });

        let fallback = match cached {
            Some((value, false)) => {
                debug!(%key, "cache hit");
                return Ok(FetchResult::fresh(value));
            }
            Some((value, true)) => {
                debug!(%key, "cache entry expired, refreshing");
                Some(value)
            }
            None => {
                debug!(%key, "cache miss");
                None
            }
        };

        let raw = match remote().await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(%key, "remote returned no records, cache left untouched");
                return Ok(FetchResult::not_found());
            }
            Err(e) => {
                return match fallback {
                    Some(value) => {
                        debug!(%key, error = %e, "remote unavailable, serving stale cache");
                        Ok(FetchResult::stale(value))
                    }
                    None => Err(FetchError::RemoteUnavailable(e)),
                };
            }
        };

        let value = map(&raw)?;
        self.cache.write(key.as_str(), &raw, self.ttl)?;
        debug!(%key, ttl_hours = self.ttl.num_hours(), "cache updated");
        Ok(FetchResult::fresh(value))
    }
}
