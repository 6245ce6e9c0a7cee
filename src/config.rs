//! Runtime configuration
//!
//! Everything the CLI needs to build its cache and API client lives in an
//! [`AppConfig`] value that is passed down explicitly.

use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;

use crate::data::openf1::OPENF1_BASE_URL;

/// Cache TTL in hours
pub const CACHE_TTL_HOURS: i64 = 24;

/// Upper bound on a single API request
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Used when no platform cache directory can be determined
const FALLBACK_CACHE_DIR: &str = ".pitwall_cache";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Directory holding one JSON file per cache entry
    pub cache_dir: PathBuf,
    /// OpenF1 API root, without trailing slash
    pub base_url: String,
    pub request_timeout: Duration,
    pub cache_ttl: chrono::Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            base_url: OPENF1_BASE_URL.to_string(),
            request_timeout: REQUEST_TIMEOUT,
            cache_ttl: chrono::Duration::hours(CACHE_TTL_HOURS),
        }
    }
}

impl AppConfig {
    /// Overrides the cache directory when one is given
    pub fn with_cache_dir(mut self, cache_dir: Option<PathBuf>) -> Self {
        if let Some(dir) = cache_dir {
            self.cache_dir = dir;
        }
        self
    }

    /// Overrides the API base URL when one is given
    pub fn with_base_url(mut self, base_url: Option<String>) -> Self {
        if let Some(url) = base_url {
            self.base_url = url;
        }
        self
    }
}

/// XDG-compliant cache directory (`~/.cache/pitwall` on Linux)
///
/// Falls back to `./.pitwall_cache` when no home directory is known.
pub fn default_cache_dir() -> PathBuf {
    ProjectDirs::from("", "", "pitwall")
        .map(|dirs| dirs.cache_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(FALLBACK_CACHE_DIR))
}
