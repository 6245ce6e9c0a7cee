//! Cache module for storing API responses to disk
//!
//! This module provides a cache manager that persists API responses to the filesystem
//! with configurable TTL (time-to-live) values. It supports graceful degradation by
//! returning expired cache entries with an `is_expired` flag, allowing the application
//! to serve stale data when the API is unavailable.

mod key;
mod manager;

pub use key::CacheKey;
pub use manager::{CacheError, CacheInfoEntry, CacheManager, CachedData};
