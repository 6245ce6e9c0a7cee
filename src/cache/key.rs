//! Deterministic cache keys built from an operation name and its filters

use std::fmt;

/// Separator placed between key segments
const SEGMENT_SEPARATOR: char = '_';

/// A cache key namespaced by operation and filter parameters
///
/// Each segment is escaped so that only `[A-Za-z0-9.-]` appear verbatim and every
/// other byte (including the separator itself) becomes `%XX`. Distinct parameter
/// tuples therefore never produce the same key, and every key is a valid file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Starts a key for the given operation name
    pub fn new(operation: &str) -> Self {
        Self(escape_segment(operation))
    }

    /// Appends a filter parameter segment
    pub fn with(mut self, param: &str) -> Self {
        self.0.push(SEGMENT_SEPARATOR);
        self.0.push_str(&escape_segment(param));
        self
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn escape_segment(segment: &str) -> String {
    let mut escaped = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'.' {
            escaped.push(byte as char);
        } else {
            escaped.push_str(&format!("%{:02X}", byte));
        }
    }
    escaped
}
