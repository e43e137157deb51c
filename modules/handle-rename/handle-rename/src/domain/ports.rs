//! Outbound ports: things the domain needs from the process around it.

use std::time::Duration;

use thiserror::Error;
use time::OffsetDateTime;

/// Wall clock used for timestamps and redirect expiry arithmetic.
pub trait Clock: Send + Sync {
    fn now(&self) -> OffsetDateTime;
}

/// Failure reported by a cache backend.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct CacheError {
    message: String,
}

impl CacheError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Size and key listing of a cache.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub size: usize,
    pub keys: Vec<String>,
}

/// Key/value cache with per-key TTL.
///
/// Pattern invalidation uses plain substring containment: a key is removed when
/// `key.contains(pattern)`. There is no glob syntax.
pub trait CacheStore: Send + Sync {
    /// Value under `key`, or `None` when absent or expired.
    fn get(&self, key: &str) -> Option<serde_json::Value>;

    /// Store `value`, replacing any existing entry and its expiry.
    fn set(&self, key: &str, value: serde_json::Value, ttl: Duration);

    /// Remove `key`. Returns whether an entry was removed.
    fn delete(&self, key: &str) -> bool;

    /// Remove every key containing `pattern`. Returns the number of removed entries.
    fn invalidate_pattern(&self, pattern: &str) -> Result<usize, CacheError>;

    /// Snapshot of the live keys.
    fn keys(&self) -> Result<Vec<String>, CacheError>;

    fn clear(&self);

    fn stats(&self) -> CacheStats;
}
