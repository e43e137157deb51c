//! In-process TTL cache backed by `DashMap`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::domain::ports::{CacheError, CacheStats, CacheStore};

#[derive(Debug, Clone)]
struct CacheEntry {
    value: serde_json::Value,
    /// `None` when the TTL reaches past what `Instant` can represent.
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// In-memory cache with per-key TTL.
///
/// Expired entries are evicted lazily on read and in bulk by [`purge_expired`], which
/// [`spawn_janitor`] runs on an interval.
///
/// [`purge_expired`]: InMemoryCache::purge_expired
/// [`spawn_janitor`]: InMemoryCache::spawn_janitor
#[derive(Debug, Default)]
pub struct InMemoryCache {
    entries: DashMap<String, CacheEntry>,
}

impl InMemoryCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove every expired entry. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        before.saturating_sub(self.entries.len())
    }

    /// Sweep expired entries every `interval` until `cancel` fires.
    pub fn spawn_janitor(
        self: &Arc<Self>,
        interval: Duration,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        let cache = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                tokio::select! {
                    () = cancel.cancelled() => {
                        tracing::debug!("Cache janitor stopped");
                        break;
                    }
                    _ = ticker.tick() => {
                        let removed = cache.purge_expired();
                        if removed > 0 {
                            tracing::debug!(removed, "Purged expired cache entries");
                        }
                    }
                }
            }
        })
    }
}

impl CacheStore for InMemoryCache {
    fn get(&self, key: &str) -> Option<serde_json::Value> {
        let now = Instant::now();
        {
            let entry = self.entries.get(key)?;
            if !entry.is_expired(now) {
                return Some(entry.value.clone());
            }
        }
        // read guard released above; remove_if takes the shard write lock
        self.entries.remove_if(key, |_, e| e.is_expired(now));
        None
    }

    fn set(&self, key: &str, value: serde_json::Value, ttl: Duration) {
        let expires_at = Instant::now().checked_add(ttl);
        self.entries
            .insert(key.to_owned(), CacheEntry { value, expires_at });
    }

    fn delete(&self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    fn invalidate_pattern(&self, pattern: &str) -> Result<usize, CacheError> {
        if pattern.is_empty() {
            return Ok(0);
        }
        let before = self.entries.len();
        self.entries.retain(|key, _| !key.contains(pattern));
        Ok(before.saturating_sub(self.entries.len()))
    }

    fn keys(&self) -> Result<Vec<String>, CacheError> {
        let now = Instant::now();
        let mut keys: Vec<String> = self
            .entries
            .iter()
            .filter(|e| !e.value().is_expired(now))
            .map(|e| e.key().clone())
            .collect();
        keys.sort();
        Ok(keys)
    }

    fn clear(&self) {
        self.entries.clear();
    }

    fn stats(&self) -> CacheStats {
        let keys = self.keys().unwrap_or_default();
        CacheStats {
            size: keys.len(),
            keys,
        }
    }
}
