//! Cache invalidation coordinator.
//!
//! Owns the mapping from a user identity to the cache keys derived from it. Keys are
//! namespaced as `<namespace>:<handle>` and `<namespace>:<user id>`; invalidation uses
//! the store's substring semantics, so `profile:alice` also drops `profile:alice:avatar`.

use std::sync::Arc;

use handle_rename_sdk::{CacheInvalidationResult, UserIdentity};
use serde_json::json;
use uuid::Uuid;

use crate::config::CacheConfig;
use crate::domain::error::DomainError;
use crate::domain::ports::CacheStore;

/// Namespaces of every cached view derived from a user.
pub const KEY_NAMESPACES: [&str; 7] = [
    "profile",
    "pages",
    "comments",
    "stats",
    "preferences",
    "sessions",
    "activity",
];

/// Key patterns owned by `(handle, id)`: each namespace with the handle, then with the id,
/// followed by the bare handle as a fuzzy pattern.
#[must_use]
pub fn generate_key_patterns(handle: &str, id: Uuid) -> Vec<String> {
    let mut patterns = Vec::with_capacity(KEY_NAMESPACES.len() * 2 + 1);
    for ns in KEY_NAMESPACES {
        patterns.push(format!("{ns}:{handle}"));
        patterns.push(format!("{ns}:{id}"));
    }
    patterns.push(handle.to_owned());
    patterns
}

/// Who is being renamed.
#[derive(Debug, Clone, Copy)]
pub struct CacheContext<'a> {
    pub user_id: Uuid,
    pub old_handle: &'a str,
    pub new_handle: &'a str,
    /// Identity after the rename, used to repopulate the profile entry.
    pub identity: Option<&'a UserIdentity>,
}

#[derive(Debug, Clone, Copy, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct InvalidateOptions {
    pub dry_run: bool,
    /// Leave keys built from the user id alone.
    pub preserve_user_id: bool,
    pub create_new_entries: bool,
}

pub struct CacheInvalidationCoordinator {
    cache: Arc<dyn CacheStore>,
    config: CacheConfig,
}

impl CacheInvalidationCoordinator {
    pub fn new(cache: Arc<dyn CacheStore>, config: CacheConfig) -> Self {
        Self { cache, config }
    }

    #[must_use]
    pub fn repopulate(&self) -> bool {
        self.config.repopulate
    }

    /// Drop every cached view of the old handle.
    ///
    /// A failure to snapshot the key space is fatal. Per-pattern failures are collected in
    /// the result and the remaining patterns are still applied.
    pub fn invalidate(
        &self,
        ctx: &CacheContext<'_>,
        opts: InvalidateOptions,
    ) -> Result<CacheInvalidationResult, DomainError> {
        let snapshot = self
            .cache
            .keys()
            .map_err(|e| DomainError::cache(format!("key snapshot failed: {e}")))?;

        let id = ctx.user_id.to_string();
        let patterns: Vec<String> = generate_key_patterns(ctx.old_handle, ctx.user_id)
            .into_iter()
            .filter(|p| !(opts.preserve_user_id && p.ends_with(id.as_str())))
            .collect();

        let mut result = CacheInvalidationResult {
            dry_run: opts.dry_run,
            matched_keys: matching_keys(&snapshot, &patterns),
            ..CacheInvalidationResult::default()
        };

        if opts.dry_run {
            result.patterns = patterns;
            tracing::debug!(
                matched = result.matched_keys.len(),
                "Dry run: cache left untouched"
            );
            return Ok(result);
        }

        for pattern in &patterns {
            match self.cache.invalidate_pattern(pattern) {
                Ok(n) => result.invalidated += n,
                Err(e) => {
                    tracing::warn!(pattern = %pattern, error = %e, "Cache pattern invalidation failed");
                    result.errors.push(format!("pattern '{pattern}': {e}"));
                }
            }
        }
        result.patterns = patterns;

        if opts.create_new_entries {
            if let Some(identity) = ctx.identity {
                self.write_fresh_entries(ctx, identity, &mut result);
            }
        }

        tracing::debug!(
            invalidated = result.invalidated,
            new_entries = result.new_entries.len(),
            errors = result.errors.len(),
            "Cache invalidation finished"
        );
        Ok(result)
    }

    fn write_fresh_entries(
        &self,
        ctx: &CacheContext<'_>,
        identity: &UserIdentity,
        result: &mut CacheInvalidationResult,
    ) {
        let profile = match serde_json::to_value(identity) {
            Ok(v) => v,
            Err(e) => {
                result.errors.push(format!("profile entry: {e}"));
                return;
            }
        };

        // keyed by the new handle only: id-keyed keys are in the invalidated set
        let entries = [
            (format!("profile:{}", ctx.new_handle), profile, self.config.profile_ttl),
            (
                format!("stats:{}", ctx.new_handle),
                json!({ "user_id": ctx.user_id, "handle": ctx.new_handle }),
                self.config.stats_ttl,
            ),
        ];

        for (key, value, ttl) in entries {
            self.cache.set(&key, value, ttl);
            result.new_entries.push(key);
        }
    }

    /// Live keys matched by the patterns of `(handle, id)`. Read-only.
    pub fn preview_keys(&self, handle: &str, id: Uuid) -> Result<Vec<String>, DomainError> {
        let snapshot = self
            .cache
            .keys()
            .map_err(|e| DomainError::cache(format!("key snapshot failed: {e}")))?;
        Ok(matching_keys(&snapshot, &generate_key_patterns(handle, id)))
    }
}

fn matching_keys(snapshot: &[String], patterns: &[String]) -> Vec<String> {
    snapshot
        .iter()
        .filter(|key| patterns.iter().any(|p| key.contains(p.as_str())))
        .cloned()
        .collect()
}
