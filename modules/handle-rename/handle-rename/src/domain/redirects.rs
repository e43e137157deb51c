//! Redirect registrar: permanent redirects from retired handle paths.

use std::sync::Arc;
use std::time::Duration;

use handle_rename_sdk::{RedirectKind, RedirectPlan, RedirectRule};
use sea_orm::ConnectionTrait;
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::ports::Clock;
use crate::domain::repos::RedirectsRepository;

/// Outcome of registering the redirects of one rename.
#[derive(Debug, Default)]
pub struct Registration {
    pub created: u32,
    pub errors: Vec<String>,
}

pub struct RedirectRegistrar<RR: RedirectsRepository> {
    repo: Arc<RR>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    path_prefix: String,
}

impl<RR: RedirectsRepository> RedirectRegistrar<RR> {
    pub fn new(
        repo: Arc<RR>,
        clock: Arc<dyn Clock>,
        ttl: Duration,
        path_prefix: impl Into<String>,
    ) -> Self {
        Self {
            repo,
            clock,
            ttl,
            path_prefix: path_prefix.into().trim_end_matches('/').to_owned(),
        }
    }

    /// Public paths served under `handle`.
    #[must_use]
    pub fn paths_for(&self, handle: &str) -> [String; 2] {
        [format!("/{handle}"), format!("{}/{handle}", self.path_prefix)]
    }

    /// Redirects a rename from `old_handle` to `new_handle` registers.
    #[must_use]
    pub fn plan(&self, old_handle: &str, new_handle: &str) -> Vec<RedirectPlan> {
        self.paths_for(old_handle)
            .into_iter()
            .zip(self.paths_for(new_handle))
            .map(|(old_path, new_path)| RedirectPlan { old_path, new_path })
            .collect()
    }

    /// Insert or refresh a 301 rule for `old_path`.
    ///
    /// Rules that pointed at `old_path` are repointed to `new_path`, and a rule keyed by
    /// `new_path` is dropped, so chains collapse and reclaimed paths never loop.
    pub async fn upsert<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        old_path: &str,
        new_path: &str,
    ) -> Result<RedirectRule, DomainError> {
        let now = self.clock.now();
        let ttl = time::Duration::try_from(self.ttl)
            .map_err(|e| DomainError::validation("redirect_ttl", e.to_string()))?;
        let expires_at = now
            .checked_add(ttl)
            .ok_or_else(|| DomainError::validation("redirect_ttl", "expiry out of range"))?;

        let repointed = self.repo.repoint_targets(conn, old_path, new_path).await?;
        let removed = self.repo.delete_by_old_path(conn, new_path).await?;
        if repointed > 0 || removed > 0 {
            tracing::debug!(old_path, new_path, repointed, removed, "Collapsed redirect chain");
        }

        let rule = RedirectRule {
            id: Uuid::now_v7(),
            old_path: old_path.to_owned(),
            new_path: new_path.to_owned(),
            kind: RedirectKind::Permanent,
            created_at: now,
            expires_at,
        };
        self.repo.upsert(conn, &rule).await?;
        Ok(rule)
    }

    /// Register both redirects of a rename. Each failure is recorded on its own.
    pub async fn register_rename<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        old_handle: &str,
        new_handle: &str,
    ) -> Registration {
        let mut out = Registration::default();
        for plan in self.plan(old_handle, new_handle) {
            match self.upsert(conn, &plan.old_path, &plan.new_path).await {
                Ok(_) => out.created += 1,
                Err(e) => {
                    tracing::warn!(old_path = %plan.old_path, error = %e, "Failed to register redirect");
                    out.errors
                        .push(format!("redirect {} -> {}: {e}", plan.old_path, plan.new_path));
                }
            }
        }
        out
    }

    /// Target of the unexpired rule for `path`.
    pub async fn resolve<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        path: &str,
    ) -> Result<Option<String>, DomainError> {
        let rule = self.repo.find_active(conn, path, self.clock.now()).await?;
        Ok(rule.map(|r| r.new_path))
    }

    /// Unexpired rules pointing at any path of `handle`.
    pub async fn count_targeting<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        handle: &str,
    ) -> Result<u64, DomainError> {
        let now = self.clock.now();
        let mut total = 0;
        for path in self.paths_for(handle) {
            total += self.repo.count_targeting(conn, &path, now).await?;
        }
        Ok(total)
    }

    pub async fn cleanup_expired<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
    ) -> Result<u64, DomainError> {
        let removed = self.repo.delete_expired(conn, self.clock.now()).await?;
        tracing::info!(removed, "Expired redirects cleaned up");
        Ok(removed)
    }
}
