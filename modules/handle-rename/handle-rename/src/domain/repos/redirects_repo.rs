use async_trait::async_trait;
use handle_rename_sdk::RedirectRule;
use sea_orm::ConnectionTrait;
use time::OffsetDateTime;

use crate::domain::error::DomainError;

/// Repository trait for redirect rules, unique by `old_path`.
#[async_trait]
pub trait RedirectsRepository: Send + Sync {
    /// Insert the rule, or overwrite target/type/timestamps of the rule with the same `old_path`.
    async fn upsert<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        rule: &RedirectRule,
    ) -> Result<(), DomainError>;

    /// Rule for `old_path` that has not expired at `now`.
    async fn find_active<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        old_path: &str,
        now: OffsetDateTime,
    ) -> Result<Option<RedirectRule>, DomainError>;

    /// Point every rule targeting `from` at `to`. Returns the number of updated rules.
    async fn repoint_targets<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        from: &str,
        to: &str,
    ) -> Result<u64, DomainError>;

    /// Remove the rule keyed by `old_path`, if any.
    async fn delete_by_old_path<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        old_path: &str,
    ) -> Result<u64, DomainError>;

    /// Remove every rule with `expires_at <= now`.
    async fn delete_expired<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        now: OffsetDateTime,
    ) -> Result<u64, DomainError>;

    /// Number of unexpired rules targeting `new_path`.
    async fn count_targeting<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        new_path: &str,
        now: OffsetDateTime,
    ) -> Result<u64, DomainError>;
}
