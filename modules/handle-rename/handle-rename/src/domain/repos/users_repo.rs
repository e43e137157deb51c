use async_trait::async_trait;
use handle_rename_sdk::UserIdentity;
use sea_orm::ConnectionTrait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::error::DomainError;

/// Repository trait for the identity table.
///
/// All methods accept `conn: &C`, either the pooled `DatabaseConnection` or the
/// rename's `DatabaseTransaction`.
#[async_trait]
pub trait UsersRepository: Send + Sync {
    /// Find a user by ID.
    async fn find_by_id<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        id: Uuid,
    ) -> Result<Option<UserIdentity>, DomainError>;

    /// Find a user by handle, ignoring case.
    async fn find_by_handle<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        handle: &str,
    ) -> Result<Option<UserIdentity>, DomainError>;

    /// Whether a user other than `except` owns `handle` (case-insensitive).
    async fn handle_taken_by_other<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        handle: &str,
        except: Uuid,
    ) -> Result<bool, DomainError>;

    /// Swap the handle of `id`. Fails with `UserNotFound` when no row was updated.
    async fn update_handle<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        id: Uuid,
        new_handle: &str,
        at: OffsetDateTime,
    ) -> Result<(), DomainError>;
}
