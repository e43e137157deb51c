use handle_rename_sdk::{RenamePreview, UserIdentity, UserReferenceStats};
use uuid::Uuid;

use super::Service;
use crate::domain::error::DomainError;
use crate::domain::repos::{ContentRepository, RedirectsRepository, UsersRepository};

impl<UR, CR, RR> Service<UR, CR, RR>
where
    UR: UsersRepository,
    CR: ContentRepository,
    RR: RedirectsRepository,
{
    async fn load_user(&self, user_id: Uuid) -> Result<UserIdentity, DomainError> {
        self.users
            .find_by_id(&self.db, user_id)
            .await?
            .ok_or_else(|| DomainError::user_not_found(user_id))
    }

    /// Describe what renaming `user_id` to `new_handle` would touch. Mutates nothing.
    pub async fn preview(
        &self,
        user_id: Uuid,
        new_handle: &str,
    ) -> Result<RenamePreview, DomainError> {
        tracing::debug!(%user_id, new_handle, "Previewing handle rename");
        let user = self.load_user(user_id).await?;
        if user.handle == new_handle {
            return Err(DomainError::validation(
                "new_handle",
                "must differ from the current handle",
            ));
        }
        self.validate(&user, new_handle).await?;

        let references = self
            .rewriter
            .count_references(&self.db, &user.handle)
            .await?;
        let cache_keys = self.cache.preview_keys(&user.handle, user.id)?;
        let redirects = self.registrar.plan(&user.handle, new_handle);

        Ok(RenamePreview {
            user_id,
            current_handle: user.handle,
            new_handle: new_handle.to_owned(),
            references,
            cache_keys,
            redirects,
        })
    }

    /// Reference counts for the user's current handle.
    pub async fn get_update_statistics(
        &self,
        user_id: Uuid,
    ) -> Result<UserReferenceStats, DomainError> {
        let user = self.load_user(user_id).await?;
        let references = self
            .rewriter
            .count_references(&self.db, &user.handle)
            .await?;
        let cached_keys = self.cache.preview_keys(&user.handle, user.id)?.len();
        let redirects_targeting = self
            .registrar
            .count_targeting(&self.db, &user.handle)
            .await?;

        Ok(UserReferenceStats {
            user_id,
            handle: user.handle,
            references,
            cached_keys,
            redirects_targeting,
        })
    }

    pub async fn cleanup_expired_redirects(&self) -> Result<u64, DomainError> {
        self.registrar.cleanup_expired(&self.db).await
    }

    pub async fn resolve_redirect(&self, path: &str) -> Result<Option<String>, DomainError> {
        self.registrar.resolve(&self.db, path).await
    }
}
