use std::sync::Arc;

use async_trait::async_trait;
use handle_rename_sdk::{
    HandleRenameApi, HandleRenameError, RenamePreview, RenameRequest, RenameResult,
    UserReferenceStats,
};
use uuid::Uuid;

use crate::domain::repos::{ContentRepository, RedirectsRepository, UsersRepository};
use crate::domain::service::Service;

/// In-process implementation of [`HandleRenameApi`] over the domain service.
pub struct HandleRenameLocalClient<UR, CR, RR>
where
    UR: UsersRepository,
    CR: ContentRepository,
    RR: RedirectsRepository,
{
    service: Arc<Service<UR, CR, RR>>,
}

impl<UR, CR, RR> HandleRenameLocalClient<UR, CR, RR>
where
    UR: UsersRepository,
    CR: ContentRepository,
    RR: RedirectsRepository,
{
    #[must_use]
    pub fn new(service: Arc<Service<UR, CR, RR>>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl<UR, CR, RR> HandleRenameApi for HandleRenameLocalClient<UR, CR, RR>
where
    UR: UsersRepository + 'static,
    CR: ContentRepository + 'static,
    RR: RedirectsRepository + 'static,
{
    async fn rename(&self, request: RenameRequest) -> Result<RenameResult, HandleRenameError> {
        self.service.rename(request).await.map_err(Into::into)
    }

    async fn preview(
        &self,
        user_id: Uuid,
        new_handle: &str,
    ) -> Result<RenamePreview, HandleRenameError> {
        self.service
            .preview(user_id, new_handle)
            .await
            .map_err(Into::into)
    }

    async fn get_update_statistics(
        &self,
        user_id: Uuid,
    ) -> Result<UserReferenceStats, HandleRenameError> {
        self.service
            .get_update_statistics(user_id)
            .await
            .map_err(Into::into)
    }

    async fn cleanup_expired_redirects(&self) -> Result<u64, HandleRenameError> {
        self.service
            .cleanup_expired_redirects()
            .await
            .map_err(Into::into)
    }

    async fn resolve_redirect(&self, path: &str) -> Result<Option<String>, HandleRenameError> {
        self.service.resolve_redirect(path).await.map_err(Into::into)
    }
}
