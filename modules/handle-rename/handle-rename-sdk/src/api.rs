//! `HandleRenameApi` trait definition.
//!
//! This trait defines the public API for the `handle-rename` module. Transport layers
//! (HTTP controllers, CLIs) call into it; authentication happens before the call.

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::HandleRenameError;
use crate::models::{RenamePreview, RenameRequest, RenameResult, UserReferenceStats};

/// Public API trait for the `handle-rename` module.
#[async_trait]
pub trait HandleRenameApi: Send + Sync {
    /// Rename a user's handle, rewriting content references, registering redirects and
    /// invalidating cached views.
    ///
    /// A successful result may still carry warnings about best-effort steps.
    async fn rename(&self, request: RenameRequest) -> Result<RenameResult, HandleRenameError>;

    /// Describe what a rename would touch without mutating anything.
    async fn preview(
        &self,
        user_id: Uuid,
        new_handle: &str,
    ) -> Result<RenamePreview, HandleRenameError>;

    /// Count the references currently pointing at a user's handle.
    async fn get_update_statistics(
        &self,
        user_id: Uuid,
    ) -> Result<UserReferenceStats, HandleRenameError>;

    /// Delete redirect rules past their expiry. Returns the number of removed rules.
    async fn cleanup_expired_redirects(&self) -> Result<u64, HandleRenameError>;

    /// Resolve a retired path to its replacement, if an active rule exists.
    async fn resolve_redirect(&self, path: &str) -> Result<Option<String>, HandleRenameError>;
}
