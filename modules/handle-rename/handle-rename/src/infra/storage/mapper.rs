use handle_rename_sdk::{RedirectKind, RedirectRule, UserIdentity};

use crate::domain::error::DomainError;
use crate::infra::storage::entity::{redirect, user};

/// Convert a database entity to a contract model.
impl From<user::Model> for UserIdentity {
    fn from(e: user::Model) -> Self {
        Self {
            id: e.id,
            handle: e.handle,
            display_name: e.display_name,
            avatar_url: e.avatar_url,
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}

impl TryFrom<redirect::Model> for RedirectRule {
    type Error = DomainError;

    fn try_from(e: redirect::Model) -> Result<Self, Self::Error> {
        let kind = u16::try_from(e.status_code)
            .ok()
            .and_then(RedirectKind::from_status_code)
            .ok_or_else(|| {
                DomainError::database(format!(
                    "redirect {} has unsupported status code {}",
                    e.old_path, e.status_code
                ))
            })?;
        Ok(Self {
            id: e.id,
            old_path: e.old_path,
            new_path: e.new_path,
            kind,
            created_at: e.created_at,
            expires_at: e.expires_at,
        })
    }
}
