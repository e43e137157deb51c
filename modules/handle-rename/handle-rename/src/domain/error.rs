use std::fmt;

use handle_rename_sdk::HandleRenameError;
use thiserror::Error;
use uuid::Uuid;

/// Saga steps, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameStep {
    UserLookup,
    Validate,
    TransactionBegin,
    ContentRewrite,
    IdentityRename,
    Commit,
    RedirectCreate,
    CacheInvalidate,
}

impl fmt::Display for RenameStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RenameStep::UserLookup => "user_lookup",
            RenameStep::Validate => "validate",
            RenameStep::TransactionBegin => "transaction_begin",
            RenameStep::ContentRewrite => "content_rewrite",
            RenameStep::IdentityRename => "identity_rename",
            RenameStep::Commit => "commit",
            RenameStep::RedirectCreate => "redirect_create",
            RenameStep::CacheInvalidate => "cache_invalidate",
        };
        f.write_str(name)
    }
}

/// Domain-specific errors using thiserror
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("User not found: {id}")]
    UserNotFound { id: Uuid },

    #[error("Handle '{handle}' is already taken")]
    HandleTaken { handle: String },

    #[error("Validation failed: {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Database error: {message}")]
    Database { message: String },

    #[error("Cache backend error: {message}")]
    Cache { message: String },

    #[error("Rename failed during {step}")]
    StepFailed {
        step: RenameStep,
        rollback_performed: bool,
        #[source]
        source: Box<DomainError>,
    },
}

impl DomainError {
    pub fn user_not_found(id: Uuid) -> Self {
        Self::UserNotFound { id }
    }

    pub fn handle_taken(handle: impl Into<String>) -> Self {
        Self::HandleTaken {
            handle: handle.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }

    pub fn cache(message: impl Into<String>) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }

    pub fn step_failed(step: RenameStep, rollback_performed: bool, source: DomainError) -> Self {
        Self::StepFailed {
            step,
            rollback_performed,
            source: Box::new(source),
        }
    }
}

/// Convert domain errors to SDK errors for public API consumption.
impl From<DomainError> for HandleRenameError {
    fn from(domain_error: DomainError) -> Self {
        match domain_error {
            DomainError::UserNotFound { id } => HandleRenameError::not_found(id),
            DomainError::HandleTaken { handle } => HandleRenameError::conflict(handle),
            DomainError::Validation { field, message } => {
                HandleRenameError::validation(format!("{field}: {message}"))
            }
            DomainError::Database { message } | DomainError::Cache { message } => {
                HandleRenameError::internal(message, false)
            }
            DomainError::StepFailed {
                step,
                rollback_performed,
                source,
            } => match *source {
                // a concurrent rename claimed the handle inside our transaction window
                DomainError::HandleTaken { handle } => HandleRenameError::conflict(handle),
                other => {
                    HandleRenameError::internal(format!("{step}: {other}"), rollback_performed)
                }
            },
        }
    }
}
