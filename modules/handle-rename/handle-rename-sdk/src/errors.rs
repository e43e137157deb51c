//! Public error types for the `handle-rename` module.
//!
//! These errors are safe to expose to other modules and consumers.

use thiserror::Error;
use uuid::Uuid;

/// Errors that can be returned by the `HandleRenameApi`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandleRenameError {
    /// User with the specified ID was not found.
    #[error("User not found: {user_id}")]
    NotFound { user_id: Uuid },

    /// The requested handle is already taken by another user.
    #[error("Handle '{handle}' is already taken")]
    Conflict { handle: String },

    /// The requested handle failed validation.
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// The rename failed while its transaction was open.
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        rollback_performed: bool,
    },
}

impl HandleRenameError {
    /// Create a `NotFound` error.
    #[must_use]
    pub fn not_found(user_id: Uuid) -> Self {
        Self::NotFound { user_id }
    }

    /// Create a Conflict error.
    pub fn conflict(handle: impl Into<String>) -> Self {
        Self::Conflict {
            handle: handle.into(),
        }
    }

    /// Create a Validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create an Internal error.
    pub fn internal(message: impl Into<String>, rollback_performed: bool) -> Self {
        Self::Internal {
            message: message.into(),
            rollback_performed,
        }
    }
}
