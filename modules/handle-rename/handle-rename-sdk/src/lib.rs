//! Handle Rename SDK
//!
//! This crate provides the public API for the `handle-rename` module:
//! - `HandleRenameApi` trait
//! - Request/result models for renames, previews and statistics
//! - Error type (`HandleRenameError`)
//!
//! ## Usage
//!
//! ```ignore
//! use handle_rename_sdk::{HandleRenameApi, RenameRequest};
//!
//! let result = client.rename(RenameRequest::new(user_id, "alice_2024")).await?;
//! if !result.warnings.is_empty() {
//!     // redirects or cache steps degraded, the rename itself committed
//! }
//! ```

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

pub mod api;
pub mod errors;
pub mod models;

// Re-export main types at crate root for convenience
pub use api::HandleRenameApi;
pub use errors::HandleRenameError;
pub use models::{
    CacheInvalidationResult, ContentKind, ContentTypeStats, RedirectKind, RedirectPlan,
    RedirectRule, ReferenceCounts, RenameOptions, RenamePreview, RenameRequest, RenameResult,
    RowError, UpdateStatistics, UserIdentity, UserReferenceStats,
};
