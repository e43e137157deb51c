//! Handle Rename Module
//!
//! Renames a user's public handle and repairs everything that refers to it:
//! free-text mentions in comments, private messages and publications, cached
//! views keyed by the handle, and bookmarked URLs (through permanent redirects).
//!
//! ## Public API
//!
//! The public API is defined in the `handle-rename-sdk` crate and re-exported here:
//! - `HandleRenameApi` - trait for in-process callers
//! - `RenameRequest`, `RenameResult`, `RenamePreview`, ... - data models
//! - `HandleRenameError` - error types
//!
//! Wire the module with [`module::HandleRenameModule::build`] and hand out the
//! resulting [`local_client::HandleRenameLocalClient`].
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
// === PUBLIC API (from SDK) ===
pub use handle_rename_sdk::{
    HandleRenameApi, HandleRenameError, RenameOptions, RenamePreview, RenameRequest, RenameResult,
    UserReferenceStats,
};

// === MODULE WIRING ===
pub mod module;
pub use module::HandleRenameModule;

// === LOCAL CLIENT ===
// Local client adapter that implements HandleRenameApi
pub mod local_client;

pub mod config;


// === INTERNAL MODULES ===
// WARNING: These modules are internal implementation details!
// They are exposed only for comprehensive testing and should NOT be used by external consumers.
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;
