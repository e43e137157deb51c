//! Public models for the `handle-rename` module.
//!
//! These are transport-agnostic data structures that define the contract
//! between the `handle-rename` module and its consumers.

use std::fmt;
use std::time::Duration;

use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

/// A user identity as stored in the identity table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserIdentity {
    pub id: Uuid,
    pub handle: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Flags controlling which rename steps run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct RenameOptions {
    /// Run every analysis step but persist nothing.
    pub dry_run: bool,
    /// Leave comments, messages and publications untouched.
    pub skip_content_update: bool,
    /// Do not touch the cache.
    pub skip_cache_invalidation: bool,
    /// Do not register redirects for the retired paths.
    pub skip_redirects: bool,
    /// Keep cache entries keyed by the (unchanged) user id.
    pub preserve_user_id: bool,
}

/// Request to rename a user's handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameRequest {
    pub user_id: Uuid,
    pub new_handle: String,
    pub options: RenameOptions,
}

impl RenameRequest {
    /// Request with default options.
    pub fn new(user_id: Uuid, new_handle: impl Into<String>) -> Self {
        Self {
            user_id,
            new_handle: new_handle.into(),
            options: RenameOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: RenameOptions) -> Self {
        self.options = options;
        self
    }
}

/// Content tables that may reference a handle in free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Comment,
    PrivateMessage,
    Publication,
}

impl ContentKind {
    pub const ALL: [ContentKind; 3] = [
        ContentKind::Comment,
        ContentKind::PrivateMessage,
        ContentKind::Publication,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ContentKind::Comment => "comment",
            ContentKind::PrivateMessage => "private_message",
            ContentKind::Publication => "publication",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Found/updated counters for one content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ContentTypeStats {
    pub found: u64,
    pub updated: u64,
}

/// A failure while rewriting a single content row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowError {
    pub kind: ContentKind,
    pub row_id: Uuid,
    pub message: String,
}

/// Statistics accumulated during one content rewrite pass.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct UpdateStatistics {
    pub comments: ContentTypeStats,
    pub private_messages: ContentTypeStats,
    pub publications: ContentTypeStats,
    pub total: ContentTypeStats,
    pub errors: Vec<RowError>,
}

impl UpdateStatistics {
    #[must_use]
    pub fn for_kind(&self, kind: ContentKind) -> &ContentTypeStats {
        match kind {
            ContentKind::Comment => &self.comments,
            ContentKind::PrivateMessage => &self.private_messages,
            ContentKind::Publication => &self.publications,
        }
    }

    fn for_kind_mut(&mut self, kind: ContentKind) -> &mut ContentTypeStats {
        match kind {
            ContentKind::Comment => &mut self.comments,
            ContentKind::PrivateMessage => &mut self.private_messages,
            ContentKind::Publication => &mut self.publications,
        }
    }

    pub fn record_found(&mut self, kind: ContentKind) {
        self.for_kind_mut(kind).found += 1;
        self.total.found += 1;
    }

    pub fn record_updated(&mut self, kind: ContentKind) {
        self.for_kind_mut(kind).updated += 1;
        self.total.updated += 1;
    }

    pub fn record_error(&mut self, kind: ContentKind, row_id: Uuid, message: impl Into<String>) {
        self.errors.push(RowError {
            kind,
            row_id,
            message: message.into(),
        });
    }
}

/// Outcome of the cache invalidation step.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct CacheInvalidationResult {
    pub dry_run: bool,
    /// Patterns that were (or would be) applied, in order.
    pub patterns: Vec<String>,
    /// Keys from the pre-invalidation snapshot matched by at least one pattern.
    pub matched_keys: Vec<String>,
    /// Number of entries actually removed by the store.
    pub invalidated: usize,
    /// Keys written proactively under the new handle.
    pub new_entries: Vec<String>,
    pub errors: Vec<String>,
}

/// Result of a rename call. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenameResult {
    pub success: bool,
    pub user_id: Uuid,
    pub old_handle: String,
    pub new_handle: String,
    pub dry_run: bool,
    pub content: Option<UpdateStatistics>,
    pub cache: Option<CacheInvalidationResult>,
    pub redirects_created: u32,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub execution_time: Duration,
    /// Failed renames report their rollback through `HandleRenameError::Internal`.
    pub rollback_performed: bool,
}

/// Per-type counts of rows that reference a handle (SQL prefilter only).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ReferenceCounts {
    pub comments: u64,
    pub private_messages: u64,
    pub publications: u64,
    pub total: u64,
}

impl ReferenceCounts {
    pub fn add(&mut self, kind: ContentKind, count: u64) {
        match kind {
            ContentKind::Comment => self.comments += count,
            ContentKind::PrivateMessage => self.private_messages += count,
            ContentKind::Publication => self.publications += count,
        }
        self.total += count;
    }
}

/// A redirect a rename would register.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RedirectPlan {
    pub old_path: String,
    pub new_path: String,
}

/// Side-effect-free description of a rename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenamePreview {
    pub user_id: Uuid,
    pub current_handle: String,
    pub new_handle: String,
    pub references: ReferenceCounts,
    pub cache_keys: Vec<String>,
    pub redirects: Vec<RedirectPlan>,
}

/// Reference counts for a user's current handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserReferenceStats {
    pub user_id: Uuid,
    pub handle: String,
    pub references: ReferenceCounts,
    pub cached_keys: usize,
    pub redirects_targeting: u64,
}

/// HTTP semantics of a redirect rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum RedirectKind {
    #[default]
    Permanent,
    Temporary,
}

impl RedirectKind {
    #[must_use]
    pub fn status_code(self) -> u16 {
        match self {
            RedirectKind::Permanent => 301,
            RedirectKind::Temporary => 302,
        }
    }

    #[must_use]
    pub fn from_status_code(code: u16) -> Option<Self> {
        match code {
            301 => Some(RedirectKind::Permanent),
            302 => Some(RedirectKind::Temporary),
            _ => None,
        }
    }
}

/// A persisted redirect from a retired path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RedirectRule {
    pub id: Uuid,
    pub old_path: String,
    pub new_path: String,
    pub kind: RedirectKind,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}
