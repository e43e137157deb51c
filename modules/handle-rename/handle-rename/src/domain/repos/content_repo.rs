use async_trait::async_trait;
use handle_rename_sdk::ContentKind;
use sea_orm::{ConnectionTrait, TransactionTrait};
use uuid::Uuid;

use crate::domain::error::DomainError;

/// Text column of a content table that may reference a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentField {
    /// `comments.body`, `private_messages.body`
    Body,
    /// `publications.title`
    Title,
    /// `publications.content`
    Content,
}

impl ContentField {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ContentField::Body => "body",
            ContentField::Title => "title",
            ContentField::Content => "content",
        }
    }

    /// Fields scanned for each content kind.
    #[must_use]
    pub fn for_kind(kind: ContentKind) -> &'static [ContentField] {
        match kind {
            ContentKind::Comment | ContentKind::PrivateMessage => &[ContentField::Body],
            ContentKind::Publication => &[ContentField::Title, ContentField::Content],
        }
    }
}

/// A candidate row returned by the SQL prefilter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRecord {
    pub kind: ContentKind,
    pub id: Uuid,
    pub fields: Vec<(ContentField, String)>,
}

/// A rewritten field value to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldUpdate {
    pub field: ContentField,
    pub value: String,
}

/// Repository trait over the comment, private-message and publication tables.
#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// Rows of `kind` whose text fields contain any of `needles` (SQL `LIKE`, lower-cased).
    ///
    /// Over-inclusive by design: callers re-check every row in process.
    async fn find_candidates<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        kind: ContentKind,
        needles: &[String],
    ) -> Result<Vec<ContentRecord>, DomainError>;

    /// Number of rows `find_candidates` would return.
    async fn count_candidates<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        kind: ContentKind,
        needles: &[String],
    ) -> Result<u64, DomainError>;

    /// Write back the given fields of one row.
    ///
    /// Runs in its own savepoint when `conn` is a transaction, so a failed row leaves the
    /// enclosing transaction usable.
    async fn update_fields<C: ConnectionTrait + TransactionTrait + Send + Sync>(
        &self,
        conn: &C,
        kind: ContentKind,
        id: Uuid,
        updates: &[FieldUpdate],
    ) -> Result<(), DomainError>;
}
