//! Content reference rewriter.
//!
//! Two phases per content table: a coarse SQL `LIKE` prefilter selects candidate rows,
//! then [`ReferencePatterns`] rewrites each candidate precisely in process.

use std::sync::Arc;

use handle_rename_sdk::{ContentKind, ReferenceCounts, UpdateStatistics};
use sea_orm::{ConnectionTrait, TransactionTrait};

use crate::domain::error::DomainError;
use crate::domain::handle::HandleRules;
use crate::domain::patterns::ReferencePatterns;
use crate::domain::repos::{ContentRecord, ContentRepository, FieldUpdate};

pub struct ContentReferenceRewriter<CR: ContentRepository> {
    repo: Arc<CR>,
    rules: HandleRules,
    path_prefix: String,
    case_sensitive: bool,
}

impl<CR: ContentRepository> ContentReferenceRewriter<CR> {
    pub fn new(
        repo: Arc<CR>,
        rules: HandleRules,
        path_prefix: impl Into<String>,
        case_sensitive: bool,
    ) -> Self {
        Self {
            repo,
            rules,
            path_prefix: path_prefix.into(),
            case_sensitive,
        }
    }

    pub fn patterns_for(&self, handle: &str) -> Result<ReferencePatterns, DomainError> {
        ReferencePatterns::new(handle, &self.path_prefix, self.case_sensitive)
    }

    /// Rewrite every reference to `old_handle` into `new_handle`.
    ///
    /// Fetch failures abort the pass. A failure to persist one row is recorded in the
    /// returned statistics and the pass moves on to the next row. With `dry_run` set
    /// nothing is written but rows that would change are still counted as updated.
    pub async fn rewrite<C: ConnectionTrait + TransactionTrait + Send + Sync>(
        &self,
        conn: &C,
        old_handle: &str,
        new_handle: &str,
        dry_run: bool,
    ) -> Result<UpdateStatistics, DomainError> {
        self.rules.check_pair(old_handle, new_handle)?;
        let patterns = self.patterns_for(old_handle)?;
        let mut stats = UpdateStatistics::default();

        for kind in ContentKind::ALL {
            let candidates = self
                .repo
                .find_candidates(conn, kind, patterns.needles())
                .await?;
            tracing::debug!(kind = %kind, candidates = candidates.len(), "Prefilter done");

            for record in candidates {
                stats.record_found(kind);
                let updates = stage_updates(&patterns, &record, new_handle);
                if updates.is_empty() {
                    continue;
                }
                if dry_run {
                    stats.record_updated(kind);
                    continue;
                }
                match self
                    .repo
                    .update_fields(conn, kind, record.id, &updates)
                    .await
                {
                    Ok(()) => stats.record_updated(kind),
                    Err(e) => {
                        tracing::warn!(kind = %kind, row_id = %record.id, error = %e, "Failed to rewrite row, continuing");
                        stats.record_error(kind, record.id, e.to_string());
                    }
                }
            }
        }

        tracing::debug!(
            found = stats.total.found,
            updated = stats.total.updated,
            errors = stats.errors.len(),
            dry_run,
            "Content rewrite pass finished"
        );
        Ok(stats)
    }

    /// Per-type number of prefilter candidates for `handle`. Never rewrites.
    pub async fn count_references<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        handle: &str,
    ) -> Result<ReferenceCounts, DomainError> {
        self.rules.check_existing("old_handle", handle)?;
        let patterns = self.patterns_for(handle)?;
        let mut counts = ReferenceCounts::default();
        for kind in ContentKind::ALL {
            let n = self
                .repo
                .count_candidates(conn, kind, patterns.needles())
                .await?;
            counts.add(kind, n);
        }
        Ok(counts)
    }
}

fn stage_updates(
    patterns: &ReferencePatterns,
    record: &ContentRecord,
    new_handle: &str,
) -> Vec<FieldUpdate> {
    record
        .fields
        .iter()
        .filter_map(|(field, text)| {
            patterns.rewrite(text, new_handle).map(|value| FieldUpdate {
                field: *field,
                value,
            })
        })
        .collect()
}
