use std::time::{Duration, Instant};

use handle_rename_sdk::{
    CacheInvalidationResult, RenameOptions, RenameRequest, RenameResult, UpdateStatistics,
    UserIdentity,
};
use sea_orm::{DatabaseTransaction, TransactionTrait};
use time::OffsetDateTime;
use tracing::Instrument;

use super::Service;
use crate::domain::cache_invalidation::{CacheContext, InvalidateOptions};
use crate::domain::error::{DomainError, RenameStep};
use crate::domain::repos::{ContentRepository, RedirectsRepository, UsersRepository};
use crate::infra::storage::db::db_err;

/// Output of the transactional (or, in a dry run, analysed) part of a rename.
struct Rewritten {
    content: Option<UpdateStatistics>,
    identity: UserIdentity,
}

impl<UR, CR, RR> Service<UR, CR, RR>
where
    UR: UsersRepository,
    CR: ContentRepository,
    RR: RedirectsRepository,
{
    /// Rename a user's handle and repair everything derived from it.
    ///
    /// Content and identity are written in one transaction. Redirects and cache are
    /// handled after commit; their failures end up in `errors`/`warnings` and never undo
    /// the rename.
    pub async fn rename(&self, req: RenameRequest) -> Result<RenameResult, DomainError> {
        let span = tracing::info_span!(
            "handle_rename",
            user_id = %req.user_id,
            new_handle = %req.new_handle,
            dry_run = req.options.dry_run,
        );
        self.rename_inner(req).instrument(span).await
    }

    async fn rename_inner(&self, req: RenameRequest) -> Result<RenameResult, DomainError> {
        let started = Instant::now();
        let timestamp = self.clock.now();
        let RenameRequest {
            user_id,
            new_handle,
            options: opts,
        } = req;

        let user = self
            .users
            .find_by_id(&self.db, user_id)
            .await?
            .ok_or_else(|| DomainError::user_not_found(user_id))?;

        let mut result = RenameResult {
            success: false,
            user_id,
            old_handle: user.handle.clone(),
            new_handle,
            dry_run: opts.dry_run,
            content: None,
            cache: None,
            redirects_created: 0,
            errors: Vec::new(),
            warnings: Vec::new(),
            timestamp,
            execution_time: Duration::ZERO,
            rollback_performed: false,
        };

        if result.new_handle == result.old_handle {
            tracing::info!("Requested handle equals the current one, nothing to do");
            result.success = true;
            result
                .warnings
                .push("new handle is identical to the current handle; nothing changed".to_owned());
            result.execution_time = started.elapsed();
            return Ok(result);
        }

        self.validate(&user, &result.new_handle).await?;
        tracing::info!(old_handle = %result.old_handle, "Handle rename started");

        let rewritten = if opts.dry_run {
            self.analyse(&user, &result.new_handle, opts).await?
        } else {
            let txn = self.db.begin().await.map_err(|e| {
                DomainError::step_failed(RenameStep::TransactionBegin, false, db_err(e))
            })?;
            match self
                .run_transactional(&txn, &user, &result.new_handle, opts, timestamp)
                .await
            {
                Ok(rewritten) => {
                    // a failed COMMIT leaves the outcome to the backend; claim no rollback
                    txn.commit().await.map_err(|e| {
                        tracing::error!(error = %e, "Commit failed, outcome unknown");
                        DomainError::step_failed(RenameStep::Commit, false, db_err(e))
                    })?;
                    rewritten
                }
                Err((step, err)) => return Err(abort(txn, step, err).await),
            }
        };

        if let Some(stats) = &rewritten.content
            && !stats.errors.is_empty()
        {
            result.warnings.push(format!(
                "{} content row(s) could not be rewritten",
                stats.errors.len()
            ));
            result.errors.extend(
                stats
                    .errors
                    .iter()
                    .map(|e| format!("{} {}: {}", e.kind, e.row_id, e.message)),
            );
        }
        result.content = rewritten.content;

        if !opts.skip_redirects && !opts.dry_run {
            let registration = self
                .registrar
                .register_rename(&self.db, &result.old_handle, &result.new_handle)
                .await;
            result.redirects_created = registration.created;
            if !registration.errors.is_empty() {
                result.warnings.push(format!(
                    "{} redirect(s) could not be registered",
                    registration.errors.len()
                ));
                result.errors.extend(registration.errors);
            }
        }

        if !opts.skip_cache_invalidation {
            result.cache = self.invalidate_cache(&mut result, &rewritten.identity, opts);
        }

        result.success = true;
        result.execution_time = started.elapsed();
        tracing::info!(
            found = result.content.as_ref().map_or(0, |s| s.total.found),
            updated = result.content.as_ref().map_or(0, |s| s.total.updated),
            redirects = result.redirects_created,
            errors = result.errors.len(),
            elapsed_ms = u64::try_from(result.execution_time.as_millis()).unwrap_or(u64::MAX),
            "Handle rename finished"
        );
        Ok(result)
    }

    /// Format, reserved-word and uniqueness checks. Touches nothing.
    pub(super) async fn validate(
        &self,
        user: &UserIdentity,
        new_handle: &str,
    ) -> Result<(), DomainError> {
        self.rules.check_new_handle(new_handle)?;
        if self
            .users
            .handle_taken_by_other(&self.db, new_handle, user.id)
            .await?
        {
            return Err(DomainError::handle_taken(new_handle));
        }
        Ok(())
    }

    /// Dry run of the transactional steps on the plain connection.
    async fn analyse(
        &self,
        user: &UserIdentity,
        new_handle: &str,
        opts: RenameOptions,
    ) -> Result<Rewritten, DomainError> {
        let content = if opts.skip_content_update {
            None
        } else {
            let stats = self
                .rewriter
                .rewrite(&self.db, &user.handle, new_handle, true)
                .await
                .map_err(|e| DomainError::step_failed(RenameStep::ContentRewrite, false, e))?;
            Some(stats)
        };
        Ok(Rewritten {
            content,
            identity: renamed(user, new_handle, user.updated_at),
        })
    }

    async fn run_transactional(
        &self,
        txn: &DatabaseTransaction,
        user: &UserIdentity,
        new_handle: &str,
        opts: RenameOptions,
        at: OffsetDateTime,
    ) -> Result<Rewritten, (RenameStep, DomainError)> {
        // content first: the patterns are built from the old handle
        let content = if opts.skip_content_update {
            None
        } else {
            let stats = self
                .rewriter
                .rewrite(txn, &user.handle, new_handle, false)
                .await
                .map_err(|e| (RenameStep::ContentRewrite, e))?;
            Some(stats)
        };

        // a concurrent rename may have claimed the handle since validation
        let taken = self
            .users
            .handle_taken_by_other(txn, new_handle, user.id)
            .await
            .map_err(|e| (RenameStep::IdentityRename, e))?;
        if taken {
            return Err((
                RenameStep::IdentityRename,
                DomainError::handle_taken(new_handle),
            ));
        }
        self.users
            .update_handle(txn, user.id, new_handle, at)
            .await
            .map_err(|e| (RenameStep::IdentityRename, e))?;

        Ok(Rewritten {
            content,
            identity: renamed(user, new_handle, at),
        })
    }

    fn invalidate_cache(
        &self,
        result: &mut RenameResult,
        identity: &UserIdentity,
        opts: RenameOptions,
    ) -> Option<CacheInvalidationResult> {
        let ctx = CacheContext {
            user_id: result.user_id,
            old_handle: &result.old_handle,
            new_handle: &result.new_handle,
            identity: Some(identity),
        };
        let cache_opts = InvalidateOptions {
            dry_run: opts.dry_run,
            preserve_user_id: opts.preserve_user_id,
            create_new_entries: self.cache.repopulate(),
        };
        match self.cache.invalidate(&ctx, cache_opts) {
            Ok(res) => {
                if !res.errors.is_empty() {
                    result.warnings.push(format!(
                        "{} cache pattern(s) could not be invalidated",
                        res.errors.len()
                    ));
                    result.errors.extend(res.errors.iter().cloned());
                }
                Some(res)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Cache invalidation failed");
                result
                    .warnings
                    .push("cache invalidation skipped: cache backend unavailable".to_owned());
                result
                    .errors
                    .push(format!("{}: {e}", RenameStep::CacheInvalidate));
                None
            }
        }
    }
}

fn renamed(user: &UserIdentity, new_handle: &str, at: OffsetDateTime) -> UserIdentity {
    UserIdentity {
        handle: new_handle.to_owned(),
        updated_at: at,
        ..user.clone()
    }
}

/// Explicit rollback; its outcome is reported through the returned error.
async fn abort(txn: DatabaseTransaction, step: RenameStep, err: DomainError) -> DomainError {
    tracing::warn!(step = %step, error = %err, "Rename failed, rolling back");
    let rolled_back = match txn.rollback().await {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(error = %e, "Rollback failed");
            false
        }
    };
    DomainError::step_failed(step, rolled_back, err)
}
