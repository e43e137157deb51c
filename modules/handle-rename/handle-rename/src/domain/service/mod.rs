//! Domain service layer - the rename orchestrator.
//!
//! - `rename` - the rename saga (validation, transactional rewrite, best-effort follow-ups)
//! - `queries` - preview, reference statistics, redirect maintenance
//!
//! Transactional steps run on a `DatabaseTransaction`; everything else uses the pooled
//! connection held here.

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::config::HandleRenameConfig;
use crate::domain::cache_invalidation::CacheInvalidationCoordinator;
use crate::domain::content_rewriter::ContentReferenceRewriter;
use crate::domain::handle::HandleRules;
use crate::domain::ports::{CacheStore, Clock};
use crate::domain::redirects::RedirectRegistrar;
use crate::domain::repos::{ContentRepository, RedirectsRepository, UsersRepository};

mod queries;
mod rename;

pub struct Service<UR, CR, RR>
where
    UR: UsersRepository,
    CR: ContentRepository,
    RR: RedirectsRepository,
{
    db: DatabaseConnection,
    users: Arc<UR>,
    rewriter: ContentReferenceRewriter<CR>,
    registrar: RedirectRegistrar<RR>,
    cache: CacheInvalidationCoordinator,
    rules: HandleRules,
    clock: Arc<dyn Clock>,
}

impl<UR, CR, RR> Service<UR, CR, RR>
where
    UR: UsersRepository,
    CR: ContentRepository,
    RR: RedirectsRepository,
{
    pub fn new(
        db: DatabaseConnection,
        users_repo: UR,
        content_repo: CR,
        redirects_repo: RR,
        cache: Arc<dyn CacheStore>,
        clock: Arc<dyn Clock>,
        config: &HandleRenameConfig,
    ) -> Self {
        let rules = HandleRules::from_config(config);
        Self {
            db,
            users: Arc::new(users_repo),
            rewriter: ContentReferenceRewriter::new(
                Arc::new(content_repo),
                rules.clone(),
                config.content_path_prefix.clone(),
                config.case_sensitive,
            ),
            registrar: RedirectRegistrar::new(
                Arc::new(redirects_repo),
                Arc::clone(&clock),
                config.redirect_ttl,
                config.content_path_prefix.clone(),
            ),
            cache: CacheInvalidationCoordinator::new(cache, config.cache.clone()),
            rules,
            clock,
        }
    }
}
