//! Module wiring: repositories, cache, clock and service.

use std::sync::Arc;

use handle_rename_sdk::HandleRenameApi;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::HandleRenameConfig;
use crate::domain::service::Service;
use crate::infra::cache::InMemoryCache;
use crate::infra::clock::SystemClock;
use crate::infra::storage::migrations::Migrator;
use crate::infra::storage::{OrmContentRepository, OrmRedirectsRepository, OrmUsersRepository};
use crate::local_client::HandleRenameLocalClient;

/// Service type backed by the SeaORM repositories.
pub type OrmService = Service<OrmUsersRepository, OrmContentRepository, OrmRedirectsRepository>;

/// A wired handle-rename module.
///
/// Owns the process-wide cache and its janitor task. Call [`shutdown`](Self::shutdown)
/// to stop the janitor.
pub struct HandleRenameModule {
    service: Arc<OrmService>,
    cache: Arc<InMemoryCache>,
    cancel: CancellationToken,
    janitor: JoinHandle<()>,
}

impl HandleRenameModule {
    /// Apply pending schema migrations.
    pub async fn migrate(db: &DatabaseConnection) -> anyhow::Result<()> {
        Migrator::up(db, None).await?;
        info!("handle-rename migrations applied");
        Ok(())
    }

    /// Wire the module. Must be called inside a Tokio runtime.
    pub fn build(db: DatabaseConnection, cfg: &HandleRenameConfig) -> anyhow::Result<Self> {
        validate_config(cfg)?;
        info!(
            min_handle_length = cfg.min_handle_length,
            max_handle_length = cfg.max_handle_length,
            content_path_prefix = %cfg.content_path_prefix,
            case_sensitive = cfg.case_sensitive,
            redirect_ttl = %humantime::format_duration(cfg.redirect_ttl),
            "Initializing handle-rename module"
        );

        let cache = Arc::new(InMemoryCache::new());
        let cancel = CancellationToken::new();
        let janitor = cache.spawn_janitor(cfg.cache.janitor_interval, cancel.clone());

        let service = Arc::new(Service::new(
            db,
            OrmUsersRepository::new(),
            OrmContentRepository::new(),
            OrmRedirectsRepository::new(),
            cache.clone(),
            Arc::new(SystemClock),
            cfg,
        ));

        info!("handle-rename module initialized");
        Ok(Self {
            service,
            cache,
            cancel,
            janitor,
        })
    }

    #[must_use]
    pub fn client(&self) -> Arc<dyn HandleRenameApi> {
        Arc::new(HandleRenameLocalClient::new(Arc::clone(&self.service)))
    }

    /// The cache shared with the rest of the process.
    #[must_use]
    pub fn cache(&self) -> Arc<InMemoryCache> {
        Arc::clone(&self.cache)
    }

    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.janitor.await {
            tracing::warn!(error = %e, "Cache janitor ended abnormally");
        }
    }
}

fn validate_config(cfg: &HandleRenameConfig) -> anyhow::Result<()> {
    if cfg.min_handle_length == 0 || cfg.min_handle_length > cfg.max_handle_length {
        anyhow::bail!(
            "invalid handle length bounds: min={} max={}",
            cfg.min_handle_length,
            cfg.max_handle_length
        );
    }
    if !cfg.content_path_prefix.starts_with('/') {
        anyhow::bail!(
            "content_path_prefix must start with '/': {}",
            cfg.content_path_prefix
        );
    }
    if cfg.cache.janitor_interval.is_zero() {
        anyhow::bail!("cache.janitor_interval must be greater than zero");
    }
    Ok(())
}
