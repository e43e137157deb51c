use anyhow::Result;
use clap::{Args, Subcommand};
use handle_rename_sdk::{HandleRenameApi, RenameOptions, RenameRequest};
use serde_json::{Value, json};
use uuid::Uuid;

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Apply database migrations
    Migrate,
    /// Rename a user's handle
    Rename(RenameArgs),
    /// Show what a rename would touch without changing anything
    Preview {
        user_id: Uuid,
        new_handle: String,
    },
    /// Count references to a user's current handle
    Stats { user_id: Uuid },
    /// Delete expired redirect rules
    CleanupRedirects,
    /// Resolve a retired path through the redirect table
    Resolve { path: String },
}

#[derive(Debug, Args)]
#[allow(clippy::struct_excessive_bools)]
pub struct RenameArgs {
    pub user_id: Uuid,
    pub new_handle: String,
    /// Analyse only; persist nothing
    #[arg(long)]
    pub dry_run: bool,
    /// Leave comments, messages and publications untouched
    #[arg(long)]
    pub skip_content: bool,
    /// Do not touch the cache
    #[arg(long)]
    pub skip_cache: bool,
    /// Do not register redirects for the old paths
    #[arg(long)]
    pub skip_redirects: bool,
    /// Keep cache entries keyed by the user id
    #[arg(long)]
    pub preserve_user_id: bool,
}

impl RenameArgs {
    pub fn into_request(self) -> RenameRequest {
        RenameRequest::new(self.user_id, self.new_handle).with_options(RenameOptions {
            dry_run: self.dry_run,
            skip_content_update: self.skip_content,
            skip_cache_invalidation: self.skip_cache,
            skip_redirects: self.skip_redirects,
            preserve_user_id: self.preserve_user_id,
        })
    }
}

/// Run a command that needs the wired module. `Migrate` is handled before wiring.
pub async fn execute(client: &dyn HandleRenameApi, command: Commands) -> Result<Value> {
    let output = match command {
        Commands::Migrate => anyhow::bail!("migrations run before the module is wired"),
        Commands::Rename(args) => {
            let result = client.rename(args.into_request()).await?;
            serde_json::to_value(result)?
        }
        Commands::Preview {
            user_id,
            new_handle,
        } => serde_json::to_value(client.preview(user_id, &new_handle).await?)?,
        Commands::Stats { user_id } => {
            serde_json::to_value(client.get_update_statistics(user_id).await?)?
        }
        Commands::CleanupRedirects => {
            let removed = client.cleanup_expired_redirects().await?;
            json!({ "removed": removed })
        }
        Commands::Resolve { path } => {
            let target = client.resolve_redirect(&path).await?;
            json!({ "path": path, "target": target })
        }
    };
    Ok(output)
}
