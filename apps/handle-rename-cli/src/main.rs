mod commands;
mod config;
mod logging;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use handle_rename::HandleRenameModule;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};

use crate::commands::Commands;
use crate::config::{AppConfig, CliOverrides, DatabaseConfig};

/// Handle Rename CLI - rename user handles and repair everything that refers to them
#[derive(Debug, Parser)]
#[command(name = "handle-rename-cli")]
#[command(about = "Rename user handles and repair content, redirects and cache")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Database DSN (overrides config)
    #[arg(long)]
    dsn: Option<String>,

    /// Print effective configuration (YAML) and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(ref path) = cli.config
        && !Path::new(path).is_file()
    {
        anyhow::bail!("config file does not exist: {}", path.to_string_lossy());
    }

    // Layered config:
    // 1) defaults -> 2) YAML (if provided) -> 3) env (HANDLE_RENAME__*) -> 4) CLI overrides
    let mut config = AppConfig::load(cli.config.as_deref())?;
    config.apply_cli_overrides(&CliOverrides {
        verbose: cli.verbose,
        dsn: cli.dsn.clone(),
    });

    if cli.print_config {
        print!("{}", config.to_yaml()?);
        return Ok(());
    }

    logging::init_logging(&config.logging)?;

    let Some(command) = cli.command else {
        anyhow::bail!("no command given, see --help");
    };

    let db = connect(&config.database).await?;

    if matches!(command, Commands::Migrate) {
        HandleRenameModule::migrate(&db).await?;
        return print_json(&serde_json::json!({ "migrated": true }));
    }

    let module = HandleRenameModule::build(db, &config.handle_rename)?;
    let client = module.client();
    let outcome = commands::execute(client.as_ref(), command).await;
    drop(client);
    module.shutdown().await;

    print_json(&outcome?)
}

async fn connect(cfg: &DatabaseConfig) -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new(cfg.dsn.clone());
    options.max_connections(cfg.max_connections).sqlx_logging(false);

    let shown = config::redact_dsn_password(&cfg.dsn)?;
    let db = Database::connect(options)
        .await
        .with_context(|| format!("failed to connect to {shown}"))?;
    tracing::debug!(backend = ?db.get_database_backend(), "Database connected");
    Ok(db)
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn rename_flags_map_to_options() {
        let cli = Cli::try_parse_from([
            "handle-rename-cli",
            "-vv",
            "rename",
            "0192f0c1-5c8e-7d3a-9b1e-3f4a5b6c7d8e",
            "new_name",
            "--dry-run",
            "--skip-redirects",
            "--preserve-user-id",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        let Some(Commands::Rename(args)) = cli.command else {
            panic!("expected rename command");
        };
        let request = args.into_request();
        assert_eq!(request.new_handle, "new_name");
        assert!(request.options.dry_run);
        assert!(request.options.skip_redirects);
        assert!(request.options.preserve_user_id);
        assert!(!request.options.skip_content_update);
        assert!(!request.options.skip_cache_invalidation);
    }

    #[test]
    fn rejects_malformed_user_id() {
        let parsed = Cli::try_parse_from(["handle-rename-cli", "stats", "not-a-uuid"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn print_config_needs_no_command() {
        let cli = Cli::try_parse_from(["handle-rename-cli", "--print-config"]).unwrap();
        assert!(cli.print_config);
        assert!(cli.command.is_none());
    }

    #[test]
    fn kebab_case_subcommands() {
        let cli = Cli::try_parse_from(["handle-rename-cli", "cleanup-redirects"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::CleanupRedirects)));

        let cli = Cli::try_parse_from(["handle-rename-cli", "resolve", "/pagina/old"]).unwrap();
        assert!(
            matches!(cli.command, Some(Commands::Resolve { ref path }) if path == "/pagina/old")
        );
    }
}
