//! Layered binary configuration.

use std::path::Path;

use anyhow::{Context, Result};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use handle_rename::config::HandleRenameConfig;
use serde::{Deserialize, Serialize};
use url::Url;

/// Environment variables prefixed with this override config keys, `__` separating levels,
/// e.g. `HANDLE_RENAME__DATABASE__DSN`.
pub const ENV_PREFIX: &str = "HANDLE_RENAME__";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub handle_rename: HandleRenameConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    pub dsn: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            dsn: "sqlite://handle-rename.db?mode=rwc".to_owned(),
            max_connections: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_owned(),
            json: false,
        }
    }
}

/// Values from the command line that win over every other layer.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub verbose: u8,
    pub dsn: Option<String>,
}

impl AppConfig {
    /// Layered config:
    /// 1) defaults -> 2) YAML (if provided) -> 3) env (`HANDLE_RENAME__*`)
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::figment(path)
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("failed to load configuration")
    }

    /// Defaults and the optional YAML file, without the environment layer.
    pub fn figment(path: Option<&Path>) -> Figment {
        let figment = Figment::new().merge(Serialized::defaults(Self::default()));
        match path {
            Some(path) => figment.merge(Yaml::file(path)),
            None => figment,
        }
    }

    pub fn apply_cli_overrides(&mut self, overrides: &CliOverrides) {
        match overrides.verbose {
            0 => {}
            1 => "info".clone_into(&mut self.logging.level),
            2 => "debug".clone_into(&mut self.logging.level),
            _ => "trace".clone_into(&mut self.logging.level),
        }
        if let Some(dsn) = &overrides.dsn {
            dsn.clone_into(&mut self.database.dsn);
        }
    }

    /// Effective configuration as YAML, with the database password masked.
    pub fn to_yaml(&self) -> Result<String> {
        let mut printable = self.clone();
        printable.database.dsn = redact_dsn_password(&self.database.dsn)?;
        serde_saphyr::to_string(&printable).context("failed to serialize configuration to YAML")
    }
}

pub fn redact_dsn_password(dsn: &str) -> Result<String> {
    if dsn.contains('@') {
        let mut parsed = Url::parse(dsn).context("invalid database DSN")?;
        if parsed.password().is_some() {
            parsed.set_password(Some("***REDACTED***")).ok();
        }
        Ok(parsed.to_string())
    } else {
        Ok(dsn.to_owned())
    }
}
