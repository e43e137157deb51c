//! Configuration for the handle-rename module.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Module configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HandleRenameConfig {
    /// Shortest accepted handle.
    #[serde(default = "default_min_handle_length")]
    pub min_handle_length: usize,

    /// Longest accepted handle.
    #[serde(default = "default_max_handle_length")]
    pub max_handle_length: usize,

    /// Handles that collide with application routes. Compared case-insensitively.
    #[serde(default = "default_reserved_handles")]
    pub reserved_handles: Vec<String>,

    /// Path under which a user's pages are served, e.g. `/pagina/<handle>`.
    #[serde(default = "default_content_path_prefix")]
    pub content_path_prefix: String,

    /// Match handle references case-sensitively.
    #[serde(default)]
    pub case_sensitive: bool,

    /// Lifetime of redirect rules registered by a rename.
    #[serde(default = "default_redirect_ttl", with = "duration_serde")]
    pub redirect_ttl: Duration,

    #[serde(default)]
    pub cache: CacheConfig,
}

/// Cache behaviour during and after a rename.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    /// Write fresh profile/stats entries under the new handle after invalidation.
    #[serde(default = "default_repopulate")]
    pub repopulate: bool,

    #[serde(default = "default_profile_ttl", with = "duration_serde")]
    pub profile_ttl: Duration,

    #[serde(default = "default_stats_ttl", with = "duration_serde")]
    pub stats_ttl: Duration,

    /// How often the in-memory store sweeps expired entries.
    #[serde(default = "default_janitor_interval", with = "duration_serde")]
    pub janitor_interval: Duration,
}

fn default_min_handle_length() -> usize {
    3
}

fn default_max_handle_length() -> usize {
    50
}

fn default_reserved_handles() -> Vec<String> {
    ["admin", "api", "login", "logout", "pagina", "settings", "static"]
        .into_iter()
        .map(str::to_owned)
        .collect()
}

fn default_content_path_prefix() -> String {
    "/pagina".to_owned()
}

fn default_redirect_ttl() -> Duration {
    Duration::from_secs(365 * 24 * 60 * 60)
}

fn default_repopulate() -> bool {
    true
}

fn default_profile_ttl() -> Duration {
    Duration::from_secs(60 * 60)
}

fn default_stats_ttl() -> Duration {
    Duration::from_secs(10 * 60)
}

fn default_janitor_interval() -> Duration {
    Duration::from_secs(60)
}

impl Default for HandleRenameConfig {
    fn default() -> Self {
        Self {
            min_handle_length: default_min_handle_length(),
            max_handle_length: default_max_handle_length(),
            reserved_handles: default_reserved_handles(),
            content_path_prefix: default_content_path_prefix(),
            case_sensitive: false,
            redirect_ttl: default_redirect_ttl(),
            cache: CacheConfig::default(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            repopulate: default_repopulate(),
            profile_ttl: default_profile_ttl(),
            stats_ttl: default_stats_ttl(),
            janitor_interval: default_janitor_interval(),
        }
    }
}

/// Human-readable durations (`"90s"`, `"1h 30m"`, `"365d"`) via `humantime`.
pub mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer, de};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&humantime::format_duration(*d))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(d)?;
        humantime::parse_duration(&raw).map_err(de::Error::custom)
    }
}
