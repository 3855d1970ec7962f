//! Configuration for toplist displays.
//!
//! Maps directly to `toplist.toml`. Every field has a default, so an empty
//! file yields a working configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Result, ToplistError};

/// Current configuration schema version.
pub const CONFIG_VERSION: u32 = 3;

/// Top-level configuration, loadable from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToplistConfig {
    /// Schema version the file was written for.
    #[serde(default = "default_config_version")]
    pub config_version: u32,
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,
    /// What the displays show and how often.
    #[serde(default)]
    pub display: DisplayConfig,
    /// Score store connection settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Placement file settings.
    #[serde(default)]
    pub persistence: PersistenceConfig,
}

impl Default for ToplistConfig {
    fn default() -> Self {
        Self {
            config_version: CONFIG_VERSION,
            general: GeneralConfig::default(),
            display: DisplayConfig::default(),
            database: DatabaseConfig::default(),
            persistence: PersistenceConfig::default(),
        }
    }
}

impl ToplistConfig {
    /// Load configuration from a TOML string.
    ///
    /// An outdated `config_version` is reported with a warning, not rejected.
    ///
    /// # Errors
    /// Returns `ToplistError::Config` if the TOML is invalid or fails validation.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(toml_str).map_err(|e| ToplistError::Config(e.to_string()))?;

        if config.config_version < CONFIG_VERSION {
            warn!(
                expected = CONFIG_VERSION,
                current = config.config_version,
                "Configuration version mismatch"
            );
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Check cross-field constraints.
    ///
    /// # Errors
    /// Returns `ToplistError::Config` describing the first violation found.
    pub fn validate(&self) -> Result<()> {
        let display = &self.display;
        if display.time_based_refresh && display.refresh_interval_seconds == 0 {
            return Err(ToplistError::Config(
                "display.refresh_interval_seconds must be at least 1 when time_based_refresh is on"
                    .into(),
            ));
        }
        if !display.proximity_threshold.is_finite() || display.proximity_threshold <= 0.0 {
            return Err(ToplistError::Config(format!(
                "display.proximity_threshold must be a positive number, got {}",
                display.proximity_threshold
            )));
        }
        if !self
            .database
            .table_prefix
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(ToplistError::Config(format!(
                "database.table_prefix may only contain [A-Za-z0-9_], got '{}'",
                self.database.table_prefix
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// General system settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Whether displays are managed at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Log level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            log_level: "info".to_string(),
        }
    }
}

/// Leaderboard content and refresh behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// How many ranked rows each display shows.
    #[serde(default = "default_top_count")]
    pub top_count: usize,
    /// Refresh on a fixed timer in addition to round starts.
    #[serde(default)]
    pub time_based_refresh: bool,
    /// Timer period when `time_based_refresh` is on.
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_seconds: u64,
    /// First line of every display.
    #[serde(default = "default_title")]
    pub title_text: String,
    /// Maximum distance (world units) at which an operator can remove a display.
    #[serde(default = "default_proximity")]
    pub proximity_threshold: f32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            top_count: 5,
            time_based_refresh: false,
            refresh_interval_seconds: 60,
            title_text: default_title(),
            proximity_threshold: 100.0,
        }
    }
}

/// Which score store implementation to query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    /// Remote MySQL / MariaDB server.
    Mysql,
    /// Local SQLite file.
    Sqlite,
}

/// Score store connection settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Backend selection.
    #[serde(default = "default_backend")]
    pub backend: DatabaseBackend,
    /// Server host name.
    #[serde(default = "default_host")]
    pub host: String,
    /// Login user.
    #[serde(default = "default_username")]
    pub username: String,
    /// Schema name.
    #[serde(default = "default_database")]
    pub database: String,
    /// Login password.
    #[serde(default = "default_password")]
    pub password: String,
    /// Server port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// TLS mode: none, preferred, required, verify_ca, verify_identity.
    #[serde(default = "default_sslmode")]
    pub sslmode: String,
    /// Prefix prepended to the `k4ranks` table name.
    #[serde(default)]
    pub table_prefix: String,
    /// Database file used when `backend = "sqlite"`.
    #[serde(default = "default_sqlite_path")]
    pub sqlite_path: PathBuf,
}

impl DatabaseConfig {
    /// Fully qualified ranks table name.
    #[must_use]
    pub fn ranks_table(&self) -> String {
        format!("{}k4ranks", self.table_prefix)
    }
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("backend", &self.backend)
            .field("host", &self.host)
            .field("username", &self.username)
            .field("database", &self.database)
            .field("port", &self.port)
            .field("sslmode", &self.sslmode)
            .field("table_prefix", &self.table_prefix)
            .field("sqlite_path", &self.sqlite_path)
            .finish_non_exhaustive()
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: DatabaseBackend::Mysql,
            host: default_host(),
            username: default_username(),
            database: default_database(),
            password: default_password(),
            port: 3306,
            sslmode: default_sslmode(),
            table_prefix: String::new(),
            sqlite_path: default_sqlite_path(),
        }
    }
}

/// Placement file settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Directory holding one `<world>_toplists.json` per world.
    #[serde(default = "default_directory")]
    pub directory: PathBuf,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value helpers for serde
// ---------------------------------------------------------------------------

fn default_true() -> bool { true }
fn default_config_version() -> u32 { CONFIG_VERSION }
fn default_log_level() -> String { "info".to_string() }
fn default_top_count() -> usize { 5 }
fn default_refresh_interval() -> u64 { 60 }
fn default_title() -> String { "----- Toplist -----".to_string() }
fn default_proximity() -> f32 { 100.0 }
fn default_backend() -> DatabaseBackend { DatabaseBackend::Mysql }
fn default_host() -> String { "localhost".to_string() }
fn default_username() -> String { "root".to_string() }
fn default_database() -> String { "database".to_string() }
fn default_password() -> String { "password".to_string() }
fn default_port() -> u16 { 3306 }
fn default_sslmode() -> String { "none".to_string() }
fn default_sqlite_path() -> PathBuf { PathBuf::from("k4ranks.db") }
fn default_directory() -> PathBuf { PathBuf::from("toplists") }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_uses_defaults() {
        let config = ToplistConfig::from_toml("").expect("parse");
        assert_eq!(config.config_version, CONFIG_VERSION);
        assert_eq!(config.display.top_count, 5);
        assert!(!config.display.time_based_refresh);
        assert_eq!(config.display.refresh_interval_seconds, 60);
        assert_eq!(config.display.title_text, "----- Toplist -----");
        assert_eq!(config.database.port, 3306);
        assert_eq!(config.database.backend, DatabaseBackend::Mysql);
        assert_eq!(config.database.ranks_table(), "k4ranks");
    }

    #[test]
    fn partial_toml_overrides() {
        let config = ToplistConfig::from_toml(
            r#"
            config_version = 2

            [display]
            top_count = 10
            time_based_refresh = true
            refresh_interval_seconds = 30

            [database]
            backend = "sqlite"
            table_prefix = "cs2_"
            "#,
        )
        .expect("parse");

        assert_eq!(config.config_version, 2);
        assert_eq!(config.display.top_count, 10);
        assert!(config.display.time_based_refresh);
        assert_eq!(config.display.refresh_interval_seconds, 30);
        assert_eq!(config.database.backend, DatabaseBackend::Sqlite);
        assert_eq!(config.database.ranks_table(), "cs2_k4ranks");
        assert_eq!(config.database.host, "localhost");
    }

    #[test]
    fn zero_interval_with_timer_is_rejected() {
        let result = ToplistConfig::from_toml(
            "[display]\ntime_based_refresh = true\nrefresh_interval_seconds = 0\n",
        );
        assert!(matches!(result, Err(ToplistError::Config(_))));
    }

    #[test]
    fn hostile_table_prefix_is_rejected() {
        let result = ToplistConfig::from_toml("[database]\ntable_prefix = \"x`; DROP TABLE y; --\"\n");
        assert!(matches!(result, Err(ToplistError::Config(_))));
    }

    #[test]
    fn debug_hides_password() {
        let config = DatabaseConfig {
            password: "hunter2".into(),
            ..DatabaseConfig::default()
        };
        assert!(!format!("{config:?}").contains("hunter2"));
    }
}
