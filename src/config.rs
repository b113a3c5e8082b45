//! Process configuration loading.
//!
//! Process-level settings only (grace period, store path, HTTP port).
//! Per-guild settings live in [`crate::state::GuildConfigStore`] and are
//! mutated at runtime through admin commands, not through this file.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Process configuration.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Lifecycle manager tuning.
    #[serde(default)]
    pub manager: ManagerConfig,
    /// Guild-config store location.
    #[serde(default)]
    pub store: StoreConfig,
    /// Health/metrics HTTP surface.
    #[serde(default)]
    pub http: HttpConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

/// Lifecycle manager tuning.
#[derive(Debug, Clone, Deserialize)]
pub struct ManagerConfig {
    /// How long an empty managed channel survives before deletion.
    /// Absorbs quick rejoins; the occupancy is re-checked on expiry.
    #[serde(default = "default_grace_period_ms")]
    pub grace_period_ms: u64,
}

impl ManagerConfig {
    pub fn grace_period(&self) -> Duration {
        Duration::from_millis(self.grace_period_ms)
    }
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            grace_period_ms: default_grace_period_ms(),
        }
    }
}

fn default_grace_period_ms() -> u64 {
    1000
}

/// Guild-config store location.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Path of the JSON document holding per-guild settings.
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

fn default_store_path() -> PathBuf {
    PathBuf::from("guilds.json")
}

/// Health/metrics HTTP surface.
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Listen port for `/healthz` and `/metrics`.
    /// Convention: port 0 disables the HTTP surface (used by tests).
    #[serde(default = "default_http_port")]
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            port: default_http_port(),
        }
    }
}

fn default_http_port() -> u16 {
    9090
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_from_empty_document() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.manager.grace_period_ms, 1000);
        assert_eq!(
            config.manager.grace_period(),
            Duration::from_millis(1000)
        );
        assert_eq!(config.store.path, PathBuf::from("guilds.json"));
        assert_eq!(config.http.port, 9090);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[manager]\ngrace_period_ms = 250\n\n[store]\npath = \"/var/lib/autovoice/guilds.json\"\n\n[http]\nport = 0\n"
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.manager.grace_period_ms, 250);
        assert_eq!(
            config.store.path,
            PathBuf::from("/var/lib/autovoice/guilds.json")
        );
        assert_eq!(config.http.port, 0);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(matches!(
            Config::load("/nonexistent/autovoice.toml"),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn test_malformed_toml_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[manager\ngrace_period_ms = ").unwrap();
        assert!(matches!(
            Config::load(file.path()),
            Err(ConfigError::Parse(_))
        ));
    }
}
