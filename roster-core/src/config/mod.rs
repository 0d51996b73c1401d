//! Configuration for the roster service.
//!
//! Values are resolved in the following order (highest priority wins):
//!
//! 1. **CLI flags** - applied by the binary after loading
//! 2. **Environment Variables** (`ROSTER_*`) - override file config
//! 3. **Config File** (config.toml) - override defaults
//! 4. **Defaults**
//!
//! # Example
//!
//! ```no_run
//! use roster_core::config::RosterConfig;
//!
//! let config = RosterConfig::load_from("roster.toml")?;
//! config.validate()?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod ingest;
pub mod logging;
pub mod server;
pub mod storage;

pub use ingest::IngestConfig;
pub use logging::LoggingConfig;
pub use server::ServerConfig;
pub use storage::StorageConfig;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    pub ingest: IngestConfig,
}

impl RosterConfig {
    /// Load `config.toml` from the working directory with env overrides.
    pub fn load() -> Result<Self> {
        Self::load_from("config.toml")
    }

    /// Defaults, then `path` if it exists, then environment variables.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = Self::default();

        if path.exists() {
            let file_config = Self::from_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?;
            config.merge(file_config);
        }

        config.apply_env_vars();
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config: {}", path.as_ref().display()))
    }

    /// Merge another config into this one (other takes priority)
    pub fn merge(&mut self, other: Self) {
        self.server.merge(other.server);
        self.storage.merge(other.storage);
        self.logging.merge(other.logging);
        self.ingest.merge(other.ingest);
    }

    pub fn apply_env_vars(&mut self) {
        self.server.apply_env_vars();
        self.storage.apply_env_vars();
        self.logging.apply_env_vars();
        self.ingest.apply_env_vars();
    }

    pub fn validate(&self) -> Result<()> {
        self.server.validate()?;
        self.storage.validate()?;
        self.logging.validate()?;
        self.ingest.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RosterConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.storage.backend, "file");
        assert!(!config.ingest.all_sheets);
        assert_eq!(config.ingest.rules.len(), 9);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roster.toml");
        std::fs::write(
            &path,
            r#"
[server]
port = 9090

[ingest]
validate_rows = true
"#,
        )
        .unwrap();

        let config = RosterConfig::load_from(&path).unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "127.0.0.1");
        assert!(config.ingest.validate_rows);
        assert_eq!(config.ingest.allowed_extensions, vec!["csv", "xls", "xlsx"]);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = RosterConfig::load_from(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.storage.data_dir, "./data");
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[server\nport = ").unwrap();
        let err = RosterConfig::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to load config"));
    }
}
