//! Storage configuration

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// `file` or `memory`
    pub backend: String,
    pub data_dir: String,
    /// Where uploaded spreadsheets are kept; unset discards them after ingestion
    pub upload_dir: Option<String>,
    pub fsync_on_write: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: "file".to_string(),
            data_dir: "./data".to_string(),
            upload_dir: None,
            fsync_on_write: false,
        }
    }
}

impl StorageConfig {
    pub fn merge(&mut self, other: Self) {
        *self = other;
    }

    pub fn apply_env_vars(&mut self) {
        if let Ok(backend) = env::var("ROSTER_STORAGE_BACKEND") {
            self.backend = backend;
        }
        if let Ok(dir) = env::var("ROSTER_DATA_DIR") {
            self.data_dir = dir;
        }
        if let Ok(dir) = env::var("ROSTER_UPLOAD_DIR") {
            self.upload_dir = Some(dir);
        }
        if let Ok(fsync) = env::var("ROSTER_FSYNC") {
            self.fsync_on_write = fsync.parse().unwrap_or(false);
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self.backend.as_str() {
            "file" | "memory" => {}
            other => bail!("Invalid storage backend '{}': expected 'file' or 'memory'", other),
        }
        if self.backend == "file" && self.data_dir.is_empty() {
            bail!("Invalid data_dir: cannot be empty for the file backend");
        }
        Ok(())
    }
}
