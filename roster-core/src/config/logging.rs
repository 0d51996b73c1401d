//! Logging configuration

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `json`, `human`, `logfmt`, or `env` to defer to `RUST_LOG`
    pub format: String,
    /// `stdout`, `stderr` or `file`
    pub output: String,
    pub file_path: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "human".to_string(),
            output: "stderr".to_string(),
            file_path: "./logs/roster.log".to_string(),
        }
    }
}

impl LoggingConfig {
    pub fn merge(&mut self, other: Self) {
        *self = other;
    }

    pub fn apply_env_vars(&mut self) {
        if let Ok(level) = env::var("ROSTER_LOG_LEVEL") {
            self.level = level;
        }
        if let Ok(format) = env::var("ROSTER_LOG_FORMAT") {
            self.format = format;
        }
        if let Ok(output) = env::var("ROSTER_LOG_OUTPUT") {
            self.output = output;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.level.parse::<log::LevelFilter>().is_err() {
            bail!("Invalid log level '{}'", self.level);
        }
        if !matches!(self.format.as_str(), "json" | "human" | "logfmt" | "env") {
            bail!("Invalid log format '{}'", self.format);
        }
        if !matches!(self.output.as_str(), "stdout" | "stderr" | "file") {
            bail!("Invalid log output '{}'", self.output);
        }
        Ok(())
    }
}
