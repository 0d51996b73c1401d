//! HTTP server configuration

use crate::error::DEFAULT_ERROR_TYPE_BASE;
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Env: ROSTER_PORT
    /// Default: 8080
    pub port: u16,

    /// Env: ROSTER_HOST
    /// Default: "127.0.0.1"
    pub host: String,

    /// Maximum request body size in bytes, uploads included
    /// Env: ROSTER_MAX_BODY_SIZE
    /// Default: 16777216 (16MB)
    pub max_body_size: usize,

    /// Env: ROSTER_CORS_ENABLED
    /// Default: false
    pub cors_enabled: bool,

    /// Env: ROSTER_CORS_ORIGINS (comma-separated)
    /// Default: ["*"]
    pub cors_origins: Vec<String>,

    /// Prefix of the `type` URI in error payloads
    /// Env: ROSTER_ERROR_TYPE_BASE
    pub error_type_base: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "127.0.0.1".to_string(),
            max_body_size: 16 * 1024 * 1024,
            cors_enabled: false,
            cors_origins: vec!["*".to_string()],
            error_type_base: DEFAULT_ERROR_TYPE_BASE.to_string(),
        }
    }
}

impl ServerConfig {
    pub fn merge(&mut self, other: Self) {
        *self = other;
    }

    pub fn apply_env_vars(&mut self) {
        if let Ok(port) = env::var("ROSTER_PORT") {
            if let Ok(p) = port.parse() {
                self.port = p;
            }
        }

        if let Ok(host) = env::var("ROSTER_HOST") {
            self.host = host;
        }

        if let Ok(size) = env::var("ROSTER_MAX_BODY_SIZE") {
            if let Ok(s) = size.parse() {
                self.max_body_size = s;
            }
        }

        if let Ok(enabled) = env::var("ROSTER_CORS_ENABLED") {
            self.cors_enabled = enabled.parse().unwrap_or(false);
        }

        if let Ok(origins) = env::var("ROSTER_CORS_ORIGINS") {
            self.cors_origins = origins.split(',').map(|s| s.trim().to_string()).collect();
        }

        if let Ok(base) = env::var("ROSTER_ERROR_TYPE_BASE") {
            self.error_type_base = base;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            bail!("Invalid port: port must be between 1 and 65535");
        }

        if self.host.is_empty() {
            bail!("Invalid host: host cannot be empty");
        }

        if self.max_body_size == 0 {
            bail!("Invalid max_body_size: must be greater than 0");
        }

        if self.cors_enabled && self.cors_origins.is_empty() {
            bail!("CORS is enabled but no origins are configured");
        }

        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
