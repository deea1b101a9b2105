// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon-wide configuration.
//!
//! Layered: defaults, then an optional TOML file, then environment
//! overrides, applied in that order.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub max_concurrent_workflows: usize,
    pub default_retry_budget: u32,
    pub retry_backoff_base_ms: u64,
    pub data_dir: PathBuf,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8420,
            database_url: "sqlite://amelia.db".to_string(),
            max_concurrent_workflows: 16,
            default_retry_budget: 3,
            retry_backoff_base_ms: 2_000,
            data_dir: PathBuf::from(".amelia"),
        }
    }
}

impl ServerSettings {
    /// Loads settings from defaults, an optional TOML file, then
    /// `AMELIA_*` environment variables, in ascending priority.
    pub fn load(file: Option<&std::path::Path>) -> Result<Self, ServerSettingsError> {
        let mut settings = Self::default();

        if let Some(path) = file {
            if path.exists() {
                let text = std::fs::read_to_string(path).map_err(|source| ServerSettingsError::Read { path: path.to_path_buf(), source })?;
                settings = toml::from_str(&text).map_err(|source| ServerSettingsError::Parse { path: path.to_path_buf(), source })?;
            }
        }

        if let Ok(host) = std::env::var("AMELIA_HOST") {
            settings.host = host;
        }
        if let Ok(port) = std::env::var("AMELIA_PORT") {
            settings.port = port.parse().map_err(|_| ServerSettingsError::InvalidEnv { var: "AMELIA_PORT", value: port })?;
        }
        if let Ok(url) = std::env::var("AMELIA_DATABASE_URL") {
            settings.database_url = url;
        }
        if let Ok(max) = std::env::var("AMELIA_MAX_CONCURRENT_WORKFLOWS") {
            settings.max_concurrent_workflows = max
                .parse()
                .map_err(|_| ServerSettingsError::InvalidEnv { var: "AMELIA_MAX_CONCURRENT_WORKFLOWS", value: max })?;
        }

        Ok(settings)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServerSettingsError {
    #[error("failed to read config file {path}")]
    Read { path: PathBuf, #[source] source: std::io::Error },
    #[error("failed to parse config file {path}")]
    Parse { path: PathBuf, #[source] source: toml::de::Error },
    #[error("invalid value for {var}: {value}")]
    InvalidEnv { var: &'static str, value: String },
}
