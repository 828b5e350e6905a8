// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 remarsh contributors

//! Echo server configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Echo server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Name the root servant is bound under in the name service
    /// (default: "test")
    #[serde(default = "default_root_name")]
    pub root_name: String,

    /// Run the built-in operation self-check after startup
    #[serde(default = "default_true")]
    pub self_check: bool,

    /// Poll interval of the shutdown wait loop, in milliseconds
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
}

fn default_root_name() -> String {
    "test".to_string()
}

fn default_true() -> bool {
    true
}

fn default_poll_interval() -> u64 {
    200
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            root_name: default_root_name(),
            self_check: true,
            poll_interval_ms: default_poll_interval(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;

        serde_json::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, content).map_err(|e| ConfigError::IoError(e.to_string()))
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.root_name.is_empty() {
            return Err(ConfigError::InvalidValue(
                "root_name cannot be empty".into(),
            ));
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidValue(
                "poll_interval_ms cannot be 0".into(),
            ));
        }
        Ok(())
    }
}

/// Configuration error types.
#[derive(Debug, Clone)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
    SerializeError(String),
    InvalidValue(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IoError(s) => write!(f, "I/O error: {}", s),
            Self::ParseError(s) => write!(f, "Parse error: {}", s),
            Self::SerializeError(s) => write!(f, "Serialize error: {}", s),
            Self::InvalidValue(s) => write!(f, "Invalid value: {}", s),
        }
    }
}

impl std::error::Error for ConfigError {}
