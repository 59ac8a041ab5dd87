//! Service configuration: a small JSON file with defaults for everything
//! except the store location.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::pipeline::PipelineConfig;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelConfig {
    /// Base URL of an Ollama-compatible endpoint.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Model name passed to the endpoint.
    #[serde(default = "default_model_name")]
    pub name: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            name: default_model_name(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: String,
    /// SQLite database location; defaults to `~/.sectioner/data/sectioner.db`.
    #[serde(default)]
    pub database_path: Option<PathBuf>,
    /// Root directory of the object store.
    pub store_directory: PathBuf,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default = "default_poll_delay_secs")]
    pub poll_delay_secs: u64,
    #[serde(default = "default_max_poll_attempts")]
    pub max_poll_attempts: u32,
    #[serde(default = "default_parent_ceiling_secs")]
    pub parent_ceiling_secs: u64,
    #[serde(default = "default_child_ceiling_secs")]
    pub child_ceiling_secs: u64,
}

fn default_version() -> String {
    "1.0".to_string()
}

fn default_endpoint() -> String {
    crate::model::ollama::DEFAULT_ENDPOINT.to_string()
}

fn default_model_name() -> String {
    "llama3".to_string()
}

fn default_poll_delay_secs() -> u64 {
    15
}

fn default_max_poll_attempts() -> u32 {
    40
}

fn default_parent_ceiling_secs() -> u64 {
    600
}

fn default_child_ceiling_secs() -> u64 {
    300
}

impl Config {
    /// A config for running without a file: store and database under the
    /// user's home directory (or the working directory as a fallback).
    pub fn default_local() -> Self {
        let base = dirs::home_dir()
            .map(|h| h.join(".sectioner"))
            .unwrap_or_else(|| PathBuf::from("."));
        Self {
            version: default_version(),
            database_path: None,
            store_directory: base.join("store"),
            model: ModelConfig::default(),
            poll_delay_secs: default_poll_delay_secs(),
            max_poll_attempts: default_max_poll_attempts(),
            parent_ceiling_secs: default_parent_ceiling_secs(),
            child_ceiling_secs: default_child_ceiling_secs(),
        }
    }

    /// Resolved database path: explicit setting or the platform default.
    pub fn database_path(&self) -> Option<PathBuf> {
        self.database_path
            .clone()
            .or_else(crate::db::default_database_path)
    }

    /// Pipeline timing derived from the config values.
    pub fn pipeline(&self) -> PipelineConfig {
        PipelineConfig {
            poll_delay: Duration::from_secs(self.poll_delay_secs),
            max_poll_attempts: self.max_poll_attempts,
            parent_ceiling: Duration::from_secs(self.parent_ceiling_secs),
            child_ceiling: Duration::from_secs(self.child_ceiling_secs),
        }
    }
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let config: Config = serde_json::from_str(content)?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.version != "1.0" {
        return Err(ConfigError::Validation {
            message: format!("Unsupported config version: {}", config.version),
        });
    }

    if config.poll_delay_secs == 0 || config.max_poll_attempts == 0 {
        return Err(ConfigError::Validation {
            message: "poll delay and attempt bound must be positive".to_string(),
        });
    }
    if config.parent_ceiling_secs == 0 || config.child_ceiling_secs == 0 {
        return Err(ConfigError::Validation {
            message: "pipeline ceilings must be positive".to_string(),
        });
    }
    if config.poll_delay_secs * u64::from(config.max_poll_attempts) > config.parent_ceiling_secs {
        return Err(ConfigError::Validation {
            message: "poll budget exceeds the parent pipeline ceiling".to_string(),
        });
    }

    Ok(())
}
