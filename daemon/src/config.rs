//! Daemon configuration with TOML file support.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use explorer_store_lmdb::IndexStoreConfig;
use explorer_utils::LogFormat;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {reason}")]
    Read { path: PathBuf, reason: String },

    #[error("invalid config: {0}")]
    Parse(String),

    #[error("failed to serialize config: {0}")]
    Serialize(String),
}

/// Configuration for the explorer daemon.
///
/// File values are the base; CLI flags and env vars override them.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExplorerConfig {
    /// Directory of the base store. The index store lives in its `ext/`
    /// subdirectory.
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,

    /// Chain to serve. May be omitted when the store holds a single chain.
    #[serde(default)]
    pub chain_id: Option<String>,

    /// Address the query API binds to.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Keep the indices in memory and rebuild them at startup instead of
    /// persisting them under `ext/`.
    #[serde(default)]
    pub memory_index: bool,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub index: IndexStoreConfig,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_store_path() -> PathBuf {
    PathBuf::from("./explorer_data")
}

fn default_bind_address() -> String {
    "127.0.0.1:5000".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl ExplorerConfig {
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    /// Where the persistent index environment lives, or `None` for an
    /// in-memory index.
    pub fn index_path(&self) -> Option<PathBuf> {
        (!self.memory_index).then(|| self.store_path.join("ext"))
    }
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            chain_id: None,
            bind_address: default_bind_address(),
            memory_index: false,
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            index: IndexStoreConfig::default(),
        }
    }
}
