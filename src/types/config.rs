//! Configuration for riasec.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::RiasecResult;

/// Environment variable that overrides `provider.api_key`.
pub const API_KEY_ENV: &str = "CAREERNET_API_KEY";

/// Main configuration for riasec.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Questionnaire provider settings.
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Snapshot storage settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Analysis cache settings.
    #[serde(default)]
    pub cache: CacheConfig,
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

/// Upstream questionnaire provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of the questionnaire API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key. Overridden by `CAREERNET_API_KEY` when set.
    #[serde(default)]
    pub api_key: String,

    /// Questionnaire id requested from the provider.
    #[serde(default = "default_test_number")]
    pub test_number: u32,

    /// Human readable questionnaire name recorded in snapshot provenance.
    #[serde(default = "default_test_type")]
    pub test_type: String,

    /// Timeout for each provider call (in seconds).
    #[serde(default = "default_provider_timeout")]
    pub timeout_secs: u64,
}

impl ProviderConfig {
    /// Resolves the API key, preferring the environment.
    pub fn resolved_api_key(&self) -> String {
        std::env::var(API_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .unwrap_or_else(|| self.api_key.clone())
    }

    /// Timeout as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: String::new(),
            test_number: default_test_number(),
            test_type: default_test_type(),
            timeout_secs: default_provider_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "https://www.career.go.kr/inspct/openapi/v2".to_string()
}

fn default_test_number() -> u32 {
    33
}

fn default_test_type() -> String {
    "직업흥미검사(H)".to_string()
}

fn default_provider_timeout() -> u64 {
    10
}

/// Storage backends selectable at composition time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StorageKind {
    /// SQLite key/value table.
    Sqlite,
    /// One JSON file per key.
    File,
    /// Process memory only.
    Memory,
}

impl StorageKind {
    /// Conventional location for this backend.
    pub fn default_path(self) -> PathBuf {
        match self {
            StorageKind::Sqlite => PathBuf::from(".riasec/riasec.db"),
            StorageKind::File | StorageKind::Memory => PathBuf::from(".riasec"),
        }
    }
}

impl std::fmt::Display for StorageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageKind::Sqlite => write!(f, "sqlite"),
            StorageKind::File => write!(f, "file"),
            StorageKind::Memory => write!(f, "memory"),
        }
    }
}

/// Snapshot storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Backend kind.
    #[serde(default = "default_storage_kind")]
    pub backend: StorageKind,

    /// Database file (sqlite) or directory (file).
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,

    /// Key under which the snapshot document is stored.
    #[serde(default = "default_storage_key")]
    pub key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_storage_kind(),
            path: default_storage_path(),
            key: default_storage_key(),
        }
    }
}

#[cfg(feature = "sqlite")]
fn default_storage_kind() -> StorageKind {
    StorageKind::Sqlite
}

#[cfg(not(feature = "sqlite"))]
fn default_storage_kind() -> StorageKind {
    StorageKind::File
}

fn default_storage_path() -> PathBuf {
    default_storage_kind().default_path()
}

fn default_storage_key() -> String {
    "hollandDatabase".to_string()
}

/// Analysis cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Maximum cache capacity (number of entries).
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,

    /// Entry time to live in seconds.
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            capacity: default_cache_capacity(),
            ttl_secs: default_cache_ttl(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_cache_capacity() -> usize {
    256
}

fn default_cache_ttl() -> u64 {
    600 // 10 minutes
}

impl Config {
    /// Loads configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> RiasecResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Saves configuration to a TOML file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> RiasecResult<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Creates default configuration.
    pub fn default_config() -> Self {
        Self {
            general: GeneralConfig::default(),
            provider: ProviderConfig::default(),
            storage: StorageConfig::default(),
            cache: CacheConfig::default(),
        }
    }

    /// Tries to load configuration from current directory or uses default.
    pub fn load_or_default() -> Self {
        Self::load("riasec.toml").unwrap_or_else(|_| Self::default_config())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}
