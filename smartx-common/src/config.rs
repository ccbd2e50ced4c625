//! Configuration loading and config file resolution
//!
//! Bootstrap configuration comes from a single TOML file. Every field has a
//! built-in default, so a missing or partial file never prevents startup.
//!
//! Config file location priority:
//! 1. Command-line argument (highest priority)
//! 2. `SMARTX_CONFIG` environment variable
//! 3. `~/.config/smartx/config.toml`
//! 4. Built-in defaults (no file)

use crate::storage::BucketConfig;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "SMARTX_CONFIG";

/// Default signed URL lifetime
pub const DEFAULT_SIGNED_URL_EXPIRY_SECS: u64 = 3600;

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    /// SQLite data platform file
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// smartx-api listen port
    #[serde(default = "default_port")]
    pub port: u16,

    /// smartx-api bind address
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub client: ClientConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Storage buckets and URL signing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Remote storage service base URL (enables the HTTP signer together with `service_key`)
    #[serde(default)]
    pub base_url: Option<String>,

    /// Bearer key for the remote signing endpoint
    #[serde(default)]
    pub service_key: Option<String>,

    /// Base URL for locally signed object URLs
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,

    /// Secret used by the local signer
    #[serde(default = "default_signing_secret")]
    pub signing_secret: String,

    /// Bucket used when a stored path does not start with a known bucket
    #[serde(default = "default_bucket")]
    pub default_bucket: String,

    #[serde(default = "default_known_buckets")]
    pub known_buckets: Vec<String>,

    /// Bucket that legacy video banner paths belong to
    #[serde(default = "default_video_bucket")]
    pub video_bucket: String,

    #[serde(default = "default_signed_url_expiry_secs")]
    pub signed_url_expiry_secs: u64,
}

/// Dual-path client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the primary aggregation endpoint
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Retries allowed after the first failed attempt
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_database_path() -> PathBuf {
    PathBuf::from("smartx.db")
}

fn default_port() -> u16 {
    5780
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_public_base_url() -> String {
    "http://127.0.0.1:5780/storage".to_string()
}

fn default_signing_secret() -> String {
    "smartx-dev-secret".to_string()
}

fn default_bucket() -> String {
    "artist-media".to_string()
}

fn default_known_buckets() -> Vec<String> {
    [
        "artist-media",
        "avatars",
        "photos",
        "videos",
        "audio",
        "documents",
        "projects",
        "events",
    ]
    .iter()
    .map(|b| b.to_string())
    .collect()
}

fn default_video_bucket() -> String {
    "videos".to_string()
}

fn default_signed_url_expiry_secs() -> u64 {
    DEFAULT_SIGNED_URL_EXPIRY_SECS
}

fn default_api_base_url() -> String {
    "http://127.0.0.1:5780".to_string()
}

fn default_max_retries() -> u32 {
    2
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            port: default_port(),
            bind_address: default_bind_address(),
            storage: StorageConfig::default(),
            client: ClientConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            service_key: None,
            public_base_url: default_public_base_url(),
            signing_secret: default_signing_secret(),
            default_bucket: default_bucket(),
            known_buckets: default_known_buckets(),
            video_bucket: default_video_bucket(),
            signed_url_expiry_secs: default_signed_url_expiry_secs(),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            max_retries: default_max_retries(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl StorageConfig {
    /// Bucket layout used by the resolver and the CSV banner normalizer
    pub fn buckets(&self) -> BucketConfig {
        BucketConfig::new(
            self.known_buckets.iter().cloned(),
            self.default_bucket.clone(),
            self.video_bucket.clone(),
        )
    }

    /// True when both remote signing settings are present
    pub fn uses_remote_signer(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().map(|s| !s.trim().is_empty()).unwrap_or(false);
        present(&self.base_url) && present(&self.service_key)
    }
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
    }

    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Load configuration following the file location priority
    ///
    /// A missing file falls back to defaults with a warning. A file that
    /// exists but does not parse is an error.
    pub fn resolve(cli_arg: Option<&Path>) -> Result<Self> {
        match resolve_config_path(cli_arg) {
            Some(path) if path.exists() => {
                let config = Self::load(&path)?;
                info!("Loaded configuration from {}", path.display());
                Ok(config)
            }
            Some(path) => {
                warn!(
                    "Config file {} not found, using built-in defaults",
                    path.display()
                );
                Ok(Self::default())
            }
            None => {
                info!("No config file found, using built-in defaults");
                Ok(Self::default())
            }
        }
    }
}

/// Resolve the config file path
///
/// Returns `None` only when no tier names a file and the per-user default
/// does not exist.
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: Per-user config file
    dirs::config_dir()
        .map(|d| d.join("smartx").join("config.toml"))
        .filter(|p| p.exists())
}
