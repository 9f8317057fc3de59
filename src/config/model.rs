//! Configuration data model.
//!
//! All structs derive `Serialize`/`Deserialize` for TOML persistence.
//! Every field has a sensible default so the application works out of the box.

use serde::{Deserialize, Serialize};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub registry: RegistryConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub browse: BrowseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Catalog registry that handles authentication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    #[serde(default = "default_registry_url")]
    pub url: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            url: default_registry_url(),
            timeout_secs: default_timeout(),
        }
    }
}

/// Where bucket contents are read from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory whose subdirectories are served as buckets.
    #[serde(default = "default_storage_root")]
    pub root: String,
    /// Buckets to offer on the bucket list. Empty means every bucket found
    /// under `root`.
    #[serde(default)]
    pub buckets: Vec<String>,
    /// When set, download links point at this public S3-compatible endpoint
    /// instead of the local files.
    #[serde(default)]
    pub download_endpoint: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: default_storage_root(),
            buckets: Vec::new(),
            download_endpoint: None,
        }
    }
}

/// Navigation and preview settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowseConfig {
    /// Bytes read for file previews and README summaries.
    #[serde(default = "default_preview_bytes")]
    pub preview_bytes: usize,
    /// Where to go after signing in when no `next` route was requested.
    #[serde(default = "default_sign_in_redirect")]
    pub sign_in_redirect: String,
    #[serde(default = "default_start_route")]
    pub start_route: String,
}

impl Default for BrowseConfig {
    fn default() -> Self {
        Self {
            preview_bytes: default_preview_bytes(),
            sign_in_redirect: default_sign_in_redirect(),
            start_route: default_start_route(),
        }
    }
}

/// Diagnostic log settings. Logs go to a file because the terminal is
/// owned by the UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_log_file")]
    pub file: String,
    /// An `EnvFilter` directive, e.g. `"info"` or `"crabcat=debug"`.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            file: default_log_file(),
            level: default_log_level(),
        }
    }
}

fn default_registry_url() -> String {
    "http://localhost:5000".to_string()
}
fn default_timeout() -> u64 {
    30
}
fn default_storage_root() -> String {
    "~/.local/share/crabcat/buckets".to_string()
}
fn default_preview_bytes() -> usize {
    64 * 1024
}
fn default_sign_in_redirect() -> String {
    "/b".to_string()
}
fn default_start_route() -> String {
    "/b".to_string()
}
fn default_log_file() -> String {
    "~/.local/share/crabcat/crabcat.log".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}
