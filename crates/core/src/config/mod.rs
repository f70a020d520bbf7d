//! Worker configuration with layered loading.
//!
//! Configuration is assembled with figment from multiple sources:
//!
//! 1. Environment variables (EMBER_*)
//! 2. TOML config file (if EMBER_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Offline worker configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (EMBER_*)
/// 2. TOML config file (if EMBER_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Name of the current cache generation.
    ///
    /// Doubles as the deployment version string: bump it whenever cached
    /// asset contents change so activation evicts the previous generation.
    /// The worker never computes or interprets this value.
    #[serde(default = "default_cache_name")]
    pub cache_name: String,

    /// Path to the SQLite cache database.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Origin the worker serves, e.g. "https://app.example.org".
    ///
    /// Relative precache entries are resolved against it, and runtime
    /// caching is restricted to it unless `cache_cross_origin` is set.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// URLs to precache during install.
    ///
    /// Entries may be absolute or relative to `origin`. Must include
    /// `offline_path`.
    #[serde(default = "default_precache_manifest")]
    pub precache_manifest: Vec<String>,

    /// Path of the static page served to navigations when both cache and
    /// network fail.
    #[serde(default = "default_offline_path")]
    pub offline_path: String,

    /// User-Agent string for outgoing requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Network fetch timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Largest response body, in bytes, eligible for caching.
    ///
    /// Oversized bodies are still delivered to the page; they are just
    /// never written to the cache.
    #[serde(default = "default_max_entry_bytes")]
    pub max_entry_bytes: usize,

    /// Allow runtime caching of cross-origin responses.
    ///
    /// Off by default; precache manifest entries are exempt and may always
    /// name cross-origin assets.
    #[serde(default)]
    pub cache_cross_origin: bool,
}

fn default_cache_name() -> String {
    "ember-cache-v1".into()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./ember-cache.sqlite")
}

fn default_origin() -> String {
    "http://localhost:8000".into()
}

fn default_precache_manifest() -> Vec<String> {
    vec!["/".into(), "/offline.html".into()]
}

fn default_offline_path() -> String {
    "/offline.html".into()
}

fn default_user_agent() -> String {
    "ember/0.1".into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_max_entry_bytes() -> usize {
    5_242_880 // 5MB
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            cache_name: default_cache_name(),
            db_path: default_db_path(),
            origin: default_origin(),
            precache_manifest: default_precache_manifest(),
            offline_path: default_offline_path(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            max_entry_bytes: default_max_entry_bytes(),
            cache_cross_origin: false,
        }
    }
}

impl WorkerConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `EMBER_`
    /// 2. TOML file from `EMBER_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("EMBER_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("EMBER_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = WorkerConfig::default();
        assert_eq!(config.cache_name, "ember-cache-v1");
        assert_eq!(config.db_path, PathBuf::from("./ember-cache.sqlite"));
        assert_eq!(config.origin, "http://localhost:8000");
        assert_eq!(config.offline_path, "/offline.html");
        assert_eq!(config.user_agent, "ember/0.1");
        assert_eq!(config.timeout_ms, 20_000);
        assert_eq!(config.max_entry_bytes, 5_242_880);
        assert!(!config.cache_cross_origin);
        assert!(config.precache_manifest.contains(&"/offline.html".to_string()));
    }

    #[test]
    fn test_timeout_duration() {
        let config = WorkerConfig::default();
        assert_eq!(config.timeout(), Duration::from_millis(20_000));
    }

    #[test]
    fn test_default_config_validates() {
        assert!(WorkerConfig::default().validate().is_ok());
    }
}
