//! Configuration validation rules.
//!
//! Validation logic for `WorkerConfig` values after they have been loaded
//! from environment, files, or defaults.

use crate::config::WorkerConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

impl WorkerConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `cache_name` or `user_agent` is empty
    /// - `origin` is not an http(s) URL
    /// - `precache_manifest` is empty or omits `offline_path`
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `max_entry_bytes` is 0 or exceeds 50MB
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_name.is_empty() {
            return Err(ConfigError::Invalid { field: "cache_name".into(), reason: "must not be empty".into() });
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        if !self.origin.starts_with("http://") && !self.origin.starts_with("https://") {
            return Err(ConfigError::Invalid { field: "origin".into(), reason: "must be an http(s) URL".into() });
        }

        if self.precache_manifest.is_empty() {
            return Err(ConfigError::Invalid {
                field: "precache_manifest".into(),
                reason: "must list at least one URL".into(),
            });
        }

        if !self.precache_manifest.iter().any(|entry| entry == &self.offline_path) {
            return Err(ConfigError::Invalid {
                field: "precache_manifest".into(),
                reason: format!("must include the offline fallback page ({})", self.offline_path),
            });
        }

        if self.timeout_ms < 100 {
            return Err(ConfigError::Invalid { field: "timeout_ms".into(), reason: "must be at least 100ms".into() });
        }
        if self.timeout_ms > 300_000 {
            return Err(ConfigError::Invalid {
                field: "timeout_ms".into(),
                reason: "must not exceed 5 minutes (300000ms)".into(),
            });
        }

        if self.max_entry_bytes == 0 {
            return Err(ConfigError::Invalid {
                field: "max_entry_bytes".into(),
                reason: "must be greater than 0".into(),
            });
        }
        if self.max_entry_bytes > 50 * 1024 * 1024 {
            return Err(ConfigError::Invalid {
                field: "max_entry_bytes".into(),
                reason: "must not exceed 50MB".into(),
            });
        }

        if self.cache_cross_origin {
            tracing::warn!(
                origin = %self.origin,
                "cross-origin runtime caching enabled; any 200 response will be stored"
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        let config = WorkerConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_cache_name() {
        let config = WorkerConfig { cache_name: String::new(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "cache_name"));
    }

    #[test]
    fn test_validate_bad_origin() {
        let config = WorkerConfig { origin: "ftp://example.com".into(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "origin"));
    }

    #[test]
    fn test_validate_empty_manifest() {
        let config = WorkerConfig { precache_manifest: Vec::new(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "precache_manifest"));
    }

    #[test]
    fn test_validate_manifest_missing_offline_page() {
        let config = WorkerConfig { precache_manifest: vec!["/".into()], ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "precache_manifest"));
    }

    #[test]
    fn test_validate_timeout_too_small() {
        let config = WorkerConfig { timeout_ms: 50, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "timeout_ms"));
    }

    #[test]
    fn test_validate_timeout_exceeds_limit() {
        let config = WorkerConfig { timeout_ms: 301_000, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "timeout_ms"));
    }

    #[test]
    fn test_validate_max_entry_bytes_zero() {
        let config = WorkerConfig { max_entry_bytes: 0, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "max_entry_bytes"));
    }

    #[test]
    fn test_validate_max_entry_bytes_exceeds_limit() {
        let config = WorkerConfig { max_entry_bytes: 51 * 1024 * 1024, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "max_entry_bytes"));
    }

    #[test]
    fn test_validate_edge_case_values() {
        let config = WorkerConfig { timeout_ms: 100, max_entry_bytes: 1, ..Default::default() };
        assert!(config.validate().is_ok());
    }
}
