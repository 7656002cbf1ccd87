//! Configuration management for Easel.
//!
//! Configuration is loaded from a platform-appropriate TOML file with
//! sensible defaults. Secrets support `${ENV_VAR}` indirection so the key
//! itself never has to live in the file.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use crate::job::backoff::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for Easel.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Remote API settings
    pub api: ApiConfig,

    /// Default request parameters
    pub defaults: DefaultsConfig,

    /// Retry behavior
    pub retry: RetryConfig,

    /// Remote call limits
    pub limits: LimitsConfig,

    /// Credits display settings
    pub credits: CreditsConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories, falling back to
    /// `~/.easel/config.toml` if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "easel", "easel")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".easel").join("config.toml")
            })
    }

    /// Resolve the configured API key, following `${ENV_VAR}` indirection.
    ///
    /// Returns `None` when the key is unset or its env var is absent.
    pub fn api_key(&self) -> Option<String> {
        resolve_env_var(&self.api.api_key)
    }

    /// Retry policy for new jobs, from the `[retry]` section.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            auto_retry: self.retry.auto_retry,
            max_retries: self.retry.max_retries,
        }
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

/// Resolve `${ENV_VAR}` references in config strings.
pub fn resolve_env_var(value: &str) -> Option<String> {
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).ok()
    } else if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.defaults.model, "nano-banana");
        assert_eq!(config.defaults.batch_count, 1);
        assert!(!config.retry.auto_retry);
        assert!(config.retry.max_retries.is_none());
        assert!(config.limits.request_timeout_ms.is_none());
        assert_eq!(config.credits.poll_interval_secs, 30);
    }

    #[test]
    fn test_config_to_toml() {
        let config = Config::default();
        let toml = config.to_toml().unwrap();
        assert!(toml.contains("[api]"));
        assert!(toml.contains("[defaults]"));
        assert!(toml.contains("[retry]"));
    }

    #[test]
    fn test_config_roundtrip_through_file() {
        let mut config = Config::default();
        config.api.base_url = "https://api.example.com".to_string();
        config.retry.auto_retry = true;
        config.retry.max_retries = Some(4);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, config.to_toml().unwrap()).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.api.base_url, "https://api.example.com");
        assert!(loaded.retry.auto_retry);
        assert_eq!(loaded.retry.max_retries, Some(4));
    }

    #[test]
    fn test_retry_policy_from_config() {
        let mut config = Config::default();
        config.retry.auto_retry = true;
        config.retry.max_retries = Some(2);

        let policy = config.retry_policy();
        assert!(policy.auto_retry);
        assert_eq!(policy.max_retries, Some(2));
    }

    #[test]
    fn test_resolve_env_var() {
        // Non-env-var strings pass through
        assert_eq!(resolve_env_var("plain-key"), Some("plain-key".to_string()));
        // Empty returns None
        assert_eq!(resolve_env_var(""), None);
        // Unset env var returns None
        assert_eq!(resolve_env_var("${DEFINITELY_NOT_SET_XYZ_123}"), None);
    }
}
