//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.defaults.batch_count == 0 {
            return Err(ConfigError::ValidationError(
                "defaults.batch_count must be > 0".into(),
            ));
        }
        if self.defaults.aspect_ratio.is_empty() {
            return Err(ConfigError::ValidationError(
                "defaults.aspect_ratio must not be empty".into(),
            ));
        }
        if matches!(self.limits.request_timeout_ms, Some(0)) {
            return Err(ConfigError::ValidationError(
                "limits.request_timeout_ms must be > 0 when set".into(),
            ));
        }
        if self.credits.poll_interval_secs == 0 {
            return Err(ConfigError::ValidationError(
                "credits.poll_interval_secs must be > 0".into(),
            ));
        }
        if !matches!(
            self.logging.level.as_str(),
            "error" | "warn" | "info" | "debug" | "trace"
        ) {
            return Err(ConfigError::ValidationError(format!(
                "logging.level '{}' is not a valid level",
                self.logging.level
            )));
        }
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(ConfigError::ValidationError(format!(
                "logging.format '{}' must be \"pretty\" or \"json\"",
                self.logging.format
            )));
        }
        Ok(())
    }
}
