//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};

/// Remote API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the generation service (trailing slash tolerated)
    pub base_url: String,

    /// Bearer token; supports `${ENV_VAR}` indirection
    pub api_key: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: "${EASEL_API_KEY}".to_string(),
        }
    }
}

/// Default request parameters for new jobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Model identifier sent with each request
    pub model: String,

    /// Aspect ratio (e.g. "1:1", "16:9")
    pub aspect_ratio: String,

    /// Output size (e.g. "auto", "2k")
    pub image_size: String,

    /// Jobs submitted per generate action
    pub batch_count: u32,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            model: "nano-banana".to_string(),
            aspect_ratio: "1:1".to_string(),
            image_size: "auto".to_string(),
            batch_count: 1,
        }
    }
}

/// Retry behavior after failed attempts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Start a countdown automatically after each failure
    pub auto_retry: bool,

    /// Cap on automatic retries; absent means retry until cancelled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,
}

/// Resource limits for remote calls.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Whole-request timeout in milliseconds. Absent means no timeout: a
    /// hung connection stalls only its own job.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_ms: Option<u64>,
}

/// Credits display settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CreditsConfig {
    /// Poll interval in seconds for the balance display
    pub poll_interval_secs: u64,
}

impl Default for CreditsConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 30,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level ("error", "warn", "info", "debug", "trace")
    pub level: String,

    /// Output format ("pretty" or "json")
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
