//! Error types for the Easel generation engine.
//!
//! Errors are organized by concern: configuration, reference-image payload
//! encoding, and per-job terminal failures. Every job failure is
//! retry-eligible and feeds the same backoff machinery.

use thiserror::Error;

/// Top-level error type for Easel operations.
#[derive(Error, Debug)]
pub enum EaselError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Generation job errors
    #[error("Job error: {0}")]
    Job(#[from] JobError),

    /// Reference-image payload errors
    #[error("Encoding error: {0}")]
    Encoding(#[from] EncodingError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// A reference-image payload that could not be accepted.
///
/// Raised per item during upload; one malformed payload never aborts the
/// rest of a batch.
#[derive(Error, Debug)]
pub enum EncodingError {
    /// Payload does not carry the `data:` scheme
    #[error("Payload is not a data URI (missing \"data:\" scheme)")]
    NotDataUri,

    /// Payload has no base64 marker separating header from body
    #[error("Data URI has no \";base64,\" marker")]
    MissingBase64Marker,

    /// The base64 body is not decodable
    #[error("Base64 body failed to decode: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
}

/// Terminal failure of a single generation attempt.
///
/// Every variant feeds the same auto-retry state machine; none is fatal to
/// the process. Malformed individual stream records are not represented
/// here: the decoder drops them with a warning and the stream continues.
#[derive(Error, Debug, Clone)]
pub enum JobError {
    /// Non-2xx HTTP status or a network-level failure
    #[error("Transport error: {message}")]
    Transport {
        message: String,
        status_code: Option<u16>,
    },

    /// The response stream closed without ever producing a terminal event
    #[error("Stream ended without a result")]
    IncompleteStream,

    /// The server reported the generation as failed
    #[error("Generation failed: {message}")]
    ServerFailure { message: String },

    /// The response carried neither a success nor a recognized failure
    #[error("Unknown outcome: {message}")]
    UnknownOutcome { message: String },
}

impl JobError {
    /// Human-readable message for result rendering.
    ///
    /// Server-mapped failure text is passed through as-is; transport errors
    /// surface their raw error text.
    pub fn user_message(&self) -> String {
        match self {
            JobError::Transport { message, .. } => message.clone(),
            JobError::IncompleteStream => "未收到有效结果".to_string(),
            JobError::ServerFailure { message } => message.clone(),
            JobError::UnknownOutcome { message } => message.clone(),
        }
    }
}

/// Convenience type alias for Easel results.
pub type Result<T> = std::result::Result<T, EaselError>;
