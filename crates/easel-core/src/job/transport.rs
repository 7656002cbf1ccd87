//! Transport seam between the job lifecycle and the remote API.
//!
//! The lifecycle never touches HTTP directly: it submits a wire body through
//! the [`Transport`] trait and receives back a [`TransportResponse`], whose
//! shape (buffered document vs. byte stream) is decided exactly once here at
//! the boundary.

use crate::error::JobError;
use crate::types::{GenerationBody, ServerEvent};
use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::BoxStream;
use futures_util::{StreamExt, TryStreamExt};
use std::time::Duration;

/// Path of the generation endpoint under the configured base URL.
pub const DRAW_ENDPOINT: &str = "/v1/draw/nano-banana";

/// Raw byte-chunk stream of an event-stream response body.
pub type ByteStream = BoxStream<'static, Result<Bytes, JobError>>;

/// Response shape, decided once at the transport boundary.
pub enum TransportResponse {
    /// Fully-buffered structured document (`application/json`).
    Structured(ServerEvent),

    /// Incremental event stream, to be fed through the stream decoder.
    Streamed(ByteStream),
}

/// Capability to submit one generation request.
///
/// Uses `async_trait` because native async fn in trait is not object-safe
/// (the registry holds an `Arc<dyn Transport>` for dynamic dispatch).
#[async_trait]
pub trait Transport: Send + Sync {
    async fn submit(&self, body: &GenerationBody) -> Result<TransportResponse, JobError>;
}

/// HTTP transport for the generation endpoint.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    request_timeout: Option<Duration>,
}

impl HttpTransport {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            request_timeout: None,
        }
    }

    /// Impose a whole-request timeout.
    ///
    /// Off by default: with no timeout a hung connection stalls only its own
    /// job, matching the service's open-ended generation times.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn submit(&self, body: &GenerationBody) -> Result<TransportResponse, JobError> {
        let url = format!("{}{DRAW_ENDPOINT}", self.base_url);

        let mut request = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(body);
        if let Some(timeout) = self.request_timeout {
            request = request.timeout(timeout);
        }

        let resp = request.send().await.map_err(|e| JobError::Transport {
            message: format!("Request failed: {e}"),
            status_code: None,
        })?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(JobError::Transport {
                message: format!("HTTP {status}: {text}"),
                status_code: Some(status.as_u16()),
            });
        }

        let is_json = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.contains("application/json"))
            .unwrap_or(false);

        if is_json {
            let event = resp
                .json::<ServerEvent>()
                .await
                .map_err(|e| JobError::Transport {
                    message: format!("Failed to parse response: {e}"),
                    status_code: None,
                })?;
            Ok(TransportResponse::Structured(event))
        } else {
            let stream = resp
                .bytes_stream()
                .map_err(|e| JobError::Transport {
                    message: format!("Stream read failed: {e}"),
                    status_code: None,
                })
                .boxed();
            Ok(TransportResponse::Streamed(stream))
        }
    }
}
