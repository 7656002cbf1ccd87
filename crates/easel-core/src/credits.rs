//! Account balance client for the credits endpoint.
//!
//! The balance display is a collaborator of the generation engine, not part
//! of the job lifecycle: it polls on a fixed interval, failures are logged
//! and polling continues.

use crate::error::JobError;
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::watch;

/// Envelope returned by `GET {base}/client/common/getCredits`.
#[derive(Debug, Deserialize)]
struct CreditsEnvelope {
    code: i64,
    data: Option<CreditsData>,
}

#[derive(Debug, Deserialize)]
struct CreditsData {
    credits: f64,
}

/// Extract the balance from a response envelope.
///
/// Only `code == 0` with a populated `data` block carries a balance.
fn balance(envelope: CreditsEnvelope) -> Result<f64, JobError> {
    match envelope {
        CreditsEnvelope {
            code: 0,
            data: Some(data),
        } => Ok(data.credits),
        CreditsEnvelope { code, .. } => Err(JobError::UnknownOutcome {
            message: format!("Credits endpoint returned code {code}"),
        }),
    }
}

/// Client for the credits endpoint.
pub struct CreditsClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl CreditsClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Fetch the current balance once.
    pub async fn fetch(&self) -> Result<f64, JobError> {
        let url = format!(
            "{}/client/common/getCredits?apikey={}",
            self.base_url, self.api_key
        );

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| JobError::Transport {
                message: format!("Credits request failed: {e}"),
                status_code: None,
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(JobError::Transport {
                message: format!("Credits HTTP {status}"),
                status_code: Some(status.as_u16()),
            });
        }

        let envelope: CreditsEnvelope =
            resp.json().await.map_err(|e| JobError::Transport {
                message: format!("Failed to parse credits response: {e}"),
                status_code: None,
            })?;

        balance(envelope)
    }

    /// Spawn a fixed-interval poller publishing the latest known balance.
    ///
    /// Fetch failures are logged at warn level and polling continues. The
    /// task stops once every receiver is dropped.
    pub fn spawn_poller(
        self,
        interval: Duration,
    ) -> (watch::Receiver<Option<f64>>, tokio::task::JoinHandle<()>) {
        let (tx, rx) = watch::channel(None);
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                match self.fetch().await {
                    Ok(credits) => {
                        if tx.send(Some(credits)).is_err() {
                            break;
                        }
                    }
                    Err(e) => tracing::warn!(error = %e, "Failed to fetch credits"),
                }
            }
        });
        (rx, task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balance_from_valid_envelope() {
        let envelope: CreditsEnvelope =
            serde_json::from_str(r#"{"code":0,"data":{"credits":41.5}}"#).unwrap();
        assert_eq!(balance(envelope).unwrap(), 41.5);
    }

    #[test]
    fn test_balance_rejects_nonzero_code() {
        let envelope: CreditsEnvelope =
            serde_json::from_str(r#"{"code":401,"data":{"credits":10}}"#).unwrap();
        let err = balance(envelope).unwrap_err();
        assert!(err.to_string().contains("401"), "got: {err}");
    }

    #[test]
    fn test_balance_rejects_missing_data() {
        let envelope: CreditsEnvelope = serde_json::from_str(r#"{"code":0}"#).unwrap();
        assert!(balance(envelope).is_err());
    }

    #[test]
    fn test_client_strips_trailing_slash() {
        let client = CreditsClient::new("https://api.example.com/", "key");
        assert_eq!(client.base_url, "https://api.example.com");
    }
}
