//! Request and response types for the generation API.

use serde::{Deserialize, Serialize};

/// Parameters for one generation job chain.
///
/// Built once at submission: the reference-image selection is resolved to
/// payloads here and reused verbatim by every retry within the chain. Once
/// the server assigns a job `id`, it is bound into this struct and echoed on
/// all follow-up calls for the same logical job.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Model identifier (e.g. "nano-banana")
    pub model: String,

    /// Prompt text
    pub prompt: String,

    /// Aspect ratio (e.g. "1:1", "16:9")
    pub aspect_ratio: String,

    /// Output size (e.g. "auto", "2k")
    pub image_size: String,

    /// Resolved reference-image payloads, in selection order
    pub reference_images: Vec<String>,

    /// Server-assigned job id, bound after the first response carrying one
    pub id: Option<String>,
}

impl GenerationRequest {
    /// Build the wire body for the next attempt from the current bindings.
    pub fn to_body(&self) -> GenerationBody {
        GenerationBody {
            model: self.model.clone(),
            prompt: self.prompt.clone(),
            aspect_ratio: self.aspect_ratio.clone(),
            image_size: self.image_size.clone(),
            urls: if self.reference_images.is_empty() {
                None
            } else {
                Some(self.reference_images.clone())
            },
            id: self.id.clone(),
        }
    }
}

/// JSON body for `POST {base}/v1/draw/nano-banana`.
///
/// `urls` is omitted entirely when no reference images are attached; the
/// remote API distinguishes a missing field from an empty list. `id` appears
/// only on retries and reruns after the server has assigned one.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationBody {
    pub model: String,
    pub prompt: String,
    pub aspect_ratio: String,
    pub image_size: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub urls: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// One decoded server record, from either a single JSON document or a
/// single event-stream line.
///
/// Fields are independently optional and may co-occur: a record carrying
/// both an `id` and a `progress` update is valid and both facets apply.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerEvent {
    /// Server-assigned job id
    pub id: Option<String>,

    /// Progress percentage as reported; may move backwards
    pub progress: Option<f64>,

    /// Terminal status ("succeeded" or "failed") once the job ends
    pub status: Option<String>,

    /// Generated outputs, present on success
    #[serde(default)]
    pub results: Vec<GeneratedImage>,

    /// Machine-readable failure code (e.g. "output_moderation")
    pub failure_reason: Option<String>,

    /// Free-text error detail, or a top-level error with no status
    pub error: Option<String>,
}

/// A single generated output reference.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedImage {
    pub url: String,
}

impl ServerEvent {
    /// True when this record ends the attempt, either with an explicit
    /// terminal status or a top-level error.
    pub fn is_terminal(&self) -> bool {
        matches!(self.status.as_deref(), Some("succeeded") | Some("failed"))
            || self.error.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> GenerationRequest {
        GenerationRequest {
            model: "nano-banana".to_string(),
            prompt: "a cat".to_string(),
            aspect_ratio: "1:1".to_string(),
            image_size: "auto".to_string(),
            reference_images: vec![],
            id: None,
        }
    }

    #[test]
    fn test_body_omits_urls_when_no_images() {
        let body = request().to_body();
        let json = serde_json::to_string(&body).unwrap();
        assert!(!json.contains("urls"));
        assert!(!json.contains("\"id\""));
    }

    #[test]
    fn test_body_uses_camel_case_field_names() {
        let body = request().to_body();
        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains("\"aspectRatio\":\"1:1\""));
        assert!(json.contains("\"imageSize\":\"auto\""));
    }

    #[test]
    fn test_body_carries_urls_and_bound_id() {
        let mut req = request();
        req.reference_images = vec!["data:image/png;base64,AAAA".to_string()];
        req.id = Some("job-42".to_string());
        let json = serde_json::to_string(&req.to_body()).unwrap();
        assert!(json.contains("\"urls\":[\"data:image/png;base64,AAAA\"]"));
        assert!(json.contains("\"id\":\"job-42\""));
    }

    #[test]
    fn test_server_event_co_occurring_facets() {
        let event: ServerEvent = serde_json::from_str(r#"{"id":"j1","progress":40}"#).unwrap();
        assert_eq!(event.id.as_deref(), Some("j1"));
        assert_eq!(event.progress, Some(40.0));
        assert!(!event.is_terminal());
    }

    #[test]
    fn test_server_event_terminal_on_status() {
        let ok: ServerEvent =
            serde_json::from_str(r#"{"status":"succeeded","results":[{"url":"https://x/1.png"}]}"#)
                .unwrap();
        assert!(ok.is_terminal());
        assert_eq!(ok.results[0].url, "https://x/1.png");

        let failed: ServerEvent = serde_json::from_str(r#"{"status":"failed"}"#).unwrap();
        assert!(failed.is_terminal());
    }

    #[test]
    fn test_server_event_terminal_on_bare_error() {
        let event: ServerEvent = serde_json::from_str(r#"{"error":"quota exceeded"}"#).unwrap();
        assert!(event.is_terminal());
        assert!(event.status.is_none());
    }

    #[test]
    fn test_server_event_running_status_not_terminal() {
        let event: ServerEvent = serde_json::from_str(r#"{"status":"running"}"#).unwrap();
        assert!(!event.is_terminal());
    }
}
