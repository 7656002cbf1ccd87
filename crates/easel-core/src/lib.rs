//! Easel Core - Engine for remote image-generation jobs.
//!
//! Easel drives long-running generation calls against a remote drawing API
//! and renders their outcomes incrementally. The core of the library is the
//! per-job lifecycle: submit a request, consume either a single JSON
//! response or an incremental event stream, classify the terminal outcome,
//! and on failure run an observable exponential-backoff auto-retry machine
//! the user can cancel or override. A deduplicating store fingerprints
//! user-supplied reference images before they are attached to a request.
//!
//! # Architecture
//!
//! ```text
//! ImageStore ──resolve──▶ GenerationRequest ──▶ JobRegistry ──▶ JobLifecycle
//!                                                                  │
//!                                    Transport ◀── submit ─────────┤
//!                                        │                         │
//!                        Structured / Streamed ──▶ StreamDecoder ──▶ JobEvent
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use easel_core::{GenerationRequest, HttpTransport, JobEvent, JobRegistry, RetryPolicy};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let transport = Arc::new(HttpTransport::new("https://api.example.com", "sk-key"));
//!     let mut registry = JobRegistry::new(transport);
//!
//!     let params = GenerationRequest {
//!         model: "nano-banana".into(),
//!         prompt: "a cat in a spacesuit".into(),
//!         aspect_ratio: "1:1".into(),
//!         image_size: "auto".into(),
//!         reference_images: vec![],
//!         id: None,
//!     };
//!     let (_id, mut events) = registry.spawn(params, RetryPolicy::default());
//!     while let Some(event) = events.recv().await {
//!         if let JobEvent::Succeeded { url, .. } = event {
//!             println!("{url}");
//!             break;
//!         }
//!     }
//! }
//! ```

// Module declarations
pub mod config;
pub mod credits;
pub mod error;
pub mod job;
pub mod store;
pub mod stream;
pub mod types;

// Re-exports for convenient access
pub use config::Config;
pub use credits::CreditsClient;
pub use error::{ConfigError, EaselError, EncodingError, JobError, Result};
pub use job::{
    HttpTransport, JobCommand, JobEvent, JobHandle, JobId, JobRegistry, Phase, RetryPolicy,
    Transport, TransportResponse,
};
pub use store::{Fingerprint, ImageStore};
pub use stream::StreamDecoder;
pub use types::{GeneratedImage, GenerationBody, GenerationRequest, ServerEvent};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
