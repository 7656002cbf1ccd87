//! Deduplicating store for user-supplied reference images.
//!
//! Uploaded images are keyed by content fingerprint so the same bytes are
//! held once per session no matter how often the user attaches them. The
//! user's current selection is an ordered, duplicate-preserving list of
//! fingerprints resolved to payloads at submission time.

pub mod hash;
pub mod payload;

pub use hash::fingerprint;

use crate::error::EncodingError;
use std::collections::HashMap;

/// Content fingerprint of a stored payload (64 lowercase hex characters).
pub type Fingerprint = String;

/// Deduplicating image store plus the user's current selection.
///
/// A fingerprint maps to exactly one payload for the lifetime of the
/// session. Re-adding a known payload is a no-op on the store and only
/// appends to the selection, so duplicates within a selection stay
/// positional.
#[derive(Debug, Default)]
pub struct ImageStore {
    images: HashMap<Fingerprint, String>,
    selection: Vec<Fingerprint>,
}

impl ImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and fingerprint a payload, store it if unseen, and append
    /// its fingerprint to the current selection.
    ///
    /// Returns the fingerprint so callers can key thumbnails or logs by it.
    pub fn add(&mut self, payload: &str) -> Result<Fingerprint, EncodingError> {
        payload::validate(payload)?;
        let fp = hash::fingerprint(payload);

        if self.images.contains_key(&fp) {
            tracing::debug!("Image already stored with fingerprint {}", &fp[..8]);
        } else {
            tracing::debug!("Stored new image with fingerprint {}", &fp[..8]);
            self.images.insert(fp.clone(), payload.to_string());
        }

        self.selection.push(fp.clone());
        Ok(fp)
    }

    /// Clear the current selection.
    ///
    /// Stored images survive for reuse within the session; only the set of
    /// images attached to the next submission is emptied.
    pub fn reset_selection(&mut self) {
        self.selection.clear();
    }

    /// Fingerprints currently selected, in attachment order.
    pub fn selection(&self) -> &[Fingerprint] {
        &self.selection
    }

    /// Number of distinct images stored this session.
    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Resolve the selection to payloads, in order.
    ///
    /// Returns `None` when nothing is selected so the request field can be
    /// omitted instead of sent as an empty list.
    pub fn resolve_selection(&self) -> Option<Vec<String>> {
        if self.selection.is_empty() {
            return None;
        }
        Some(
            self.selection
                .iter()
                .filter_map(|fp| self.images.get(fp).cloned())
                .collect(),
        )
    }
}
