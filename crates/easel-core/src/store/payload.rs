//! Reference-image payloads as base64 data URIs.
//!
//! Images travel to the API inline, as self-describing `data:` URIs. This
//! module builds them from raw bytes and validates user-supplied payloads
//! before they are fingerprinted and stored.

use crate::error::EncodingError;
use base64::Engine;

/// Build a data URI from raw image bytes and a format identifier.
///
/// The format is the file-extension style identifier ("jpeg", "png", ...).
pub fn from_bytes(bytes: &[u8], format: &str) -> String {
    let media_type = match format {
        "jpeg" | "jpg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        other => {
            tracing::warn!("Unknown image format '{other}', defaulting to image/jpeg");
            "image/jpeg"
        }
    };

    format!(
        "data:{media_type};base64,{}",
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

/// Validate that a payload is a well-formed base64 data URI.
///
/// The base64 body must decode; the image bytes themselves stay opaque.
pub fn validate(payload: &str) -> Result<(), EncodingError> {
    if !payload.starts_with("data:") {
        return Err(EncodingError::NotDataUri);
    }
    let Some((_, body)) = payload.split_once(";base64,") else {
        return Err(EncodingError::MissingBase64Marker);
    };
    base64::engine::general_purpose::STANDARD.decode(body)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_bytes_jpeg() {
        let payload = from_bytes(&[0xFF, 0xD8, 0xFF], "jpeg");
        assert!(payload.starts_with("data:image/jpeg;base64,"));
    }

    #[test]
    fn test_from_bytes_png() {
        let payload = from_bytes(&[0x89, 0x50, 0x4E, 0x47], "png");
        assert!(payload.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn test_from_bytes_unknown_format_defaults_to_jpeg() {
        let payload = from_bytes(&[1, 2, 3], "tiff");
        assert!(payload.starts_with("data:image/jpeg;base64,"));
    }

    #[test]
    fn test_from_bytes_roundtrips_through_validate() {
        let payload = from_bytes(&[1, 2, 3, 4, 5], "webp");
        assert!(validate(&payload).is_ok());
    }

    #[test]
    fn test_validate_rejects_non_data_uri() {
        let err = validate("https://example.com/cat.png").unwrap_err();
        assert!(matches!(err, EncodingError::NotDataUri));
    }

    #[test]
    fn test_validate_rejects_missing_base64_marker() {
        let err = validate("data:image/png,rawbytes").unwrap_err();
        assert!(matches!(err, EncodingError::MissingBase64Marker));
    }

    #[test]
    fn test_validate_rejects_undecodable_body() {
        let err = validate("data:image/png;base64,not valid base64!").unwrap_err();
        assert!(matches!(err, EncodingError::InvalidBase64(_)));
    }
}
