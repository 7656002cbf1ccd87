//! Content hashing for reference-image deduplication.

use blake3::Hasher as Blake3Hasher;

/// Compute the content fingerprint of an image payload.
///
/// BLAKE3 over the full data-URI string, rendered as 64 lowercase hex
/// characters. Identical payloads always map to the same fingerprint;
/// distinct payloads collide only with cryptographic-hash probability.
pub fn fingerprint(payload: &str) -> String {
    let mut hasher = Blake3Hasher::new();
    hasher.update(payload.as_bytes());
    hasher.finalize().to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_deterministic() {
        let a = fingerprint("data:image/png;base64,AAAA");
        let b = fingerprint("data:image/png;base64,AAAA");
        assert_eq!(a, b);
    }

    #[test]
    fn test_fingerprint_distinguishes_payloads() {
        let a = fingerprint("data:image/png;base64,AAAA");
        let b = fingerprint("data:image/png;base64,AAAB");
        assert_ne!(a, b);
    }

    #[test]
    fn test_fingerprint_is_lowercase_hex() {
        let fp = fingerprint("data:image/jpeg;base64,/9j/4AAQ");
        assert_eq!(fp.len(), 64);
        assert!(fp.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }
}
