//! Base64 framing for salts, nonces and ciphertexts at the storage boundary.

use base64::{engine::general_purpose::STANDARD, Engine as _};

use copybridge_common::{Error, Result};

/// Encode raw bytes as padded standard base64.
pub fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode a base64 field.
///
/// `field` names the column for the error message; the value itself is
/// never echoed back.
pub fn decode(field: &str, value: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(value)
        .map_err(|e| Error::Encoding(format!("Malformed base64 in {}: {}", field, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_known_value() {
        assert_eq!(encode(b"hello"), "aGVsbG8=");
    }

    #[test]
    fn test_decode_known_value() {
        assert_eq!(decode("data", "aGVsbG8=").unwrap(), b"hello");
    }

    #[test]
    fn test_decode_malformed() {
        let err = decode("salt", "not base64!").unwrap_err();

        assert!(matches!(err, Error::Encoding(_)));
        assert!(err.to_string().contains("salt"));
        assert!(!err.to_string().contains("not base64!"));
    }
}
