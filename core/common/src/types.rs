//! Common types used throughout CopyBridge.

use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Store-assigned identifier of a clipboard record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(i64);

impl RecordId {
    /// Wrap a raw identifier handed out by a store.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the raw value.
    pub fn get(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A password supplied by a caller for a single request.
///
/// The bytes are zeroized when the value is dropped, and `Debug` never
/// prints them. Callers should create one per request and let it go out of
/// scope as soon as the cryptographic work is done.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Password(Vec<u8>);

impl Password {
    /// Take ownership of raw password bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Get a reference to the inner bytes.
    ///
    /// # Security
    /// The returned slice should be used immediately and not stored.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Get the length.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for Password {
    fn from(value: String) -> Self {
        Self(value.into_bytes())
    }
}

impl From<&str> for Password {
    fn from(value: &str) -> Self {
        Self(value.as_bytes().to_vec())
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Password([REDACTED])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_record_id_display() {
        assert_eq!(RecordId::new(42).to_string(), "42");
    }

    #[test]
    fn test_record_id_serializes_as_number() {
        let json = serde_json::to_string(&RecordId::new(7)).unwrap();
        assert_eq!(json, "7");
    }

    #[test]
    fn test_password_debug_redacted() {
        let password = Password::from("correct-horse");
        let rendered = format!("{:?}", password);
        assert!(!rendered.contains("correct-horse"));
        assert!(rendered.contains("REDACTED"));
    }

    proptest! {
        #[test]
        fn prop_password_keeps_bytes(s in ".*") {
            let password = Password::from(s.clone());
            prop_assert_eq!(password.as_bytes(), s.as_bytes());
            prop_assert_eq!(password.len(), s.len());
        }
    }
}
