//! Key material and per-record random values.
//!
//! Derived keys zeroize their memory on drop. Salts and nonces are not
//! secret but are typed so they cannot be swapped by accident.

use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use copybridge_common::{Error, Result};

/// Length of encryption keys in bytes (256-bit).
pub const KEY_LENGTH: usize = 32;

/// Length of freshly generated salts in bytes.
pub const SALT_LENGTH: usize = 16;

/// Nonce size for AES-256-GCM (96-bit).
pub const NONCE_SIZE: usize = 12;

/// Fill `buf` from the operating system CSPRNG.
///
/// # Errors
/// - `Error::Randomness` if the entropy source fails. There is no fallback
///   to a weaker generator.
pub fn fill_random(buf: &mut [u8]) -> Result<()> {
    OsRng
        .try_fill_bytes(buf)
        .map_err(|e| Error::Randomness(format!("OS random source failed: {}", e)))
}

/// Symmetric key derived from a record password.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey {
    key: [u8; KEY_LENGTH],
}

impl DerivedKey {
    /// Create a key from raw bytes.
    pub fn from_bytes(key: [u8; KEY_LENGTH]) -> Self {
        Self { key }
    }

    /// Get the key bytes.
    ///
    /// # Security
    /// The returned slice should be used immediately and not stored.
    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.key
    }
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DerivedKey([REDACTED])")
    }
}

/// Salt for key derivation.
///
/// Generated once per record at first encryption and reused on every
/// re-encryption under the same password. Stored salts of any length are
/// accepted on load; emptiness is rejected by the KDF.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Salt(Vec<u8>);

impl Salt {
    /// Generate a random salt of `SALT_LENGTH` bytes.
    pub fn generate() -> Result<Self> {
        let mut salt = vec![0u8; SALT_LENGTH];
        fill_random(&mut salt)?;
        Ok(Self(salt))
    }

    /// Create from bytes.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Get the salt bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Nonce for a single AES-256-GCM encryption.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Nonce([u8; NONCE_SIZE]);

impl Nonce {
    /// Generate a fresh random nonce.
    pub fn generate() -> Result<Self> {
        let mut nonce = [0u8; NONCE_SIZE];
        fill_random(&mut nonce)?;
        Ok(Self(nonce))
    }

    /// Create from a fixed-size array.
    pub fn from_bytes(bytes: [u8; NONCE_SIZE]) -> Self {
        Self(bytes)
    }

    /// Create from a slice read back from storage.
    ///
    /// # Errors
    /// - `Error::Encoding` if the slice is not exactly `NONCE_SIZE` bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let array: [u8; NONCE_SIZE] = bytes.try_into().map_err(|_| {
            Error::Encoding(format!(
                "Invalid nonce length: expected {}, got {}",
                NONCE_SIZE,
                bytes.len()
            ))
        })?;
        Ok(Self(array))
    }

    /// Get the nonce bytes.
    pub fn as_bytes(&self) -> &[u8; NONCE_SIZE] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_salt_generate() {
        let salt1 = Salt::generate().unwrap();
        let salt2 = Salt::generate().unwrap();

        assert_eq!(salt1.as_bytes().len(), SALT_LENGTH);
        assert_ne!(salt1, salt2);
    }

    #[test]
    fn test_nonce_generate() {
        let nonce1 = Nonce::generate().unwrap();
        let nonce2 = Nonce::generate().unwrap();

        assert_ne!(nonce1, nonce2);
    }

    #[test]
    fn test_nonce_from_slice_wrong_length() {
        let result = Nonce::from_slice(&[0u8; 8]);
        assert!(matches!(result, Err(Error::Encoding(_))));

        let nonce = Nonce::from_slice(&[7u8; NONCE_SIZE]).unwrap();
        assert_eq!(nonce.as_bytes(), &[7u8; NONCE_SIZE]);
    }

    #[test]
    fn test_derived_key_debug_redacted() {
        let key = DerivedKey::from_bytes([9u8; KEY_LENGTH]);
        assert_eq!(format!("{:?}", key), "DerivedKey([REDACTED])");
    }
}
