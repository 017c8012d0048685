//! Common error types for CopyBridge.
//!
//! Messages carried by these variants never contain secret material:
//! no password, derived key or plaintext is ever formatted into them.

use thiserror::Error;

/// Top-level error type for CopyBridge operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The entropy source could not produce random bytes.
    #[error("Randomness failure: {0}")]
    Randomness(String),

    /// Key derivation was called with invalid parameters.
    #[error("Key derivation failure: {0}")]
    Derivation(String),

    /// Credential check or tag verification failed.
    ///
    /// Deliberately carries no detail so a wrong password cannot be told
    /// apart from a corrupted ciphertext.
    #[error("unauthorized")]
    Authentication,

    /// Malformed base64 or byte framing at the storage/transport boundary.
    #[error("Encoding failure: {0}")]
    Encoding(String),

    /// The stored credential hash could not be parsed, so verification
    /// could not be attempted.
    #[error("Corrupt credential hash: {0}")]
    CorruptCredential(String),

    /// A stored row violates the record invariants.
    #[error("Corrupt record: {0}")]
    CorruptRecord(String),

    /// Any other cryptographic operation failed.
    #[error("Cryptographic error: {0}")]
    Crypto(String),

    /// Storage operation failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Resource already exists.
    #[error("Already exists: {0}")]
    AlreadyExists(String),
}

/// Result type alias using the common Error.
pub type Result<T> = std::result::Result<T, Error>;
