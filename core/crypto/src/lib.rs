//! Cryptographic primitives for CopyBridge.
//!
//! This module provides:
//! - Key derivation using scrypt
//! - Authenticated encryption using AES-256-GCM
//! - Password verification hashes using Argon2id
//! - Base64 framing for values crossing the storage boundary
//!
//! # Security Guarantees
//! - Derived keys are zeroized on drop
//! - No password, key or plaintext is ever logged or put in an error
//! - Tag and credential comparisons are constant-time

pub mod kdf;
pub mod aead;
pub mod keys;
pub mod credential;
pub mod encoding;

pub use aead::{decrypt, encrypt, Sealed};
pub use credential::{hash_password, verify_password, CredentialHash, HashCost};
pub use kdf::{derive_key, KdfParams};
pub use keys::{DerivedKey, Nonce, Salt};
