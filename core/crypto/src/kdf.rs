//! Key derivation using scrypt.
//!
//! scrypt is memory-hard, so brute-forcing a stolen salt and ciphertext
//! costs the attacker both time and RAM per guess.

use serde::{Deserialize, Serialize};

use crate::keys::{DerivedKey, Salt, KEY_LENGTH};
use copybridge_common::{Error, Result};

/// Parameters for scrypt key derivation.
///
/// Records do not persist these, so changing them makes every existing
/// protected record undecryptable. Production code uses the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfParams {
    /// Work factor as a power of two (N = 2^log_n).
    pub log_n: u8,
    /// Block size.
    pub r: u32,
    /// Degree of parallelism.
    pub p: u32,
}

impl KdfParams {
    /// N = 32768, r = 8, p = 1: roughly 32 MiB and ~100 ms per derivation.
    pub const INTERACTIVE: Self = Self {
        log_n: 15,
        r: 8,
        p: 1,
    };

    /// Create custom parameters.
    pub fn new(log_n: u8, r: u32, p: u32) -> Self {
        Self { log_n, r, p }
    }

    /// Parameters suitable for interactive use.
    pub fn interactive() -> Self {
        Self::INTERACTIVE
    }
}

impl Default for KdfParams {
    fn default() -> Self {
        Self::interactive()
    }
}

/// Derive a symmetric key from a password and salt using scrypt.
///
/// # Preconditions
/// - `salt` must not be empty
/// - `params` must be valid scrypt parameters
///
/// # Postconditions
/// - Returns a DerivedKey of KEY_LENGTH bytes
/// - The derived key is deterministic given the same inputs
///
/// # Errors
/// - `Error::Derivation` if the salt is empty or the parameters are invalid
///
/// # Security
/// - Password is not stored or logged
pub fn derive_key(password: &[u8], salt: &Salt, params: &KdfParams) -> Result<DerivedKey> {
    if salt.is_empty() {
        return Err(Error::Derivation("Salt cannot be empty".to_string()));
    }

    let scrypt_params = scrypt::Params::new(params.log_n, params.r, params.p, KEY_LENGTH)
        .map_err(|e| Error::Derivation(format!("Invalid KDF parameters: {}", e)))?;

    let mut key_bytes = [0u8; KEY_LENGTH];
    scrypt::scrypt(password, salt.as_bytes(), &scrypt_params, &mut key_bytes)
        .map_err(|e| Error::Derivation(format!("Key derivation failed: {}", e)))?;

    Ok(DerivedKey::from_bytes(key_bytes))
}
