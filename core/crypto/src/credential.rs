//! Password verification hashes using Argon2id.
//!
//! The credential hash is a PHC string with its own random salt, computed
//! independently of the scrypt key path. Knowing the hash does not help
//! recover the encryption key and vice versa.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::keys::fill_random;
use copybridge_common::{Error, Result};

/// Length of the salt embedded in each credential hash.
pub const CREDENTIAL_SALT_LENGTH: usize = 16;

/// Prefixes of bcrypt modular-crypt strings (`$2a$`, `$2b$`, `$2y$`).
const BCRYPT_PREFIX: &str = "$2";

/// Cost parameters for new credential hashes.
///
/// The cost is encoded into every hash string, so raising it only affects
/// hashes created afterwards; existing hashes keep verifying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashCost {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    /// Number of iterations.
    pub iterations: u32,
    /// Degree of parallelism.
    pub parallelism: u32,
}

impl HashCost {
    /// 19 MiB, 2 iterations, 1 lane. Acceptable latency for interactive
    /// requests; operators may raise it through configuration.
    pub const DEFAULT: Self = Self {
        memory_kib: 19 * 1024,
        iterations: 2,
        parallelism: 1,
    };
}

impl Default for HashCost {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// A stored one-way password hash in PHC string format.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CredentialHash(String);

impl CredentialHash {
    /// Wrap a hash string read back from storage.
    ///
    /// The string is not validated here; a malformed value surfaces as
    /// `Error::CorruptCredential` on verification.
    pub fn from_stored(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for CredentialHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CredentialHash([REDACTED])")
    }
}

/// Hash a password for later verification.
///
/// # Errors
/// - `Error::Randomness` if the hash salt cannot be generated
/// - `Error::Crypto` if `cost` is rejected by Argon2
pub fn hash_password(password: &[u8], cost: &HashCost) -> Result<CredentialHash> {
    let mut salt_bytes = [0u8; CREDENTIAL_SALT_LENGTH];
    fill_random(&mut salt_bytes)?;
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| Error::Crypto(format!("Invalid credential salt: {}", e)))?;

    let params = Params::new(cost.memory_kib, cost.iterations, cost.parallelism, None)
        .map_err(|e| Error::Crypto(format!("Invalid hash cost: {}", e)))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let hash = argon2
        .hash_password(password, &salt)
        .map_err(|e| Error::Crypto(format!("Password hashing failed: {}", e)))?;

    Ok(CredentialHash(hash.to_string()))
}

/// Check a password against a stored hash.
///
/// Comparison of the recomputed output is constant-time.
///
/// # Returns
/// - `Ok(true)` if the password matches
/// - `Ok(false)` if it does not
///
/// # Errors
/// - `Error::CorruptCredential` if the stored hash cannot be parsed, uses
///   unsupported parameters, or is a bcrypt hash, so no verification was
///   attempted
pub fn verify_password(password: &[u8], hash: &CredentialHash) -> Result<bool> {
    if hash.as_str().starts_with(BCRYPT_PREFIX) {
        return Err(Error::CorruptCredential(
            "bcrypt credential hashes are not supported".to_string(),
        ));
    }

    let parsed = PasswordHash::new(hash.as_str())
        .map_err(|e| Error::CorruptCredential(e.to_string()))?;

    match Argon2::default().verify_password(password, &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(Error::CorruptCredential(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn cheap() -> HashCost {
        HashCost {
            memory_kib: 256,
            iterations: 1,
            parallelism: 1,
        }
    }

    #[test]
    fn test_hash_then_verify() {
        let hash = hash_password(b"correct-horse", &cheap()).unwrap();

        assert!(verify_password(b"correct-horse", &hash).unwrap());
        assert!(!verify_password(b"wrong", &hash).unwrap());
    }

    #[test]
    fn test_hash_is_self_salting() {
        let hash1 = hash_password(b"same", &cheap()).unwrap();
        let hash2 = hash_password(b"same", &cheap()).unwrap();

        assert_ne!(hash1, hash2);
        assert!(verify_password(b"same", &hash1).unwrap());
        assert!(verify_password(b"same", &hash2).unwrap());
    }

    #[test]
    fn test_hash_embeds_cost() {
        let hash = hash_password(b"pw", &cheap()).unwrap();

        assert!(hash.as_str().starts_with("$argon2id$"));
        assert!(hash.as_str().contains("m=256,t=1,p=1"));
    }

    #[test]
    fn test_hash_does_not_contain_password() {
        let hash = hash_password(b"correct-horse", &cheap()).unwrap();
        assert!(!hash.as_str().contains("correct-horse"));
    }

    #[test]
    fn test_malformed_hash_is_corrupt() {
        let hash = CredentialHash::from_stored("not-a-phc-string");
        let result = verify_password(b"pw", &hash);

        assert!(matches!(result, Err(Error::CorruptCredential(_))));
    }

    #[test]
    fn test_bcrypt_hash_is_corrupt() {
        let hash = CredentialHash::from_stored(
            "$2a$10$N9qo8uLOickgx2ZMRZoMyeIjZAgcfl7p92ldGxad68LJZdL17lhWy",
        );
        match verify_password(b"pw", &hash) {
            Err(Error::CorruptCredential(message)) => assert!(message.contains("bcrypt")),
            other => panic!("expected CorruptCredential, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_hash_is_corrupt() {
        let result = verify_password(b"pw", &CredentialHash::from_stored(""));
        assert!(matches!(result, Err(Error::CorruptCredential(_))));
    }

    #[test]
    fn test_invalid_cost_rejected() {
        let cost = HashCost {
            memory_kib: 1,
            iterations: 1,
            parallelism: 1,
        };
        assert!(matches!(hash_password(b"pw", &cost), Err(Error::Crypto(_))));
    }

    #[test]
    fn test_debug_redacted() {
        let hash = hash_password(b"pw", &cheap()).unwrap();
        assert_eq!(format!("{:?}", hash), "CredentialHash([REDACTED])");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(8))]

        #[test]
        fn prop_hash_verifies_own_password(
            password in proptest::collection::vec(any::<u8>(), 0..64),
        ) {
            let hash = hash_password(&password, &cheap()).unwrap();
            prop_assert!(verify_password(&password, &hash).unwrap());
        }

        #[test]
        fn prop_hash_rejects_other_password(
            p1 in proptest::collection::vec(any::<u8>(), 0..32),
            p2 in proptest::collection::vec(any::<u8>(), 0..32),
        ) {
            prop_assume!(p1 != p2);
            let hash = hash_password(&p1, &cheap()).unwrap();
            prop_assert!(!verify_password(&p2, &hash).unwrap());
        }
    }
}
