//! Password-based authenticated encryption using AES-256-GCM.
//!
//! The key comes from scrypt over the record salt; each encryption draws a
//! fresh 96-bit nonce. The ciphertext carries the 16-byte tag as a suffix,
//! and salt and nonce travel beside it rather than inside it.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Key, Nonce as GcmNonce,
};

use crate::kdf::{derive_key, KdfParams};
use crate::keys::{DerivedKey, Nonce, Salt};
use copybridge_common::{Error, Result};

/// Authentication tag size (16 bytes).
pub const TAG_SIZE: usize = 16;

/// Output of a password-based encryption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sealed {
    /// Encrypted payload with the tag appended.
    pub ciphertext: Vec<u8>,
    /// Salt the key was derived from.
    pub salt: Salt,
    /// Nonce used for this encryption only.
    pub nonce: Nonce,
}

/// Encrypt plaintext under a password.
///
/// # Preconditions
/// - `existing_salt`, when given, must be the salt already stored for the
///   record being re-encrypted
///
/// # Postconditions
/// - A new salt is generated only when `existing_salt` is `None`
/// - The nonce is always freshly generated
/// - The ciphertext length is plaintext length + TAG_SIZE
///
/// # Errors
/// - `Error::Randomness` if salt or nonce generation fails
/// - `Error::Derivation` if the supplied salt is empty
pub fn encrypt(
    plaintext: &[u8],
    password: &[u8],
    existing_salt: Option<&Salt>,
    params: &KdfParams,
) -> Result<Sealed> {
    let salt = match existing_salt {
        Some(salt) => salt.clone(),
        None => Salt::generate()?,
    };

    let key = derive_key(password, &salt, params)?;
    let nonce = Nonce::generate()?;
    let ciphertext = seal(&key, &nonce, plaintext)?;

    Ok(Sealed {
        ciphertext,
        salt,
        nonce,
    })
}

/// Decrypt ciphertext produced by [`encrypt`].
///
/// # Errors
/// - `Error::Authentication` if the tag does not verify. A wrong password,
///   a flipped ciphertext bit and a tampered salt or nonce all end here and
///   cannot be told apart.
/// - `Error::Derivation` if `salt` is empty
pub fn decrypt(
    ciphertext: &[u8],
    password: &[u8],
    salt: &Salt,
    nonce: &Nonce,
    params: &KdfParams,
) -> Result<Vec<u8>> {
    let key = derive_key(password, salt, params)?;
    open(&key, nonce, ciphertext)
}

/// Encrypt with an explicit key and nonce.
///
/// # Warning
/// Using the same nonce twice with the same key destroys confidentiality.
/// Prefer [`encrypt`], which always draws a new nonce.
pub fn seal(key: &DerivedKey, nonce: &Nonce, plaintext: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()));

    cipher
        .encrypt(GcmNonce::from_slice(nonce.as_bytes()), plaintext)
        .map_err(|_| Error::Crypto("Encryption failed".to_string()))
}

/// Decrypt with an explicit key and nonce, verifying the tag.
pub fn open(key: &DerivedKey, nonce: &Nonce, ciphertext: &[u8]) -> Result<Vec<u8>> {
    if ciphertext.len() < TAG_SIZE {
        return Err(Error::Authentication);
    }

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()));

    cipher
        .decrypt(GcmNonce::from_slice(nonce.as_bytes()), ciphertext)
        .map_err(|_| Error::Authentication)
}
