//! Protection transitions between plain and protected content.
//!
//! Every method takes the current content by reference and returns the
//! next state, so a failed check leaves the caller's record untouched.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::record::{Content, ProtectedPayload};
use copybridge_common::{Error, Password, Result};
use copybridge_crypto::{decrypt, encrypt, hash_password, verify_password, HashCost, KdfParams};

/// Key-derivation and credential-hash parameters used for every record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CipherSuite {
    pub kdf: KdfParams,
    pub credential_cost: HashCost,
}

impl CipherSuite {
    pub fn new(kdf: KdfParams, credential_cost: HashCost) -> Self {
        Self {
            kdf,
            credential_cost,
        }
    }

    /// Plain → Protected.
    ///
    /// Hashes the password once and encrypts under a freshly generated salt.
    pub fn protect(&self, plaintext: &str, password: &Password) -> Result<Content> {
        let credential_hash = hash_password(password.as_bytes(), &self.credential_cost)?;
        let sealed = encrypt(plaintext.as_bytes(), password.as_bytes(), None, &self.kdf)?;

        debug!(size = plaintext.len(), "Content protected");
        Ok(Content::Protected(ProtectedPayload {
            ciphertext: sealed.ciphertext,
            salt: sealed.salt,
            nonce: sealed.nonce,
            credential_hash,
        }))
    }

    /// Check the password against protected content. Plain content needs
    /// no password and always passes.
    ///
    /// # Errors
    /// - `Error::Authentication` on a wrong password
    /// - `Error::CorruptCredential` if the stored hash is unusable
    pub fn authenticate(&self, content: &Content, password: Option<&Password>) -> Result<()> {
        match content {
            Content::Plain(_) => Ok(()),
            Content::Protected(payload) => {
                let password = password.ok_or(Error::Authentication)?;
                if verify_password(password.as_bytes(), &payload.credential_hash)? {
                    Ok(())
                } else {
                    Err(Error::Authentication)
                }
            }
        }
    }

    /// Recover the plaintext.
    ///
    /// For protected content the password is verified before any decrypt is
    /// attempted.
    pub fn open(&self, content: &Content, password: Option<&Password>) -> Result<String> {
        self.authenticate(content, password)?;

        match content {
            Content::Plain(text) => Ok(text.clone()),
            Content::Protected(payload) => {
                let password = password.ok_or(Error::Authentication)?;
                let plaintext = decrypt(
                    &payload.ciphertext,
                    password.as_bytes(),
                    &payload.salt,
                    &payload.nonce,
                    &self.kdf,
                )?;
                String::from_utf8(plaintext)
                    .map_err(|_| Error::Encoding("Decrypted data is not valid UTF-8".to_string()))
            }
        }
    }

    /// Replace the payload while keeping the protection state.
    ///
    /// Protected content is re-encrypted with the existing salt and a new
    /// nonce after the password verifies; the credential hash is kept.
    pub fn reseal(
        &self,
        content: &Content,
        plaintext: &str,
        password: Option<&Password>,
    ) -> Result<Content> {
        self.authenticate(content, password)?;

        match content {
            Content::Plain(_) => Ok(Content::Plain(plaintext.to_string())),
            Content::Protected(payload) => {
                let password = password.ok_or(Error::Authentication)?;
                let sealed = encrypt(
                    plaintext.as_bytes(),
                    password.as_bytes(),
                    Some(&payload.salt),
                    &self.kdf,
                )?;

                debug!(size = plaintext.len(), "Content resealed");
                Ok(Content::Protected(ProtectedPayload {
                    ciphertext: sealed.ciphertext,
                    salt: sealed.salt,
                    nonce: sealed.nonce,
                    credential_hash: payload.credential_hash.clone(),
                }))
            }
        }
    }
}
