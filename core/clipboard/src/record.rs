//! Clipboard records and their storage mapping.
//!
//! Protection state is a tagged variant: a plain record has no salt, nonce
//! or credential hash, and a protected record always has all three.

use serde::{Deserialize, Serialize};

use copybridge_common::{Error, RecordId, Result};
use copybridge_crypto::{encoding, CredentialHash, Nonce, Salt};
use copybridge_store::{NewRecordRow, RecordRow};

/// Ciphertext together with everything needed to reverse it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedPayload {
    pub ciphertext: Vec<u8>,
    pub salt: Salt,
    pub nonce: Nonce,
    pub credential_hash: CredentialHash,
}

/// Payload of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    /// Stored as given.
    Plain(String),
    /// Encrypted under a record password.
    Protected(ProtectedPayload),
}

impl Content {
    pub fn is_protected(&self) -> bool {
        matches!(self, Content::Protected(_))
    }
}

/// A record that has not been handed to a store yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecord {
    pub name: String,
    pub data_type: String,
    pub content: Content,
}

impl NewRecord {
    /// Attach the identifier assigned by the store.
    pub fn with_id(self, id: RecordId) -> Record {
        Record {
            id,
            name: self.name,
            data_type: self.data_type,
            content: self.content,
        }
    }

    pub fn to_row(&self) -> NewRecordRow {
        let fields = RowFields::from_content(&self.content);
        NewRecordRow {
            name: self.name.clone(),
            data_type: self.data_type.clone(),
            data: fields.data,
            is_encrypted: fields.is_encrypted,
            password_hash: fields.password_hash,
            salt: fields.salt,
            nonce: fields.nonce,
        }
    }
}

/// A stored clipboard record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub id: RecordId,
    pub name: String,
    pub data_type: String,
    pub content: Content,
}

impl Record {
    pub fn is_protected(&self) -> bool {
        self.content.is_protected()
    }

    /// Rebuild a record from a stored row.
    ///
    /// # Errors
    /// - `Error::CorruptRecord` if the row mixes plain and protected fields
    /// - `Error::Encoding` if ciphertext, salt or nonce is not valid base64
    ///   or the nonce has the wrong length
    pub fn from_row(row: RecordRow) -> Result<Self> {
        let content = if row.is_encrypted {
            let password_hash = required(&row, "password_hash", row.password_hash.as_deref())?;
            let salt = required(&row, "salt", row.salt.as_deref())?;
            let nonce = required(&row, "nonce", row.nonce.as_deref())?;

            Content::Protected(ProtectedPayload {
                ciphertext: encoding::decode("data", &row.data)?,
                salt: Salt::from_bytes(encoding::decode("salt", salt)?),
                nonce: Nonce::from_slice(&encoding::decode("nonce", nonce)?)?,
                credential_hash: CredentialHash::from_stored(password_hash),
            })
        } else {
            let stray = [&row.password_hash, &row.salt, &row.nonce]
                .iter()
                .any(|field| field.as_deref().is_some_and(|v| !v.is_empty()));
            if stray {
                return Err(Error::CorruptRecord(format!(
                    "Clipboard '{}' is plain but carries encryption metadata",
                    row.name
                )));
            }
            Content::Plain(row.data)
        };

        Ok(Self {
            id: row.id,
            name: row.name,
            data_type: row.data_type,
            content,
        })
    }

    pub fn to_row(&self) -> RecordRow {
        let fields = RowFields::from_content(&self.content);
        RecordRow {
            id: self.id,
            name: self.name.clone(),
            data_type: self.data_type.clone(),
            data: fields.data,
            is_encrypted: fields.is_encrypted,
            password_hash: fields.password_hash,
            salt: fields.salt,
            nonce: fields.nonce,
        }
    }

    /// Caller-facing view as stored: protected data stays base64 ciphertext.
    pub fn to_view(&self) -> ClipboardView {
        let data = match &self.content {
            Content::Plain(text) => text.clone(),
            Content::Protected(payload) => encoding::encode(&payload.ciphertext),
        };
        self.view(data, self.is_protected())
    }

    /// Caller-facing view of decrypted data. The payload it carries is
    /// plaintext, so it reports `is_encrypted: false`.
    pub fn opened_view(&self, plaintext: String) -> ClipboardView {
        self.view(plaintext, false)
    }

    fn view(&self, data: String, is_encrypted: bool) -> ClipboardView {
        ClipboardView {
            id: self.id,
            name: self.name.clone(),
            data_type: self.data_type.clone(),
            data,
            is_encrypted,
        }
    }
}

fn required<'a>(row: &RecordRow, field: &str, value: Option<&'a str>) -> Result<&'a str> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(Error::CorruptRecord(format!(
            "Clipboard '{}' is encrypted but has no {}",
            row.name, field
        ))),
    }
}

struct RowFields {
    data: String,
    is_encrypted: bool,
    password_hash: Option<String>,
    salt: Option<String>,
    nonce: Option<String>,
}

impl RowFields {
    fn from_content(content: &Content) -> Self {
        match content {
            Content::Plain(text) => Self {
                data: text.clone(),
                is_encrypted: false,
                password_hash: None,
                salt: None,
                nonce: None,
            },
            Content::Protected(payload) => Self {
                data: encoding::encode(&payload.ciphertext),
                is_encrypted: true,
                password_hash: Some(payload.credential_hash.as_str().to_string()),
                salt: Some(encoding::encode(payload.salt.as_bytes())),
                nonce: Some(encoding::encode(payload.nonce.as_bytes())),
            },
        }
    }
}

/// Clipboard as returned to callers. Never includes hash, salt or nonce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipboardView {
    pub id: RecordId,
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
    pub data: String,
    pub is_encrypted: bool,
}

/// Caller input for a new clipboard.
#[derive(Debug, Clone, Deserialize)]
pub struct NewClipboard {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
    pub data: String,
    #[serde(default)]
    pub is_encrypted: bool,
}

/// Caller input replacing a clipboard's type and data.
#[derive(Debug, Clone, Deserialize)]
pub struct ClipboardUpdate {
    #[serde(rename = "type")]
    pub data_type: String,
    pub data: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn protected_row() -> RecordRow {
        RecordRow {
            id: RecordId::new(1),
            name: "secret".to_string(),
            data_type: "text/plain".to_string(),
            data: encoding::encode(b"ciphertext-bytes"),
            is_encrypted: true,
            password_hash: Some("$argon2id$v=19$m=256,t=1,p=1$c2FsdA$aGFzaA".to_string()),
            salt: Some(encoding::encode(&[3u8; 16])),
            nonce: Some(encoding::encode(&[4u8; 12])),
        }
    }

    fn plain_row() -> RecordRow {
        RecordRow {
            id: RecordId::new(2),
            name: "notes".to_string(),
            data_type: "text/plain".to_string(),
            data: "hello".to_string(),
            is_encrypted: false,
            password_hash: None,
            salt: None,
            nonce: None,
        }
    }

    #[test]
    fn test_protected_row_roundtrip() {
        let row = protected_row();
        let record = Record::from_row(row.clone()).unwrap();

        assert!(record.is_protected());
        assert_eq!(record.to_row(), row);
    }

    #[test]
    fn test_plain_row_roundtrip() {
        let row = plain_row();
        let record = Record::from_row(row.clone()).unwrap();

        assert_eq!(record.content, Content::Plain("hello".to_string()));
        assert_eq!(record.to_row(), row);
    }

    #[test]
    fn test_plain_row_with_empty_metadata_accepted() {
        let mut row = plain_row();
        row.password_hash = Some(String::new());
        row.salt = Some(String::new());
        row.nonce = Some(String::new());

        assert!(!Record::from_row(row).unwrap().is_protected());
    }

    #[test]
    fn test_plain_row_with_salt_is_corrupt() {
        let mut row = plain_row();
        row.salt = Some(encoding::encode(&[1u8; 16]));

        assert!(matches!(Record::from_row(row), Err(Error::CorruptRecord(_))));
    }

    #[test]
    fn test_protected_row_missing_nonce_is_corrupt() {
        let mut row = protected_row();
        row.nonce = None;

        assert!(matches!(Record::from_row(row), Err(Error::CorruptRecord(_))));
    }

    #[test]
    fn test_protected_row_empty_hash_is_corrupt() {
        let mut row = protected_row();
        row.password_hash = Some(String::new());

        assert!(matches!(Record::from_row(row), Err(Error::CorruptRecord(_))));
    }

    #[test]
    fn test_malformed_ciphertext_is_encoding_error() {
        let mut row = protected_row();
        row.data = "%%%".to_string();

        assert!(matches!(Record::from_row(row), Err(Error::Encoding(_))));
    }

    #[test]
    fn test_short_nonce_is_encoding_error() {
        let mut row = protected_row();
        row.nonce = Some(encoding::encode(&[4u8; 8]));

        assert!(matches!(Record::from_row(row), Err(Error::Encoding(_))));
    }

    #[test]
    fn test_view_hides_metadata() {
        let record = Record::from_row(protected_row()).unwrap();
        let json = serde_json::to_value(record.to_view()).unwrap();

        assert_eq!(json["type"], "text/plain");
        assert_eq!(json["is_encrypted"], true);
        assert!(json.get("salt").is_none());
        assert!(json.get("nonce").is_none());
        assert!(json.get("password_hash").is_none());
    }

    #[test]
    fn test_opened_view_reports_plaintext() {
        let record = Record::from_row(protected_row()).unwrap();
        let view = record.opened_view("hello world".to_string());

        assert_eq!(view.data, "hello world");
        assert!(!view.is_encrypted);
        assert!(record.is_protected());
    }

    #[test]
    fn test_new_clipboard_defaults_to_plain() {
        let input: NewClipboard =
            serde_json::from_str(r#"{"name":"a","type":"text/plain","data":"x"}"#).unwrap();
        assert!(!input.is_encrypted);
    }
}
