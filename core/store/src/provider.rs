//! Clipboard store trait and the persisted row shape.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use copybridge_common::{RecordId, Result};

/// Persisted fields of a record that has not been stored yet.
///
/// Values are stored as given: `data` is plaintext or base64 ciphertext,
/// `salt` and `nonce` are base64. The store does not interpret them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRecordRow {
    pub name: String,
    pub data_type: String,
    pub data: String,
    pub is_encrypted: bool,
    pub password_hash: Option<String>,
    pub salt: Option<String>,
    pub nonce: Option<String>,
}

impl NewRecordRow {
    /// Attach the identifier assigned by a store.
    pub fn with_id(self, id: RecordId) -> RecordRow {
        RecordRow {
            id,
            name: self.name,
            data_type: self.data_type,
            data: self.data,
            is_encrypted: self.is_encrypted,
            password_hash: self.password_hash,
            salt: self.salt,
            nonce: self.nonce,
        }
    }
}

/// One stored row of the `clipboards` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordRow {
    pub id: RecordId,
    pub name: String,
    pub data_type: String,
    pub data: String,
    pub is_encrypted: bool,
    pub password_hash: Option<String>,
    pub salt: Option<String>,
    pub nonce: Option<String>,
}

/// Coarse store availability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Up,
    Down,
}

/// Health information reported by a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub message: String,
    /// Store-specific statistics.
    #[serde(flatten)]
    pub details: BTreeMap<String, String>,
}

impl HealthReport {
    /// A healthy report with no details.
    pub fn up(message: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Up,
            message: message.into(),
            details: BTreeMap::new(),
        }
    }

    /// An unhealthy report.
    pub fn down(message: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Down,
            message: message.into(),
            details: BTreeMap::new(),
        }
    }

    /// Add a statistic.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.details.insert(key.into(), value.to_string());
        self
    }
}

/// Durable keyed storage of clipboard rows.
///
/// Records are looked up by name; names are unique within a store. Writes
/// after a lookup are keyed by the row identifier. A store
/// handle is created at startup, shared by request handlers, and closed
/// once on shutdown.
#[async_trait]
pub trait ClipboardStore: Send + Sync {
    /// Get the store name (e.g., "memory", "sqlite").
    fn name(&self) -> &str;

    /// Insert a new row.
    ///
    /// # Postconditions
    /// - Returns the row with its newly assigned identifier
    ///
    /// # Errors
    /// - `Error::AlreadyExists` if the name is taken
    /// - `Error::Storage` on backend failure
    async fn insert(&self, row: NewRecordRow) -> Result<RecordRow>;

    /// Get a row by name, or `None` if absent.
    async fn get(&self, name: &str) -> Result<Option<RecordRow>>;

    /// Overwrite every mutable field of the row identified by `row.id`.
    ///
    /// # Errors
    /// - `Error::NotFound` if no row has that identifier
    async fn update(&self, row: &RecordRow) -> Result<()>;

    /// Delete the row with this identifier.
    ///
    /// Keyed by identifier rather than name so that a row recreated under
    /// the same name after it was loaded is never removed by mistake.
    ///
    /// # Returns
    /// Whether a row was removed.
    async fn delete(&self, id: RecordId) -> Result<bool>;

    /// Report store health. Never fails; problems show up as `Down`.
    async fn health(&self) -> HealthReport;

    /// Release backend resources. Later calls fail with `Error::Storage`.
    async fn close(&self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_row_with_id() {
        let row = NewRecordRow {
            name: "notes".to_string(),
            data_type: "text/plain".to_string(),
            data: "hi".to_string(),
            is_encrypted: false,
            password_hash: None,
            salt: None,
            nonce: None,
        }
        .with_id(RecordId::new(3));

        assert_eq!(row.id, RecordId::new(3));
        assert_eq!(row.name, "notes");
    }

    #[test]
    fn test_health_report_serialization() {
        let report = HealthReport::up("It's healthy").with_detail("records", 2);
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["status"], "up");
        assert_eq!(json["message"], "It's healthy");
        assert_eq!(json["records"], "2");
    }
}
