//! Clipboard operations over an explicitly owned store handle.

use std::sync::Arc;
use tracing::{debug, info};

use crate::record::{ClipboardUpdate, ClipboardView, Content, NewClipboard, NewRecord, Record};
use crate::suite::CipherSuite;
use copybridge_common::{Error, Password, Result};
use copybridge_store::{ClipboardStore, HealthReport};

/// Clipboard operations handler.
///
/// Holds no per-request state. Key derivation and hashing run on the
/// blocking pool so slow scrypt/Argon2 calls never stall the async workers.
#[derive(Clone)]
pub struct ClipboardService {
    store: Arc<dyn ClipboardStore>,
    suite: CipherSuite,
}

impl ClipboardService {
    pub fn new(store: Arc<dyn ClipboardStore>, suite: CipherSuite) -> Self {
        Self { store, suite }
    }

    pub fn store(&self) -> &Arc<dyn ClipboardStore> {
        &self.store
    }

    pub fn suite(&self) -> &CipherSuite {
        &self.suite
    }

    /// Fetch a clipboard, decrypting it when protected.
    ///
    /// # Errors
    /// - `Error::NotFound` if no clipboard has this name
    /// - `Error::Authentication` if protected and the password is missing
    ///   or wrong, or the ciphertext fails to verify
    pub async fn get(&self, name: &str, password: Option<Password>) -> Result<ClipboardView> {
        debug!(name = %name, "Reading clipboard");
        let record = self.load(name).await?;

        if !record.is_protected() {
            return Ok(record.to_view());
        }

        let suite = self.suite;
        let view = run_blocking(move || {
            let data = suite.open(&record.content, password.as_ref())?;
            Ok(record.opened_view(data))
        })
        .await?;

        debug!(name = %name, "Protected clipboard opened");
        Ok(view)
    }

    /// Create a clipboard, protecting it when `is_encrypted` is set.
    ///
    /// # Errors
    /// - `Error::InvalidInput` if the name is empty
    /// - `Error::AlreadyExists` if the name is taken
    /// - `Error::Authentication` if protection is requested without a password
    pub async fn create(
        &self,
        input: NewClipboard,
        password: Option<Password>,
    ) -> Result<ClipboardView> {
        if input.name.is_empty() {
            return Err(Error::InvalidInput("Clipboard name cannot be empty".to_string()));
        }

        if self.store.get(&input.name).await?.is_some() {
            return Err(Error::AlreadyExists(format!("Clipboard '{}'", input.name)));
        }

        let content = if input.is_encrypted {
            let password = password.ok_or(Error::Authentication)?;
            let suite = self.suite;
            let data = input.data;
            run_blocking(move || suite.protect(&data, &password)).await?
        } else {
            Content::Plain(input.data)
        };

        let record = NewRecord {
            name: input.name,
            data_type: input.data_type,
            content,
        };
        let row = self.store.insert(record.to_row()).await?;
        let record = record.with_id(row.id);

        info!(
            name = %record.name,
            id = %record.id,
            protected = record.is_protected(),
            "Clipboard created"
        );
        Ok(record.to_view())
    }

    /// Replace a clipboard's type and data.
    ///
    /// A protected clipboard is re-encrypted under the same password and
    /// salt; a plain one stays plain.
    ///
    /// # Errors
    /// - `Error::NotFound` if no clipboard has this name
    /// - `Error::Authentication` if protected and the password is missing
    ///   or wrong; the stored record is left unchanged
    pub async fn update(
        &self,
        name: &str,
        changes: ClipboardUpdate,
        password: Option<Password>,
    ) -> Result<ClipboardView> {
        let record = self.load(name).await?;

        let content = match &record.content {
            Content::Plain(_) => Content::Plain(changes.data),
            Content::Protected(_) => {
                let suite = self.suite;
                let current = record.content.clone();
                let data = changes.data;
                run_blocking(move || suite.reseal(&current, &data, password.as_ref())).await?
            }
        };

        let updated = Record {
            data_type: changes.data_type,
            content,
            ..record
        };
        self.store.update(&updated.to_row()).await?;

        info!(name = %updated.name, protected = updated.is_protected(), "Clipboard updated");
        Ok(updated.to_view())
    }

    /// Delete a clipboard, verifying the password first when protected.
    pub async fn delete(&self, name: &str, password: Option<Password>) -> Result<()> {
        let record = self.load(name).await?;

        if record.is_protected() {
            let suite = self.suite;
            let content = record.content.clone();
            run_blocking(move || suite.authenticate(&content, password.as_ref())).await?;
        }

        if !self.store.delete(record.id).await? {
            return Err(Error::NotFound(format!("Clipboard '{}'", name)));
        }

        info!(name = %name, id = %record.id, "Clipboard deleted");
        Ok(())
    }

    pub async fn health(&self) -> HealthReport {
        self.store.health().await
    }

    async fn load(&self, name: &str) -> Result<Record> {
        let row = self
            .store
            .get(name)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Clipboard '{}'", name)))?;
        Record::from_row(row)
    }
}

/// Run CPU-bound crypto work on the blocking pool.
async fn run_blocking<T, F>(f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| Error::Crypto(format!("Crypto task failed: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use copybridge_common::RecordId;
    use copybridge_crypto::{HashCost, KdfParams};
    use copybridge_store::{MemoryStore, NewRecordRow, RecordRow};

    fn suite() -> CipherSuite {
        CipherSuite::new(
            KdfParams::new(10, 8, 1),
            HashCost {
                memory_kib: 256,
                iterations: 1,
                parallelism: 1,
            },
        )
    }

    fn service() -> ClipboardService {
        ClipboardService::new(Arc::new(MemoryStore::new()), suite())
    }

    /// Serves an outdated copy of one row on `get`, as a concurrent
    /// delete-and-recreate would look between load and delete.
    struct StaleReads {
        inner: Arc<MemoryStore>,
        stale: RecordRow,
    }

    #[async_trait]
    impl ClipboardStore for StaleReads {
        fn name(&self) -> &str {
            "stale"
        }

        async fn insert(&self, row: NewRecordRow) -> Result<RecordRow> {
            self.inner.insert(row).await
        }

        async fn get(&self, name: &str) -> Result<Option<RecordRow>> {
            if name == self.stale.name {
                return Ok(Some(self.stale.clone()));
            }
            self.inner.get(name).await
        }

        async fn update(&self, row: &RecordRow) -> Result<()> {
            self.inner.update(row).await
        }

        async fn delete(&self, id: RecordId) -> Result<bool> {
            self.inner.delete(id).await
        }

        async fn health(&self) -> HealthReport {
            self.inner.health().await
        }

        async fn close(&self) -> Result<()> {
            self.inner.close().await
        }
    }

    fn input(name: &str, data: &str, is_encrypted: bool) -> NewClipboard {
        NewClipboard {
            name: name.to_string(),
            data_type: "text/plain".to_string(),
            data: data.to_string(),
            is_encrypted,
        }
    }

    fn pw(s: &str) -> Option<Password> {
        Some(Password::from(s))
    }

    #[tokio::test]
    async fn test_plain_create_get() {
        let service = service();

        let created = service.create(input("a", "hello", false), None).await.unwrap();
        let fetched = service.get("a", None).await.unwrap();

        assert_eq!(created, fetched);
        assert_eq!(fetched.data, "hello");
        assert!(!fetched.is_encrypted);
    }

    #[tokio::test]
    async fn test_protected_scenario() {
        let service = service();

        let created = service
            .create(input("s", "hello world", true), pw("correct-horse"))
            .await
            .unwrap();
        assert!(created.is_encrypted);
        assert_ne!(created.data, "hello world");

        let c1 = service.store().get("s").await.unwrap().unwrap();

        let opened = service.get("s", pw("correct-horse")).await.unwrap();
        assert_eq!(opened.data, "hello world");
        assert!(!opened.is_encrypted);

        let wrong = service.get("s", pw("wrong")).await;
        assert!(matches!(wrong, Err(Error::Authentication)));

        let changes = ClipboardUpdate {
            data_type: "text/plain".to_string(),
            data: "hello world v2".to_string(),
        };
        service.update("s", changes, pw("correct-horse")).await.unwrap();

        let c2 = service.store().get("s").await.unwrap().unwrap();
        assert_eq!(c1.salt, c2.salt);
        assert_eq!(c1.password_hash, c2.password_hash);
        assert_ne!(c1.nonce, c2.nonce);
        assert_ne!(c1.data, c2.data);

        let reopened = service.get("s", pw("correct-horse")).await.unwrap();
        assert_eq!(reopened.data, "hello world v2");
    }

    #[tokio::test]
    async fn test_protected_create_requires_password() {
        let service = service();
        let result = service.create(input("s", "x", true), None).await;

        assert!(matches!(result, Err(Error::Authentication)));
        assert!(service.store().get("s").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_create() {
        let service = service();
        service.create(input("a", "1", false), None).await.unwrap();

        let result = service.create(input("a", "2", false), None).await;
        assert!(matches!(result, Err(Error::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_empty_name_rejected() {
        let result = service().create(input("", "x", false), None).await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_failed_update_leaves_record_unchanged() {
        let service = service();
        service
            .create(input("s", "original", true), pw("pw"))
            .await
            .unwrap();
        let before = service.store().get("s").await.unwrap().unwrap();

        let changes = ClipboardUpdate {
            data_type: "application/json".to_string(),
            data: "tampered".to_string(),
        };
        let result = service.update("s", changes, pw("nope")).await;
        assert!(matches!(result, Err(Error::Authentication)));

        let after = service.store().get("s").await.unwrap().unwrap();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_plain_update() {
        let service = service();
        service.create(input("a", "1", false), None).await.unwrap();

        let changes = ClipboardUpdate {
            data_type: "application/json".to_string(),
            data: "{}".to_string(),
        };
        let view = service.update("a", changes, None).await.unwrap();

        assert_eq!(view.data_type, "application/json");
        assert_eq!(service.get("a", None).await.unwrap().data, "{}");
    }

    #[tokio::test]
    async fn test_missing_clipboard() {
        let service = service();

        assert!(matches!(service.get("x", None).await, Err(Error::NotFound(_))));
        assert!(matches!(service.delete("x", None).await, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_protected_delete() {
        let service = service();
        service.create(input("s", "x", true), pw("pw")).await.unwrap();

        let denied = service.delete("s", pw("wrong")).await;
        assert!(matches!(denied, Err(Error::Authentication)));
        assert!(service.store().get("s").await.unwrap().is_some());

        service.delete("s", pw("pw")).await.unwrap();
        assert!(service.store().get("s").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_never_removes_recreated_record() {
        let inner = Arc::new(MemoryStore::new());
        let direct = ClipboardService::new(inner.clone(), suite());

        direct.create(input("x", "old", true), pw("A")).await.unwrap();
        let stale = inner.get("x").await.unwrap().unwrap();
        direct.delete("x", pw("A")).await.unwrap();
        direct.create(input("x", "new", true), pw("B")).await.unwrap();

        let racing = ClipboardService::new(Arc::new(StaleReads { inner, stale }), suite());
        let result = racing.delete("x", pw("A")).await;
        assert!(matches!(result, Err(Error::NotFound(_))));

        let survivor = direct.get("x", pw("B")).await.unwrap();
        assert_eq!(survivor.data, "new");
    }
}
