//! SQLite-backed clipboard store.
//!
//! A single connection guarded by a mutex; every query runs on tokio's
//! blocking pool so request tasks never wait on disk I/O directly.

use async_trait::async_trait;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

use crate::provider::{ClipboardStore, HealthReport, NewRecordRow, RecordRow};
use copybridge_common::{Error, RecordId, Result};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS clipboards (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    type TEXT NOT NULL,
    data TEXT NOT NULL,
    is_encrypted BOOLEAN NOT NULL DEFAULT FALSE,
    password_hash TEXT,
    salt TEXT,
    nonce TEXT
);
"#;

const SELECT_COLUMNS: &str =
    "SELECT id, name, type, data, is_encrypted, password_hash, salt, nonce FROM clipboards";

/// Clipboard store persisted in a SQLite database file.
pub struct SqliteStore {
    conn: Arc<Mutex<Option<Connection>>>,
    location: String,
}

impl SqliteStore {
    /// Create or open a database and make sure the schema exists.
    ///
    /// # Errors
    /// - `Error::Storage` if the database cannot be opened or migrated
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path: PathBuf = path.as_ref().to_path_buf();
        let conn = Connection::open(&path).map_err(storage_error)?;
        Self::init(conn, path.display().to_string())
    }

    /// Create an in-memory database (for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(storage_error)?;
        Self::init(conn, ":memory:".to_string())
    }

    fn init(conn: Connection, location: String) -> Result<Self> {
        conn.execute_batch(SCHEMA).map_err(storage_error)?;
        info!(location = %location, "SQLite store opened");
        Ok(Self {
            conn: Arc::new(Mutex::new(Some(conn))),
            location,
        })
    }

    /// Run `f` against the connection on the blocking pool.
    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| Error::Storage("Connection lock poisoned".to_string()))?;
            let conn = guard
                .as_ref()
                .ok_or_else(|| Error::Storage("Store is closed".to_string()))?;
            f(conn)
        })
        .await
        .map_err(|e| Error::Storage(format!("Store task failed: {}", e)))?
    }
}

fn storage_error(e: rusqlite::Error) -> Error {
    Error::Storage(e.to_string())
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<RecordRow> {
    Ok(RecordRow {
        id: RecordId::new(row.get(0)?),
        name: row.get(1)?,
        data_type: row.get(2)?,
        data: row.get(3)?,
        is_encrypted: row.get(4)?,
        password_hash: row.get(5)?,
        salt: row.get(6)?,
        nonce: row.get(7)?,
    })
}

#[async_trait]
impl ClipboardStore for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn insert(&self, row: NewRecordRow) -> Result<RecordRow> {
        debug!(name = %row.name, "Inserting clipboard row");
        self.with_conn(move |conn| {
            let result = conn.execute(
                r#"
                INSERT INTO clipboards
                (name, type, data, is_encrypted, password_hash, salt, nonce)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
                params![
                    row.name,
                    row.data_type,
                    row.data,
                    row.is_encrypted,
                    row.password_hash,
                    row.salt,
                    row.nonce,
                ],
            );

            match result {
                Ok(_) => Ok(row.with_id(RecordId::new(conn.last_insert_rowid()))),
                Err(rusqlite::Error::SqliteFailure(e, _))
                    if e.code == ErrorCode::ConstraintViolation =>
                {
                    Err(Error::AlreadyExists(format!("Clipboard '{}'", row.name)))
                }
                Err(e) => Err(storage_error(e)),
            }
        })
        .await
    }

    async fn get(&self, name: &str) -> Result<Option<RecordRow>> {
        let name = name.to_string();
        self.with_conn(move |conn| {
            conn.query_row(
                &format!("{} WHERE name = ?1", SELECT_COLUMNS),
                [&name],
                row_to_record,
            )
            .optional()
            .map_err(storage_error)
        })
        .await
    }

    async fn update(&self, row: &RecordRow) -> Result<()> {
        debug!(name = %row.name, id = %row.id, "Updating clipboard row");
        let row = row.clone();
        self.with_conn(move |conn| {
            let changed = conn
                .execute(
                    r#"
                    UPDATE clipboards
                    SET name = ?1, type = ?2, data = ?3, is_encrypted = ?4,
                        password_hash = ?5, salt = ?6, nonce = ?7
                    WHERE id = ?8
                    "#,
                    params![
                        row.name,
                        row.data_type,
                        row.data,
                        row.is_encrypted,
                        row.password_hash,
                        row.salt,
                        row.nonce,
                        row.id.get(),
                    ],
                )
                .map_err(storage_error)?;

            if changed == 0 {
                return Err(Error::NotFound(format!("Clipboard with id {}", row.id)));
            }
            Ok(())
        })
        .await
    }

    async fn delete(&self, id: RecordId) -> Result<bool> {
        debug!(id = %id, "Deleting clipboard row");
        self.with_conn(move |conn| {
            let changed = conn
                .execute("DELETE FROM clipboards WHERE id = ?1", [id.get()])
                .map_err(storage_error)?;
            Ok(changed > 0)
        })
        .await
    }

    async fn health(&self) -> HealthReport {
        let count = self
            .with_conn(|conn| {
                conn.query_row("SELECT COUNT(*) FROM clipboards", [], |row| {
                    row.get::<_, i64>(0)
                })
                .map_err(storage_error)
            })
            .await;

        match count {
            Ok(records) => HealthReport::up("It's healthy").with_detail("records", records),
            Err(e) => {
                warn!(location = %self.location, error = %e, "SQLite health check failed");
                HealthReport::down("db down")
            }
        }
    }

    async fn close(&self) -> Result<()> {
        let conn = Arc::clone(&self.conn);
        let location = self.location.clone();
        tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|_| Error::Storage("Connection lock poisoned".to_string()))?;
            if let Some(conn) = guard.take() {
                conn.close().map_err(|(_, e)| storage_error(e))?;
                info!(location = %location, "Disconnected from database");
            }
            Ok(())
        })
        .await
        .map_err(|e| Error::Storage(format!("Store task failed: {}", e)))?
    }
}
