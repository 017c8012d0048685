//! In-memory clipboard store for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{PoisonError, RwLock};

use crate::provider::{ClipboardStore, HealthReport, NewRecordRow, RecordRow};
use copybridge_common::{Error, RecordId, Result};

/// In-memory clipboard store.
///
/// Useful for testing and development. All data is stored in memory
/// and lost on drop.
pub struct MemoryStore {
    rows: RwLock<HashMap<String, RecordRow>>,
    next_id: AtomicI64,
    closed: AtomicBool,
}

impl MemoryStore {
    /// Create a new empty memory store.
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
            closed: AtomicBool::new(false),
        }
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(Error::Storage("Store is closed".to_string()));
        }
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<T>(_: PoisonError<T>) -> Error {
    Error::Storage("Memory store lock poisoned".to_string())
}

#[async_trait]
impl ClipboardStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn insert(&self, row: NewRecordRow) -> Result<RecordRow> {
        self.ensure_open()?;
        let mut rows = self.rows.write().map_err(poisoned)?;

        if rows.contains_key(&row.name) {
            return Err(Error::AlreadyExists(format!("Clipboard '{}'", row.name)));
        }

        let id = RecordId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        let stored = row.with_id(id);
        rows.insert(stored.name.clone(), stored.clone());

        Ok(stored)
    }

    async fn get(&self, name: &str) -> Result<Option<RecordRow>> {
        self.ensure_open()?;
        let rows = self.rows.read().map_err(poisoned)?;
        Ok(rows.get(name).cloned())
    }

    async fn update(&self, row: &RecordRow) -> Result<()> {
        self.ensure_open()?;
        let mut rows = self.rows.write().map_err(poisoned)?;

        let key = rows
            .iter()
            .find(|(_, existing)| existing.id == row.id)
            .map(|(key, _)| key.clone())
            .ok_or_else(|| Error::NotFound(format!("Clipboard with id {}", row.id)))?;

        rows.remove(&key);
        rows.insert(row.name.clone(), row.clone());
        Ok(())
    }

    async fn delete(&self, id: RecordId) -> Result<bool> {
        self.ensure_open()?;
        let mut rows = self.rows.write().map_err(poisoned)?;

        let before = rows.len();
        rows.retain(|_, existing| existing.id != id);
        Ok(rows.len() < before)
    }

    async fn health(&self) -> HealthReport {
        if self.ensure_open().is_err() {
            return HealthReport::down("Store is closed");
        }
        match self.rows.read() {
            Ok(rows) => HealthReport::up("It's healthy").with_detail("records", rows.len()),
            Err(_) => HealthReport::down("Memory store lock poisoned"),
        }
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }
}
