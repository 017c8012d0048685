//! Store registry for resolving a backend from configuration.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::memory::MemoryStore;
use crate::provider::ClipboardStore;
use crate::sqlite::SqliteStore;
use copybridge_common::{Error, Result};

/// Factory function type for creating stores.
pub type StoreFactory = Box<dyn Fn(Value) -> Result<Arc<dyn ClipboardStore>> + Send + Sync>;

/// Registry for clipboard store factories.
///
/// Allows registration and resolution of stores by name and
/// configuration.
pub struct StoreRegistry {
    factories: HashMap<String, StoreFactory>,
}

impl StoreRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a store factory.
    ///
    /// # Errors
    /// - Returns error if name is already registered
    pub fn register(&mut self, name: impl Into<String>, factory: StoreFactory) -> Result<()> {
        let name = name.into();
        if self.factories.contains_key(&name) {
            return Err(Error::AlreadyExists(format!(
                "Store '{}' is already registered",
                name
            )));
        }
        self.factories.insert(name, factory);
        Ok(())
    }

    /// Resolve a store by name and configuration.
    ///
    /// # Errors
    /// - Store not registered
    /// - Factory rejected the configuration
    pub fn resolve(&self, name: &str, config: Value) -> Result<Arc<dyn ClipboardStore>> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| Error::NotFound(format!("Store '{}' not registered", name)))?;
        factory(config)
    }

    /// List registered store names, sorted.
    pub fn list_stores(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}

impl Default for StoreRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn open_memory(_config: Value) -> Result<Arc<dyn ClipboardStore>> {
    Ok(Arc::new(MemoryStore::new()))
}

fn open_sqlite(config: Value) -> Result<Arc<dyn ClipboardStore>> {
    let path = config
        .get("path")
        .and_then(|v| v.as_str())
        .ok_or_else(|| Error::InvalidInput("sqlite store requires 'path'".to_string()))?;

    let store = if path == ":memory:" {
        SqliteStore::in_memory()?
    } else {
        SqliteStore::open(path)?
    };
    Ok(Arc::new(store))
}

/// Create a registry with the built-in stores.
///
/// - `memory`: no configuration
/// - `sqlite`: `{"path": "<database file>"}`; `":memory:"` opens a
///   throwaway database
pub fn create_default_registry() -> Result<StoreRegistry> {
    let mut registry = StoreRegistry::new();
    registry.register("memory", Box::new(open_memory))?;
    registry.register("sqlite", Box::new(open_sqlite))?;
    Ok(registry)
}
