//! Clipboard persistence for CopyBridge.
//!
//! The store keeps rows opaque: it never decodes ciphertext, salts, nonces
//! or hashes. Backends are selected by name through a registry so that the
//! server owns one explicitly constructed handle.

pub mod provider;
pub mod registry;
pub mod memory;
pub mod sqlite;

pub use provider::{ClipboardStore, HealthReport, HealthStatus, NewRecordRow, RecordRow};
pub use registry::{create_default_registry, StoreFactory, StoreRegistry};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
