//! Server configuration.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

use copybridge_clipboard::CipherSuite;
use copybridge_common::{Error, Result};
use copybridge_crypto::{HashCost, KdfParams};

/// Which store backend to open and how.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Registered store name (e.g., "memory", "sqlite").
    pub kind: String,
    /// Store-specific configuration.
    #[serde(default)]
    pub config: serde_json::Value,
}

impl StoreConfig {
    pub fn memory() -> Self {
        Self {
            kind: "memory".to_string(),
            config: serde_json::Value::Null,
        }
    }

    pub fn sqlite(path: impl Into<String>) -> Self {
        Self {
            kind: "sqlite".to_string(),
            config: serde_json::json!({ "path": path.into() }),
        }
    }
}

/// Top-level server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to listen on.
    pub listen_addr: SocketAddr,
    pub store: StoreConfig,
    /// Cost of newly created credential hashes.
    #[serde(default)]
    pub credential_cost: HashCost,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            store: StoreConfig::memory(),
            credential_cost: HashCost::DEFAULT,
        }
    }
}

impl ServerConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        serde_json::from_str(&raw)
            .map_err(|e| Error::InvalidInput(format!("Invalid server config: {}", e)))
    }

    /// Cipher suite for this deployment.
    ///
    /// Key derivation parameters are fixed: they are not stored per record,
    /// so they cannot vary between deployments of the same database.
    pub fn cipher_suite(&self) -> CipherSuite {
        CipherSuite::new(KdfParams::default(), self.credential_cost)
    }
}
