//! Clipboard records and password protection for CopyBridge.
//!
//! A record is either plain or protected. Protecting hashes the password
//! for later verification and encrypts the payload under a key derived
//! from the same password and a per-record salt. Every access to a
//! protected record verifies the password before anything is decrypted.

pub mod record;
pub mod service;
pub mod suite;

pub use record::{
    ClipboardUpdate, ClipboardView, Content, NewClipboard, NewRecord, ProtectedPayload, Record,
};
pub use service::ClipboardService;
pub use suite::CipherSuite;
