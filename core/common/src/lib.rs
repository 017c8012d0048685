//! Common utilities and types shared across CopyBridge modules.
//!
//! This module provides the error taxonomy and the small value types that
//! every other crate in the workspace builds on.

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{Password, RecordId};
