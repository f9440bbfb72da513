//! Persisted session credentials for the Season relay host.
//!
//! This crate provides:
//! - **CredentialStore**: async set/get/remove of the session tokens
//! - **FileCredentialStore**: JSON file under the host's base directory
//! - **MemoryCredentialStore**: in-process store for tests and embedding

mod file;
mod keys;
mod memory;
mod traits;

pub use file::FileCredentialStore;
pub use keys::StorageKeys;
pub use memory::MemoryCredentialStore;
pub use traits::{CredentialStore, SessionTokens};

use thiserror::Error;

/// Error type for storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored data could not be encoded or decoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
