//! OAuth callback error types.

use thiserror::Error;

/// Failure to navigate a browser tab.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Navigation failed: {0}")]
pub struct NavigationError(pub String);

/// OAuth callback error type.
#[derive(Error, Debug)]
pub enum OAuthError {
    /// Redirect URL could not be parsed
    #[error("Invalid redirect URL: {0}")]
    InvalidUrl(String),

    /// Fragment lacks one of the two tokens
    #[error("Missing credentials in redirect: {0}")]
    MissingCredentials(&'static str),

    /// Credential store failed
    #[error("Storage error: {0}")]
    Storage(#[from] credential_storage::StorageError),

    /// Stored session read back empty
    #[error("Session was not persisted")]
    PersistenceVerificationFailed,

    /// Post-login navigation failed
    #[error(transparent)]
    Navigation(#[from] NavigationError),
}

/// Result type alias using OAuthError.
pub type OAuthResult<T> = Result<T, OAuthError>;
