//! Transport error types.

use thiserror::Error;

/// Transport error type.
#[derive(Error, Debug)]
pub enum TransportError {
    /// Automatic reconnection gave up
    #[error("Reconnection exhausted after {attempts} attempts")]
    ReconnectExhausted { attempts: u32 },

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Send error
    #[error("Failed to send frame: {0}")]
    Send(String),
}

/// Result type alias using TransportError.
pub type TransportResult<T> = Result<T, TransportError>;

/// Inbound frame rejected by the decoder. Non-fatal: the connection stays open.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// Frame is not valid JSON
    #[error("Malformed frame: {0}")]
    Malformed(#[source] serde_json::Error),

    /// Frame parsed but carries no usable notification identifier
    #[error("Frame has no notification identifier")]
    MissingIdentifier,
}
