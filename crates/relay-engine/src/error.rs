//! Engine error types.

use thiserror::Error;

/// Engine error type.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] relay_config_and_utils::CoreError),

    /// `run` was called on an engine that already ran
    #[error("Engine already running")]
    AlreadyRunning,
}

/// Result type alias using EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
