//! Outbox error types.

use relay_protocol_types::ConsumerHandle;
use std::time::Duration;
use thiserror::Error;

/// Failure to hand one message to one consumer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConsumerSendError {
    /// The browser reported an error for the send
    #[error("Consumer rejected message: {0}")]
    Rejected(String),

    /// No acknowledgment arrived in time
    #[error("No reply from consumer within {0:?}")]
    Timeout(Duration),

    /// The channel to the browser is gone
    #[error("Consumer channel disconnected")]
    Disconnected,
}

/// Failure to raise a user-visible notification.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Notification failed: {0}")]
pub struct NotifyError(pub String);

/// Outbox error type.
#[derive(Error, Debug)]
pub enum OutboxError {
    /// Send to a single consumer failed
    #[error("Send to {handle} failed: {source}")]
    ConsumerSend {
        handle: ConsumerHandle,
        #[source]
        source: ConsumerSendError,
    },

    /// Item dropped after exhausting its retries
    #[error("Max retries exceeded for item {item_id} after {attempts} attempts")]
    MaxRetriesExceeded { item_id: String, attempts: u32 },

    /// Fallback notification failed
    #[error(transparent)]
    Notify(#[from] NotifyError),
}
