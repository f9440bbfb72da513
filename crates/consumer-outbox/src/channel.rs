//! Collaborators the outbox delivers through.

use crate::{ConsumerSendError, NotifyError};
use async_trait::async_trait;
use relay_protocol_types::{ConsumerHandle, ConsumerMessage, UserNotification};

/// Delivers messages to individual consumers.
///
/// `Ok(())` means the browser reported no error for the send.
#[async_trait]
pub trait ConsumerChannel: Send + Sync {
    async fn send(
        &self,
        handle: &ConsumerHandle,
        message: &ConsumerMessage,
    ) -> Result<(), ConsumerSendError>;
}

/// Raises platform notifications directly to the user.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: UserNotification) -> Result<(), NotifyError>;
}
