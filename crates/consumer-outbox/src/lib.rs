//! At-least-once delivery of accepted events to local consumers.
//!
//! This crate provides:
//! - ConsumerRegistry: set of consumers that declared readiness
//! - DeliveryQueue: FIFO outbox with retry-to-front
//! - Outbox: drain loop with fan-out, bounded retries and fallback notification
//! - ConsumerChannel / Notifier: collaborator seams to the browser side

mod channel;
mod error;
mod outbox;
mod queue;
mod registry;

pub use channel::{ConsumerChannel, Notifier};
pub use error::{ConsumerSendError, NotifyError, OutboxError};
pub use outbox::{DrainReport, FallbackTemplate, Outbox, MAX_RETRY_COUNT};
pub use queue::{DeliveryItem, DeliveryQueue};
pub use registry::ConsumerRegistry;
