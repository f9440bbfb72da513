//! Outbox drain loop.

use crate::{
    ConsumerChannel, ConsumerRegistry, DeliveryItem, DeliveryQueue, Notifier, OutboxError,
};
use futures_util::future::join_all;
use relay_protocol_types::{ConsumerHandle, Event, UserNotification};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Default bound on failed sends per item.
pub const MAX_RETRY_COUNT: u32 = 5;

/// Fixed parts of the fallback notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackTemplate {
    pub icon_url: String,
    pub title: String,
}

impl Default for FallbackTemplate {
    fn default() -> Self {
        Self {
            icon_url: "icon.png".to_string(),
            title: "Notification".to_string(),
        }
    }
}

impl FallbackTemplate {
    pub fn render(&self, message: impl Into<String>) -> UserNotification {
        UserNotification::basic(&self.icon_url, &self.title, message)
    }
}

/// Outcome of one drain pass.
#[derive(Debug, Default)]
pub struct DrainReport {
    /// Items accepted by every ready consumer.
    pub delivered: usize,
    /// Items routed to the fallback notification.
    pub fallback: usize,
    /// Items put back at the front for a later pass.
    pub requeued: usize,
    /// Per-consumer send failures seen during the pass.
    pub send_failures: Vec<OutboxError>,
    /// Terminal failures: dropped items and failed notifications.
    pub failures: Vec<OutboxError>,
}

impl DrainReport {
    pub fn is_clean(&self) -> bool {
        self.send_failures.is_empty() && self.failures.is_empty()
    }
}

/// Registry plus queue, drained through the consumer channel or the notifier.
///
/// Callers must serialize access; the relay engine owns one outbox on a
/// single task.
pub struct Outbox {
    registry: ConsumerRegistry,
    queue: DeliveryQueue,
    channel: Arc<dyn ConsumerChannel>,
    notifier: Arc<dyn Notifier>,
    fallback: FallbackTemplate,
    max_retry_count: u32,
}

impl Outbox {
    pub fn new(channel: Arc<dyn ConsumerChannel>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            registry: ConsumerRegistry::new(),
            queue: DeliveryQueue::new(),
            channel,
            notifier,
            fallback: FallbackTemplate::default(),
            max_retry_count: MAX_RETRY_COUNT,
        }
    }

    pub fn with_fallback(mut self, fallback: FallbackTemplate) -> Self {
        self.fallback = fallback;
        self
    }

    /// Override the retry bound. Values below 1 are raised to 1.
    pub fn with_max_retry_count(mut self, max_retry_count: u32) -> Self {
        self.max_retry_count = max_retry_count.max(1);
        self
    }

    pub fn registry(&self) -> &ConsumerRegistry {
        &self.registry
    }

    pub fn queue(&self) -> &DeliveryQueue {
        &self.queue
    }

    pub fn fallback(&self) -> &FallbackTemplate {
        &self.fallback
    }

    /// Queue an accepted event and drain.
    pub async fn admit(&mut self, event: Event) -> DrainReport {
        let item = DeliveryItem::new(event);
        debug!(item_id = %item.id, payload = %item.event.payload(), "Admitted event");
        self.queue.push_back(item);
        self.drain().await
    }

    /// Record a consumer's readiness and drain.
    pub async fn mark_ready(&mut self, handle: ConsumerHandle) -> DrainReport {
        self.registry.mark_ready(handle);
        self.drain().await
    }

    /// Forget a consumer. Items already dispatched are not requeued.
    pub fn mark_gone(&mut self, handle: &ConsumerHandle) -> bool {
        self.registry.mark_gone(handle)
    }

    /// Deliver pending items front to back.
    ///
    /// Registry emptiness is checked per item: with nobody ready an item
    /// goes to the fallback notification exactly once; otherwise it is
    /// fanned out to every ready consumer. A partially failed item returns
    /// to the front and the pass stops.
    pub async fn drain(&mut self) -> DrainReport {
        let mut report = DrainReport::default();

        while let Some(mut item) = self.queue.pop_front() {
            if self.registry.is_empty() {
                self.send_fallback(&item, &mut report).await;
                continue;
            }

            let handles = self.registry.handles();
            let message = item.event.to_consumer_message();
            let channel = self.channel.clone();
            let results = join_all(handles.iter().map(|handle| {
                let channel = channel.clone();
                let message = &message;
                async move { channel.send(handle, message).await }
            }))
            .await;

            let mut failed = false;
            for (handle, result) in handles.into_iter().zip(results) {
                if let Err(source) = result {
                    failed = true;
                    item.attempt_count += 1;
                    self.registry.mark_gone(&handle);
                    warn!(
                        item_id = %item.id,
                        consumer = %handle,
                        attempt = item.attempt_count,
                        error = %source,
                        "Delivery to consumer failed"
                    );
                    report
                        .send_failures
                        .push(OutboxError::ConsumerSend { handle, source });
                }
            }

            if !failed {
                info!(item_id = %item.id, "Delivered event to ready consumers");
                report.delivered += 1;
                continue;
            }

            if item.attempt_count >= self.max_retry_count {
                error!(
                    item_id = %item.id,
                    attempts = item.attempt_count,
                    "Dropping event after max retries"
                );
                report.failures.push(OutboxError::MaxRetriesExceeded {
                    item_id: item.id.to_string(),
                    attempts: item.attempt_count,
                });
                continue;
            }

            debug!(item_id = %item.id, attempt = item.attempt_count, "Requeued event at front");
            self.queue.push_front(item);
            report.requeued += 1;
            break;
        }

        report
    }

    async fn send_fallback(&self, item: &DeliveryItem, report: &mut DrainReport) {
        let notification = self.fallback.render(item.event.fallback_text());
        match self.notifier.notify(notification).await {
            Ok(()) => {
                info!(item_id = %item.id, "No consumer ready; notified user directly");
                report.fallback += 1;
            }
            Err(e) => {
                error!(item_id = %item.id, error = %e, "Fallback notification failed");
                report.failures.push(OutboxError::Notify(e));
            }
        }
    }
}
