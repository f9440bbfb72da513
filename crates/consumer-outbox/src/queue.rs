//! Delivery queue.

use chrono::{DateTime, Utc};
use relay_protocol_types::Event;
use std::collections::VecDeque;
use uuid::Uuid;

/// An accepted event awaiting delivery.
#[derive(Debug, Clone)]
pub struct DeliveryItem {
    /// Unique item ID, used in logs and failure reports.
    pub id: Uuid,
    pub event: Event,
    /// Failed per-consumer sends so far.
    pub attempt_count: u32,
    pub created_at: DateTime<Utc>,
}

impl DeliveryItem {
    pub fn new(event: Event) -> Self {
        Self {
            id: Uuid::new_v4(),
            event,
            attempt_count: 0,
            created_at: Utc::now(),
        }
    }
}

/// FIFO for admission; retried items go back to the front.
#[derive(Debug, Default)]
pub struct DeliveryQueue {
    pending: VecDeque<DeliveryItem>,
}

impl DeliveryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit a new item behind everything already pending.
    pub fn push_back(&mut self, item: DeliveryItem) {
        self.pending.push_back(item);
    }

    /// Put a retried item ahead of later admissions.
    pub fn push_front(&mut self, item: DeliveryItem) {
        self.pending.push_front(item);
    }

    pub fn pop_front(&mut self) -> Option<DeliveryItem> {
        self.pending.pop_front()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Pending items in delivery order.
    pub fn iter(&self) -> impl Iterator<Item = &DeliveryItem> {
        self.pending.iter()
    }
}
