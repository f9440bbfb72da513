//! Accepted push events.

use crate::{ConsumerMessage, OtpData};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of an accepted event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventKind {
    /// A one-time code announced by the push endpoint.
    CodeNotification,
}

/// An event accepted from the push endpoint. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    kind: EventKind,
    payload: String,
    received_at: DateTime<Utc>,
}

impl Event {
    /// Create a code notification carrying the stringified identifier.
    pub fn code_notification(code: impl Into<String>) -> Self {
        Self {
            kind: EventKind::CodeNotification,
            payload: code.into(),
            received_at: Utc::now(),
        }
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// The code carried by this event.
    pub fn payload(&self) -> &str {
        &self.payload
    }

    pub fn received_at(&self) -> DateTime<Utc> {
        self.received_at
    }

    /// Message delivered to ready consumers for this event.
    pub fn to_consumer_message(&self) -> ConsumerMessage {
        match self.kind {
            EventKind::CodeNotification => ConsumerMessage::ShowOtp {
                data: OtpData {
                    otp: self.payload.clone(),
                },
            },
        }
    }

    /// Body of the direct user notification used when nobody is listening.
    pub fn fallback_text(&self) -> String {
        match self.kind {
            EventKind::CodeNotification => format!("OTP Received: {}", self.payload),
        }
    }
}
