//! Inbound frame decoding and throttling.

use crate::DecodeError;
use relay_protocol_types::Event;
use serde_json::Value;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Field of an inbound frame carrying the notification identifier.
pub const HISTORY_ID_FIELD: &str = "historyId";

/// Outcome of offering one frame to the decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    Accepted(Event),
    /// Arrived within the throttle window of the previous admitted frame.
    Throttled,
}

/// Leading-edge throttled frame decoder.
///
/// The window is measured between frames that pass the throttle gate, so a
/// frame that passes but then fails to parse still consumes the window.
#[derive(Debug)]
pub struct FrameDecoder {
    window: Duration,
    last_admitted: Option<Instant>,
}

impl FrameDecoder {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_admitted: None,
        }
    }

    /// Forget the last admitted frame. Called when a new connection opens.
    pub fn reset(&mut self) {
        self.last_admitted = None;
    }

    /// Throttle, parse, and validate one raw frame. The window is measured
    /// on `received_at`, the time the frame came off the socket.
    pub fn decode(&mut self, raw: &str, received_at: Instant) -> Result<Admission, DecodeError> {
        if let Some(last) = self.last_admitted {
            if received_at.saturating_duration_since(last) < self.window {
                debug!("Throttled inbound frame");
                return Ok(Admission::Throttled);
            }
        }
        self.last_admitted = Some(received_at);

        let value: Value = serde_json::from_str(raw).map_err(|e| {
            warn!(error = %e, "Malformed inbound frame");
            DecodeError::Malformed(e)
        })?;

        let code = value
            .get(HISTORY_ID_FIELD)
            .and_then(identifier_text)
            .ok_or_else(|| {
                debug!("Inbound frame without identifier");
                DecodeError::MissingIdentifier
            })?;

        Ok(Admission::Accepted(Event::code_notification(code)))
    }
}

/// Stringify a usable identifier. Empty strings, zero, and non-scalar
/// values carry no identifier.
fn identifier_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                (i != 0).then(|| i.to_string())
            } else if let Some(u) = n.as_u64() {
                Some(u.to_string())
            } else {
                let f = n.as_f64()?;
                if f == 0.0 || !f.is_finite() {
                    None
                } else if f.fract() == 0.0 && f.abs() < 1e15 {
                    Some(format!("{}", f as i64))
                } else {
                    Some(f.to_string())
                }
            }
        }
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}
