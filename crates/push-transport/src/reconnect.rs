//! Reconnection backoff state.

use std::time::Duration;

/// Attempt counter and last computed delay of the reconnect schedule.
///
/// Reset to zero on every successful open. Lives for the process lifetime.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconnectState {
    attempt_count: u32,
    last_delay: Option<Duration>,
}

impl ReconnectState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attempt_count(&self) -> u32 {
        self.attempt_count
    }

    pub fn last_delay(&self) -> Option<Duration> {
        self.last_delay
    }

    pub fn reset(&mut self) {
        self.attempt_count = 0;
        self.last_delay = None;
    }

    /// Compute the next delay (`base * 2^attempt`) and consume one attempt.
    ///
    /// Returns `None` once `max_attempts` have been used.
    pub fn advance(&mut self, base: Duration, max_attempts: u32) -> Option<Duration> {
        if self.attempt_count >= max_attempts {
            return None;
        }

        let delay = base.saturating_mul(2u32.saturating_pow(self.attempt_count));
        self.attempt_count += 1;
        self.last_delay = Some(delay);
        Some(delay)
    }
}
