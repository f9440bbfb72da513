//! Transport connection manager.

use crate::connection::Connection;
use crate::{
    ConnectionId, ConnectionState, Dialer, ReconnectState, TransportError, TransportResult,
    TransportSignal,
};
use relay_protocol_types::OutboundFrame;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

/// Transport configuration.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Push endpoint URL.
    pub url: String,
    /// Base reconnect delay; attempt `n` waits `base * 2^n`.
    pub reconnect_base_delay: Duration,
    /// Maximum automatic reconnect attempts.
    pub max_reconnect_attempts: u32,
}

impl TransportConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            reconnect_base_delay: Duration::from_millis(5_000),
            max_reconnect_attempts: 5,
        }
    }
}

/// What a transport signal meant for the rest of the host.
#[derive(Debug)]
pub enum TransportUpdate {
    /// The current connection opened.
    Opened(ConnectionId),
    /// A text frame arrived on the current connection.
    Frame { text: String, received_at: Instant },
    /// The current connection was lost; carries the reconnect decision.
    Lost(TransportResult<Duration>),
    /// A reconnect timer fired; `true` when a new connection was dialed.
    Redialed(bool),
    /// Signal from a superseded connection, or a duplicate close.
    Ignored,
}

/// Owns the single connection to the push endpoint.
///
/// Not thread-safe by itself: the owner serializes all calls (the relay
/// engine drives it from one task).
pub struct ConnectionManager {
    config: TransportConfig,
    dialer: Arc<dyn Dialer>,
    connection: Option<Connection>,
    next_id: u64,
    reconnect: ReconnectState,
    signals: mpsc::UnboundedSender<TransportSignal>,
}

impl ConnectionManager {
    /// Create a manager and the receiver its connections and timers post to.
    pub fn new(
        config: TransportConfig,
        dialer: Arc<dyn Dialer>,
    ) -> (Self, mpsc::UnboundedReceiver<TransportSignal>) {
        let (signals, signals_rx) = mpsc::unbounded_channel();

        let manager = Self {
            config,
            dialer,
            connection: None,
            next_id: 0,
            reconnect: ReconnectState::new(),
            signals,
        };
        (manager, signals_rx)
    }

    /// Get the current connection state.
    pub fn state(&self) -> ConnectionState {
        self.connection
            .as_ref()
            .map(|c| c.state)
            .unwrap_or(ConnectionState::Closed)
    }

    pub fn is_open(&self) -> bool {
        self.state() == ConnectionState::Open
    }

    pub fn current_connection(&self) -> Option<ConnectionId> {
        self.connection.as_ref().map(|c| c.id)
    }

    pub fn reconnect_state(&self) -> &ReconnectState {
        &self.reconnect
    }

    fn is_current(&self, id: ConnectionId) -> bool {
        self.current_connection() == Some(id)
    }

    /// Open a new connection unless one is connecting or open.
    ///
    /// Returns `true` when a new connection was dialed.
    pub fn connect(&mut self) -> bool {
        match self.state() {
            ConnectionState::Connecting | ConnectionState::Open => {
                debug!("Already connecting or connected");
                false
            }
            ConnectionState::Closed => {
                self.next_id += 1;
                let id = ConnectionId(self.next_id);
                let handle = self.dialer.dial(&self.config.url, id, self.signals.clone());

                // Replacing drops the previous handle and stops its driver.
                self.connection = Some(Connection {
                    id,
                    state: ConnectionState::Connecting,
                    handle,
                });
                info!(connection = %id, url = %self.config.url, "Dialing push endpoint");
                true
            }
        }
    }

    /// Transport-open signal: mark open and reset the backoff schedule.
    pub fn on_opened(&mut self, id: ConnectionId) -> bool {
        match self.connection.as_mut() {
            Some(conn) if conn.id == id && conn.state == ConnectionState::Connecting => {
                conn.state = ConnectionState::Open;
                self.reconnect.reset();
                info!(connection = %id, "Push endpoint connected");
                true
            }
            _ => {
                debug!(connection = %id, "Ignoring open from stale connection");
                false
            }
        }
    }

    /// Transport-close or transport-error signal: mark closed and reconnect.
    ///
    /// Returns `None` when the signal is stale or the connection was already
    /// closed, so a close following an error schedules only one reconnect.
    pub fn on_lost(&mut self, id: ConnectionId, reason: &str) -> Option<TransportResult<Duration>> {
        let conn = self.connection.as_mut().filter(|c| c.id == id)?;
        if conn.state == ConnectionState::Closed {
            debug!(connection = %id, "Connection already closed");
            return None;
        }

        conn.state = ConnectionState::Closed;
        warn!(connection = %id, reason = %reason, "Push endpoint disconnected");
        Some(self.reconnect())
    }

    /// Schedule a `connect()` after the next backoff delay.
    ///
    /// Fails with `ReconnectExhausted` once the attempt bound is reached;
    /// no further automatic attempts are made after that.
    pub fn reconnect(&mut self) -> TransportResult<Duration> {
        let Some(delay) = self.reconnect.advance(
            self.config.reconnect_base_delay,
            self.config.max_reconnect_attempts,
        ) else {
            let attempts = self.reconnect.attempt_count();
            error!(
                attempts = attempts,
                "Max reconnection attempts reached; reload required"
            );
            return Err(TransportError::ReconnectExhausted { attempts });
        };

        info!(
            attempt = self.reconnect.attempt_count(),
            delay_ms = delay.as_millis() as u64,
            "Scheduling reconnect"
        );

        let deadline = Instant::now() + delay;
        let signals = self.signals.clone();
        tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            let _ = signals.send(TransportSignal::ReconnectDue);
        });

        Ok(delay)
    }

    /// Send a liveness ping if the connection is open. Never reconnects.
    pub fn keep_alive(&self) -> bool {
        let Some(conn) = self
            .connection
            .as_ref()
            .filter(|c| c.state == ConnectionState::Open)
        else {
            return false;
        };

        let sent = OutboundFrame::Ping
            .to_json()
            .map_err(TransportError::from)
            .and_then(|json| conn.handle.send_text(json));

        match sent {
            Ok(()) => {
                debug!(connection = %conn.id, "Sent keep-alive ping");
                true
            }
            Err(e) => {
                warn!(connection = %conn.id, error = %e, "Keep-alive ping failed");
                false
            }
        }
    }

    /// Apply one transport signal.
    pub fn handle_signal(&mut self, signal: TransportSignal) -> TransportUpdate {
        match signal {
            TransportSignal::Opened(id) => {
                if self.on_opened(id) {
                    TransportUpdate::Opened(id)
                } else {
                    TransportUpdate::Ignored
                }
            }
            TransportSignal::Frame {
                connection,
                text,
                received_at,
            } => {
                if self.is_current(connection) && self.is_open() {
                    TransportUpdate::Frame { text, received_at }
                } else {
                    TransportUpdate::Ignored
                }
            }
            TransportSignal::Closed { connection, reason } => {
                let reason = reason.unwrap_or_else(|| "closed".to_string());
                match self.on_lost(connection, &reason) {
                    Some(decision) => TransportUpdate::Lost(decision),
                    None => TransportUpdate::Ignored,
                }
            }
            TransportSignal::Failed { connection, error } => {
                match self.on_lost(connection, &error) {
                    Some(decision) => TransportUpdate::Lost(decision),
                    None => TransportUpdate::Ignored,
                }
            }
            TransportSignal::ReconnectDue => TransportUpdate::Redialed(self.connect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ConnectionHandle;
    use std::sync::Mutex;

    /// Dialer that records dials and hands out inspectable outbound queues.
    #[derive(Default)]
    struct MockDialer {
        dials: Mutex<Vec<ConnectionId>>,
        outbound: Mutex<Vec<mpsc::UnboundedReceiver<String>>>,
    }

    impl MockDialer {
        fn dial_count(&self) -> usize {
            self.dials.lock().unwrap().len()
        }

        fn sent_frames(&self, index: usize) -> Vec<String> {
            let mut queues = self.outbound.lock().unwrap();
            let mut frames = Vec::new();
            while let Ok(frame) = queues[index].try_recv() {
                frames.push(frame);
            }
            frames
        }
    }

    impl Dialer for MockDialer {
        fn dial(
            &self,
            _url: &str,
            connection: ConnectionId,
            _signals: mpsc::UnboundedSender<TransportSignal>,
        ) -> ConnectionHandle {
            let (tx, rx) = mpsc::unbounded_channel();
            self.dials.lock().unwrap().push(connection);
            self.outbound.lock().unwrap().push(rx);
            ConnectionHandle::new(tx, None)
        }
    }

    fn test_manager() -> (
        ConnectionManager,
        mpsc::UnboundedReceiver<TransportSignal>,
        Arc<MockDialer>,
    ) {
        let dialer = Arc::new(MockDialer::default());
        let (manager, rx) =
            ConnectionManager::new(TransportConfig::new("wss://push.test"), dialer.clone());
        (manager, rx, dialer)
    }

    #[test]
    fn test_transport_config_defaults() {
        let config = TransportConfig::new("wss://push.test");
        assert_eq!(config.url, "wss://push.test");
        assert_eq!(config.reconnect_base_delay, Duration::from_millis(5_000));
        assert_eq!(config.max_reconnect_attempts, 5);
    }

    #[tokio::test]
    async fn test_initial_state_is_closed() {
        let (manager, _rx, dialer) = test_manager();
        assert_eq!(manager.state(), ConnectionState::Closed);
        assert!(manager.current_connection().is_none());
        assert_eq!(manager.reconnect_state().attempt_count(), 0);
        assert_eq!(dialer.dial_count(), 0);
    }

    #[tokio::test]
    async fn test_connect_is_noop_while_connecting_or_open() {
        let (mut manager, _rx, dialer) = test_manager();

        assert!(manager.connect());
        assert_eq!(manager.state(), ConnectionState::Connecting);
        assert!(!manager.connect());

        let id = manager.current_connection().unwrap();
        assert!(manager.on_opened(id));
        assert_eq!(manager.state(), ConnectionState::Open);
        assert!(!manager.connect());

        assert_eq!(dialer.dial_count(), 1);
    }

    #[tokio::test]
    async fn test_open_resets_attempts() {
        let (mut manager, _rx, _dialer) = test_manager();
        manager.connect();
        let first = manager.current_connection().unwrap();

        let delay = manager.on_lost(first, "refused").unwrap().unwrap();
        assert_eq!(delay, Duration::from_millis(5_000));
        assert_eq!(manager.reconnect_state().attempt_count(), 1);

        assert!(manager.connect());
        let second = manager.current_connection().unwrap();
        assert_ne!(first, second);

        manager.on_opened(second);
        assert_eq!(manager.reconnect_state().attempt_count(), 0);
        assert!(manager.reconnect_state().last_delay().is_none());
    }

    #[tokio::test]
    async fn test_error_then_close_reconnects_once() {
        let (mut manager, _rx, _dialer) = test_manager();
        manager.connect();
        let id = manager.current_connection().unwrap();
        manager.on_opened(id);

        let first = manager.handle_signal(TransportSignal::Failed {
            connection: id,
            error: "reset".to_string(),
        });
        assert!(matches!(first, TransportUpdate::Lost(Ok(_))));

        let second = manager.handle_signal(TransportSignal::Closed {
            connection: id,
            reason: None,
        });
        assert!(matches!(second, TransportUpdate::Ignored));
        assert_eq!(manager.reconnect_state().attempt_count(), 1);
    }

    #[tokio::test]
    async fn test_stale_signals_are_ignored() {
        let (mut manager, _rx, _dialer) = test_manager();
        manager.connect();
        let old = manager.current_connection().unwrap();
        manager.on_lost(old, "refused");
        manager.connect();

        let update = manager.handle_signal(TransportSignal::Frame {
            connection: old,
            text: "{}".to_string(),
            received_at: Instant::now(),
        });
        assert!(matches!(update, TransportUpdate::Ignored));

        let update = manager.handle_signal(TransportSignal::Opened(old));
        assert!(matches!(update, TransportUpdate::Ignored));
        assert_eq!(manager.state(), ConnectionState::Connecting);
    }

    #[tokio::test]
    async fn test_frames_only_surface_when_open() {
        let (mut manager, _rx, _dialer) = test_manager();
        manager.connect();
        let id = manager.current_connection().unwrap();

        let early = manager.handle_signal(TransportSignal::Frame {
            connection: id,
            text: "{}".to_string(),
            received_at: Instant::now(),
        });
        assert!(matches!(early, TransportUpdate::Ignored));

        manager.on_opened(id);
        let stamp = Instant::now();
        let update = manager.handle_signal(TransportSignal::Frame {
            connection: id,
            text: r#"{"historyId":1}"#.to_string(),
            received_at: stamp,
        });
        match update {
            TransportUpdate::Frame { text, received_at } => {
                assert_eq!(text, r#"{"historyId":1}"#);
                assert_eq!(received_at, stamp);
            }
            other => panic!("unexpected update: {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_schedule_and_exhaustion() {
        let (mut manager, mut rx, dialer) = test_manager();
        manager.connect();

        let mut delays = Vec::new();
        loop {
            let id = manager.current_connection().unwrap();
            match manager.on_lost(id, "refused").unwrap() {
                Ok(delay) => {
                    delays.push(delay.as_millis());

                    tokio::time::advance(delay - Duration::from_millis(1)).await;
                    assert!(rx.try_recv().is_err(), "reconnect fired early");

                    tokio::time::advance(Duration::from_millis(1)).await;
                    assert_eq!(rx.recv().await.unwrap(), TransportSignal::ReconnectDue);
                    assert!(matches!(
                        manager.handle_signal(TransportSignal::ReconnectDue),
                        TransportUpdate::Redialed(true)
                    ));
                }
                Err(TransportError::ReconnectExhausted { attempts }) => {
                    assert_eq!(attempts, 5);
                    break;
                }
                Err(e) => panic!("unexpected error: {}", e),
            }
        }

        assert_eq!(delays, vec![5_000, 10_000, 20_000, 40_000, 80_000]);
        // Initial dial plus five reconnects, no sixth automatic attempt.
        assert_eq!(dialer.dial_count(), 6);

        tokio::time::advance(Duration::from_secs(3_600)).await;
        assert!(rx.try_recv().is_err());
        assert_eq!(manager.state(), ConnectionState::Closed);
    }

    #[tokio::test]
    async fn test_keep_alive_sends_ping_only_when_open() {
        let (mut manager, _rx, dialer) = test_manager();
        assert!(!manager.keep_alive());

        manager.connect();
        assert!(!manager.keep_alive());

        let id = manager.current_connection().unwrap();
        manager.on_opened(id);
        assert!(manager.keep_alive());
        assert_eq!(dialer.sent_frames(0), vec![r#"{"type":"ping"}"#.to_string()]);

        manager.on_lost(id, "gone");
        assert!(!manager.keep_alive());
        assert_eq!(manager.reconnect_state().attempt_count(), 1);
    }
}
