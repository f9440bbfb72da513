//! Connection identity, state, and signals.

use crate::{TransportError, TransportResult};
use std::fmt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Identity of one physical connection. Every reconnect gets a new id, so
/// signals from a superseded socket can be told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(pub u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Closed,
    Connecting,
    Open,
}

/// Signal posted by a connection driver or a reconnect timer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportSignal {
    /// The socket finished its handshake.
    Opened(ConnectionId),
    /// A text frame arrived. Stamped by the driver when read off the socket.
    Frame {
        connection: ConnectionId,
        text: String,
        received_at: Instant,
    },
    /// The remote side or the network closed the socket.
    Closed {
        connection: ConnectionId,
        reason: Option<String>,
    },
    /// Dialing or I/O failed.
    Failed { connection: ConnectionId, error: String },
    /// A scheduled reconnect delay elapsed.
    ReconnectDue,
}

/// Physical socket handle owned by a connection: the outbound frame queue
/// of the driver task. Dropping the handle stops the driver.
#[derive(Debug)]
pub struct ConnectionHandle {
    outbound: mpsc::UnboundedSender<String>,
    task: Option<JoinHandle<()>>,
}

impl ConnectionHandle {
    pub fn new(outbound: mpsc::UnboundedSender<String>, task: Option<JoinHandle<()>>) -> Self {
        Self { outbound, task }
    }

    /// Queue a text frame for the socket.
    pub fn send_text(&self, text: String) -> TransportResult<()> {
        self.outbound
            .send(text)
            .map_err(|e| TransportError::Send(e.to_string()))
    }
}

impl Drop for ConnectionHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// One logical connection. Replaced, never reused, on reconnect.
#[derive(Debug)]
pub(crate) struct Connection {
    pub(crate) id: ConnectionId,
    pub(crate) state: ConnectionState,
    pub(crate) handle: ConnectionHandle,
}
