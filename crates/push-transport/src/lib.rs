//! Push endpoint transport for the Season relay host.
//!
//! This crate provides:
//! - ConnectionManager: single WebSocket connection with exponential-backoff
//!   reconnection and keep-alive pings
//! - WsDialer: tokio-tungstenite driver for one physical connection
//! - FrameDecoder: inbound frame parsing with a leading-edge throttle

mod connection;
mod decoder;
mod dialer;
mod error;
mod manager;
mod reconnect;

pub use connection::{ConnectionHandle, ConnectionId, ConnectionState, TransportSignal};
pub use decoder::{Admission, FrameDecoder, HISTORY_ID_FIELD};
pub use dialer::{Dialer, WsDialer};
pub use error::{DecodeError, TransportError, TransportResult};
pub use manager::{ConnectionManager, TransportConfig, TransportUpdate};
pub use reconnect::ReconnectState;
