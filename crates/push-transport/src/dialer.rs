//! Physical connection drivers.

use crate::{ConnectionHandle, ConnectionId, TransportSignal};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};

/// Opens physical connections on behalf of the connection manager.
///
/// A dialer starts the connection in the background and reports progress
/// through `signals`, tagging every signal with `connection`. Exactly one
/// of `Closed`/`Failed` is posted when the connection ends.
pub trait Dialer: Send + Sync {
    fn dial(
        &self,
        url: &str,
        connection: ConnectionId,
        signals: mpsc::UnboundedSender<TransportSignal>,
    ) -> ConnectionHandle;
}

/// WebSocket dialer backed by tokio-tungstenite.
#[derive(Debug, Clone, Copy, Default)]
pub struct WsDialer;

impl Dialer for WsDialer {
    fn dial(
        &self,
        url: &str,
        connection: ConnectionId,
        signals: mpsc::UnboundedSender<TransportSignal>,
    ) -> ConnectionHandle {
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel::<String>();
        let url = url.to_string();
        let task = tokio::spawn(drive_socket(url, connection, signals, outbound_rx));
        ConnectionHandle::new(outbound_tx, Some(task))
    }
}

/// Run one WebSocket connection until it closes or fails.
async fn drive_socket(
    url: String,
    connection: ConnectionId,
    signals: mpsc::UnboundedSender<TransportSignal>,
    mut outbound: mpsc::UnboundedReceiver<String>,
) {
    info!(url = %url, connection = %connection, "Connecting to push endpoint");

    let ws_stream = match connect_async(url.as_str()).await {
        Ok((ws_stream, _)) => ws_stream,
        Err(e) => {
            warn!(connection = %connection, error = %e, "Push endpoint connect failed");
            let _ = signals.send(TransportSignal::Failed {
                connection,
                error: e.to_string(),
            });
            return;
        }
    };

    let _ = signals.send(TransportSignal::Opened(connection));
    let (mut write, mut read) = ws_stream.split();

    let ending = loop {
        tokio::select! {
            frame = outbound.recv() => match frame {
                Some(text) => {
                    if let Err(e) = write.send(Message::Text(text.into())).await {
                        break TransportSignal::Failed { connection, error: e.to_string() };
                    }
                }
                None => {
                    // Manager dropped the handle; nobody is listening anymore.
                    let _ = write.close().await;
                    return;
                }
            },
            message = read.next() => match message {
                Some(Ok(Message::Text(text))) => {
                    let _ = signals.send(TransportSignal::Frame {
                        connection,
                        text: text.to_string(),
                        received_at: Instant::now(),
                    });
                }
                Some(Ok(Message::Ping(data))) => {
                    if let Err(e) = write.send(Message::Pong(data)).await {
                        break TransportSignal::Failed { connection, error: e.to_string() };
                    }
                }
                Some(Ok(Message::Close(frame))) => {
                    let reason = frame.map(|f| f.reason.to_string());
                    break TransportSignal::Closed { connection, reason };
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    break TransportSignal::Failed { connection, error: e.to_string() };
                }
                None => break TransportSignal::Closed { connection, reason: None },
            },
        }
    };

    debug!(connection = %connection, signal = ?ending, "Push connection ended");
    let _ = signals.send(ending);
}
