//! Browser bridge: the engine's collaborators, implemented over the
//! native messaging channel.

use crate::app::frame::{read_json, write_json};
use anyhow::Context;
use async_trait::async_trait;
use consumer_outbox::{ConsumerChannel, ConsumerSendError, Notifier, NotifyError};
use oauth_callback::{NavigationError, Navigator};
use parking_lot::Mutex;
use relay_engine::HostSignal;
use relay_protocol_types::{
    ConsumerHandle, ConsumerMessage, ConsumerRequest, HostInbound, HostOutbound,
    UserNotification, LOAD_STATUS_COMPLETE,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

/// Outcome reported by the browser for one command.
type Reply = Option<String>;

/// Why a bridged command did not succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
enum RequestError {
    Rejected(String),
    Timeout(Duration),
    Disconnected,
}

/// Host side of the native messaging channel.
///
/// Commands are queued to the writer task; commands that expect an answer
/// park a oneshot under their request id until the reader routes the
/// browser's `result` frame back, or the reply timeout elapses.
pub struct HostBridge {
    outbound: mpsc::UnboundedSender<HostOutbound>,
    pending: Mutex<HashMap<u64, oneshot::Sender<Reply>>>,
    next_request_id: AtomicU64,
    reply_timeout: Duration,
}

impl HostBridge {
    pub fn new(
        outbound: mpsc::UnboundedSender<HostOutbound>,
        reply_timeout: Duration,
    ) -> Self {
        Self {
            outbound,
            pending: Mutex::new(HashMap::new()),
            next_request_id: AtomicU64::new(1),
            reply_timeout,
        }
    }

    async fn request(
        &self,
        command: impl FnOnce(u64) -> HostOutbound,
    ) -> Result<(), RequestError> {
        let request_id = self.next_request_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        self.pending.lock().insert(request_id, tx);

        if self.outbound.send(command(request_id)).is_err() {
            self.pending.lock().remove(&request_id);
            return Err(RequestError::Disconnected);
        }

        match tokio::time::timeout(self.reply_timeout, rx).await {
            Ok(Ok(None)) => Ok(()),
            Ok(Ok(Some(error))) => Err(RequestError::Rejected(error)),
            Ok(Err(_)) => Err(RequestError::Disconnected),
            Err(_) => {
                self.pending.lock().remove(&request_id);
                Err(RequestError::Timeout(self.reply_timeout))
            }
        }
    }

    /// Route a browser `result` frame to the waiting command.
    pub fn resolve(&self, request_id: u64, error: Reply) -> bool {
        match self.pending.lock().remove(&request_id) {
            Some(tx) => tx.send(error).is_ok(),
            None => {
                debug!(request_id, "Result for unknown or expired request");
                false
            }
        }
    }

    /// Fail every waiting command. Called when the browser disconnects.
    pub fn disconnect(&self) {
        let pending: Vec<_> = self.pending.lock().drain().collect();
        if !pending.is_empty() {
            debug!(count = pending.len(), "Dropping pending browser requests");
        }
    }

    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }
}

#[async_trait]
impl ConsumerChannel for HostBridge {
    async fn send(
        &self,
        handle: &ConsumerHandle,
        message: &ConsumerMessage,
    ) -> Result<(), ConsumerSendError> {
        self.request(|request_id| HostOutbound::SendToTab {
            request_id,
            tab_id: handle.clone(),
            message: message.clone(),
        })
        .await
        .map_err(|e| match e {
            RequestError::Rejected(error) => ConsumerSendError::Rejected(error),
            RequestError::Timeout(after) => ConsumerSendError::Timeout(after),
            RequestError::Disconnected => ConsumerSendError::Disconnected,
        })
    }
}

#[async_trait]
impl Navigator for HostBridge {
    async fn navigate(&self, target: &ConsumerHandle, url: &str) -> Result<(), NavigationError> {
        self.request(|request_id| HostOutbound::NavigateTab {
            request_id,
            tab_id: target.clone(),
            url: url.to_string(),
        })
        .await
        .map_err(|e| match e {
            RequestError::Rejected(error) => NavigationError(error),
            RequestError::Timeout(after) => {
                NavigationError(format!("no reply within {:?}", after))
            }
            RequestError::Disconnected => NavigationError("browser disconnected".to_string()),
        })
    }
}

#[async_trait]
impl Notifier for HostBridge {
    async fn notify(&self, notification: UserNotification) -> Result<(), NotifyError> {
        self.outbound
            .send(HostOutbound::Notify { notification })
            .map_err(|_| NotifyError("browser disconnected".to_string()))
    }
}

/// Translate one inbound frame. `Result` frames are consumed by the bridge.
fn route_inbound(bridge: &HostBridge, frame: HostInbound) -> Option<HostSignal> {
    match frame {
        HostInbound::ConsumerMessage {
            tab_id: Some(tab_id),
            message: ConsumerRequest::ContentScriptReady,
        } => Some(HostSignal::ConsumerReady(tab_id)),
        HostInbound::ConsumerMessage { tab_id, message } => {
            debug!(tab = ?tab_id, message = ?message, "Ignoring consumer message");
            None
        }
        HostInbound::TabRemoved { tab_id } => Some(HostSignal::ConsumerGone(tab_id)),
        HostInbound::TabUpdated {
            tab_id,
            status,
            url,
        } => Some(HostSignal::Navigation {
            target: tab_id,
            load_complete: status.as_deref() == Some(LOAD_STATUS_COMPLETE),
            url,
        }),
        HostInbound::Result { request_id, error } => {
            bridge.resolve(request_id, error);
            None
        }
    }
}

/// Read browser frames until EOF, forwarding signals to the engine.
///
/// EOF means the browser closed the port; the engine is told to shut down.
pub async fn read_loop<R>(
    mut reader: R,
    bridge: Arc<HostBridge>,
    signals: mpsc::Sender<HostSignal>,
) -> anyhow::Result<()>
where
    R: AsyncRead + Unpin,
{
    let result = async {
        while let Some(frame) = read_json::<_, HostInbound>(&mut reader).await? {
            let frame = match frame {
                Ok(frame) => frame,
                Err(e) => {
                    warn!(error = %e, "Discarding undecodable browser frame");
                    continue;
                }
            };

            if let Some(signal) = route_inbound(&bridge, frame) {
                signals
                    .send(signal)
                    .await
                    .context("engine stopped accepting signals")?;
            }
        }
        info!("Browser closed the native messaging port");
        anyhow::Ok(())
    }
    .await;

    bridge.disconnect();
    let _ = signals.send(HostSignal::Shutdown).await;
    result
}

/// Write queued commands to the browser until the queue closes.
pub async fn write_loop<W>(
    mut writer: W,
    mut outbound: mpsc::UnboundedReceiver<HostOutbound>,
) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(command) = outbound.recv().await {
        debug!(request_id = ?command.request_id(), "Writing command to browser");
        write_json(&mut writer, &command).await?;
    }
    Ok(())
}
