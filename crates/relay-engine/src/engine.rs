//! The relay engine task.

use crate::{EngineError, EngineResult, EngineSettings, HostSignal};
use consumer_outbox::{ConsumerChannel, DrainReport, Notifier, Outbox};
use credential_storage::CredentialStore;
use oauth_callback::{Navigator, OAuthCallbackHandler};
use push_transport::{
    Admission, ConnectionManager, Dialer, FrameDecoder, TransportSignal, TransportUpdate,
};
use relay_protocol_types::{ConsumerHandle, ConsumerMessage, UserNotification};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

/// Message shown when the OAuth handshake fails.
const AUTH_FAILED_MESSAGE: &str = "Authentication failed. Please try again.";

/// External collaborators the engine talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub dialer: Arc<dyn Dialer>,
    pub consumers: Arc<dyn ConsumerChannel>,
    pub notifier: Arc<dyn Notifier>,
    pub navigator: Arc<dyn Navigator>,
    pub credentials: Arc<dyn CredentialStore>,
}

/// Process-wide relay state: starts with an empty queue, an empty registry
/// and zero reconnect attempts.
pub struct RelayEngine {
    transport: ConnectionManager,
    transport_rx: Option<mpsc::UnboundedReceiver<TransportSignal>>,
    decoder: FrameDecoder,
    outbox: Outbox,
    oauth: Arc<OAuthCallbackHandler>,
    consumers: Arc<dyn ConsumerChannel>,
    notifier: Arc<dyn Notifier>,
    keep_alive_interval: Duration,
}

impl RelayEngine {
    pub fn new(settings: EngineSettings, collaborators: Collaborators) -> Self {
        let (transport, transport_rx) =
            ConnectionManager::new(settings.transport, collaborators.dialer);

        let outbox = Outbox::new(
            collaborators.consumers.clone(),
            collaborators.notifier.clone(),
        )
        .with_fallback(settings.fallback)
        .with_max_retry_count(settings.max_retry_count);

        let oauth = OAuthCallbackHandler::new(
            settings.oauth,
            collaborators.credentials,
            collaborators.navigator,
        );

        Self {
            transport,
            transport_rx: Some(transport_rx),
            decoder: FrameDecoder::new(settings.throttle_window),
            outbox,
            oauth: Arc::new(oauth),
            consumers: collaborators.consumers,
            notifier: collaborators.notifier,
            keep_alive_interval: settings.keep_alive_interval,
        }
    }

    pub fn transport(&self) -> &ConnectionManager {
        &self.transport
    }

    pub fn outbox(&self) -> &Outbox {
        &self.outbox
    }

    /// Connect and serve signals until `Shutdown` or the host channel closes.
    pub async fn run(&mut self, mut host: mpsc::Receiver<HostSignal>) -> EngineResult<()> {
        let mut transport_rx = self.transport_rx.take().ok_or(EngineError::AlreadyRunning)?;

        info!("Relay engine starting");
        self.transport.connect();

        let mut keep_alive = tokio::time::interval_at(
            Instant::now() + self.keep_alive_interval,
            self.keep_alive_interval,
        );
        keep_alive.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                Some(signal) = transport_rx.recv() => {
                    self.handle_transport(signal).await;
                }
                signal = host.recv() => match signal {
                    Some(HostSignal::Shutdown) | None => break,
                    Some(signal) => self.handle_host(signal).await,
                },
                _ = keep_alive.tick() => {
                    self.keep_alive();
                }
            }
        }

        info!(pending = self.outbox.queue().len(), "Relay engine stopped");
        Ok(())
    }

    /// Apply one transport signal.
    pub async fn handle_transport(&mut self, signal: TransportSignal) {
        match self.transport.handle_signal(signal) {
            TransportUpdate::Opened(connection) => {
                debug!(connection = %connection, "Throttle window reset");
                self.decoder.reset();
            }
            TransportUpdate::Frame { text, received_at } => {
                self.handle_frame(&text, received_at).await
            }
            TransportUpdate::Lost(Ok(_)) => {}
            TransportUpdate::Lost(Err(e)) => {
                error!(error = %e, "Push transport stopped reconnecting");
            }
            TransportUpdate::Redialed(_) | TransportUpdate::Ignored => {}
        }
    }

    async fn handle_frame(&mut self, raw: &str, received_at: Instant) {
        match self.decoder.decode(raw, received_at) {
            Ok(Admission::Accepted(event)) => {
                info!(payload = %event.payload(), "Accepted push event");
                let report = self.outbox.admit(event).await;
                log_report(&report);
            }
            Ok(Admission::Throttled) => {}
            Err(e) => warn!(error = %e, "Discarded inbound frame"),
        }
    }

    /// Apply one host signal.
    pub async fn handle_host(&mut self, signal: HostSignal) {
        match signal {
            HostSignal::ConsumerReady(handle) => {
                let report = self.outbox.mark_ready(handle).await;
                log_report(&report);
            }
            HostSignal::ConsumerGone(handle) => {
                self.outbox.mark_gone(&handle);
            }
            HostSignal::Navigation {
                target,
                url,
                load_complete,
            } => {
                if load_complete {
                    self.prompt_readiness(target.clone());
                }
                if let Some(url) = url.filter(|u| self.oauth.is_callback(u)) {
                    self.spawn_oauth(target, url);
                }
            }
            HostSignal::Shutdown => {}
        }
    }

    /// Send a liveness ping if connected.
    pub fn keep_alive(&self) -> bool {
        self.transport.keep_alive()
    }

    /// Sent from its own task; the engine does not wait for the reply.
    fn prompt_readiness(&self, target: ConsumerHandle) {
        let consumers = self.consumers.clone();
        tokio::spawn(async move {
            if let Err(e) = consumers
                .send(&target, &ConsumerMessage::CheckContentScriptReady)
                .await
            {
                debug!(consumer = %target, error = %e, "Readiness prompt not delivered");
            }
        });
    }

    fn spawn_oauth(&self, target: ConsumerHandle, url: String) {
        info!(target = %target, "OAuth redirect detected");

        let oauth = self.oauth.clone();
        let notifier = self.notifier.clone();
        let failure = self.outbox.fallback().render(AUTH_FAILED_MESSAGE);

        tokio::spawn(async move {
            if let Err(e) = oauth.finish(&url, &target).await {
                error!(target = %target, error = %e, "OAuth callback failed");
                notify_failure(notifier.as_ref(), failure).await;
            }
        });
    }
}

async fn notify_failure(notifier: &dyn Notifier, notification: UserNotification) {
    if let Err(e) = notifier.notify(notification).await {
        warn!(error = %e, "Could not notify user of authentication failure");
    }
}

fn log_report(report: &DrainReport) {
    for failure in &report.failures {
        error!(error = %failure, "Delivery failed");
    }
    if !report.is_clean() || report.requeued > 0 {
        debug!(
            delivered = report.delivered,
            fallback = report.fallback,
            requeued = report.requeued,
            send_failures = report.send_failures.len(),
            "Drain finished with failures"
        );
    }
}
