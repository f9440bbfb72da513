//! Host initialization.

use crate::app::bridge::{read_loop, write_loop, HostBridge};
use credential_storage::FileCredentialStore;
use push_transport::WsDialer;
use relay_config_and_utils::{Config, Paths};
use relay_engine::{Collaborators, EngineSettings, HostSignal, RelayEngine};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Capacity of the browser-to-engine signal queue.
const HOST_SIGNAL_CAPACITY: usize = 256;

/// Serve the browser over stdin/stdout until it disconnects.
pub async fn run_host(config: Config, paths: Paths) -> Result<(), Box<dyn std::error::Error>> {
    info!(
        endpoint = %config.endpoint_url,
        base_dir = %paths.base_dir().display(),
        "Starting Season relay host"
    );

    let settings = EngineSettings::from_config(&config)?;

    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
    let bridge = Arc::new(HostBridge::new(
        outbound_tx,
        config.consumer_reply_timeout(),
    ));

    let collaborators = Collaborators {
        dialer: Arc::new(WsDialer),
        consumers: bridge.clone(),
        notifier: bridge.clone(),
        navigator: bridge.clone(),
        credentials: Arc::new(FileCredentialStore::new(paths.credentials_file())),
    };

    let (signals_tx, signals_rx) = mpsc::channel(HOST_SIGNAL_CAPACITY);

    let writer = tokio::spawn(async move {
        if let Err(e) = write_loop(tokio::io::stdout(), outbound_rx).await {
            warn!(error = %e, "Browser writer stopped");
        }
    });

    let reader = tokio::spawn({
        let bridge = bridge.clone();
        let signals = signals_tx.clone();
        async move {
            if let Err(e) = read_loop(tokio::io::stdin(), bridge, signals).await {
                warn!(error = %e, "Browser reader stopped");
            }
        }
    });

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted");
            let _ = signals_tx.send(HostSignal::Shutdown).await;
        }
    });

    let mut engine = RelayEngine::new(settings, collaborators);
    engine.run(signals_rx).await?;

    reader.abort();
    writer.abort();
    info!("Season relay host stopped");
    Ok(())
}
