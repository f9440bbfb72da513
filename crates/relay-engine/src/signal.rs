//! Signals from the browser side.

use relay_protocol_types::ConsumerHandle;

/// Something the browser reported to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostSignal {
    /// A consumer announced it can take deliveries.
    ConsumerReady(ConsumerHandle),
    /// A consumer went away (tab closed).
    ConsumerGone(ConsumerHandle),
    /// A tab changed URL or finished loading.
    Navigation {
        target: ConsumerHandle,
        url: Option<String>,
        load_complete: bool,
    },
    /// Stop the engine.
    Shutdown,
}
