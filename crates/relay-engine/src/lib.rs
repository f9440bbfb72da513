//! Relay engine: the single owner of the Season relay host's state.
//!
//! One task owns the push connection, the frame decoder, the consumer
//! registry and the delivery queue. Transport signals, host signals from
//! the browser bridge and the keep-alive timer are multiplexed into that
//! task and handled one at a time.

mod engine;
mod error;
mod settings;
mod signal;

#[cfg(test)]
mod tests;

pub use engine::{Collaborators, RelayEngine};
pub use error::{EngineError, EngineResult};
pub use settings::EngineSettings;
pub use signal::HostSignal;
