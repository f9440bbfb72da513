//! Wire and data types shared by the Season relay host crates.
//!
//! Everything here is plain data:
//! - `ConsumerHandle`: opaque id of a local consumer (a browser tab)
//! - `Event`: an accepted push notification
//! - Consumer messages exchanged with content scripts
//! - Push endpoint frames
//! - Native-messaging envelopes exchanged with the browser side

mod bridge;
mod consumer;
mod event;
mod handle;
mod notification;
mod push;

pub use bridge::{HostInbound, HostOutbound, LOAD_STATUS_COMPLETE};
pub use consumer::{ConsumerMessage, ConsumerRequest, OtpData};
pub use event::{Event, EventKind};
pub use handle::ConsumerHandle;
pub use notification::UserNotification;
pub use push::OutboundFrame;
