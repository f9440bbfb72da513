//! Application wiring and lifecycle management.

mod bridge;
mod frame;
mod init;
mod lifecycle;

pub use init::run_host;
pub use lifecycle::{check_status, logout};
