//! Configuration, paths, and logging for the Season relay host.

mod config;
mod error;
mod logging;
mod paths;

pub use config::{Config, DEFAULT_ENDPOINT_URL, DEFAULT_LOG_LEVEL};
pub use error::{CoreError, CoreResult};
pub use logging::{init_logging, parse_level};
pub use paths::Paths;
