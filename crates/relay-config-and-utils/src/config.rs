//! Configuration management for the relay host.

use crate::{CoreError, CoreResult, Paths};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Push endpoint (can be overridden at compile time via SEASON_RELAY_ENDPOINT env var).
pub const DEFAULT_ENDPOINT_URL: &str = match option_env!("SEASON_RELAY_ENDPOINT") {
    Some(url) => url,
    None => "wss://websocket-sijan-6acdf23abc98.herokuapp.com",
};

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Main relay host configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// Push endpoint URL. Compile-time only; file values are discarded on load.
    pub endpoint_url: String,
    /// Base reconnect delay in milliseconds.
    pub reconnect_base_delay_ms: u64,
    /// Maximum automatic reconnect attempts.
    pub max_reconnect_attempts: u32,
    /// Keep-alive ping period in milliseconds.
    pub keep_alive_interval_ms: u64,
    /// Inbound event throttle window in milliseconds.
    pub throttle_window_ms: u64,
    /// Maximum failed consumer sends before an item is dropped.
    pub max_retry_count: u32,
    /// How long to wait for the browser to report a command outcome.
    pub consumer_reply_timeout_ms: u64,
    /// Substring identifying the identity provider's redirect URL.
    pub oauth_redirect_marker: String,
    /// Where a tab is sent after a successful login.
    pub post_login_url: String,
    /// Title of direct user notifications.
    pub notification_title: String,
    /// Icon of direct user notifications.
    pub notification_icon: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            endpoint_url: DEFAULT_ENDPOINT_URL.to_string(),
            reconnect_base_delay_ms: 5_000,
            max_reconnect_attempts: 5,
            keep_alive_interval_ms: 30_000,
            throttle_window_ms: 2_000,
            max_retry_count: 5,
            consumer_reply_timeout_ms: 5_000,
            oauth_redirect_marker: ".chromiumapp.org/".to_string(),
            post_login_url: "https://www.season.codes".to_string(),
            notification_title: "Notification".to_string(),
            notification_icon: "icon.png".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the config file, falling back to defaults.
    /// The endpoint URL always uses the built-in value.
    pub fn load(paths: &Paths) -> CoreResult<Self> {
        let config_path = paths.config_file();

        let mut config = if config_path.exists() {
            Self::load_from_file(&config_path)?
        } else {
            Self::default()
        };

        config.endpoint_url = DEFAULT_ENDPOINT_URL.to_string();
        config.load_from_env();
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a file.
    pub fn save(&self, paths: &Paths) -> CoreResult<()> {
        paths.ensure_dirs()?;
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(paths.config_file(), content)?;
        Ok(())
    }

    /// Only the log level can be overridden at runtime.
    fn load_from_env(&mut self) {
        if let Ok(log_level) = std::env::var("SEASON_RELAY_LOG_LEVEL") {
            self.log_level = log_level;
        }
    }

    /// Reject values that would disable the delivery guarantees.
    pub fn validate(&self) -> CoreResult<()> {
        if self.max_retry_count == 0 {
            return Err(CoreError::Config(
                "max_retry_count must be at least 1".to_string(),
            ));
        }
        if self.keep_alive_interval_ms == 0 {
            return Err(CoreError::Config(
                "keep_alive_interval_ms must be non-zero".to_string(),
            ));
        }
        if self.oauth_redirect_marker.is_empty() {
            return Err(CoreError::Config(
                "oauth_redirect_marker must not be empty".to_string(),
            ));
        }
        self.endpoint_url()?;
        Ok(())
    }

    /// Get the endpoint URL as a parsed URL.
    pub fn endpoint_url(&self) -> CoreResult<Url> {
        Url::parse(&self.endpoint_url).map_err(CoreError::from)
    }

    pub fn reconnect_base_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_base_delay_ms)
    }

    pub fn keep_alive_interval(&self) -> Duration {
        Duration::from_millis(self.keep_alive_interval_ms)
    }

    pub fn throttle_window(&self) -> Duration {
        Duration::from_millis(self.throttle_window_ms)
    }

    pub fn consumer_reply_timeout(&self) -> Duration {
        Duration::from_millis(self.consumer_reply_timeout_ms)
    }
}
