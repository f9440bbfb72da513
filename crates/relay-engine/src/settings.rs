//! Engine settings derived from the host configuration.

use crate::EngineResult;
use consumer_outbox::{FallbackTemplate, MAX_RETRY_COUNT};
use oauth_callback::OAuthCallbackConfig;
use push_transport::TransportConfig;
use relay_config_and_utils::Config;
use std::time::Duration;

/// Everything the engine needs to know up front.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub transport: TransportConfig,
    pub keep_alive_interval: Duration,
    pub throttle_window: Duration,
    pub max_retry_count: u32,
    pub fallback: FallbackTemplate,
    pub oauth: OAuthCallbackConfig,
}

impl EngineSettings {
    /// Built-in values for the given endpoint.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            transport: TransportConfig::new(url),
            keep_alive_interval: Duration::from_millis(30_000),
            throttle_window: Duration::from_millis(2_000),
            max_retry_count: MAX_RETRY_COUNT,
            fallback: FallbackTemplate::default(),
            oauth: OAuthCallbackConfig::default(),
        }
    }

    pub fn from_config(config: &Config) -> EngineResult<Self> {
        config.validate()?;

        Ok(Self {
            transport: TransportConfig {
                url: config.endpoint_url.clone(),
                reconnect_base_delay: config.reconnect_base_delay(),
                max_reconnect_attempts: config.max_reconnect_attempts,
            },
            keep_alive_interval: config.keep_alive_interval(),
            throttle_window: config.throttle_window(),
            max_retry_count: config.max_retry_count,
            fallback: FallbackTemplate {
                icon_url: config.notification_icon.clone(),
                title: config.notification_title.clone(),
            },
            oauth: OAuthCallbackConfig {
                redirect_marker: config.oauth_redirect_marker.clone(),
                post_login_url: config.post_login_url.clone(),
            },
        })
    }
}
