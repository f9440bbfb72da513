//! Direct user-visible notifications.

use serde::{Deserialize, Serialize};

/// A platform notification raised when no consumer can take a delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserNotification {
    #[serde(rename = "type")]
    pub kind: String,
    pub icon_url: String,
    pub title: String,
    pub message: String,
}

impl UserNotification {
    /// Basic notification with a fixed icon and title.
    pub fn basic(icon_url: &str, title: &str, message: impl Into<String>) -> Self {
        Self {
            kind: "basic".to_string(),
            icon_url: icon_url.to_string(),
            title: title.to_string(),
            message: message.into(),
        }
    }
}
