//! Messages exchanged with content-script consumers.

use serde::{Deserialize, Serialize};

/// Code payload of a `showOTP` message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpData {
    pub otp: String,
}

/// Message sent to a consumer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum ConsumerMessage {
    /// Display a received code.
    #[serde(rename = "showOTP")]
    ShowOtp { data: OtpData },
    /// Ask a freshly loaded page to announce readiness.
    #[serde(rename = "checkContentScriptReady")]
    CheckContentScriptReady,
}

/// Message received from a consumer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum ConsumerRequest {
    /// The consumer can accept deliveries.
    #[serde(rename = "contentScriptReady")]
    ContentScriptReady,
    /// Any action this host does not act on.
    #[serde(other)]
    Unknown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_ready_serializes_action_only() {
        let json = serde_json::to_value(ConsumerMessage::CheckContentScriptReady).unwrap();
        assert_eq!(json, serde_json::json!({"action": "checkContentScriptReady"}));
    }

    #[test]
    fn parses_ready_request() {
        let request: ConsumerRequest =
            serde_json::from_str(r#"{"action":"contentScriptReady"}"#).unwrap();
        assert_eq!(request, ConsumerRequest::ContentScriptReady);
    }

    #[test]
    fn ready_request_ignores_extra_fields() {
        let request: ConsumerRequest =
            serde_json::from_str(r#"{"action":"contentScriptReady","url":"https://x"}"#).unwrap();
        assert_eq!(request, ConsumerRequest::ContentScriptReady);
    }

    #[test]
    fn unknown_action_is_tolerated() {
        let request: ConsumerRequest =
            serde_json::from_str(r#"{"action":"somethingElse"}"#).unwrap();
        assert_eq!(request, ConsumerRequest::Unknown);
    }
}
