//! Native-messaging envelopes exchanged with the browser side.
//!
//! The browser forwards runtime messages, tab removals and tab updates as
//! [`HostInbound`] frames and executes the [`HostOutbound`] commands the
//! host writes back. Commands that can fail carry a `requestId`; the
//! browser answers each of them with exactly one [`HostInbound::Result`].

use crate::{ConsumerHandle, ConsumerMessage, ConsumerRequest, UserNotification};
use serde::{Deserialize, Serialize};

/// Tab status reported once a page finished loading.
pub const LOAD_STATUS_COMPLETE: &str = "complete";

/// Frame received from the browser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum HostInbound {
    /// A runtime message from an extension page. `tab_id` is absent for
    /// senders that are not tabs (e.g. the popup).
    #[serde(rename_all = "camelCase")]
    ConsumerMessage {
        #[serde(default)]
        tab_id: Option<ConsumerHandle>,
        message: ConsumerRequest,
    },
    /// A tab was closed.
    #[serde(rename_all = "camelCase")]
    TabRemoved { tab_id: ConsumerHandle },
    /// A tab changed load status and/or URL.
    #[serde(rename_all = "camelCase")]
    TabUpdated {
        tab_id: ConsumerHandle,
        #[serde(default)]
        status: Option<String>,
        #[serde(default)]
        url: Option<String>,
    },
    /// Outcome of a command carrying `request_id`. `error` mirrors the
    /// browser's last-error slot: absent means success.
    #[serde(rename_all = "camelCase")]
    Result {
        request_id: u64,
        #[serde(default)]
        error: Option<String>,
    },
}

/// Command written to the browser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum HostOutbound {
    #[serde(rename_all = "camelCase")]
    SendToTab {
        request_id: u64,
        tab_id: ConsumerHandle,
        message: ConsumerMessage,
    },
    #[serde(rename_all = "camelCase")]
    NavigateTab {
        request_id: u64,
        tab_id: ConsumerHandle,
        url: String,
    },
    Notify { notification: UserNotification },
}

impl HostOutbound {
    /// Request id awaiting a `Result`, if this command expects one.
    pub fn request_id(&self) -> Option<u64> {
        match self {
            Self::SendToTab { request_id, .. } | Self::NavigateTab { request_id, .. } => {
                Some(*request_id)
            }
            Self::Notify { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OtpData;

    #[test]
    fn parses_ready_message_from_tab() {
        let frame: HostInbound = serde_json::from_str(
            r#"{"type":"consumerMessage","tabId":12,"message":{"action":"contentScriptReady"}}"#,
        )
        .unwrap();
        assert_eq!(
            frame,
            HostInbound::ConsumerMessage {
                tab_id: Some(ConsumerHandle::from(12i64)),
                message: ConsumerRequest::ContentScriptReady,
            }
        );
    }

    #[test]
    fn parses_message_without_tab() {
        let frame: HostInbound = serde_json::from_str(
            r#"{"type":"consumerMessage","message":{"action":"contentScriptReady"}}"#,
        )
        .unwrap();
        assert!(matches!(frame, HostInbound::ConsumerMessage { tab_id: None, .. }));
    }

    #[test]
    fn parses_tab_updated_with_optional_fields() {
        let frame: HostInbound =
            serde_json::from_str(r#"{"type":"tabUpdated","tabId":3,"status":"complete"}"#).unwrap();
        assert_eq!(
            frame,
            HostInbound::TabUpdated {
                tab_id: ConsumerHandle::from(3i64),
                status: Some(LOAD_STATUS_COMPLETE.to_string()),
                url: None,
            }
        );
    }

    #[test]
    fn parses_result_without_error() {
        let frame: HostInbound =
            serde_json::from_str(r#"{"type":"result","requestId":9}"#).unwrap();
        assert_eq!(
            frame,
            HostInbound::Result {
                request_id: 9,
                error: None
            }
        );
    }

    #[test]
    fn send_to_tab_shape() {
        let command = HostOutbound::SendToTab {
            request_id: 4,
            tab_id: ConsumerHandle::from(8i64),
            message: ConsumerMessage::ShowOtp {
                data: OtpData {
                    otp: "55".to_string(),
                },
            },
        };
        let json = serde_json::to_value(&command).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "sendToTab",
                "requestId": 4,
                "tabId": "8",
                "message": {"action": "showOTP", "data": {"otp": "55"}}
            })
        );
        assert_eq!(command.request_id(), Some(4));
    }

    #[test]
    fn notify_has_no_request_id() {
        let command = HostOutbound::Notify {
            notification: UserNotification::basic("icon.png", "Notification", "hi"),
        };
        assert_eq!(command.request_id(), None);
        let json = serde_json::to_value(&command).unwrap();
        assert_eq!(json["type"], "notify");
    }
}
