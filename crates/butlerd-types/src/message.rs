//! Inbound JSON-RPC 2.0 message envelope.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Transport-provided request identifier.
///
/// JSON-RPC allows either a number or a string; both are preserved so the
/// reply echoes exactly what the caller sent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    /// Numeric identifier.
    Number(i64),
    /// String identifier.
    String(String),
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(id) => write!(f, "{id}"),
            Self::String(id) => f.write_str(id),
        }
    }
}

impl From<i64> for RequestId {
    fn from(id: i64) -> Self {
        Self::Number(id)
    }
}

impl From<&str> for RequestId {
    fn from(id: &str) -> Self {
        Self::String(id.to_owned())
    }
}

/// One inbound message delivered by the transport.
///
/// A message without an `id` is a notification: it is routed to the
/// notification table and never answered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Request identifier; absent for notifications.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RequestId>,
    /// Method name.
    pub method: String,
    /// Raw parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl InboundMessage {
    /// Builds a request expecting a reply.
    pub fn request(id: impl Into<RequestId>, method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            id: Some(id.into()),
            method: method.into(),
            params,
        }
    }

    /// Builds a notification.
    pub fn notification(method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            id: None,
            method: method.into(),
            params,
        }
    }

    /// Returns true when no reply is expected.
    #[must_use]
    pub const fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[rstest]
    fn message_without_id_is_notification() {
        let message: InboundMessage =
            serde_json::from_str(r#"{"jsonrpc":"2.0","method":"CancelAll"}"#).expect("parse");
        assert!(message.is_notification());
        assert!(message.params.is_none());
    }

    #[rstest]
    #[case(r#"{"jsonrpc":"2.0","id":7,"method":"Version.Get"}"#, RequestId::Number(7))]
    #[case(
        r#"{"jsonrpc":"2.0","id":"abc","method":"Version.Get"}"#,
        RequestId::String(String::from("abc"))
    )]
    fn request_ids_keep_their_shape(#[case] input: &str, #[case] expected: RequestId) {
        let message: InboundMessage = serde_json::from_str(input).expect("parse");
        assert_eq!(message.id, Some(expected));
        assert!(!message.is_notification());
    }

    #[rstest]
    fn request_id_display_matches_raw_value() {
        assert_eq!(RequestId::from(42).to_string(), "42");
        assert_eq!(RequestId::from("call-1").to_string(), "call-1");
    }

    #[rstest]
    fn constructors_keep_params() {
        let message = InboundMessage::request(1, "Install.Queue", Some(json!({"gameId": 3})));
        assert_eq!(message.params, Some(json!({"gameId": 3})));
    }
}
