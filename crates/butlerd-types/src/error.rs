//! Structured protocol errors and their encoded wire form.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::codes::{INVALID_PARAMS, METHOD_NOT_FOUND};

/// Key under which the rendered failure detail is stored in `WireError::data`.
pub const DATA_STACK_KEY: &str = "stack";

/// Key under which the daemon version is stored in `WireError::data`.
pub const DATA_VERSION_KEY: &str = "butlerVersion";

/// A failure that carries its own wire code, message and structured data.
///
/// Handlers return (or wrap) this type when the caller should see a specific
/// code rather than a generic internal error. The dispatcher surfaces it
/// verbatim.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct RpcError {
    code: i64,
    message: String,
    data: Option<Map<String, Value>>,
}

impl RpcError {
    /// Creates a protocol error with no attached data.
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Creates the "method not found" error for `method`.
    pub fn method_not_found(method: &str) -> Self {
        Self::new(METHOD_NOT_FOUND, format!("Method '{method}' not found"))
    }

    /// Creates an "invalid params" error with the given description.
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(INVALID_PARAMS, message)
    }

    /// Attaches one structured data field, replacing any previous value.
    #[must_use]
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }

    /// Returns the wire code.
    #[must_use]
    pub const fn code(&self) -> i64 {
        self.code
    }

    /// Returns the message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the structured data, if any was attached.
    #[must_use]
    pub const fn data(&self) -> Option<&Map<String, Value>> {
        self.data.as_ref()
    }
}

/// The error object sent back to a caller when a request fails.
///
/// Serialises to the JSON-RPC 2.0 error shape
/// `{"code": .., "message": .., "data": {..}}`. The dispatcher always
/// populates [`DATA_STACK_KEY`] and [`DATA_VERSION_KEY`] in `data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireError {
    /// Numeric error code.
    pub code: i64,
    /// Human-readable message.
    pub message: String,
    /// Diagnostic and handler-supplied fields.
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl WireError {
    /// Creates a wire error with empty data.
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: Map::new(),
        }
    }

    /// Returns the rendered failure detail, when present.
    #[must_use]
    pub fn stack(&self) -> Option<&str> {
        self.data.get(DATA_STACK_KEY).and_then(Value::as_str)
    }

    /// Returns the daemon version recorded in the error, when present.
    #[must_use]
    pub fn butler_version(&self) -> Option<&str> {
        self.data.get(DATA_VERSION_KEY).and_then(Value::as_str)
    }
}

impl From<RpcError> for WireError {
    fn from(error: RpcError) -> Self {
        Self {
            code: error.code,
            message: error.message,
            data: error.data.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[rstest]
    fn method_not_found_names_method() {
        let error = RpcError::method_not_found("Fetch.Game");
        assert_eq!(error.code(), METHOD_NOT_FOUND);
        assert_eq!(error.to_string(), "Method 'Fetch.Game' not found");
    }

    #[rstest]
    fn with_data_accumulates_fields() {
        let error = RpcError::new(2001, "no compatible uploads")
            .with_data("gameId", 12)
            .with_data("platform", "linux");
        let data = error.data().expect("data present");
        assert_eq!(data.get("gameId"), Some(&json!(12)));
        assert_eq!(data.get("platform"), Some(&json!("linux")));
    }

    #[rstest]
    fn wire_error_serialises_json_rpc_shape() {
        let mut wire = WireError::new(-32603, "boom");
        wire.data.insert(DATA_STACK_KEY.to_owned(), json!("boom\n"));
        wire.data.insert(DATA_VERSION_KEY.to_owned(), json!("v1.2.3"));

        let value = serde_json::to_value(&wire).expect("serialise");
        assert_eq!(
            value,
            json!({
                "code": -32603,
                "message": "boom",
                "data": {"stack": "boom\n", "butlerVersion": "v1.2.3"}
            })
        );
        assert_eq!(wire.stack(), Some("boom\n"));
        assert_eq!(wire.butler_version(), Some("v1.2.3"));
    }

    #[rstest]
    fn deserialises_error_without_data() {
        let wire: WireError =
            serde_json::from_str(r#"{"code":-32601,"message":"Method 'x' not found"}"#)
                .expect("parse");
        assert!(wire.data.is_empty());
        assert!(wire.stack().is_none());
    }
}
