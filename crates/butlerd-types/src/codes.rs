//! Error codes carried by `WireError` replies.
//!
//! The standard JSON-RPC 2.0 codes are exposed as constants. Daemon-specific
//! conditions that clients are expected to handle uniformly are modelled by
//! [`DaemonCode`].

use std::fmt;

/// Invalid JSON was received.
pub const PARSE_ERROR: i64 = -32700;
/// The JSON sent is not a valid request object.
pub const INVALID_REQUEST: i64 = -32600;
/// The method does not exist or is not available.
pub const METHOD_NOT_FOUND: i64 = -32601;
/// Invalid method parameters.
pub const INVALID_PARAMS: i64 = -32602;
/// Internal JSON-RPC error.
pub const INTERNAL_ERROR: i64 = -32603;

/// Daemon-specific error codes with fixed messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DaemonCode {
    /// The operation was cancelled at the caller's request.
    OperationCancelled,
    /// Connectivity to a remote service was lost.
    NetworkDisconnected,
}

impl DaemonCode {
    /// Returns the numeric wire code.
    #[must_use]
    pub const fn code(self) -> i64 {
        match self {
            Self::OperationCancelled => 499,
            Self::NetworkDisconnected => 9000,
        }
    }

    /// Returns the fixed human-readable message sent with the code.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::OperationCancelled => "An operation was cancelled",
            Self::NetworkDisconnected => "Network disconnected",
        }
    }
}

impl fmt::Display for DaemonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(DaemonCode::OperationCancelled, 499)]
    #[case(DaemonCode::NetworkDisconnected, 9000)]
    fn daemon_codes_are_stable(#[case] code: DaemonCode, #[case] expected: i64) {
        assert_eq!(code.code(), expected);
    }

    #[rstest]
    fn display_uses_fixed_message() {
        assert_eq!(
            DaemonCode::NetworkDisconnected.to_string(),
            "Network disconnected"
        );
    }
}
