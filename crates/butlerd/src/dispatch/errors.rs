//! Registration faults.

use std::fmt;

use thiserror::Error;

/// Method table a handler is registered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerKind {
    /// Handlers that produce a reply.
    Request,
    /// Handlers whose messages are never answered.
    Notification,
}

impl fmt::Display for HandlerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Request => f.write_str("request"),
            Self::Notification => f.write_str("notification"),
        }
    }
}

/// Wiring faults detected while building a router. The router panics with
/// their message.
#[derive(Debug, Error)]
pub enum RegistrationError {
    /// The method already has a handler in the same table.
    #[error("{kind} handler for '{method}' is already registered")]
    DuplicateMethod {
        /// Method name.
        method: String,
        /// Table the method was registered in.
        kind: HandlerKind,
    },
}

impl RegistrationError {
    pub(crate) fn duplicate(method: impl Into<String>, kind: HandlerKind) -> Self {
        Self::DuplicateMethod {
            method: method.into(),
            kind,
        }
    }
}
