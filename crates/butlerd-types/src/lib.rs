//! Wire-level types shared by the butler daemon and its clients.
//!
//! The daemon speaks JSON-RPC 2.0 over a persistent connection. This crate
//! holds the value types that cross that connection: request identifiers,
//! the inbound message envelope, the error-code taxonomy, the structured
//! protocol error raised by handlers, the encoded error object sent back to
//! callers, and the payload of outbound `Progress` notifications.

mod codes;
mod error;
mod message;
mod progress;

pub use codes::{
    DaemonCode, INTERNAL_ERROR, INVALID_PARAMS, INVALID_REQUEST, METHOD_NOT_FOUND, PARSE_ERROR,
};
pub use error::{DATA_STACK_KEY, DATA_VERSION_KEY, RpcError, WireError};
pub use message::{InboundMessage, RequestId};
pub use progress::ProgressNotification;
