//! Mapping of handler failures onto wire error objects.

use std::error::Error as StdError;
use std::io;

use butlerd_types::{
    DATA_STACK_KEY, DATA_VERSION_KEY, DaemonCode, INTERNAL_ERROR, RpcError, WireError,
};
use serde_json::Value;
use thiserror::Error;

use crate::cancel::Cancelled;
use crate::version::VersionInfo;

/// Marker that remote-client implementations attach to connectivity failures.
#[derive(Debug, Error)]
#[error("network unavailable: {message}")]
pub struct NetworkError {
    message: String,
}

impl NetworkError {
    /// Creates a marker with a description of the failure.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Produces the wire error for `error`, first matching rule wins:
///
/// 1. an [`RpcError`] anywhere in the chain is used verbatim;
/// 2. a connectivity failure maps to [`DaemonCode::NetworkDisconnected`];
/// 3. a [`Cancelled`] root cause maps to [`DaemonCode::OperationCancelled`];
/// 4. anything else is an internal error carrying the rendered chain.
///
/// `data.stack` and `data.butlerVersion` are always set, alongside any
/// fields an [`RpcError`] attached.
#[must_use]
pub fn classify(error: &anyhow::Error, versions: &VersionInfo) -> WireError {
    let protocol = error
        .chain()
        .find_map(|cause| cause.downcast_ref::<RpcError>());
    let mut wire = if let Some(rpc) = protocol {
        WireError::from(rpc.clone())
    } else if is_network_failure(error) {
        daemon_error(DaemonCode::NetworkDisconnected)
    } else if error.root_cause().is::<Cancelled>() {
        daemon_error(DaemonCode::OperationCancelled)
    } else {
        WireError::new(INTERNAL_ERROR, format!("{error:#}"))
    };

    wire.data
        .insert(DATA_STACK_KEY.to_owned(), Value::String(format!("{error:?}")));
    wire.data.insert(
        DATA_VERSION_KEY.to_owned(),
        Value::String(versions.version_string().to_owned()),
    );
    wire
}

fn daemon_error(code: DaemonCode) -> WireError {
    WireError::new(code.code(), code.message())
}

fn is_network_failure(error: &anyhow::Error) -> bool {
    error.chain().any(is_network_cause)
}

fn is_network_cause(cause: &(dyn StdError + 'static)) -> bool {
    if cause.is::<NetworkError>() {
        return true;
    }
    cause
        .downcast_ref::<io::Error>()
        .is_some_and(|io_error| is_connectivity_kind(io_error.kind()))
}

const fn is_connectivity_kind(kind: io::ErrorKind) -> bool {
    matches!(
        kind,
        io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::NotConnected
            | io::ErrorKind::TimedOut
            | io::ErrorKind::BrokenPipe
            | io::ErrorKind::HostUnreachable
            | io::ErrorKind::NetworkUnreachable
            | io::ErrorKind::NetworkDown
            | io::ErrorKind::AddrNotAvailable
    )
}
