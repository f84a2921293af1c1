//! Panic containment around a single handler invocation.

use std::any::Any;
use std::error::Error as StdError;
use std::io;
use std::panic::{self, AssertUnwindSafe};

use anyhow::anyhow;
use butlerd_types::RpcError;

use super::classify::NetworkError;
use crate::cancel::Cancelled;
use crate::conn::ConnError;
use crate::context::{CallError, ProfileError};
use crate::storage::StorageError;

/// Runs `f`, converting an unwinding panic into an error.
///
/// Error-valued payloads (`anyhow::Error`, boxed errors, the crate's own
/// error types, `io::Error` and `serde_json::Error`) keep their detail and
/// cause chain; any other payload becomes a `panic: ...` error.
pub(crate) fn isolate<T, F>(f: F) -> anyhow::Result<T>
where
    F: FnOnce() -> anyhow::Result<T>,
{
    panic::catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|payload| Err(panic_error(payload)))
}

type Payload = Box<dyn Any + Send>;

fn panic_error(payload: Payload) -> anyhow::Error {
    payload
        .downcast::<anyhow::Error>()
        .map(|error| *error)
        .or_else(|other| {
            other
                .downcast::<Box<dyn StdError + Send + Sync>>()
                .map(|error| anyhow!(*error))
        })
        .or_else(typed_error::<RpcError>)
        .or_else(typed_error::<Cancelled>)
        .or_else(typed_error::<NetworkError>)
        .or_else(typed_error::<CallError>)
        .or_else(typed_error::<ProfileError>)
        .or_else(typed_error::<StorageError>)
        .or_else(typed_error::<ConnError>)
        .or_else(typed_error::<io::Error>)
        .or_else(typed_error::<serde_json::Error>)
        .or_else(|other| other.downcast::<String>().map(|message| anyhow!("panic: {message}")))
        .or_else(|other| {
            other
                .downcast::<&'static str>()
                .map(|message| anyhow!("panic: {message}"))
        })
        .unwrap_or_else(|_| anyhow!("panic: (unprintable panic payload)"))
}

/// Recovers a concrete error type raised with `panic_any`.
fn typed_error<E>(payload: Payload) -> Result<anyhow::Error, Payload>
where
    E: StdError + Send + Sync + 'static,
{
    payload.downcast::<E>().map(|error| anyhow::Error::new(*error))
}
