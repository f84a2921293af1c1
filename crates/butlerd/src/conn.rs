//! The connection capability the dispatcher and handlers talk through.
//!
//! Framing and socket I/O live in the transport; the dispatch core only needs
//! to issue outbound calls and notifications on the originating channel and to
//! answer the inbound request.

use std::io;

use butlerd_types::{RequestId, WireError};
use serde_json::Value;
use thiserror::Error;

use crate::cancel::{CancelSignal, Cancelled};

/// Errors raised by a [`Conn`] implementation.
#[derive(Debug, Error)]
pub enum ConnError {
    /// The peer closed the connection.
    #[error("connection closed")]
    Closed,

    /// I/O failure on the underlying channel.
    #[error("connection I/O error")]
    Io(#[from] io::Error),

    /// The peer answered an outbound call with an error object.
    #[error("peer returned error: {message} (code: {code})")]
    Remote {
        /// Error code sent by the peer.
        code: i64,
        /// Error message sent by the peer.
        message: String,
    },

    /// A payload could not be encoded or decoded.
    #[error("JSON codec error")]
    Codec(#[from] serde_json::Error),

    /// The caller's signal fired before the peer answered.
    #[error("call abandoned")]
    Cancelled(#[from] Cancelled),
}

/// Capability to exchange messages with the peer that sent a request.
///
/// Implementations are shared by every call dispatched from one connection, so
/// they must tolerate concurrent use.
pub trait Conn: Send + Sync {
    /// Sends a request to the peer and blocks until it answers, fails, or
    /// `signal` fires.
    ///
    /// # Errors
    ///
    /// Returns a [`ConnError`] when the exchange fails.
    fn call(&self, signal: &CancelSignal, method: &str, params: Value) -> Result<Value, ConnError>;

    /// Sends a notification to the peer.
    ///
    /// # Errors
    ///
    /// Returns a [`ConnError`] when the message cannot be sent.
    fn notify(&self, signal: &CancelSignal, method: &str, params: Value) -> Result<(), ConnError>;

    /// Answers request `id` with a result. Used by the dispatcher only.
    ///
    /// # Errors
    ///
    /// Returns a [`ConnError`] when the reply cannot be sent.
    fn reply(&self, id: &RequestId, result: Value) -> Result<(), ConnError>;

    /// Answers request `id` with an error. Used by the dispatcher only.
    ///
    /// # Errors
    ///
    /// Returns a [`ConnError`] when the reply cannot be sent.
    fn reply_with_error(&self, id: &RequestId, error: WireError) -> Result<(), ConnError>;
}
