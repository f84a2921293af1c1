//! Inbound message dispatch.
//!
//! The [`Router`] owns the method tables and routes every inbound message to
//! its handler inside a panic-containment boundary. Failed requests are
//! answered with a [`WireError`](butlerd_types::WireError) produced by
//! [`classify`].

mod classify;
mod errors;
mod isolate;
mod router;

pub use self::classify::{NetworkError, classify};
pub use self::router::Router;

/// Tracing target for dispatch operations.
pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");
