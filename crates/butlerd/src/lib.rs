//! Dispatch core of the butler daemon.
//!
//! The daemon receives JSON-RPC 2.0 requests and notifications over a
//! persistent connection. For every inbound message the transport calls
//! [`Router::dispatch`], which builds a fresh [`RequestContext`], runs the
//! registered handler inside a panic-containment boundary and answers
//! requests with either the handler's result or a [`WireError`] produced by
//! [`classify`].
//!
//! Collaborators stay behind traits: the connection ([`Conn`]), the storage
//! pool ([`StoragePool`]), the remote client resolver ([`ClientResolver`])
//! and the progress engine ([`ProgressTracker`]).
//!
//! ```ignore
//! let mut router = Router::new(pool, resolver, VersionInfo::from_package());
//! router.register("Version.Get", |rc| Ok(rc.versions().version().to_owned()));
//! router.dispatch(&CancelSignal::new(), &conn, message);
//! ```
//!
//! [`WireError`]: butlerd_types::WireError

pub mod cancel;
pub mod client;
pub mod conn;
pub mod context;
pub mod dispatch;
pub mod progress;
pub mod storage;
pub mod telemetry;
mod version;

pub use self::cancel::{CancelRegistry, CancelScope, CancelSignal, Cancelled};
pub use self::client::{ClientResolver, Credential};
pub use self::conn::{Conn, ConnError};
pub use self::context::{CallError, ProfileError, RequestContext};
pub use self::dispatch::{NetworkError, Router, classify};
pub use self::progress::{ProgressSink, ProgressTracker, TrackerFactory};
pub use self::storage::{PooledConn, Profile, StorageConnection, StorageError, StoragePool};
pub use self::version::VersionInfo;

#[cfg(test)]
mod tests;
