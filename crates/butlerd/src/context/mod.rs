//! Per-call execution context handed to request and notification handlers.
//!
//! A [`RequestContext`] is built fresh for every dispatched message and
//! dropped once the reply has been sent. It bundles the capabilities a
//! handler may use (outbound calls and notifications on the originating
//! connection, the shared cancellation registry, the storage pool and the
//! client resolver) together with state private to the call: the progress
//! tracker slot and the notification interceptor table.

mod errors;
mod outbound;

pub use self::errors::{CallError, InterceptorError, ProfileError};
pub use self::outbound::NotificationInterceptor;
pub(crate) use self::outbound::{Notifier, Outbound};

use butlerd_types::{RequestId, RpcError};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::cancel::{CancelRegistry, CancelScope, CancelSignal};
use crate::client::{ClientResolver, Credential};
use crate::progress::{DetachedSink, ProgressBridge, ProgressSink, ProgressTracker, TrackerFactory};
use crate::storage::{PooledConn, Profile, StorageConnection, StorageError, StoragePool};
use crate::version::VersionInfo;

/// Tracing target for request-context operations.
pub(crate) const CONTEXT_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::context");

/// Router-owned capabilities lent to every context.
pub(crate) struct SharedParts<'a, P, R> {
    pub(crate) cancel_registry: &'a CancelRegistry,
    pub(crate) pool: &'a P,
    pub(crate) resolver: &'a R,
    pub(crate) versions: &'a VersionInfo,
    pub(crate) trackers: &'a dyn TrackerFactory,
}

/// Capabilities and state for one dispatched message.
pub struct RequestContext<'a, P, R> {
    call_id: Option<RequestId>,
    method: String,
    params: Option<Value>,
    cancel_registry: &'a CancelRegistry,
    pool: &'a P,
    resolver: &'a R,
    versions: &'a VersionInfo,
    trackers: &'a dyn TrackerFactory,
    outbound: Outbound<'a>,
    tracker: Option<Box<dyn ProgressTracker>>,
    progress_wired: bool,
}

impl<'a, P, R> RequestContext<'a, P, R> {
    pub(crate) fn new(
        shared: SharedParts<'a, P, R>,
        outbound: Outbound<'a>,
        call_id: Option<RequestId>,
        method: String,
        params: Option<Value>,
    ) -> Self {
        Self {
            call_id,
            method,
            params,
            cancel_registry: shared.cancel_registry,
            pool: shared.pool,
            resolver: shared.resolver,
            versions: shared.versions,
            trackers: shared.trackers,
            outbound,
            tracker: None,
            progress_wired: false,
        }
    }

    /// Identifier of the request, or `None` for a notification.
    #[must_use]
    pub const fn call_id(&self) -> Option<&RequestId> {
        self.call_id.as_ref()
    }

    /// Method name of the inbound message.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Returns true when no reply will be sent.
    #[must_use]
    pub const fn is_notification(&self) -> bool {
        self.call_id.is_none()
    }

    /// Signal governing this call.
    #[must_use]
    pub const fn signal(&self) -> &CancelSignal {
        self.outbound.signal()
    }

    /// Version metadata of the daemon.
    #[must_use]
    pub const fn versions(&self) -> &VersionInfo {
        self.versions
    }

    /// Registry shared by every in-flight call.
    #[must_use]
    pub const fn cancel_registry(&self) -> &'a CancelRegistry {
        self.cancel_registry
    }

    /// Decodes the inbound parameters. Absent parameters decode from `null`.
    ///
    /// # Errors
    ///
    /// Returns an "invalid params" [`RpcError`] when decoding fails.
    pub fn params<T: DeserializeOwned>(&self) -> Result<T, RpcError> {
        let raw = self.params.clone().unwrap_or(Value::Null);
        serde_json::from_value(raw).map_err(|error| {
            RpcError::invalid_params(format!("invalid params for {}: {error}", self.method))
        })
    }

    /// Sends a request to the peer and waits for its result.
    ///
    /// # Errors
    ///
    /// Returns [`CallError::Cancelled`] without sending when the call was
    /// already cancelled, or a connection or codec failure otherwise.
    pub fn call<Q, T>(&self, method: &str, params: &Q) -> Result<T, CallError>
    where
        Q: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let params =
            serde_json::to_value(params).map_err(|source| CallError::encode(method, source))?;
        let result = self.outbound.call_value(method, params)?;
        serde_json::from_value(result).map_err(|source| CallError::decode(method, source))
    }

    /// Sends a notification to the peer, or to this call's interceptor for
    /// `method` when one is installed.
    ///
    /// # Errors
    ///
    /// Returns the interceptor's failure, or a connection or codec failure.
    pub fn notify<Q>(&mut self, method: &str, params: &Q) -> Result<(), CallError>
    where
        Q: Serialize + ?Sized,
    {
        let params =
            serde_json::to_value(params).map_err(|source| CallError::encode(method, source))?;
        self.outbound.notify_value(method, params)
    }

    /// Redirects this call's outbound `method` notifications to `interceptor`,
    /// replacing any previous interceptor for the method.
    pub fn intercept_notification<F>(&mut self, method: impl Into<String>, interceptor: F)
    where
        F: FnMut(&str, &Value) -> Result<(), InterceptorError> + Send + 'static,
    {
        self.outbound.intercept(method.into(), Box::new(interceptor));
    }

    /// Removes the interceptor for `method`; a no-op when none is installed.
    pub fn stop_intercepting_notification(&mut self, method: &str) {
        self.outbound.stop_intercepting(method);
    }

    /// Starts tracking progress with no initial progress and no byte total.
    pub fn start_progress(&mut self) {
        self.start_progress_with_initial_and_total(0.0, 0);
    }

    /// Starts tracking progress over `total_bytes` bytes.
    pub fn start_progress_with_total_bytes(&mut self, total_bytes: u64) {
        self.start_progress_with_initial_and_total(0.0, total_bytes);
    }

    /// Starts tracking progress from `initial` over `total_bytes` bytes.
    ///
    /// Starting while a tracker is already active only logs a warning.
    pub fn start_progress_with_initial_and_total(&mut self, initial: f64, total_bytes: u64) {
        if self.tracker.is_some() {
            warn!(
                target: CONTEXT_TARGET,
                method = %self.method,
                "asked to start progress but already tracking progress"
            );
            return;
        }
        let mut tracker = self.trackers.create();
        tracker.set_silent(true);
        tracker.set_progress(initial);
        tracker.set_total_bytes(total_bytes);
        tracker.start();
        self.tracker = Some(tracker);
    }

    /// Stops and discards the active tracker.
    ///
    /// Ending without an active tracker only logs a warning.
    pub fn end_progress(&mut self) {
        match self.tracker.take() {
            Some(mut tracker) => tracker.finish(),
            None => warn!(
                target: CONTEXT_TARGET,
                method = %self.method,
                "asked to stop progress but wasn't tracking progress"
            ),
        }
    }

    /// Returns true between a progress start and the matching end.
    #[must_use]
    pub const fn is_tracking_progress(&self) -> bool {
        self.tracker.is_some()
    }

    /// Sink that long-running tasks feed progress into.
    ///
    /// While a request handler runs this feeds the active tracker and emits
    /// `Progress` notifications; otherwise it discards every signal.
    pub fn progress_sink(&mut self) -> Box<dyn ProgressSink + '_> {
        if self.progress_wired {
            Box::new(ProgressBridge::new(&mut self.tracker, &mut self.outbound))
        } else {
            Box::new(DetachedSink)
        }
    }

    /// Registers a cancel callback under `id` for the lifetime of the returned
    /// scope. Its signal fires when the entry is invoked or this call is
    /// cancelled.
    pub fn cancellable(&self, id: impl Into<String>) -> CancelScope<'a> {
        self.cancel_registry.scope(id, self.outbound.signal())
    }

    pub(crate) fn wire_progress(&mut self) {
        self.progress_wired = true;
    }
}

impl<P: StoragePool, R> RequestContext<'_, P, R> {
    /// Runs `f` with a pooled connection, released on every exit path
    /// including unwinding.
    ///
    /// # Errors
    ///
    /// Returns the pool's failure when no connection could be acquired.
    pub fn with_conn<T, F>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&mut P::Connection) -> T,
    {
        let mut conn = PooledConn::acquire(self.pool, self.signal())?;
        Ok(f(&mut conn))
    }

    /// [`with_conn`](Self::with_conn) for predicates.
    ///
    /// # Errors
    ///
    /// Returns the pool's failure when no connection could be acquired.
    pub fn with_conn_bool<F>(&self, f: F) -> Result<bool, StorageError>
    where
        F: FnOnce(&mut P::Connection) -> bool,
    {
        self.with_conn(f)
    }
}

impl<P, R: ClientResolver> RequestContext<'_, P, R> {
    /// Client for calls that need no user identity.
    pub fn root_client(&self) -> R::Client {
        self.resolver.resolve(&Credential::Anonymous)
    }
}

impl<P: StoragePool, R: ClientResolver> RequestContext<'_, P, R> {
    /// Looks up profile `profile_id` and returns it with a client
    /// authenticated by its API key.
    ///
    /// The storage connection is released before the profile is checked.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::ZeroProfileId`] before touching storage when
    /// `profile_id` is zero, and a lookup, not-found or missing-key error
    /// otherwise.
    pub fn profile_client(&self, profile_id: i64) -> Result<(Profile, R::Client), ProfileError> {
        if profile_id == 0 {
            return Err(ProfileError::ZeroProfileId);
        }

        let found = {
            let mut conn = PooledConn::acquire(self.pool, self.signal())?;
            conn.profile_by_id(profile_id)?
        };

        let profile = found.ok_or(ProfileError::NotFound { profile_id })?;
        if profile.api_key.is_empty() {
            return Err(ProfileError::MissingApiKey { profile_id });
        }

        debug!(target: CONTEXT_TARGET, profile_id, "resolved profile client");
        let client = self
            .resolver
            .resolve(&Credential::Keyed(profile.api_key.clone()));
        Ok((profile, client))
    }
}

impl<P, R> Drop for RequestContext<'_, P, R> {
    fn drop(&mut self) {
        if let Some(mut tracker) = self.tracker.take() {
            warn!(
                target: CONTEXT_TARGET,
                method = %self.method,
                "progress still tracked when call finished"
            );
            tracker.finish();
        }
    }
}
