//! Method tables and the per-message dispatch protocol.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::marker::PhantomData;

use butlerd_types::{InboundMessage, RpcError};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, warn};

use super::DISPATCH_TARGET;
use super::classify::classify;
use super::errors::{HandlerKind, RegistrationError};
use super::isolate::isolate;
use crate::cancel::{CancelRegistry, CancelSignal};
use crate::conn::Conn;
use crate::context::{Outbound, RequestContext, SharedParts};
use crate::progress::{ElapsedTrackerFactory, TrackerFactory};
use crate::version::VersionInfo;

/// Type-erased request handler producing a reply value.
trait RequestHandler<P, R>: Send + Sync {
    fn handle(&self, rc: &mut RequestContext<'_, P, R>) -> anyhow::Result<Value>;
}

struct TypedHandler<F, T> {
    handler: F,
    _result: PhantomData<fn() -> T>,
}

impl<P, R, F, T> RequestHandler<P, R> for TypedHandler<F, T>
where
    F: Fn(&mut RequestContext<'_, P, R>) -> anyhow::Result<T> + Send + Sync,
    T: Serialize,
{
    fn handle(&self, rc: &mut RequestContext<'_, P, R>) -> anyhow::Result<Value> {
        let result = (self.handler)(rc)?;
        Ok(serde_json::to_value(result)?)
    }
}

type NotificationHandler<P, R> = Box<dyn Fn(&mut RequestContext<'_, P, R>) + Send + Sync>;

/// Routes inbound messages to registered handlers.
///
/// Registration happens at startup through `&mut self`; once shared, the
/// router is only read, apart from the cancellation registry, which carries
/// its own lock. [`dispatch`](Self::dispatch) may therefore run concurrently
/// from any number of threads.
pub struct Router<P, R> {
    request_handlers: HashMap<String, Box<dyn RequestHandler<P, R>>>,
    notification_handlers: HashMap<String, NotificationHandler<P, R>>,
    cancel_registry: CancelRegistry,
    pool: P,
    resolver: R,
    versions: VersionInfo,
    trackers: Box<dyn TrackerFactory>,
}

impl<P, R> Router<P, R> {
    /// Creates a router with empty method tables and the default progress
    /// tracker.
    pub fn new(pool: P, resolver: R, versions: VersionInfo) -> Self {
        Self {
            request_handlers: HashMap::new(),
            notification_handlers: HashMap::new(),
            cancel_registry: CancelRegistry::new(),
            pool,
            resolver,
            versions,
            trackers: Box::new(ElapsedTrackerFactory),
        }
    }

    /// Replaces the factory used when a handler starts tracking progress.
    #[must_use]
    pub fn with_tracker_factory(mut self, factory: impl TrackerFactory + 'static) -> Self {
        self.trackers = Box::new(factory);
        self
    }

    /// Registers the handler for request `method`. Its result is serialised
    /// into the reply.
    ///
    /// # Panics
    ///
    /// Panics when `method` already has a request handler. Method tables are
    /// built once at startup and a duplicate is a wiring bug.
    pub fn register<F, T>(&mut self, method: impl Into<String>, handler: F)
    where
        F: Fn(&mut RequestContext<'_, P, R>) -> anyhow::Result<T> + Send + Sync + 'static,
        T: Serialize + 'static,
    {
        match self.request_handlers.entry(method.into()) {
            Entry::Occupied(entry) => {
                panic!("{}", RegistrationError::duplicate(entry.key(), HandlerKind::Request))
            }
            Entry::Vacant(entry) => {
                debug!(target: DISPATCH_TARGET, method = %entry.key(), "registered request handler");
                entry.insert(Box::new(TypedHandler {
                    handler,
                    _result: PhantomData,
                }));
            }
        }
    }

    /// Registers the handler for notification `method`.
    ///
    /// # Panics
    ///
    /// Panics when `method` already has a notification handler.
    pub fn register_notification<F>(&mut self, method: impl Into<String>, handler: F)
    where
        F: Fn(&mut RequestContext<'_, P, R>) + Send + Sync + 'static,
    {
        match self.notification_handlers.entry(method.into()) {
            Entry::Occupied(entry) => panic!(
                "{}",
                RegistrationError::duplicate(entry.key(), HandlerKind::Notification)
            ),
            Entry::Vacant(entry) => {
                debug!(
                    target: DISPATCH_TARGET,
                    method = %entry.key(),
                    "registered notification handler"
                );
                entry.insert(Box::new(handler));
            }
        }
    }

    /// Registry shared by every dispatched call. Control messages use it to
    /// cancel calls by identifier.
    #[must_use]
    pub const fn cancel_registry(&self) -> &CancelRegistry {
        &self.cancel_registry
    }

    /// Storage pool lent to every context.
    #[must_use]
    pub const fn pool(&self) -> &P {
        &self.pool
    }

    /// Version metadata attached to error replies.
    #[must_use]
    pub const fn versions(&self) -> &VersionInfo {
        &self.versions
    }

    /// Handles one inbound message.
    ///
    /// The handler runs under panic containment and under a child of
    /// `signal`. Requests are always answered, with the handler's result or a
    /// classified error; notifications never are. Reply failures are logged.
    pub fn dispatch(&self, signal: &CancelSignal, conn: &dyn Conn, message: InboundMessage) {
        let InboundMessage { id, method, params } = message;
        let shared = SharedParts {
            cancel_registry: &self.cancel_registry,
            pool: &self.pool,
            resolver: &self.resolver,
            versions: &self.versions,
            trackers: self.trackers.as_ref(),
        };
        let outbound = Outbound::new(conn, signal.child());
        let mut rc = RequestContext::new(shared, outbound, id.clone(), method.clone(), params);

        let outcome = isolate(|| self.invoke(&mut rc));

        let Some(id) = id else {
            if let Err(err) = outcome {
                warn!(
                    target: DISPATCH_TARGET,
                    %method,
                    error = %format!("{err:#}"),
                    "notification handler failed"
                );
            }
            return;
        };

        match outcome {
            Ok(result) => {
                if let Err(err) = conn.reply(&id, result) {
                    error!(
                        target: DISPATCH_TARGET,
                        %method,
                        call_id = %id,
                        error = %err,
                        "failed to send reply"
                    );
                }
            }
            Err(err) => {
                let wire = classify(&err, &self.versions);
                debug!(
                    target: DISPATCH_TARGET,
                    %method,
                    call_id = %id,
                    code = wire.code,
                    error = %format!("{err:#}"),
                    "request failed"
                );
                if let Err(send_err) = conn.reply_with_error(&id, wire) {
                    error!(
                        target: DISPATCH_TARGET,
                        %method,
                        call_id = %id,
                        error = %send_err,
                        "failed to send error reply"
                    );
                }
            }
        }
    }

    fn invoke(&self, rc: &mut RequestContext<'_, P, R>) -> anyhow::Result<Value> {
        if rc.is_notification() {
            match self.notification_handlers.get(rc.method()) {
                Some(handler) => handler(rc),
                None => debug!(
                    target: DISPATCH_TARGET,
                    method = rc.method(),
                    "dropping notification for unregistered method"
                ),
            }
            return Ok(Value::Null);
        }

        let Some(handler) = self.request_handlers.get(rc.method()) else {
            return Err(RpcError::method_not_found(rc.method()).into());
        };
        rc.wire_progress();
        handler.handle(rc)
    }
}
