//! Outbound messaging for one call, with per-call notification interception.

use std::collections::HashMap;

use serde_json::Value;
use tracing::debug;

use super::CONTEXT_TARGET;
use super::errors::{CallError, InterceptorError};
use crate::cancel::CancelSignal;
use crate::conn::Conn;

/// Replacement for sending a notification on the wire.
pub type NotificationInterceptor =
    Box<dyn FnMut(&str, &Value) -> Result<(), InterceptorError> + Send + 'static>;

/// Sink for outbound notifications.
pub(crate) trait Notifier {
    /// Sends `params` under `method`, honouring any installed interceptor.
    fn notify_value(&mut self, method: &str, params: Value) -> Result<(), CallError>;
}

/// The originating connection plus this call's interceptor table.
pub(crate) struct Outbound<'a> {
    conn: &'a dyn Conn,
    signal: CancelSignal,
    interceptors: HashMap<String, NotificationInterceptor>,
}

impl<'a> Outbound<'a> {
    pub(crate) fn new(conn: &'a dyn Conn, signal: CancelSignal) -> Self {
        Self {
            conn,
            signal,
            interceptors: HashMap::new(),
        }
    }

    pub(crate) const fn signal(&self) -> &CancelSignal {
        &self.signal
    }

    pub(crate) fn call_value(&self, method: &str, params: Value) -> Result<Value, CallError> {
        self.signal.check()?;
        self.conn
            .call(&self.signal, method, params)
            .map_err(|source| CallError::conn(method, source))
    }

    pub(crate) fn intercept(&mut self, method: String, interceptor: NotificationInterceptor) {
        debug!(target: CONTEXT_TARGET, %method, "intercepting notifications");
        self.interceptors.insert(method, interceptor);
    }

    pub(crate) fn stop_intercepting(&mut self, method: &str) {
        self.interceptors.remove(method);
    }
}

impl Notifier for Outbound<'_> {
    fn notify_value(&mut self, method: &str, params: Value) -> Result<(), CallError> {
        if let Some(interceptor) = self.interceptors.get_mut(method) {
            return interceptor(method, &params)
                .map_err(|source| CallError::intercepted(method, source));
        }
        self.conn
            .notify(&self.signal, method, params)
            .map_err(|source| CallError::conn(method, source))
    }
}
