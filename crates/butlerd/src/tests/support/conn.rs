//! Connection double recording every message it is asked to send.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use butlerd_types::{RequestId, WireError};
use serde_json::Value;

use crate::{CancelSignal, Conn, ConnError};

#[derive(Default)]
struct Recorded {
    replies: Vec<(RequestId, Value)>,
    errors: Vec<(RequestId, WireError)>,
    notifications: Vec<(String, Value)>,
    calls: Vec<(String, Value)>,
    call_results: VecDeque<Result<Value, ConnError>>,
}

#[derive(Default)]
pub(crate) struct RecordingConn {
    recorded: Mutex<Recorded>,
    fail_replies: bool,
}

impl RecordingConn {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// A connection whose reply primitives always fail after recording.
    pub(crate) fn failing_replies() -> Self {
        Self {
            recorded: Mutex::default(),
            fail_replies: true,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Recorded> {
        self.recorded.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queues the answer to the next outbound call.
    pub(crate) fn script_call(&self, result: Result<Value, ConnError>) {
        self.lock().call_results.push_back(result);
    }

    pub(crate) fn replies(&self) -> Vec<(RequestId, Value)> {
        self.lock().replies.clone()
    }

    pub(crate) fn errors(&self) -> Vec<(RequestId, WireError)> {
        self.lock().errors.clone()
    }

    pub(crate) fn notifications(&self) -> Vec<(String, Value)> {
        self.lock().notifications.clone()
    }

    pub(crate) fn calls(&self) -> Vec<(String, Value)> {
        self.lock().calls.clone()
    }

    pub(crate) fn notifications_named(&self, method: &str) -> Vec<Value> {
        self.notifications()
            .into_iter()
            .filter_map(|(name, params)| (name == method).then_some(params))
            .collect()
    }

    /// The only message sent back, which must be a successful reply.
    pub(crate) fn only_reply(&self) -> Value {
        let recorded = self.lock();
        assert!(recorded.errors.is_empty(), "unexpected errors: {:?}", recorded.errors);
        assert_eq!(recorded.replies.len(), 1, "replies: {:?}", recorded.replies);
        recorded.replies[0].1.clone()
    }

    /// The only message sent back, which must be an error reply.
    pub(crate) fn only_error(&self) -> WireError {
        let recorded = self.lock();
        assert!(recorded.replies.is_empty(), "unexpected replies: {:?}", recorded.replies);
        assert_eq!(recorded.errors.len(), 1, "errors: {:?}", recorded.errors);
        recorded.errors[0].1.clone()
    }

    pub(crate) fn answered(&self) -> usize {
        let recorded = self.lock();
        recorded.replies.len() + recorded.errors.len()
    }
}

impl Conn for RecordingConn {
    fn call(&self, _signal: &CancelSignal, method: &str, params: Value) -> Result<Value, ConnError> {
        let mut recorded = self.lock();
        recorded.calls.push((method.to_owned(), params));
        recorded.call_results.pop_front().unwrap_or(Ok(Value::Null))
    }

    fn notify(&self, _signal: &CancelSignal, method: &str, params: Value) -> Result<(), ConnError> {
        self.lock().notifications.push((method.to_owned(), params));
        Ok(())
    }

    fn reply(&self, id: &RequestId, result: Value) -> Result<(), ConnError> {
        self.lock().replies.push((id.clone(), result));
        if self.fail_replies {
            return Err(ConnError::Closed);
        }
        Ok(())
    }

    fn reply_with_error(&self, id: &RequestId, error: WireError) -> Result<(), ConnError> {
        self.lock().errors.push((id.clone(), error));
        if self.fail_replies {
            return Err(ConnError::Closed);
        }
        Ok(())
    }
}
