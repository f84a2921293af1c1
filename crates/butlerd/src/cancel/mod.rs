//! Identifier-addressed cancellation of in-flight calls.
//!
//! Long-running handlers register a cancel callback under an opaque call
//! identifier. A separate control message later invokes the entry for that
//! identifier, which fires the callback exactly once and forgets it. The
//! registry is shared by every concurrently dispatched call, so each
//! operation runs under the registry's own lock.

mod signal;

use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::debug;

pub use self::signal::{CancelSignal, Cancelled};

/// Tracing target for cancellation operations.
pub(crate) const CANCEL_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::cancel");

/// A no-argument cancellation callback.
pub type CancelFn = Box<dyn FnOnce() + Send + 'static>;

/// Concurrency-safe table mapping call identifiers to cancel callbacks.
#[derive(Default)]
pub struct CancelRegistry {
    funcs: Mutex<HashMap<String, CancelFn>>,
}

impl CancelRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // Each critical section is a single map operation, so a poisoned lock
    // still guards a consistent map.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, CancelFn>> {
        self.funcs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers `cancel` under `id`, replacing any existing entry.
    pub fn add<F>(&self, id: impl Into<String>, cancel: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let id = id.into();
        let replaced = self.lock().insert(id.clone(), Box::new(cancel)).is_some();
        debug!(target: CANCEL_TARGET, call_id = %id, replaced, "registered cancel callback");
    }

    /// Forgets the entry for `id` without firing it.
    ///
    /// Returns true when an entry was removed.
    pub fn remove(&self, id: &str) -> bool {
        self.lock().remove(id).is_some()
    }

    /// Fires and forgets the entry for `id`.
    ///
    /// Returns false ("not found") when no entry exists; nothing fires in
    /// that case. The callback runs after the lock is released so it may
    /// itself touch the registry.
    pub fn call(&self, id: &str) -> bool {
        let entry = self.lock().remove(id);
        match entry {
            Some(cancel) => {
                debug!(target: CANCEL_TARGET, call_id = %id, "cancelling call");
                cancel();
                true
            }
            None => {
                debug!(target: CANCEL_TARGET, call_id = %id, "no cancel callback registered");
                false
            }
        }
    }

    /// Returns true when an entry exists for `id`.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.lock().contains_key(id)
    }

    /// Returns the number of registered entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true when no entries are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Derives a child of `parent`, registers its cancellation under `id`,
    /// and returns a scope that removes the entry when dropped.
    pub fn scope(&self, id: impl Into<String>, parent: &CancelSignal) -> CancelScope<'_> {
        let id = id.into();
        let signal = parent.child();
        let trigger = signal.clone();
        self.add(id.clone(), move || trigger.cancel());
        CancelScope {
            registry: self,
            id,
            signal,
        }
    }
}

impl fmt::Debug for CancelRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelRegistry")
            .field("entries", &self.len())
            .finish()
    }
}

/// Registration of a cancellable unit of work, removed on drop.
#[derive(Debug)]
pub struct CancelScope<'r> {
    registry: &'r CancelRegistry,
    id: String,
    signal: CancelSignal,
}

impl CancelScope<'_> {
    /// Signal that fires when the entry is invoked or the parent fires.
    #[must_use]
    pub const fn signal(&self) -> &CancelSignal {
        &self.signal
    }

    /// Identifier the entry is registered under.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Drop for CancelScope<'_> {
    fn drop(&mut self) {
        self.registry.remove(&self.id);
    }
}
