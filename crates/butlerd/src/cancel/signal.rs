//! Cooperative cancellation signal shared by a call and its helpers.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use thiserror::Error;

/// The well-known "operation was cancelled" sentinel.
///
/// Long-running work returns this error (directly or as the root cause of a
/// chain) when it stops because its signal fired. The dispatcher maps it to
/// the fixed `OperationCancelled` wire code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("operation cancelled")]
pub struct Cancelled;

#[derive(Debug, Default)]
struct SignalState {
    cancelled: bool,
    children: Vec<Weak<SignalInner>>,
}

#[derive(Debug, Default)]
struct SignalInner {
    state: Mutex<SignalState>,
    fired: Condvar,
}

impl SignalInner {
    fn lock(&self) -> MutexGuard<'_, SignalState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A cloneable, thread-safe cancellation flag.
///
/// Clones observe the same flag. A [`child`](Self::child) signal fires when
/// its parent fires but can also be cancelled on its own without affecting the
/// parent. Cancellation is cooperative: nothing is interrupted, holders are
/// expected to poll [`is_cancelled`](Self::is_cancelled) or block on
/// [`wait_timeout`](Self::wait_timeout).
#[derive(Debug, Clone, Default)]
pub struct CancelSignal {
    inner: Arc<SignalInner>,
}

impl CancelSignal {
    /// Creates a signal that has not fired.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Derives a signal that fires when `self` fires.
    #[must_use]
    pub fn child(&self) -> Self {
        let child = Self::new();
        let mut state = self.inner.lock();
        if state.cancelled {
            drop(state);
            child.cancel();
        } else {
            state.children.retain(|weak| weak.strong_count() > 0);
            state.children.push(Arc::downgrade(&child.inner));
        }
        child
    }

    /// Fires the signal and every live child. Firing twice is a no-op.
    pub fn cancel(&self) {
        let children = {
            let mut state = self.inner.lock();
            if state.cancelled {
                return;
            }
            state.cancelled = true;
            std::mem::take(&mut state.children)
        };
        self.inner.fired.notify_all();
        for inner in children.iter().filter_map(Weak::upgrade) {
            Self { inner }.cancel();
        }
    }

    /// Returns true once the signal has fired.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.inner.lock().cancelled
    }

    /// Returns `Err(Cancelled)` once the signal has fired.
    ///
    /// # Errors
    ///
    /// Returns [`Cancelled`] when the signal has fired.
    pub fn check(&self) -> Result<(), Cancelled> {
        if self.is_cancelled() {
            Err(Cancelled)
        } else {
            Ok(())
        }
    }

    /// Blocks until the signal fires or `timeout` elapses.
    ///
    /// Returns true when the signal fired.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let guard = self.inner.lock();
        let (state, _) = self
            .inner
            .fired
            .wait_timeout_while(guard, timeout, |current| !current.cancelled)
            .unwrap_or_else(PoisonError::into_inner);
        state.cancelled
    }
}
