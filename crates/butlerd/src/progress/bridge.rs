//! Adapter from opaque task progress callbacks to `Progress` notifications.

use butlerd_types::ProgressNotification;
use tracing::warn;

use super::{PROGRESS_TARGET, ProgressTracker};
use crate::context::Notifier;

/// Receiver of progress callbacks from long-running tasks.
pub trait ProgressSink {
    /// Reports fractional completion in `[0, 1]`.
    fn progress(&mut self, alpha: f64);

    /// Reports a human-readable label for the current stage.
    fn progress_label(&mut self, label: &str);

    /// Pauses time accounting.
    fn pause_progress(&mut self);

    /// Resumes time accounting.
    fn resume_progress(&mut self);
}

/// Sink bound to one request's tracker and notification channel.
///
/// Every `progress` call feeds the tracker and emits one `Progress`
/// notification through the interception-aware path. Calls made while no
/// tracker is active are ignored.
pub struct ProgressBridge<'c> {
    tracker: &'c mut Option<Box<dyn ProgressTracker>>,
    notifier: &'c mut dyn Notifier,
}

impl<'c> ProgressBridge<'c> {
    pub(crate) fn new(
        tracker: &'c mut Option<Box<dyn ProgressTracker>>,
        notifier: &'c mut dyn Notifier,
    ) -> Self {
        Self { tracker, notifier }
    }
}

impl ProgressSink for ProgressBridge<'_> {
    fn progress(&mut self, alpha: f64) {
        let Some(tracker) = self.tracker.as_mut() else {
            return;
        };
        tracker.set_progress(alpha);
        let notification = ProgressNotification {
            progress: alpha,
            eta: tracker.eta().as_secs_f64(),
            bps: tracker.bps(),
        };
        let params = match serde_json::to_value(notification) {
            Ok(params) => params,
            Err(error) => {
                warn!(target: PROGRESS_TARGET, %error, "failed to encode progress notification");
                return;
            }
        };
        if let Err(error) = self
            .notifier
            .notify_value(ProgressNotification::METHOD, params)
        {
            warn!(target: PROGRESS_TARGET, ?error, "failed to send progress notification");
        }
    }

    fn progress_label(&mut self, _label: &str) {}

    fn pause_progress(&mut self) {
        if let Some(tracker) = self.tracker.as_mut() {
            tracker.pause();
        }
    }

    fn resume_progress(&mut self) {
        if let Some(tracker) = self.tracker.as_mut() {
            tracker.resume();
        }
    }
}

/// Sink that discards everything; handed to notification handlers.
#[derive(Debug, Default, Clone, Copy)]
pub struct DetachedSink;

impl ProgressSink for DetachedSink {
    fn progress(&mut self, _alpha: f64) {}

    fn progress_label(&mut self, _label: &str) {}

    fn pause_progress(&mut self) {}

    fn resume_progress(&mut self) {}
}
