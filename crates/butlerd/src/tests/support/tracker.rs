//! Progress tracker double logging every call made on it.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::{ProgressTracker, TrackerFactory};

pub(crate) const SCRIPTED_ETA: Duration = Duration::from_secs(12);
pub(crate) const SCRIPTED_BPS: f64 = 2048.0;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TrackerEvent {
    Created,
    Silent(bool),
    Progress(f64),
    TotalBytes(u64),
    Start,
    Finish,
    Pause,
    Resume,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct TrackerLog(Arc<Mutex<Vec<TrackerEvent>>>);

impl TrackerLog {
    fn push(&self, event: TrackerEvent) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }

    pub(crate) fn events(&self) -> Vec<TrackerEvent> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub(crate) fn count(&self, event: &TrackerEvent) -> usize {
        self.events().iter().filter(|seen| *seen == event).count()
    }
}

struct ScriptedTracker {
    log: TrackerLog,
}

impl ProgressTracker for ScriptedTracker {
    fn set_silent(&mut self, silent: bool) {
        self.log.push(TrackerEvent::Silent(silent));
    }

    fn set_progress(&mut self, alpha: f64) {
        self.log.push(TrackerEvent::Progress(alpha));
    }

    fn set_total_bytes(&mut self, total_bytes: u64) {
        self.log.push(TrackerEvent::TotalBytes(total_bytes));
    }

    fn start(&mut self) {
        self.log.push(TrackerEvent::Start);
    }

    fn finish(&mut self) {
        self.log.push(TrackerEvent::Finish);
    }

    fn pause(&mut self) {
        self.log.push(TrackerEvent::Pause);
    }

    fn resume(&mut self) {
        self.log.push(TrackerEvent::Resume);
    }

    fn eta(&self) -> Duration {
        SCRIPTED_ETA
    }

    fn bps(&self) -> f64 {
        SCRIPTED_BPS
    }
}

/// Factory whose trackers report fixed estimates and log into `log`.
pub(crate) fn scripted_factory(log: &TrackerLog) -> impl TrackerFactory + 'static {
    let shared = log.clone();
    move || -> Box<dyn ProgressTracker> {
        shared.push(TrackerEvent::Created);
        Box::new(ScriptedTracker {
            log: shared.clone(),
        })
    }
}
