//! Progress tracking for long-running calls.
//!
//! A tracker accumulates the fractional completion of one call and derives
//! ETA and throughput estimates from it. The dispatch core starts, feeds and
//! stops trackers through [`ProgressTracker`]; [`ElapsedTracker`] is the
//! default engine and can be swapped through a [`TrackerFactory`].

mod bridge;
mod tracker;

pub use self::bridge::{DetachedSink, ProgressBridge, ProgressSink};
pub use self::tracker::ElapsedTracker;

use std::time::Duration;

/// Tracing target for progress operations.
pub(crate) const PROGRESS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::progress");

/// Stateful progress accumulator for one call.
pub trait ProgressTracker: Send {
    /// Suppresses or enables the tracker's own output.
    fn set_silent(&mut self, silent: bool);

    /// Records fractional completion in `[0, 1]`.
    fn set_progress(&mut self, alpha: f64);

    /// Records the total number of bytes the work covers; zero when unknown.
    fn set_total_bytes(&mut self, total_bytes: u64);

    /// Starts accounting.
    fn start(&mut self);

    /// Stops accounting for good.
    fn finish(&mut self);

    /// Stops accruing time until [`resume`](Self::resume).
    fn pause(&mut self);

    /// Resumes accruing time after [`pause`](Self::pause).
    fn resume(&mut self);

    /// Estimated time remaining.
    fn eta(&self) -> Duration;

    /// Estimated throughput in bytes per second.
    fn bps(&self) -> f64;
}

/// Creates a fresh tracker each time a call starts tracking progress.
///
/// Any `Fn() -> Box<dyn ProgressTracker>` closure is a factory.
pub trait TrackerFactory: Send + Sync {
    /// Returns a new, unstarted tracker.
    fn create(&self) -> Box<dyn ProgressTracker>;
}

impl<F> TrackerFactory for F
where
    F: Fn() -> Box<dyn ProgressTracker> + Send + Sync,
{
    fn create(&self) -> Box<dyn ProgressTracker> {
        self()
    }
}

/// Factory producing [`ElapsedTracker`]s.
#[derive(Debug, Default, Clone, Copy)]
pub struct ElapsedTrackerFactory;

impl TrackerFactory for ElapsedTrackerFactory {
    fn create(&self) -> Box<dyn ProgressTracker> {
        Box::new(ElapsedTracker::new())
    }
}
