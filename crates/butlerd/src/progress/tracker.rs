//! Default tracker deriving estimates from elapsed active time.

use std::time::{Duration, Instant};

use super::ProgressTracker;

/// Tracker that extrapolates linearly from the time spent so far.
///
/// Paused intervals are excluded from the active time. Throughput is only
/// known when a total byte count was supplied.
#[derive(Debug, Clone, Default)]
pub struct ElapsedTracker {
    progress: f64,
    total_bytes: u64,
    silent: bool,
    accumulated: Duration,
    running_since: Option<Instant>,
    paused: bool,
    finished: bool,
}

impl ElapsedTracker {
    /// Creates an unstarted tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the last recorded fractional completion.
    #[must_use]
    pub const fn progress(&self) -> f64 {
        self.progress
    }

    /// Returns true when the tracker's own output is suppressed.
    #[must_use]
    pub const fn is_silent(&self) -> bool {
        self.silent
    }

    /// Returns true once [`ProgressTracker::finish`] has been called.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    fn active_time(&self) -> Duration {
        let running = self
            .running_since
            .map_or(Duration::ZERO, |since| since.elapsed());
        self.accumulated + running
    }

    fn stop_clock(&mut self) {
        if let Some(since) = self.running_since.take() {
            self.accumulated += since.elapsed();
        }
    }
}

impl ProgressTracker for ElapsedTracker {
    fn set_silent(&mut self, silent: bool) {
        self.silent = silent;
    }

    fn set_progress(&mut self, alpha: f64) {
        self.progress = alpha.clamp(0.0, 1.0);
    }

    fn set_total_bytes(&mut self, total_bytes: u64) {
        self.total_bytes = total_bytes;
    }

    fn start(&mut self) {
        if self.running_since.is_none() && !self.finished {
            self.running_since = Some(Instant::now());
            self.paused = false;
        }
    }

    fn finish(&mut self) {
        self.stop_clock();
        self.finished = true;
    }

    fn pause(&mut self) {
        if !self.paused {
            self.stop_clock();
            self.paused = true;
        }
    }

    fn resume(&mut self) {
        if self.paused && !self.finished {
            self.paused = false;
            self.running_since = Some(Instant::now());
        }
    }

    #[expect(clippy::float_arithmetic, reason = "linear extrapolation of elapsed time")]
    fn eta(&self) -> Duration {
        if self.progress <= 0.0 {
            return Duration::ZERO;
        }
        let elapsed = self.active_time().as_secs_f64();
        let remaining = elapsed * (1.0 - self.progress) / self.progress;
        Duration::try_from_secs_f64(remaining).unwrap_or(Duration::ZERO)
    }

    #[expect(
        clippy::float_arithmetic,
        clippy::cast_precision_loss,
        reason = "throughput is an estimate"
    )]
    fn bps(&self) -> f64 {
        let elapsed = self.active_time().as_secs_f64();
        if self.total_bytes == 0 || elapsed <= 0.0 {
            return 0.0;
        }
        self.total_bytes as f64 * self.progress / elapsed
    }
}
