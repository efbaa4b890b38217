//! Progress reporting for walk-forward runs.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Stage of a walk-forward run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressPhase {
    /// Validating configuration and building windows.
    Preparing,
    /// Searching the in-sample grid of a window.
    Optimizing,
    /// Applying the winning combination to the out-of-sample trades.
    Validating,
    /// A window finished (evaluated or skipped).
    WindowCompleted,
    /// Every window is done.
    Finished,
}

/// Progress snapshot delivered to a [`ProgressReporter`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
    /// Current stage.
    pub phase: ProgressPhase,
    /// Window being processed (1-based, 0 before the first window).
    pub current_period: usize,
    /// Number of windows in the run.
    pub total_periods: usize,
    /// Combinations evaluated so far in the current window.
    pub combinations_tested: u64,
    /// Combinations in the grid.
    pub total_combinations: u64,
}

impl ProgressEvent {
    /// Get completion percentage of the run.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn percentage(&self) -> f64 {
        if self.total_periods == 0 {
            return 100.0;
        }
        let window_fraction = if self.total_combinations == 0 {
            0.0
        } else {
            self.combinations_tested as f64 / self.total_combinations as f64
        };
        let done = match self.phase {
            ProgressPhase::WindowCompleted | ProgressPhase::Finished => self.current_period as f64,
            _ => self.current_period.saturating_sub(1) as f64 + window_fraction,
        };
        (done / self.total_periods as f64 * 100.0).min(100.0)
    }
}

/// Receives progress events. Called from rayon worker threads.
pub trait ProgressReporter: Send + Sync {
    /// Handle one event.
    fn report(&self, event: &ProgressEvent);
}

impl<F> ProgressReporter for F
where
    F: Fn(&ProgressEvent) + Send + Sync,
{
    fn report(&self, event: &ProgressEvent) {
        self(event);
    }
}

/// Counts evaluated combinations across worker threads.
#[derive(Debug)]
pub struct ProgressTracker {
    total: u64,
    completed: AtomicU64,
    interval: u64,
}

impl ProgressTracker {
    /// Create a tracker that fires every `interval` completions.
    #[must_use]
    pub fn new(total: u64, interval: u64) -> Self {
        Self {
            total,
            completed: AtomicU64::new(0),
            interval: interval.max(1),
        }
    }

    /// Mark one combination as evaluated.
    ///
    /// Returns the new count when a progress event is due.
    pub fn combination_completed(&self) -> Option<u64> {
        let completed = self.completed.fetch_add(1, Ordering::Relaxed) + 1;
        (completed % self.interval == 0 || completed == self.total).then_some(completed)
    }

    /// Combinations evaluated so far.
    #[must_use]
    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::Relaxed)
    }

    /// Combinations in the grid.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }
}
