//! Core types for walk-forward analysis.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::analysis::period_efficiency;
use crate::config::OptimizationTarget;
use crate::metrics::PerformanceSummary;
use crate::parallel::ParameterCombination;

/// One in-sample range and the out-of-sample range right after it.
///
/// Ranges are half-open: a trade opened on `in_sample_end` belongs to the
/// out-of-sample range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowPeriod {
    /// First in-sample day.
    pub in_sample_start: NaiveDate,
    /// End of the in-sample range (exclusive).
    pub in_sample_end: NaiveDate,
    /// First out-of-sample day; always equal to `in_sample_end`.
    pub out_of_sample_start: NaiveDate,
    /// End of the out-of-sample range (exclusive).
    pub out_of_sample_end: NaiveDate,
}

impl WindowPeriod {
    /// Whether `date` falls in the in-sample range.
    #[must_use]
    pub fn in_sample_contains(&self, date: NaiveDate) -> bool {
        self.in_sample_start <= date && date < self.in_sample_end
    }

    /// Whether `date` falls in the out-of-sample range.
    #[must_use]
    pub fn out_of_sample_contains(&self, date: NaiveDate) -> bool {
        self.out_of_sample_start <= date && date < self.out_of_sample_end
    }
}

impl fmt::Display for WindowPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "IS {}..{} / OOS {}..{}",
            self.in_sample_start, self.in_sample_end, self.out_of_sample_start, self.out_of_sample_end
        )
    }
}

/// Result of one optimized and validated window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodResult {
    /// Window ranges.
    pub period: WindowPeriod,
    /// Best feasible in-sample combination.
    pub optimal_parameters: ParameterCombination,
    /// In-sample metrics under `optimal_parameters`.
    pub in_sample_metrics: PerformanceSummary,
    /// Out-of-sample metrics under `optimal_parameters`.
    pub out_of_sample_metrics: PerformanceSummary,
    /// In-sample target value.
    pub in_sample_target: f64,
    /// Out-of-sample target value.
    pub out_of_sample_target: f64,
    /// Combinations scored in the in-sample search.
    pub combinations_evaluated: u64,
    /// Combinations rejected by a constraint.
    pub combinations_rejected_by_constraint: u64,
    /// Trades in the in-sample range.
    pub in_sample_trades: usize,
    /// Trades in the out-of-sample range.
    pub out_of_sample_trades: usize,
}

impl PeriodResult {
    /// Out-of-sample target divided by in-sample target.
    #[must_use]
    pub fn efficiency(&self) -> f64 {
        period_efficiency(self.in_sample_target, self.out_of_sample_target)
    }
}

/// Why a window produced no result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowSkipReason {
    /// Fewer in-sample trades than `min_in_sample_trades`.
    InsufficientInSampleTrades,
    /// Fewer out-of-sample trades than `min_out_of_sample_trades`.
    InsufficientOutOfSampleTrades,
    /// Every combination failed a constraint.
    NoFeasibleCombination,
}

impl fmt::Display for WindowSkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsufficientInSampleTrades => write!(f, "insufficient_in_sample_trades"),
            Self::InsufficientOutOfSampleTrades => write!(f, "insufficient_out_of_sample_trades"),
            Self::NoFeasibleCombination => write!(f, "no_feasible_combination"),
        }
    }
}

/// A window dropped from the results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedWindow {
    /// Window ranges.
    pub period: WindowPeriod,
    /// Why it was dropped.
    pub reason: WindowSkipReason,
    /// Trades in the in-sample range.
    pub in_sample_trades: usize,
    /// Trades in the out-of-sample range.
    pub out_of_sample_trades: usize,
}

/// Aggregate robustness scores.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Summary {
    /// Mean per-window efficiency (OOS target / IS target).
    pub degradation_factor: f64,
    /// Mean per-parameter stability in `[0, 1]`.
    pub parameter_stability: f64,
    /// Share of windows with a non-negative out-of-sample target.
    pub consistency_score: f64,
    /// Mean of clamped degradation, stability and consistency.
    pub robustness_score: f64,
    /// Coefficient of variation of each swept parameter's optimal value.
    pub parameter_cv: BTreeMap<String, f64>,
    /// Mean in-sample target.
    pub avg_in_sample_target: f64,
    /// Mean out-of-sample target.
    pub avg_out_of_sample_target: f64,
}

/// Run bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RunStats {
    /// Combinations evaluated across all windows.
    pub total_parameter_tests: u64,
    /// Combinations rejected by a constraint across all windows.
    pub total_rejected: u64,
    /// Trades left after strategy filtering.
    pub analyzed_trades: usize,
    /// Wall-clock run time.
    pub duration_ms: u64,
    /// Windows produced by the generator.
    pub windows_generated: usize,
    /// Grid size per window.
    pub combinations_per_window: usize,
}

impl RunStats {
    /// Share of evaluated combinations rejected by a constraint; 0 when
    /// nothing was evaluated.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn rejection_rate(&self) -> f64 {
        if self.total_parameter_tests == 0 {
            0.0
        } else {
            self.total_rejected as f64 / self.total_parameter_tests as f64
        }
    }
}

/// Results of a completed walk-forward run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalkForwardResults {
    /// Target that was optimized.
    pub target: OptimizationTarget,
    /// Evaluated windows in chronological order.
    pub periods: Vec<PeriodResult>,
    /// Aggregate scores.
    pub summary: Summary,
    /// Run bookkeeping.
    pub stats: RunStats,
    /// Windows dropped, with reasons.
    pub skipped_windows: Vec<SkippedWindow>,
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// Every window was processed.
    Completed(WalkForwardResults),
    /// Cancellation was requested; no partial result is returned.
    Cancelled,
}

impl RunOutcome {
    /// Results, if the run completed.
    #[must_use]
    pub fn into_results(self) -> Option<WalkForwardResults> {
        match self {
            Self::Completed(results) => Some(results),
            Self::Cancelled => None,
        }
    }

    /// Whether the run was cancelled.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
