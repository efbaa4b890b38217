//! Walk-forward analysis and out-of-sample validation.
//!
//! Implements rolling walk-forward optimization of sizing parameters:
//! - Rolling windows of in-sample and out-of-sample days
//! - Exhaustive in-sample grid search under risk constraints
//! - Out-of-sample replay of each window's optimum
//! - Degradation, stability and consistency scores with a verdict

mod analysis;
mod builder;
mod engine;
mod types;
mod verdict;
mod windows;

pub use analysis::{
    EFFICIENCY_EPSILON, coefficient_of_variation, parameter_history, parameter_stability,
    period_efficiency, summarize,
};
pub use builder::WalkForwardBuilder;
pub use engine::WalkForwardEngine;
pub use types::{
    PeriodResult, RunOutcome, RunStats, SkippedWindow, Summary, WalkForwardResults, WindowPeriod,
    WindowSkipReason,
};
pub use verdict::{
    Assessment, Component, ComponentAssessment, Rating, RedFlag, Thresholds, VerdictPolicy,
    VerdictReport, assess, red_flags,
};
pub use windows::{generate_windows, generate_windows_between, split_trades};

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::config::OptimizationTarget;

    #[test]
    fn test_window_period_display() {
        let (Some(start), Some(split), Some(end)) = (
            NaiveDate::from_ymd_opt(2024, 1, 1),
            NaiveDate::from_ymd_opt(2024, 2, 15),
            NaiveDate::from_ymd_opt(2024, 3, 1),
        ) else {
            panic!("valid test dates");
        };
        let period = WindowPeriod {
            in_sample_start: start,
            in_sample_end: split,
            out_of_sample_start: split,
            out_of_sample_end: end,
        };

        assert_eq!(
            period.to_string(),
            "IS 2024-01-01..2024-02-15 / OOS 2024-02-15..2024-03-01"
        );
        assert!(period.in_sample_contains(start));
        assert!(!period.in_sample_contains(split));
        assert!(period.out_of_sample_contains(split));
        assert!(!period.out_of_sample_contains(end));
    }

    #[test]
    fn test_rejection_rate() {
        assert_eq!(RunStats::default().rejection_rate(), 0.0);
        let stats = RunStats {
            total_parameter_tests: 40,
            total_rejected: 30,
            ..RunStats::default()
        };
        assert!((stats.rejection_rate() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_results_serialize() {
        let results = WalkForwardResults {
            target: OptimizationTarget::SharpeRatio,
            periods: Vec::new(),
            summary: Summary::default(),
            stats: RunStats::default(),
            skipped_windows: Vec::new(),
        };

        let Ok(json) = serde_json::to_value(&results) else {
            panic!("results serialize");
        };
        assert_eq!(json["periods"], serde_json::json!([]));
        assert_eq!(json["summary"]["robustness_score"], serde_json::json!(0.0));
        assert!(RunOutcome::Completed(results).into_results().is_some());
        assert!(RunOutcome::Cancelled.is_cancelled());
    }
}
