//! Constraint evaluation for candidate parameter combinations.
//!
//! Provides deterministic feasibility checks for a scaled in-sample series:
//! - Pairwise correlation limit across active strategies
//! - Pairwise lower-tail dependence limit
//! - Minimum Sharpe ratio and profit factor
//! - At least one strategy left trading by the weight sweep
//!
//! The same diversification profile feeds the diversification optimization
//! targets, so the evaluator also scores combinations.

mod diversification;
mod floor;
mod returns;
mod types;

use crate::config::{DiversificationConfig, OptimizationTarget, PerformanceFloor, WalkForwardConfig};
use crate::metrics::PerformanceSummary;
use crate::risk::sizing::ScaledSeries;

pub use diversification::{check_correlation, check_tail_dependence, profile};
pub use floor::check_performance_floor;
pub use returns::{StrategyReturns, aligned, daily_returns};
pub use types::{
    ConstraintCheck, ConstraintViolation, DiversificationProfile, PairStatistics, ViolationCode,
};

/// Checks combinations against the run's constraints and scores them.
#[derive(Debug, Clone)]
pub struct ConstraintEvaluator {
    target: OptimizationTarget,
    diversification: DiversificationConfig,
    floor: PerformanceFloor,
    weights_swept: bool,
}

impl ConstraintEvaluator {
    /// Create an evaluator.
    #[must_use]
    pub const fn new(
        target: OptimizationTarget,
        diversification: DiversificationConfig,
        floor: PerformanceFloor,
        weights_swept: bool,
    ) -> Self {
        Self {
            target,
            diversification,
            floor,
            weights_swept,
        }
    }

    /// Create an evaluator from a run configuration.
    #[must_use]
    pub fn from_config(config: &WalkForwardConfig) -> Self {
        Self::new(
            config.optimization_target,
            config.diversification.clone(),
            config.performance_floor,
            !config.strategy_weight_sweep.swept().is_empty(),
        )
    }

    /// Target the evaluator scores.
    #[must_use]
    pub const fn target(&self) -> OptimizationTarget {
        self.target
    }

    fn needs_profile(&self) -> bool {
        self.diversification.enable_correlation_constraint
            || self.diversification.enable_tail_risk_constraint
            || self.target.is_diversification()
    }

    /// Diversification profile of the strategies active in `series`.
    #[must_use]
    pub fn profile(&self, series: &ScaledSeries) -> DiversificationProfile {
        profile(&series.trades, &self.diversification)
    }

    /// Check every enabled constraint.
    ///
    /// All violations are collected; any one of them rejects the combination.
    #[must_use]
    pub fn evaluate(&self, series: &ScaledSeries, metrics: &PerformanceSummary) -> ConstraintCheck {
        let mut violations = Vec::new();

        if self.weights_swept && series.trades.is_empty() {
            violations.push(ConstraintViolation {
                code: ViolationCode::NoActiveStrategies,
                message: "Strategy weights exclude every strategy".to_string(),
                observed: 0.0,
                limit: 1.0,
            });
        }

        let profile = self.needs_profile().then(|| self.profile(series));
        if let Some(p) = &profile {
            if let Some(v) = check_correlation(p, &self.diversification) {
                violations.push(v);
            }
            if let Some(v) = check_tail_dependence(p, &self.diversification) {
                violations.push(v);
            }
        }

        violations.extend(check_performance_floor(metrics, &self.floor));

        ConstraintCheck {
            violations,
            profile,
        }
    }

    /// Value of the optimization target; higher is better.
    ///
    /// Performance targets follow [`PerformanceSummary::target_score`].
    /// Diversification targets score on a positive scale so window ratios
    /// and sign checks read the same way as for P/L targets:
    /// `1 - mean|rho|`, `1 - mean lambda_L` and the effective factor count.
    /// They use `profile` when given and compute it otherwise.
    #[must_use]
    pub fn score(
        &self,
        series: &ScaledSeries,
        metrics: &PerformanceSummary,
        profile: Option<&DiversificationProfile>,
    ) -> f64 {
        if !self.target.is_diversification() {
            return metrics.target_score(self.target);
        }

        let computed;
        let profile = match profile {
            Some(p) => p,
            None => {
                computed = self.profile(series);
                &computed
            }
        };

        match self.target {
            OptimizationTarget::MinAvgCorrelation => 1.0 - profile.avg_abs_correlation,
            OptimizationTarget::MinTailRisk => 1.0 - profile.avg_tail_dependence,
            _ => profile.effective_factors,
        }
    }
}
