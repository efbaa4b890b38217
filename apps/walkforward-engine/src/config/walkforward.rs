//! Walk-forward run configuration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::diversification::{DiversificationConfig, PerformanceFloor};
use super::parameters::{
    ParameterRange, StrategyWeightSweep, SweepParameter, WeightSweepMode, strategy_weight_key,
};
use crate::error::WalkForwardError;

/// Scalar the optimizer maximizes in each in-sample window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OptimizationTarget {
    /// Net profit or loss.
    #[default]
    NetPl,
    /// Gross profit / gross loss.
    ProfitFactor,
    /// Annualized Sharpe ratio.
    SharpeRatio,
    /// Annualized Sortino ratio.
    SortinoRatio,
    /// CAGR / maximum drawdown.
    CalmarRatio,
    /// Compound annual growth rate.
    Cagr,
    /// Average P/L per trading day.
    AvgDailyPl,
    /// Fraction of winning trades.
    WinRate,
    /// Minimize mean absolute pairwise correlation of active strategies.
    MinAvgCorrelation,
    /// Minimize mean pairwise lower-tail dependence of active strategies.
    MinTailRisk,
    /// Maximize the effective number of independent strategies.
    MaxEffectiveFactors,
}

impl OptimizationTarget {
    /// Whether the target is scored from strategy co-movement rather than P/L.
    #[must_use]
    pub const fn is_diversification(self) -> bool {
        matches!(
            self,
            Self::MinAvgCorrelation | Self::MinTailRisk | Self::MaxEffectiveFactors
        )
    }
}

/// Configuration for one walk-forward run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkForwardConfig {
    /// In-sample window length (days).
    pub in_sample_days: i64,
    /// Out-of-sample window length (days).
    pub out_of_sample_days: i64,
    /// Cursor advance between windows (days).
    pub step_size_days: i64,
    /// Windows with fewer in-sample trades are skipped.
    pub min_in_sample_trades: usize,
    /// Windows with fewer out-of-sample trades are skipped.
    pub min_out_of_sample_trades: usize,
    /// Metric maximized in each in-sample window.
    pub optimization_target: OptimizationTarget,
    /// Sweep ranges; missing parameters are disabled.
    pub parameter_ranges: BTreeMap<SweepParameter, ParameterRange>,
    /// Correlation and tail-risk limits.
    pub diversification: DiversificationConfig,
    /// Optional per-strategy weight grid.
    pub strategy_weight_sweep: StrategyWeightSweep,
    /// In-sample performance floors.
    pub performance_floor: PerformanceFloor,
    /// Only analyze these strategies (empty = all).
    pub selected_strategies: Vec<String>,
    /// Divide P/L and margin by contract count before sizing.
    pub normalize_to_1_lot: bool,
}

impl Default for WalkForwardConfig {
    fn default() -> Self {
        Self {
            in_sample_days: 45,
            out_of_sample_days: 15,
            step_size_days: 15,
            min_in_sample_trades: 10,
            min_out_of_sample_trades: 3,
            optimization_target: OptimizationTarget::NetPl,
            parameter_ranges: SweepParameter::ALL
                .into_iter()
                .map(|p| (p, p.default_range()))
                .collect(),
            diversification: DiversificationConfig::default(),
            strategy_weight_sweep: StrategyWeightSweep::default(),
            performance_floor: PerformanceFloor::default(),
            selected_strategies: Vec::new(),
            normalize_to_1_lot: false,
        }
    }
}

impl WalkForwardConfig {
    /// Enabled scalar parameters with their ranges, in grid order.
    #[must_use]
    pub fn enabled_parameters(&self) -> Vec<(SweepParameter, ParameterRange)> {
        self.parameter_ranges
            .iter()
            .filter(|(_, range)| range.enabled)
            .map(|(param, range)| (*param, *range))
            .collect()
    }

    /// Check structural validity before a run.
    ///
    /// The combination cap is enforced separately when the grid is built.
    pub fn validate(&self) -> Result<(), WalkForwardError> {
        for (field, value) in [
            ("in_sample_days", self.in_sample_days),
            ("out_of_sample_days", self.out_of_sample_days),
            ("step_size_days", self.step_size_days),
        ] {
            if value <= 0 {
                return Err(WalkForwardError::InvalidWindow { field, value });
            }
        }

        let enabled = self.enabled_parameters();
        for (param, range) in &enabled {
            validate_range(param.key(), range.min, range.max, range.step)?;
        }

        let swept = self.strategy_weight_sweep.swept();
        if self.strategy_weight_sweep.mode == WeightSweepMode::TopN {
            for config in &swept {
                let key = strategy_weight_key(&config.strategy);
                validate_range(&key, config.range.min, config.range.max, config.range.step)?;
                if config.range.min < 0.0 {
                    return Err(WalkForwardError::InvalidRange {
                        parameter: key,
                        message: "weights cannot be negative".to_string(),
                    });
                }
            }
        }

        if enabled.is_empty() && swept.is_empty() {
            return Err(WalkForwardError::NoEnabledParameters);
        }

        let div = &self.diversification;
        check_unit_interval("max_correlation_threshold", div.max_correlation_threshold)?;
        check_unit_interval(
            "max_tail_dependence_threshold",
            div.max_tail_dependence_threshold,
        )?;
        if !(div.tail_threshold > 0.0 && div.tail_threshold < 1.0) {
            return Err(WalkForwardError::InvalidThreshold {
                name: "tail_threshold",
                value: div.tail_threshold,
                message: "must be strictly between 0 and 1",
            });
        }

        Ok(())
    }
}

fn validate_range(key: &str, min: f64, max: f64, step: f64) -> Result<(), WalkForwardError> {
    let invalid = |message: &str| WalkForwardError::InvalidRange {
        parameter: key.to_string(),
        message: message.to_string(),
    };

    if !(min.is_finite() && max.is_finite() && step.is_finite()) {
        return Err(invalid("bounds and step must be finite"));
    }
    if step <= 0.0 {
        return Err(invalid("step must be positive"));
    }
    if max < min {
        return Err(invalid("max must not be less than min"));
    }
    Ok(())
}

fn check_unit_interval(name: &'static str, value: f64) -> Result<(), WalkForwardError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(WalkForwardError::InvalidThreshold {
            name,
            value,
            message: "must be between 0 and 1",
        })
    }
}
