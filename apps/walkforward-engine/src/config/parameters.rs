//! Sweepable sizing parameters and strategy weight ranges.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Scalar position-sizing and risk parameters the optimizer can sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepParameter {
    /// Multiplier applied to the base position size.
    KellyMultiplier,
    /// Percent of capital per trade, relative to the baseline fraction.
    FixedFractionPct,
    /// Drawdown from peak equity (percent) that halts trading.
    MaxDrawdownPct,
    /// Single-day loss (percent of start-of-day equity) that pauses trading.
    MaxDailyLossPct,
    /// Losing streak length that pauses trading once exceeded.
    ConsecutiveLossLimit,
}

impl SweepParameter {
    /// Every sweepable parameter, in grid order.
    pub const ALL: [Self; 5] = [
        Self::KellyMultiplier,
        Self::FixedFractionPct,
        Self::MaxDrawdownPct,
        Self::MaxDailyLossPct,
        Self::ConsecutiveLossLimit,
    ];

    /// Key used in parameter combinations.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::KellyMultiplier => "kelly_multiplier",
            Self::FixedFractionPct => "fixed_fraction_pct",
            Self::MaxDrawdownPct => "max_drawdown_pct",
            Self::MaxDailyLossPct => "max_daily_loss_pct",
            Self::ConsecutiveLossLimit => "consecutive_loss_limit",
        }
    }

    /// Default sweep range; only the Kelly multiplier is enabled.
    #[must_use]
    pub const fn default_range(self) -> ParameterRange {
        match self {
            Self::KellyMultiplier => ParameterRange::new(0.5, 1.5, 0.25, true),
            Self::FixedFractionPct => ParameterRange::new(1.0, 4.0, 1.0, false),
            Self::MaxDrawdownPct => ParameterRange::new(5.0, 25.0, 5.0, false),
            Self::MaxDailyLossPct => ParameterRange::new(1.0, 5.0, 1.0, false),
            Self::ConsecutiveLossLimit => ParameterRange::new(2.0, 6.0, 1.0, false),
        }
    }
}

impl fmt::Display for SweepParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Inclusive `[min, max]` range sampled every `step`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterRange {
    /// Lower bound.
    pub min: f64,
    /// Upper bound.
    pub max: f64,
    /// Distance between grid points.
    pub step: f64,
    /// Whether this parameter is part of the grid.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl ParameterRange {
    /// Create a new range.
    #[must_use]
    pub const fn new(min: f64, max: f64, step: f64, enabled: bool) -> Self {
        Self {
            min,
            max,
            step,
            enabled,
        }
    }
}

/// How strategy weights are swept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WeightSweepMode {
    /// Each enabled strategy is either excluded (0) or included (1).
    #[default]
    Binary,
    /// Only the first `top_n_count` enabled strategies are swept over their
    /// ranges; the rest stay at weight 1.
    TopN,
}

/// Weight range for one strategy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightRange {
    /// Lower bound.
    pub min: f64,
    /// Upper bound.
    pub max: f64,
    /// Distance between grid points.
    pub step: f64,
}

impl Default for WeightRange {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 1.0,
            step: 0.5,
        }
    }
}

/// Weight sweep settings for one strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyWeightConfig {
    /// Strategy name as it appears on trades.
    pub strategy: String,
    /// Weight range (ignored in binary mode).
    #[serde(default)]
    pub range: WeightRange,
    /// Whether this strategy's weight is swept.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// Optional per-strategy weight grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyWeightSweep {
    /// Sweep mode.
    #[serde(default)]
    pub mode: WeightSweepMode,
    /// Number of strategies swept in top-N mode.
    #[serde(default = "default_top_n")]
    pub top_n_count: usize,
    /// Strategies in priority order.
    #[serde(default)]
    pub configs: Vec<StrategyWeightConfig>,
}

impl Default for StrategyWeightSweep {
    fn default() -> Self {
        Self {
            mode: WeightSweepMode::Binary,
            top_n_count: default_top_n(),
            configs: Vec::new(),
        }
    }
}

impl StrategyWeightSweep {
    /// Strategies whose weight becomes a grid dimension, in priority order.
    #[must_use]
    pub fn swept(&self) -> Vec<&StrategyWeightConfig> {
        let enabled = self.configs.iter().filter(|c| c.enabled);
        match self.mode {
            WeightSweepMode::Binary => enabled.collect(),
            WeightSweepMode::TopN => enabled.take(self.top_n_count).collect(),
        }
    }
}

/// Key for a strategy weight in parameter combinations.
#[must_use]
pub fn strategy_weight_key(strategy: &str) -> String {
    format!("strategy:{strategy}")
}

pub(crate) const fn default_true() -> bool {
    true
}

const fn default_top_n() -> usize {
    3
}
