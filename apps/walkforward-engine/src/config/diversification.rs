//! Diversification limits and performance floors.

use serde::{Deserialize, Serialize};

use crate::stats::CorrelationMethod;
use crate::trade::DateBasis;

/// How daily strategy P/L is normalized before computing correlations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Normalization {
    /// Dollar P/L.
    #[default]
    Raw,
    /// P/L divided by margin requirement.
    Margin,
    /// P/L per contract.
    Notional,
}

/// Diversification constraints applied when strategy weights are in play.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiversificationConfig {
    /// Reject combinations whose active strategies are too correlated.
    pub enable_correlation_constraint: bool,
    /// Largest allowed absolute pairwise correlation.
    pub max_correlation_threshold: f64,
    /// Correlation coefficient to use.
    pub correlation_method: CorrelationMethod,
    /// Reject combinations whose strategies lose together too often.
    pub enable_tail_risk_constraint: bool,
    /// Largest allowed pairwise lower-tail dependence.
    pub max_tail_dependence_threshold: f64,
    /// Quantile defining the loss tail (0.1 = worst 10% of days).
    pub tail_threshold: f64,
    /// Daily P/L normalization.
    pub normalization: Normalization,
    /// Which trade date keys daily P/L.
    pub date_basis: DateBasis,
}

impl Default for DiversificationConfig {
    fn default() -> Self {
        Self {
            enable_correlation_constraint: false,
            max_correlation_threshold: 0.7,
            correlation_method: CorrelationMethod::Pearson,
            enable_tail_risk_constraint: false,
            max_tail_dependence_threshold: 0.5,
            tail_threshold: 0.1,
            normalization: Normalization::Raw,
            date_basis: DateBasis::Opened,
        }
    }
}

/// Minimum in-sample performance a combination must reach to be selectable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceFloor {
    /// Enforce `min_sharpe_ratio`.
    pub enable_min_sharpe: bool,
    /// Minimum annualized Sharpe ratio.
    pub min_sharpe_ratio: f64,
    /// Enforce `min_profit_factor`.
    pub enable_min_profit_factor: bool,
    /// Minimum profit factor.
    pub min_profit_factor: f64,
}

impl Default for PerformanceFloor {
    fn default() -> Self {
        Self {
            enable_min_sharpe: false,
            min_sharpe_ratio: 0.5,
            enable_min_profit_factor: false,
            min_profit_factor: 1.2,
        }
    }
}
