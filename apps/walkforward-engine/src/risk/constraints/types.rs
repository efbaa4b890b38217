//! Type definitions for constraint evaluation.
//!
//! Contains the data structures shared by the constraint checks:
//! - Violation codes and violations
//! - Pairwise strategy statistics
//! - Diversification profile of a scaled series

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which constraint a combination violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViolationCode {
    /// A pair of active strategies is too correlated.
    CorrelationExceeded,
    /// A pair of active strategies loses together too often.
    TailDependenceExceeded,
    /// In-sample Sharpe ratio below the floor.
    SharpeBelowFloor,
    /// In-sample profit factor below the floor.
    ProfitFactorBelowFloor,
    /// The weight sweep left no strategy trading.
    NoActiveStrategies,
}

impl fmt::Display for ViolationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CorrelationExceeded => write!(f, "CORRELATION_EXCEEDED"),
            Self::TailDependenceExceeded => write!(f, "TAIL_DEPENDENCE_EXCEEDED"),
            Self::SharpeBelowFloor => write!(f, "SHARPE_BELOW_FLOOR"),
            Self::ProfitFactorBelowFloor => write!(f, "PROFIT_FACTOR_BELOW_FLOOR"),
            Self::NoActiveStrategies => write!(f, "NO_ACTIVE_STRATEGIES"),
        }
    }
}

/// A single failed constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintViolation {
    /// Constraint that failed.
    pub code: ViolationCode,
    /// Human-readable description.
    pub message: String,
    /// Observed value.
    pub observed: f64,
    /// Configured limit.
    pub limit: f64,
}

/// Co-movement statistics for one pair of strategies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairStatistics {
    /// First strategy.
    pub first: String,
    /// Second strategy.
    pub second: String,
    /// Days on which both strategies traded.
    pub overlapping_days: usize,
    /// Correlation of daily returns on overlapping days.
    pub correlation: Option<f64>,
    /// Empirical lower-tail dependence on overlapping days.
    pub tail_dependence: Option<f64>,
}

/// Diversification summary of the strategies active in a scaled series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DiversificationProfile {
    /// Active strategies, sorted by name.
    pub strategies: Vec<String>,
    /// Pairwise statistics, one entry per unordered pair.
    pub pairs: Vec<PairStatistics>,
    /// Largest absolute pairwise correlation (0 when undefined).
    pub max_abs_correlation: f64,
    /// Mean absolute pairwise correlation (0 when undefined).
    pub avg_abs_correlation: f64,
    /// Largest pairwise tail dependence (0 when undefined).
    pub max_tail_dependence: f64,
    /// Mean pairwise tail dependence (0 when undefined).
    pub avg_tail_dependence: f64,
    /// Effective number of independent strategies, `n^2 / sum(rho_ij^2)`.
    pub effective_factors: f64,
}

/// Outcome of checking one combination.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConstraintCheck {
    /// Failed constraints; empty when the combination is feasible.
    pub violations: Vec<ConstraintViolation>,
    /// Diversification profile, when one was needed.
    pub profile: Option<DiversificationProfile>,
}

impl ConstraintCheck {
    /// Whether every constraint held.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_violation_code_serialization() {
        let json = match serde_json::to_string(&ViolationCode::TailDependenceExceeded) {
            Ok(j) => j,
            Err(e) => panic!("Serialization failed: {e}"),
        };
        assert_eq!(json, "\"TAIL_DEPENDENCE_EXCEEDED\"");
        assert_eq!(ViolationCode::SharpeBelowFloor.to_string(), "SHARPE_BELOW_FLOOR");
    }

    #[test]
    fn test_constraint_check_default_passes() {
        let check = ConstraintCheck::default();
        assert!(check.passed());
        assert!(check.profile.is_none());
    }
}
