//! Result types for grid search execution.

use serde::{Deserialize, Serialize};

use super::types::ParameterCombination;
use crate::metrics::PerformanceSummary;

/// A feasible combination and its in-sample score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Grid index of the combination.
    pub index: usize,
    /// Parameter values.
    pub combination: ParameterCombination,
    /// Optimization target value; higher is better.
    pub target: f64,
    /// Metrics of the scaled series.
    pub metrics: PerformanceSummary,
}

impl Candidate {
    /// Target value with NaN ranked below every number.
    #[must_use]
    pub const fn rank_value(&self) -> f64 {
        if self.target.is_nan() {
            f64::NEG_INFINITY
        } else {
            self.target
        }
    }

    /// The better of two candidates.
    ///
    /// A strictly greater target wins; equal targets keep the lower grid
    /// index. The rule is associative and commutative, so any reduction order
    /// picks the same winner.
    #[must_use]
    pub fn better(self, other: Self) -> Self {
        let (a, b) = (self.rank_value(), other.rank_value());
        if b > a || (b == a && other.index < self.index) {
            other
        } else {
            self
        }
    }
}

/// Outcome of searching one window's grid.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GridSearchResult {
    /// Best feasible combination, if any.
    pub best: Option<Candidate>,
    /// Combinations scaled and scored.
    pub combinations_evaluated: u64,
    /// Combinations rejected by a constraint.
    pub combinations_rejected: u64,
    /// Whether cancellation cut the search short.
    pub cancelled: bool,
}

impl GridSearchResult {
    /// Fold one more evaluated combination in.
    pub(crate) fn absorb(mut self, outcome: Evaluation) -> Self {
        match outcome {
            Evaluation::Cancelled => self.cancelled = true,
            Evaluation::Rejected => {
                self.combinations_evaluated += 1;
                self.combinations_rejected += 1;
            }
            Evaluation::Feasible(candidate) => {
                self.combinations_evaluated += 1;
                self.best = Some(match self.best {
                    Some(best) => best.better(candidate),
                    None => candidate,
                });
            }
        }
        self
    }

    /// Combine two partial results.
    pub(crate) fn merge(self, other: Self) -> Self {
        Self {
            best: match (self.best, other.best) {
                (Some(a), Some(b)) => Some(a.better(b)),
                (a, b) => a.or(b),
            },
            combinations_evaluated: self.combinations_evaluated + other.combinations_evaluated,
            combinations_rejected: self.combinations_rejected + other.combinations_rejected,
            cancelled: self.cancelled || other.cancelled,
        }
    }
}

/// Result of evaluating a single grid point.
#[derive(Debug, Clone)]
pub(crate) enum Evaluation {
    /// Not evaluated; cancellation was requested.
    Cancelled,
    /// Failed a constraint.
    Rejected,
    /// Passed every constraint.
    Feasible(Candidate),
}
