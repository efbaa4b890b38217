//! Error types for walk-forward runs.
//!
//! Configuration problems are fatal and surface before any window is
//! processed. Per-window conditions (too few trades, no feasible
//! combination) are not errors; they are recorded as skipped windows.

use thiserror::Error;

/// Errors raised while validating or preparing a walk-forward run.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum WalkForwardError {
    /// The parameter grid is larger than the hard enumeration cap.
    #[error("Parameter grid has {count} combinations, exceeding the maximum of {max}")]
    TooManyCombinations {
        /// Number of combinations the grid would produce (saturating).
        count: u128,
        /// Configured maximum.
        max: usize,
    },

    /// Neither a scalar parameter nor a strategy weight is being swept.
    #[error("At least one parameter range or strategy weight must be enabled")]
    NoEnabledParameters,

    /// A window length or step is not strictly positive.
    #[error("{field} must be greater than zero, got {value}")]
    InvalidWindow {
        /// Name of the offending field.
        field: &'static str,
        /// Value that was supplied.
        value: i64,
    },

    /// A parameter or weight range is malformed.
    #[error("Invalid range for '{parameter}': {message}")]
    InvalidRange {
        /// Parameter key (e.g. `kelly_multiplier` or `strategy:Iron Condor`).
        parameter: String,
        /// What is wrong with the range.
        message: String,
    },

    /// A threshold is outside its allowed interval.
    #[error("Invalid threshold '{name}': {value} ({message})")]
    InvalidThreshold {
        /// Threshold name.
        name: &'static str,
        /// Value that was supplied.
        value: f64,
        /// Allowed interval.
        message: &'static str,
    },

    /// The dedicated grid-search thread pool could not be created.
    #[error("Failed to initialize thread pool: {message}")]
    ThreadPool {
        /// Error message from rayon.
        message: String,
    },
}
