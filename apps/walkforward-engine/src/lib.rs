// Allow unwrap/expect in tests - tests should panic on unexpected errors
// Allow test-specific patterns and pedantic lints in test code
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::match_same_arms,
        clippy::needless_pass_by_value,
        clippy::needless_collect,
        clippy::option_if_let_else,
        clippy::default_trait_access,
        clippy::items_after_statements,
        clippy::or_fun_call
    )
)]

//! Walk-Forward Engine - Rust Core Library
//!
//! Walk-forward optimization of position-sizing and risk parameters over a
//! historical trade log.
//!
//! # Pipeline
//!
//! For each rolling window:
//!
//! - **Windows** (`walkforward`): split the trade history into in-sample and
//!   out-of-sample ranges
//! - **Grid** (`parallel`): enumerate every combination of the swept
//!   parameters and strategy weights, capped at [`parallel::MAX_COMBINATIONS`]
//! - **Sizing** (`risk::sizing`): rescale trades by Kelly, fixed-fraction
//!   and weight multipliers, then apply drawdown, daily-loss and loss-streak
//!   circuit breakers
//! - **Constraints** (`risk::constraints`): reject combinations that breach
//!   correlation, tail-dependence or performance floors
//! - **Metrics** (`metrics`): score the sized series
//! - **Validation**: replay the in-sample optimum out of sample
//!
//! Results aggregate into degradation, stability and consistency scores, and
//! [`walkforward::assess`] turns them into a verdict.
//!
//! # Example
//!
//! ```rust,ignore
//! use walkforward_engine::{WalkForwardBuilder, assess, VerdictPolicy};
//!
//! let engine = WalkForwardBuilder::new().in_sample_days(45).build()?;
//! if let Some(results) = engine.run(&trades)?.into_results() {
//!     let verdict = assess(&results, &VerdictPolicy::default());
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

/// Configuration loading and run settings.
pub mod config;

/// Error types.
pub mod error;

/// Performance metrics of a sized trade series.
pub mod metrics;

/// Grid enumeration and parallel search.
pub mod parallel;

/// Position sizing and constraint evaluation.
pub mod risk;

/// Statistical primitives.
pub mod stats;

/// Logging setup.
pub mod telemetry;

/// Trade records consumed by the engine.
pub mod trade;

/// Walk-forward windows, engine and verdict.
pub mod walkforward;

pub use config::{EngineConfig, OptimizationTarget, WalkForwardConfig, load_config};
pub use error::WalkForwardError;
pub use metrics::{PerformanceCalculator, PerformanceSummary};
pub use parallel::{CancellationFlag, ParameterCombination, ProgressEvent, ProgressReporter};
pub use risk::{PositionScaler, TradeScaler};
pub use trade::Trade;
pub use walkforward::{
    Assessment, RunOutcome, VerdictPolicy, VerdictReport, WalkForwardBuilder, WalkForwardEngine,
    WalkForwardResults, assess,
};
