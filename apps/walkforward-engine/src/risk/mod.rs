//! Position sizing and constraint evaluation for candidate parameters.
//!
//! Each grid point flows through the same two stages:
//!
//! - `sizing`: resize trades and apply the risk circuit breakers
//! - `constraints`: check diversification limits and performance floors,
//!   and score the combination against the optimization target
//!
//! # Example
//!
//! ```rust,ignore
//! use walkforward_engine::risk::{ConstraintEvaluator, PositionScaler, TradeScaler};
//!
//! let scaler = TradeScaler::new(dec!(100000), 2.0);
//! let evaluator = ConstraintEvaluator::from_config(&config);
//!
//! let series = scaler.scale(&trades, &combo);
//! let metrics = calculator.calculate(&series.trades);
//! let check = evaluator.evaluate(&series, &metrics);
//!
//! if !check.passed() {
//!     for violation in &check.violations {
//!         println!("Violation: {} - {}", violation.code, violation.message);
//!     }
//! }
//! ```

pub mod constraints;
pub mod sizing;

pub use constraints::{
    ConstraintCheck, ConstraintEvaluator, ConstraintViolation, DiversificationProfile,
    PairStatistics, ViolationCode,
};
pub use sizing::{
    BreakerLimits, PositionScaler, ScaledSeries, SkipReason, SkippedTrade, TradeScaler,
};
