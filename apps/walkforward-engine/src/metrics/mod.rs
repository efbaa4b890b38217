//! Performance metrics calculation for sized trade series.
//!
//! Implements the statistics used as optimization targets and performance
//! floors:
//! - Net P/L, average daily P/L, win rate
//! - Profit factor (gross profit / gross loss)
//! - Sharpe and Sortino ratios (annualized from daily returns)
//! - CAGR and Calmar ratio (CAGR / maximum drawdown)
//! - Maximum drawdown (peak-to-trough decline)

mod calculator;
mod constants;
mod format;
mod math;
mod types;

pub use calculator::PerformanceCalculator;
pub use format::{format_pct, format_ratio};
pub use types::{PerformanceSummary, TradeRecord, UNBOUNDED_TARGET_SCORE};
