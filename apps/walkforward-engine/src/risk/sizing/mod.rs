//! Trade scaling for candidate parameter combinations.
//!
//! A combination resizes every trade by
//! `kelly_multiplier * (fixed_fraction_pct / baseline) * strategy_weight`,
//! then a single ordered pass applies the circuit breakers:
//!
//! - `max_drawdown_pct`: halts trading for the rest of the window
//! - `max_daily_loss_pct`: pauses trading until the next day
//! - `consecutive_loss_limit`: pauses trading until a winner is observed
//!
//! # Example
//!
//! ```rust,ignore
//! use walkforward_engine::risk::sizing::{PositionScaler, TradeScaler};
//! use walkforward_engine::ParameterCombination;
//!
//! let scaler = TradeScaler::new(dec!(100000), 2.0);
//! let combo = ParameterCombination::new().with("kelly_multiplier", 0.5);
//!
//! let series = scaler.scale(&trades, &combo);
//! println!("{} taken, {} skipped", series.trades.len(), series.skipped.len());
//! ```

mod breakers;
mod scaler;
mod types;

pub use breakers::{BreakerLimits, BreakerState};
pub use scaler::{PositionScaler, TradeScaler};
pub use types::{ScaledSeries, SkipReason, SkippedTrade};
