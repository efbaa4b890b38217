//! Applies a parameter combination to a trade list.

use rust_decimal::Decimal;
use rust_decimal::prelude::*;
use tracing::warn;

use super::breakers::{BreakerLimits, BreakerState};
use super::types::{ScaledSeries, SkippedTrade};
use crate::config::SweepParameter;
use crate::metrics::TradeRecord;
use crate::parallel::ParameterCombination;
use crate::trade::Trade;

/// Resizes a trade list for one parameter combination.
///
/// Implementations must be pure: the grid search calls `scale` concurrently
/// from the rayon pool.
pub trait PositionScaler: Send + Sync {
    /// Produce the sized series for `trades` under `combo`.
    fn scale(&self, trades: &[Trade], combo: &ParameterCombination) -> ScaledSeries;
}

/// Default scaler: Kelly and fixed-fraction multipliers, strategy weights,
/// then the risk circuit breakers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradeScaler {
    initial_capital: Decimal,
    baseline_fixed_fraction_pct: f64,
}

impl Default for TradeScaler {
    fn default() -> Self {
        Self::new(Decimal::from(100_000), 2.0)
    }
}

impl TradeScaler {
    /// Create a scaler.
    ///
    /// `baseline_fixed_fraction_pct` is the fraction at which the recorded
    /// trades were sized; a swept fraction is applied relative to it.
    #[must_use]
    pub const fn new(initial_capital: Decimal, baseline_fixed_fraction_pct: f64) -> Self {
        Self {
            initial_capital,
            baseline_fixed_fraction_pct,
        }
    }

    /// Starting equity of every scaled series.
    #[must_use]
    pub const fn initial_capital(&self) -> Decimal {
        self.initial_capital
    }

    /// Position multiplier before strategy weights.
    #[must_use]
    pub fn base_multiplier(&self, combo: &ParameterCombination) -> f64 {
        let kelly = combo
            .parameter(SweepParameter::KellyMultiplier)
            .unwrap_or(1.0);
        let fraction = combo
            .parameter(SweepParameter::FixedFractionPct)
            .filter(|_| self.baseline_fixed_fraction_pct > 0.0)
            .map_or(1.0, |pct| pct / self.baseline_fixed_fraction_pct);
        kelly * fraction
    }

    /// Breaker limits carried by `combo`.
    #[must_use]
    pub fn breaker_limits(combo: &ParameterCombination) -> BreakerLimits {
        BreakerLimits {
            max_drawdown_pct: combo
                .parameter(SweepParameter::MaxDrawdownPct)
                .and_then(Decimal::from_f64),
            max_daily_loss_pct: combo
                .parameter(SweepParameter::MaxDailyLossPct)
                .and_then(Decimal::from_f64),
            consecutive_loss_limit: combo
                .parameter(SweepParameter::ConsecutiveLossLimit)
                .and_then(|v| v.round().max(0.0).to_u32()),
        }
    }
}

impl PositionScaler for TradeScaler {
    fn scale(&self, trades: &[Trade], combo: &ParameterCombination) -> ScaledSeries {
        let base = self.base_multiplier(combo);
        let mut state = BreakerState::new(Self::breaker_limits(combo), self.initial_capital);
        let mut series = ScaledSeries::default();

        for (index, trade) in trades.iter().enumerate() {
            let weight = combo.strategy_weight(&trade.strategy);
            if weight <= 0.0 {
                continue;
            }

            let Some(multiplier) = Decimal::from_f64(base * weight) else {
                warn!(
                    strategy = %trade.strategy,
                    multiplier = base * weight,
                    "Position multiplier not representable; trade dropped"
                );
                continue;
            };
            let multiplier = multiplier.round_dp(8);
            let record = TradeRecord {
                date_opened: trade.date_opened,
                date_closed: trade.date_closed,
                strategy: trade.strategy.clone(),
                pl: trade.pl * multiplier,
                margin_req: trade.margin_req * multiplier,
                num_contracts: trade.num_contracts,
            };

            match state.admit(&record) {
                None => series.trades.push(record),
                Some(reason) => series.skipped.push(SkippedTrade {
                    index,
                    date_opened: trade.date_opened,
                    strategy: trade.strategy.clone(),
                    reason,
                }),
            }
        }

        series
    }
}
