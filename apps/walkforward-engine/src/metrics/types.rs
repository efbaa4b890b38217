//! Core types for performance metrics.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::config::OptimizationTarget;
use crate::trade::DateBasis;

/// A trade after position sizing, as it enters the P/L series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeRecord {
    /// Date the position was opened.
    pub date_opened: NaiveDate,
    /// Date the position was closed.
    pub date_closed: NaiveDate,
    /// Strategy tag.
    pub strategy: String,
    /// Scaled profit or loss.
    pub pl: Decimal,
    /// Scaled margin requirement.
    pub margin_req: Decimal,
    /// Contract count of the underlying trade.
    pub num_contracts: u32,
}

impl TradeRecord {
    /// Check if this trade was profitable.
    #[must_use]
    pub fn is_winner(&self) -> bool {
        self.pl > Decimal::ZERO
    }

    /// The calendar day this trade belongs to under `basis`.
    #[must_use]
    pub const fn date_for(&self, basis: DateBasis) -> NaiveDate {
        match basis {
            DateBasis::Opened => self.date_opened,
            DateBasis::Closed => self.date_closed,
        }
    }
}

/// Score given to a ratio target whose denominator is zero on a profitable
/// series. Finite, so in-sample/out-of-sample ratios stay defined.
pub const UNBOUNDED_TARGET_SCORE: f64 = 1.0e6;

/// Performance summary with all calculated metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    // Basic metrics
    /// Net profit or loss.
    pub net_pl: Decimal,
    /// Starting equity.
    pub initial_equity: Decimal,
    /// Equity after the last trade.
    pub final_equity: Decimal,
    /// Total return (decimal, e.g., 0.15 = 15%).
    pub total_return: Decimal,
    /// Compound annual growth rate (decimal).
    pub cagr: Option<Decimal>,
    /// Average P/L per trading day.
    pub avg_daily_pl: Decimal,
    /// Number of distinct days with a closed trade.
    pub trading_days: u64,

    // Risk-adjusted metrics
    /// Annualized Sharpe ratio of daily returns.
    pub sharpe_ratio: Option<Decimal>,
    /// Annualized Sortino ratio of daily returns.
    pub sortino_ratio: Option<Decimal>,
    /// CAGR divided by maximum drawdown.
    pub calmar_ratio: Option<Decimal>,

    // Drawdown metrics
    /// Maximum drawdown (positive decimal, e.g., 0.20 = 20%).
    pub max_drawdown: Decimal,

    // Trade statistics
    /// Total number of trades.
    pub total_trades: u64,
    /// Number of winning trades.
    pub winning_trades: u64,
    /// Number of losing trades.
    pub losing_trades: u64,
    /// Win rate (decimal, e.g., 0.55 = 55%).
    pub win_rate: Decimal,
    /// Profit factor (gross profit / gross loss).
    pub profit_factor: Option<Decimal>,
    /// Average winning trade.
    pub avg_win: Decimal,
    /// Average losing trade (positive value).
    pub avg_loss: Decimal,
    /// Gross profit.
    pub gross_profit: Decimal,
    /// Gross loss (positive value).
    pub gross_loss: Decimal,
    /// Maximum consecutive losses.
    pub max_consecutive_losses: u64,
}

impl PerformanceSummary {
    /// Value of a performance target, or `None` when the metric is undefined
    /// for this series or the target is a diversification target.
    #[must_use]
    pub fn target_metric(&self, target: OptimizationTarget) -> Option<f64> {
        let value = match target {
            OptimizationTarget::NetPl => Some(self.net_pl),
            OptimizationTarget::ProfitFactor => self.profit_factor,
            OptimizationTarget::SharpeRatio => self.sharpe_ratio,
            OptimizationTarget::SortinoRatio => self.sortino_ratio,
            OptimizationTarget::CalmarRatio => self.calmar_ratio,
            OptimizationTarget::Cagr => self.cagr,
            OptimizationTarget::AvgDailyPl => Some(self.avg_daily_pl),
            OptimizationTarget::WinRate => Some(self.win_rate),
            OptimizationTarget::MinAvgCorrelation
            | OptimizationTarget::MinTailRisk
            | OptimizationTarget::MaxEffectiveFactors => None,
        };
        value.and_then(|v| v.to_f64())
    }

    /// Score of a performance target; higher is better.
    ///
    /// Ratios with a zero denominator on a profitable series score
    /// [`UNBOUNDED_TARGET_SCORE`]: profit factor without losing trades,
    /// Sharpe or Sortino without (downside) variance, Calmar without
    /// drawdown. Any other undefined metric scores 0.
    #[must_use]
    pub fn target_score(&self, target: OptimizationTarget) -> f64 {
        if let Some(value) = self.target_metric(target) {
            return value;
        }
        let unbounded = match target {
            OptimizationTarget::ProfitFactor => self.gross_profit > Decimal::ZERO,
            OptimizationTarget::SharpeRatio | OptimizationTarget::SortinoRatio => {
                self.trading_days >= 2 && self.net_pl > Decimal::ZERO
            }
            OptimizationTarget::CalmarRatio => {
                self.max_drawdown == Decimal::ZERO && self.cagr.is_some_and(|c| c > Decimal::ZERO)
            }
            _ => false,
        };
        if unbounded { UNBOUNDED_TARGET_SCORE } else { 0.0 }
    }
}

impl Default for PerformanceSummary {
    fn default() -> Self {
        Self {
            net_pl: Decimal::ZERO,
            initial_equity: Decimal::ZERO,
            final_equity: Decimal::ZERO,
            total_return: Decimal::ZERO,
            cagr: None,
            avg_daily_pl: Decimal::ZERO,
            trading_days: 0,
            sharpe_ratio: None,
            sortino_ratio: None,
            calmar_ratio: None,
            max_drawdown: Decimal::ZERO,
            total_trades: 0,
            winning_trades: 0,
            losing_trades: 0,
            win_rate: Decimal::ZERO,
            profit_factor: None,
            avg_win: Decimal::ZERO,
            avg_loss: Decimal::ZERO,
            gross_profit: Decimal::ZERO,
            gross_loss: Decimal::ZERO,
            max_consecutive_losses: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use test_case::test_case;

    use super::*;

    #[test]
    fn test_target_metric_mapping() {
        let summary = PerformanceSummary {
            net_pl: dec!(1250.5),
            win_rate: dec!(0.6),
            sharpe_ratio: Some(dec!(1.5)),
            ..Default::default()
        };

        assert_eq!(summary.target_metric(OptimizationTarget::NetPl), Some(1250.5));
        assert_eq!(summary.target_metric(OptimizationTarget::WinRate), Some(0.6));
        assert_eq!(summary.target_metric(OptimizationTarget::SharpeRatio), Some(1.5));
        assert_eq!(summary.target_metric(OptimizationTarget::ProfitFactor), None);
        assert_eq!(summary.target_metric(OptimizationTarget::MinTailRisk), None);
    }

    #[test_case(OptimizationTarget::ProfitFactor, dec!(300), dec!(0), 3, None, UNBOUNDED_TARGET_SCORE ; "profit factor without losses")]
    #[test_case(OptimizationTarget::ProfitFactor, dec!(0), dec!(0), 0, None, 0.0 ; "profit factor without trades")]
    #[test_case(OptimizationTarget::SharpeRatio, dec!(300), dec!(0), 3, None, UNBOUNDED_TARGET_SCORE ; "sharpe of steady gains")]
    #[test_case(OptimizationTarget::SharpeRatio, dec!(300), dec!(0), 1, None, 0.0 ; "sharpe of one day")]
    #[test_case(OptimizationTarget::SortinoRatio, dec!(-50), dec!(0), 3, None, 0.0 ; "sortino of a losing series")]
    #[test_case(OptimizationTarget::CalmarRatio, dec!(300), dec!(0), 3, Some(dec!(0.2)), UNBOUNDED_TARGET_SCORE ; "calmar without drawdown")]
    #[test_case(OptimizationTarget::CalmarRatio, dec!(300), dec!(0.1), 3, Some(dec!(0.2)), 0.0 ; "calmar left undefined")]
    fn test_undefined_target_score(
        target: OptimizationTarget,
        net_pl: Decimal,
        max_drawdown: Decimal,
        trading_days: u64,
        cagr: Option<Decimal>,
        expected: f64,
    ) {
        let summary = PerformanceSummary {
            net_pl,
            gross_profit: net_pl.max(Decimal::ZERO),
            max_drawdown,
            trading_days,
            cagr,
            ..Default::default()
        };
        assert_eq!(summary.target_score(target), expected);
    }

    #[test]
    fn test_defined_target_score_is_the_metric() {
        let summary = PerformanceSummary {
            profit_factor: Some(dec!(2.5)),
            gross_profit: dec!(250),
            ..Default::default()
        };
        assert_eq!(summary.target_score(OptimizationTarget::ProfitFactor), 2.5);
    }
}
