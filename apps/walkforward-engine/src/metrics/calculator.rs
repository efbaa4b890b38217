//! Performance calculator for scaled P/L series.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};

use super::constants::{DAYS_PER_YEAR, TRADING_DAYS};
use super::math::{annualization_factor, downside_deviation, mean, std_dev};
use super::types::{PerformanceSummary, TradeRecord};

/// Computes [`PerformanceSummary`] values from a series of sized trades.
///
/// Equity starts at `initial_equity` and accumulates trade P/L in series
/// order. Daily returns for Sharpe and Sortino are taken on trade close dates
/// relative to the equity at the start of that day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PerformanceCalculator {
    initial_equity: Decimal,
    risk_free_rate: Decimal,
}

impl Default for PerformanceCalculator {
    fn default() -> Self {
        Self::new(Decimal::from(100_000))
    }
}

impl PerformanceCalculator {
    /// Create a new performance calculator.
    #[must_use]
    pub fn new(initial_equity: Decimal) -> Self {
        Self {
            initial_equity,
            risk_free_rate: Decimal::new(5, 2), // 5% default risk-free rate
        }
    }

    /// Set the annual risk-free rate for Sharpe/Sortino calculations.
    #[must_use]
    pub const fn with_risk_free_rate(mut self, rate: Decimal) -> Self {
        self.risk_free_rate = rate;
        self
    }

    /// Starting equity.
    #[must_use]
    pub const fn initial_equity(&self) -> Decimal {
        self.initial_equity
    }

    /// Calculate all performance metrics.
    #[must_use]
    pub fn calculate(&self, trades: &[TradeRecord]) -> PerformanceSummary {
        if trades.is_empty() {
            return PerformanceSummary {
                initial_equity: self.initial_equity,
                final_equity: self.initial_equity,
                ..Default::default()
            };
        }

        let (gross_profit, gross_loss, winning_trades, losing_trades) = trade_stats(trades);
        let total_trades = trades.len() as u64;
        let net_pl = gross_profit - gross_loss;
        let final_equity = self.initial_equity + net_pl;

        let win_rate = Decimal::from(winning_trades) / Decimal::from(total_trades);
        let avg_win = if winning_trades > 0 {
            gross_profit / Decimal::from(winning_trades)
        } else {
            Decimal::ZERO
        };
        let avg_loss = if losing_trades > 0 {
            gross_loss / Decimal::from(losing_trades)
        } else {
            Decimal::ZERO
        };
        let profit_factor = if gross_loss > Decimal::ZERO {
            Some(gross_profit / gross_loss)
        } else {
            None
        };

        let total_return = if self.initial_equity > Decimal::ZERO {
            net_pl / self.initial_equity
        } else {
            Decimal::ZERO
        };

        let daily_pl = daily_pl(trades);
        let trading_days = daily_pl.len() as u64;
        let avg_daily_pl = net_pl / Decimal::from(trading_days.max(1));

        let returns = self.daily_returns(&daily_pl);
        let max_drawdown = self.max_drawdown(trades);
        let cagr = self.cagr(final_equity, calendar_days(trades));
        let calmar_ratio = match cagr {
            Some(c) if max_drawdown > Decimal::ZERO => Some(c / max_drawdown),
            _ => None,
        };

        PerformanceSummary {
            net_pl,
            initial_equity: self.initial_equity,
            final_equity,
            total_return,
            cagr,
            avg_daily_pl,
            trading_days,
            sharpe_ratio: self.calculate_sharpe(&returns),
            sortino_ratio: self.calculate_sortino(&returns),
            calmar_ratio,
            max_drawdown,
            total_trades,
            winning_trades,
            losing_trades,
            win_rate,
            profit_factor,
            avg_win,
            avg_loss,
            gross_profit,
            gross_loss,
            max_consecutive_losses: max_consecutive_losses(trades),
        }
    }

    fn daily_returns(&self, daily_pl: &BTreeMap<NaiveDate, Decimal>) -> Vec<Decimal> {
        let mut equity = self.initial_equity;
        let mut returns = Vec::with_capacity(daily_pl.len());
        for pl in daily_pl.values() {
            if equity > Decimal::ZERO {
                returns.push(*pl / equity);
            }
            equity += *pl;
        }
        returns
    }

    fn max_drawdown(&self, trades: &[TradeRecord]) -> Decimal {
        let mut equity = self.initial_equity;
        let mut peak = self.initial_equity;
        let mut max_drawdown = Decimal::ZERO;

        for trade in trades {
            equity += trade.pl;
            if equity > peak {
                peak = equity;
            } else if peak > Decimal::ZERO {
                max_drawdown = max_drawdown.max((peak - equity) / peak);
            }
        }

        max_drawdown
    }

    fn cagr(&self, final_equity: Decimal, days: i64) -> Option<Decimal> {
        if self.initial_equity <= Decimal::ZERO {
            return None;
        }
        if final_equity <= Decimal::ZERO {
            return Some(Decimal::NEGATIVE_ONE);
        }

        let growth = (final_equity / self.initial_equity).to_f64()?;
        let years = days.max(1) as f64 / DAYS_PER_YEAR;
        let rate = growth.powf(1.0 / years) - 1.0;
        if rate.is_finite() {
            Decimal::from_f64(rate)
        } else {
            None
        }
    }

    fn daily_risk_free(&self) -> Decimal {
        self.risk_free_rate / TRADING_DAYS
    }

    /// Sharpe = (Mean Daily Return - Daily Risk Free) / StdDev * sqrt(252)
    fn calculate_sharpe(&self, returns: &[Decimal]) -> Option<Decimal> {
        if returns.len() < 2 {
            return None;
        }

        let avg = mean(returns)?;
        let std = std_dev(returns)?;
        if std == Decimal::ZERO {
            return None;
        }

        Some((avg - self.daily_risk_free()) / std * annualization_factor()?)
    }

    /// Sortino = (Mean Daily Return - Daily Risk Free) / Downside Deviation * sqrt(252)
    fn calculate_sortino(&self, returns: &[Decimal]) -> Option<Decimal> {
        if returns.len() < 2 {
            return None;
        }

        let floor = self.daily_risk_free();
        let avg = mean(returns)?;
        let downside = downside_deviation(returns, floor)?;
        if downside == Decimal::ZERO {
            return None;
        }

        Some((avg - floor) / downside * annualization_factor()?)
    }
}

fn trade_stats(trades: &[TradeRecord]) -> (Decimal, Decimal, u64, u64) {
    let mut gross_profit = Decimal::ZERO;
    let mut gross_loss = Decimal::ZERO;
    let mut winning = 0u64;
    let mut losing = 0u64;

    for trade in trades {
        if trade.pl > Decimal::ZERO {
            gross_profit += trade.pl;
            winning += 1;
        } else if trade.pl < Decimal::ZERO {
            gross_loss += trade.pl.abs();
            losing += 1;
        }
    }

    (gross_profit, gross_loss, winning, losing)
}

fn max_consecutive_losses(trades: &[TradeRecord]) -> u64 {
    let mut max_losses = 0u64;
    let mut current = 0u64;
    for trade in trades {
        if trade.pl < Decimal::ZERO {
            current += 1;
            max_losses = max_losses.max(current);
        } else if trade.is_winner() {
            current = 0;
        }
    }
    max_losses
}

fn daily_pl(trades: &[TradeRecord]) -> BTreeMap<NaiveDate, Decimal> {
    let mut days: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    for trade in trades {
        *days.entry(trade.date_closed).or_default() += trade.pl;
    }
    days
}

/// Calendar span from the first open to the last close.
fn calendar_days(trades: &[TradeRecord]) -> i64 {
    let first = trades.iter().map(|t| t.date_opened).min();
    let last = trades.iter().map(|t| t.date_closed).max();
    match (first, last) {
        (Some(first), Some(last)) => (last - first).num_days(),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn make_trade(day: u32, pl: Decimal) -> TradeRecord {
        let Some(date) = NaiveDate::from_ymd_opt(2024, 3, day) else {
            panic!("valid test date");
        };
        TradeRecord {
            date_opened: date,
            date_closed: date,
            strategy: "Put Spread".to_string(),
            pl,
            margin_req: dec!(1000),
            num_contracts: 1,
        }
    }

    fn calculator() -> PerformanceCalculator {
        PerformanceCalculator::new(dec!(100000)).with_risk_free_rate(Decimal::ZERO)
    }

    #[test]
    fn test_win_rate_and_profit_factor() {
        let trades = vec![
            make_trade(1, dec!(500)),
            make_trade(2, dec!(300)),
            make_trade(3, dec!(200)),
            make_trade(4, dec!(-400)),
            make_trade(5, dec!(-100)),
        ];

        let summary = calculator().calculate(&trades);
        assert_eq!(summary.total_trades, 5);
        assert_eq!(summary.winning_trades, 3);
        assert_eq!(summary.losing_trades, 2);
        assert_eq!(summary.win_rate, dec!(0.6));
        assert_eq!(summary.net_pl, dec!(500));
        assert_eq!(summary.profit_factor, Some(dec!(2)));
        assert_eq!(summary.avg_loss, dec!(250));
        assert_eq!(summary.final_equity, dec!(100500));
        assert_eq!(summary.max_consecutive_losses, 2);
    }

    #[test]
    fn test_drawdown_calculation() {
        let trades = vec![
            make_trade(1, dec!(10000)),
            make_trade(2, dec!(-5000)),
            make_trade(3, dec!(3000)),
            make_trade(4, dec!(-13000)),
            make_trade(5, dec!(5000)),
        ];

        let summary = calculator().calculate(&trades);
        // Peak 110_000, trough 95_000
        assert_eq!(summary.max_drawdown, dec!(15000) / dec!(110000));
        assert!(summary.calmar_ratio.is_some());
    }

    #[test]
    fn test_avg_daily_pl_groups_by_close_date() {
        let trades = vec![
            make_trade(1, dec!(100)),
            make_trade(1, dec!(50)),
            make_trade(2, dec!(-30)),
        ];

        let summary = calculator().calculate(&trades);
        assert_eq!(summary.trading_days, 2);
        assert_eq!(summary.avg_daily_pl, dec!(60));
    }

    #[test]
    fn test_sharpe_sign_follows_returns() {
        let winners: Vec<_> = (1..=10)
            .map(|d| make_trade(d, if d % 3 == 0 { dec!(-100) } else { dec!(250) }))
            .collect();
        let losers: Vec<_> = (1..=10)
            .map(|d| make_trade(d, if d % 3 == 0 { dec!(100) } else { dec!(-250) }))
            .collect();

        let Some(good) = calculator().calculate(&winners).sharpe_ratio else {
            panic!("sharpe should be defined");
        };
        let Some(bad) = calculator().calculate(&losers).sharpe_ratio else {
            panic!("sharpe should be defined");
        };
        assert!(good > Decimal::ZERO);
        assert!(bad < Decimal::ZERO);
        assert!(calculator().calculate(&winners).sortino_ratio.is_some());
    }

    #[test]
    fn test_constant_returns_have_no_sharpe() {
        let trades = vec![make_trade(1, dec!(0)), make_trade(2, dec!(0))];
        let summary = calculator().calculate(&trades);
        assert_eq!(summary.sharpe_ratio, None);
        assert_eq!(summary.profit_factor, None);
    }

    #[test]
    fn test_cagr() {
        // 10% over a 365-day span
        let Some(open) = NaiveDate::from_ymd_opt(2023, 1, 1) else {
            panic!("valid date");
        };
        let Some(close) = NaiveDate::from_ymd_opt(2024, 1, 1) else {
            panic!("valid date");
        };
        let trade = TradeRecord {
            date_opened: open,
            date_closed: close,
            strategy: "Calendar".to_string(),
            pl: dec!(10000),
            margin_req: dec!(5000),
            num_contracts: 1,
        };

        let Some(cagr) = calculator().calculate(&[trade]).cagr else {
            panic!("cagr should be defined");
        };
        assert!((cagr - dec!(0.1)).abs() < dec!(0.0001));
    }

    #[test]
    fn test_empty_trades() {
        let summary = calculator().calculate(&[]);

        assert_eq!(summary.total_trades, 0);
        assert_eq!(summary.win_rate, Decimal::ZERO);
        assert_eq!(summary.initial_equity, dec!(100000));
        assert_eq!(summary.final_equity, dec!(100000));
        assert_eq!(summary.cagr, None);
    }
}
