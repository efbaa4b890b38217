//! Risk circuit breakers applied while scanning a scaled trade series.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::types::SkipReason;
use crate::metrics::TradeRecord;

/// Circuit breaker limits for one parameter combination.
///
/// `None` disables the breaker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BreakerLimits {
    /// Drawdown from peak equity (percent) that halts trading.
    pub max_drawdown_pct: Option<Decimal>,
    /// Loss within one day (percent of start-of-day equity) that pauses trading.
    pub max_daily_loss_pct: Option<Decimal>,
    /// Losing streak length that pauses trading once exceeded.
    pub consecutive_loss_limit: Option<u32>,
}

impl BreakerLimits {
    /// Whether any breaker is armed.
    #[must_use]
    pub const fn any_enabled(&self) -> bool {
        self.max_drawdown_pct.is_some()
            || self.max_daily_loss_pct.is_some()
            || self.consecutive_loss_limit.is_some()
    }
}

/// Accumulator threaded through the trade scan.
#[derive(Debug, Clone)]
pub struct BreakerState {
    limits: BreakerLimits,
    equity: Decimal,
    peak_equity: Decimal,
    current_day: Option<NaiveDate>,
    day_start_equity: Decimal,
    day_pl: Decimal,
    loss_streak: u32,
    halted: bool,
    daily_paused: bool,
    streak_paused: bool,
}

impl BreakerState {
    /// Start a scan with `initial_capital` equity.
    #[must_use]
    pub const fn new(limits: BreakerLimits, initial_capital: Decimal) -> Self {
        Self {
            limits,
            equity: initial_capital,
            peak_equity: initial_capital,
            current_day: None,
            day_start_equity: initial_capital,
            day_pl: Decimal::ZERO,
            loss_streak: 0,
            halted: false,
            daily_paused: false,
            streak_paused: false,
        }
    }

    /// Current simulated equity.
    #[must_use]
    pub const fn equity(&self) -> Decimal {
        self.equity
    }

    /// Offer the next trade. Returns `None` if it is taken, or the breaker
    /// that keeps it out.
    pub fn admit(&mut self, trade: &TradeRecord) -> Option<SkipReason> {
        if self.halted {
            return Some(SkipReason::DrawdownHalt);
        }

        if self.current_day != Some(trade.date_opened) {
            self.current_day = Some(trade.date_opened);
            self.day_start_equity = self.equity;
            self.day_pl = Decimal::ZERO;
            self.daily_paused = false;
        }

        if self.streak_paused {
            // Paused trades still move the streak
            if trade.pl < Decimal::ZERO {
                self.loss_streak = self.loss_streak.saturating_add(1);
            } else if trade.pl > Decimal::ZERO {
                self.loss_streak = 0;
                self.streak_paused = false;
                if !self.daily_paused {
                    return Some(SkipReason::LossStreakPause);
                }
            }
        }

        if self.daily_paused {
            return Some(SkipReason::DailyLossPause);
        }
        if self.streak_paused {
            return Some(SkipReason::LossStreakPause);
        }

        self.take(trade);
        None
    }

    fn take(&mut self, trade: &TradeRecord) {
        self.equity += trade.pl;
        self.peak_equity = self.peak_equity.max(self.equity);
        self.day_pl += trade.pl;

        if trade.pl < Decimal::ZERO {
            self.loss_streak = self.loss_streak.saturating_add(1);
        } else if trade.pl > Decimal::ZERO {
            self.loss_streak = 0;
        }

        let hundred = Decimal::ONE_HUNDRED;

        if let Some(limit) = self.limits.max_drawdown_pct
            && self.peak_equity > Decimal::ZERO
        {
            let drawdown_pct = (self.peak_equity - self.equity) / self.peak_equity * hundred;
            if drawdown_pct > limit {
                self.halted = true;
                return;
            }
        }

        if let Some(limit) = self.limits.max_daily_loss_pct
            && self.day_pl < Decimal::ZERO
            && self.day_start_equity > Decimal::ZERO
        {
            let loss_pct = -self.day_pl / self.day_start_equity * hundred;
            if loss_pct > limit {
                self.daily_paused = true;
            }
        }

        if let Some(limit) = self.limits.consecutive_loss_limit
            && self.loss_streak > limit
        {
            self.streak_paused = true;
        }
    }
}
