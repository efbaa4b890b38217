//! Core types for scaled trade series.

use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::metrics::TradeRecord;

/// Circuit breaker that kept a trade out of the scaled series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Drawdown from peak equity exceeded the limit; trading is halted for
    /// the rest of the window.
    DrawdownHalt,
    /// The day's loss exceeded the limit; trading resumes the next day.
    DailyLossPause,
    /// The losing streak exceeded the limit; trading resumes after the
    /// first winner observed while paused.
    LossStreakPause,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DrawdownHalt => write!(f, "drawdown_halt"),
            Self::DailyLossPause => write!(f, "daily_loss_pause"),
            Self::LossStreakPause => write!(f, "loss_streak_pause"),
        }
    }
}

/// A trade the breakers skipped. Skipped trades stay in the history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedTrade {
    /// Position of the trade in the scaler input.
    pub index: usize,
    /// Date the trade was opened.
    pub date_opened: NaiveDate,
    /// Strategy tag.
    pub strategy: String,
    /// Breaker responsible.
    pub reason: SkipReason,
}

/// Output of one scaling pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaledSeries {
    /// Trades taken, resized, in input order.
    pub trades: Vec<TradeRecord>,
    /// Trades the breakers kept out.
    pub skipped: Vec<SkippedTrade>,
}

impl ScaledSeries {
    /// Distinct strategies with at least one taken trade, in first-seen order.
    #[must_use]
    pub fn active_strategies(&self) -> Vec<&str> {
        let mut seen = BTreeSet::new();
        self.trades
            .iter()
            .map(|t| t.strategy.as_str())
            .filter(|s| seen.insert(*s))
            .collect()
    }
}
