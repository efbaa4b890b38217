//! Historical trade records consumed by the engine.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Which trade date keys a trade into a calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DateBasis {
    /// Key by the date the trade was opened.
    #[default]
    Opened,
    /// Key by the date the trade was closed.
    Closed,
}

/// A completed historical trade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    /// Date the position was opened.
    pub date_opened: NaiveDate,
    /// Date the position was closed.
    pub date_closed: NaiveDate,
    /// Strategy tag.
    pub strategy: String,
    /// Realized profit or loss.
    pub pl: Decimal,
    /// Number of contracts traded.
    pub num_contracts: u32,
    /// Margin requirement for the position.
    pub margin_req: Decimal,
    /// Maximum possible profit, if known.
    #[serde(default)]
    pub max_profit: Option<Decimal>,
    /// Maximum possible loss, if known.
    #[serde(default)]
    pub max_loss: Option<Decimal>,
}

impl Trade {
    /// Rescale money fields to a single contract.
    ///
    /// Trades with zero contracts are returned unchanged.
    #[must_use]
    pub fn normalized_to_one_lot(&self) -> Self {
        if self.num_contracts <= 1 {
            return self.clone();
        }
        let lots = Decimal::from(self.num_contracts);
        Self {
            pl: self.pl / lots,
            margin_req: self.margin_req / lots,
            max_profit: self.max_profit.map(|v| v / lots),
            max_loss: self.max_loss.map(|v| v / lots),
            num_contracts: 1,
            ..self.clone()
        }
    }
}

/// Filter, normalize and order trades once before any window is processed.
///
/// An empty `selected` list keeps every strategy. The result is sorted by
/// `date_opened`; trades opened on the same day keep their input order.
#[must_use]
pub fn prepare_trades(trades: &[Trade], selected: &[String], normalize_to_1_lot: bool) -> Vec<Trade> {
    let selected: BTreeSet<&str> = selected.iter().map(String::as_str).collect();

    let mut prepared: Vec<Trade> = trades
        .iter()
        .filter(|t| selected.is_empty() || selected.contains(t.strategy.as_str()))
        .map(|t| {
            if normalize_to_1_lot {
                t.normalized_to_one_lot()
            } else {
                t.clone()
            }
        })
        .collect();

    prepared.sort_by_key(|t| t.date_opened);
    prepared
}
