//! Per-strategy daily return series.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::config::Normalization;
use crate::metrics::TradeRecord;
use crate::trade::DateBasis;

/// Daily values keyed by strategy, then by day.
pub type StrategyReturns = BTreeMap<String, BTreeMap<NaiveDate, f64>>;

#[derive(Default)]
struct DayBucket {
    pl: Decimal,
    margin: Decimal,
    contracts: u64,
}

/// Group trades into one value per strategy per day.
///
/// Days whose normalization denominator is zero are dropped.
#[must_use]
pub fn daily_returns(
    trades: &[TradeRecord],
    basis: DateBasis,
    normalization: Normalization,
) -> StrategyReturns {
    let mut buckets: BTreeMap<&str, BTreeMap<NaiveDate, DayBucket>> = BTreeMap::new();

    for trade in trades {
        let day = trade.date_for(basis);
        let bucket = buckets
            .entry(trade.strategy.as_str())
            .or_default()
            .entry(day)
            .or_default();
        bucket.pl += trade.pl;
        bucket.margin += trade.margin_req;
        bucket.contracts += u64::from(trade.num_contracts);
    }

    buckets
        .into_iter()
        .map(|(strategy, days)| {
            let series = days
                .into_iter()
                .filter_map(|(day, bucket)| {
                    let value = match normalization {
                        Normalization::Raw => Some(bucket.pl),
                        Normalization::Margin => (!bucket.margin.is_zero())
                            .then(|| bucket.pl / bucket.margin),
                        Normalization::Notional => (bucket.contracts > 0)
                            .then(|| bucket.pl / Decimal::from(bucket.contracts)),
                    }?;
                    Some((day, value.to_f64()?))
                })
                .collect();
            (strategy.to_string(), series)
        })
        .collect()
}

/// Values of both series on the days they share, in date order.
#[must_use]
pub fn aligned(
    first: &BTreeMap<NaiveDate, f64>,
    second: &BTreeMap<NaiveDate, f64>,
) -> (Vec<f64>, Vec<f64>) {
    first
        .iter()
        .filter_map(|(day, a)| second.get(day).map(|b| (*a, *b)))
        .unzip()
}
