//! Rolling window generation.

use chrono::{NaiveDate, TimeDelta};

use super::types::WindowPeriod;
use crate::trade::Trade;

/// Windows covering the span of `trades` by `date_opened`.
///
/// Returns no windows for an empty history or a span shorter than
/// `in_sample_days + out_of_sample_days`.
#[must_use]
pub fn generate_windows(
    trades: &[Trade],
    in_sample_days: i64,
    out_of_sample_days: i64,
    step_size_days: i64,
) -> Vec<WindowPeriod> {
    let first = trades.iter().map(|t| t.date_opened).min();
    let last = trades.iter().map(|t| t.date_opened).max();
    match (first, last) {
        (Some(first), Some(last)) => generate_windows_between(
            first,
            last,
            in_sample_days,
            out_of_sample_days,
            step_size_days,
        ),
        _ => Vec::new(),
    }
}

/// Windows starting at `first`, advancing by `step_size_days`, while the
/// out-of-sample end does not pass `last`.
#[must_use]
pub fn generate_windows_between(
    first: NaiveDate,
    last: NaiveDate,
    in_sample_days: i64,
    out_of_sample_days: i64,
    step_size_days: i64,
) -> Vec<WindowPeriod> {
    let (Some(in_sample), Some(out_of_sample), Some(step)) = (
        TimeDelta::try_days(in_sample_days),
        TimeDelta::try_days(out_of_sample_days),
        TimeDelta::try_days(step_size_days),
    ) else {
        return Vec::new();
    };
    if in_sample_days <= 0 || out_of_sample_days <= 0 || step_size_days <= 0 {
        return Vec::new();
    }

    let mut windows = Vec::new();
    let mut cursor = first;
    loop {
        let Some(in_sample_end) = cursor.checked_add_signed(in_sample) else {
            break;
        };
        let Some(out_of_sample_end) = in_sample_end.checked_add_signed(out_of_sample) else {
            break;
        };
        if out_of_sample_end > last {
            break;
        }

        windows.push(WindowPeriod {
            in_sample_start: cursor,
            in_sample_end,
            out_of_sample_start: in_sample_end,
            out_of_sample_end,
        });

        let Some(next) = cursor.checked_add_signed(step) else {
            break;
        };
        cursor = next;
    }
    windows
}

/// In-sample and out-of-sample trades of `period`.
///
/// `trades` must be sorted by `date_opened`.
#[must_use]
pub fn split_trades<'a>(trades: &'a [Trade], period: &WindowPeriod) -> (&'a [Trade], &'a [Trade]) {
    let bound = |date: NaiveDate| trades.partition_point(|t| t.date_opened < date);
    let is_start = bound(period.in_sample_start);
    let is_end = bound(period.in_sample_end);
    let oos_end = bound(period.out_of_sample_end).max(is_end);
    (&trades[is_start..is_end], &trades[is_end..oos_end])
}
