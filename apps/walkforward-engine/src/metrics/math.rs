//! Decimal math helpers for return statistics.

use rust_decimal::Decimal;

use super::constants::{TOLERANCE, TRADING_DAYS, TWO};

/// Calculate mean of a slice of decimals.
pub fn mean(values: &[Decimal]) -> Option<Decimal> {
    if values.is_empty() {
        return None;
    }
    let sum: Decimal = values.iter().sum();
    Some(sum / Decimal::from(values.len() as u64))
}

/// Sample standard deviation (N-1 denominator).
pub fn std_dev(values: &[Decimal]) -> Option<Decimal> {
    if values.len() < 2 {
        return None;
    }

    let avg = mean(values)?;
    let variance_sum: Decimal = values.iter().map(|v| (*v - avg) * (*v - avg)).sum();
    sqrt_decimal(variance_sum / Decimal::from((values.len() - 1) as u64))
}

/// Downside deviation below `floor`, averaged over every observation.
pub fn downside_deviation(values: &[Decimal], floor: Decimal) -> Option<Decimal> {
    if values.len() < 2 {
        return None;
    }

    let shortfall_sum: Decimal = values
        .iter()
        .filter(|v| **v < floor)
        .map(|v| (*v - floor) * (*v - floor))
        .sum();

    sqrt_decimal(shortfall_sum / Decimal::from(values.len() as u64))
}

/// Scale a per-day ratio to a yearly one (`sqrt(252)`).
pub fn annualization_factor() -> Option<Decimal> {
    sqrt_decimal(TRADING_DAYS)
}

/// Approximate square root using Newton's method.
pub fn sqrt_decimal(value: Decimal) -> Option<Decimal> {
    if value < Decimal::ZERO {
        return None;
    }
    if value == Decimal::ZERO {
        return Some(Decimal::ZERO);
    }

    let mut guess = if value > Decimal::ONE {
        value / TWO
    } else {
        Decimal::ONE
    };

    for _ in 0..100 {
        let next = (guess + value / guess) / TWO;
        if (next - guess).abs() < TOLERANCE {
            return Some(next);
        }
        guess = next;
    }

    Some(guess)
}
