//! Decimal constants for performance metric calculations.

use rust_decimal::Decimal;

pub const TWO: Decimal = Decimal::TWO;
pub const DAYS_PER_YEAR: f64 = 365.0;
pub const TRADING_DAYS: Decimal = Decimal::from_parts(252, 0, 0, false, 0);
pub const TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 7); // 0.0000001
