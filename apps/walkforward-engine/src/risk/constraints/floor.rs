//! Minimum in-sample performance checks.

use super::types::{ConstraintViolation, ViolationCode};
use crate::config::{OptimizationTarget, PerformanceFloor};
use crate::metrics::PerformanceSummary;

/// Check `metrics` against the enabled floors.
///
/// Undefined ratios are read through [`PerformanceSummary::target_score`]:
/// a profitable series without losses clears the profit-factor floor.
#[must_use]
pub fn check_performance_floor(
    metrics: &PerformanceSummary,
    floor: &PerformanceFloor,
) -> Vec<ConstraintViolation> {
    let mut violations = Vec::new();

    if floor.enable_min_sharpe {
        let sharpe = metrics.target_score(OptimizationTarget::SharpeRatio);
        if sharpe < floor.min_sharpe_ratio {
            violations.push(ConstraintViolation {
                code: ViolationCode::SharpeBelowFloor,
                message: format!(
                    "Sharpe ratio {sharpe:.2} below floor {:.2}",
                    floor.min_sharpe_ratio
                ),
                observed: sharpe,
                limit: floor.min_sharpe_ratio,
            });
        }
    }

    if floor.enable_min_profit_factor {
        let profit_factor = metrics.target_score(OptimizationTarget::ProfitFactor);
        if profit_factor < floor.min_profit_factor {
            violations.push(ConstraintViolation {
                code: ViolationCode::ProfitFactorBelowFloor,
                message: format!(
                    "Profit factor {profit_factor:.2} below floor {:.2}",
                    floor.min_profit_factor
                ),
                observed: profit_factor,
                limit: floor.min_profit_factor,
            });
        }
    }

    violations
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use test_case::test_case;

    use super::*;

    fn floor() -> PerformanceFloor {
        PerformanceFloor {
            enable_min_sharpe: true,
            min_sharpe_ratio: 1.0,
            enable_min_profit_factor: true,
            min_profit_factor: 1.5,
        }
    }

    #[test]
    fn test_disabled_floor_passes_anything() {
        let metrics = PerformanceSummary::default();
        assert!(check_performance_floor(&metrics, &PerformanceFloor::default()).is_empty());
    }

    #[test_case(Some(dec!(1.2)), Some(dec!(2.0)), dec!(100), &[] ; "both above")]
    #[test_case(None, Some(dec!(2.0)), dec!(100), &[ViolationCode::SharpeBelowFloor] ; "missing sharpe counts as zero")]
    #[test_case(Some(dec!(1.2)), None, dec!(100), &[] ; "no losses is infinite profit factor")]
    #[test_case(Some(dec!(1.2)), None, dec!(0), &[ViolationCode::ProfitFactorBelowFloor] ; "no profit is zero profit factor")]
    #[test_case(Some(dec!(0.5)), Some(dec!(1.1)), dec!(100), &[ViolationCode::SharpeBelowFloor, ViolationCode::ProfitFactorBelowFloor] ; "both below")]
    fn test_floor_checks(
        sharpe: Option<Decimal>,
        profit_factor: Option<Decimal>,
        gross_profit: Decimal,
        expected: &[ViolationCode],
    ) {
        let metrics = PerformanceSummary {
            sharpe_ratio: sharpe,
            profit_factor,
            gross_profit,
            ..Default::default()
        };
        let codes: Vec<ViolationCode> = check_performance_floor(&metrics, &floor())
            .into_iter()
            .map(|v| v.code)
            .collect();
        assert_eq!(codes, expected);
    }
}
