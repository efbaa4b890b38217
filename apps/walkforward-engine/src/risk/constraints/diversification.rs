//! Correlation and tail-dependence checks across active strategies.

use super::returns::{aligned, daily_returns};
use super::types::{ConstraintViolation, DiversificationProfile, PairStatistics, ViolationCode};
use crate::config::DiversificationConfig;
use crate::metrics::TradeRecord;
use crate::stats::{correlate, lower_tail_dependence};

/// Build the diversification profile of the strategies in `trades`.
///
/// Pairs sharing fewer than two trading days get no statistics; they are left
/// out of the maxima and averages and count as uncorrelated for
/// `effective_factors`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn profile(trades: &[TradeRecord], config: &DiversificationConfig) -> DiversificationProfile {
    let returns = daily_returns(trades, config.date_basis, config.normalization);
    let strategies: Vec<String> = returns.keys().cloned().collect();

    let mut pairs = Vec::new();
    for (i, first) in strategies.iter().enumerate() {
        for second in &strategies[i + 1..] {
            let (x, y) = aligned(&returns[first], &returns[second]);
            let (correlation, tail_dependence) = if x.len() < 2 {
                (None, None)
            } else {
                (
                    correlate(config.correlation_method, &x, &y),
                    lower_tail_dependence(&x, &y, config.tail_threshold),
                )
            };
            pairs.push(PairStatistics {
                first: first.clone(),
                second: second.clone(),
                overlapping_days: x.len(),
                correlation,
                tail_dependence,
            });
        }
    }

    let correlations: Vec<f64> = pairs.iter().filter_map(|p| p.correlation).collect();
    let tails: Vec<f64> = pairs.iter().filter_map(|p| p.tail_dependence).collect();

    let (max_abs_correlation, avg_abs_correlation) = max_and_mean(correlations.iter().map(|r| r.abs()));
    let (max_tail_dependence, avg_tail_dependence) = max_and_mean(tails.iter().copied());

    let n = strategies.len() as f64;
    let effective_factors = if strategies.is_empty() {
        0.0
    } else {
        // Diagonal contributes n; each off-diagonal pair appears twice
        let off_diagonal: f64 = correlations.iter().map(|r| r * r).sum();
        n * n / (n + 2.0 * off_diagonal)
    };

    DiversificationProfile {
        strategies,
        pairs,
        max_abs_correlation,
        avg_abs_correlation,
        max_tail_dependence,
        avg_tail_dependence,
        effective_factors,
    }
}

/// Correlation limit check.
#[must_use]
pub fn check_correlation(
    profile: &DiversificationProfile,
    config: &DiversificationConfig,
) -> Option<ConstraintViolation> {
    if !config.enable_correlation_constraint
        || profile.max_abs_correlation <= config.max_correlation_threshold
    {
        return None;
    }

    let worst = profile
        .pairs
        .iter()
        .filter_map(|p| p.correlation.map(|r| (p, r.abs())))
        .max_by(|a, b| a.1.total_cmp(&b.1));
    let pair = worst.map_or_else(String::new, |(p, _)| format!(" ({} / {})", p.first, p.second));

    Some(ConstraintViolation {
        code: ViolationCode::CorrelationExceeded,
        message: format!(
            "Correlation {:.3}{pair} exceeds limit {:.3}",
            profile.max_abs_correlation, config.max_correlation_threshold
        ),
        observed: profile.max_abs_correlation,
        limit: config.max_correlation_threshold,
    })
}

/// Tail-dependence limit check.
#[must_use]
pub fn check_tail_dependence(
    profile: &DiversificationProfile,
    config: &DiversificationConfig,
) -> Option<ConstraintViolation> {
    if !config.enable_tail_risk_constraint
        || profile.max_tail_dependence <= config.max_tail_dependence_threshold
    {
        return None;
    }

    Some(ConstraintViolation {
        code: ViolationCode::TailDependenceExceeded,
        message: format!(
            "Tail dependence {:.3} exceeds limit {:.3}",
            profile.max_tail_dependence, config.max_tail_dependence_threshold
        ),
        observed: profile.max_tail_dependence,
        limit: config.max_tail_dependence_threshold,
    })
}

#[allow(clippy::cast_precision_loss)]
fn max_and_mean(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (max, sum, count) = values.fold((0.0_f64, 0.0, 0_usize), |(max, sum, count), v| {
        (max.max(v), sum + v, count + 1)
    });
    if count == 0 {
        (0.0, 0.0)
    } else {
        (max, sum / count as f64)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use super::*;
    use crate::stats::CorrelationMethod;

    fn series(strategy: &str, pls: &[i64]) -> Vec<TradeRecord> {
        pls.iter()
            .enumerate()
            .map(|(i, pl)| {
                let Some(date) = NaiveDate::from_ymd_opt(2024, 1, 1)
                    .and_then(|d| d.checked_add_days(chrono::Days::new(i as u64)))
                else {
                    panic!("valid test date");
                };
                TradeRecord {
                    date_opened: date,
                    date_closed: date,
                    strategy: strategy.to_string(),
                    pl: Decimal::from(*pl),
                    margin_req: Decimal::from(1000),
                    num_contracts: 1,
                }
            })
            .collect()
    }

    fn enabled_config() -> DiversificationConfig {
        DiversificationConfig {
            enable_correlation_constraint: true,
            max_correlation_threshold: 0.5,
            enable_tail_risk_constraint: true,
            max_tail_dependence_threshold: 0.5,
            tail_threshold: 0.2,
            ..Default::default()
        }
    }

    #[test]
    fn test_single_strategy_profile() {
        let trades = series("A", &[10, -5, 20]);
        let p = profile(&trades, &DiversificationConfig::default());

        assert_eq!(p.strategies, vec!["A".to_string()]);
        assert!(p.pairs.is_empty());
        assert_eq!(p.avg_abs_correlation, 0.0);
        assert_eq!(p.effective_factors, 1.0);
    }

    #[test]
    fn test_identical_strategies_violate_both_limits() {
        let pls = [10, -50, 20, 5, -40, 30, 15, -10, 25, -35];
        let mut trades = series("A", &pls);
        let doubled: Vec<i64> = pls.iter().map(|v| v * 2).collect();
        trades.extend(series("B", &doubled));

        let config = enabled_config();
        let p = profile(&trades, &config);

        assert_eq!(p.pairs.len(), 1);
        assert!((p.max_abs_correlation - 1.0).abs() < 1e-9);
        assert!((p.effective_factors - 1.0).abs() < 1e-9);
        assert!((p.max_tail_dependence - 1.0).abs() < 1e-9);

        let Some(v) = check_correlation(&p, &config) else {
            panic!("perfectly correlated pair should violate");
        };
        assert_eq!(v.code, ViolationCode::CorrelationExceeded);
        assert!(v.message.contains("A / B"));
        assert!(check_tail_dependence(&p, &config).is_some());
    }

    #[test]
    fn test_opposite_strategies_pass_tail_check() {
        let pls = [10, -50, 20, 5, -40, 30, 15, -10, 25, -35];
        let mut trades = series("A", &pls);
        let mirrored: Vec<i64> = pls.iter().map(|v| -v).collect();
        trades.extend(series("B", &mirrored));

        let config = DiversificationConfig {
            correlation_method: CorrelationMethod::Spearman,
            ..enabled_config()
        };
        let p = profile(&trades, &config);

        // |rho| = 1 still counts against the correlation limit
        assert!(check_correlation(&p, &config).is_some());
        assert_eq!(p.max_tail_dependence, 0.0);
        assert!(check_tail_dependence(&p, &config).is_none());
    }

    #[test]
    fn test_disjoint_days_have_no_statistics() {
        let mut trades = series("A", &[1, 2]);
        let mut later = series("B", &[3, 4]);
        for t in &mut later {
            t.date_opened = t.date_opened + chrono::Days::new(10);
        }
        trades.extend(later);

        let p = profile(&trades, &enabled_config());

        assert_eq!(p.pairs[0].overlapping_days, 0);
        assert!(p.pairs[0].correlation.is_none());
        assert_eq!(p.effective_factors, 2.0);
        assert!(check_correlation(&p, &enabled_config()).is_none());
    }
}
