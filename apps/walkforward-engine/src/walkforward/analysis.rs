//! Aggregation of window results into robustness scores.

use std::collections::BTreeMap;

use super::types::{PeriodResult, Summary};
use crate::stats::{mean, sample_std_dev};

/// In-sample targets smaller than this in magnitude give zero efficiency.
pub const EFFICIENCY_EPSILON: f64 = 1e-9;

/// Out-of-sample target as a fraction of the in-sample target.
#[must_use]
pub fn period_efficiency(in_sample_target: f64, out_of_sample_target: f64) -> f64 {
    if in_sample_target.abs() < EFFICIENCY_EPSILON {
        0.0
    } else {
        out_of_sample_target / in_sample_target
    }
}

/// Stability of one parameter's optimal values, in `[0, 1]`.
///
/// `1 - sample_std / |mean|`, clamped. Fewer than two values score 1; a zero
/// mean scores 1 only if the values do not vary.
#[must_use]
pub fn parameter_stability(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 1.0;
    }
    let (Some(avg), Some(std)) = (mean(values), sample_std_dev(values)) else {
        return 1.0;
    };
    if avg.abs() < EFFICIENCY_EPSILON {
        return if std < EFFICIENCY_EPSILON { 1.0 } else { 0.0 };
    }
    (1.0 - std / avg.abs()).clamp(0.0, 1.0)
}

/// Coefficient of variation, `sample_std / |mean|`.
///
/// Returns 0 for fewer than two values and `None` for a zero mean.
#[must_use]
pub fn coefficient_of_variation(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return Some(0.0);
    }
    let avg = mean(values)?;
    let std = sample_std_dev(values)?;
    if avg.abs() < EFFICIENCY_EPSILON {
        None
    } else {
        Some(std / avg.abs())
    }
}

/// Optimal values per parameter key, in period order.
#[must_use]
pub fn parameter_history(periods: &[PeriodResult]) -> BTreeMap<String, Vec<f64>> {
    let mut history: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for period in periods {
        for (key, value) in period.optimal_parameters.iter() {
            history.entry(key.to_string()).or_default().push(value);
        }
    }
    history
}

/// Aggregate robustness scores over evaluated windows.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn summarize(periods: &[PeriodResult]) -> Summary {
    if periods.is_empty() {
        return Summary::default();
    }

    let efficiencies: Vec<f64> = periods.iter().map(PeriodResult::efficiency).collect();
    let degradation_factor = mean(&efficiencies).unwrap_or(0.0);

    let history = parameter_history(periods);
    let stabilities: Vec<f64> = history.values().map(|v| parameter_stability(v)).collect();
    let parameter_stability = mean(&stabilities).unwrap_or(1.0);
    let parameter_cv = history
        .iter()
        .filter_map(|(key, values)| coefficient_of_variation(values).map(|cv| (key.clone(), cv)))
        .collect();

    let non_negative = periods
        .iter()
        .filter(|p| p.out_of_sample_target >= 0.0)
        .count();
    let consistency_score = non_negative as f64 / periods.len() as f64;

    let robustness_score =
        (degradation_factor.clamp(0.0, 1.0) + parameter_stability + consistency_score) / 3.0;

    let is_targets: Vec<f64> = periods.iter().map(|p| p.in_sample_target).collect();
    let oos_targets: Vec<f64> = periods.iter().map(|p| p.out_of_sample_target).collect();

    Summary {
        degradation_factor,
        parameter_stability,
        consistency_score,
        robustness_score,
        parameter_cv,
        avg_in_sample_target: mean(&is_targets).unwrap_or(0.0),
        avg_out_of_sample_target: mean(&oos_targets).unwrap_or(0.0),
    }
}
