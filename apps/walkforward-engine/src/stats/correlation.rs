//! Pairwise correlation coefficients.

use serde::{Deserialize, Serialize};

/// Correlation coefficient used for diversification checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationMethod {
    /// Linear (product-moment) correlation.
    #[default]
    Pearson,
    /// Rank correlation with average ranks for ties.
    Spearman,
    /// Kendall tau-b, adjusted for ties.
    Kendall,
}

/// Correlate two equally long samples with the chosen method.
#[must_use]
pub fn correlate(method: CorrelationMethod, x: &[f64], y: &[f64]) -> Option<f64> {
    match method {
        CorrelationMethod::Pearson => pearson(x, y),
        CorrelationMethod::Spearman => spearman(x, y),
        CorrelationMethod::Kendall => kendall_tau_b(x, y),
    }
}

/// Pearson correlation. `None` for mismatched lengths, fewer than two points,
/// or a constant series.
#[must_use]
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }

    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (a, b) in x.iter().zip(y) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    if sxx <= 0.0 || syy <= 0.0 {
        return None;
    }

    Some((sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0))
}

/// 1-based ranks; tied values share the average of their positions.
#[must_use]
pub fn ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut result = vec![0.0; values.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && values[order[end]] == values[order[start]] {
            end += 1;
        }
        // Positions start+1 ..= end share their mean rank
        let rank = (start + 1 + end) as f64 / 2.0;
        for &idx in &order[start..end] {
            result[idx] = rank;
        }
        start = end;
    }
    result
}

/// Spearman rank correlation.
#[must_use]
pub fn spearman(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() {
        return None;
    }
    pearson(&ranks(x), &ranks(y))
}

/// Kendall tau-b.
#[must_use]
pub fn kendall_tau_b(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }

    let n = x.len();
    let mut concordant = 0usize;
    let mut discordant = 0usize;
    let mut tied_x = 0usize;
    let mut tied_y = 0usize;

    for i in 0..n {
        for j in (i + 1)..n {
            let dx = x[i] - x[j];
            let dy = y[i] - y[j];
            if dx == 0.0 {
                tied_x += 1;
            }
            if dy == 0.0 {
                tied_y += 1;
            }
            if dx == 0.0 || dy == 0.0 {
                continue;
            }
            if (dx > 0.0) == (dy > 0.0) {
                concordant += 1;
            } else {
                discordant += 1;
            }
        }
    }

    let pairs = n * (n - 1) / 2;
    let denominator = ((pairs - tied_x) as f64 * (pairs - tied_y) as f64).sqrt();
    if denominator <= 0.0 {
        return None;
    }

    Some(((concordant as f64 - discordant as f64) / denominator).clamp(-1.0, 1.0))
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    const X: [f64; 5] = [1.0, 2.0, 3.0, 4.0, 5.0];
    const Y: [f64; 5] = [2.0, 1.0, 4.0, 3.0, 5.0];

    #[test_case(CorrelationMethod::Pearson, 0.8 ; "pearson")]
    #[test_case(CorrelationMethod::Spearman, 0.8 ; "spearman")]
    #[test_case(CorrelationMethod::Kendall, 0.6 ; "kendall")]
    fn test_known_coefficients(method: CorrelationMethod, expected: f64) {
        let Some(rho) = correlate(method, &X, &Y) else {
            panic!("correlation should be defined");
        };
        assert!((rho - expected).abs() < 1e-12, "{method:?}: {rho}");
    }

    #[test_case(CorrelationMethod::Pearson ; "pearson")]
    #[test_case(CorrelationMethod::Spearman ; "spearman")]
    #[test_case(CorrelationMethod::Kendall ; "kendall")]
    fn test_perfect_inverse(method: CorrelationMethod) {
        let reversed: Vec<f64> = X.iter().rev().copied().collect();
        let Some(rho) = correlate(method, &X, &reversed) else {
            panic!("correlation should be defined");
        };
        assert!((rho + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_constant_series_is_undefined() {
        assert_eq!(pearson(&X, &[3.0; 5]), None);
        assert_eq!(spearman(&X, &[3.0; 5]), None);
        assert_eq!(kendall_tau_b(&X, &[3.0; 5]), None);
    }

    #[test]
    fn test_mismatched_or_short_inputs() {
        assert_eq!(pearson(&[1.0], &[2.0]), None);
        assert_eq!(pearson(&[1.0, 2.0], &[2.0]), None);
        assert_eq!(kendall_tau_b(&[1.0, 2.0, 3.0], &[1.0, 2.0]), None);
    }

    #[test]
    fn test_ranks_average_ties() {
        assert_eq!(ranks(&[10.0, 20.0, 20.0, 30.0]), vec![1.0, 2.5, 2.5, 4.0]);
        assert_eq!(ranks(&[3.0, 1.0, 2.0]), vec![3.0, 1.0, 2.0]);
    }

    #[test]
    fn test_kendall_with_ties() {
        // x has one tied pair; tau-b adjusts the denominator
        let x = [1.0, 1.0, 2.0, 3.0];
        let y = [1.0, 2.0, 3.0, 4.0];
        let Some(tau) = kendall_tau_b(&x, &y) else {
            panic!("tau-b should be defined");
        };
        // 6 pairs, 5 concordant, 1 tied in x: 5 / sqrt(5 * 6)
        assert!((tau - 5.0 / 30.0_f64.sqrt()).abs() < 1e-12);
    }
}
