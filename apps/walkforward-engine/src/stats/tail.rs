//! Empirical tail dependence.

use super::descriptive::percentile;

/// Empirical lower-tail dependence of two aligned samples.
///
/// Each sample is cut at its own `threshold` quantile (e.g. `0.1` for the
/// worst 10% of days). The result is the number of days on which both
/// samples are in their tail, divided by the mean tail size of the two
/// samples, so it lies in `[0, 1]` and is symmetric in its arguments.
#[must_use]
pub fn lower_tail_dependence(x: &[f64], y: &[f64], threshold: f64) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 || !(threshold > 0.0 && threshold < 1.0) {
        return None;
    }

    let cut_x = percentile(x, threshold * 100.0)?;
    let cut_y = percentile(y, threshold * 100.0)?;

    let mut tail_x = 0usize;
    let mut tail_y = 0usize;
    let mut joint = 0usize;
    for (a, b) in x.iter().zip(y) {
        let in_x = *a <= cut_x;
        let in_y = *b <= cut_y;
        tail_x += usize::from(in_x);
        tail_y += usize::from(in_y);
        joint += usize::from(in_x && in_y);
    }

    let tail_size = (tail_x + tail_y) as f64 / 2.0;
    if tail_size == 0.0 {
        return None;
    }
    Some(joint as f64 / tail_size)
}
