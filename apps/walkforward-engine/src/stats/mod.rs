//! Pure statistical functions over `f64` samples.
//!
//! - Mean, sample standard deviation, percentile
//! - Pearson, Spearman and Kendall tau-b correlation, and matrices of them
//! - Empirical lower-tail dependence
//!
//! All functions return `None` rather than NaN when a statistic is undefined
//! for the given input (too few points, zero variance).

mod correlation;
mod descriptive;
mod tail;

pub use correlation::{CorrelationMethod, correlate, kendall_tau_b, pearson, ranks, spearman};
pub use descriptive::{mean, percentile, sample_std_dev};
pub use tail::lower_tail_dependence;
