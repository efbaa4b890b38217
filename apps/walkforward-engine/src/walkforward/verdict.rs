//! Verdict scoring of walk-forward results.
//!
//! Each summary score is rated good, moderate or concerning against a
//! [`VerdictPolicy`]; the ratings sum to an overall verdict. Red flags are
//! reported alongside and do not change the verdict.

use std::fmt;

use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use super::types::{PeriodResult, WalkForwardResults};
use crate::metrics::{format_pct, format_ratio};

/// Rating of one score or of the whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    /// Below the moderate threshold.
    Concerning,
    /// Between the thresholds.
    Moderate,
    /// At or above the good threshold.
    Good,
}

impl Rating {
    /// Points contributed to the overall score.
    #[must_use]
    pub const fn points(self) -> u8 {
        match self {
            Self::Good => 2,
            Self::Moderate => 1,
            Self::Concerning => 0,
        }
    }

    fn classify(value: f64, thresholds: Thresholds) -> Self {
        if value >= thresholds.good {
            Self::Good
        } else if value >= thresholds.moderate {
            Self::Moderate
        } else {
            Self::Concerning
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Good => write!(f, "good"),
            Self::Moderate => write!(f, "moderate"),
            Self::Concerning => write!(f, "concerning"),
        }
    }
}

/// Good and moderate cut-offs for one score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Minimum value rated good.
    pub good: f64,
    /// Minimum value rated moderate.
    pub moderate: f64,
}

impl Thresholds {
    /// Create thresholds.
    #[must_use]
    pub const fn new(good: f64, moderate: f64) -> Self {
        Self { good, moderate }
    }
}

/// Cut-offs used to assess a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerdictPolicy {
    /// Degradation factor thresholds.
    pub efficiency: Thresholds,
    /// Parameter stability thresholds.
    pub stability: Thresholds,
    /// Consistency score thresholds.
    pub consistency: Thresholds,
    /// Minimum total points for an overall good verdict.
    pub good_score: u8,
    /// Minimum total points for an overall moderate verdict.
    pub moderate_score: u8,
    /// Efficiency below this raises a red flag.
    pub min_efficiency: f64,
    /// Parameter coefficient of variation above this raises a red flag.
    pub max_parameter_cv: f64,
    /// Fewer evaluated windows than this raises a red flag.
    pub min_windows: usize,
    /// Constraint rejection rate above this raises a red flag.
    pub max_rejection_rate: f64,
}

impl Default for VerdictPolicy {
    fn default() -> Self {
        Self {
            efficiency: Thresholds::new(0.8, 0.6),
            stability: Thresholds::new(0.7, 0.5),
            consistency: Thresholds::new(0.7, 0.5),
            good_score: 5,
            moderate_score: 3,
            min_efficiency: 0.5,
            max_parameter_cv: 0.3,
            min_windows: 3,
            max_rejection_rate: 0.9,
        }
    }
}

/// Score being rated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Component {
    /// Degradation factor.
    Efficiency,
    /// Parameter stability.
    Stability,
    /// Consistency score.
    Consistency,
}

/// Rating of one summary score with its explanation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentAssessment {
    /// Score being rated.
    pub component: Component,
    /// Score value.
    pub value: f64,
    /// Rating.
    pub rating: Rating,
    /// Why the score got its rating.
    pub explanation: String,
}

/// Warning raised independently of the ratings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RedFlag {
    /// Out-of-sample results keep less than the minimum share of in-sample.
    LowEfficiency {
        /// Degradation factor.
        efficiency: f64,
    },
    /// A parameter's optimal value moves around from window to window.
    UnstableParameter {
        /// Parameter key.
        parameter: String,
        /// Coefficient of variation.
        cv: f64,
    },
    /// Average out-of-sample loss exceeds average win, unlike in-sample.
    LossesOutweighWins {
        /// Mean out-of-sample average win.
        avg_win: f64,
        /// Mean out-of-sample average loss.
        avg_loss: f64,
    },
    /// Most windows lost money out of sample.
    MostlyNegativeWindows {
        /// Windows with a negative out-of-sample target.
        negative: usize,
        /// Evaluated windows.
        total: usize,
    },
    /// Too few windows for the scores to mean much.
    TooFewWindows {
        /// Evaluated windows.
        windows: usize,
        /// Policy minimum.
        minimum: usize,
    },
    /// Constraints rejected most of the grid.
    HighRejectionRate {
        /// Rejected share of evaluated combinations.
        rate: f64,
    },
}

impl RedFlag {
    /// Human-readable description.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::LowEfficiency { efficiency } => format!(
                "Out-of-sample results retain only {} of in-sample performance",
                format_pct(*efficiency)
            ),
            Self::UnstableParameter { parameter, cv } => format!(
                "Optimal {parameter} varies by {} across windows",
                format_pct(*cv)
            ),
            Self::LossesOutweighWins { avg_win, avg_loss } => format!(
                "Out-of-sample average loss ({}) exceeds average win ({})",
                format_ratio(*avg_loss),
                format_ratio(*avg_win)
            ),
            Self::MostlyNegativeWindows { negative, total } => {
                format!("{negative} of {total} out-of-sample windows were negative")
            }
            Self::TooFewWindows { windows, minimum } => {
                format!("Only {windows} windows evaluated; at least {minimum} recommended")
            }
            Self::HighRejectionRate { rate } => format!(
                "Constraints rejected {} of tested combinations",
                format_pct(*rate)
            ),
        }
    }
}

impl fmt::Display for RedFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// Full assessment of a completed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerdictReport {
    /// Overall rating.
    pub verdict: Rating,
    /// Sum of component points.
    pub score: u8,
    /// Per-score ratings.
    pub components: Vec<ComponentAssessment>,
    /// Warnings.
    pub red_flags: Vec<RedFlag>,
    /// One-line summary.
    pub headline: String,
}

/// Result of [`assess`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Assessment {
    /// No window was evaluated.
    InsufficientData {
        /// Why no verdict could be given.
        reason: String,
    },
    /// A verdict was reached.
    Complete(VerdictReport),
}

/// Assess `results` under `policy`.
#[must_use]
pub fn assess(results: &WalkForwardResults, policy: &VerdictPolicy) -> Assessment {
    if results.periods.is_empty() {
        let reason = if results.stats.windows_generated == 0 {
            "Trade history is shorter than one in-sample plus out-of-sample window".to_string()
        } else {
            format!(
                "All {} windows were skipped",
                results.stats.windows_generated
            )
        };
        return Assessment::InsufficientData { reason };
    }

    let summary = &results.summary;
    let components = vec![
        rate(
            Component::Efficiency,
            summary.degradation_factor,
            policy.efficiency,
            "Out-of-sample results kept {value} of in-sample performance",
        ),
        rate(
            Component::Stability,
            summary.parameter_stability,
            policy.stability,
            "Optimal parameters scored {value} stability across windows",
        ),
        rate(
            Component::Consistency,
            summary.consistency_score,
            policy.consistency,
            "{value} of out-of-sample windows were non-negative",
        ),
    ];

    let score: u8 = components.iter().map(|c| c.rating.points()).sum();
    let verdict = if score >= policy.good_score {
        Rating::Good
    } else if score >= policy.moderate_score {
        Rating::Moderate
    } else {
        Rating::Concerning
    };

    let headline = match verdict {
        Rating::Good => "Parameters held up out of sample",
        Rating::Moderate => "Parameters partly held up out of sample",
        Rating::Concerning => "Parameters did not hold up out of sample; likely fit to noise",
    }
    .to_string();

    Assessment::Complete(VerdictReport {
        verdict,
        score,
        components,
        red_flags: red_flags(results, policy),
        headline,
    })
}

fn rate(
    component: Component,
    value: f64,
    thresholds: Thresholds,
    template: &str,
) -> ComponentAssessment {
    let rating = Rating::classify(value, thresholds);
    let explanation = format!(
        "{} ({rating}; good at {}, moderate at {})",
        template.replace("{value}", &format_pct(value)),
        format_pct(thresholds.good),
        format_pct(thresholds.moderate)
    );
    ComponentAssessment {
        component,
        value,
        rating,
        explanation,
    }
}

/// Red flags for `results` under `policy`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn red_flags(results: &WalkForwardResults, policy: &VerdictPolicy) -> Vec<RedFlag> {
    let mut flags = Vec::new();
    let summary = &results.summary;
    let periods = &results.periods;

    if summary.degradation_factor < policy.min_efficiency {
        flags.push(RedFlag::LowEfficiency {
            efficiency: summary.degradation_factor,
        });
    }

    for (parameter, cv) in &summary.parameter_cv {
        if *cv > policy.max_parameter_cv {
            flags.push(RedFlag::UnstableParameter {
                parameter: parameter.clone(),
                cv: *cv,
            });
        }
    }

    let mean_of = |f: fn(&PeriodResult) -> f64| {
        periods.iter().map(f).sum::<f64>() / periods.len().max(1) as f64
    };
    let oos_win = mean_of(|p| p.out_of_sample_metrics.avg_win.to_f64().unwrap_or(0.0));
    let oos_loss = mean_of(|p| p.out_of_sample_metrics.avg_loss.to_f64().unwrap_or(0.0));
    let is_win = mean_of(|p| p.in_sample_metrics.avg_win.to_f64().unwrap_or(0.0));
    let is_loss = mean_of(|p| p.in_sample_metrics.avg_loss.to_f64().unwrap_or(0.0));
    if oos_loss > oos_win && is_loss <= is_win {
        flags.push(RedFlag::LossesOutweighWins {
            avg_win: oos_win,
            avg_loss: oos_loss,
        });
    }

    let negative = periods
        .iter()
        .filter(|p| p.out_of_sample_target < 0.0)
        .count();
    if negative * 2 > periods.len() {
        flags.push(RedFlag::MostlyNegativeWindows {
            negative,
            total: periods.len(),
        });
    }

    if periods.len() < policy.min_windows {
        flags.push(RedFlag::TooFewWindows {
            windows: periods.len(),
            minimum: policy.min_windows,
        });
    }

    let rate = results.stats.rejection_rate();
    if rate > policy.max_rejection_rate {
        flags.push(RedFlag::HighRejectionRate { rate });
    }

    flags
}
