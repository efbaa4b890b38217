//! Parameter grid for grid search optimization.

use serde::{Deserialize, Serialize};

use super::types::ParameterCombination;
use crate::config::{WalkForwardConfig, WeightSweepMode, strategy_weight_key};
use crate::error::WalkForwardError;

/// Hard cap on grid size.
pub const MAX_COMBINATIONS: usize = 20_000;

/// Slack for floating-point step counting.
const STEP_EPSILON: f64 = 1e-9;

/// Decimal places kept on generated grid values.
const VALUE_PRECISION: i32 = 10;

/// One grid axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimension {
    /// Combination key.
    pub key: String,
    /// Values in ascending order.
    pub values: Vec<f64>,
}

/// Cartesian product of swept dimensions, addressable by index.
///
/// Combinations are materialized lazily; index 0 is the first value of every
/// dimension and the last dimension varies fastest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterGrid {
    dimensions: Vec<Dimension>,
}

impl ParameterGrid {
    /// Create a new parameter grid builder.
    #[must_use]
    pub fn builder() -> ParameterGridBuilder {
        ParameterGridBuilder::new()
    }

    /// Build the grid for a run: enabled scalar parameters, then swept
    /// strategy weights in priority order.
    ///
    /// # Errors
    ///
    /// Returns `TooManyCombinations` when the product exceeds
    /// [`MAX_COMBINATIONS`]; nothing is enumerated in that case.
    pub fn from_config(config: &WalkForwardConfig) -> Result<Self, WalkForwardError> {
        let mut builder = Self::builder();

        for (param, range) in config.enabled_parameters() {
            builder = builder.add_range(param.key(), range.min, range.max, range.step);
        }

        let sweep = &config.strategy_weight_sweep;
        for weight in sweep.swept() {
            let key = strategy_weight_key(&weight.strategy);
            builder = match sweep.mode {
                WeightSweepMode::Binary => builder.add_values(&key, vec![0.0, 1.0]),
                WeightSweepMode::TopN => {
                    builder.add_range(&key, weight.range.min, weight.range.max, weight.range.step)
                }
            };
        }

        builder.build()
    }

    /// Grid axes in enumeration order.
    #[must_use]
    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    /// Get the total number of parameter combinations.
    #[must_use]
    pub fn total_combinations(&self) -> usize {
        if self.dimensions.is_empty() {
            return 0;
        }
        self.dimensions.iter().map(|d| d.values.len()).product()
    }

    /// Check if grid is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total_combinations() == 0
    }

    /// Combination at `index` in mixed-radix order.
    #[must_use]
    pub fn combination_at(&self, index: usize) -> Option<ParameterCombination> {
        if index >= self.total_combinations() {
            return None;
        }

        let mut remainder = index;
        let mut combo = ParameterCombination::new();
        for dim in self.dimensions.iter().rev() {
            let radix = dim.values.len();
            combo.insert(dim.key.clone(), dim.values[remainder % radix]);
            remainder /= radix;
        }
        Some(combo)
    }

    /// Iterate over every combination without materializing the grid.
    pub fn iter(&self) -> impl Iterator<Item = ParameterCombination> + '_ {
        (0..self.total_combinations()).filter_map(|i| self.combination_at(i))
    }
}

/// Values of an inclusive range: `floor((max - min) / step) + 1` points.
#[must_use]
pub fn range_values(min: f64, max: f64, step: f64) -> Vec<f64> {
    if !(step > 0.0) || max < min {
        return Vec::new();
    }
    let count = range_count(min, max, step);
    (0..count)
        .map(|i| round_to(min + i as f64 * step, VALUE_PRECISION))
        .collect()
}

fn range_count(min: f64, max: f64, step: f64) -> usize {
    ((max - min) / step + STEP_EPSILON).floor() as usize + 1
}

fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10_f64.powi(places);
    (value * scale).round() / scale
}

#[derive(Debug, Clone)]
enum Axis {
    Values(Dimension),
    Range {
        key: String,
        min: f64,
        max: f64,
        step: f64,
    },
}

impl Axis {
    // Ranges are sized without generating their values
    fn len(&self) -> Result<u128, WalkForwardError> {
        match self {
            Self::Values(dim) => Ok(dim.values.len() as u128),
            Self::Range {
                key,
                min,
                max,
                step,
            } => {
                if !(min.is_finite() && max.is_finite() && *step > 0.0 && max >= min) {
                    return Err(WalkForwardError::InvalidRange {
                        parameter: key.clone(),
                        message: "range yields no values".to_string(),
                    });
                }
                let steps = ((max - min) / step + STEP_EPSILON).floor();
                if steps >= MAX_COMBINATIONS as f64 {
                    Ok(MAX_COMBINATIONS as u128 + 1)
                } else {
                    Ok(steps as u128 + 1)
                }
            }
        }
    }

    fn into_dimension(self) -> Dimension {
        match self {
            Self::Values(dim) => dim,
            Self::Range {
                key,
                min,
                max,
                step,
            } => Dimension {
                key,
                values: range_values(min, max, step),
            },
        }
    }
}

/// Builder for parameter grids.
#[derive(Debug, Default)]
pub struct ParameterGridBuilder {
    axes: Vec<Axis>,
}

impl ParameterGridBuilder {
    /// Create a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a dimension with explicit values.
    #[must_use]
    pub fn add_values(mut self, key: &str, values: Vec<f64>) -> Self {
        self.axes.push(Axis::Values(Dimension {
            key: key.to_string(),
            values,
        }));
        self
    }

    /// Add an inclusive `[min, max]` range sampled every `step`.
    #[must_use]
    pub fn add_range(mut self, key: &str, min: f64, max: f64, step: f64) -> Self {
        self.axes.push(Axis::Range {
            key: key.to_string(),
            min,
            max,
            step,
        });
        self
    }

    /// Build the parameter grid.
    ///
    /// # Errors
    ///
    /// Returns `TooManyCombinations` when the product exceeds
    /// [`MAX_COMBINATIONS`], and `InvalidRange` for a range that yields no
    /// values.
    pub fn build(self) -> Result<ParameterGrid, WalkForwardError> {
        let mut total: u128 = 1;
        for axis in &self.axes {
            total = total.saturating_mul(axis.len()?);
        }

        if total > MAX_COMBINATIONS as u128 {
            return Err(WalkForwardError::TooManyCombinations {
                count: total,
                max: MAX_COMBINATIONS,
            });
        }

        Ok(ParameterGrid {
            dimensions: self.axes.into_iter().map(Axis::into_dimension).collect(),
        })
    }
}
