//! Parameter combinations evaluated by the grid search.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::{SweepParameter, strategy_weight_key};

/// One concrete point in the parameter grid.
///
/// Only swept dimensions are present. Keys are [`SweepParameter::key`] values
/// or `strategy:<name>` weight keys; absent keys take their default during
/// scaling.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterCombination(BTreeMap<String, f64>);

impl ParameterCombination {
    /// Create an empty combination.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Set a value, returning the updated combination.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: f64) -> Self {
        self.insert(key, value);
        self
    }

    /// Set a value.
    pub fn insert(&mut self, key: impl Into<String>, value: f64) {
        self.0.insert(key.into(), value);
    }

    /// Value for a raw key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<f64> {
        self.0.get(key).copied()
    }

    /// Value for a scalar sizing parameter, if swept.
    #[must_use]
    pub fn parameter(&self, param: SweepParameter) -> Option<f64> {
        self.get(param.key())
    }

    /// Weight for `strategy`; strategies without a swept weight trade at 1.
    #[must_use]
    pub fn strategy_weight(&self, strategy: &str) -> f64 {
        self.get(&strategy_weight_key(strategy)).unwrap_or(1.0)
    }

    /// Iterate over `(key, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Number of swept dimensions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no dimension is swept.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, f64)> for ParameterCombination {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for ParameterCombination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (key, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key}={value}")?;
        }
        f.write_str("}")
    }
}
