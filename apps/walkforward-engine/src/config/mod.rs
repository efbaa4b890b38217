//! Configuration module for the walk-forward engine.
//!
//! Provides YAML configuration loading, validation, and environment variable
//! interpolation for walk-forward runs.
//!
//! # Usage
//!
//! ```rust,ignore
//! use walkforward_engine::config::load_config;
//!
//! // Load from default path (walkforward.yaml)
//! let config = load_config(None)?;
//!
//! // Load from custom path
//! let config = load_config(Some("configs/iron-condor.yaml"))?;
//!
//! println!("IS window: {} days", config.walk_forward.in_sample_days);
//! ```

mod diversification;
mod observability;
mod parameters;
mod walkforward;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use diversification::{DiversificationConfig, Normalization, PerformanceFloor};
pub use observability::{LOG_FORMATS, LoggingConfig, ObservabilityConfig};
pub use parameters::{
    ParameterRange, StrategyWeightConfig, StrategyWeightSweep, SweepParameter, WeightRange,
    WeightSweepMode, strategy_weight_key,
};
pub use walkforward::{OptimizationTarget, WalkForwardConfig};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        /// Path to the config file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("Failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml_bw::Error),

    /// Configuration validation failed.
    #[error("Config validation failed: {0}")]
    ValidationError(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EngineConfig {
    /// Walk-forward run settings.
    #[serde(default)]
    pub walk_forward: WalkForwardConfig,
    /// Execution and sizing settings.
    #[serde(default)]
    pub execution: ExecutionConfig,
    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Execution settings shared by every window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Evaluate the combination grid on the rayon pool.
    #[serde(default = "parameters::default_true")]
    pub parallel: bool,
    /// Worker threads for the grid search (0 = rayon's global pool).
    #[serde(default)]
    pub max_threads: usize,
    /// Emit a progress event every this many evaluated combinations.
    #[serde(default = "default_progress_interval")]
    pub progress_interval: u64,
    /// Starting equity for every sized series.
    #[serde(default = "default_initial_capital")]
    pub initial_capital: Decimal,
    /// Annual risk-free rate for Sharpe/Sortino.
    #[serde(default = "default_risk_free_rate")]
    pub risk_free_rate: Decimal,
    /// Fixed-fraction percent that corresponds to the trades' recorded size.
    #[serde(default = "default_baseline_fixed_fraction_pct")]
    pub baseline_fixed_fraction_pct: f64,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            max_threads: 0,
            progress_interval: default_progress_interval(),
            initial_capital: default_initial_capital(),
            risk_free_rate: default_risk_free_rate(),
            baseline_fixed_fraction_pct: default_baseline_fixed_fraction_pct(),
        }
    }
}

const fn default_progress_interval() -> u64 {
    250
}

fn default_initial_capital() -> Decimal {
    Decimal::from(100_000)
}

const fn default_risk_free_rate() -> Decimal {
    Decimal::from_parts(5, 0, 0, false, 2) // 0.05
}

const fn default_baseline_fixed_fraction_pct() -> f64 {
    2.0
}

// ============================================
// Configuration Loading
// ============================================

/// Load configuration from a YAML file with environment variable interpolation.
///
/// # Arguments
///
/// * `path` - Optional path to the config file. Defaults to "walkforward.yaml".
///
/// # Errors
///
/// Returns a `ConfigError` if the file cannot be read, parsed, or validated.
pub fn load_config(path: Option<&str>) -> Result<EngineConfig, ConfigError> {
    let path = path.unwrap_or("walkforward.yaml");

    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_string(),
        source: e,
    })?;

    load_config_from_string(&contents)
}

/// Load configuration from a YAML string.
///
/// # Errors
///
/// Returns a `ConfigError` if the YAML cannot be parsed or validated.
pub fn load_config_from_string(yaml: &str) -> Result<EngineConfig, ConfigError> {
    let interpolated = interpolate_env_vars(yaml);
    let config: EngineConfig = serde_yaml_bw::from_str(&interpolated)?;
    validate_config(&config)?;
    Ok(config)
}

/// Interpolate environment variables in a string.
///
/// Supports both `${VAR}` and `${VAR:-default}` syntax.
#[allow(clippy::expect_used)] // Regex is compile-time constant; expect() is safe here
fn interpolate_env_vars(input: &str) -> String {
    use std::sync::OnceLock;

    static ENV_VAR_REGEX: OnceLock<regex::Regex> = OnceLock::new();

    let re = ENV_VAR_REGEX.get_or_init(|| {
        regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("env var regex is valid")
    });

    re.replace_all(input, |caps: &regex::Captures<'_>| {
        let default_value = caps.get(2).map_or("", |m| m.as_str());
        match caps.get(1).map(|m| std::env::var(m.as_str())) {
            Some(Ok(v)) if !v.is_empty() => v,
            _ => default_value.to_string(),
        }
    })
    .into_owned()
}

/// Validate configuration values.
fn validate_config(config: &EngineConfig) -> Result<(), ConfigError> {
    config
        .walk_forward
        .validate()
        .map_err(|e| ConfigError::ValidationError(e.to_string()))?;

    let execution = &config.execution;
    if execution.initial_capital <= Decimal::ZERO {
        return Err(ConfigError::ValidationError(
            "execution.initial_capital must be positive".to_string(),
        ));
    }

    if execution.risk_free_rate < Decimal::ZERO || execution.risk_free_rate > Decimal::ONE {
        return Err(ConfigError::ValidationError(
            "execution.risk_free_rate must be between 0.0 and 1.0".to_string(),
        ));
    }

    if !(execution.baseline_fixed_fraction_pct.is_finite()
        && execution.baseline_fixed_fraction_pct > 0.0)
    {
        return Err(ConfigError::ValidationError(
            "execution.baseline_fixed_fraction_pct must be positive".to_string(),
        ));
    }

    if execution.progress_interval == 0 {
        return Err(ConfigError::ValidationError(
            "execution.progress_interval must be at least 1".to_string(),
        ));
    }

    let format = config.observability.logging.format.as_str();
    if !LOG_FORMATS.contains(&format) {
        return Err(ConfigError::ValidationError(format!(
            "observability.logging.format must be one of: {LOG_FORMATS:?}"
        )));
    }

    Ok(())
}
