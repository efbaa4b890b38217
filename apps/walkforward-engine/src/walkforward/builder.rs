//! Builder pattern for walk-forward engine assembly.

use std::sync::Arc;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use super::engine::WalkForwardEngine;
use crate::config::{EngineConfig, ExecutionConfig, WalkForwardConfig};
use crate::error::WalkForwardError;
use crate::metrics::PerformanceCalculator;
use crate::parallel::{CancellationFlag, ParallelConfig, ProgressReporter};
use crate::risk::{PositionScaler, TradeScaler};

/// Builder for a [`WalkForwardEngine`].
#[derive(Default)]
pub struct WalkForwardBuilder {
    config: WalkForwardConfig,
    execution: ExecutionConfig,
    scaler: Option<Arc<dyn PositionScaler>>,
    reporter: Option<Arc<dyn ProgressReporter>>,
    cancel: Option<CancellationFlag>,
}

impl std::fmt::Debug for WalkForwardBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalkForwardBuilder")
            .field("config", &self.config)
            .field("execution", &self.execution)
            .field("custom_scaler", &self.scaler.is_some())
            .field("has_reporter", &self.reporter.is_some())
            .finish_non_exhaustive()
    }
}

impl WalkForwardBuilder {
    /// Create a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder seeded with the run and execution sections of `config`.
    #[must_use]
    pub fn from_engine_config(config: &EngineConfig) -> Self {
        Self::new()
            .config(config.walk_forward.clone())
            .execution(config.execution.clone())
    }

    /// Set the walk-forward configuration.
    #[must_use]
    pub fn config(mut self, config: WalkForwardConfig) -> Self {
        self.config = config;
        self
    }

    /// Set execution settings.
    #[must_use]
    pub fn execution(mut self, execution: ExecutionConfig) -> Self {
        self.execution = execution;
        self
    }

    /// Set in-sample window size in days.
    #[must_use]
    pub const fn in_sample_days(mut self, days: i64) -> Self {
        self.config.in_sample_days = days;
        self
    }

    /// Set out-of-sample window size in days.
    #[must_use]
    pub const fn out_of_sample_days(mut self, days: i64) -> Self {
        self.config.out_of_sample_days = days;
        self
    }

    /// Set the cursor advance between windows.
    #[must_use]
    pub const fn step_size_days(mut self, days: i64) -> Self {
        self.config.step_size_days = days;
        self
    }

    /// Set parallelism settings.
    #[must_use]
    pub const fn parallel(mut self, parallel: ParallelConfig) -> Self {
        self.execution.parallel = parallel.parallel;
        self.execution.max_threads = parallel.max_threads;
        self.execution.progress_interval = parallel.progress_interval;
        self
    }

    /// Set starting equity.
    #[must_use]
    pub const fn initial_capital(mut self, capital: Decimal) -> Self {
        self.execution.initial_capital = capital;
        self
    }

    /// Set the annual risk-free rate.
    #[must_use]
    pub const fn risk_free_rate(mut self, rate: Decimal) -> Self {
        self.execution.risk_free_rate = rate;
        self
    }

    /// Replace the default [`TradeScaler`].
    #[must_use]
    pub fn scaler(mut self, scaler: Arc<dyn PositionScaler>) -> Self {
        self.scaler = Some(scaler);
        self
    }

    /// Receive progress events.
    #[must_use]
    pub fn progress(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    /// Share a cancellation flag with the caller.
    #[must_use]
    pub fn cancellation(mut self, flag: CancellationFlag) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Build the walk-forward engine.
    ///
    /// # Errors
    ///
    /// Returns error if the walk-forward configuration is invalid or the
    /// initial capital is not positive.
    pub fn build(self) -> Result<WalkForwardEngine, WalkForwardError> {
        self.config.validate()?;
        if self.execution.initial_capital <= Decimal::ZERO {
            return Err(WalkForwardError::InvalidThreshold {
                name: "initial_capital",
                value: self.execution.initial_capital.to_f64().unwrap_or(0.0),
                message: "must be positive",
            });
        }

        let scaler = self.scaler.unwrap_or_else(|| {
            Arc::new(TradeScaler::new(
                self.execution.initial_capital,
                self.execution.baseline_fixed_fraction_pct,
            ))
        });
        let calculator = PerformanceCalculator::new(self.execution.initial_capital)
            .with_risk_free_rate(self.execution.risk_free_rate);

        Ok(WalkForwardEngine::new(
            self.config,
            ParallelConfig::from_execution(&self.execution),
            scaler,
            calculator,
            self.reporter,
            self.cancel.unwrap_or_default(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::config::load_config_from_string;

    #[test]
    fn test_builder_pattern() {
        let Ok(engine) = WalkForwardBuilder::new()
            .in_sample_days(90)
            .out_of_sample_days(30)
            .step_size_days(30)
            .parallel(ParallelConfig {
                parallel: false,
                max_threads: 0,
                progress_interval: 10,
            })
            .build()
        else {
            panic!("valid builder settings");
        };

        assert_eq!(engine.config().in_sample_days, 90);
        assert_eq!(engine.config().out_of_sample_days, 30);
        assert_eq!(engine.config().step_size_days, 30);
        assert!(!engine.parallel_config().parallel);
        assert_eq!(engine.parallel_config().progress_interval, 10);
    }

    #[test]
    fn test_builder_defaults() {
        let Ok(engine) = WalkForwardBuilder::new().build() else {
            panic!("defaults are valid");
        };
        let config = engine.config();

        assert_eq!(config.in_sample_days, 45);
        assert_eq!(config.out_of_sample_days, 15);
        assert_eq!(config.step_size_days, 15);
        assert!(engine.parallel_config().parallel);
    }

    #[test]
    fn test_builder_rejects_invalid_window() {
        let result = WalkForwardBuilder::new().out_of_sample_days(-5).build();
        assert!(matches!(
            result,
            Err(WalkForwardError::InvalidWindow {
                field: "out_of_sample_days",
                value: -5
            })
        ));
    }

    #[test]
    fn test_builder_rejects_non_positive_capital() {
        let result = WalkForwardBuilder::new().initial_capital(dec!(0)).build();
        assert!(matches!(
            result,
            Err(WalkForwardError::InvalidThreshold {
                name: "initial_capital",
                ..
            })
        ));
    }

    #[test]
    fn test_shared_cancellation_flag() {
        let flag = CancellationFlag::new();
        let Ok(engine) = WalkForwardBuilder::new()
            .cancellation(flag.clone())
            .build()
        else {
            panic!("defaults are valid");
        };

        flag.cancel();
        assert!(engine.cancellation_flag().is_cancelled());
    }

    #[test]
    fn test_from_engine_config() {
        let yaml = r"
walk_forward:
  in_sample_days: 60
  out_of_sample_days: 20
  step_size_days: 20
execution:
  parallel: false
  initial_capital: 50000
";
        let Ok(config) = load_config_from_string(yaml) else {
            panic!("valid yaml");
        };
        let Ok(engine) = WalkForwardBuilder::from_engine_config(&config).build() else {
            panic!("valid config");
        };

        assert_eq!(engine.config().in_sample_days, 60);
        assert!(!engine.parallel_config().parallel);
    }
}
