//! Walk-forward analysis engine.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, debug_span, info, warn};

use super::analysis::summarize;
use super::types::{
    PeriodResult, RunOutcome, RunStats, SkippedWindow, WalkForwardResults, WindowPeriod,
    WindowSkipReason,
};
use super::windows::{generate_windows, split_trades};
use crate::config::WalkForwardConfig;
use crate::error::WalkForwardError;
use crate::metrics::PerformanceCalculator;
use crate::parallel::{
    CancellationFlag, GridSearchExecutor, ParallelConfig, ParameterGrid, ProgressEvent,
    ProgressPhase, ProgressReporter, SearchContext,
};
use crate::risk::{ConstraintEvaluator, PositionScaler};
use crate::trade::{Trade, prepare_trades};

/// Walk-forward analysis engine.
///
/// Windows are processed in chronological order; each window's grid is
/// searched by a [`GridSearchExecutor`].
pub struct WalkForwardEngine {
    config: WalkForwardConfig,
    parallel: ParallelConfig,
    scaler: Arc<dyn PositionScaler>,
    calculator: PerformanceCalculator,
    reporter: Option<Arc<dyn ProgressReporter>>,
    cancel: CancellationFlag,
}

impl std::fmt::Debug for WalkForwardEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalkForwardEngine")
            .field("config", &self.config)
            .field("parallel", &self.parallel)
            .field("calculator", &self.calculator)
            .field("has_reporter", &self.reporter.is_some())
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}

/// Per-run state shared by every window.
struct RunContext<'a> {
    grid: &'a ParameterGrid,
    executor: &'a GridSearchExecutor,
    evaluator: &'a ConstraintEvaluator,
    total_periods: usize,
}

/// What processing one window produced.
enum WindowOutcome {
    Evaluated(PeriodResult),
    Skipped(SkippedWindow),
    Cancelled,
}

impl WalkForwardEngine {
    /// Create an engine.
    ///
    /// Prefer [`super::WalkForwardBuilder`], which fills in the default
    /// scaler and calculator from execution settings.
    #[must_use]
    pub fn new(
        config: WalkForwardConfig,
        parallel: ParallelConfig,
        scaler: Arc<dyn PositionScaler>,
        calculator: PerformanceCalculator,
        reporter: Option<Arc<dyn ProgressReporter>>,
        cancel: CancellationFlag,
    ) -> Self {
        Self {
            config,
            parallel,
            scaler,
            calculator,
            reporter,
            cancel,
        }
    }

    /// Access the engine configuration.
    #[must_use]
    pub const fn config(&self) -> &WalkForwardConfig {
        &self.config
    }

    /// Parallelism settings.
    #[must_use]
    pub const fn parallel_config(&self) -> &ParallelConfig {
        &self.parallel
    }

    /// Flag that cancels a running analysis when set.
    #[must_use]
    pub fn cancellation_flag(&self) -> CancellationFlag {
        self.cancel.clone()
    }

    /// Run the analysis over `trades`.
    ///
    /// Trades are filtered, optionally normalized and sorted before windows
    /// are generated. A history too short for one window completes with no
    /// periods.
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is invalid, the grid exceeds the
    /// combination cap, or the thread pool cannot be built. All of these are
    /// detected before any trade is scaled.
    pub fn run(&self, trades: &[Trade]) -> Result<RunOutcome, WalkForwardError> {
        self.config.validate()?;
        let grid = ParameterGrid::from_config(&self.config)?;
        let executor = GridSearchExecutor::new(self.parallel)?;
        let evaluator = ConstraintEvaluator::from_config(&self.config);

        let started = Instant::now();
        let prepared = prepare_trades(
            trades,
            &self.config.selected_strategies,
            self.config.normalize_to_1_lot,
        );
        let windows = generate_windows(
            &prepared,
            self.config.in_sample_days,
            self.config.out_of_sample_days,
            self.config.step_size_days,
        );

        info!(
            trades = prepared.len(),
            windows = windows.len(),
            combinations = grid.total_combinations(),
            target = ?self.config.optimization_target,
            threads = executor.effective_thread_count(),
            "Starting walk-forward analysis"
        );
        if windows.is_empty() {
            warn!(
                trades = prepared.len(),
                in_sample_days = self.config.in_sample_days,
                out_of_sample_days = self.config.out_of_sample_days,
                "Insufficient history for one walk-forward window"
            );
        }

        let run = RunContext {
            grid: &grid,
            executor: &executor,
            evaluator: &evaluator,
            total_periods: windows.len(),
        };
        self.report(ProgressPhase::Preparing, 0, &run, 0);

        let mut periods = Vec::new();
        let mut skipped_windows = Vec::new();
        let mut total_parameter_tests = 0u64;
        let mut total_rejected = 0u64;

        for (index, period) in windows.iter().enumerate() {
            if self.cancel.is_cancelled() {
                info!(completed = index, "Walk-forward analysis cancelled");
                return Ok(RunOutcome::Cancelled);
            }
            let current_period = index + 1;

            match self.process_window(&run, &prepared, period, current_period) {
                WindowOutcome::Evaluated(result) => {
                    total_parameter_tests += result.combinations_evaluated;
                    total_rejected += result.combinations_rejected_by_constraint;
                    periods.push(result);
                }
                WindowOutcome::Skipped(skip) => {
                    warn!(
                        period = current_period,
                        window = %skip.period,
                        reason = %skip.reason,
                        in_sample_trades = skip.in_sample_trades,
                        out_of_sample_trades = skip.out_of_sample_trades,
                        "Skipping walk-forward window"
                    );
                    skipped_windows.push(skip);
                }
                WindowOutcome::Cancelled => {
                    info!(completed = index, "Walk-forward analysis cancelled");
                    return Ok(RunOutcome::Cancelled);
                }
            }

            self.report(ProgressPhase::WindowCompleted, current_period, &run, 0);
            if self.cancel.is_cancelled() {
                info!(completed = current_period, "Walk-forward analysis cancelled");
                return Ok(RunOutcome::Cancelled);
            }
        }

        let summary = summarize(&periods);
        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        let stats = RunStats {
            total_parameter_tests,
            total_rejected,
            analyzed_trades: prepared.len(),
            duration_ms,
            windows_generated: windows.len(),
            combinations_per_window: grid.total_combinations(),
        };

        info!(
            periods = periods.len(),
            skipped = skipped_windows.len(),
            degradation_factor = summary.degradation_factor,
            parameter_stability = summary.parameter_stability,
            consistency_score = summary.consistency_score,
            robustness_score = summary.robustness_score,
            duration_ms,
            "Walk-forward analysis complete"
        );
        self.report(ProgressPhase::Finished, run.total_periods, &run, 0);

        Ok(RunOutcome::Completed(WalkForwardResults {
            target: self.config.optimization_target,
            periods,
            summary,
            stats,
            skipped_windows,
        }))
    }

    fn process_window(
        &self,
        run: &RunContext<'_>,
        trades: &[Trade],
        period: &WindowPeriod,
        current_period: usize,
    ) -> WindowOutcome {
        let span = debug_span!("window", period = current_period, window = %period);
        let _enter = span.enter();

        let (in_sample, out_of_sample) = split_trades(trades, period);
        let skip = |reason| {
            WindowOutcome::Skipped(SkippedWindow {
                period: *period,
                reason,
                in_sample_trades: in_sample.len(),
                out_of_sample_trades: out_of_sample.len(),
            })
        };

        if in_sample.len() < self.config.min_in_sample_trades {
            return skip(WindowSkipReason::InsufficientInSampleTrades);
        }
        if out_of_sample.len() < self.config.min_out_of_sample_trades {
            return skip(WindowSkipReason::InsufficientOutOfSampleTrades);
        }

        let ctx = SearchContext {
            trades: in_sample,
            grid: run.grid,
            scaler: self.scaler.as_ref(),
            calculator: &self.calculator,
            evaluator: run.evaluator,
            cancel: &self.cancel,
            reporter: self.reporter.as_deref(),
            current_period,
            total_periods: run.total_periods,
        };
        let search = run.executor.search(&ctx);
        if search.cancelled {
            return WindowOutcome::Cancelled;
        }
        let Some(best) = search.best else {
            return skip(WindowSkipReason::NoFeasibleCombination);
        };

        self.report(
            ProgressPhase::Validating,
            current_period,
            run,
            search.combinations_evaluated,
        );

        let oos_series = self.scaler.scale(out_of_sample, &best.combination);
        let out_of_sample_metrics = self.calculator.calculate(&oos_series.trades);
        let out_of_sample_target = run
            .evaluator
            .score(&oos_series, &out_of_sample_metrics, None);

        debug!(
            parameters = %best.combination,
            in_sample_target = best.target,
            out_of_sample_target,
            evaluated = search.combinations_evaluated,
            rejected = search.combinations_rejected,
            "Window validated"
        );

        WindowOutcome::Evaluated(PeriodResult {
            period: *period,
            optimal_parameters: best.combination,
            in_sample_metrics: best.metrics,
            out_of_sample_metrics,
            in_sample_target: best.target,
            out_of_sample_target,
            combinations_evaluated: search.combinations_evaluated,
            combinations_rejected_by_constraint: search.combinations_rejected,
            in_sample_trades: in_sample.len(),
            out_of_sample_trades: out_of_sample.len(),
        })
    }

    fn report(&self, phase: ProgressPhase, current_period: usize, run: &RunContext<'_>, tested: u64) {
        if let Some(reporter) = &self.reporter {
            reporter.report(&ProgressEvent {
                phase,
                current_period,
                total_periods: run.total_periods,
                combinations_tested: tested,
                total_combinations: run.grid.total_combinations() as u64,
            });
        }
    }
}
