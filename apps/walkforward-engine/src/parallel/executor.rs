//! Grid search executor using Rayon.

use rayon::prelude::*;
use tracing::debug;

use super::cancel::CancellationFlag;
use super::config::ParallelConfig;
use super::grid::ParameterGrid;
use super::progress::{ProgressEvent, ProgressPhase, ProgressReporter, ProgressTracker};
use super::result::{Candidate, Evaluation, GridSearchResult};
use crate::error::WalkForwardError;
use crate::metrics::PerformanceCalculator;
use crate::risk::{ConstraintEvaluator, PositionScaler};
use crate::trade::Trade;

/// Everything one window's search reads.
#[derive(Clone, Copy)]
pub struct SearchContext<'a> {
    /// In-sample trades.
    pub trades: &'a [Trade],
    /// Combinations to evaluate.
    pub grid: &'a ParameterGrid,
    /// Applies a combination to the trades.
    pub scaler: &'a dyn PositionScaler,
    /// Computes metrics of a scaled series.
    pub calculator: &'a PerformanceCalculator,
    /// Checks constraints and scores feasible combinations.
    pub evaluator: &'a ConstraintEvaluator,
    /// Checked before every combination.
    pub cancel: &'a CancellationFlag,
    /// Receives periodic progress events.
    pub reporter: Option<&'a dyn ProgressReporter>,
    /// Window being searched (1-based).
    pub current_period: usize,
    /// Windows in the run.
    pub total_periods: usize,
}

/// Grid search executor.
pub struct GridSearchExecutor {
    config: ParallelConfig,
    pool: Option<rayon::ThreadPool>,
}

impl std::fmt::Debug for GridSearchExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridSearchExecutor")
            .field("config", &self.config)
            .field("threads", &self.effective_thread_count())
            .finish()
    }
}

impl GridSearchExecutor {
    /// Create an executor.
    ///
    /// A dedicated thread pool is built when `max_threads` is set; otherwise
    /// rayon's global pool is used.
    ///
    /// # Errors
    ///
    /// Returns error if the thread pool cannot be built.
    pub fn new(config: ParallelConfig) -> Result<Self, WalkForwardError> {
        let pool = if config.parallel && config.max_threads > 0 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(config.max_threads)
                .thread_name(|i| format!("walkforward-grid-{i}"))
                .build()
                .map_err(|e| WalkForwardError::ThreadPool {
                    message: e.to_string(),
                })?;
            Some(pool)
        } else {
            None
        };
        Ok(Self { config, pool })
    }

    /// Executor configuration.
    #[must_use]
    pub const fn config(&self) -> &ParallelConfig {
        &self.config
    }

    /// Get effective thread count.
    #[must_use]
    pub fn effective_thread_count(&self) -> usize {
        if !self.config.parallel {
            1
        } else if let Some(pool) = &self.pool {
            pool.current_num_threads()
        } else {
            rayon::current_num_threads()
        }
    }

    /// Evaluate every combination of the grid and keep the best feasible one.
    #[must_use]
    pub fn search(&self, ctx: &SearchContext<'_>) -> GridSearchResult {
        let total = ctx.grid.total_combinations();
        let tracker = ProgressTracker::new(total as u64, self.config.progress_interval);

        let result = if !self.config.parallel {
            (0..total)
                .map(|index| evaluate(ctx, &tracker, index))
                .fold(GridSearchResult::default(), GridSearchResult::absorb)
        } else if let Some(pool) = &self.pool {
            pool.install(|| search_parallel(ctx, &tracker, total))
        } else {
            search_parallel(ctx, &tracker, total)
        };

        debug!(
            period = ctx.current_period,
            evaluated = result.combinations_evaluated,
            rejected = result.combinations_rejected,
            cancelled = result.cancelled,
            best_target = result.best.as_ref().map(|b| b.target),
            "Grid search complete"
        );

        result
    }
}

fn search_parallel(ctx: &SearchContext<'_>, tracker: &ProgressTracker, total: usize) -> GridSearchResult {
    (0..total)
        .into_par_iter()
        .map(|index| evaluate(ctx, tracker, index))
        .fold(GridSearchResult::default, GridSearchResult::absorb)
        .reduce(GridSearchResult::default, GridSearchResult::merge)
}

fn evaluate(ctx: &SearchContext<'_>, tracker: &ProgressTracker, index: usize) -> Evaluation {
    if ctx.cancel.is_cancelled() {
        return Evaluation::Cancelled;
    }
    let Some(combination) = ctx.grid.combination_at(index) else {
        return Evaluation::Rejected;
    };

    let series = ctx.scaler.scale(ctx.trades, &combination);
    let metrics = ctx.calculator.calculate(&series.trades);
    let check = ctx.evaluator.evaluate(&series, &metrics);

    let outcome = if check.passed() {
        let target = ctx
            .evaluator
            .score(&series, &metrics, check.profile.as_ref());
        Evaluation::Feasible(Candidate {
            index,
            combination,
            target,
            metrics,
        })
    } else {
        Evaluation::Rejected
    };

    if let (Some(tested), Some(reporter)) = (tracker.combination_completed(), ctx.reporter) {
        reporter.report(&ProgressEvent {
            phase: ProgressPhase::Optimizing,
            current_period: ctx.current_period,
            total_periods: ctx.total_periods,
            combinations_tested: tested,
            total_combinations: tracker.total(),
        });
    }

    outcome
}
