//! E2E Integration Tests for Walk-Forward Runs
//!
//! Drives the public builder and engine over synthetic trade histories and
//! checks window counts, grid sizes, constraint handling, cancellation and
//! the verdict.

// Allow unwrap in tests - tests should panic on unexpected errors
#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{NaiveDate, TimeDelta};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use test_case::test_case;

use walkforward_engine::config::{
    ParameterRange, StrategyWeightConfig, StrategyWeightSweep, SweepParameter, WeightRange,
    WeightSweepMode, strategy_weight_key,
};
use walkforward_engine::metrics::UNBOUNDED_TARGET_SCORE;
use walkforward_engine::parallel::{ParallelConfig, ProgressPhase};
use walkforward_engine::risk::ScaledSeries;
use walkforward_engine::walkforward::Assessment;
use walkforward_engine::{
    CancellationFlag, OptimizationTarget, ParameterCombination, PositionScaler, ProgressEvent,
    ProgressReporter, RunOutcome, Trade, TradeScaler, VerdictPolicy, WalkForwardBuilder,
    WalkForwardConfig, WalkForwardError, WalkForwardResults, assess,
};

// =============================================================================
// Fixtures
// =============================================================================

fn day(offset: i64) -> NaiveDate {
    let base = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
    base.checked_add_signed(TimeDelta::try_days(offset).unwrap())
        .unwrap()
}

fn trade(offset: i64, strategy: &str, pl: Decimal) -> Trade {
    Trade {
        date_opened: day(offset),
        date_closed: day(offset),
        strategy: strategy.to_string(),
        pl,
        num_contracts: 1,
        margin_req: dec!(2000),
        max_profit: None,
        max_loss: None,
    }
}

/// Sweep only the given scalar parameters.
fn sweeping(ranges: &[(SweepParameter, ParameterRange)]) -> WalkForwardConfig {
    let mut config = WalkForwardConfig::default();
    for range in config.parameter_ranges.values_mut() {
        range.enabled = false;
    }
    for (param, range) in ranges {
        config.parameter_ranges.insert(*param, *range);
    }
    config
}

/// Binary on/off weight sweep over `strategies`.
fn binary_sweep(strategies: &[&str]) -> StrategyWeightSweep {
    StrategyWeightSweep {
        mode: WeightSweepMode::Binary,
        top_n_count: 3,
        configs: strategies
            .iter()
            .map(|strategy| StrategyWeightConfig {
                strategy: (*strategy).to_string(),
                range: WeightRange::default(),
                enabled: true,
            })
            .collect(),
    }
}

fn completed(outcome: RunOutcome) -> WalkForwardResults {
    match outcome {
        RunOutcome::Completed(results) => results,
        RunOutcome::Cancelled => panic!("run should complete"),
    }
}

struct CountingScaler {
    inner: TradeScaler,
    calls: AtomicUsize,
}

impl CountingScaler {
    fn new() -> Self {
        Self {
            inner: TradeScaler::default(),
            calls: AtomicUsize::new(0),
        }
    }
}

impl PositionScaler for CountingScaler {
    fn scale(&self, trades: &[Trade], combo: &ParameterCombination) -> ScaledSeries {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.scale(trades, combo)
    }
}

// =============================================================================
// Scenarios
// =============================================================================

/// 500 trades over 400 days: profitable for the first 200 days, losing after.
#[test]
fn test_regime_change_end_to_end() {
    let trades: Vec<Trade> = (0..500_i64)
        .map(|i| {
            let offset = i * 4 / 5;
            let pl = match (offset < 200, i % 3 == 0) {
                (true, false) => dec!(100),
                (true, true) => dec!(-50),
                (false, false) => dec!(-100),
                (false, true) => dec!(50),
            };
            trade(offset, "Iron Condor", pl)
        })
        .collect();

    let config = sweeping(&[(
        SweepParameter::KellyMultiplier,
        ParameterRange::new(0.5, 1.5, 0.1, true),
    )]);
    let engine = WalkForwardBuilder::new().config(config).build().unwrap();

    let results = completed(engine.run(&trades).unwrap());

    assert_eq!(results.stats.analyzed_trades, 500);
    assert_eq!(results.stats.windows_generated, 23);
    assert_eq!(results.periods.len(), 23);
    assert!(results.skipped_windows.is_empty());
    assert_eq!(results.stats.combinations_per_window, 11);
    assert_eq!(results.stats.total_parameter_tests, 253);
    assert!(results.periods.iter().all(|p| p.combinations_evaluated == 11));

    let first = &results.periods[0];
    assert_eq!(
        first.optimal_parameters.parameter(SweepParameter::KellyMultiplier),
        Some(1.5)
    );
    let last = &results.periods[22];
    assert_eq!(
        last.optimal_parameters.parameter(SweepParameter::KellyMultiplier),
        Some(0.5)
    );

    let summary = &results.summary;
    assert!(summary.robustness_score > 0.0 && summary.robustness_score < 1.0);
    assert!(summary.parameter_stability < 1.0);
    assert!(summary.consistency_score > 0.0 && summary.consistency_score < 1.0);

    let Assessment::Complete(report) = assess(&results, &VerdictPolicy::default()) else {
        panic!("evaluated windows should produce a verdict");
    };
    assert_eq!(report.components.len(), 3);
    assert!(!report.red_flags.is_empty());
}

#[test]
fn test_combination_cap_rejects_before_scaling() {
    let trades: Vec<Trade> = (0..120).map(|d| trade(d, "A", dec!(25))).collect();
    let config = sweeping(&[
        (
            SweepParameter::KellyMultiplier,
            ParameterRange::new(0.0, 100.0, 0.01, true),
        ),
        (
            SweepParameter::FixedFractionPct,
            ParameterRange::new(1.0, 3.0, 1.0, true),
        ),
    ]);
    let scaler = Arc::new(CountingScaler::new());
    let engine = WalkForwardBuilder::new()
        .config(config)
        .scaler(scaler.clone())
        .build()
        .unwrap();

    let result = engine.run(&trades);

    assert!(matches!(
        result,
        Err(WalkForwardError::TooManyCombinations { count, max: 20_000 }) if count > 20_000
    ));
    assert_eq!(scaler.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_history_shorter_than_one_window() {
    let trades: Vec<Trade> = (0..30).map(|d| trade(d, "A", dec!(40))).collect();
    let engine = WalkForwardBuilder::new().build().unwrap();

    let results = completed(engine.run(&trades).unwrap());

    assert!(results.periods.is_empty());
    assert_eq!(results.stats.windows_generated, 0);
    assert_eq!(results.summary.robustness_score, 0.0);
    assert!(matches!(
        assess(&results, &VerdictPolicy::default()),
        Assessment::InsufficientData { .. }
    ));
}

#[test]
fn test_cancellation_after_second_window() {
    let trades: Vec<Trade> = (0..125)
        .map(|d| trade(d, "A", if d % 4 == 0 { dec!(-30) } else { dec!(45) }))
        .collect();
    let mut config = sweeping(&[(
        SweepParameter::KellyMultiplier,
        ParameterRange::new(0.5, 1.5, 0.25, true),
    )]);
    config.in_sample_days = 20;
    config.out_of_sample_days = 10;
    config.step_size_days = 10;

    let flag = CancellationFlag::new();
    let completed_windows = Arc::new(AtomicUsize::new(0));
    let reporter: Arc<dyn ProgressReporter> = {
        let flag = flag.clone();
        let completed_windows = Arc::clone(&completed_windows);
        Arc::new(move |event: &ProgressEvent| {
            if event.phase == ProgressPhase::WindowCompleted {
                assert_eq!(event.total_periods, 10);
                completed_windows.store(event.current_period, Ordering::SeqCst);
                if event.current_period == 2 {
                    flag.cancel();
                }
            }
        })
    };

    let engine = WalkForwardBuilder::new()
        .config(config)
        .parallel(ParallelConfig {
            parallel: true,
            max_threads: 2,
            progress_interval: 1,
        })
        .progress(reporter)
        .cancellation(flag)
        .build()
        .unwrap();

    let outcome = engine.run(&trades).unwrap();

    assert!(outcome.is_cancelled());
    assert!(outcome.into_results().is_none());
    assert_eq!(completed_windows.load(Ordering::SeqCst), 2);
}

/// Strategy B is A doubled, so running both breaches any correlation limit.
#[test]
fn test_correlated_strategies_are_mutually_exclusive() {
    let trades: Vec<Trade> = (0..100_i64)
        .flat_map(|d| {
            let pl = match d % 5 {
                0 => dec!(-80),
                1 => dec!(40),
                2 => dec!(120),
                3 => dec!(-20),
                _ => dec!(60),
            };
            [trade(d, "A", pl), trade(d, "B", pl * dec!(2))]
        })
        .collect();

    let mut config = sweeping(&[]);
    config.in_sample_days = 20;
    config.out_of_sample_days = 10;
    config.step_size_days = 10;
    config.diversification.enable_correlation_constraint = true;
    config.diversification.max_correlation_threshold = 0.5;
    config.strategy_weight_sweep = binary_sweep(&["A", "B"]);

    let engine = WalkForwardBuilder::new().config(config).build().unwrap();
    let results = completed(engine.run(&trades).unwrap());

    assert_eq!(results.periods.len(), 7);
    for period in &results.periods {
        assert_eq!(period.combinations_evaluated, 4);
        // Neither strategy active, and both active together.
        assert_eq!(period.combinations_rejected_by_constraint, 2);
        assert_eq!(period.optimal_parameters.get(&strategy_weight_key("A")), Some(0.0));
        assert_eq!(period.optimal_parameters.get(&strategy_weight_key("B")), Some(1.0));
    }
    assert_eq!(results.stats.total_rejected, 14);
}

/// The same ten-day P/L cycle repeats, so every out-of-sample range replays
/// its in-sample range exactly.
#[test_case(OptimizationTarget::NetPl ; "net pl")]
#[test_case(OptimizationTarget::SharpeRatio ; "sharpe")]
#[test_case(OptimizationTarget::SortinoRatio ; "sortino")]
#[test_case(OptimizationTarget::ProfitFactor ; "profit factor")]
#[test_case(OptimizationTarget::WinRate ; "win rate")]
#[test_case(OptimizationTarget::CalmarRatio ; "calmar")]
#[test_case(OptimizationTarget::Cagr ; "cagr")]
#[test_case(OptimizationTarget::AvgDailyPl ; "avg daily pl")]
#[test_case(OptimizationTarget::MinAvgCorrelation ; "min avg correlation")]
#[test_case(OptimizationTarget::MinTailRisk ; "min tail risk")]
#[test_case(OptimizationTarget::MaxEffectiveFactors ; "max effective factors")]
fn test_replayed_history_has_unit_degradation(target: OptimizationTarget) {
    const CYCLE: [i64; 10] = [120, -60, 80, 40, -30, 150, 60, -90, 100, 20];
    let trades: Vec<Trade> = (0..100_i64)
        .map(|d| trade(d, "A", Decimal::from(CYCLE[(d % 10) as usize])))
        .collect();

    let mut config = sweeping(&[(
        SweepParameter::KellyMultiplier,
        ParameterRange::new(0.5, 1.5, 0.5, true),
    )]);
    config.in_sample_days = 10;
    config.out_of_sample_days = 10;
    config.step_size_days = 10;
    config.optimization_target = target;

    let engine = WalkForwardBuilder::new().config(config).build().unwrap();
    let results = completed(engine.run(&trades).unwrap());

    assert_eq!(results.periods.len(), 8);
    for period in &results.periods {
        assert!((period.efficiency() - 1.0).abs() < 1e-9);
    }
    assert!((results.summary.degradation_factor - 1.0).abs() < 1e-9);
    assert_eq!(results.summary.consistency_score, 1.0);
    assert_eq!(results.summary.parameter_stability, 1.0);
}

/// A never loses, so its profit factor is unbounded and beats any mix with B.
#[test]
fn test_profit_factor_prefers_lossless_strategy() {
    let trades: Vec<Trade> = (0..100_i64)
        .flat_map(|d| {
            let b = match d % 5 {
                0 => dec!(-80),
                1 => dec!(40),
                2 => dec!(120),
                3 => dec!(-20),
                _ => dec!(60),
            };
            [trade(d, "A", dec!(50)), trade(d, "B", b)]
        })
        .collect();

    let mut config = sweeping(&[]);
    config.in_sample_days = 20;
    config.out_of_sample_days = 10;
    config.step_size_days = 10;
    config.optimization_target = OptimizationTarget::ProfitFactor;
    config.strategy_weight_sweep = binary_sweep(&["A", "B"]);

    let engine = WalkForwardBuilder::new().config(config).build().unwrap();
    let results = completed(engine.run(&trades).unwrap());

    assert_eq!(results.periods.len(), 7);
    for period in &results.periods {
        assert_eq!(period.optimal_parameters.get(&strategy_weight_key("A")), Some(1.0));
        assert_eq!(period.optimal_parameters.get(&strategy_weight_key("B")), Some(0.0));
        assert_eq!(period.in_sample_target, UNBOUNDED_TARGET_SCORE);
        assert!((period.efficiency() - 1.0).abs() < 1e-9);
    }
    assert_eq!(results.summary.consistency_score, 1.0);
}

/// B is A doubled and C cycles independently of A, so the most effective
/// factors come from pairing C with exactly one of A and B.
#[test]
fn test_effective_factors_pair_independent_strategies() {
    let trades: Vec<Trade> = (0..100_i64)
        .flat_map(|d| {
            let a = match d % 5 {
                0 => dec!(-80),
                1 => dec!(40),
                2 => dec!(120),
                3 => dec!(-20),
                _ => dec!(60),
            };
            let c = if d % 4 < 2 { dec!(50) } else { dec!(-30) };
            [trade(d, "A", a), trade(d, "B", a * dec!(2)), trade(d, "C", c)]
        })
        .collect();

    let mut config = sweeping(&[]);
    config.in_sample_days = 20;
    config.out_of_sample_days = 10;
    config.step_size_days = 10;
    config.optimization_target = OptimizationTarget::MaxEffectiveFactors;
    config.strategy_weight_sweep = binary_sweep(&["A", "B", "C"]);

    let engine = WalkForwardBuilder::new().config(config).build().unwrap();
    let results = completed(engine.run(&trades).unwrap());

    assert_eq!(results.periods.len(), 7);
    for period in &results.periods {
        let weight = |s: &str| period.optimal_parameters.get(&strategy_weight_key(s));
        assert_eq!(weight("C"), Some(1.0));
        let a = weight("A").unwrap();
        let b = weight("B").unwrap();
        assert!((a + b - 1.0).abs() < 1e-9);

        assert_eq!(period.combinations_evaluated, 8);
        assert_eq!(period.combinations_rejected_by_constraint, 1);
        assert!((period.in_sample_target - 2.0).abs() < 1e-6);
        assert!(period.out_of_sample_target >= 1.0);
        assert!(period.efficiency() > 0.5 && period.efficiency() <= 1.0 + 1e-6);
    }
    assert_eq!(results.summary.consistency_score, 1.0);
}

#[test]
fn test_sequential_and_parallel_runs_agree() {
    let trades: Vec<Trade> = (0..90_i64)
        .flat_map(|d| {
            let a = if d % 3 == 0 { dec!(-70) } else { dec!(55) };
            let b = if d % 4 == 1 { dec!(-40) } else { dec!(30) };
            [trade(d, "A", a), trade(d, "B", b)]
        })
        .collect();
    let mut config = sweeping(&[
        (
            SweepParameter::KellyMultiplier,
            ParameterRange::new(0.5, 1.5, 0.25, true),
        ),
        (
            SweepParameter::MaxDailyLossPct,
            ParameterRange::new(0.05, 0.1, 0.05, true),
        ),
    ]);
    config.in_sample_days = 30;
    config.out_of_sample_days = 10;
    config.step_size_days = 10;
    config.optimization_target = OptimizationTarget::SharpeRatio;

    let run = |parallel: ParallelConfig| {
        let engine = WalkForwardBuilder::new()
            .config(config.clone())
            .parallel(parallel)
            .build()
            .unwrap();
        completed(engine.run(&trades).unwrap())
    };

    let sequential = run(ParallelConfig {
        parallel: false,
        ..ParallelConfig::default()
    });
    let pooled = run(ParallelConfig {
        parallel: true,
        max_threads: 3,
        ..ParallelConfig::default()
    });

    assert_eq!(sequential.periods, pooled.periods);
    assert_eq!(sequential.summary, pooled.summary);
}
