//! Parallel grid search infrastructure using Rayon.
//!
//! Provides data-parallel evaluation of a window's parameter grid:
//! - Lazy, index-addressable enumeration of the Cartesian product
//! - Parallel map over grid indices with a deterministic fold/reduce
//! - Periodic progress events and cooperative cancellation
//!
//! # Thread Pool Configuration
//!
//! Rayon uses a work-stealing scheduler with a global thread pool. Setting
//! `max_threads` gives the executor its own pool of that size instead.
//!
//! # Example
//!
//! ```ignore
//! use walkforward_engine::parallel::{GridSearchExecutor, ParallelConfig, ParameterGrid};
//!
//! let grid = ParameterGrid::builder()
//!     .add_range("kelly_multiplier", 0.5, 1.5, 0.1)
//!     .add_values("strategy:Iron Condor", vec![0.0, 1.0])
//!     .build()?;
//!
//! let executor = GridSearchExecutor::new(ParallelConfig::default())?;
//! let result = executor.search(&ctx);
//! ```

mod cancel;
mod config;
mod executor;
mod grid;
mod progress;
mod result;
mod types;

pub use cancel::CancellationFlag;
pub use config::ParallelConfig;
pub use executor::{GridSearchExecutor, SearchContext};
pub use grid::{Dimension, MAX_COMBINATIONS, ParameterGrid, ParameterGridBuilder, range_values};
pub use progress::{ProgressEvent, ProgressPhase, ProgressReporter, ProgressTracker};
pub use result::{Candidate, GridSearchResult};
pub use types::ParameterCombination;
