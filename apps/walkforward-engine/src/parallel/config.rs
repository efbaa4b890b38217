//! Configuration for parallel grid evaluation.

use serde::{Deserialize, Serialize};

use crate::config::ExecutionConfig;

/// Configuration for parallel grid evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParallelConfig {
    /// Evaluate combinations on the rayon pool.
    pub parallel: bool,

    /// Maximum number of threads to use (0 = use all available).
    pub max_threads: usize,

    /// Emit a progress event every this many combinations.
    pub progress_interval: u64,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            max_threads: 0,
            progress_interval: 250,
        }
    }
}

impl ParallelConfig {
    /// Parallelism settings from the execution section.
    #[must_use]
    pub const fn from_execution(execution: &ExecutionConfig) -> Self {
        Self {
            parallel: execution.parallel,
            max_threads: execution.max_threads,
            progress_interval: execution.progress_interval,
        }
    }
}
