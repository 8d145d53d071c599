//! Execution engines for per-observation work
//!
//! The robust solver runs one independent computation per observation. An
//! execution engine decides whether those run sequentially or on a rayon
//! thread pool; either way results come back in index order.

use serde::{Deserialize, Serialize};

/// Execution strategy for batch operations
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStrategy {
    /// Process items sequentially
    Sequential,
    /// Process items in parallel
    Parallel,
    /// Parallel when the `parallel` feature is enabled, sequential otherwise
    #[default]
    Auto,
}

/// Trait for execution engines that control how batches are processed
pub trait ExecutionEngine: Clone + Send + Sync {
    /// Evaluate `f(0), .., f(count - 1)` and collect the results in order
    fn execute_batch<F, R>(&self, count: usize, f: F) -> Vec<R>
    where
        F: Fn(usize) -> R + Sync + Send,
        R: Send;

    /// Get the execution strategy
    fn strategy(&self) -> ExecutionStrategy;

    /// Get the number of threads available
    fn num_threads(&self) -> usize;
}

/// Sequential execution engine
///
/// Executes all operations in the current thread.
#[derive(Clone, Copy, Debug, Default)]
pub struct SequentialEngine;

impl ExecutionEngine for SequentialEngine {
    fn execute_batch<F, R>(&self, count: usize, f: F) -> Vec<R>
    where
        F: Fn(usize) -> R + Sync + Send,
        R: Send,
    {
        (0..count).map(f).collect()
    }

    fn strategy(&self) -> ExecutionStrategy {
        ExecutionStrategy::Sequential
    }

    fn num_threads(&self) -> usize {
        1
    }
}

/// Parallel execution engine using Rayon
#[cfg(feature = "parallel")]
#[derive(Clone, Debug, Default)]
pub struct ParallelEngine {
    thread_pool: Option<std::sync::Arc<rayon::ThreadPool>>,
}

#[cfg(feature = "parallel")]
impl ParallelEngine {
    /// Create a new parallel engine using the global rayon pool
    pub fn new() -> Self {
        Self { thread_pool: None }
    }

    /// Create with a specific number of threads
    pub fn with_num_threads(num_threads: usize) -> crate::Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build()
            .map_err(|e| crate::Error::Execution(format!("Failed to create thread pool: {e}")))?;

        Ok(Self {
            thread_pool: Some(std::sync::Arc::new(pool)),
        })
    }
}

#[cfg(feature = "parallel")]
impl ExecutionEngine for ParallelEngine {
    fn execute_batch<F, R>(&self, count: usize, f: F) -> Vec<R>
    where
        F: Fn(usize) -> R + Sync + Send,
        R: Send,
    {
        use rayon::prelude::*;

        if let Some(pool) = &self.thread_pool {
            pool.install(|| (0..count).into_par_iter().map(f).collect())
        } else {
            (0..count).into_par_iter().map(f).collect()
        }
    }

    fn strategy(&self) -> ExecutionStrategy {
        ExecutionStrategy::Parallel
    }

    fn num_threads(&self) -> usize {
        if let Some(pool) = &self.thread_pool {
            pool.current_num_threads()
        } else {
            rayon::current_num_threads()
        }
    }
}

/// Engine chosen at runtime from an [`ExecutionStrategy`]
#[derive(Clone, Debug)]
pub enum DynamicEngine {
    Sequential(SequentialEngine),
    #[cfg(feature = "parallel")]
    Parallel(ParallelEngine),
}

impl DynamicEngine {
    /// Resolve a strategy into an engine
    ///
    /// `Parallel` silently degrades to sequential when the crate was built
    /// without the `parallel` feature.
    pub fn from_strategy(strategy: ExecutionStrategy) -> Self {
        match strategy {
            ExecutionStrategy::Sequential => Self::Sequential(SequentialEngine),
            #[cfg(feature = "parallel")]
            ExecutionStrategy::Parallel | ExecutionStrategy::Auto => {
                Self::Parallel(ParallelEngine::new())
            }
            #[cfg(not(feature = "parallel"))]
            ExecutionStrategy::Parallel | ExecutionStrategy::Auto => {
                Self::Sequential(SequentialEngine)
            }
        }
    }
}

impl ExecutionEngine for DynamicEngine {
    fn execute_batch<F, R>(&self, count: usize, f: F) -> Vec<R>
    where
        F: Fn(usize) -> R + Sync + Send,
        R: Send,
    {
        match self {
            Self::Sequential(engine) => engine.execute_batch(count, f),
            #[cfg(feature = "parallel")]
            Self::Parallel(engine) => engine.execute_batch(count, f),
        }
    }

    fn strategy(&self) -> ExecutionStrategy {
        match self {
            Self::Sequential(engine) => engine.strategy(),
            #[cfg(feature = "parallel")]
            Self::Parallel(engine) => engine.strategy(),
        }
    }

    fn num_threads(&self) -> usize {
        match self {
            Self::Sequential(engine) => engine.num_threads(),
            #[cfg(feature = "parallel")]
            Self::Parallel(engine) => engine.num_threads(),
        }
    }
}

/// Create a sequential engine
pub fn sequential() -> SequentialEngine {
    SequentialEngine
}
