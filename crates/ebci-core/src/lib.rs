//! Core types for robust empirical-Bayes confidence intervals
//!
//! This crate provides the pieces shared by the moment estimator, the
//! critical value solver and the orchestrator:
//!
//! - **Errors**: a single [`Error`] enum and [`Result`] alias
//! - **Numeric options**: [`SolverConfig`] with tolerances and iteration caps
//! - **Scalar solvers**: bounded root finding and minimisation that report
//!   non-convergence instead of failing
//! - **Execution engines**: sequential or rayon-parallel batch evaluation
//!
//! # Example
//!
//! ```rust
//! use ebci_core::{execution::sequential, ExecutionEngine, SolverConfig};
//! use ebci_core::solvers::find_root;
//!
//! let config = SolverConfig::default();
//! let engine = sequential();
//! let roots = engine.execute_batch(3, |i| {
//!     let target = (i + 1) as f64;
//!     find_root(|x| x * x - target, 0.0, 2.0, &config).map(|s| s.x)
//! });
//! assert!((roots[2].as_ref().unwrap() - 3f64.sqrt()).abs() < 1e-9);
//! ```

pub mod config;
pub mod error;
pub mod execution;
pub mod math;
pub mod solvers;

pub use config::SolverConfig;
pub use error::{Error, Result};
pub use execution::{DynamicEngine, ExecutionEngine, ExecutionStrategy, SequentialEngine};
#[cfg(feature = "parallel")]
pub use execution::ParallelEngine;
pub use math::distributions::normal;
pub use solvers::ScalarSolution;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::Error;
    pub use crate::execution::{sequential, ExecutionEngine, ExecutionStrategy};
    pub use crate::{Result, SolverConfig};
}
