//! Robust empirical-Bayes confidence intervals
//!
//! This crate shrinks noisy estimates `Y_i ~ N(theta_i, sigma_i²)` toward a
//! regression-based prior mean and reports confidence intervals for each
//! `theta_i` that are valid under any prior with the estimated second moment
//! and, optionally, kurtosis. A normal-prior (parametric) interval is also
//! available.
//!
//! # Overview
//!
//! | Step | Crate | Entry point |
//! |------|-------|-------------|
//! | Prior mean (weighted least squares) | `ebci-moments` | [`ebci_moments::fit_shrinkage_direction`] |
//! | Signal moments with noise correction | `ebci-moments` | [`ebci_moments::estimate_moments`] |
//! | Parametric interval | `ebci-confidence` | [`ebci_confidence::parametric_ebci`] |
//! | Robust critical value | `ebci-confidence` | [`ebci_confidence::cva`] |
//! | Orchestration | this crate | [`compute`] |
//!
//! # Quick Start
//!
//! ```rust
//! use robust_ebci::{compute, DMatrix, EbciOptions, Observations};
//!
//! let y = vec![1.2, -0.4, 2.5, 0.3, -1.1, 0.9];
//! let sigma = vec![0.5, 0.6, 0.8, 0.4, 0.7, 0.5];
//! let obs = Observations::new(y, sigma)?
//!     .with_regressors(DMatrix::from_element(6, 1, 1.0))?;
//!
//! let result = compute(&obs, 0.05, &EbciOptions::default())?;
//! for (theta, ci) in result.thetahat.iter().zip(&result.ci) {
//!     assert!(ci.contains(*theta));
//! }
//! println!("{result}");
//! # Ok::<(), robust_ebci::Error>(())
//! ```

pub mod observations;
pub mod options;
pub mod pipeline;
pub mod plan;
pub mod result;

pub use observations::Observations;
pub use options::{EbciOptions, ShrinkageMode};
pub use pipeline::{compute, compute_with_engine};
pub use plan::{Dispatch, ExecutionPath, ExecutionPlan};
pub use result::{Diagnostics, EbciResult};

// Re-export component crates and the types callers need
pub use ebci_confidence;
pub use ebci_core;
pub use ebci_moments;

pub use ebci_confidence::ConfidenceInterval;
pub use ebci_core::{Error, ExecutionEngine, ExecutionStrategy, Result, SolverConfig};
pub use ebci_moments::FsCorrection;
pub use nalgebra::DMatrix;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        compute, compute_with_engine, ConfidenceInterval, DMatrix, EbciOptions, EbciResult,
        Error, ExecutionStrategy, FsCorrection, Observations, Result, ShrinkageMode,
        SolverConfig,
    };
}
