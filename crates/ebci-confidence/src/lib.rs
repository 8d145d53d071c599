//! Parametric and robust empirical-Bayes confidence intervals
//!
//! Given the signal-to-noise ratio `r = mu2 / sigma²` of an observation,
//! this crate computes the shrinkage weight and the half-length (in units of
//! `sigma`) of an interval around the shrunk estimate:
//!
//! - **Parametric**: exact under a normal prior, `w_eb = r / (1 + r)` and
//!   half-length `z sqrt(w_eb)`.
//! - **Robust**: valid for any prior with the given second moment (and
//!   optionally kurtosis), using the worst-case non-coverage over all such
//!   priors.
//!
//! # Overview
//!
//! | Function | Purpose |
//! |----------|---------|
//! | [`parametric_ebci`] | Normal-prior weight and half-length |
//! | [`rho`] | Worst-case non-coverage and least-favourable distribution |
//! | [`cva`] | Robust critical value |
//! | [`robust_ebci`] | MSE-optimal or length-optimal robust interval |
//! | [`max_noncoverage`] | Worst-case non-coverage of the parametric interval |
//!
//! # Example
//!
//! ```rust
//! use ebci_confidence::{parametric_ebci, robust_ebci};
//! use ebci_core::SolverConfig;
//!
//! let config = SolverConfig::default();
//! let parametric = parametric_ebci(1.0, 0.05).unwrap();
//! let robust = robust_ebci(Some(parametric.weight), 1.0, Some(3.0), 0.05, &config).unwrap();
//!
//! assert_eq!(robust.weight, 0.5);
//! assert!(robust.half_length >= parametric.half_length);
//! ```

pub mod critical;
pub mod noncoverage;
pub mod parametric;
pub mod robust;
mod types;

pub use critical::{cva, CriticalValue};
pub use noncoverage::{
    kappa_bound, noncoverage, r0, r0_derivative, rho, tangency_point, LeastFavorable, Tangency,
    WorstCase,
};
pub use parametric::{eb_weight, parametric_ebci, parametric_ebci_batch};
pub use robust::{length_optimal_ebci, max_noncoverage, mse_ebci, robust_ebci};
pub use types::{ConfidenceInterval, ParametricEbci, RobustEbci};
