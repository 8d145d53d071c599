//! Moment estimation for robust empirical-Bayes confidence intervals
//!
//! Two steps precede the critical value computation:
//!
//! 1. [`fit_shrinkage_direction`] regresses the outcomes on the covariates
//!    to get the prior mean `mu1_i = X_i' delta` of each signal.
//! 2. [`estimate_moments`] turns the residuals into estimates of the second
//!    moment `mu2` and kurtosis `kappa` of the signal around that mean,
//!    subtracting the known sampling noise and applying a finite-sample
//!    correction ([`FsCorrection`]).
//!
//! # Example
//!
//! ```rust
//! use ebci_core::SolverConfig;
//! use ebci_moments::{estimate_moments, fit_shrinkage_direction, FsCorrection};
//! use nalgebra::DMatrix;
//!
//! let y = [5.0, -5.0, 5.0, -5.0];
//! let sigma = [1.0; 4];
//! let weights = [1.0; 4];
//! let x = DMatrix::from_element(4, 1, 1.0);
//!
//! let fit = fit_shrinkage_direction(&y, &x, &weights, &SolverConfig::default()).unwrap();
//! let moments = estimate_moments(&fit.residuals(&y), &sigma, &weights, FsCorrection::Pmt).unwrap();
//! assert!((moments.mu2 - 24.0).abs() < 1e-9);
//! ```

pub mod moments;
pub mod regression;

pub use moments::{estimate_moments, flat_prior_posterior_mean, FsCorrection, MomentEstimate};
pub use regression::{fit_shrinkage_direction, ShrinkageDirection};
