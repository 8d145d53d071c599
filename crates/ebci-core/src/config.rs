//! Numeric options consumed by the critical value solver and the
//! shrinkage-direction fit.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Tolerances and iteration caps for the numerical routines
///
/// Every field has a default, so a partial JSON document deserializes into a
/// complete configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Absolute tolerance for Brent root finding (critical values, `t0`)
    pub root_tolerance: f64,
    /// Iteration cap for a single root-finding run
    pub max_root_iterations: u64,
    /// Relative tolerance for Brent minimisation (length-optimal weight)
    pub minimize_rel_tolerance: f64,
    /// Absolute tolerance for Brent minimisation
    pub minimize_abs_tolerance: f64,
    /// Iteration cap for a single minimisation run
    pub max_minimize_iterations: u64,
    /// Maximum number of bracket expansions when searching for a sign change
    pub max_bracket_expansions: u32,
    /// Relative threshold below which singular values of the weighted
    /// design are treated as zero
    pub rank_tolerance: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            root_tolerance: 1e-12,
            max_root_iterations: 200,
            minimize_rel_tolerance: 1e-8,
            minimize_abs_tolerance: 1e-10,
            max_minimize_iterations: 200,
            max_bracket_expansions: 64,
            rank_tolerance: f64::EPSILON,
        }
    }
}

impl SolverConfig {
    /// Faster, looser settings for exploratory runs
    pub fn fast() -> Self {
        Self {
            root_tolerance: 1e-8,
            max_root_iterations: 100,
            minimize_rel_tolerance: 1e-6,
            minimize_abs_tolerance: 1e-8,
            max_minimize_iterations: 100,
            ..Self::default()
        }
    }

    /// Set the root-finding tolerance
    pub fn with_root_tolerance(mut self, tolerance: f64) -> Self {
        self.root_tolerance = tolerance;
        self
    }

    /// Set the root-finding iteration cap
    pub fn with_max_root_iterations(mut self, iterations: u64) -> Self {
        self.max_root_iterations = iterations;
        self
    }

    /// Set the minimisation iteration cap
    pub fn with_max_minimize_iterations(mut self, iterations: u64) -> Self {
        self.max_minimize_iterations = iterations;
        self
    }

    /// Check that all tolerances are positive and all caps non-zero
    pub fn validate(&self) -> Result<()> {
        let tolerances = [
            ("root_tolerance", self.root_tolerance),
            ("minimize_rel_tolerance", self.minimize_rel_tolerance),
            ("minimize_abs_tolerance", self.minimize_abs_tolerance),
            ("rank_tolerance", self.rank_tolerance),
        ];
        for (name, value) in tolerances {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::InvalidParameter(format!(
                    "{name} must be positive and finite, got {value}"
                )));
            }
        }
        if self.max_root_iterations == 0 || self.max_minimize_iterations == 0 {
            return Err(Error::InvalidParameter(
                "Iteration caps must be at least 1".to_string(),
            ));
        }
        if self.max_bracket_expansions == 0 {
            return Err(Error::InvalidParameter(
                "max_bracket_expansions must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
