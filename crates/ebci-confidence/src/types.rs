//! Common types for empirical-Bayes confidence intervals

use serde::{Deserialize, Serialize};
use std::fmt;

/// A confidence interval with lower and upper bounds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    /// Lower bound of the interval
    pub lower: f64,
    /// Upper bound of the interval
    pub upper: f64,
    /// The point estimate (center of interval)
    pub estimate: f64,
    /// Confidence level (e.g., 0.95 for 95% CI)
    pub confidence_level: f64,
}

impl ConfidenceInterval {
    /// Create a new confidence interval
    pub fn new(lower: f64, upper: f64, estimate: f64, confidence_level: f64) -> Self {
        Self {
            lower,
            upper,
            estimate,
            confidence_level,
        }
    }

    /// Symmetric interval `estimate ± half_length`
    pub fn symmetric(estimate: f64, half_length: f64, confidence_level: f64) -> Self {
        Self::new(
            estimate - half_length,
            estimate + half_length,
            estimate,
            confidence_level,
        )
    }

    /// Width of the confidence interval
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    /// Check if a value is contained in the interval
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }
}

impl fmt::Display for ConfidenceInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.1}% CI: [{:.4}, {:.4}], estimate: {:.4}",
            self.confidence_level * 100.0,
            self.lower,
            self.upper,
            self.estimate
        )
    }
}

/// Shrinkage weight and normalized half-length of the parametric EBCI
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParametricEbci {
    /// Empirical-Bayes shrinkage weight `r / (1 + r)`
    pub weight: f64,
    /// Half-length divided by the noise standard deviation
    pub half_length: f64,
}

/// Shrinkage weight and normalized half-length of a robust EBCI
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RobustEbci {
    /// Shrinkage weight applied to the outcome
    pub weight: f64,
    /// Half-length divided by the noise standard deviation
    pub half_length: f64,
    /// Outer solver iterations (root finding or minimisation)
    pub iterations: u64,
    /// False when any solver involved stopped at its iteration cap
    pub converged: bool,
}
