//! Error types for empirical-Bayes confidence intervals
//!
//! Provides a unified error type for all ebci crates.

use thiserror::Error;

/// Core error type for EBCI operations
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid parameter provided to a function
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Invalid input data
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Insufficient data for the requested operation
    #[error("Insufficient data: expected at least {expected} observations, got {actual}")]
    InsufficientData { expected: usize, actual: usize },

    /// Numerical computation error
    #[error("Computation error: {0}")]
    Computation(String),

    /// Threading or parallelization error
    #[error("Execution error: {0}")]
    Execution(String),

    /// Configuration could not be parsed
    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),

    /// Other errors, including those raised by the optimizer backend
    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an error for a significance level outside (0, 1)
    pub fn invalid_alpha(alpha: f64) -> Self {
        Self::InvalidParameter(format!("Significance level {alpha} must be in (0, 1)"))
    }

    /// Create an error for size mismatch
    pub fn size_mismatch(expected: usize, actual: usize, context: &str) -> Self {
        Self::InvalidInput(format!(
            "Size mismatch in {context}: expected {expected}, got {actual}"
        ))
    }

    /// Create an error for NaN/Inf values
    pub fn non_finite(context: &str) -> Self {
        Self::InvalidInput(format!("{context} contains NaN or infinite values"))
    }
}

/// Check that `alpha` is a valid significance level
pub fn check_alpha(alpha: f64) -> Result<()> {
    if alpha > 0.0 && alpha < 1.0 {
        Ok(())
    } else {
        Err(Error::invalid_alpha(alpha))
    }
}
