//! Caller-facing options for [`compute`](crate::compute)

use ebci_core::{Error, ExecutionStrategy, Result, SolverConfig};
use ebci_moments::FsCorrection;
use serde::{Deserialize, Serialize};

/// How outcomes are normalized before shrinkage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShrinkageMode {
    /// Shrink `Y_i` directly; the signal is assumed independent of `sigma_i`
    #[default]
    MomentIndependence,
    /// Shrink the t-statistics `Y_i / sigma_i`; all observations share one
    /// weight and one half-length
    TStatistic,
}

/// Options controlling estimation and interval construction
///
/// Every field has a default, so `EbciOptions::default()` and any partial
/// JSON document are valid configurations.
///
/// # Example
///
/// ```rust
/// use robust_ebci::{EbciOptions, FsCorrection, ShrinkageMode};
///
/// let options = EbciOptions::default()
///     .with_correction(FsCorrection::Fplib)
///     .tstat_shrinkage()
///     .length_optimal();
/// assert_eq!(options.shrinkage, ShrinkageMode::TStatistic);
///
/// let parsed = EbciOptions::from_json(r#"{ "kappa": 3.0, "parametric": true }"#).unwrap();
/// assert_eq!(parsed.kappa, Some(3.0));
/// assert!(parsed.use_kappa_bound);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EbciOptions {
    /// Supplied second moment of the signal; estimated when absent
    pub mu2: Option<f64>,
    /// Supplied kurtosis of the signal; estimated when absent
    pub kappa: Option<f64>,
    /// Report the parametric interval instead of the robust one
    pub parametric: bool,
    /// Normalization applied before shrinkage
    pub shrinkage: ShrinkageMode,
    /// Choose the weight that minimises interval length
    pub length_optimal: bool,
    /// Impose the kurtosis constraint in the robust solver
    pub use_kappa_bound: bool,
    /// Finite-sample correction for estimated moments
    pub correction: FsCorrection,
    /// Raise progress events from `debug` to `info`
    pub verbose: bool,
    /// How per-observation solves are dispatched
    pub execution: ExecutionStrategy,
    /// Numeric tolerances and iteration caps
    pub solver: SolverConfig,
}

impl Default for EbciOptions {
    fn default() -> Self {
        Self {
            mu2: None,
            kappa: None,
            parametric: false,
            shrinkage: ShrinkageMode::MomentIndependence,
            length_optimal: false,
            use_kappa_bound: true,
            correction: FsCorrection::Pmt,
            verbose: false,
            execution: ExecutionStrategy::Auto,
            solver: SolverConfig::default(),
        }
    }
}

impl EbciOptions {
    /// Parse options from JSON and validate them
    pub fn from_json(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// Use a known second moment instead of estimating it
    pub fn with_mu2(mut self, mu2: f64) -> Self {
        self.mu2 = Some(mu2);
        self
    }

    /// Use a known kurtosis instead of estimating it
    pub fn with_kappa(mut self, kappa: f64) -> Self {
        self.kappa = Some(kappa);
        self
    }

    /// Report parametric intervals
    pub fn parametric(mut self) -> Self {
        self.parametric = true;
        self
    }

    /// Shrink t-statistics instead of raw outcomes
    pub fn tstat_shrinkage(mut self) -> Self {
        self.shrinkage = ShrinkageMode::TStatistic;
        self
    }

    /// Search for the length-minimising weight
    pub fn length_optimal(mut self) -> Self {
        self.length_optimal = true;
        self
    }

    /// Drop the kurtosis constraint from the robust solver
    pub fn without_kappa_bound(mut self) -> Self {
        self.use_kappa_bound = false;
        self
    }

    /// Set the finite-sample correction
    pub fn with_correction(mut self, correction: FsCorrection) -> Self {
        self.correction = correction;
        self
    }

    /// Log progress at `info` level
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Set the execution strategy
    pub fn with_execution(mut self, execution: ExecutionStrategy) -> Self {
        self.execution = execution;
        self
    }

    /// Set the numeric options
    pub fn with_solver(mut self, solver: SolverConfig) -> Self {
        self.solver = solver;
        self
    }

    /// Check supplied moments and numeric options
    pub fn validate(&self) -> Result<()> {
        if let Some(mu2) = self.mu2 {
            if !(mu2.is_finite() && mu2 >= 0.0) {
                return Err(Error::InvalidInput(format!(
                    "Supplied mu2 must be finite and non-negative, got {mu2}"
                )));
            }
        }
        if let Some(kappa) = self.kappa {
            // +inf is allowed and means "no kurtosis bound"
            if kappa.is_nan() || kappa <= 0.0 {
                return Err(Error::InvalidInput(format!(
                    "Supplied kappa must be positive, got {kappa}"
                )));
            }
        }
        self.solver.validate()
    }
}
