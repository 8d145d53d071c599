//! Output of [`compute`](crate::compute)

use crate::plan::ExecutionPlan;
use ebci_confidence::ConfidenceInterval;
use ebci_moments::FsCorrection;
use nalgebra::DMatrix;
use serde::Serialize;
use std::fmt;

/// Conditions worth surfacing that do not stop the computation
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Diagnostics {
    /// Path and dispatch that produced the intervals
    pub plan: ExecutionPlan,
    /// Numerical rank of the weighted design
    pub rank: usize,
    /// The design had collinear columns; `delta` is the minimum-norm fit
    pub rank_deficient: bool,
    /// Whether `mu2`/`kappa` were estimated (false when both were supplied)
    pub moments_estimated: bool,
    /// Correction applied to estimated moments
    pub correction: FsCorrection,
    /// Number of solves that stopped at an iteration cap or fell back to
    /// the parametric interval
    pub nonconverged: usize,
    /// Outer solver iterations summed over all solves
    pub solver_iterations: u64,
}

/// Point estimates and confidence intervals for every observation
///
/// All per-observation vectors are in input order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EbciResult {
    /// Shrunk point estimates
    pub thetahat: Vec<f64>,
    /// Confidence intervals centred at `thetahat`
    pub ci: Vec<ConfidenceInterval>,
    /// Shrinkage weight applied to each observation
    pub w_estim: Vec<f64>,
    /// Half-lengths divided by `sigma`
    pub normlng: Vec<f64>,
    /// Second moment of the signal used
    pub mu2: f64,
    /// Kurtosis of the signal used
    pub kappa: f64,
    /// Regression coefficients of the prior mean
    pub delta: Vec<f64>,
    /// Prior means, in the units of `y`
    pub prior_mean: Vec<f64>,
    /// Parametric (normal-prior) weights
    pub w_eb: Vec<f64>,
    /// Parametric half-lengths divided by `sigma`
    pub parametric_normlng: Vec<f64>,
    /// Half-length of the unshrunk interval `y ± z sigma`, divided by `sigma`
    pub unshrunk_normlng: f64,
    /// Worst-case non-coverage of the parametric interval; `None` when
    /// there is no shrinkage signal
    pub max_noncoverage: Vec<Option<f64>>,
    /// Per-observation convergence of the numerical solves
    pub converged: Vec<bool>,
    /// Significance level
    pub alpha: f64,
    pub diagnostics: Diagnostics,
}

impl EbciResult {
    /// Number of observations
    pub fn len(&self) -> usize {
        self.thetahat.len()
    }

    pub fn is_empty(&self) -> bool {
        self.thetahat.is_empty()
    }

    /// Interval bounds as an `n × 2` matrix of `[lower, upper]` rows
    pub fn ci_bounds(&self) -> DMatrix<f64> {
        DMatrix::from_fn(self.ci.len(), 2, |i, j| {
            if j == 0 {
                self.ci[i].lower
            } else {
                self.ci[i].upper
            }
        })
    }

    /// Human-readable multi-line summary
    pub fn summary(&self) -> String {
        let n = self.len() as f64;
        let mean = |v: &[f64]| v.iter().sum::<f64>() / n;
        let worst = self
            .max_noncoverage
            .iter()
            .flatten()
            .copied()
            .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.max(v))));

        let mut out = String::new();
        out.push_str(&format!(
            "EBCI at {:.1}% confidence, {} observations ({})\n",
            (1.0 - self.alpha) * 100.0,
            self.len(),
            self.diagnostics.plan
        ));
        out.push_str(&format!(
            "  mu2 = {:.6}, kappa = {:.6} ({}{})\n",
            self.mu2,
            self.kappa,
            if self.diagnostics.moments_estimated {
                "estimated, correction "
            } else {
                "supplied"
            },
            if self.diagnostics.moments_estimated {
                self.diagnostics.correction.name()
            } else {
                ""
            }
        ));
        out.push_str(&format!(
            "  mean weight = {:.4}, mean normalized half-length = {:.4} (parametric {:.4}, unshrunk {:.4})\n",
            mean(&self.w_estim),
            mean(&self.normlng),
            mean(&self.parametric_normlng),
            self.unshrunk_normlng
        ));
        if let Some(worst) = worst {
            out.push_str(&format!(
                "  worst-case non-coverage of parametric interval = {:.4}\n",
                worst
            ));
        }
        if self.diagnostics.rank_deficient {
            out.push_str(&format!(
                "  warning: rank-deficient design (rank {}), minimum-norm coefficients\n",
                self.diagnostics.rank
            ));
        }
        if self.diagnostics.nonconverged > 0 {
            out.push_str(&format!(
                "  warning: {} solve(s) did not converge\n",
                self.diagnostics.nonconverged
            ));
        }
        out
    }
}

impl fmt::Display for EbciResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}
