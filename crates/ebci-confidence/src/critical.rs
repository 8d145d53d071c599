//! Robust critical values
//!
//! `cva(m, kappa, alpha)` is the smallest normalized half-length `chi` whose
//! worst-case non-coverage under the moment constraints equals `alpha`.

use crate::noncoverage::{rho, WorstCase};
use ebci_core::{normal, solvers, Error, Result, SolverConfig};
use std::cell::{Cell, RefCell};
use tracing::debug;

/// Robust critical value and solver bookkeeping
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CriticalValue {
    /// Normalized half-length
    pub chi: f64,
    /// Iterations of the outer root finder
    pub iterations: u64,
    /// False when the outer solve or any nested tangency solve hit its cap
    pub converged: bool,
}

/// Collects what closures evaluated inside a scalar solver cannot return:
/// errors and non-converged nested solves.
#[derive(Debug, Default)]
pub(crate) struct NestedSolves {
    nonconverged: Cell<u64>,
    error: RefCell<Option<Error>>,
}

impl NestedSolves {
    /// Unwrap a nested result into a plain value, remembering failures
    pub(crate) fn value<T>(&self, result: Result<T>, extract: impl FnOnce(&T) -> (f64, bool)) -> f64 {
        match result {
            Ok(inner) => {
                let (value, converged) = extract(&inner);
                if !converged {
                    self.nonconverged.set(self.nonconverged.get() + 1);
                }
                value
            }
            Err(e) => {
                self.error.borrow_mut().get_or_insert(e);
                f64::NAN
            }
        }
    }

    /// First recorded error, or the number of non-converged nested solves
    pub(crate) fn finish(self) -> Result<u64> {
        match self.error.into_inner() {
            Some(e) => Err(e),
            None => Ok(self.nonconverged.get()),
        }
    }
}

/// Robust critical value `cva(m, kappa, alpha)`
///
/// Solves `rho(m, kappa, chi) = alpha` for `chi` between the normal critical
/// value (no bias) and the Chebyshev bound `sqrt((1 + m) / alpha)`.
pub fn cva(m: f64, kappa: Option<f64>, alpha: f64, config: &SolverConfig) -> Result<CriticalValue> {
    let z = normal::two_sided_critical_value(alpha)?;
    if !(m.is_finite() && m >= 0.0) {
        return Err(Error::InvalidParameter(format!(
            "Bias bound {m} must be finite and non-negative"
        )));
    }
    if m == 0.0 {
        return Ok(CriticalValue {
            chi: z,
            iterations: 0,
            converged: true,
        });
    }

    let upper = ((1.0 + m) / alpha).sqrt();
    let nested = NestedSolves::default();
    let excess = |chi: f64| {
        nested.value(rho(m, kappa, chi, config), |wc: &WorstCase| {
            (wc.value, wc.converged)
        }) - alpha
    };

    // rho(m, kappa, z) >= r0(0, z) = alpha, so any shortfall at z is
    // rounding in the normal tails and z itself is the answer. Likewise
    // Chebyshev caps the excess at the upper end at zero.
    let (at_lower, at_upper) = (excess(z), excess(upper));
    if at_lower <= 0.0 || at_upper >= 0.0 {
        let nonconverged = nested.finish()?;
        let chi = if at_lower <= 0.0 { z } else { upper };
        debug!(
            "cva(m = {:.6}, kappa = {:?}, alpha = {}) = {:.6} at the bracket end",
            m, kappa, alpha, chi
        );
        return Ok(CriticalValue {
            chi,
            iterations: 0,
            converged: nonconverged == 0,
        });
    }

    let solution = solvers::find_root(&excess, z, upper, config);
    let nonconverged = nested.finish()?;
    let solution = solution?;

    debug!(
        "cva(m = {:.6}, kappa = {:?}, alpha = {}) = {:.6} in {} iterations",
        m, kappa, alpha, solution.x, solution.iterations
    );

    Ok(CriticalValue {
        chi: solution.x,
        iterations: solution.iterations,
        converged: solution.converged && nonconverged == 0,
    })
}
