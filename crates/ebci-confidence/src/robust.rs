//! Robust EBCIs for a single observation
//!
//! Shrinking `Y` toward its prior mean with weight `w` gives the estimator
//! `w Y`, whose bias normalized by its standard deviation `w sigma` has
//! squared mean `m = ((1 - w) / w)² r`, where `r = mu2 / sigma²`. The robust
//! interval uses the critical value [`cva`](crate::critical::cva) at that
//! `m`; its normalized half-length is `w · cva(m, kappa, alpha)`.
//!
//! Two ways to pick `w`:
//!
//! - **MSE-optimal**: a supplied weight, normally the empirical-Bayes weight
//!   `r / (1 + r)`.
//! - **Length-optimal**: the weight in `[0, 1]` with the shortest interval.

use crate::critical::{cva, NestedSolves};
use crate::noncoverage::rho;
use crate::parametric::eb_weight;
use crate::types::RobustEbci;
use ebci_core::{normal, solvers, Error, Result, SolverConfig};
use tracing::debug;

fn check_ratio(ratio: f64) -> Result<()> {
    if ratio.is_finite() && ratio >= 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidParameter(format!(
            "Signal-to-noise ratio {ratio} must be finite and non-negative"
        )))
    }
}

/// Robust interval for a fixed shrinkage weight
///
/// A weight of (numerically) zero returns the limit `sqrt(ratio)`.
pub fn mse_ebci(
    weight: f64,
    ratio: f64,
    kappa: Option<f64>,
    alpha: f64,
    config: &SolverConfig,
) -> Result<RobustEbci> {
    check_ratio(ratio)?;
    if !(0.0..=1.0).contains(&weight) {
        return Err(Error::InvalidParameter(format!(
            "Shrinkage weight {weight} must be in [0, 1]"
        )));
    }

    if weight <= f64::EPSILON {
        ebci_core::error::check_alpha(alpha)?;
        return Ok(RobustEbci {
            weight,
            half_length: ratio.sqrt(),
            iterations: 0,
            converged: true,
        });
    }

    let m = ((1.0 - weight) / weight).powi(2) * ratio;
    let cv = cva(m, kappa, alpha, config)?;
    Ok(RobustEbci {
        weight,
        half_length: weight * cv.chi,
        iterations: cv.iterations,
        converged: cv.converged,
    })
}

/// Robust interval with the weight chosen to minimise its length
///
/// The bounded minimiser's answer is compared with the empirical-Bayes
/// weight and the two endpoints, so the result is never longer than any of
/// those.
pub fn length_optimal_ebci(
    ratio: f64,
    kappa: Option<f64>,
    alpha: f64,
    config: &SolverConfig,
) -> Result<RobustEbci> {
    check_ratio(ratio)?;
    ebci_core::error::check_alpha(alpha)?;

    let nested = NestedSolves::default();
    let half_length = |w: f64| {
        nested.value(mse_ebci(w, ratio, kappa, alpha, config), |e: &RobustEbci| {
            (e.half_length, e.converged)
        })
    };
    let solution = solvers::minimize_bounded(&half_length, 0.0, 1.0, config);
    let nonconverged = nested.finish()?;
    let solution = solution?;

    let mut best = RobustEbci {
        weight: solution.x,
        half_length: solution.fx,
        iterations: solution.iterations,
        converged: solution.converged && nonconverged == 0,
    };

    for w in [eb_weight(ratio), 1.0, 0.0] {
        let candidate = mse_ebci(w, ratio, kappa, alpha, config)?;
        best.converged &= candidate.converged;
        if candidate.half_length < best.half_length {
            best.weight = candidate.weight;
            best.half_length = candidate.half_length;
        }
    }

    debug!(
        "length-optimal weight {:.6} (half-length {:.6}) for ratio {:.6}",
        best.weight, best.half_length, ratio
    );
    Ok(best)
}

/// Robust interval in either mode
///
/// `Some(weight)` selects the MSE-optimal mode with that weight, `None` the
/// length-optimal mode.
pub fn robust_ebci(
    weight: Option<f64>,
    ratio: f64,
    kappa: Option<f64>,
    alpha: f64,
    config: &SolverConfig,
) -> Result<RobustEbci> {
    match weight {
        Some(w) => mse_ebci(w, ratio, kappa, alpha, config),
        None => length_optimal_ebci(ratio, kappa, alpha, config),
    }
}

/// Worst-case non-coverage of the parametric EBCI
///
/// Evaluates how badly `w_eb Y ± z sqrt(w_eb) sigma` can undercover when
/// only the second moment (and optionally the kurtosis) of the signal is
/// known. Returns `None` when the parametric weight is zero.
pub fn max_noncoverage(
    ratio: f64,
    kappa: Option<f64>,
    alpha: f64,
    config: &SolverConfig,
) -> Result<Option<f64>> {
    check_ratio(ratio)?;
    let z = normal::two_sided_critical_value(alpha)?;
    let w = eb_weight(ratio);
    if w <= f64::EPSILON {
        return Ok(None);
    }
    let worst = rho(1.0 / ratio, kappa, z / w.sqrt(), config)?;
    Ok(Some(worst.value))
}
