//! Parametric EBCI under a normal prior
//!
//! With signal-to-noise ratio `r = mu2 / sigma^2` the posterior mean under a
//! normal prior shrinks by `w_eb = r / (1 + r)` and the interval
//! `w_eb Y ± z sqrt(w_eb) sigma` has exact coverage when the prior is normal.

use crate::types::ParametricEbci;
use ebci_core::{normal, Error, Result};

/// Empirical-Bayes shrinkage weight for signal-to-noise ratio `ratio`
///
/// Negative ratios are clamped to zero and an infinite ratio gives one.
pub fn eb_weight(ratio: f64) -> f64 {
    if ratio == f64::INFINITY {
        return 1.0;
    }
    let r = ratio.max(0.0);
    r / (1.0 + r)
}

/// Parametric weight and normalized half-length for one observation
pub fn parametric_ebci(ratio: f64, alpha: f64) -> Result<ParametricEbci> {
    let z = normal::two_sided_critical_value(alpha)?;
    parametric_with_critical_value(ratio, z)
}

/// Parametric weights and half-lengths for a batch of ratios
pub fn parametric_ebci_batch(ratios: &[f64], alpha: f64) -> Result<Vec<ParametricEbci>> {
    let z = normal::two_sided_critical_value(alpha)?;
    ratios
        .iter()
        .map(|&ratio| parametric_with_critical_value(ratio, z))
        .collect()
}

fn parametric_with_critical_value(ratio: f64, z: f64) -> Result<ParametricEbci> {
    if ratio.is_nan() {
        return Err(Error::non_finite("signal-to-noise ratio"));
    }
    let weight = eb_weight(ratio);
    Ok(ParametricEbci {
        weight,
        half_length: z * weight.sqrt(),
    })
}
