//! Second moment and kurtosis of the signal, net of sampling noise
//!
//! A residual `r_i = Y_i - mu1_i` is the sum of the deviation `epsilon_i` we
//! care about and normal noise with known variance `sigma_i^2`. Unbiased
//! estimates of the moments of `epsilon` follow from the Hermite identities
//!
//! ```text
//! E[r^2 - sigma^2]                       = E[epsilon^2]
//! E[r^4 - 6 sigma^2 r^2 + 3 sigma^4]     = E[epsilon^4]
//! ```
//!
//! In small samples the second-moment estimate can be negative, so a
//! finite-sample correction is applied on top.

use ebci_core::{normal, Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Finite-sample correction applied to the raw moment estimates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FsCorrection {
    /// Raw noise-subtracted estimates; the second moment may be negative
    None,
    /// Posterior mean truncation: clip the second moment at zero and the
    /// fourth moment at `mu2²`, so the kurtosis is at least one
    #[default]
    Pmt,
    /// Flat-prior limited-information Bayes posterior means
    Fplib,
}

impl FsCorrection {
    /// Short name used in logs and summaries
    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Pmt => "PMT",
            Self::Fplib => "FPLIB",
        }
    }
}

impl fmt::Display for FsCorrection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Estimated moments of the signal deviation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MomentEstimate {
    /// Corrected second moment
    pub mu2: f64,
    /// Corrected kurtosis `E[epsilon^4] / mu2^2`
    pub kappa: f64,
    /// Noise-subtracted second moment before correction
    pub uncorrected_mu2: f64,
    /// Noise-subtracted fourth moment before correction
    pub uncorrected_mu4: f64,
    /// Correction that produced `mu2` and `kappa`
    pub correction: FsCorrection,
}

/// Weighted sums needed by every correction policy
#[derive(Debug, Clone, Copy)]
struct WeightedSums {
    /// Σ ω
    total: f64,
    /// Σ ω σ²
    sigma2: f64,
    /// Σ ω σ⁴
    sigma4: f64,
    /// Σ ω² σ⁴
    sq_sigma4: f64,
    /// Σ ω² σ⁸
    sq_sigma8: f64,
    /// Σ ω (r² − σ²) / Σ ω
    m2: f64,
    /// Σ ω (r⁴ − 6σ²r² + 3σ⁴) / Σ ω
    m4: f64,
}

impl WeightedSums {
    fn new(residuals: &[f64], sigma: &[f64], weights: &[f64]) -> Self {
        let mut sums = Self {
            total: 0.0,
            sigma2: 0.0,
            sigma4: 0.0,
            sq_sigma4: 0.0,
            sq_sigma8: 0.0,
            m2: 0.0,
            m4: 0.0,
        };

        for ((&r, &s), &w) in residuals.iter().zip(sigma).zip(weights) {
            if w == 0.0 {
                continue;
            }
            let s2 = s * s;
            let s4 = s2 * s2;
            let r2 = r * r;
            sums.total += w;
            sums.sigma2 += w * s2;
            sums.sigma4 += w * s4;
            sums.sq_sigma4 += w * w * s4;
            sums.sq_sigma8 += w * w * s4 * s4;
            sums.m2 += w * (r2 - s2);
            sums.m4 += w * (r2 * r2 - 6.0 * s2 * r2 + 3.0 * s4);
        }

        sums.m2 /= sums.total;
        sums.m4 /= sums.total;
        sums
    }
}

/// Posterior mean of a non-negative parameter under a flat prior, given an
/// estimate `estimate` with standard error `se`
pub fn flat_prior_posterior_mean(estimate: f64, se: f64) -> f64 {
    if se <= 0.0 {
        return estimate.max(0.0);
    }
    let z = estimate / se;
    se * (z + normal::inverse_mills(z))
}

/// Estimate the second moment and kurtosis of the signal deviation
///
/// # Arguments
/// * `residuals` - Deviations of the outcomes from the fitted prior mean
/// * `sigma` - Known standard deviations of the sampling noise
/// * `weights` - Non-negative weights; zero-weight observations are ignored
/// * `correction` - Finite-sample correction policy
pub fn estimate_moments(
    residuals: &[f64],
    sigma: &[f64],
    weights: &[f64],
    correction: FsCorrection,
) -> Result<MomentEstimate> {
    let n = residuals.len();
    if n == 0 {
        return Err(Error::InsufficientData {
            expected: 1,
            actual: 0,
        });
    }
    if sigma.len() != n {
        return Err(Error::size_mismatch(n, sigma.len(), "sigma"));
    }
    if weights.len() != n {
        return Err(Error::size_mismatch(n, weights.len(), "weights"));
    }
    if weights.iter().any(|&w| !(w >= 0.0) || !w.is_finite()) {
        return Err(Error::InvalidInput(
            "weights must be finite and non-negative".to_string(),
        ));
    }

    let sums = WeightedSums::new(residuals, sigma, weights);
    if !(sums.total > 0.0) {
        return Err(Error::InvalidInput(
            "at least one weight must be positive".to_string(),
        ));
    }

    let (mu2, kappa) = match correction {
        FsCorrection::None => (sums.m2, sums.m4 / (sums.m2 * sums.m2)),
        FsCorrection::Pmt => {
            let mu2 = sums.m2.max(0.0);
            let kappa = if mu2 > 0.0 {
                sums.m4.max(mu2 * mu2) / (mu2 * mu2)
            } else {
                f64::INFINITY
            };
            (mu2, kappa)
        }
        FsCorrection::Fplib => {
            let mu2 = flat_prior_posterior_mean(
                sums.m2,
                (2.0 * sums.sq_sigma4).sqrt() / sums.total,
            );
            let var_eps2 = flat_prior_posterior_mean(
                sums.m4 - mu2 * mu2,
                (32.0 * sums.sq_sigma8).sqrt() / sums.total,
            );
            (mu2, 1.0 + var_eps2 / (mu2 * mu2))
        }
    };

    Ok(MomentEstimate {
        mu2,
        kappa,
        uncorrected_mu2: sums.m2,
        uncorrected_mu4: sums.m4,
        correction,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_uncorrected_moments() {
        let residuals = [5.0, -5.0, 5.0, -5.0];
        let sigma = [1.0; 4];
        let weights = [1.0; 4];

        let est = estimate_moments(&residuals, &sigma, &weights, FsCorrection::None).unwrap();
        assert_relative_eq!(est.mu2, 24.0, epsilon = 1e-12);
        // 625 - 6 * 25 + 3
        assert_relative_eq!(est.uncorrected_mu4, 478.0, epsilon = 1e-12);
        assert_relative_eq!(est.kappa, 478.0 / 576.0, epsilon = 1e-12);
    }

    #[test]
    fn test_pmt_clips_second_moment_at_zero() {
        let residuals = [0.0; 4];
        let sigma = [1.0; 4];
        let weights = [1.0; 4];

        let est = estimate_moments(&residuals, &sigma, &weights, FsCorrection::Pmt).unwrap();
        assert_relative_eq!(est.uncorrected_mu2, -1.0, epsilon = 1e-12);
        assert_eq!(est.mu2, 0.0);
        // No kurtosis information survives a zero second moment
        assert_eq!(est.kappa, f64::INFINITY);
    }

    #[test]
    fn test_pmt_matches_none_with_strong_signal() {
        let residuals = [5.0, -5.0, 5.0, -5.0];
        let sigma = [1.0; 4];
        let weights = [1.0; 4];

        let raw = estimate_moments(&residuals, &sigma, &weights, FsCorrection::None).unwrap();
        let pmt = estimate_moments(&residuals, &sigma, &weights, FsCorrection::Pmt).unwrap();
        assert_eq!(pmt.mu2, raw.mu2);
        // Raw kurtosis 478 / 576 is below one and gets raised
        assert!(raw.kappa < 1.0);
        assert_relative_eq!(pmt.kappa, 1.0, epsilon = 1e-15);
    }

    #[test]
    fn test_pmt_kappa_at_least_one() {
        let residuals = [3.0, -3.0, 3.0, -3.0, 3.0, -3.0];
        let sigma = [0.5; 6];
        let weights = [1.0; 6];

        let est = estimate_moments(&residuals, &sigma, &weights, FsCorrection::Pmt).unwrap();
        assert!(est.mu2 > 0.0);
        assert!(est.kappa >= 1.0);
    }

    #[test]
    fn test_fplib_is_positive_and_smooth() {
        let sigma = [1.0; 4];
        let weights = [1.0; 4];

        let mut previous = 0.0;
        for scale in [0.0, 0.5, 1.0, 1.5, 2.0, 4.0] {
            let residuals = [scale, -scale, scale, -scale];
            let est =
                estimate_moments(&residuals, &sigma, &weights, FsCorrection::Fplib).unwrap();
            assert!(est.mu2 > 0.0);
            assert!(est.mu2 > previous);
            assert!(est.kappa >= 1.0);
            previous = est.mu2;
        }
    }

    #[test]
    fn test_flat_prior_posterior_mean() {
        // Far above zero the prior is irrelevant
        assert_relative_eq!(flat_prior_posterior_mean(50.0, 1.0), 50.0, epsilon = 1e-12);
        // At zero: se * pdf(0) / cdf(0)
        assert_relative_eq!(
            flat_prior_posterior_mean(0.0, 2.0),
            2.0 * 2.0 * normal::pdf(0.0),
            epsilon = 1e-12
        );
        // Deep below zero the mean shrinks toward se^2 / |estimate|
        let deep = flat_prior_posterior_mean(-100.0, 1.0);
        assert!(deep > 0.0 && deep < 0.011);
    }

    #[test]
    fn test_zero_weights_are_ignored() {
        let residuals = [2.0, -1.0, 3.0, 100.0];
        let sigma = [1.0, 0.5, 2.0, 0.1];
        let weights = [1.0, 2.0, 0.5, 0.0];

        let full = estimate_moments(&residuals, &sigma, &weights, FsCorrection::Pmt).unwrap();
        let subset =
            estimate_moments(&residuals[..3], &sigma[..3], &weights[..3], FsCorrection::Pmt)
                .unwrap();
        assert_relative_eq!(full.mu2, subset.mu2, epsilon = 1e-12);
        assert_relative_eq!(full.kappa, subset.kappa, epsilon = 1e-12);
    }

    #[test]
    fn test_weights_scale_invariance() {
        let residuals = [2.0, -1.0, 3.0, 0.5];
        let sigma = [1.0, 0.5, 2.0, 0.1];
        let weights = [1.0, 2.0, 0.5, 1.5];
        let scaled: Vec<f64> = weights.iter().map(|w| w * 7.0).collect();

        for correction in [FsCorrection::None, FsCorrection::Pmt, FsCorrection::Fplib] {
            let a = estimate_moments(&residuals, &sigma, &weights, correction).unwrap();
            let b = estimate_moments(&residuals, &sigma, &scaled, correction).unwrap();
            assert_relative_eq!(a.mu2, b.mu2, max_relative = 1e-12);
            assert_relative_eq!(a.kappa, b.kappa, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(estimate_moments(&[], &[], &[], FsCorrection::Pmt).is_err());
        assert!(estimate_moments(&[1.0], &[1.0, 2.0], &[1.0], FsCorrection::Pmt).is_err());
        assert!(estimate_moments(&[1.0], &[1.0], &[-1.0], FsCorrection::Pmt).is_err());
        assert!(estimate_moments(&[1.0, 2.0], &[1.0, 1.0], &[0.0, 0.0], FsCorrection::Pmt).is_err());
    }

    #[test]
    fn test_correction_names() {
        assert_eq!(FsCorrection::default(), FsCorrection::Pmt);
        assert_eq!(FsCorrection::Fplib.to_string(), "FPLIB");
    }
}
