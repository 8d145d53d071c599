//! Worst-case non-coverage of a shrinkage interval
//!
//! Write `b` for the bias of the shrinkage estimator normalized by its
//! standard deviation. The interval `estimate ± chi · sd` misses the signal
//! with probability
//!
//! ```text
//! r(b, chi) = Φ(-chi - b) + Φ(b - chi)
//! ```
//!
//! and we write `r0(t, chi) = r(sqrt(t), chi)`. Only moments of `t = b²`
//! are known, so the coverage guarantee uses the largest `E r0(t, chi)` over
//! all distributions of `t ≥ 0` with `E t = m` and, optionally,
//! `E t² ≤ kappa m²`. The supremum is attained by a distribution with at most
//! two support points; [`rho`] returns both the value and that distribution.

use ebci_core::{normal, solvers, Error, Result, SolverConfig};
use tracing::{debug, warn};

/// Non-coverage probability `r(b, chi)` at normalized bias `b`
pub fn noncoverage(b: f64, chi: f64) -> f64 {
    normal::sf(chi + b) + normal::cdf(b - chi)
}

/// Non-coverage as a function of the squared normalized bias `t`
pub fn r0(t: f64, chi: f64) -> f64 {
    noncoverage(t.max(0.0).sqrt(), chi)
}

/// Derivative of [`r0`] with respect to `t`
pub fn r0_derivative(t: f64, chi: f64) -> f64 {
    if t <= 0.0 {
        return chi * normal::pdf(chi);
    }
    let s = t.sqrt();
    if chi * s > 20.0 {
        // sinh overflows long before the difference of densities does
        return (normal::pdf(s - chi) - normal::pdf(s + chi)) / (2.0 * s);
    }
    normal::pdf(chi) * (-0.5 * t).exp() * (chi * s).sinh() / s
}

/// Kurtosis bound actually imposed
///
/// Non-finite values and a disabled bound both mean "unconstrained".
pub fn kappa_bound(kappa: f64, use_kappa_bound: bool) -> Option<f64> {
    (use_kappa_bound && kappa.is_finite()).then_some(kappa)
}

/// Point where the line from `(0, r0(0))` touches `r0(., chi)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tangency {
    /// Tangency point, zero when `r0(., chi)` is concave
    pub t0: f64,
    /// False when the root finder stopped at its iteration cap
    pub converged: bool,
}

/// Tangency point `t0(chi)` of the concave majorant of `r0(., chi)`
///
/// `r0` is concave for `chi² ≤ 3`, in which case `t0 = 0`. Otherwise `t0`
/// solves `r0(0) - r0(t) + t r0'(t) = 0`; the left side is positive below the
/// root and negative above it.
pub fn tangency_point(chi: f64, config: &SolverConfig) -> Result<Tangency> {
    if !chi.is_finite() || chi < 0.0 {
        return Err(Error::InvalidParameter(format!(
            "Critical value {chi} must be finite and non-negative"
        )));
    }
    if chi * chi <= 3.0 {
        return Ok(Tangency {
            t0: 0.0,
            converged: true,
        });
    }

    let base = r0(0.0, chi);
    let gap = |t: f64| base - r0(t, chi) + t * r0_derivative(t, chi);

    let mut hi = chi * chi;
    let mut expansions = 0;
    while gap(hi) >= 0.0 {
        if expansions == config.max_bracket_expansions {
            warn!(chi, t0 = hi, "no upper bracket for the tangency point; using the last expansion");
            return Ok(Tangency {
                t0: hi,
                converged: false,
            });
        }
        hi *= 2.0;
        expansions += 1;
    }

    let mut lo = hi / 2.0;
    while gap(lo) < 0.0 {
        hi = lo;
        lo /= 2.0;
        if lo < 1e-12 {
            return Ok(Tangency {
                t0: 0.0,
                converged: true,
            });
        }
    }

    let solution = solvers::find_root(gap, lo, hi, config)?;
    debug!("t0({:.6}) = {:.6} after {} iterations", chi, solution.x, solution.iterations);
    Ok(Tangency {
        t0: solution.x,
        converged: solution.converged,
    })
}

/// Distribution of `t` attaining the worst-case non-coverage
#[derive(Debug, Clone, PartialEq)]
pub struct LeastFavorable {
    /// Support points
    pub support: Vec<f64>,
    /// Probability of each support point
    pub probabilities: Vec<f64>,
}

impl LeastFavorable {
    fn point_mass(t: f64) -> Self {
        Self {
            support: vec![t],
            probabilities: vec![1.0],
        }
    }

    /// Mass `1 - p` at zero and `p` at `t`
    fn zero_and(t: f64, p: f64) -> Self {
        Self {
            support: vec![0.0, t],
            probabilities: vec![1.0 - p, p],
        }
    }

    /// `E t`
    pub fn mean(&self) -> f64 {
        self.support
            .iter()
            .zip(&self.probabilities)
            .map(|(t, p)| t * p)
            .sum()
    }

    /// `E t²`
    pub fn second_moment(&self) -> f64 {
        self.support
            .iter()
            .zip(&self.probabilities)
            .map(|(t, p)| t * t * p)
            .sum()
    }

    /// `E r0(t, chi)` under this distribution
    pub fn expected_noncoverage(&self, chi: f64) -> f64 {
        self.support
            .iter()
            .zip(&self.probabilities)
            .map(|(&t, p)| p * r0(t, chi))
            .sum()
    }
}

/// Worst-case non-coverage and the distribution attaining it
#[derive(Debug, Clone, PartialEq)]
pub struct WorstCase {
    /// Largest non-coverage probability under the moment constraints
    pub value: f64,
    /// Least-favourable distribution of `t`
    pub distribution: LeastFavorable,
    /// Tangency point used for `chi`
    pub t0: f64,
    /// False when the tangency solve stopped at its iteration cap
    pub converged: bool,
}

/// Worst-case non-coverage `rho(m, kappa, chi)`
///
/// # Arguments
/// * `m` - Mean of the squared normalized bias
/// * `kappa` - Optional bound on `E t² / m²`; values below one are raised
///   to one
/// * `chi` - Normalized half-length of the interval
pub fn rho(m: f64, kappa: Option<f64>, chi: f64, config: &SolverConfig) -> Result<WorstCase> {
    if !m.is_finite() {
        return Err(Error::InvalidParameter(format!(
            "Bias bound {m} must be finite"
        )));
    }

    if m <= 0.0 {
        return Ok(WorstCase {
            value: r0(0.0, chi),
            distribution: LeastFavorable::point_mass(0.0),
            t0: 0.0,
            converged: true,
        });
    }

    let Tangency { t0, converged } = tangency_point(chi, config)?;

    let (value, distribution) = if m >= t0 {
        (r0(m, chi), LeastFavorable::point_mass(m))
    } else {
        match kappa {
            Some(k) if k * m < t0 => {
                let k = k.max(1.0);
                let value = (1.0 - 1.0 / k) * r0(0.0, chi) + r0(k * m, chi) / k;
                (value, LeastFavorable::zero_and(k * m, 1.0 / k))
            }
            _ => {
                let base = r0(0.0, chi);
                let value = base + (m / t0) * (r0(t0, chi) - base);
                (value, LeastFavorable::zero_and(t0, m / t0))
            }
        }
    };

    Ok(WorstCase {
        value,
        distribution,
        t0,
        converged,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const Z95: f64 = 1.959963984540054;

    #[test]
    fn test_noncoverage_at_zero_bias() {
        assert_relative_eq!(noncoverage(0.0, Z95), 0.05, epsilon = 1e-12);
        assert_relative_eq!(r0(0.0, Z95), 0.05, epsilon = 1e-12);
        // Symmetric in the bias
        assert_relative_eq!(noncoverage(1.3, 2.0), noncoverage(-1.3, 2.0), epsilon = 1e-15);
    }

    #[test]
    fn test_derivative_matches_finite_difference() {
        let h = 1e-6;
        for &chi in &[1.0, Z95, 3.0, 6.0] {
            for &t in &[0.01, 0.5, 2.0, 10.0, 40.0] {
                let numeric = (r0(t + h, chi) - r0(t - h, chi)) / (2.0 * h);
                assert_relative_eq!(r0_derivative(t, chi), numeric, max_relative = 1e-5);
            }
        }
    }

    #[test]
    fn test_derivative_branches_agree() {
        // chi * sqrt(t) = 20 sits on the switch between the two formulas
        let chi = 4.0;
        let t: f64 = 25.0;
        let s = t.sqrt();
        let direct = normal::pdf(chi) * (-0.5 * t).exp() * (chi * s).sinh() / s;
        let densities = (normal::pdf(s - chi) - normal::pdf(s + chi)) / (2.0 * s);
        assert_relative_eq!(direct, densities, max_relative = 1e-10);
        assert_relative_eq!(r0_derivative(0.0, chi), chi * normal::pdf(chi), epsilon = 1e-15);
    }

    #[test]
    fn test_tangency_zero_when_concave() {
        let config = SolverConfig::default();
        assert_eq!(tangency_point(1.5, &config).unwrap().t0, 0.0);
        assert_eq!(tangency_point(3f64.sqrt(), &config).unwrap().t0, 0.0);
        assert!(tangency_point(f64::NAN, &config).is_err());
    }

    #[test]
    fn test_tangency_bracket_cap_is_flagged() {
        let capped = SolverConfig {
            max_bracket_expansions: 0,
            ..SolverConfig::default()
        };
        // For chi = 8 the tangency point lies between chi² and 2 chi²
        let short = tangency_point(8.0, &capped).unwrap();
        assert!(!short.converged);
        assert_eq!(short.t0, 64.0);

        let exact = tangency_point(8.0, &SolverConfig::default()).unwrap();
        assert!(exact.converged);
        assert!(exact.t0 > 64.0 && exact.t0 < 128.0);

        // The flag propagates instead of failing the worst-case evaluation
        let wc = rho(1.0, None, 8.0, &capped).unwrap();
        assert!(!wc.converged);
        assert!(wc.value.is_finite());
    }

    #[test]
    fn test_tangency_condition() {
        let config = SolverConfig::default();
        for &chi in &[Z95, 2.5, 4.0, 8.0] {
            let Tangency { t0, converged } = tangency_point(chi, &config).unwrap();
            assert!(converged);
            assert!(t0 > 0.0);
            let lhs = r0(t0, chi) - r0(0.0, chi);
            assert_relative_eq!(lhs, t0 * r0_derivative(t0, chi), epsilon = 1e-10);
        }
    }

    #[test]
    fn test_rho_zero_bias() {
        let config = SolverConfig::default();
        let wc = rho(0.0, None, Z95, &config).unwrap();
        assert_relative_eq!(wc.value, 0.05, epsilon = 1e-12);
        assert_eq!(wc.distribution.support, vec![0.0]);
    }

    #[test]
    fn test_rho_regimes() {
        let config = SolverConfig::default();
        let chi = 2.5;
        let t0 = tangency_point(chi, &config).unwrap().t0;

        // Above t0 the point mass at m is least favourable
        let above = rho(2.0 * t0, None, chi, &config).unwrap();
        assert_relative_eq!(above.value, r0(2.0 * t0, chi), epsilon = 1e-15);

        // Below t0 without a kurtosis bound: mass at {0, t0}
        let m = 0.25 * t0;
        let free = rho(m, None, chi, &config).unwrap();
        assert_eq!(free.distribution.support, vec![0.0, t0]);
        assert_relative_eq!(free.distribution.mean(), m, epsilon = 1e-12);
        assert_relative_eq!(free.value, free.distribution.expected_noncoverage(chi), epsilon = 1e-14);

        // A loose kurtosis bound does not bind
        let loose = rho(m, Some(10.0), chi, &config).unwrap();
        assert_relative_eq!(loose.value, free.value, epsilon = 1e-15);

        // A tight one does and lowers the worst case
        let tight = rho(m, Some(2.0), chi, &config).unwrap();
        assert!(tight.value < free.value);
        assert_relative_eq!(tight.distribution.mean(), m, epsilon = 1e-12);
        assert_relative_eq!(tight.distribution.second_moment(), 2.0 * m * m, epsilon = 1e-12);

        // kappa = 1 forces a point mass at m
        let degenerate = rho(m, Some(0.5), chi, &config).unwrap();
        assert_relative_eq!(degenerate.value, r0(m, chi), epsilon = 1e-14);
    }

    #[test]
    fn test_rho_is_continuous_in_kappa() {
        let config = SolverConfig::default();
        let chi = 3.0;
        let t0 = tangency_point(chi, &config).unwrap().t0;
        let m = 0.2 * t0;
        let at_boundary = rho(m, Some(t0 / m - 1e-9), chi, &config).unwrap();
        let unbounded = rho(m, None, chi, &config).unwrap();
        assert_relative_eq!(at_boundary.value, unbounded.value, epsilon = 1e-9);
    }

    #[test]
    fn test_kappa_bound() {
        assert_eq!(kappa_bound(3.0, true), Some(3.0));
        assert_eq!(kappa_bound(3.0, false), None);
        assert_eq!(kappa_bound(f64::INFINITY, true), None);
        assert_eq!(kappa_bound(f64::NAN, true), None);
    }
}
