//! Mathematical utilities for empirical-Bayes confidence intervals
//!
//! Normal-distribution helpers shared by the moment estimator and the
//! critical value solver.

/// Distribution-related mathematical functions
pub mod distributions {
    /// Standard normal distribution utilities
    pub mod normal {
        use crate::{Error, Result};
        use statrs::distribution::{ContinuousCDF, Normal};
        use statrs::function::erf::erfc;
        use std::f64::consts::{PI, SQRT_2};

        /// CDF of the standard normal distribution
        ///
        /// Evaluated through `erfc` so both tails keep full relative accuracy.
        pub fn cdf(x: f64) -> f64 {
            0.5 * erfc(-x / SQRT_2)
        }

        /// Upper tail probability `1 - cdf(x)`
        pub fn sf(x: f64) -> f64 {
            0.5 * erfc(x / SQRT_2)
        }

        /// Density of the standard normal distribution
        pub fn pdf(x: f64) -> f64 {
            (-0.5 * x * x).exp() / (2.0 * PI).sqrt()
        }

        /// Quantile function of the standard normal distribution
        pub fn quantile(p: f64) -> Result<f64> {
            if !(p > 0.0 && p < 1.0) {
                return Err(Error::InvalidParameter(format!(
                    "Probability {p} must be in (0, 1)"
                )));
            }
            let normal = Normal::new(0.0, 1.0).map_err(|e| {
                Error::Computation(format!("Failed to create normal distribution: {}", e))
            })?;
            Ok(normal.inverse_cdf(p))
        }

        /// Two-sided critical value `z_{1 - alpha/2}`
        pub fn two_sided_critical_value(alpha: f64) -> Result<f64> {
            crate::error::check_alpha(alpha)?;
            quantile(1.0 - alpha / 2.0)
        }

        /// Inverse Mills ratio `pdf(x) / cdf(x)`
        ///
        /// Uses the asymptotic expansion deep in the lower tail where both
        /// terms underflow.
        pub fn inverse_mills(x: f64) -> f64 {
            if x < -35.0 {
                let x2 = x * x;
                return -x / (1.0 - 1.0 / x2 + 3.0 / (x2 * x2));
            }
            pdf(x) / cdf(x)
        }

        #[cfg(test)]
        mod tests {
            use super::*;
            use approx::assert_relative_eq;

            #[test]
            fn test_normal_cdf() {
                assert_relative_eq!(cdf(0.0), 0.5, epsilon = 1e-15);
                assert!((cdf(-1.959963984540054) - 0.025).abs() < 1e-12);
                assert!((cdf(1.959963984540054) - 0.975).abs() < 1e-12);
                assert_relative_eq!(sf(1.0), cdf(-1.0), max_relative = 1e-14);
            }

            #[test]
            fn test_lower_tail_is_accurate() {
                // 1 - cdf(10) would round to zero
                assert!(sf(10.0) > 0.0);
                assert_relative_eq!(sf(10.0), 7.619853024160527e-24, max_relative = 1e-10);
            }

            #[test]
            fn test_critical_value() {
                let z = two_sided_critical_value(0.05).unwrap();
                assert_relative_eq!(z, 1.959963984540054, epsilon = 1e-9);
                assert!(two_sided_critical_value(0.0).is_err());
                assert!(quantile(1.0).is_err());
            }

            #[test]
            fn test_cdf_quantile_inverse() {
                for &p in &[0.01, 0.05, 0.1, 0.25, 0.5, 0.75, 0.9, 0.95, 0.99] {
                    let x = quantile(p).unwrap();
                    assert!((cdf(x) - p).abs() < 1e-9, "Failed for p={p}");
                }
            }

            #[test]
            fn test_inverse_mills_continuity() {
                let below = inverse_mills(-35.0 - 1e-9);
                let above = inverse_mills(-35.0 + 1e-9);
                assert_relative_eq!(below, above, max_relative = 1e-6);
                assert_relative_eq!(inverse_mills(0.0), 2.0 * pdf(0.0), max_relative = 1e-14);
            }
        }
    }
}

#[cfg(test)]
mod property_tests {
    use super::distributions::normal::{cdf, inverse_mills, sf};
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_cdf_and_sf_sum_to_one(x in -8.0f64..8.0) {
            prop_assert!((cdf(x) + sf(x) - 1.0).abs() < 1e-14);
        }

        // Mean of a standard normal truncated to [-x, inf) is positive
        #[test]
        fn prop_truncated_mean_is_positive(x in -200.0f64..30.0) {
            let lambda = inverse_mills(x);
            prop_assert!(lambda > 0.0);
            prop_assert!(x + lambda > 0.0);
        }
    }
}
