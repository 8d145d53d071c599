//! Validated input data

use ebci_core::{Error, Result};
use nalgebra::DMatrix;

/// Noisy measurements with known standard deviations
///
/// Construction validates everything once: equal lengths, finite outcomes,
/// strictly positive finite `sigma`, non-negative weights with at least one
/// positive, and a regressor matrix with one row per observation.
///
/// # Example
///
/// ```rust
/// use robust_ebci::{DMatrix, Observations};
///
/// let obs = Observations::new(vec![1.0, 2.0, 3.0], vec![0.5, 0.5, 1.0])
///     .unwrap()
///     .with_weights(vec![1.0, 2.0, 1.0])
///     .unwrap()
///     .with_regressors(DMatrix::from_element(3, 1, 1.0))
///     .unwrap();
/// assert_eq!(obs.len(), 3);
/// assert_eq!(obs.num_regressors(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Observations {
    y: Vec<f64>,
    sigma: Vec<f64>,
    weights: Vec<f64>,
    x: DMatrix<f64>,
}

impl Observations {
    /// Outcomes `y` with standard deviations `sigma`, unit weights and no
    /// regressors
    pub fn new(y: Vec<f64>, sigma: Vec<f64>) -> Result<Self> {
        let n = y.len();
        if n == 0 {
            return Err(Error::InsufficientData {
                expected: 1,
                actual: 0,
            });
        }
        if sigma.len() != n {
            return Err(Error::size_mismatch(n, sigma.len(), "sigma"));
        }
        if y.iter().any(|v| !v.is_finite()) {
            return Err(Error::non_finite("y"));
        }
        if let Some(s) = sigma.iter().find(|s| !(s.is_finite() && **s > 0.0)) {
            return Err(Error::InvalidInput(format!(
                "sigma must be strictly positive and finite, got {s}"
            )));
        }

        Ok(Self {
            y,
            sigma,
            weights: vec![1.0; n],
            x: DMatrix::zeros(n, 0),
        })
    }

    /// Replace the unit weights
    pub fn with_weights(mut self, weights: Vec<f64>) -> Result<Self> {
        if weights.len() != self.len() {
            return Err(Error::size_mismatch(self.len(), weights.len(), "weights"));
        }
        if weights.iter().any(|w| !(w.is_finite() && *w >= 0.0)) {
            return Err(Error::InvalidInput(
                "weights must be finite and non-negative".to_string(),
            ));
        }
        if !weights.iter().any(|&w| w > 0.0) {
            return Err(Error::InvalidInput(
                "at least one weight must be positive".to_string(),
            ));
        }
        self.weights = weights;
        Ok(self)
    }

    /// Set the regressors determining the prior mean
    ///
    /// A matrix with no columns means shrinking toward zero.
    pub fn with_regressors(mut self, x: DMatrix<f64>) -> Result<Self> {
        if x.ncols() == 0 {
            self.x = DMatrix::zeros(self.len(), 0);
            return Ok(self);
        }
        if x.nrows() != self.len() {
            return Err(Error::size_mismatch(self.len(), x.nrows(), "regressor rows"));
        }
        if x.iter().any(|v| !v.is_finite()) {
            return Err(Error::non_finite("regressors"));
        }
        self.x = x;
        Ok(self)
    }

    /// Shrink toward a common weighted mean
    pub fn with_intercept(self) -> Result<Self> {
        let n = self.len();
        self.with_regressors(DMatrix::from_element(n, 1, 1.0))
    }

    /// Number of observations
    pub fn len(&self) -> usize {
        self.y.len()
    }

    /// Always false; construction rejects empty input
    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn sigma(&self) -> &[f64] {
        &self.sigma
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn regressors(&self) -> &DMatrix<f64> {
        &self.x
    }

    pub fn num_regressors(&self) -> usize {
        self.x.ncols()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let obs = Observations::new(vec![1.0, 2.0], vec![1.0, 2.0]).unwrap();
        assert_eq!(obs.weights(), &[1.0, 1.0]);
        assert_eq!(obs.num_regressors(), 0);
        assert_eq!(obs.regressors().nrows(), 2);
        assert!(!obs.is_empty());
    }

    #[test]
    fn test_rejects_bad_sigma() {
        assert!(Observations::new(vec![1.0], vec![0.0]).is_err());
        assert!(Observations::new(vec![1.0], vec![-1.0]).is_err());
        assert!(Observations::new(vec![1.0], vec![f64::INFINITY]).is_err());
        assert!(Observations::new(vec![1.0, 2.0], vec![1.0]).is_err());
        assert!(matches!(
            Observations::new(vec![], vec![]),
            Err(Error::InsufficientData {
                expected: 1,
                actual: 0
            })
        ));
        assert!(Observations::new(vec![f64::NAN], vec![1.0]).is_err());
    }

    #[test]
    fn test_rejects_bad_weights() {
        let obs = Observations::new(vec![1.0, 2.0], vec![1.0, 1.0]).unwrap();
        assert!(obs.clone().with_weights(vec![1.0]).is_err());
        assert!(obs.clone().with_weights(vec![1.0, -1.0]).is_err());
        assert!(obs.clone().with_weights(vec![0.0, 0.0]).is_err());
        assert!(obs.with_weights(vec![0.0, 3.0]).is_ok());
    }

    #[test]
    fn test_regressors() {
        let obs = Observations::new(vec![1.0, 2.0, 3.0], vec![1.0; 3]).unwrap();
        assert!(obs.clone().with_regressors(DMatrix::zeros(2, 1)).is_err());
        assert!(obs.clone().with_regressors(DMatrix::zeros(0, 0)).is_ok());

        let with_intercept = obs.with_intercept().unwrap();
        assert_eq!(with_intercept.num_regressors(), 1);
    }
}
