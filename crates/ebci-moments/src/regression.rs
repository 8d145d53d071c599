//! Weighted least-squares fit of the shrinkage direction
//!
//! The prior mean of each signal is modelled as `X_i' delta`. The direction
//! `delta` is the weighted least-squares coefficient of `Y` on `X`, computed
//! from an SVD of the weight-scaled design so that collinear regressors yield
//! the minimum-norm solution instead of an error.

use ebci_core::{Error, Result, SolverConfig};
use nalgebra::{DMatrix, DVector};
use tracing::{debug, warn};

/// Fitted shrinkage direction and the implied prior means
#[derive(Debug, Clone, PartialEq)]
pub struct ShrinkageDirection {
    /// Regression coefficients, one per column of the design
    pub delta: Vec<f64>,
    /// Fitted prior means `X_i' delta`, one per observation
    pub mu1: Vec<f64>,
    /// Numerical rank of the weighted design
    pub rank: usize,
    /// True when the weighted design has fewer independent columns than
    /// regressors
    pub rank_deficient: bool,
}

impl ShrinkageDirection {
    /// Residuals `y_i - mu1_i`
    pub fn residuals(&self, y: &[f64]) -> Vec<f64> {
        y.iter().zip(&self.mu1).map(|(y, m)| y - m).collect()
    }

    fn zero(n: usize, k: usize, rank_deficient: bool) -> Self {
        Self {
            delta: vec![0.0; k],
            mu1: vec![0.0; n],
            rank: 0,
            rank_deficient,
        }
    }
}

/// Regress `y` on the columns of `x` with weights `weights`
///
/// Observations with zero weight do not enter the fit but still receive a
/// fitted value. A design with no columns yields an empty `delta` and
/// `mu1 = 0`.
pub fn fit_shrinkage_direction(
    y: &[f64],
    x: &DMatrix<f64>,
    weights: &[f64],
    config: &SolverConfig,
) -> Result<ShrinkageDirection> {
    let n = y.len();
    let k = x.ncols();

    if weights.len() != n {
        return Err(Error::size_mismatch(n, weights.len(), "weights"));
    }
    if k == 0 {
        return Ok(ShrinkageDirection::zero(n, 0, false));
    }
    if x.nrows() != n {
        return Err(Error::size_mismatch(n, x.nrows(), "regressor rows"));
    }

    let active: Vec<usize> = (0..n).filter(|&i| weights[i] > 0.0).collect();
    if active.is_empty() {
        return Err(Error::InvalidInput(
            "at least one weight must be positive".to_string(),
        ));
    }
    let m = active.len();

    let scaled_x = DMatrix::from_fn(m, k, |r, c| {
        let i = active[r];
        weights[i].sqrt() * x[(i, c)]
    });
    let scaled_y = DVector::from_iterator(m, active.iter().map(|&i| weights[i].sqrt() * y[i]));

    let svd = scaled_x.svd(true, true);
    let s_max = svd.singular_values.max();
    if !(s_max > 0.0) {
        warn!(regressors = k, "weighted design is identically zero");
        return Ok(ShrinkageDirection::zero(n, k, true));
    }

    let eps = s_max * m.max(k) as f64 * config.rank_tolerance;
    let rank = svd.rank(eps);
    let rank_deficient = rank < k;
    if rank_deficient {
        warn!(rank, regressors = k, "weighted design is rank deficient, using minimum-norm fit");
    }

    let delta = svd
        .solve(&scaled_y, eps)
        .map_err(|e| Error::Computation(format!("Least-squares solve failed: {e}")))?;
    let delta = delta.column(0).iter().copied().collect::<Vec<_>>();

    let coef = DVector::from_column_slice(&delta);
    let mu1 = (x * coef).iter().copied().collect::<Vec<_>>();

    debug!(observations = n, used = m, regressors = k, rank, "fitted shrinkage direction");

    Ok(ShrinkageDirection {
        delta,
        mu1,
        rank,
        rank_deficient,
    })
}
