//! End-to-end computation of empirical-Bayes confidence intervals

use crate::observations::Observations;
use crate::options::{EbciOptions, ShrinkageMode};
use crate::plan::{Dispatch, ExecutionPath, ExecutionPlan};
use crate::result::{Diagnostics, EbciResult};
use ebci_confidence::{
    kappa_bound, max_noncoverage, parametric_ebci_batch, robust_ebci, ConfidenceInterval,
    ParametricEbci,
};
use ebci_core::{error::check_alpha, normal, DynamicEngine, ExecutionEngine, Result};
use ebci_moments::{estimate_moments, fit_shrinkage_direction};
use tracing::{debug, info, instrument, warn};

/// Progress events go to `info` when the caller asked for verbose output
macro_rules! progress {
    ($verbose:expr, $($arg:tt)+) => {
        if $verbose {
            info!($($arg)+);
        } else {
            debug!($($arg)+);
        }
    };
}

/// Weight and half-length shared by one or more observations
#[derive(Debug, Clone, Copy)]
struct Solve {
    weight: f64,
    normlng: f64,
    max_noncoverage: Option<f64>,
    iterations: u64,
    converged: bool,
}

/// Compute point estimates and confidence intervals
///
/// Per-observation robust solves are dispatched according to
/// `options.execution`.
///
/// # Example
///
/// ```rust
/// use robust_ebci::{compute, EbciOptions, Observations};
///
/// let obs = Observations::new(vec![5.0, -5.0, 5.0, -5.0], vec![1.0; 4]).unwrap();
/// let result = compute(&obs, 0.05, &EbciOptions::default().parametric()).unwrap();
///
/// assert!((result.mu2 - 24.0).abs() < 1e-9);
/// assert!((result.w_estim[0] - 0.96).abs() < 1e-12);
/// ```
pub fn compute(observations: &Observations, alpha: f64, options: &EbciOptions) -> Result<EbciResult> {
    let engine = DynamicEngine::from_strategy(options.execution);
    compute_with_engine(observations, alpha, options, &engine)
}

/// Compute point estimates and confidence intervals on a given engine
#[instrument(skip_all, fields(n = observations.len(), alpha = alpha))]
pub fn compute_with_engine<E: ExecutionEngine>(
    observations: &Observations,
    alpha: f64,
    options: &EbciOptions,
    engine: &E,
) -> Result<EbciResult> {
    check_alpha(alpha)?;
    options.validate()?;

    let n = observations.len();
    let sigma = observations.sigma();
    let weights = observations.weights();
    let tstat = options.shrinkage == ShrinkageMode::TStatistic;

    let (y_norm, sigma_norm): (Vec<f64>, Vec<f64>) = if tstat {
        (
            observations.y().iter().zip(sigma).map(|(y, s)| y / s).collect(),
            vec![1.0; n],
        )
    } else {
        (observations.y().to_vec(), sigma.to_vec())
    };

    let direction = fit_shrinkage_direction(
        &y_norm,
        observations.regressors(),
        weights,
        &options.solver,
    )?;
    progress!(options.verbose, delta = ?direction.delta, rank = direction.rank, "fitted prior mean");

    let (mu2, kappa, moments_estimated) = match (options.mu2, options.kappa) {
        (Some(mu2), Some(kappa)) => (mu2, kappa, false),
        (mu2, kappa) => {
            let residuals = direction.residuals(&y_norm);
            let estimate = estimate_moments(&residuals, &sigma_norm, weights, options.correction)?;
            debug!(
                uncorrected_mu2 = estimate.uncorrected_mu2,
                uncorrected_mu4 = estimate.uncorrected_mu4,
                "raw moments"
            );
            (
                mu2.unwrap_or(estimate.mu2),
                kappa.unwrap_or(estimate.kappa),
                true,
            )
        }
    };
    progress!(options.verbose, mu2, kappa, correction = %options.correction, "signal moments");

    let plan = ExecutionPlan::select(mu2, options.parametric, options.length_optimal, options.shrinkage);

    // One ratio per solve: a single shared ratio for t-statistics
    let ratios: Vec<f64> = match plan.dispatch {
        Dispatch::Broadcast => vec![mu2],
        Dispatch::PerObservation => sigma_norm.iter().map(|s| mu2 / (s * s)).collect(),
    };
    let parametric = parametric_ebci_batch(&ratios, alpha)?;
    let kappa_used = kappa_bound(kappa, options.use_kappa_bound);
    progress!(options.verbose, %plan, solves = ratios.len(), "solving for weights and half-lengths");

    let solves = solve_all(plan.path, &ratios, &parametric, kappa_used, alpha, options, engine);

    let nonconverged = solves.iter().filter(|s| !s.converged).count();
    if nonconverged > 0 {
        warn!(nonconverged, "some solves did not converge; using best iterates or parametric fallbacks");
    }
    let solver_iterations: u64 = solves.iter().map(|s| s.iterations).sum();

    let unshrunk_normlng = normal::two_sided_critical_value(alpha)?;
    let at = |i: usize| match plan.dispatch {
        Dispatch::Broadcast => 0,
        Dispatch::PerObservation => i,
    };

    let mut result = EbciResult {
        thetahat: Vec::with_capacity(n),
        ci: Vec::with_capacity(n),
        w_estim: Vec::with_capacity(n),
        normlng: Vec::with_capacity(n),
        mu2,
        kappa,
        delta: direction.delta.clone(),
        prior_mean: Vec::with_capacity(n),
        w_eb: Vec::with_capacity(n),
        parametric_normlng: Vec::with_capacity(n),
        unshrunk_normlng,
        max_noncoverage: Vec::with_capacity(n),
        converged: Vec::with_capacity(n),
        alpha,
        diagnostics: Diagnostics {
            plan,
            rank: direction.rank,
            rank_deficient: direction.rank_deficient,
            moments_estimated,
            correction: options.correction,
            nonconverged,
            solver_iterations,
        },
    };

    for i in 0..n {
        let solve = &solves[at(i)];
        let param = &parametric[at(i)];
        let mu1 = direction.mu1[i];
        let scale = if tstat { sigma[i] } else { 1.0 };

        let thetahat = scale * (mu1 + solve.weight * (y_norm[i] - mu1));
        let half_length = solve.normlng * sigma[i];

        result.thetahat.push(thetahat);
        result
            .ci
            .push(ConfidenceInterval::symmetric(thetahat, half_length, 1.0 - alpha));
        result.w_estim.push(solve.weight);
        result.normlng.push(solve.normlng);
        result.prior_mean.push(scale * mu1);
        result.w_eb.push(param.weight);
        result.parametric_normlng.push(param.half_length);
        result.max_noncoverage.push(solve.max_noncoverage);
        result.converged.push(solve.converged);
    }

    progress!(options.verbose, "assembled {} intervals", n);
    Ok(result)
}

/// Run the chosen path once per ratio
///
/// A failed solve only affects its own entry: it falls back to the
/// parametric weight and half-length and is flagged as not converged.
fn solve_all<E: ExecutionEngine>(
    path: ExecutionPath,
    ratios: &[f64],
    parametric: &[ParametricEbci],
    kappa: Option<f64>,
    alpha: f64,
    options: &EbciOptions,
    engine: &E,
) -> Vec<Solve> {
    if path == ExecutionPath::Degenerate {
        return parametric
            .iter()
            .map(|p| Solve {
                weight: p.weight.clamp(0.0, 1.0),
                normlng: 0.0,
                max_noncoverage: None,
                iterations: 0,
                converged: true,
            })
            .collect();
    }

    debug!(
        strategy = ?engine.strategy(),
        threads = engine.num_threads(),
        solves = ratios.len(),
        "dispatching solves"
    );

    let config = &options.solver;
    let solve_one = |i: usize| -> Solve {
        let ratio = ratios[i];
        let param = parametric[i];
        let mut solve = Solve {
            weight: param.weight,
            normlng: param.half_length,
            max_noncoverage: None,
            iterations: 0,
            converged: true,
        };

        match max_noncoverage(ratio, kappa, alpha, config) {
            Ok(worst) => solve.max_noncoverage = worst,
            Err(e) => {
                warn!(index = i, ratio, error = %e, "worst-case non-coverage failed");
                solve.converged = false;
            }
        }

        let weight = match path {
            ExecutionPath::RobustMseOptimal => Some(param.weight),
            ExecutionPath::RobustLengthOptimal => None,
            _ => return solve,
        };
        match robust_ebci(weight, ratio, kappa, alpha, config) {
            Ok(robust) => {
                solve.weight = robust.weight;
                solve.normlng = robust.half_length;
                solve.iterations = robust.iterations;
                solve.converged &= robust.converged;
            }
            Err(e) => {
                warn!(
                    index = i,
                    ratio,
                    error = %e,
                    "robust solve failed; using the parametric interval"
                );
                solve.converged = false;
            }
        }
        solve
    };

    engine.execute_batch(ratios.len(), solve_one)
}
