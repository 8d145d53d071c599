//! Scalar root finding and bounded minimisation
//!
//! Thin wrappers around `argmin`'s Brent solvers. Both return the best
//! iterate together with a convergence flag instead of failing when the
//! iteration cap is hit, so callers can keep going and report the condition.

use crate::{config::SolverConfig, Error, Result};
use argmin::core::{CostFunction, Executor, State, TerminationReason, TerminationStatus};
use argmin::solver::brent::{BrentOpt, BrentRoot};
use tracing::{debug, warn};

/// Outcome of a scalar solve
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalarSolution {
    /// Root, or minimiser, found
    pub x: f64,
    /// Function value at `x`
    pub fx: f64,
    /// Iterations performed by the solver
    pub iterations: u64,
    /// False when the iteration cap was reached first
    pub converged: bool,
}

impl ScalarSolution {
    fn exact(x: f64, fx: f64) -> Self {
        Self {
            x,
            fx,
            iterations: 0,
            converged: true,
        }
    }
}

/// Exposes a closure as an `argmin` cost function.
struct ScalarProblem<F> {
    f: F,
}

impl<F> CostFunction for ScalarProblem<F>
where
    F: Fn(f64) -> f64,
{
    type Param = f64;
    type Output = f64;

    fn cost(&self, x: &Self::Param) -> std::result::Result<Self::Output, argmin::core::Error> {
        Ok((self.f)(*x))
    }
}

fn hit_iteration_cap(status: &TerminationStatus) -> bool {
    matches!(
        status,
        TerminationStatus::Terminated(TerminationReason::MaxItersReached)
    )
}

fn report(kind: &str, solution: &ScalarSolution, lo: f64, hi: f64) {
    if solution.converged {
        debug!(
            iterations = solution.iterations,
            x = solution.x,
            "{kind} converged on [{lo}, {hi}]"
        );
    } else {
        warn!(
            iterations = solution.iterations,
            x = solution.x,
            fx = solution.fx,
            "{kind} stopped at the iteration cap on [{lo}, {hi}]"
        );
    }
}

/// Find a root of `f` inside `[lo, hi]`
///
/// `f(lo)` and `f(hi)` must not have the same strict sign.
pub fn find_root<F>(f: F, lo: f64, hi: f64, config: &SolverConfig) -> Result<ScalarSolution>
where
    F: Fn(f64) -> f64,
{
    let (f_lo, f_hi) = (f(lo), f(hi));
    if !(f_lo.is_finite() && f_hi.is_finite()) {
        return Err(Error::Computation(format!(
            "Non-finite function value at bracket [{lo}, {hi}]"
        )));
    }
    if f_lo == 0.0 {
        return Ok(ScalarSolution::exact(lo, 0.0));
    }
    if f_hi == 0.0 {
        return Ok(ScalarSolution::exact(hi, 0.0));
    }
    if f_lo.signum() == f_hi.signum() {
        return Err(Error::Computation(format!(
            "Bracket [{lo}, {hi}] does not contain a sign change ({f_lo}, {f_hi})"
        )));
    }

    let solver = BrentRoot::new(lo, hi, config.root_tolerance);
    let result = Executor::new(ScalarProblem { f: &f }, solver)
        .configure(|state| {
            state
                .param(0.5 * (lo + hi))
                .max_iters(config.max_root_iterations)
        })
        .run()?;

    // "Best" in argmin means lowest cost, which for a root is not the
    // smallest residual, so compare both candidates on |f|.
    let state = result.state();
    let (x, fx) = [state.get_param(), state.get_best_param()]
        .into_iter()
        .flatten()
        .map(|&x| (x, f(x)))
        .min_by(|a, b| a.1.abs().total_cmp(&b.1.abs()))
        .ok_or_else(|| Error::Computation("Root finder returned no iterate".to_string()))?;

    let solution = ScalarSolution {
        x,
        fx,
        iterations: state.get_iter(),
        converged: !hit_iteration_cap(state.get_termination_status()),
    };
    report("root finder", &solution, lo, hi);
    Ok(solution)
}

/// Minimise `f` over `[lo, hi]`
pub fn minimize_bounded<F>(f: F, lo: f64, hi: f64, config: &SolverConfig) -> Result<ScalarSolution>
where
    F: Fn(f64) -> f64,
{
    if !(lo < hi) {
        return Err(Error::InvalidParameter(format!(
            "Minimisation interval [{lo}, {hi}] is empty"
        )));
    }

    let solver = BrentOpt::new(lo, hi)
        .set_tolerance(config.minimize_rel_tolerance, config.minimize_abs_tolerance);
    let result = Executor::new(ScalarProblem { f: &f }, solver)
        .configure(|state| state.max_iters(config.max_minimize_iterations))
        .run()?;

    let state = result.state();
    let x = state
        .get_best_param()
        .or_else(|| state.get_param())
        .copied()
        .ok_or_else(|| Error::Computation("Minimiser returned no iterate".to_string()))?;

    let solution = ScalarSolution {
        x,
        fx: f(x),
        iterations: state.get_iter(),
        converged: !hit_iteration_cap(state.get_termination_status()),
    };
    report("minimiser", &solution, lo, hi);
    Ok(solution)
}
