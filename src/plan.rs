//! Selection of the interval construction path

use crate::options::ShrinkageMode;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which interval is computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExecutionPath {
    /// `mu2` is (numerically) zero: parametric weight, zero-length interval
    Degenerate,
    /// Normal-prior interval
    Parametric,
    /// Robust interval at the empirical-Bayes weight
    RobustMseOptimal,
    /// Robust interval at the length-minimising weight
    RobustLengthOptimal,
}

impl ExecutionPath {
    /// True for the two paths that run the robust solver
    pub fn is_robust(&self) -> bool {
        matches!(self, Self::RobustMseOptimal | Self::RobustLengthOptimal)
    }
}

impl fmt::Display for ExecutionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Degenerate => "degenerate",
            Self::Parametric => "parametric",
            Self::RobustMseOptimal => "robust (MSE-optimal)",
            Self::RobustLengthOptimal => "robust (length-optimal)",
        };
        f.write_str(name)
    }
}

/// How many solves are run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dispatch {
    /// One solve shared by every observation
    Broadcast,
    /// One independent solve per observation
    PerObservation,
}

/// Path and dispatch chosen for a call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExecutionPlan {
    pub path: ExecutionPath,
    pub dispatch: Dispatch,
}

impl ExecutionPlan {
    /// Decision table over the second moment and the caller's flags
    ///
    /// | `mu2 ≤ ε` | `parametric` | `length_optimal` | path |
    /// |-----------|--------------|------------------|------|
    /// | yes       | any          | any              | `Degenerate` |
    /// | no        | yes          | any              | `Parametric` |
    /// | no        | no           | no               | `RobustMseOptimal` |
    /// | no        | no           | yes              | `RobustLengthOptimal` |
    ///
    /// T-statistic shrinkage shares one ratio across observations and is
    /// dispatched as `Broadcast`; otherwise `PerObservation`.
    pub fn select(mu2: f64, parametric: bool, length_optimal: bool, mode: ShrinkageMode) -> Self {
        let path = if !(mu2 > f64::EPSILON) {
            ExecutionPath::Degenerate
        } else if parametric {
            ExecutionPath::Parametric
        } else if length_optimal {
            ExecutionPath::RobustLengthOptimal
        } else {
            ExecutionPath::RobustMseOptimal
        };

        let dispatch = match mode {
            ShrinkageMode::TStatistic => Dispatch::Broadcast,
            ShrinkageMode::MomentIndependence => Dispatch::PerObservation,
        };

        Self { path, dispatch }
    }
}

impl fmt::Display for ExecutionPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dispatch = match self.dispatch {
            Dispatch::Broadcast => "broadcast",
            Dispatch::PerObservation => "per observation",
        };
        write!(f, "{}, {}", self.path, dispatch)
    }
}
