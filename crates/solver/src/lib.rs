//! The LP solver contract.
//!
//! A solver minimizes `cᵀx` subject to `Gx ≤ h` and `Ax = b` with `x` free.
//! [`DenseSimplex`] is a small reference implementation; production solvers
//! plug in behind [`LpSolver`].

pub mod error;
pub mod simplex;

pub use error::SolverError;
pub use simplex::DenseSimplex;

use grounder::LpArtifact;
use std::fmt;

/// Tuning knobs shared by solver implementations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverOptions {
    pub max_iterations: usize,
    /// Pivot and feasibility tolerance.
    pub tolerance: f64,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            max_iterations: 10_000,
            tolerance: 1e-9,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LpOutcome {
    Optimal { x: Vec<f64>, objective: f64 },
    Infeasible,
    Unbounded,
}

impl LpOutcome {
    #[must_use]
    pub fn status(&self) -> SolveStatus {
        match self {
            Self::Optimal { .. } => SolveStatus::Optimal,
            Self::Infeasible => SolveStatus::Infeasible,
            Self::Unbounded => SolveStatus::Unbounded,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SolveStatus {
    #[default]
    Unsolved,
    Optimal,
    Infeasible,
    Unbounded,
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Unsolved => "unsolved",
            Self::Optimal => "optimal",
            Self::Infeasible => "infeasible",
            Self::Unbounded => "unbounded",
        };
        write!(f, "{s}")
    }
}

/// An LP backend.
pub trait LpSolver {
    /// Solves `lp`; the minimized objective is reported in `lp`'s sense.
    fn solve(&mut self, lp: &LpArtifact) -> Result<LpOutcome, SolverError>;

    /// Status of the last call to [`LpSolver::solve`].
    fn status(&self) -> SolveStatus;
}

impl<S: LpSolver + ?Sized> LpSolver for Box<S> {
    fn solve(&mut self, lp: &LpArtifact) -> Result<LpOutcome, SolverError> {
        (**self).solve(lp)
    }

    fn status(&self) -> SolveStatus {
        (**self).status()
    }
}

/// Checks that every vector and matrix of `lp` agrees on its dimensions.
pub fn validate(lp: &LpArtifact) -> Result<(), SolverError> {
    let n = lp.num_columns();
    let checks = [
        ("G column count", n, lp.g.cols()),
        ("A column count", n, lp.a.cols()),
        ("h", lp.g.rows(), lp.h.len()),
        ("b", lp.a.rows(), lp.b.len()),
    ];
    for (what, expected, found) in checks {
        if expected != found {
            return Err(SolverError::Dimension {
                what,
                expected,
                found,
            });
        }
    }
    let finite = |v: &[f64]| v.iter().all(|x| x.is_finite());
    if !finite(&lp.c) {
        return Err(SolverError::NonFinite("c"));
    }
    if !finite(&lp.h) {
        return Err(SolverError::NonFinite("h"));
    }
    if !finite(&lp.b) {
        return Err(SolverError::NonFinite("b"));
    }
    if !lp.g.iter().chain(lp.a.iter()).all(|(_, _, v)| v.is_finite()) {
        return Err(SolverError::NonFinite("G/A"));
    }
    Ok(())
}
