//! Relational linear programs.
//!
//! An [`RlpProblem`] is declared with decision predicates, an objective and
//! constraints over knowledge base queries, then grounded into a sparse LP
//! and solved. Grounding and solving are pluggable:
//!
//! - [`grounder::BlockGrounder`] or [`grounder::RecursiveGrounder`]
//! - any [`solver::LpSolver`], optionally wrapped in [`lifting::LiftedSolver`]
//!
//! # Example
//! ```
//! use grounder::BlockGrounder;
//! use logkb::FactBase;
//! use rlp::flow::{max_flow, NETWORK};
//! use solver::{DenseSimplex, SolveStatus};
//!
//! let mut kb = FactBase::new();
//! kb.load(NETWORK).unwrap();
//! let mut problem = max_flow(BlockGrounder::new(&kb), DenseSimplex::default(), "a", "g").unwrap();
//! assert_eq!(problem.solve().unwrap(), SolveStatus::Optimal);
//! assert!((problem.solution().unwrap().objective() - 130.0).abs() < 1e-6);
//! ```

pub mod error;
pub mod flow;
pub mod problem;

#[cfg(test)]
mod tests;

pub use error::RlpError;
pub use problem::{RlpProblem, Solution};
