use grounder::GroundError;
use ir::IrError;
use logkb::KbError;
use solver::SolverError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RlpError {
    #[error("Problem error: the objective is already set")]
    ObjectiveAlreadySet,
    #[error("Problem error: '{0}' is not a decision predicate")]
    NotDecision(String),
    #[error("Problem error: decision predicate '{0}' is already declared")]
    DuplicateDecision(String),
    #[error(transparent)]
    Model(#[from] IrError),
    #[error(transparent)]
    Kb(#[from] KbError),
    #[error(transparent)]
    Ground(#[from] GroundError),
    #[error(transparent)]
    Solver(#[from] SolverError),
}

impl RlpError {
    /// Whether grounding rejected a product of decision variables.
    #[must_use]
    pub fn is_non_linear(&self) -> bool {
        matches!(self, Self::Ground(e) if e.is_non_linear())
    }
}
