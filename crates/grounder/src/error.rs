use ir::IrError;
use logkb::KbError;
use thiserror::Error;

/// Errors of one grounding pass; the whole artifact is discarded on error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GroundError {
    /// A coefficient or fact did not resolve to exactly one scalar.
    #[error("Grounding error: cannot resolve {0}")]
    Resolution(String),
    #[error("Grounding error: fact '{0}' is undefined")]
    UndefinedFact(String),
    #[error("Grounding error: '{0}' is not a declared decision variable")]
    UndeclaredDecision(String),
    /// A row without decision variables that can never hold.
    #[error("Grounding error: constraint '{0}' is infeasible")]
    Infeasible(String),
    #[error("Grounding error: malformed model: {0}")]
    Structural(String),
    #[error(transparent)]
    Ir(IrError),
    #[error(transparent)]
    Kb(#[from] KbError),
}

impl GroundError {
    /// Whether this error reports a product of decision variables.
    #[must_use]
    pub fn is_non_linear(&self) -> bool {
        matches!(self, Self::Ir(IrError::NonLinear(_)))
    }
}

impl From<IrError> for GroundError {
    fn from(e: IrError) -> Self {
        match e {
            IrError::ArityMismatch { .. } | IrError::BooleanInExpression(_) => {
                Self::Structural(e.to_string())
            }
            other => Self::Ir(other),
        }
    }
}
