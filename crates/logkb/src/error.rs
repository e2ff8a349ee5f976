use ir::IrError;
use thiserror::Error;

/// Knowledge base failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KbError {
    #[error("KB error: {count} facts match '{atom}', expected at most one")]
    Inconsistent { atom: String, count: usize },
    #[error("KB error: fact lookup needs a ground atom, got '{0}'")]
    NotGround(String),
    #[error("KB error: fact '{0}' has a non-numeric value")]
    NonNumeric(String),
    #[error("KB error: variables of '{0}' are not bound by a positive atom")]
    Unsafe(String),
    #[error("KB error: selector '{0}' does not occur in the query")]
    UnboundSelector(String),
    #[error("KB error: backend failure: {0}")]
    Backend(String),
    #[error(transparent)]
    Expression(#[from] IrError),
}
