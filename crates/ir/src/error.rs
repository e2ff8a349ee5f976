use thiserror::Error;

/// Errors raised while building, parsing, normalizing or evaluating expressions.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IrError {
    #[error("IR error: predicate '{name}' expects {expected} argument(s), got {found}")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("IR error: invalid predicate template '{0}': {1}")]
    InvalidTemplate(String, String),
    #[error("IR error: non-linear term: {0}")]
    NonLinear(String),
    #[error("IR error: unbound symbol '{0}'")]
    UnboundSymbol(String),
    #[error("IR error: symbol '{0}' is bound to a non-numeric value")]
    NonNumeric(String),
    #[error("IR error: undefined value for '{0}'")]
    Undefined(String),
    #[error("IR error: boolean predicate '{0}' used in a numeric expression")]
    BooleanInExpression(String),
    #[error("IR error: could not resolve '{0}'")]
    Resolution(String),
    #[error("Parser error: {0}")]
    Parse(String),
}
