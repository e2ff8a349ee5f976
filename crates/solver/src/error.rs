use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    /// A vector or matrix disagrees with the column or row count.
    #[error("Solver error: {what} has size {found}, expected {expected}")]
    Dimension {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("Solver error: {0} contains a non-finite value")]
    NonFinite(&'static str),
    #[error("Solver error: iteration limit of {0} reached")]
    IterationLimit(usize),
    /// A transformation applied before solving failed.
    #[error("Solver error: preprocessing failed: {0}")]
    Preprocess(String),
}
