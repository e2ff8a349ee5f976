use solver::SolverError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LiftError {
    /// The oracle returned a partition over a different node set.
    #[error("Lifting error: partition covers {found} {what}, expected {expected}")]
    PartitionSize {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    /// A row class mixes inequality and equality rows.
    #[error("Lifting error: row class {0} mixes inequality and equality rows")]
    MixedRowClass(usize),
    #[error("Lifting error: oracle failed: {0}")]
    Oracle(String),
}

impl From<LiftError> for SolverError {
    fn from(e: LiftError) -> Self {
        SolverError::Preprocess(e.to_string())
    }
}
