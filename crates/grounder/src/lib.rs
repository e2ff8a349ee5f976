//! Grounding of relational LPs into sparse standard form.
//!
//! Two interchangeable strategies implement [`Grounder`]:
//!
//! - [`BlockGrounder`]: one bulk knowledge base query per summand
//! - [`RecursiveGrounder`]: one instance per answer, expanded by substitution
//!
//! Both create a fresh [`GroundingContext`] per call, so a grounder can be
//! shared freely; they agree on the optimum but may differ in row order.

pub mod artifact;
pub mod block;
pub mod coefficient;
pub mod context;
pub mod error;
pub mod recursive;

#[cfg(test)]
mod tests;

pub use artifact::{ColumnBlock, ColumnMap, LpArtifact, OrderedIndex, SparseMatrix};
pub use block::BlockGrounder;
pub use context::{GroundingContext, Row};
pub use error::GroundError;
pub use recursive::RecursiveGrounder;

use ir::Model;

/// The result of one grounding pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Grounded {
    pub artifact: LpArtifact,
    pub columns: ColumnMap,
}

/// A grounding strategy.
pub trait Grounder {
    /// Grounds `model` into a standard-form LP and its column map.
    fn ground(&self, model: &Model) -> Result<Grounded, GroundError>;

    /// Short strategy name for logs.
    fn name(&self) -> &'static str;
}

impl<G: Grounder + ?Sized> Grounder for Box<G> {
    fn ground(&self, model: &Model) -> Result<Grounded, GroundError> {
        (**self).ground(model)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}
