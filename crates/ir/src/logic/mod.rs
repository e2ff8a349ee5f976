//! Logical layer: predicate templates, atoms, formulas and queries.
//!
//! Formulas are plain trees built with constructor functions; the grounders
//! only ever consume them through [`Formula::to_dnf`].

pub mod atom;
pub mod binding;
pub mod comparison;
pub mod formula;
pub mod predicate;
pub mod query;

pub use atom::{Atom, Term};
pub use binding::{Binding, Renaming};
pub use comparison::{CompareOp, Comparison};
pub use formula::{Dnf, Formula, Literal};
pub use predicate::{PredicateKind, PredicateTemplate};
pub use query::Query;
