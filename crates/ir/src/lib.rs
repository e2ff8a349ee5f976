//! Relational LP intermediate representation.
//!
//! Provides the typed building blocks of a relational linear program:
//! constants and sub-symbols, predicate templates and atoms, logical
//! formulas and queries, numeric expressions with relational sums, and the
//! normalizer that flattens them into linear summands.
//!
//! Formulas can also be written as text and parsed with [`parse_formula`]:
//!
//! ```rust
//! let f = ir::parse_formula("edge(X, Y) & ~source(X) | X <= 3").unwrap();
//! assert_eq!(f.to_string(), "(edge(X, Y) & ~source(X)) | X <= 3");
//! ```

pub mod error;
pub mod expr;
pub mod logic;
pub mod model;
pub mod normalize;
pub mod primitive;

#[cfg(test)]
mod tests;

// Re-export core types for convenient access
pub use error::IrError;
pub use expr::{Expr, Interpretation, RelationalSum};
pub use logic::{
    Atom, Binding, CompareOp, Comparison, Dnf, Formula, Literal, PredicateKind,
    PredicateTemplate, Query, Renaming, Term,
};
pub use model::{Constraint, Model, Relation, RelationKind, Sense};
pub use normalize::{normalize, summands, Factor, Summand};
pub use primitive::{sub_symbols, Constant, SubSymbol};

use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

/// Formula parser, powered by Pest.
#[derive(Parser)]
#[grammar = "grammar.pest"]
pub struct FormulaParser;

/// Trait for converting Pest parse trees into IR types.
pub trait Lexeme {
    /// Converts a Pest parse rule into a structured IR type.
    fn from_parsed_rule(parsed_rule: Pair<Rule>) -> Self;
}

/// Parses a textual formula. Every parsed atom is boolean.
pub fn parse_formula(text: &str) -> Result<Formula, IrError> {
    let mut pairs =
        FormulaParser::parse(Rule::formula, text).map_err(|e| IrError::Parse(e.to_string()))?;
    let top = pairs
        .next()
        .ok_or_else(|| IrError::Parse(format!("empty formula: '{text}'")))?;
    Ok(Formula::from_parsed_rule(top))
}
