//! Queries: an ordered set of free symbols plus a formula that binds them.

use super::{Binding, Formula, Renaming};
use crate::error::IrError;
use crate::primitive::SubSymbol;
use std::fmt;

/// Enumerates the tuples that bind `symbols` and satisfy `formula`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Query {
    symbols: Vec<SubSymbol>,
    formula: Formula,
}

impl Query {
    /// Creates a query; repeated symbols are dropped, first occurrence wins.
    #[must_use]
    pub fn new(symbols: Vec<SubSymbol>, formula: Formula) -> Self {
        let mut unique: Vec<SubSymbol> = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            if !unique.contains(&symbol) {
                unique.push(symbol);
            }
        }
        Self {
            symbols: unique,
            formula,
        }
    }

    /// The query with no free symbols whose formula is `true`.
    #[must_use]
    pub fn always() -> Self {
        Self::new(Vec::new(), Formula::True)
    }

    /// Parses the formula text and binds the given symbol names.
    ///
    /// ```
    /// use ir::Query;
    /// let q = Query::parse(&["X", "Y"], "edge(X, Y) & ~source(Y)").unwrap();
    /// assert_eq!(q.to_string(), "{X, Y | edge(X, Y) & ~source(Y)}");
    /// ```
    pub fn parse(symbols: &[&str], text: &str) -> Result<Self, IrError> {
        let formula = crate::parse_formula(text)?;
        Ok(Self::new(
            symbols.iter().map(|s| SubSymbol::new(s)).collect(),
            formula,
        ))
    }

    #[must_use]
    #[inline]
    pub fn symbols(&self) -> &[SubSymbol] {
        &self.symbols
    }

    #[must_use]
    #[inline]
    pub fn formula(&self) -> &Formula {
        &self.formula
    }

    /// Symbols of `self` then of `other`; formula `self ∧ other`.
    #[must_use]
    pub fn conjoin(&self, other: &Query) -> Self {
        let symbols = self
            .symbols
            .iter()
            .chain(other.symbols.iter())
            .cloned()
            .collect();
        let formula = Formula::and(vec![self.formula.clone(), other.formula.clone()]).simplify();
        Self::new(symbols, formula)
    }

    /// Replaces the parameters of the formula, i.e. variables other than the
    /// query's own symbols, which the query binds itself.
    #[must_use]
    pub fn substitute(&self, binding: &Binding) -> Self {
        Self {
            symbols: self.symbols.clone(),
            formula: self.formula.substitute(&binding.without(&self.symbols)),
        }
    }

    /// Renames symbols in the free set and the formula alike.
    #[must_use]
    pub fn rename(&self, renaming: &Renaming) -> Self {
        Self::new(
            self.symbols
                .iter()
                .map(|s| renaming.get(s).unwrap_or(s).clone())
                .collect(),
            self.formula.rename(renaming),
        )
    }

    #[must_use]
    pub fn is_trivial(&self) -> bool {
        self.symbols.is_empty() && self.formula.simplify() == Formula::True
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbols: Vec<String> = self.symbols.iter().map(ToString::to_string).collect();
        write!(f, "{{{} | {}}}", symbols.join(", "), self.formula)
    }
}
