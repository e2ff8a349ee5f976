//! Predicate templates.
//!
//! A template is a plain value `{name, arity, kind, decision}`; applying it to
//! an argument list yields an [`Atom`](super::Atom).
//!
//! # Example
//! ```rust
//! use ir::logic::PredicateTemplate;
//! let flow = PredicateTemplate::decision("flow", 2).unwrap();
//! assert!(flow.is_decision());
//! assert_eq!(flow.to_string(), "flow/2 [decision]");
//! ```

use crate::error::IrError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a predicate is a logical relation or a numeric function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PredicateKind {
    /// Used only inside logical formulas.
    Boolean,
    /// Maps an argument tuple to a real value.
    Numeric,
}

/// `name/arity` together with its kind and decision-variable flag.
///
/// Numeric templates denote `p(e1, ..., ek) := v` for a `k+1`-column relation
/// in the knowledge base, unless they are decision variables, in which case
/// every ground instance becomes one LP column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PredicateTemplate {
    name: String,
    arity: usize,
    kind: PredicateKind,
    decision: bool,
}

impl PredicateTemplate {
    /// A boolean predicate; arity must be at least one.
    pub fn boolean(name: &str, arity: usize) -> Result<Self, IrError> {
        if arity == 0 {
            return Err(IrError::InvalidTemplate(
                name.to_string(),
                "boolean predicates need at least one argument".into(),
            ));
        }
        Ok(Self::build(name, arity, PredicateKind::Boolean, false))
    }

    /// A numeric predicate resolved against knowledge base facts.
    #[must_use]
    pub fn numeric(name: &str, arity: usize) -> Self {
        Self::build(name, arity, PredicateKind::Numeric, false)
    }

    /// A numeric predicate whose instances are LP columns.
    pub fn decision(name: &str, arity: usize) -> Result<Self, IrError> {
        if arity == 0 {
            return Err(IrError::InvalidTemplate(
                name.to_string(),
                "decision variables need at least one argument".into(),
            ));
        }
        Ok(Self::build(name, arity, PredicateKind::Numeric, true))
    }

    fn build(name: &str, arity: usize, kind: PredicateKind, decision: bool) -> Self {
        Self {
            name: name.to_string(),
            arity,
            kind,
            decision,
        }
    }

    #[must_use]
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    #[inline]
    pub fn arity(&self) -> usize {
        self.arity
    }

    #[must_use]
    #[inline]
    pub fn kind(&self) -> PredicateKind {
        self.kind
    }

    #[must_use]
    #[inline]
    pub fn is_boolean(&self) -> bool {
        self.kind == PredicateKind::Boolean
    }

    #[must_use]
    #[inline]
    pub fn is_decision(&self) -> bool {
        self.decision
    }

    /// The boolean relation that stores this numeric predicate's facts:
    /// same name, one extra column for the value.
    #[must_use]
    pub fn value_relation(&self) -> Self {
        Self::build(&self.name, self.arity + 1, PredicateKind::Boolean, false)
    }
}

impl fmt::Display for PredicateTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.arity)?;
        if self.decision {
            write!(f, " [decision]")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_validate_arity() {
        assert!(PredicateTemplate::boolean("node", 0).is_err());
        assert!(PredicateTemplate::decision("x", 0).is_err());
        let zero_ary = PredicateTemplate::numeric("budget", 0);
        assert_eq!(zero_ary.arity(), 0);
        assert!(!zero_ary.is_decision());
    }

    #[test]
    fn kinds_and_flags() {
        let edge = PredicateTemplate::boolean("edge", 2).unwrap();
        assert!(edge.is_boolean());
        assert!(!edge.is_decision());

        let flow = PredicateTemplate::decision("flow", 2).unwrap();
        assert_eq!(flow.kind(), PredicateKind::Numeric);
        assert!(flow.is_decision());
        assert_ne!(flow, PredicateTemplate::numeric("flow", 2));
    }

    #[test]
    fn value_relation_adds_a_column() {
        let cost = PredicateTemplate::numeric("cost", 2);
        let rel = cost.value_relation();
        assert_eq!(rel.name(), "cost");
        assert_eq!(rel.arity(), 3);
        assert!(rel.is_boolean());
        assert_eq!(cost.to_string(), "cost/2");
    }
}
