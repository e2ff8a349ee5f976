//! Relations, constraints and the declared model.

use crate::expr::Expr;
use crate::logic::{PredicateTemplate, Query};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a linear relation. Strict comparisons are not expressible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationKind {
    Le,
    Ge,
    Eq,
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Le => "<=",
            Self::Ge => ">=",
            Self::Eq => "=",
        })
    }
}

/// `lhs kind rhs`.
#[derive(Debug, Clone, PartialEq)]
pub struct Relation {
    lhs: Expr,
    kind: RelationKind,
    rhs: Expr,
}

impl Relation {
    #[must_use]
    pub fn new(lhs: Expr, kind: RelationKind, rhs: Expr) -> Self {
        Self { lhs, kind, rhs }
    }

    #[must_use]
    pub fn le(lhs: Expr, rhs: Expr) -> Self {
        Self::new(lhs, RelationKind::Le, rhs)
    }

    #[must_use]
    pub fn ge(lhs: Expr, rhs: Expr) -> Self {
        Self::new(lhs, RelationKind::Ge, rhs)
    }

    #[must_use]
    pub fn eq(lhs: Expr, rhs: Expr) -> Self {
        Self::new(lhs, RelationKind::Eq, rhs)
    }

    #[must_use]
    #[inline]
    pub fn lhs(&self) -> &Expr {
        &self.lhs
    }

    #[must_use]
    #[inline]
    pub fn kind(&self) -> RelationKind {
        self.kind
    }

    #[must_use]
    #[inline]
    pub fn rhs(&self) -> &Expr {
        &self.rhs
    }

    #[must_use]
    pub fn is_equality(&self) -> bool {
        self.kind == RelationKind::Eq
    }

    /// The single expression compared against zero: `lhs - rhs` for `<=` and
    /// `=`, `rhs - lhs` for `>=`, so every inequality reads `e <= 0`.
    #[must_use]
    pub fn canonical(&self) -> Expr {
        match self.kind {
            RelationKind::Ge => Expr::sub(self.rhs.clone(), self.lhs.clone()),
            RelationKind::Le | RelationKind::Eq => Expr::sub(self.lhs.clone(), self.rhs.clone()),
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.lhs, self.kind, self.rhs)
    }
}

/// A bare relation, or one relation instance per answer of a query.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    Relation(Relation),
    ForAll { query: Query, relation: Relation },
}

impl Constraint {
    #[must_use]
    pub fn for_all(query: Query, relation: Relation) -> Self {
        Self::ForAll { query, relation }
    }

    #[must_use]
    pub fn relation(&self) -> &Relation {
        match self {
            Self::Relation(r) | Self::ForAll { relation: r, .. } => r,
        }
    }

    /// The quantifying query; `None` for a bare relation.
    #[must_use]
    pub fn query(&self) -> Option<&Query> {
        match self {
            Self::Relation(_) => None,
            Self::ForAll { query, .. } => Some(query),
        }
    }
}

impl From<Relation> for Constraint {
    fn from(relation: Relation) -> Self {
        Self::Relation(relation)
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Relation(r) => write!(f, "{r}"),
            Self::ForAll { query, relation } => write!(f, "forall({query}, {relation})"),
        }
    }
}

/// Optimization direction; grounded objectives are always minimized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sense {
    #[default]
    Minimize,
    Maximize,
}

impl Sense {
    /// `+1` for minimization, `-1` for maximization.
    #[must_use]
    pub fn factor(self) -> f64 {
        match self {
            Self::Minimize => 1.0,
            Self::Maximize => -1.0,
        }
    }
}

impl fmt::Display for Sense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Minimize => "minimize",
            Self::Maximize => "maximize",
        })
    }
}

/// Everything a grounder needs: direction, objective, constraints and the
/// decision templates in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Model {
    pub sense: Sense,
    pub objective: Option<Expr>,
    pub constraints: Vec<Constraint>,
    pub decision: Vec<PredicateTemplate>,
}

impl Model {
    #[must_use]
    pub fn new(sense: Sense) -> Self {
        Self {
            sense,
            ..Self::default()
        }
    }

    /// Position of a decision template in declaration order.
    #[must_use]
    pub fn decision_index(&self, template: &PredicateTemplate) -> Option<usize> {
        self.decision.iter().position(|t| t == template)
    }
}
