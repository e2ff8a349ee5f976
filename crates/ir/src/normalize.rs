//! Normalization of numeric expressions into flat sums of linear summands.
//!
//! Every summand of a normalized expression is either a product term
//! `[k] * f1 * ... * fn`, whose factors are atoms or symbols, or a single
//! relational sum wrapping such a term. The rewrite rules are:
//!
//! - products distribute over additions
//! - `k · Σ_Q e  =  Σ_Q k · e`
//! - `Σ_Q (a + b)  =  Σ_Q a + Σ_Q b`
//! - `Σ_Q Σ_R e  =  Σ_{Q ∧ R} e`, and a product of sums merges their queries
//!   the same way
//! - terms with a zero coefficient disappear
//!
//! Merging is capture-avoiding. A bound symbol of the inner sum that also
//! occurs in the outer one is renamed to a fresh `X_1`, `X_2`, ... first, and
//! so is a bound symbol of either product operand that the other mentions.
//!
//! Any product holding two decision atoms is rejected as non-linear.

use crate::error::IrError;
use crate::expr::Expr;
use crate::logic::{Atom, Query, Renaming};
use crate::primitive::SubSymbol;
use itertools::Itertools;
use std::fmt;
use tracing::trace;

/// A non-constant factor of a product term.
#[derive(Debug, Clone, PartialEq)]
pub enum Factor {
    Atom(Atom),
    Symbol(SubSymbol),
}

impl Factor {
    fn vars(&self) -> Vec<&SubSymbol> {
        match self {
            Self::Atom(a) => a.vars(),
            Self::Symbol(s) => vec![s],
        }
    }

    fn rename(&self, renaming: &Renaming) -> Self {
        match self {
            Self::Atom(a) => Self::Atom(a.rename(renaming)),
            Self::Symbol(s) => Self::Symbol(renaming.get(s).unwrap_or(s).clone()),
        }
    }

    #[must_use]
    pub fn to_expr(&self) -> Expr {
        match self {
            Self::Atom(a) => Expr::Atom(a.clone()),
            Self::Symbol(s) => Expr::Symbol(s.clone()),
        }
    }

    #[must_use]
    pub fn as_decision(&self) -> Option<&Atom> {
        match self {
            Self::Atom(a) if a.is_decision() => Some(a),
            _ => None,
        }
    }
}

impl fmt::Display for Factor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Atom(a) => write!(f, "{a}"),
            Self::Symbol(s) => write!(f, "{s}"),
        }
    }
}

/// One summand of a normalized expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Summand {
    query: Option<Query>,
    coefficient: f64,
    factors: Vec<Factor>,
}

impl Summand {
    fn unit() -> Self {
        Self {
            query: None,
            coefficient: 1.0,
            factors: Vec::new(),
        }
    }

    /// The relational sum this term sits under, if any.
    #[must_use]
    #[inline]
    pub fn query(&self) -> Option<&Query> {
        self.query.as_ref()
    }

    #[must_use]
    #[inline]
    pub fn coefficient(&self) -> f64 {
        self.coefficient
    }

    #[must_use]
    #[inline]
    pub fn factors(&self) -> &[Factor] {
        &self.factors
    }

    /// The decision atom of this term; a normalized summand has at most one.
    #[must_use]
    pub fn decision_atom(&self) -> Option<&Atom> {
        self.factors.iter().find_map(Factor::as_decision)
    }

    /// Factors other than the decision atom.
    pub fn coefficient_factors(&self) -> impl Iterator<Item = &Factor> {
        self.factors.iter().filter(|f| f.as_decision().is_none())
    }

    fn bound(&self) -> &[SubSymbol] {
        match &self.query {
            Some(q) => q.symbols(),
            None => &[],
        }
    }

    /// Every symbol the summand mentions, bound or free.
    fn vars(&self) -> Vec<SubSymbol> {
        let mut out: Vec<SubSymbol> = self.bound().to_vec();
        let formula_vars = self.query.iter().flat_map(|q| q.formula().vars());
        let factor_vars = self.factors.iter().flat_map(Factor::vars).cloned();
        for v in formula_vars.chain(factor_vars) {
            if !out.contains(&v) {
                out.push(v);
            }
        }
        out
    }

    fn free_vars(&self) -> Vec<SubSymbol> {
        let bound = self.bound();
        self.vars().into_iter().filter(|v| !bound.contains(v)).collect()
    }

    /// Renames the bound symbols found in `clashes` to names absent from
    /// `taken` and from the summand itself.
    fn rename_bound(&self, clashes: &[SubSymbol], taken: &[SubSymbol]) -> Self {
        let Some(query) = &self.query else {
            return self.clone();
        };
        let mut used: Vec<SubSymbol> = self.vars();
        used.extend(clashes.iter().chain(taken).cloned());
        let mut renaming = Renaming::new();
        for symbol in query.symbols().iter().filter(|s| clashes.contains(s)) {
            let fresh = (1..)
                .map(|n| SubSymbol::new(&format!("{}_{n}", symbol.name())))
                .find(|s| !used.contains(s))
                .unwrap_or_else(|| symbol.clone());
            trace!("renaming bound {symbol} to {fresh}");
            used.push(fresh.clone());
            renaming.insert(symbol.clone(), fresh);
        }
        if renaming.is_empty() {
            return self.clone();
        }
        Self {
            query: Some(query.rename(&renaming)),
            coefficient: self.coefficient,
            factors: self.factors.iter().map(|f| f.rename(&renaming)).collect(),
        }
    }

    /// `self · other` where neither operand sees the other's bound symbols.
    fn product(&self, other: &Summand) -> Result<Self, IrError> {
        let own = self.vars();
        let right = other.rename_bound(&own, &own);
        let left = self.rename_bound(&right.free_vars(), &right.vars());
        left.merge(&right)
    }

    /// `Σ_self inner`: the free symbols of `inner` may be bound by `self`, and
    /// its own bound symbols shadow those of `self`.
    fn nest(&self, inner: &Summand) -> Result<Self, IrError> {
        let own = self.vars();
        self.merge(&inner.rename_bound(&own, &own))
    }

    /// The same summand with every bound symbol that occurs in `outer`
    /// renamed, so its query can be conjoined under an enclosing `outer` scope.
    #[must_use]
    pub fn rename_apart(&self, outer: &[SubSymbol]) -> Self {
        self.rename_bound(outer, outer)
    }

    fn merge(&self, other: &Summand) -> Result<Self, IrError> {
        let query = match (&self.query, &other.query) {
            (None, None) => None,
            (Some(q), None) | (None, Some(q)) => Some(q.clone()),
            (Some(q), Some(r)) => Some(q.conjoin(r)),
        };
        let factors: Vec<Factor> = self
            .factors
            .iter()
            .chain(other.factors.iter())
            .cloned()
            .collect();
        if factors.iter().filter(|f| f.as_decision().is_some()).count() > 1 {
            return Err(IrError::NonLinear(factors.iter().join(" * ")));
        }
        Ok(Self {
            query,
            coefficient: self.coefficient * other.coefficient,
            factors,
        })
    }

    /// The product term as an expression, without the enclosing sum.
    #[must_use]
    pub fn term_expr(&self) -> Expr {
        let mut parts: Vec<Expr> = Vec::with_capacity(self.factors.len() + 1);
        if self.factors.is_empty() || self.coefficient != 1.0 {
            parts.push(Expr::Constant(self.coefficient));
        }
        parts.extend(self.factors.iter().map(Factor::to_expr));
        if parts.len() == 1 {
            parts.remove(0)
        } else {
            Expr::Mul(parts)
        }
    }

    #[must_use]
    pub fn to_expr(&self) -> Expr {
        match &self.query {
            Some(q) => Expr::sum(q.clone(), self.term_expr()),
            None => self.term_expr(),
        }
    }
}

/// Flattens `expr` into its normalized summands, in order.
pub fn summands(expr: &Expr) -> Result<Vec<Summand>, IrError> {
    let mut out = expand(expr)?;
    out.retain(|s| s.coefficient != 0.0);
    Ok(out)
}

/// Rewrites `expr` into normal form.
///
/// ```
/// use ir::{normalize, Expr, Query};
/// let q = Query::parse(&["X"], "node(X)").unwrap();
/// let e = Expr::scale(2.0, Expr::sum(q, Expr::add(vec![Expr::symbol("X"), Expr::constant(1.0)])));
/// assert_eq!(
///     normalize(&e).unwrap().to_string(),
///     "sum({X | node(X)}, 2 * X) + sum({X | node(X)}, 2)"
/// );
/// ```
pub fn normalize(expr: &Expr) -> Result<Expr, IrError> {
    let mut parts: Vec<Expr> = summands(expr)?.iter().map(Summand::to_expr).collect();
    let normalized = match parts.len() {
        0 => Expr::Constant(0.0),
        1 => parts.remove(0),
        _ => Expr::Add(parts),
    };
    trace!("normalized {expr} into {normalized}");
    Ok(normalized)
}

fn expand(expr: &Expr) -> Result<Vec<Summand>, IrError> {
    match expr {
        Expr::Constant(v) => Ok(vec![Summand {
            coefficient: *v,
            ..Summand::unit()
        }]),
        Expr::Symbol(s) => Ok(vec![Summand {
            factors: vec![Factor::Symbol(s.clone())],
            ..Summand::unit()
        }]),
        Expr::Atom(a) => {
            if a.template().is_boolean() {
                return Err(IrError::BooleanInExpression(a.name().to_string()));
            }
            Ok(vec![Summand {
                factors: vec![Factor::Atom(a.clone())],
                ..Summand::unit()
            }])
        }
        Expr::Add(terms) => {
            let mut out = Vec::new();
            for term in terms {
                out.extend(expand(term)?);
            }
            Ok(out)
        }
        Expr::Mul(factors) => {
            let mut acc = vec![Summand::unit()];
            for factor in factors {
                let right = expand(factor)?;
                let mut next = Vec::with_capacity(acc.len() * right.len());
                for left in &acc {
                    for r in &right {
                        next.push(left.product(r)?);
                    }
                }
                acc = next;
            }
            Ok(acc)
        }
        Expr::Sum(rs) => {
            let outer = Summand {
                query: Some(rs.query().clone()),
                ..Summand::unit()
            };
            expand(rs.body())?
                .iter()
                .map(|inner| outer.nest(inner))
                .collect()
        }
    }
}
