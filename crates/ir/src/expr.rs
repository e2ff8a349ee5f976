//! Numeric expression trees.
//!
//! Expressions are built with the constructor functions on [`Expr`]; there is
//! no operator overloading. `a - 2·b` is written
//! `Expr::sub(a, Expr::scale(2.0, b))`.
//!
//! # Example
//! ```rust
//! use ir::{Expr, Query};
//! use ir::logic::{Atom, PredicateTemplate, Term};
//! let flow = PredicateTemplate::decision("flow", 2).unwrap();
//! let q = Query::parse(&["Y"], "edge(X, Y)").unwrap();
//! let out = Atom::new(&flow, vec![Term::var("X"), Term::var("Y")]).unwrap();
//! let e = Expr::sum(q, Expr::atom(out));
//! assert_eq!(e.to_string(), "sum({Y | edge(X, Y)}, flow(X, Y))");
//! ```

use crate::error::IrError;
use crate::logic::{Atom, Binding, Formula, Query};
use crate::primitive::{Constant, SubSymbol};
use std::fmt;

/// `Σ` over every answer of `query` of `body`.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationalSum {
    query: Query,
    body: Box<Expr>,
}

impl RelationalSum {
    #[must_use]
    pub fn new(query: Query, body: Expr) -> Self {
        Self {
            query,
            body: Box::new(body),
        }
    }

    #[must_use]
    #[inline]
    pub fn query(&self) -> &Query {
        &self.query
    }

    #[must_use]
    #[inline]
    pub fn body(&self) -> &Expr {
        &self.body
    }
}

/// A numeric expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Constant(f64),
    /// A sub-symbol bound to a numeric value by an enclosing query.
    Symbol(SubSymbol),
    Atom(Atom),
    Add(Vec<Expr>),
    Mul(Vec<Expr>),
    Sum(RelationalSum),
}

/// Values of ground atoms and answers of queries, used by [`Expr::evaluate`].
pub trait Interpretation {
    /// Value of a ground numeric atom, decision variables included.
    fn value(&self, atom: &Atom) -> Result<f64, IrError>;

    /// Distinct tuples binding `symbols` that satisfy `formula`.
    fn answers(&self, symbols: &[SubSymbol], formula: &Formula)
        -> Result<Vec<Vec<Constant>>, IrError>;
}

impl Expr {
    #[must_use]
    pub fn constant(value: f64) -> Self {
        Self::Constant(value)
    }

    #[must_use]
    pub fn symbol(name: &str) -> Self {
        Self::Symbol(SubSymbol::new(name))
    }

    #[must_use]
    pub fn atom(atom: Atom) -> Self {
        Self::Atom(atom)
    }

    #[must_use]
    pub fn add(terms: Vec<Expr>) -> Self {
        Self::Add(terms)
    }

    #[must_use]
    pub fn mul(factors: Vec<Expr>) -> Self {
        Self::Mul(factors)
    }

    /// `left - right`.
    #[must_use]
    pub fn sub(left: Expr, right: Expr) -> Self {
        Self::Add(vec![left, Self::neg(right)])
    }

    #[must_use]
    pub fn neg(expr: Expr) -> Self {
        Self::scale(-1.0, expr)
    }

    #[must_use]
    pub fn scale(k: f64, expr: Expr) -> Self {
        Self::Mul(vec![Self::Constant(k), expr])
    }

    #[must_use]
    pub fn sum(query: Query, body: Expr) -> Self {
        Self::Sum(RelationalSum::new(query, body))
    }

    /// Replaces bound symbols and atom arguments.
    ///
    /// A symbol bound to a numeric constant becomes [`Expr::Constant`]; a
    /// symbol bound to text is left in place. A nested sum keeps its own
    /// symbols and only sees the rest of the binding.
    #[must_use]
    pub fn substitute(&self, binding: &Binding) -> Self {
        match self {
            Self::Constant(_) => self.clone(),
            Self::Symbol(s) => match binding.get(s).and_then(Constant::as_f64) {
                Some(v) => Self::Constant(v),
                None => self.clone(),
            },
            Self::Atom(a) => Self::Atom(a.substitute(binding)),
            Self::Add(es) => Self::Add(es.iter().map(|e| e.substitute(binding)).collect()),
            Self::Mul(es) => Self::Mul(es.iter().map(|e| e.substitute(binding)).collect()),
            Self::Sum(rs) => Self::sum(
                rs.query.substitute(binding),
                rs.body.substitute(&binding.without(rs.query.symbols())),
            ),
        }
    }

    /// Reference semantics: the scalar value of `self` under `binding`.
    pub fn evaluate<I>(&self, interpretation: &I, binding: &Binding) -> Result<f64, IrError>
    where
        I: Interpretation + ?Sized,
    {
        match self {
            Self::Constant(v) => Ok(*v),
            Self::Symbol(s) => {
                let value = binding
                    .get(s)
                    .ok_or_else(|| IrError::UnboundSymbol(s.to_string()))?;
                value
                    .as_f64()
                    .ok_or_else(|| IrError::NonNumeric(s.to_string()))
            }
            Self::Atom(a) => {
                if a.template().is_boolean() {
                    return Err(IrError::BooleanInExpression(a.name().to_string()));
                }
                let ground = a.substitute(binding);
                if let Some(v) = ground.vars().first() {
                    return Err(IrError::UnboundSymbol(v.to_string()));
                }
                interpretation.value(&ground)
            }
            Self::Add(es) => es
                .iter()
                .try_fold(0.0, |acc, e| Ok(acc + e.evaluate(interpretation, binding)?)),
            Self::Mul(es) => es
                .iter()
                .try_fold(1.0, |acc, e| Ok(acc * e.evaluate(interpretation, binding)?)),
            Self::Sum(rs) => {
                let query = rs.query.substitute(binding);
                let tuples = interpretation.answers(query.symbols(), query.formula())?;
                tuples.iter().try_fold(0.0, |acc, tuple| {
                    let inner = binding.extended(query.symbols(), tuple);
                    Ok(acc + rs.body.evaluate(interpretation, &inner)?)
                })
            }
        }
    }

    fn needs_parens(&self) -> bool {
        matches!(self, Self::Add(_))
    }
}

impl From<Atom> for Expr {
    fn from(atom: Atom) -> Self {
        Self::Atom(atom)
    }
}

impl From<f64> for Expr {
    fn from(value: f64) -> Self {
        Self::Constant(value)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(v) => write!(f, "{v}"),
            Self::Symbol(s) => write!(f, "{s}"),
            Self::Atom(a) => write!(f, "{a}"),
            Self::Add(es) => {
                for (i, e) in es.iter().enumerate() {
                    if i > 0 {
                        write!(f, " + ")?;
                    }
                    write!(f, "{e}")?;
                }
                Ok(())
            }
            Self::Mul(es) => {
                for (i, e) in es.iter().enumerate() {
                    if i > 0 {
                        write!(f, " * ")?;
                    }
                    if e.needs_parens() {
                        write!(f, "({e})")?;
                    } else {
                        write!(f, "{e}")?;
                    }
                }
                Ok(())
            }
            Self::Sum(rs) => write!(f, "sum({}, {})", rs.query, rs.body),
        }
    }
}
