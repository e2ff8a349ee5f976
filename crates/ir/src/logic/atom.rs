//! Atoms: predicate templates applied to arguments.
//!
//! - [`Term`]: a sub-symbol or a constant
//! - [`Atom`]: `name(arg1, ..., argN)`
//!
//! # Example
//! ```rust
//! use ir::logic::{Atom, PredicateTemplate, Term};
//! use ir::primitive::{Constant, SubSymbol};
//! let edge = PredicateTemplate::boolean("edge", 2).unwrap();
//! let a = Atom::new(&edge, vec![Term::from(Constant::text("a")), Term::from(SubSymbol::new("Y"))]).unwrap();
//! assert_eq!(a.to_string(), "edge('a', Y)");
//! ```

use super::{Binding, PredicateTemplate, Renaming};
use crate::error::IrError;
use crate::primitive::{Constant, SubSymbol};
use crate::{Lexeme, Rule};
use pest::iterators::Pair;
use std::fmt;

/// An argument to an atom: logical variable or constant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Term {
    Var(SubSymbol),
    Const(Constant),
}

impl Term {
    #[must_use]
    pub fn var(name: &str) -> Self {
        Self::Var(SubSymbol::new(name))
    }

    #[must_use]
    pub fn is_var(&self) -> bool {
        matches!(self, Self::Var(_))
    }

    #[must_use]
    pub fn as_var(&self) -> Option<&SubSymbol> {
        match self {
            Self::Var(v) => Some(v),
            Self::Const(_) => None,
        }
    }

    /// Replaces a bound variable by its value; constants and unbound
    /// variables are returned unchanged.
    #[must_use]
    pub fn substitute(&self, binding: &Binding) -> Self {
        match self {
            Self::Var(v) => binding
                .get(v)
                .map_or_else(|| self.clone(), |c| Self::Const(c.clone())),
            Self::Const(_) => self.clone(),
        }
    }

    #[must_use]
    pub fn rename(&self, renaming: &Renaming) -> Self {
        match self {
            Self::Var(v) => renaming
                .get(v)
                .map_or_else(|| self.clone(), |w| Self::Var(w.clone())),
            Self::Const(_) => self.clone(),
        }
    }
}

impl From<SubSymbol> for Term {
    fn from(v: SubSymbol) -> Self {
        Self::Var(v)
    }
}

impl From<&SubSymbol> for Term {
    fn from(v: &SubSymbol) -> Self {
        Self::Var(v.clone())
    }
}

impl From<Constant> for Term {
    fn from(c: Constant) -> Self {
        Self::Const(c)
    }
}

impl From<i64> for Term {
    fn from(v: i64) -> Self {
        Self::Const(Constant::Integer(v))
    }
}

impl From<&str> for Term {
    /// String literals are text constants, never variables.
    fn from(s: &str) -> Self {
        Self::Const(Constant::text(s))
    }
}

impl Lexeme for Term {
    /// Uppercase identifiers are variables; everything else is a constant.
    ///
    /// # Panics
    /// Panics if the rule is not a term produced by the grammar.
    fn from_parsed_rule(parsed_rule: Pair<Rule>) -> Self {
        let inner = parsed_rule
            .into_inner()
            .next()
            .expect("Parser error: term missing inner token");
        match inner.as_rule() {
            Rule::variable => Self::var(inner.as_str()),
            Rule::constant => Self::Const(Constant::from_parsed_rule(inner)),
            other => panic!("Parser error: unknown term rule: {other:?}"),
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Var(v) => write!(f, "{v}"),
            Self::Const(c) => write!(f, "{c}"),
        }
    }
}

/// A predicate instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Atom {
    template: PredicateTemplate,
    arguments: Vec<Term>,
}

impl Atom {
    /// Applies `template` to `arguments`; the argument count must equal the arity.
    pub fn new(template: &PredicateTemplate, arguments: Vec<Term>) -> Result<Self, IrError> {
        if arguments.len() != template.arity() {
            return Err(IrError::ArityMismatch {
                name: template.name().to_string(),
                expected: template.arity(),
                found: arguments.len(),
            });
        }
        Ok(Self {
            template: template.clone(),
            arguments,
        })
    }

    #[must_use]
    #[inline]
    pub fn template(&self) -> &PredicateTemplate {
        &self.template
    }

    #[must_use]
    #[inline]
    pub fn name(&self) -> &str {
        self.template.name()
    }

    #[must_use]
    #[inline]
    pub fn arguments(&self) -> &[Term] {
        &self.arguments
    }

    #[must_use]
    #[inline]
    pub fn arity(&self) -> usize {
        self.arguments.len()
    }

    #[must_use]
    #[inline]
    pub fn is_decision(&self) -> bool {
        self.template.is_decision()
    }

    /// Variables in argument order, duplicates kept.
    #[must_use]
    pub fn vars(&self) -> Vec<&SubSymbol> {
        self.arguments.iter().filter_map(Term::as_var).collect()
    }

    /// The argument tuple if every argument is a constant.
    #[must_use]
    pub fn ground_arguments(&self) -> Option<Vec<Constant>> {
        self.arguments
            .iter()
            .map(|arg| match arg {
                Term::Const(c) => Some(c.clone()),
                Term::Var(_) => None,
            })
            .collect()
    }

    #[must_use]
    pub fn is_ground(&self) -> bool {
        self.arguments.iter().all(|arg| !arg.is_var())
    }

    #[must_use]
    pub fn substitute(&self, binding: &Binding) -> Self {
        Self {
            template: self.template.clone(),
            arguments: self
                .arguments
                .iter()
                .map(|arg| arg.substitute(binding))
                .collect(),
        }
    }

    #[must_use]
    pub fn rename(&self, renaming: &Renaming) -> Self {
        Self {
            template: self.template.clone(),
            arguments: self.arguments.iter().map(|arg| arg.rename(renaming)).collect(),
        }
    }

    /// The same arguments followed by `extra`, under `template`.
    ///
    /// Used to turn a numeric atom `p(args)` into its value relation `p(args, V)`.
    #[must_use]
    pub fn with_extra_argument(&self, template: &PredicateTemplate, extra: Term) -> Self {
        let mut arguments = self.arguments.clone();
        arguments.push(extra);
        Self {
            template: template.clone(),
            arguments,
        }
    }
}

impl Lexeme for Atom {
    /// Parses `name(t1, ..., tn)` as an atom of a boolean template of arity `n`.
    ///
    /// # Panics
    /// Panics if the rule is not an atom produced by the grammar.
    fn from_parsed_rule(parsed_rule: Pair<Rule>) -> Self {
        let mut inner = parsed_rule.into_inner();
        let name = inner
            .next()
            .expect("Parser error: atom missing predicate name")
            .as_str();
        let arguments: Vec<Term> = inner.map(Term::from_parsed_rule).collect();
        let template = PredicateTemplate::boolean(name, arguments.len())
            .expect("Parser error: atom must have at least one argument");
        Self {
            template,
            arguments,
        }
    }
}

impl fmt::Display for Atom {
    /// Formats as `name(a, b)`, always including parentheses.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name())?;
        for (i, arg) in self.arguments.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{arg}")?;
        }
        write!(f, ")")
    }
}
