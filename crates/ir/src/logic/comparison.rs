//! Arithmetic relations between terms inside queries.
//!
//! - [`CompareOp`]: `< | <= | = | != | >= | >`
//! - [`Comparison`]: `{left} {op} {right}`

use super::{Binding, Renaming, Term};
use crate::primitive::SubSymbol;
use crate::{Lexeme, Rule};
use pest::iterators::Pair;
use std::cmp::Ordering;
use std::fmt;

/// Comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CompareOp {
    Less,         // <
    LessEqual,    // <=
    Equal,        // =
    NotEqual,     // !=
    GreaterEqual, // >=
    Greater,      // >
}

impl CompareOp {
    /// The operator of the negated comparison.
    #[must_use]
    pub fn negate(self) -> Self {
        match self {
            Self::Less => Self::GreaterEqual,
            Self::LessEqual => Self::Greater,
            Self::Equal => Self::NotEqual,
            Self::NotEqual => Self::Equal,
            Self::GreaterEqual => Self::Less,
            Self::Greater => Self::LessEqual,
        }
    }

    /// Whether an ordering outcome satisfies this operator.
    #[must_use]
    pub fn holds(self, ordering: Ordering) -> bool {
        match self {
            Self::Less => ordering == Ordering::Less,
            Self::LessEqual => ordering != Ordering::Greater,
            Self::Equal => ordering == Ordering::Equal,
            Self::NotEqual => ordering != Ordering::Equal,
            Self::GreaterEqual => ordering != Ordering::Less,
            Self::Greater => ordering == Ordering::Greater,
        }
    }

    /// SQL spelling of the operator.
    #[must_use]
    pub fn sql(self) -> &'static str {
        match self {
            Self::Less => "<",
            Self::LessEqual => "<=",
            Self::Equal => "=",
            Self::NotEqual => "<>",
            Self::GreaterEqual => ">=",
            Self::Greater => ">",
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sym = match self {
            Self::NotEqual => "!=",
            other => other.sql(),
        };
        write!(f, "{sym}")
    }
}

/// `{left} {op} {right}` boolean comparison.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Comparison {
    left: Term,
    operator: CompareOp,
    right: Term,
}

impl Comparison {
    #[must_use]
    pub fn new(left: Term, operator: CompareOp, right: Term) -> Self {
        Self {
            left,
            operator,
            right,
        }
    }

    #[must_use]
    #[inline]
    pub fn left(&self) -> &Term {
        &self.left
    }

    #[must_use]
    #[inline]
    pub fn operator(&self) -> CompareOp {
        self.operator
    }

    #[must_use]
    #[inline]
    pub fn right(&self) -> &Term {
        &self.right
    }

    #[must_use]
    pub fn negate(&self) -> Self {
        Self::new(self.left.clone(), self.operator.negate(), self.right.clone())
    }

    /// Variables on either side, left first.
    #[must_use]
    pub fn vars(&self) -> Vec<&SubSymbol> {
        [&self.left, &self.right]
            .into_iter()
            .filter_map(Term::as_var)
            .collect()
    }

    #[must_use]
    pub fn substitute(&self, binding: &Binding) -> Self {
        Self::new(
            self.left.substitute(binding),
            self.operator,
            self.right.substitute(binding),
        )
    }

    #[must_use]
    pub fn rename(&self, renaming: &Renaming) -> Self {
        Self::new(
            self.left.rename(renaming),
            self.operator,
            self.right.rename(renaming),
        )
    }

    /// Truth value under `binding`; `None` while a side is still a variable.
    ///
    /// Text never equals a number; every ordering between them is false.
    #[must_use]
    pub fn evaluate(&self, binding: &Binding) -> Option<bool> {
        let (Term::Const(l), Term::Const(r)) = (
            self.left.substitute(binding),
            self.right.substitute(binding),
        ) else {
            return None;
        };
        Some(match l.compare_value(&r) {
            Some(ordering) => self.operator.holds(ordering),
            None => self.operator == CompareOp::NotEqual,
        })
    }
}

impl Lexeme for CompareOp {
    /// # Panics
    /// Panics if the rule is not one of the expected operator tokens.
    fn from_parsed_rule(parsed_rule: Pair<Rule>) -> Self {
        let op = parsed_rule
            .into_inner()
            .next()
            .expect("Parser error: comparison operator missing inner token");
        match op.as_rule() {
            Rule::less => Self::Less,
            Rule::less_equal => Self::LessEqual,
            Rule::equal => Self::Equal,
            Rule::not_equal => Self::NotEqual,
            Rule::greater_equal => Self::GreaterEqual,
            Rule::greater => Self::Greater,
            other => panic!("Parser error: unknown comparison operator: {other:?}"),
        }
    }
}

impl Lexeme for Comparison {
    /// # Panics
    /// Panics if the rule is not a comparison produced by the grammar.
    fn from_parsed_rule(parsed_rule: Pair<Rule>) -> Self {
        let mut inner = parsed_rule.into_inner();
        let mut next = |what: &str| {
            inner
                .next()
                .unwrap_or_else(|| panic!("Parser error: comparison missing {what}"))
        };
        let left = Term::from_parsed_rule(next("left term"));
        let operator = CompareOp::from_parsed_rule(next("operator"));
        let right = Term::from_parsed_rule(next("right term"));
        Self::new(left, operator, right)
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.left, self.operator, self.right)
    }
}
