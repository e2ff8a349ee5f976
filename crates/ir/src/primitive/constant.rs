//! Constant values stored in knowledge bases and bound to sub-symbols.

use crate::{Lexeme, Rule};
use pest::iterators::Pair;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A literal constant: an atom argument, a fact column, or an answer cell.
///
/// Constants key the row and column maps of the grounders, so they carry a
/// total equality, hash and order. Reals compare with [`f64::total_cmp`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Constant {
    /// 64-bit signed integer constant.
    Integer(i64),

    /// Double precision real constant.
    Real(f64),

    /// UTF-8 string constant.
    Text(String),
}

impl Constant {
    /// Shorthand for a text constant.
    #[must_use]
    pub fn text(s: &str) -> Self {
        Self::Text(s.to_string())
    }

    /// Numeric view of the constant; `None` for text.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(v) => Some(*v as f64),
            Self::Real(v) => Some(*v),
            Self::Text(_) => None,
        }
    }

    #[must_use]
    pub fn is_numeric(&self) -> bool {
        !matches!(self, Self::Text(_))
    }

    /// Value comparison used by query filters: numbers compare numerically
    /// across `Integer`/`Real`, text compares lexicographically, and mixed
    /// text/number pairs are incomparable.
    #[must_use]
    pub fn compare_value(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => Some(a.cmp(b)),
            (Self::Integer(a), Self::Integer(b)) => Some(a.cmp(b)),
            _ => match (self.as_f64(), other.as_f64()) {
                (Some(a), Some(b)) => a.partial_cmp(&b),
                _ => None,
            },
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Integer(_) => 0,
            Self::Real(_) => 1,
            Self::Text(_) => 2,
        }
    }
}

impl PartialEq for Constant {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Constant {}

impl PartialOrd for Constant {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Constant {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => a.cmp(b),
            (Self::Real(a), Self::Real(b)) => a.total_cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl Hash for Constant {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            Self::Integer(v) => v.hash(state),
            Self::Real(v) => v.to_bits().hash(state),
            Self::Text(s) => s.hash(state),
        }
    }
}

impl From<i64> for Constant {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<f64> for Constant {
    fn from(v: f64) -> Self {
        Self::Real(v)
    }
}

impl From<&str> for Constant {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl Lexeme for Constant {
    /// Parses `real | integer | 'string' | name`.
    ///
    /// # Panics
    /// Panics if the rule is not a constant produced by the grammar.
    fn from_parsed_rule(parsed_rule: Pair<Rule>) -> Self {
        let inner = parsed_rule
            .into_inner()
            .next()
            .expect("Parser error: constant missing inner token");
        let text = inner.as_str();
        match inner.as_rule() {
            Rule::integer => text
                .parse::<i64>()
                .map(Self::Integer)
                .or_else(|_| text.parse::<f64>().map(Self::Real))
                .expect("Parser error: malformed integer literal"),
            Rule::real => Self::Real(
                text.parse()
                    .expect("Parser error: malformed real literal"),
            ),
            Rule::string => Self::text(
                inner
                    .into_inner()
                    .next()
                    .map_or("", |body| body.as_str()),
            ),
            Rule::name => Self::text(text),
            other => panic!("Parser error: unknown constant rule: {other:?}"),
        }
    }
}

impl fmt::Display for Constant {
    /// Integers and reals as-is, strings with single quotes.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(v) => write!(f, "{v}"),
            Self::Real(v) => write!(f, "{v:?}"),
            Self::Text(s) => write!(f, "'{s}'"),
        }
    }
}
