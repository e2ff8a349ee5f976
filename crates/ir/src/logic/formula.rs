//! Logical formulas over boolean atoms and comparisons.
//!
//! Grounders and backends consume formulas in disjunctive normal form, see
//! [`Formula::to_dnf`].

use super::{Atom, Binding, CompareOp, Comparison, Renaming, Term};
use crate::primitive::SubSymbol;
use crate::{Lexeme, Rule};
use pest::iterators::Pair;
use std::fmt;

/// A logical formula.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Formula {
    True,
    False,
    Atom(Atom),
    Compare(Comparison),
    Not(Box<Formula>),
    And(Vec<Formula>),
    Or(Vec<Formula>),
}

/// A literal of a DNF conjunction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Literal {
    Positive(Atom),
    Negative(Atom),
    Compare(Comparison),
}

impl Literal {
    /// Variables in order of appearance, duplicates kept.
    #[must_use]
    pub fn vars(&self) -> Vec<&SubSymbol> {
        match self {
            Self::Positive(a) | Self::Negative(a) => a.vars(),
            Self::Compare(c) => c.vars(),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Positive(a) => write!(f, "{a}"),
            Self::Negative(a) => write!(f, "~{a}"),
            Self::Compare(c) => write!(f, "{c}"),
        }
    }
}

/// A disjunction of conjunctions of literals.
pub type Dnf = Vec<Vec<Literal>>;

impl Formula {
    #[must_use]
    pub fn atom(atom: Atom) -> Self {
        Self::Atom(atom)
    }

    #[must_use]
    pub fn compare(left: Term, op: CompareOp, right: Term) -> Self {
        Self::Compare(Comparison::new(left, op, right))
    }

    #[allow(clippy::should_implement_trait)]
    #[must_use]
    pub fn not(formula: Formula) -> Self {
        Self::Not(Box::new(formula))
    }

    #[must_use]
    pub fn and(formulas: Vec<Formula>) -> Self {
        Self::And(formulas)
    }

    #[must_use]
    pub fn or(formulas: Vec<Formula>) -> Self {
        Self::Or(formulas)
    }

    /// Flattens nested connectives, folds `true`/`false`, removes double
    /// negation and evaluates comparisons between constants.
    #[must_use]
    pub fn simplify(&self) -> Self {
        match self {
            Self::True | Self::False | Self::Atom(_) => self.clone(),
            Self::Compare(c) => match c.evaluate(&Binding::new()) {
                Some(true) => Self::True,
                Some(false) => Self::False,
                None => self.clone(),
            },
            Self::Not(inner) => match inner.simplify() {
                Self::True => Self::False,
                Self::False => Self::True,
                Self::Not(g) => *g,
                Self::Compare(c) => Self::Compare(c.negate()),
                other => Self::Not(Box::new(other)),
            },
            Self::And(fs) => Self::simplify_connective(fs, true),
            Self::Or(fs) => Self::simplify_connective(fs, false),
        }
    }

    fn simplify_connective(formulas: &[Formula], conjunction: bool) -> Self {
        let (unit, zero) = if conjunction {
            (Self::True, Self::False)
        } else {
            (Self::False, Self::True)
        };

        let mut flat: Vec<Formula> = Vec::new();
        for formula in formulas {
            let simplified = formula.simplify();
            if simplified == unit {
                continue;
            }
            if simplified == zero {
                return zero;
            }
            let children = match simplified {
                Self::And(gs) if conjunction => gs,
                Self::Or(gs) if !conjunction => gs,
                other => vec![other],
            };
            for child in children {
                if !flat.contains(&child) {
                    flat.push(child);
                }
            }
        }

        match flat.len() {
            0 => unit,
            1 => flat.remove(0),
            _ if conjunction => Self::And(flat),
            _ => Self::Or(flat),
        }
    }

    /// Disjunctive normal form. An empty outer vector is `false`; a single
    /// empty conjunction is `true`.
    #[must_use]
    pub fn to_dnf(&self) -> Dnf {
        Self::dnf(&self.simplify(), false)
    }

    fn dnf(formula: &Formula, negated: bool) -> Dnf {
        match formula {
            Self::True if negated => vec![],
            Self::True => vec![vec![]],
            Self::False if negated => vec![vec![]],
            Self::False => vec![],
            Self::Atom(a) if negated => vec![vec![Literal::Negative(a.clone())]],
            Self::Atom(a) => vec![vec![Literal::Positive(a.clone())]],
            Self::Compare(c) if negated => vec![vec![Literal::Compare(c.negate())]],
            Self::Compare(c) => vec![vec![Literal::Compare(c.clone())]],
            Self::Not(inner) => Self::dnf(inner, !negated),
            Self::And(fs) if !negated => Self::dnf_product(fs, negated),
            Self::Or(fs) if negated => Self::dnf_product(fs, negated),
            Self::And(fs) | Self::Or(fs) => fs
                .iter()
                .flat_map(|f| Self::dnf(f, negated))
                .collect(),
        }
    }

    fn dnf_product(formulas: &[Formula], negated: bool) -> Dnf {
        formulas.iter().fold(vec![vec![]], |acc, f| {
            let right = Self::dnf(f, negated);
            let mut product = Vec::with_capacity(acc.len() * right.len());
            for left in &acc {
                for conj in &right {
                    let mut merged = left.clone();
                    merged.extend(conj.iter().cloned());
                    product.push(merged);
                }
            }
            product
        })
    }

    #[must_use]
    pub fn substitute(&self, binding: &Binding) -> Self {
        match self {
            Self::True | Self::False => self.clone(),
            Self::Atom(a) => Self::Atom(a.substitute(binding)),
            Self::Compare(c) => Self::Compare(c.substitute(binding)),
            Self::Not(inner) => Self::Not(Box::new(inner.substitute(binding))),
            Self::And(fs) => Self::And(fs.iter().map(|f| f.substitute(binding)).collect()),
            Self::Or(fs) => Self::Or(fs.iter().map(|f| f.substitute(binding)).collect()),
        }
    }

    #[must_use]
    pub fn rename(&self, renaming: &Renaming) -> Self {
        match self {
            Self::True | Self::False => self.clone(),
            Self::Atom(a) => Self::Atom(a.rename(renaming)),
            Self::Compare(c) => Self::Compare(c.rename(renaming)),
            Self::Not(inner) => Self::Not(Box::new(inner.rename(renaming))),
            Self::And(fs) => Self::And(fs.iter().map(|f| f.rename(renaming)).collect()),
            Self::Or(fs) => Self::Or(fs.iter().map(|f| f.rename(renaming)).collect()),
        }
    }

    /// Truth value under `binding`, with atoms decided by `truth`.
    ///
    /// Returns `None` when an atom or a comparison is not ground after
    /// substitution.
    pub fn evaluate<F>(&self, binding: &Binding, truth: &F) -> Option<bool>
    where
        F: Fn(&Atom) -> bool,
    {
        match self {
            Self::True => Some(true),
            Self::False => Some(false),
            Self::Atom(a) => {
                let ground = a.substitute(binding);
                ground.is_ground().then(|| truth(&ground))
            }
            Self::Compare(c) => c.evaluate(binding),
            Self::Not(inner) => inner.evaluate(binding, truth).map(|v| !v),
            Self::And(fs) => {
                let mut result = true;
                for f in fs {
                    result &= f.evaluate(binding, truth)?;
                }
                Some(result)
            }
            Self::Or(fs) => {
                let mut result = false;
                for f in fs {
                    result |= f.evaluate(binding, truth)?;
                }
                Some(result)
            }
        }
    }

    /// Distinct variables in order of first appearance.
    #[must_use]
    pub fn vars(&self) -> Vec<SubSymbol> {
        let mut out = Vec::new();
        self.collect_vars(&mut out);
        out
    }

    fn collect_vars(&self, out: &mut Vec<SubSymbol>) {
        let leaves = match self {
            Self::True | Self::False => return,
            Self::Atom(a) => a.vars(),
            Self::Compare(c) => c.vars(),
            Self::Not(inner) => return inner.collect_vars(out),
            Self::And(fs) | Self::Or(fs) => {
                fs.iter().for_each(|f| f.collect_vars(out));
                return;
            }
        };
        for v in leaves {
            if !out.contains(v) {
                out.push(v.clone());
            }
        }
    }

    fn needs_parens(&self) -> bool {
        matches!(self, Self::And(_) | Self::Or(_))
    }
}

impl Lexeme for Formula {
    /// Builds the formula tree; single-child connectives collapse to the child.
    ///
    /// # Panics
    /// Panics if the rule is not produced by the formula grammar.
    fn from_parsed_rule(parsed_rule: Pair<Rule>) -> Self {
        match parsed_rule.as_rule() {
            Rule::formula => Self::from_parsed_rule(
                parsed_rule
                    .into_inner()
                    .next()
                    .expect("Parser error: empty formula"),
            ),
            rule @ (Rule::disjunction | Rule::conjunction) => {
                let mut children: Vec<Formula> =
                    parsed_rule.into_inner().map(Self::from_parsed_rule).collect();
                if children.len() == 1 {
                    children.remove(0)
                } else if rule == Rule::disjunction {
                    Self::Or(children)
                } else {
                    Self::And(children)
                }
            }
            Rule::negation => Self::not(Self::from_parsed_rule(
                parsed_rule
                    .into_inner()
                    .next()
                    .expect("Parser error: negation missing operand"),
            )),
            Rule::atom => Self::Atom(Atom::from_parsed_rule(parsed_rule)),
            Rule::comparison => Self::Compare(Comparison::from_parsed_rule(parsed_rule)),
            Rule::boolean if parsed_rule.as_str() == "true" => Self::True,
            Rule::boolean => Self::False,
            other => panic!("Parser error: unexpected formula rule: {other:?}"),
        }
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let write_joined = |f: &mut fmt::Formatter<'_>, fs: &[Formula], sep: &str| {
            for (i, child) in fs.iter().enumerate() {
                if i > 0 {
                    write!(f, " {sep} ")?;
                }
                if child.needs_parens() {
                    write!(f, "({child})")?;
                } else {
                    write!(f, "{child}")?;
                }
            }
            Ok(())
        };
        match self {
            Self::True => write!(f, "true"),
            Self::False => write!(f, "false"),
            Self::Atom(a) => write!(f, "{a}"),
            Self::Compare(c) => write!(f, "{c}"),
            Self::Not(inner) if inner.needs_parens() => write!(f, "~({inner})"),
            Self::Not(inner) => write!(f, "~{inner}"),
            Self::And(fs) => write_joined(f, fs, "&"),
            Self::Or(fs) => write_joined(f, fs, "|"),
        }
    }
}
