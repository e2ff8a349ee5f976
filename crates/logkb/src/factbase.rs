//! In-memory reference knowledge base.
//!
//! Relations are insertion-ordered sets of tuples. A numeric fact
//! `p(e1, ..., ek) := v` is the row `(e1, ..., ek, v)` of relation `p`, so the
//! same table serves fact lookup and the value relations used by the block
//! grounder.
//!
//! Queries are answered conjunction by conjunction of the formula's DNF with a
//! nested-loop join over the positive atoms. Negated atoms and comparisons
//! filter as soon as their variables are bound; an equality with one unbound
//! variable binds it.
//!
//! # Example
//! ```rust
//! use ir::{parse_formula, Constant, SubSymbol};
//! use logkb::{FactBase, LogKb};
//! let mut kb = FactBase::new();
//! kb.load("edge(a, b) & edge(b, c) & source(a)").unwrap();
//! let f = parse_formula("edge(X, Y) & ~source(X)").unwrap();
//! let rows = kb.ask(&[SubSymbol::new("Y")], &f, None).unwrap();
//! assert_eq!(rows, vec![vec![Constant::text("c")]]);
//! ```

use crate::{Answers, KbError, KbInterpretation, LogKb, Tuple};
use ir::{Atom, Binding, CompareOp, Constant, Expr, Formula, IrError, Literal, SubSymbol, Term};
use std::collections::{HashMap, HashSet};
use std::cmp::Ordering;
use tracing::{debug, trace};

#[derive(Debug, Clone, Default)]
struct Table {
    rows: Vec<Tuple>,
    seen: HashSet<Tuple>,
}

impl Table {
    fn insert(&mut self, tuple: Tuple) -> bool {
        if !self.seen.insert(value_key(&tuple)) {
            return false;
        }
        self.rows.push(tuple);
        true
    }

    fn matching<'a>(&'a self, args: &'a [Constant]) -> impl Iterator<Item = &'a Tuple> + 'a {
        self.rows.iter().filter(move |row| {
            row.len() >= args.len() && row.iter().zip(args).all(|(a, b)| same_value(a, b))
        })
    }
}

/// Deduplication key: integral reals become integers, so `5` and `5.0` are
/// one row.
fn value_key(tuple: &[Constant]) -> Tuple {
    tuple
        .iter()
        .map(|c| match c {
            Constant::Real(v) if v.fract() == 0.0 && v.abs() < 9.0e15 => Constant::Integer(*v as i64),
            other => other.clone(),
        })
        .collect()
}

/// Integers and reals with the same value are the same fact argument.
fn same_value(a: &Constant, b: &Constant) -> bool {
    a == b || a.compare_value(b) == Some(Ordering::Equal)
}

/// An in-memory set of relations.
#[derive(Debug, Clone, Default)]
pub struct FactBase {
    tables: HashMap<String, Table>,
}

impl FactBase {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a row to `relation`; returns `false` if it was already present.
    pub fn insert(&mut self, relation: &str, tuple: Tuple) -> bool {
        self.tables
            .entry(relation.to_string())
            .or_default()
            .insert(tuple)
    }

    /// Adds the numeric fact `relation(args) := value`.
    pub fn insert_value(&mut self, relation: &str, mut args: Tuple, value: f64) -> bool {
        args.push(Constant::Real(value));
        self.insert(relation, args)
    }

    /// Adds a ground atom as a row of its relation.
    pub fn insert_atom(&mut self, atom: &Atom) -> Result<bool, KbError> {
        let args = atom
            .ground_arguments()
            .ok_or_else(|| KbError::NotGround(atom.to_string()))?;
        Ok(self.insert(atom.name(), args))
    }

    /// Loads facts written as a `&`-separated list of ground atoms.
    ///
    /// Numeric facts carry their value as the last argument, e.g.
    /// `cap(a, b, 50)`. Returns the number of new rows.
    pub fn load(&mut self, text: &str) -> Result<usize, KbError> {
        let formula = ir::parse_formula(text)?;
        let atoms = match formula {
            Formula::Atom(a) => vec![a],
            Formula::And(children) => children
                .into_iter()
                .map(|child| match child {
                    Formula::Atom(a) => Ok(a),
                    other => Err(IrError::Parse(format!("'{other}' is not a fact"))),
                })
                .collect::<Result<Vec<_>, _>>()?,
            other => return Err(IrError::Parse(format!("'{other}' is not a list of facts")).into()),
        };
        let mut added = 0;
        for atom in &atoms {
            if self.insert_atom(atom)? {
                added += 1;
            }
        }
        debug!("loaded {added} fact(s)");
        Ok(added)
    }

    /// Rows of `relation` in insertion order.
    #[must_use]
    pub fn rows(&self, relation: &str) -> &[Tuple] {
        self.tables.get(relation).map_or(&[], |t| t.rows.as_slice())
    }

    fn contains(&self, atom: &Atom) -> bool {
        let Some(args) = atom.ground_arguments() else {
            return false;
        };
        self.tables
            .get(atom.name())
            .is_some_and(|t| t.matching(&args).any(|row| row.len() == args.len()))
    }

    fn join(&self, bindings: Vec<Binding>, atom: &Atom) -> Vec<Binding> {
        let Some(table) = self.tables.get(atom.name()) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        for binding in bindings {
            let pattern = atom.substitute(&binding);
            for row in table.rows.iter().filter(|r| r.len() == atom.arity()) {
                if let Some(extended) = unify(pattern.arguments(), row, &binding) {
                    out.push(extended);
                }
            }
        }
        out
    }

    /// Applies every pending filter whose variables are bound, repeatedly.
    fn apply_filters(
        &self,
        mut bindings: Vec<Binding>,
        pending: &mut Vec<Literal>,
        bound: &mut HashSet<SubSymbol>,
    ) -> Vec<Binding> {
        while let Some(pos) = pending.iter().position(|lit| is_ready(lit, bound)) {
            let literal = pending.remove(pos);
            bindings.retain_mut(|b| self.check(&literal, b));
            bound.extend(literal.vars().into_iter().cloned());
        }
        bindings
    }

    fn check(&self, literal: &Literal, binding: &mut Binding) -> bool {
        match literal {
            Literal::Positive(a) => self.contains(&a.substitute(binding)),
            Literal::Negative(a) => !self.contains(&a.substitute(binding)),
            Literal::Compare(c) => match c.evaluate(binding) {
                Some(holds) => holds,
                None => {
                    // `X = t` with X unbound
                    let sides = (c.left().substitute(binding), c.right().substitute(binding));
                    match sides {
                        (Term::Var(v), Term::Const(value)) | (Term::Const(value), Term::Var(v)) => {
                            binding.bind(v, value);
                            true
                        }
                        _ => false,
                    }
                }
            },
        }
    }

    fn solve(&self, conjunction: &[Literal]) -> Result<Vec<Binding>, KbError> {
        let positives: Vec<&Atom> = conjunction
            .iter()
            .filter_map(|l| match l {
                Literal::Positive(a) => Some(a),
                _ => None,
            })
            .collect();
        let mut pending: Vec<Literal> = conjunction
            .iter()
            .filter(|l| !matches!(l, Literal::Positive(_)))
            .cloned()
            .collect();

        let mut bound: HashSet<SubSymbol> = HashSet::new();
        let mut bindings = self.apply_filters(vec![Binding::new()], &mut pending, &mut bound);
        for atom in positives {
            bindings = self.join(bindings, atom);
            bound.extend(atom.vars().into_iter().cloned());
            bindings = self.apply_filters(bindings, &mut pending, &mut bound);
        }

        if let Some(unsafe_literal) = pending.first() {
            return Err(KbError::Unsafe(unsafe_literal.to_string()));
        }
        Ok(bindings)
    }
}

fn unify(pattern: &[Term], row: &[Constant], binding: &Binding) -> Option<Binding> {
    let mut extended = binding.clone();
    for (term, value) in pattern.iter().zip(row) {
        match term {
            Term::Const(c) => {
                if !same_value(c, value) {
                    return None;
                }
            }
            Term::Var(v) => match extended.get(v) {
                Some(existing) if !same_value(existing, value) => return None,
                Some(_) => {}
                None => extended.bind(v.clone(), value.clone()),
            },
        }
    }
    Some(extended)
}

/// A filter is ready once all its variables are bound, or when it is an
/// equality between one unbound variable and a bound side.
fn is_ready(literal: &Literal, bound: &HashSet<SubSymbol>) -> bool {
    let unbound: HashSet<&SubSymbol> = literal
        .vars()
        .into_iter()
        .filter(|v| !bound.contains(*v))
        .collect();
    match literal {
        _ if unbound.is_empty() => true,
        Literal::Compare(c) if c.operator() == CompareOp::Equal && unbound.len() == 1 => {
            let is_unbound_var = |t: &Term| t.as_var().is_some_and(|v| unbound.contains(v));
            is_unbound_var(c.left()) != is_unbound_var(c.right())
        }
        _ => false,
    }
}

impl LogKb for FactBase {
    fn ask(
        &self,
        selectors: &[SubSymbol],
        formula: &Formula,
        coefficient: Option<&Expr>,
    ) -> Result<Answers, KbError> {
        let vars = formula.vars();
        if let Some(missing) = selectors.iter().find(|s| !vars.contains(s)) {
            return Err(KbError::UnboundSelector(missing.to_string()));
        }

        let interpretation = KbInterpretation(self);
        let mut seen: HashSet<Tuple> = HashSet::new();
        let mut answers: Answers = Vec::new();
        for conjunction in formula.to_dnf() {
            for binding in self.solve(&conjunction)? {
                let mut row: Tuple = selectors
                    .iter()
                    .map(|s| {
                        binding
                            .get(s)
                            .cloned()
                            .ok_or_else(|| KbError::UnboundSelector(s.to_string()))
                    })
                    .collect::<Result<_, _>>()?;
                if let Some(expr) = coefficient {
                    row.push(Constant::Real(expr.evaluate(&interpretation, &binding)?));
                }
                if seen.insert(row.clone()) {
                    answers.push(row);
                }
            }
        }
        trace!("ask {formula} -> {} row(s)", answers.len());
        Ok(answers)
    }

    fn ask_fact(&self, atom: &Atom) -> Result<Option<f64>, KbError> {
        let args = atom
            .ground_arguments()
            .ok_or_else(|| KbError::NotGround(atom.to_string()))?;
        let Some(table) = self.tables.get(atom.name()) else {
            return Ok(None);
        };
        let matches: Vec<&Tuple> = table
            .matching(&args)
            .filter(|row| row.len() == args.len() + 1)
            .collect();
        match matches.as_slice() {
            [] => Ok(None),
            [row] => row
                .last()
                .and_then(Constant::as_f64)
                .map(Some)
                .ok_or_else(|| KbError::NonNumeric(atom.to_string())),
            _ => Err(KbError::Inconsistent {
                atom: atom.to_string(),
                count: matches.len(),
            }),
        }
    }
}
