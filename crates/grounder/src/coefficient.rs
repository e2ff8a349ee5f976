//! Splitting a normalized summand into its decision atom and a coefficient
//! that the knowledge base can evaluate.
//!
//! Every non-decision numeric atom `p(args)` of the summand is replaced by a
//! fresh value symbol `__vN` and the boolean atom `p(args, __vN)` joins the
//! summand's query, so one bulk `ask` returns the coefficient of every row.

use crate::error::GroundError;
use ir::{Atom, Expr, Factor, Formula, Query, SubSymbol, Summand, Term};

/// Prefix of the value symbols introduced for numeric facts.
pub const VALUE_PREFIX: &str = "__v";

/// A summand ready for one bulk query.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitSummand {
    /// The summand's decision atom, if any.
    pub decision: Option<Atom>,
    /// The summand's own query extended with one value atom per numeric fact.
    pub query: Query,
    /// The summand's query alone, used to check that every fact resolved.
    pub base: Query,
    /// Constant times value symbols and bound symbols.
    pub coefficient: Expr,
    /// Number of value atoms added to `query`.
    pub value_atoms: usize,
}

/// Allocates value symbols unique within one grounding pass.
#[derive(Debug, Default)]
pub struct ValueSymbols {
    next: usize,
}

impl ValueSymbols {
    pub fn fresh(&mut self) -> SubSymbol {
        let symbol = SubSymbol::new(&format!("{VALUE_PREFIX}{}", self.next));
        self.next += 1;
        symbol
    }
}

pub fn split(summand: &Summand, symbols: &mut ValueSymbols) -> Result<SplitSummand, GroundError> {
    let base = summand.query().cloned().unwrap_or_else(Query::always);

    let mut value_atoms: Vec<Formula> = Vec::new();
    let mut factors: Vec<Expr> = vec![Expr::Constant(summand.coefficient())];
    for factor in summand.coefficient_factors() {
        match factor {
            Factor::Symbol(s) => factors.push(Expr::Symbol(s.clone())),
            Factor::Atom(atom) => {
                let value = symbols.fresh();
                let relation = atom.template().value_relation();
                value_atoms.push(Formula::Atom(
                    atom.with_extra_argument(&relation, Term::Var(value.clone())),
                ));
                factors.push(Expr::Symbol(value));
            }
        }
    }

    let coefficient = if factors.len() == 1 {
        factors.remove(0)
    } else {
        Expr::Mul(factors)
    };
    let count = value_atoms.len();
    let query = if value_atoms.is_empty() {
        base.clone()
    } else {
        let extra = Query::new(Vec::new(), Formula::and(value_atoms));
        base.conjoin(&extra)
    };

    Ok(SplitSummand {
        decision: summand.decision_atom().cloned(),
        query,
        base,
        coefficient,
        value_atoms: count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ir::{summands, PredicateTemplate};

    #[test]
    fn numeric_atoms_become_value_symbols() {
        let flow = PredicateTemplate::decision("flow", 2).unwrap();
        let cost = PredicateTemplate::numeric("cost", 2);
        let args = || vec![Term::var("X"), Term::var("Y")];
        let q = Query::parse(&["Y"], "edge(X, Y)").unwrap();
        let e = Expr::sum(
            q,
            Expr::mul(vec![
                Expr::constant(2.0),
                Expr::atom(Atom::new(&cost, args()).unwrap()),
                Expr::atom(Atom::new(&flow, args()).unwrap()),
            ]),
        );
        let parts = summands(&e).unwrap();
        let mut symbols = ValueSymbols::default();
        let split = split(&parts[0], &mut symbols).unwrap();

        assert_eq!(split.decision.unwrap().to_string(), "flow(X, Y)");
        assert_eq!(split.coefficient.to_string(), "2 * __v0");
        assert_eq!(split.query.to_string(), "{Y | edge(X, Y) & cost(X, Y, __v0)}");
        assert_eq!(split.base.to_string(), "{Y | edge(X, Y)}");
        assert_eq!(split.value_atoms, 1);
        assert_eq!(symbols.fresh(), SubSymbol::new("__v1"));
    }

    #[test]
    fn constant_summand_keeps_plain_coefficient() {
        let parts = summands(&Expr::constant(-4.0)).unwrap();
        let split = split(&parts[0], &mut ValueSymbols::default()).unwrap();
        assert!(split.decision.is_none());
        assert_eq!(split.coefficient, Expr::Constant(-4.0));
        assert!(split.query.is_trivial());
    }
}
