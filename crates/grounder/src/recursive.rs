//! Recursive grounding: substitute each answer into the expression tree.
//!
//! Every `ForAll` answer yields one relation instance, even when two answers
//! produce identical instances. Each instance is normalized, nested sums are
//! expanded by asking their (substituted) queries, and the result is
//! accumulated into an affine row. Non-decision atoms resolve through
//! [`LogKb::ask_fact`].

use crate::context::{GroundingContext, Row};
use crate::error::GroundError;
use crate::{Grounded, Grounder};
use ir::{summands, Binding, Constraint, Expr, Factor, Model, Summand};
use logkb::LogKb;
use tracing::{debug, trace};

/// Grounds by instantiating relations one answer at a time.
#[derive(Debug, Clone)]
pub struct RecursiveGrounder<K> {
    kb: K,
}

impl<K: LogKb> RecursiveGrounder<K> {
    #[must_use]
    pub fn new(kb: K) -> Self {
        Self { kb }
    }

    #[must_use]
    pub fn kb(&self) -> &K {
        &self.kb
    }

    /// Bindings of every instance of `constraint`.
    fn instances(&self, constraint: &Constraint) -> Result<Vec<Binding>, GroundError> {
        let Some(query) = constraint.query() else {
            return Ok(vec![Binding::new()]);
        };
        let answers = self.kb.ask(query.symbols(), query.formula(), None)?;
        Ok(answers
            .iter()
            .map(|tuple| Binding::from_answer(query.symbols(), tuple))
            .collect())
    }

    /// The affine form of a ground expression.
    fn affine(&self, ctx: &mut GroundingContext<'_>, expr: &Expr) -> Result<Row, GroundError> {
        let mut row = Row::default();
        for summand in summands(expr)? {
            match summand.query() {
                None => self.accumulate(ctx, &mut row, &summand, &Binding::new())?,
                Some(query) => {
                    let answers = self.kb.ask(query.symbols(), query.formula(), None)?;
                    trace!("expanding {query}: {} answer(s)", answers.len());
                    for tuple in &answers {
                        let binding = Binding::from_answer(query.symbols(), tuple);
                        self.accumulate(ctx, &mut row, &summand, &binding)?;
                    }
                }
            }
        }
        Ok(row)
    }

    /// Adds `coefficient · factors` of one summand instance to `row`.
    fn accumulate(
        &self,
        ctx: &mut GroundingContext<'_>,
        row: &mut Row,
        summand: &Summand,
        binding: &Binding,
    ) -> Result<(), GroundError> {
        let mut value = summand.coefficient();
        for factor in summand.coefficient_factors() {
            value *= match factor {
                Factor::Symbol(s) => binding
                    .get(s)
                    .and_then(|c| c.as_f64())
                    .ok_or_else(|| GroundError::Resolution(format!("symbol '{s}'")))?,
                Factor::Atom(atom) => {
                    let ground = atom.substitute(binding);
                    if !ground.is_ground() {
                        return Err(GroundError::Resolution(format!("unbound fact '{ground}'")));
                    }
                    self.kb
                        .ask_fact(&ground)?
                        .ok_or_else(|| GroundError::UndefinedFact(ground.to_string()))?
                }
            };
        }
        match summand.decision_atom() {
            Some(atom) => {
                let column = ctx.column(&atom.substitute(binding))?;
                row.add(column, value);
            }
            None => row.constant += value,
        }
        Ok(())
    }
}

impl<K: LogKb> Grounder for RecursiveGrounder<K> {
    fn ground(&self, model: &Model) -> Result<Grounded, GroundError> {
        let mut ctx = GroundingContext::new(model);

        if let Some(objective) = &model.objective {
            let row = self.affine(&mut ctx, objective)?;
            for (column, value) in row.entries {
                ctx.add_objective(column, value);
            }
        }

        for constraint in &model.constraints {
            let relation = constraint.relation();
            let canonical = relation.canonical();
            let instances = self.instances(constraint)?;
            let mut kept = 0;
            for binding in &instances {
                let row = self.affine(&mut ctx, &canonical.substitute(binding))?;
                if ctx.push_row(relation.kind(), row, constraint)? {
                    kept += 1;
                }
            }
            debug!(
                "'{constraint}': {} instance(s), {kept} row(s)",
                instances.len()
            );
        }
        Ok(ctx.finish())
    }

    fn name(&self) -> &'static str {
        "recursive"
    }
}
