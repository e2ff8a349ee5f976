//! Block grounding: one bulk knowledge base query per summand.
//!
//! For every constraint (and the objective, as a single row with an
//! always-true query) the canonical expression `e <= 0` / `e = 0` is
//! normalized and each summand is asked for all of its rows at once. Row ids
//! are keyed by the constraint's own symbols and column ids by the decision
//! atom's arguments; entries sharing `(row, col)` are summed.

use crate::artifact::OrderedIndex;
use crate::coefficient::{split, SplitSummand, ValueSymbols};
use crate::context::{GroundingContext, Row};
use crate::error::GroundError;
use crate::{Grounded, Grounder};
use ir::{summands, Binding, Constant, Constraint, Expr, Model, Query};
use logkb::{LogKb, Tuple};
use std::collections::HashSet;
use tracing::{debug, trace};

/// Grounds by bulk queries against `K`.
#[derive(Debug, Clone)]
pub struct BlockGrounder<K> {
    kb: K,
}

impl<K: LogKb> BlockGrounder<K> {
    #[must_use]
    pub fn new(kb: K) -> Self {
        Self { kb }
    }

    #[must_use]
    pub fn kb(&self) -> &K {
        &self.kb
    }

    /// Answers of one split summand under `outer`, as `(selectors, value)` rows.
    fn rows(
        &self,
        outer: &Query,
        summand: &SplitSummand,
    ) -> Result<(Query, Vec<(Tuple, f64)>), GroundError> {
        let query = outer.conjoin(&summand.query);
        let answers = self
            .kb
            .ask(query.symbols(), query.formula(), Some(&summand.coefficient))?;

        let mut rows = Vec::with_capacity(answers.len());
        for mut answer in answers {
            let value = answer
                .pop()
                .and_then(|c| c.as_f64())
                .ok_or_else(|| GroundError::Resolution(format!("coefficient {}", summand.coefficient)))?;
            rows.push((answer, value));
        }

        if summand.value_atoms > 0 {
            self.check_resolved(outer, summand, &rows)?;
        }
        Ok((query, rows))
    }

    /// Every row of the summand without its value atoms must get exactly one
    /// coefficient.
    fn check_resolved(
        &self,
        outer: &Query,
        summand: &SplitSummand,
        rows: &[(Tuple, f64)],
    ) -> Result<(), GroundError> {
        let mut keys: HashSet<&Tuple> = HashSet::with_capacity(rows.len());
        if let Some((key, _)) = rows.iter().find(|(key, _)| !keys.insert(key)) {
            return Err(GroundError::Resolution(format!(
                "coefficient {} at {} has more than one value",
                summand.coefficient,
                render_tuple(key)
            )));
        }
        let base = outer.conjoin(&summand.base);
        let expected = self.kb.ask(base.symbols(), base.formula(), None)?.len();
        if expected != rows.len() {
            return Err(GroundError::Resolution(format!(
                "coefficient {}: {} of {expected} row(s) have no value",
                summand.coefficient,
                expected.saturating_sub(rows.len())
            )));
        }
        Ok(())
    }

    fn ground_constraint(
        &self,
        ctx: &mut GroundingContext<'_>,
        symbols: &mut ValueSymbols,
        constraint: &Constraint,
    ) -> Result<(), GroundError> {
        let relation = constraint.relation();
        let outer = constraint.query().cloned().unwrap_or_else(Query::always);
        let width = outer.symbols().len();
        let mut scope = outer.symbols().to_vec();
        scope.extend(outer.formula().vars());

        let mut row_ids: OrderedIndex<Tuple> = OrderedIndex::new();
        let mut block: Vec<Row> = Vec::new();
        for (i, summand) in summands(&relation.canonical())?.iter().enumerate() {
            let split = split(&summand.rename_apart(&scope), symbols)?;
            let (query, rows) = self.rows(&outer, &split)?;
            trace!("summand {i} of '{constraint}': {} row(s)", rows.len());
            for (answer, value) in rows {
                let id = row_ids.insert(answer[..width].to_vec());
                if id == block.len() {
                    block.push(Row::default());
                }
                match &split.decision {
                    Some(atom) => {
                        let binding = Binding::from_answer(query.symbols(), &answer);
                        let column = ctx.column(&atom.substitute(&binding))?;
                        block[id].add(column, value);
                    }
                    None => block[id].constant += value,
                }
            }
        }

        let mut kept = 0;
        for row in block {
            if ctx.push_row(relation.kind(), row, constraint)? {
                kept += 1;
            }
        }
        debug!("'{constraint}' grounded to {kept} row(s)");
        Ok(())
    }

    fn ground_objective(
        &self,
        ctx: &mut GroundingContext<'_>,
        symbols: &mut ValueSymbols,
        objective: &Expr,
    ) -> Result<(), GroundError> {
        let outer = Query::always();
        for summand in summands(objective)? {
            let split = split(&summand, symbols)?;
            let (query, rows) = self.rows(&outer, &split)?;
            // constant terms are resolved but stay out of `c`
            let Some(atom) = &split.decision else {
                continue;
            };
            for (answer, value) in rows {
                let binding = Binding::from_answer(query.symbols(), &answer);
                let column = ctx.column(&atom.substitute(&binding))?;
                ctx.add_objective(column, value);
            }
        }
        Ok(())
    }
}

fn render_tuple(tuple: &[Constant]) -> String {
    let cells: Vec<String> = tuple.iter().map(ToString::to_string).collect();
    format!("({})", cells.join(", "))
}

impl<K: LogKb> Grounder for BlockGrounder<K> {
    fn ground(&self, model: &Model) -> Result<Grounded, GroundError> {
        let mut ctx = GroundingContext::new(model);
        let mut symbols = ValueSymbols::default();
        if let Some(objective) = &model.objective {
            self.ground_objective(&mut ctx, &mut symbols, objective)?;
        }
        for constraint in &model.constraints {
            self.ground_constraint(&mut ctx, &mut symbols, constraint)?;
        }
        Ok(ctx.finish())
    }

    fn name(&self) -> &'static str {
        "block"
    }
}
