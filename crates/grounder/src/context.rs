//! Per-call grounding state.
//!
//! A [`GroundingContext`] is created at the start of every `ground()` call and
//! consumed by [`GroundingContext::finish`]; nothing survives between calls.

use crate::artifact::{ColumnMap, LpArtifact, OrderedIndex, SparseMatrix};
use crate::error::GroundError;
use crate::Grounded;
use ir::{Atom, Constant, Model, RelationKind};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Values at or below this magnitude count as zero in decision-free rows.
pub const ZERO_TOLERANCE: f64 = 1e-9;

/// `(template position, position within the template)`.
pub type ColumnKey = (usize, usize);

/// One grounded row: `Σ entries · x + constant  (<= | =)  0`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    pub entries: BTreeMap<ColumnKey, f64>,
    pub constant: f64,
}

impl Row {
    pub fn add(&mut self, column: ColumnKey, value: f64) {
        *self.entries.entry(column).or_insert(0.0) += value;
    }

    /// Whether any decision variable has a nonzero coefficient.
    #[must_use]
    pub fn has_decisions(&self) -> bool {
        self.entries.values().any(|v| *v != 0.0)
    }
}

/// Column maps and finished rows of one grounding pass.
pub struct GroundingContext<'m> {
    model: &'m Model,
    columns: Vec<OrderedIndex<Vec<Constant>>>,
    objective: BTreeMap<ColumnKey, f64>,
    inequalities: Vec<Row>,
    equalities: Vec<Row>,
    dropped: usize,
}

impl<'m> GroundingContext<'m> {
    #[must_use]
    pub fn new(model: &'m Model) -> Self {
        Self {
            model,
            columns: vec![OrderedIndex::new(); model.decision.len()],
            objective: BTreeMap::new(),
            inequalities: Vec::new(),
            equalities: Vec::new(),
            dropped: 0,
        }
    }

    #[must_use]
    pub fn model(&self) -> &'m Model {
        self.model
    }

    /// Column of a ground decision atom, assigned on first sight.
    pub fn column(&mut self, atom: &Atom) -> Result<ColumnKey, GroundError> {
        let template = self
            .model
            .decision_index(atom.template())
            .ok_or_else(|| GroundError::UndeclaredDecision(atom.template().to_string()))?;
        let tuple = atom
            .ground_arguments()
            .ok_or_else(|| GroundError::Resolution(format!("unbound decision variable '{atom}'")))?;
        Ok((template, self.columns[template].insert(tuple)))
    }

    pub fn add_objective(&mut self, column: ColumnKey, value: f64) {
        *self.objective.entry(column).or_insert(0.0) += value;
    }

    /// Adds a finished row of `constraint`.
    ///
    /// A row without decision variables is dropped when it holds and makes
    /// the model infeasible otherwise. Returns whether the row was kept.
    pub fn push_row(
        &mut self,
        kind: RelationKind,
        row: Row,
        constraint: &dyn std::fmt::Display,
    ) -> Result<bool, GroundError> {
        if !row.has_decisions() {
            let holds = match kind {
                RelationKind::Eq => row.constant.abs() <= ZERO_TOLERANCE,
                RelationKind::Le | RelationKind::Ge => row.constant <= ZERO_TOLERANCE,
            };
            if !holds {
                return Err(GroundError::Infeasible(constraint.to_string()));
            }
            self.dropped += 1;
            return Ok(false);
        }
        match kind {
            RelationKind::Eq => self.equalities.push(row),
            RelationKind::Le | RelationKind::Ge => self.inequalities.push(row),
        }
        Ok(true)
    }

    /// Assembles `(c, G, h, A, b)` with columns laid out by template in
    /// declaration order. The objective is scaled by the sense factor.
    #[must_use]
    pub fn finish(self) -> Grounded {
        let offsets: Vec<usize> = self
            .columns
            .iter()
            .scan(0, |acc, idx| {
                let offset = *acc;
                *acc += idx.len();
                Some(offset)
            })
            .collect();
        let n: usize = self.columns.iter().map(OrderedIndex::len).sum();
        let global = |(t, j): ColumnKey| offsets[t] + j;

        let mut c = vec![0.0; n];
        let factor = self.model.sense.factor();
        for (&key, &v) in &self.objective {
            c[global(key)] += factor * v;
        }

        let assemble = |rows: &[Row]| {
            let m = SparseMatrix::from_triplets(
                rows.len(),
                n,
                rows.iter().enumerate().flat_map(|(i, row)| {
                    row.entries.iter().map(move |(&key, &v)| (i, global(key), v))
                }),
            );
            let rhs = rows.iter().map(|row| -row.constant).collect();
            (m, rhs)
        };
        let (g, h) = assemble(&self.inequalities);
        let (a, b) = assemble(&self.equalities);

        let artifact = LpArtifact { c, g, h, a, b };
        debug!("dropped {} decision-free row(s)", self.dropped);
        info!("{artifact}");
        let columns = ColumnMap::new(self.model.decision.iter().cloned().zip(self.columns).collect());
        Grounded { artifact, columns }
    }
}
