//! The relational LP problem driver.
//!
//! An [`RlpProblem`] collects declarations into an [`ir::Model`], grounds it
//! with its [`Grounder`], solves the artifact with its [`LpSolver`], and
//! decodes the raw solution vector back into decision atoms.

use crate::error::RlpError;
use grounder::{ColumnMap, Grounded, Grounder};
use ir::{Atom, Constraint, Expr, Model, PredicateTemplate, Sense};
use itertools::Itertools;
use solver::{LpOutcome, LpSolver, SolveStatus};
use std::fmt;
use tracing::{debug, info};

/// Decision atom values of an optimal solution, in column order.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    objective: f64,
    values: Vec<(Atom, f64)>,
}

impl Solution {
    fn decode(columns: &ColumnMap, x: &[f64], objective: f64) -> Self {
        Self {
            objective,
            values: columns.atoms().zip(x.iter().copied()).collect(),
        }
    }

    /// Objective value in the problem's sense, without constant terms.
    #[must_use]
    #[inline]
    pub fn objective(&self) -> f64 {
        self.objective
    }

    #[must_use]
    pub fn get(&self, atom: &Atom) -> Option<f64> {
        self.values.iter().find(|(a, _)| a == atom).map(|(_, v)| *v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Atom, f64)> {
        self.values.iter().map(|(a, v)| (a, *v))
    }

    /// Values of one decision predicate.
    pub fn of<'a>(&'a self, name: &'a str) -> impl Iterator<Item = (&'a Atom, f64)> + 'a {
        self.iter().filter(move |(a, _)| a.name() == name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "objective = {}", self.objective)?;
        for (atom, value) in &self.values {
            writeln!(f, "  {atom} = {value}")?;
        }
        Ok(())
    }
}

struct Solved {
    grounded: Grounded,
    x: Vec<f64>,
    objective: f64,
}

/// A named relational LP with a fixed grounding and solving strategy.
pub struct RlpProblem<G, S> {
    name: String,
    model: Model,
    grounder: G,
    solver: S,
    solved: Option<Solved>,
    status: SolveStatus,
}

impl<G: Grounder, S: LpSolver> RlpProblem<G, S> {
    #[must_use]
    pub fn new(name: &str, sense: Sense, grounder: G, solver: S) -> Self {
        Self {
            name: name.to_string(),
            model: Model::new(sense),
            grounder,
            solver,
            solved: None,
            status: SolveStatus::Unsolved,
        }
    }

    #[must_use]
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    #[inline]
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Sets the objective; a problem has at most one.
    pub fn set_objective(&mut self, objective: Expr) -> Result<(), RlpError> {
        if self.model.objective.is_some() {
            return Err(RlpError::ObjectiveAlreadySet);
        }
        self.model.objective = Some(objective);
        Ok(())
    }

    pub fn add_constraint(&mut self, constraint: impl Into<Constraint>) {
        self.model.constraints.push(constraint.into());
    }

    /// Declares a decision predicate. Its columns follow those of every
    /// predicate declared before it.
    pub fn add_decision_variable(&mut self, template: PredicateTemplate) -> Result<(), RlpError> {
        if !template.is_decision() {
            return Err(RlpError::NotDecision(template.to_string()));
        }
        if self.model.decision_index(&template).is_some() {
            return Err(RlpError::DuplicateDecision(template.to_string()));
        }
        self.model.decision.push(template);
        Ok(())
    }

    /// Grounds the model and solves the resulting LP.
    ///
    /// Infeasible and unbounded problems are reported through the returned
    /// status; errors discard any previous solution.
    pub fn solve(&mut self) -> Result<SolveStatus, RlpError> {
        self.solved = None;
        self.status = SolveStatus::Unsolved;
        info!("Grounding '{}' with the {} grounder", self.name, self.grounder.name());
        let grounded = self.grounder.ground(&self.model)?;
        let outcome = self.solver.solve(&grounded.artifact)?;
        self.status = outcome.status();
        info!("Problem '{}' is {}", self.name, self.status);
        if let LpOutcome::Optimal { x, objective } = outcome {
            let objective = self.model.sense.factor() * objective;
            debug!("objective = {objective}");
            self.solved = Some(Solved {
                grounded,
                x,
                objective,
            });
        }
        Ok(self.status)
    }

    #[must_use]
    #[inline]
    pub fn status(&self) -> SolveStatus {
        self.status
    }

    /// Decodes the last optimal solution.
    #[must_use]
    pub fn solution(&self) -> Option<Solution> {
        self.solved
            .as_ref()
            .map(|s| Solution::decode(&s.grounded.columns, &s.x, s.objective))
    }

    /// Artifact and column map of the last optimal solve.
    #[must_use]
    pub fn grounded(&self) -> Option<&Grounded> {
        self.solved.as_ref().map(|s| &s.grounded)
    }

    /// Grounds the model without solving.
    pub fn ground(&self) -> Result<Grounded, RlpError> {
        Ok(self.grounder.ground(&self.model)?)
    }
}

impl<G, S> fmt::Display for RlpProblem<G, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "problem {}", self.name)?;
        writeln!(
            f,
            "  decision: {}",
            self.model.decision.iter().map(|t| t.to_string()).join(", ")
        )?;
        match &self.model.objective {
            Some(objective) => writeln!(f, "  {} {objective}", self.model.sense)?,
            None => writeln!(f, "  {} 0", self.model.sense)?,
        }
        writeln!(f, "  subject to")?;
        for constraint in &self.model.constraints {
            writeln!(f, "    {constraint}")?;
        }
        Ok(())
    }
}
