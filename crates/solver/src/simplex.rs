//! Dense two-phase tableau simplex.
//!
//! Every free column `x` is split into `x⁺ − x⁻`, every inequality row gets a
//! slack, and every row gets an artificial variable so that phase 1 starts
//! from the identity basis. Bland's rule picks both the entering and the
//! leaving variable, which rules out cycling on degenerate vertices.
//!
//! # Example
//! ```
//! use grounder::{LpArtifact, SparseMatrix};
//! use solver::{DenseSimplex, LpOutcome, LpSolver};
//!
//! // min -x  s.t.  x <= 2
//! let lp = LpArtifact {
//!     c: vec![-1.0],
//!     g: SparseMatrix::from_triplets(1, 1, vec![(0, 0, 1.0)]),
//!     h: vec![2.0],
//!     a: SparseMatrix::zeros(0, 1),
//!     b: vec![],
//! };
//! let outcome = DenseSimplex::default().solve(&lp).unwrap();
//! assert!(matches!(outcome, LpOutcome::Optimal { objective, .. } if (objective + 2.0).abs() < 1e-9));
//! ```

use crate::{validate, LpOutcome, LpSolver, SolveStatus, SolverError, SolverOptions};
use grounder::LpArtifact;
use tracing::{debug, trace};

#[derive(Debug, Default)]
pub struct DenseSimplex {
    options: SolverOptions,
    status: SolveStatus,
}

impl DenseSimplex {
    #[must_use]
    pub fn new(options: SolverOptions) -> Self {
        Self {
            options,
            status: SolveStatus::Unsolved,
        }
    }

    #[must_use]
    #[inline]
    pub fn options(&self) -> &SolverOptions {
        &self.options
    }
}

impl LpSolver for DenseSimplex {
    fn solve(&mut self, lp: &LpArtifact) -> Result<LpOutcome, SolverError> {
        self.status = SolveStatus::Unsolved;
        validate(lp)?;
        let outcome = Tableau::build(lp).run(&self.options)?;
        let outcome = match outcome {
            Phase::Optimal(values) => {
                let n = lp.num_columns();
                let x: Vec<f64> = (0..n).map(|j| values[j] - values[n + j]).collect();
                let objective = lp.objective(&x);
                LpOutcome::Optimal { x, objective }
            }
            Phase::Infeasible => LpOutcome::Infeasible,
            Phase::Unbounded => LpOutcome::Unbounded,
        };
        self.status = outcome.status();
        debug!("Dense simplex finished: {}", self.status);
        Ok(outcome)
    }

    fn status(&self) -> SolveStatus {
        self.status
    }
}

enum Phase {
    /// Values of the structural variables (`x⁺`, `x⁻`, slacks).
    Optimal(Vec<f64>),
    Infeasible,
    Unbounded,
}

enum Step {
    Optimal,
    Unbounded,
}

/// `rows` holds `[coefficients | rhs]`; `cost` holds reduced costs with the
/// negated objective value in its last cell.
struct Tableau {
    rows: Vec<Vec<f64>>,
    cost: Vec<f64>,
    basis: Vec<usize>,
    /// Objective of the original problem over the structural variables.
    objective: Vec<f64>,
    /// Number of structural variables; artificials follow.
    structural: usize,
    iterations: usize,
}

impl Tableau {
    fn build(lp: &LpArtifact) -> Self {
        let n = lp.num_columns();
        let m_g = lp.num_inequalities();
        let m = m_g + lp.num_equalities();
        let structural = 2 * n + m_g;
        let width = structural + m + 1;

        let mut rows = vec![vec![0.0; width]; m];
        for (i, j, v) in lp.g.iter() {
            rows[i][j] = v;
            rows[i][n + j] = -v;
        }
        for (i, j, v) in lp.a.iter() {
            rows[m_g + i][j] = v;
            rows[m_g + i][n + j] = -v;
        }
        for (i, row) in rows.iter_mut().enumerate() {
            if i < m_g {
                row[2 * n + i] = 1.0;
            }
            row[width - 1] = if i < m_g { lp.h[i] } else { lp.b[i - m_g] };
            if row[width - 1] < 0.0 {
                row.iter_mut().for_each(|v| *v = -*v);
            }
            row[structural + i] = 1.0;
        }

        let mut objective = vec![0.0; structural];
        for (j, c) in lp.c.iter().enumerate() {
            objective[j] = *c;
            objective[n + j] = -c;
        }

        Self {
            rows,
            cost: vec![0.0; width],
            basis: (structural..structural + m).collect(),
            objective,
            structural,
            iterations: 0,
        }
    }

    fn width(&self) -> usize {
        self.structural + self.rows.len() + 1
    }

    /// Loads `costs` as the objective and prices out the current basis.
    fn price(&mut self, costs: &[f64]) {
        let width = self.width();
        self.cost = vec![0.0; width];
        self.cost[..costs.len()].copy_from_slice(costs);
        for (i, &b) in self.basis.iter().enumerate() {
            let factor = self.cost[b];
            if factor != 0.0 {
                for (c, r) in self.cost.iter_mut().zip(&self.rows[i]) {
                    *c -= factor * r;
                }
            }
        }
    }

    fn pivot(&mut self, row: usize, col: usize) {
        let p = self.rows[row][col];
        self.rows[row].iter_mut().for_each(|v| *v /= p);
        let pivot_row = self.rows[row].clone();
        for (i, r) in self.rows.iter_mut().enumerate() {
            if i == row || r[col] == 0.0 {
                continue;
            }
            let factor = r[col];
            for (v, pv) in r.iter_mut().zip(&pivot_row) {
                *v -= factor * pv;
            }
        }
        let factor = self.cost[col];
        if factor != 0.0 {
            for (v, pv) in self.cost.iter_mut().zip(&pivot_row) {
                *v -= factor * pv;
            }
        }
        self.basis[row] = col;
    }

    /// Pivots until no column below `allowed` has a negative reduced cost.
    fn optimize(&mut self, allowed: usize, options: &SolverOptions) -> Result<Step, SolverError> {
        let tol = options.tolerance;
        let rhs = self.width() - 1;
        loop {
            let Some(entering) = (0..allowed).find(|&j| self.cost[j] < -tol) else {
                return Ok(Step::Optimal);
            };
            let mut leaving: Option<(usize, f64)> = None;
            for (i, r) in self.rows.iter().enumerate() {
                if r[entering] <= tol {
                    continue;
                }
                let ratio = r[rhs] / r[entering];
                leaving = match leaving {
                    Some((best, best_ratio))
                        if ratio > best_ratio + tol
                            || ((ratio - best_ratio).abs() <= tol
                                && self.basis[i] > self.basis[best]) =>
                    {
                        Some((best, best_ratio))
                    }
                    _ => Some((i, ratio)),
                };
            }
            let Some((row, _)) = leaving else {
                return Ok(Step::Unbounded);
            };
            if self.iterations >= options.max_iterations {
                return Err(SolverError::IterationLimit(options.max_iterations));
            }
            self.iterations += 1;
            trace!("Pivot {}: column {entering} enters at row {row}", self.iterations);
            self.pivot(row, entering);
        }
    }

    fn run(mut self, options: &SolverOptions) -> Result<Phase, SolverError> {
        let width = self.width();
        let rhs = width - 1;

        let mut phase_one = vec![0.0; width - 1];
        phase_one[self.structural..].iter_mut().for_each(|c| *c = 1.0);
        self.price(&phase_one);
        self.optimize(width - 1, options)?;
        let infeasibility = -self.cost[rhs];
        let scale = 1.0 + self.rows.iter().map(|r| r[rhs].abs()).sum::<f64>();
        if infeasibility > options.tolerance * scale.max(1.0) * 1e3 {
            debug!("Phase 1 ended with infeasibility {infeasibility}");
            return Ok(Phase::Infeasible);
        }

        // Drive zero-valued artificials out of the basis; rows where that is
        // impossible are redundant and keep their artificial at zero.
        for i in 0..self.rows.len() {
            if self.basis[i] < self.structural {
                continue;
            }
            if let Some(j) = (0..self.structural).find(|&j| self.rows[i][j].abs() > options.tolerance)
            {
                self.pivot(i, j);
            }
        }

        let objective = self.objective.clone();
        self.price(&objective);
        if let Step::Unbounded = self.optimize(self.structural, options)? {
            return Ok(Phase::Unbounded);
        }
        debug!("Simplex converged after {} pivot(s)", self.iterations);

        let mut values = vec![0.0; self.structural];
        for (i, &b) in self.basis.iter().enumerate() {
            if b < self.structural {
                values[b] = self.rows[i][rhs];
            }
        }
        Ok(Phase::Optimal(values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grounder::SparseMatrix;

    fn lp(
        c: Vec<f64>,
        g: Vec<(usize, usize, f64)>,
        h: Vec<f64>,
        a: Vec<(usize, usize, f64)>,
        b: Vec<f64>,
    ) -> LpArtifact {
        let n = c.len();
        LpArtifact {
            g: SparseMatrix::from_triplets(h.len(), n, g),
            a: SparseMatrix::from_triplets(b.len(), n, a),
            c,
            h,
            b,
        }
    }

    fn optimum(outcome: &LpOutcome) -> (Vec<f64>, f64) {
        match outcome {
            LpOutcome::Optimal { x, objective } => (x.clone(), *objective),
            other => panic!("expected an optimum, got {other:?}"),
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-7
    }

    #[test]
    fn small_flow_network() {
        // columns: flow(a,t), flow(s,t), flow(s,a)
        let flow = lp(
            vec![-1.0, -1.0, 0.0],
            vec![(0, 2, 1.0), (1, 0, 1.0), (2, 1, 1.0)],
            vec![4.0, 3.0, 2.0],
            vec![(0, 0, -1.0), (0, 2, 1.0)],
            vec![0.0],
        );
        let mut solver = DenseSimplex::default();
        assert_eq!(solver.status(), SolveStatus::Unsolved);
        let outcome = solver.solve(&flow).unwrap();
        let (x, objective) = optimum(&outcome);
        assert!(close(objective, -5.0));
        assert!(close(x[0], 3.0) && close(x[1], 2.0) && close(x[2], 3.0));
        assert!(flow.is_feasible(&x, 1e-7));
        assert_eq!(solver.status(), SolveStatus::Optimal);
    }

    #[test]
    fn free_columns_go_negative() {
        // min x  s.t.  -x <= 5
        let p = lp(vec![1.0], vec![(0, 0, -1.0)], vec![5.0], vec![], vec![]);
        let (x, objective) = optimum(&DenseSimplex::default().solve(&p).unwrap());
        assert!(close(x[0], -5.0));
        assert!(close(objective, -5.0));
    }

    #[test]
    fn redundant_equalities() {
        // min x + 2y  s.t.  x + y = 2, 2x + 2y = 4, x >= 0, y >= 0
        let p = lp(
            vec![1.0, 2.0],
            vec![(0, 0, -1.0), (1, 1, -1.0)],
            vec![0.0, 0.0],
            vec![(0, 0, 1.0), (0, 1, 1.0), (1, 0, 2.0), (1, 1, 2.0)],
            vec![2.0, 4.0],
        );
        let (x, objective) = optimum(&DenseSimplex::default().solve(&p).unwrap());
        assert!(close(objective, 2.0));
        assert!(close(x[0], 2.0) && close(x[1], 0.0));
    }

    #[test]
    fn infeasible_bounds() {
        // x <= 1 and x >= 2
        let p = lp(
            vec![0.0],
            vec![(0, 0, 1.0), (1, 0, -1.0)],
            vec![1.0, -2.0],
            vec![],
            vec![],
        );
        let mut solver = DenseSimplex::default();
        assert_eq!(solver.solve(&p).unwrap(), LpOutcome::Infeasible);
        assert_eq!(solver.status(), SolveStatus::Infeasible);
    }

    #[test]
    fn unbounded_direction() {
        // min -x  s.t.  x >= 0
        let p = lp(vec![-1.0], vec![(0, 0, -1.0)], vec![0.0], vec![], vec![]);
        let mut solver = DenseSimplex::default();
        assert_eq!(solver.solve(&p).unwrap(), LpOutcome::Unbounded);
        assert_eq!(solver.status().to_string(), "unbounded");
    }

    #[test]
    fn empty_problem_is_optimal_at_zero() {
        let p = lp(vec![0.0, 0.0], vec![], vec![], vec![], vec![]);
        let (x, objective) = optimum(&DenseSimplex::default().solve(&p).unwrap());
        assert_eq!(x, vec![0.0, 0.0]);
        assert_eq!(objective, 0.0);
    }

    #[test]
    fn mismatched_dimensions_are_rejected() {
        let mut p = lp(vec![1.0], vec![(0, 0, 1.0)], vec![1.0], vec![], vec![]);
        p.h.push(2.0);
        let err = DenseSimplex::default().solve(&p).unwrap_err();
        assert_eq!(
            err,
            SolverError::Dimension {
                what: "h",
                expected: 1,
                found: 2
            }
        );
    }

    #[test]
    fn iteration_limit() {
        let p = lp(
            vec![-1.0, -1.0],
            vec![(0, 0, 1.0), (1, 1, 1.0)],
            vec![1.0, 1.0],
            vec![],
            vec![],
        );
        let mut solver = DenseSimplex::new(SolverOptions {
            max_iterations: 0,
            ..SolverOptions::default()
        });
        assert_eq!(solver.solve(&p), Err(SolverError::IterationLimit(0)));
        assert_eq!(solver.status(), SolveStatus::Unsolved);
    }
}
