//! Reduction of an LP through a row/column partition, and expansion back.

use crate::error::LiftError;
use crate::incidence::ColoredIncidence;
use crate::partition::{AutomorphismOracle, ColorRefinement, Partition};
use grounder::{LpArtifact, SparseMatrix};
use solver::{LpOutcome, LpSolver, SolveStatus, SolverError};
use tracing::info;

/// A reduced LP together with the 0/1 lift matrix `B` (`n × k`).
#[derive(Debug, Clone, PartialEq)]
pub struct LiftedLp {
    pub reduced: LpArtifact,
    pub basis: SparseMatrix,
}

impl LiftedLp {
    /// Broadcasts a reduced solution to every column of its class: `x = B·y`.
    #[must_use]
    pub fn expand(&self, y: &[f64]) -> Vec<f64> {
        self.basis.mul_vec(y)
    }
}

fn check_size(what: &'static str, expected: usize, found: usize) -> Result<(), LiftError> {
    if expected == found {
        Ok(())
    } else {
        Err(LiftError::PartitionSize {
            what,
            expected,
            found,
        })
    }
}

/// Keeps the first row of every class, in original order.
fn representatives(classes: &[usize], range: std::ops::Range<usize>) -> Vec<usize> {
    let mut seen = vec![false; classes.iter().max().map_or(0, |m| m + 1)];
    range
        .filter(|&i| !std::mem::replace(&mut seen[classes[i]], true))
        .collect()
}

/// Reduces `lp` with the partition computed by `oracle`.
pub fn lift<O: AutomorphismOracle + ?Sized>(
    lp: &LpArtifact,
    oracle: &O,
) -> Result<LiftedLp, LiftError> {
    let incidence = ColoredIncidence::from_artifact(lp);
    let partition = oracle.partition(&incidence)?;
    lift_with(lp, &partition)
}

/// Reduces `lp` with a given partition.
pub fn lift_with(lp: &LpArtifact, partition: &Partition) -> Result<LiftedLp, LiftError> {
    let m_g = lp.num_inequalities();
    let m = m_g + lp.num_equalities();
    let n = lp.num_columns();
    check_size("rows", m, partition.row_classes().len())?;
    check_size("columns", n, partition.col_classes().len())?;

    let rows = partition.row_classes();
    for i in 0..m_g {
        if rows[m_g..].contains(&rows[i]) {
            return Err(LiftError::MixedRowClass(rows[i]));
        }
    }

    let g_rows = representatives(rows, 0..m_g);
    let a_rows = representatives(rows, m_g..m)
        .into_iter()
        .map(|i| i - m_g)
        .collect::<Vec<_>>();

    let cols = partition.col_classes();
    let k = partition.num_col_classes();
    let mut c = vec![0.0; k];
    for (j, class) in cols.iter().enumerate() {
        c[*class] += lp.c[j];
    }

    let reduced = LpArtifact {
        c,
        g: lp.g.select_rows(&g_rows).merge_columns(cols, k),
        h: g_rows.iter().map(|i| lp.h[*i]).collect(),
        a: lp.a.select_rows(&a_rows).merge_columns(cols, k),
        b: a_rows.iter().map(|i| lp.b[*i]).collect(),
    };
    let basis = SparseMatrix::from_triplets(n, k, cols.iter().enumerate().map(|(j, c)| (j, *c, 1.0)));

    info!(
        "Lifted LP from {} row(s) x {} column(s) to {} x {}",
        m,
        n,
        reduced.num_inequalities() + reduced.num_equalities(),
        k
    );
    Ok(LiftedLp { reduced, basis })
}

/// Solves through lifting: reduce, solve with the inner solver, expand.
#[derive(Debug, Default)]
pub struct LiftedSolver<S, O = ColorRefinement> {
    inner: S,
    oracle: O,
    status: SolveStatus,
}

impl<S: LpSolver> LiftedSolver<S> {
    #[must_use]
    pub fn new(inner: S) -> Self {
        Self::with_oracle(inner, ColorRefinement)
    }
}

impl<S: LpSolver, O: AutomorphismOracle> LiftedSolver<S, O> {
    #[must_use]
    pub fn with_oracle(inner: S, oracle: O) -> Self {
        Self {
            inner,
            oracle,
            status: SolveStatus::Unsolved,
        }
    }

    #[must_use]
    #[inline]
    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: LpSolver, O: AutomorphismOracle> LpSolver for LiftedSolver<S, O> {
    fn solve(&mut self, lp: &LpArtifact) -> Result<LpOutcome, SolverError> {
        self.status = SolveStatus::Unsolved;
        let lifted = lift(lp, &self.oracle)?;
        let outcome = match self.inner.solve(&lifted.reduced)? {
            LpOutcome::Optimal { x, .. } => {
                let x = lifted.expand(&x);
                let objective = lp.objective(&x);
                LpOutcome::Optimal { x, objective }
            }
            other => other,
        };
        self.status = outcome.status();
        Ok(outcome)
    }

    fn status(&self) -> SolveStatus {
        self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solver::DenseSimplex;

    fn optimum(outcome: LpOutcome) -> (Vec<f64>, f64) {
        match outcome {
            LpOutcome::Optimal { x, objective } => (x, objective),
            other => panic!("expected an optimum, got {other:?}"),
        }
    }

    /// max x0 + x1 + x2  s.t.  xi <= 1, x0 + x1 + x2 <= 2.5
    fn shared_budget() -> LpArtifact {
        LpArtifact {
            c: vec![-1.0; 3],
            g: SparseMatrix::from_triplets(
                4,
                3,
                vec![
                    (0, 0, 1.0),
                    (1, 1, 1.0),
                    (2, 2, 1.0),
                    (3, 0, 1.0),
                    (3, 1, 1.0),
                    (3, 2, 1.0),
                ],
            ),
            h: vec![1.0, 1.0, 1.0, 2.5],
            a: SparseMatrix::zeros(0, 3),
            b: vec![],
        }
    }

    #[test]
    fn symmetric_columns_collapse() {
        let lifted = lift(&shared_budget(), &ColorRefinement).unwrap();
        assert_eq!(lifted.reduced.c, vec![-3.0]);
        assert_eq!(lifted.reduced.g.to_dense(), vec![vec![1.0], vec![3.0]]);
        assert_eq!(lifted.reduced.h, vec![1.0, 2.5]);
        assert_eq!(lifted.expand(&[0.5]), vec![0.5; 3]);
    }

    #[test]
    fn lifted_optimum_matches_direct_optimum() {
        let lp = shared_budget();
        let (_, direct) = optimum(DenseSimplex::default().solve(&lp).unwrap());
        let mut lifted = LiftedSolver::new(DenseSimplex::default());
        let (x, objective) = optimum(lifted.solve(&lp).unwrap());
        assert!((direct - objective).abs() < 1e-7);
        assert!((objective + 2.5).abs() < 1e-7);
        assert!(lp.is_feasible(&x, 1e-7));
        assert_eq!(lifted.status(), SolveStatus::Optimal);
    }

    #[test]
    fn discrete_partition_reproduces_the_artifact() {
        let lp = LpArtifact {
            c: vec![-1.0, -1.0, 0.0],
            g: SparseMatrix::from_triplets(3, 3, vec![(0, 2, 1.0), (1, 0, 1.0), (2, 1, 1.0)]),
            h: vec![4.0, 3.0, 2.0],
            a: SparseMatrix::from_triplets(1, 3, vec![(0, 0, -1.0), (0, 2, 1.0)]),
            b: vec![0.0],
        };
        let lifted = lift(&lp, &ColorRefinement).unwrap();
        assert_eq!(lifted.reduced, lp);
        assert_eq!(lifted.expand(&[1.0, 2.0, 3.0]), vec![1.0, 2.0, 3.0]);
    }

    struct Fixed(Partition);

    impl AutomorphismOracle for Fixed {
        fn partition(&self, _: &ColoredIncidence) -> Result<Partition, LiftError> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn malformed_partitions_are_rejected() {
        let lp = shared_budget();
        let short = Fixed(Partition::new(&[0, 0, 0], &[0, 0, 0]));
        assert_eq!(
            lift(&lp, &short),
            Err(LiftError::PartitionSize {
                what: "rows",
                expected: 4,
                found: 3
            })
        );

        let mut mixed = lp.clone();
        mixed.a = SparseMatrix::from_triplets(1, 3, vec![(0, 0, 1.0)]);
        mixed.b = vec![1.0];
        let oracle = Fixed(Partition::new(&[0, 1, 2, 3, 0], &[0, 1, 2]));
        assert_eq!(lift(&mixed, &oracle), Err(LiftError::MixedRowClass(0)));

        let mut solver = LiftedSolver::with_oracle(DenseSimplex::default(), oracle);
        assert!(matches!(
            solver.solve(&mixed),
            Err(SolverError::Preprocess(_))
        ));
    }
}
