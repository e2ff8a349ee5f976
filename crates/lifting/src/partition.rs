//! Row and column partitions, and the oracle that computes them.

use crate::error::LiftError;
use crate::incidence::ColoredIncidence;
use itertools::Itertools;
use std::collections::HashMap;
use std::hash::Hash;
use tracing::debug;

/// Class ids per row and per column, numbered in first-occurrence order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    row_classes: Vec<usize>,
    col_classes: Vec<usize>,
    num_row_classes: usize,
    num_col_classes: usize,
}

/// Renumbers `labels` by first occurrence and returns the class count.
fn relabel<T: Hash + Eq + Clone>(labels: &[T]) -> (Vec<usize>, usize) {
    let mut ids: HashMap<T, usize> = HashMap::new();
    let classes = labels
        .iter()
        .map(|l| {
            let next = ids.len();
            *ids.entry(l.clone()).or_insert(next)
        })
        .collect();
    (classes, ids.len())
}

impl Partition {
    /// Builds a partition from arbitrary class labels.
    #[must_use]
    pub fn new(row_labels: &[usize], col_labels: &[usize]) -> Self {
        let (row_classes, num_row_classes) = relabel(row_labels);
        let (col_classes, num_col_classes) = relabel(col_labels);
        Self {
            row_classes,
            col_classes,
            num_row_classes,
            num_col_classes,
        }
    }

    /// Every row and every column in its own class.
    #[must_use]
    pub fn discrete(rows: usize, cols: usize) -> Self {
        Self::new(&(0..rows).collect_vec(), &(0..cols).collect_vec())
    }

    #[must_use]
    #[inline]
    pub fn row_classes(&self) -> &[usize] {
        &self.row_classes
    }

    #[must_use]
    #[inline]
    pub fn col_classes(&self) -> &[usize] {
        &self.col_classes
    }

    #[must_use]
    #[inline]
    pub fn num_row_classes(&self) -> usize {
        self.num_row_classes
    }

    #[must_use]
    #[inline]
    pub fn num_col_classes(&self) -> usize {
        self.num_col_classes
    }
}

/// Computes a row and column partition consistent with an incidence coloring.
///
/// Implementations may compute true automorphism orbits or any equitable
/// partition; lifting is exact when columns in one class take equal values
/// at some optimum of the original LP.
pub trait AutomorphismOracle {
    fn partition(&self, incidence: &ColoredIncidence) -> Result<Partition, LiftError>;
}

impl<O: AutomorphismOracle + ?Sized> AutomorphismOracle for &O {
    fn partition(&self, incidence: &ColoredIncidence) -> Result<Partition, LiftError> {
        (**self).partition(incidence)
    }
}

/// Coarsest equitable partition by one-dimensional Weisfeiler-Leman refinement.
///
/// Each round recolors a node by its current color together with the sorted
/// multiset of `(edge color, neighbor color)` pairs, until the number of
/// classes stops growing.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColorRefinement;

impl AutomorphismOracle for ColorRefinement {
    fn partition(&self, incidence: &ColoredIncidence) -> Result<Partition, LiftError> {
        let m = incidence.num_rows();
        let n = incidence.num_cols();

        // rows are nodes 0..m, columns m..m+n
        let mut adjacency: Vec<Vec<(usize, usize)>> = vec![Vec::new(); m + n];
        for &(r, c, color) in incidence.edges() {
            adjacency[r].push((m + c, color));
            adjacency[m + c].push((r, color));
        }

        let initial = incidence
            .row_colors()
            .iter()
            .map(|c| (0, *c))
            .chain(incidence.col_colors().iter().map(|c| (1, *c)))
            .collect_vec();
        let (mut colors, mut count) = relabel(&initial);

        let mut rounds = 0;
        loop {
            rounds += 1;
            let signatures = (0..m + n)
                .map(|v| {
                    let neighborhood = adjacency[v]
                        .iter()
                        .map(|(u, edge)| (*edge, colors[*u]))
                        .sorted()
                        .collect_vec();
                    (colors[v], neighborhood)
                })
                .collect_vec();
            let (refined, refined_count) = relabel(&signatures);
            colors = refined;
            if refined_count == count {
                break;
            }
            count = refined_count;
        }
        debug!("Color refinement stable after {rounds} round(s) with {count} class(es)");

        Ok(Partition::new(&colors[..m], &colors[m..]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grounder::{LpArtifact, SparseMatrix};

    #[test]
    fn relabel_is_first_seen() {
        let p = Partition::new(&[7, 3, 7], &[5, 5]);
        assert_eq!(p.row_classes(), &[0, 1, 0]);
        assert_eq!(p.num_row_classes(), 2);
        assert_eq!(p.col_classes(), &[0, 0]);
        assert_eq!(p.num_col_classes(), 1);
        assert_eq!(Partition::discrete(2, 1), Partition::new(&[0, 1], &[0]));
    }

    /// `x0 + x1 <= 1`, `x2 + x3 <= 1`, `x4 <= 1`, with `c` all ones.
    fn blocks() -> LpArtifact {
        LpArtifact {
            c: vec![1.0; 5],
            g: SparseMatrix::from_triplets(
                3,
                5,
                vec![(0, 0, 1.0), (0, 1, 1.0), (1, 2, 1.0), (1, 3, 1.0), (2, 4, 1.0)],
            ),
            h: vec![1.0; 3],
            a: SparseMatrix::zeros(0, 5),
            b: vec![],
        }
    }

    #[test]
    fn refinement_groups_symmetric_blocks() {
        let inc = ColoredIncidence::from_artifact(&blocks());
        let p = ColorRefinement.partition(&inc).unwrap();
        assert_eq!(p.row_classes(), &[0, 0, 1]);
        assert_eq!(p.col_classes(), &[0, 0, 0, 0, 1]);
    }

    #[test]
    fn refinement_respects_edge_colors() {
        let mut lp = blocks();
        lp.g = SparseMatrix::from_triplets(
            3,
            5,
            vec![(0, 0, 1.0), (0, 1, 2.0), (1, 2, 1.0), (1, 3, 2.0), (2, 4, 1.0)],
        );
        let p = ColorRefinement
            .partition(&ColoredIncidence::from_artifact(&lp))
            .unwrap();
        assert_eq!(p.row_classes(), &[0, 0, 1]);
        assert_eq!(p.col_classes(), &[0, 1, 0, 1, 2]);
    }

    #[test]
    fn distinct_right_hand_sides_stay_apart() {
        let mut lp = blocks();
        lp.h = vec![1.0, 2.0, 1.0];
        let p = ColorRefinement
            .partition(&ColoredIncidence::from_artifact(&lp))
            .unwrap();
        assert_eq!(p.num_row_classes(), 3);
        assert_eq!(p.col_classes(), &[0, 0, 1, 1, 2]);
    }

    #[test]
    fn huge_right_hand_sides_stay_apart() {
        let mut lp = blocks();
        lp.h = vec![1e13, 2e13, 1.0];
        let p = ColorRefinement
            .partition(&ColoredIncidence::from_artifact(&lp))
            .unwrap();
        assert_eq!(p.num_row_classes(), 3);
        assert_eq!(p.col_classes(), &[0, 0, 1, 1, 2]);
    }
}
