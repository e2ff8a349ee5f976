//! Colored bipartite incidence structure of a grounded LP.

use grounder::LpArtifact;
use itertools::Itertools;

/// Values are compared after rounding to this many decimals.
const COLOR_DECIMALS: i32 = 6;

/// Rounds `v` to the palette resolution; `-0.0` becomes `0.0`.
fn quantize(v: f64) -> f64 {
    let scale = 10f64.powi(COLOR_DECIMALS);
    let key = if v.abs() < f64::MAX / scale {
        (v * scale).round() / scale
    } else {
        v
    };
    if key == 0.0 {
        0.0
    } else {
        key
    }
}

/// Maps each value to its position in the sorted palette of distinct values.
fn palette(values: &[f64]) -> (Vec<usize>, usize) {
    let keys = values.iter().map(|v| quantize(*v)).collect::<Vec<_>>();
    let distinct = keys
        .iter()
        .copied()
        .sorted_by(f64::total_cmp)
        .dedup_by(|a, b| a.total_cmp(b).is_eq())
        .collect::<Vec<_>>();
    let colors = keys
        .iter()
        .map(|k| {
            distinct
                .binary_search_by(|d| d.total_cmp(k))
                .unwrap_or_else(|i| i)
        })
        .collect();
    (colors, distinct.len())
}

/// Rows (inequalities first, then equalities) and columns of an LP, each
/// colored by its right-hand side or objective coefficient, joined by edges
/// colored by the nonzero matrix entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColoredIncidence {
    inequalities: usize,
    row_colors: Vec<usize>,
    col_colors: Vec<usize>,
    edges: Vec<(usize, usize, usize)>,
}

impl ColoredIncidence {
    #[must_use]
    pub fn from_artifact(lp: &LpArtifact) -> Self {
        let (h_colors, h_palette) = palette(&lp.h);
        let (b_colors, _) = palette(&lp.b);
        let row_colors = h_colors
            .into_iter()
            .chain(b_colors.into_iter().map(|c| c + h_palette))
            .collect();
        let (col_colors, _) = palette(&lp.c);

        let offset = lp.num_inequalities();
        let entries = lp
            .g
            .iter()
            .chain(lp.a.iter().map(|(r, c, v)| (r + offset, c, v)))
            .collect::<Vec<_>>();
        let values = entries.iter().map(|(_, _, v)| *v).collect::<Vec<_>>();
        let (edge_colors, _) = palette(&values);
        let edges = entries
            .iter()
            .zip(edge_colors)
            .map(|((r, c, _), color)| (*r, *c, color))
            .collect();

        Self {
            inequalities: offset,
            row_colors,
            col_colors,
            edges,
        }
    }

    #[must_use]
    #[inline]
    pub fn num_rows(&self) -> usize {
        self.row_colors.len()
    }

    #[must_use]
    #[inline]
    pub fn num_cols(&self) -> usize {
        self.col_colors.len()
    }

    /// Rows below this index are inequality rows.
    #[must_use]
    #[inline]
    pub fn num_inequalities(&self) -> usize {
        self.inequalities
    }

    #[must_use]
    #[inline]
    pub fn row_colors(&self) -> &[usize] {
        &self.row_colors
    }

    #[must_use]
    #[inline]
    pub fn col_colors(&self) -> &[usize] {
        &self.col_colors
    }

    /// `(row, column, color)` triples, sorted by row then column.
    #[must_use]
    #[inline]
    pub fn edges(&self) -> &[(usize, usize, usize)] {
        &self.edges
    }
}
