//! The grounded standard-form LP and its column map.
//!
//! - [`SparseMatrix`]: coordinate-format matrix with sorted, summed entries
//! - [`OrderedIndex`]: first-seen, deduplicating key → index map
//! - [`ColumnMap`]: decision template instances → global column ids
//! - [`LpArtifact`]: `min cᵀx  s.t.  Gx ≤ h, Ax = b`

use ir::{Atom, Constant, PredicateTemplate, Term};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::Hash;

/// Sparse matrix of `f64` entries, sorted by `(row, col)`; zeros are not stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseMatrix {
    rows: usize,
    cols: usize,
    entries: Vec<(usize, usize, f64)>,
}

impl SparseMatrix {
    /// An all-zero `rows × cols` matrix.
    #[must_use]
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            entries: Vec::new(),
        }
    }

    /// Builds a matrix from triplets; duplicates are summed.
    ///
    /// # Panics
    /// Panics if a triplet lies outside `rows × cols`.
    #[must_use]
    pub fn from_triplets<I>(rows: usize, cols: usize, triplets: I) -> Self
    where
        I: IntoIterator<Item = (usize, usize, f64)>,
    {
        let mut acc: BTreeMap<(usize, usize), f64> = BTreeMap::new();
        for (r, c, v) in triplets {
            assert!(r < rows && c < cols, "entry ({r}, {c}) outside {rows}x{cols}");
            *acc.entry((r, c)).or_insert(0.0) += v;
        }
        Self {
            rows,
            cols,
            entries: acc
                .into_iter()
                .filter(|(_, v)| *v != 0.0)
                .map(|((r, c), v)| (r, c, v))
                .collect(),
        }
    }

    #[must_use]
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of stored entries.
    #[must_use]
    #[inline]
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    /// Stored entries in `(row, col)` order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.entries.iter().copied()
    }

    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.entries
            .binary_search_by(|(r, c, _)| (*r, *c).cmp(&(row, col)))
            .map_or(0.0, |i| self.entries[i].2)
    }

    /// Entries of one row as `(col, value)`.
    pub fn row(&self, row: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let start = self.entries.partition_point(|(r, _, _)| *r < row);
        self.entries[start..]
            .iter()
            .take_while(move |(r, _, _)| *r == row)
            .map(|(_, c, v)| (*c, *v))
    }

    /// `self · x`.
    ///
    /// # Panics
    /// Panics if `x.len()` differs from the column count.
    #[must_use]
    pub fn mul_vec(&self, x: &[f64]) -> Vec<f64> {
        assert_eq!(x.len(), self.cols, "dimension mismatch");
        let mut out = vec![0.0; self.rows];
        for (r, c, v) in self.iter() {
            out[r] += v * x[c];
        }
        out
    }

    /// The matrix made of the given rows, in that order.
    #[must_use]
    pub fn select_rows(&self, rows: &[usize]) -> Self {
        let triplets = rows
            .iter()
            .enumerate()
            .flat_map(|(new, &old)| self.row(old).map(move |(c, v)| (new, c, v)));
        Self::from_triplets(rows.len(), self.cols, triplets)
    }

    /// `self · B` for the 0/1 matrix `B` with `B[j][map[j]] = 1`.
    #[must_use]
    pub fn merge_columns(&self, map: &[usize], cols: usize) -> Self {
        Self::from_triplets(self.rows, cols, self.iter().map(|(r, c, v)| (r, map[c], v)))
    }

    #[must_use]
    pub fn to_dense(&self) -> Vec<Vec<f64>> {
        let mut dense = vec![vec![0.0; self.cols]; self.rows];
        for (r, c, v) in self.iter() {
            dense[r][c] = v;
        }
        dense
    }
}

/// Assigns indices to keys in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<T>", into = "Vec<T>")]
#[serde(bound(
    serialize = "T: Serialize + Clone",
    deserialize = "T: Deserialize<'de> + Hash + Eq + Clone"
))]
pub struct OrderedIndex<T: Hash + Eq + Clone> {
    items: Vec<T>,
    positions: HashMap<T, usize>,
}

impl<T: Hash + Eq + Clone> Default for OrderedIndex<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            positions: HashMap::new(),
        }
    }
}

impl<T: Hash + Eq + Clone> OrderedIndex<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of `key`, assigning the next free one if it is new.
    pub fn insert(&mut self, key: T) -> usize {
        if let Some(&i) = self.positions.get(&key) {
            return i;
        }
        let i = self.items.len();
        self.positions.insert(key.clone(), i);
        self.items.push(key);
        i
    }

    #[must_use]
    pub fn get(&self, key: &T) -> Option<usize> {
        self.positions.get(key).copied()
    }

    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Keys in index order.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }
}

impl<T: Hash + Eq + Clone> From<Vec<T>> for OrderedIndex<T> {
    fn from(items: Vec<T>) -> Self {
        let mut index = Self::new();
        for item in items {
            index.insert(item);
        }
        index
    }
}

impl<T: Hash + Eq + Clone> From<OrderedIndex<T>> for Vec<T> {
    fn from(index: OrderedIndex<T>) -> Self {
        index.items
    }
}

/// Columns of one decision template: `offset + position` of each argument tuple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnBlock {
    template: PredicateTemplate,
    offset: usize,
    tuples: OrderedIndex<Vec<Constant>>,
}

impl ColumnBlock {
    #[must_use]
    pub fn template(&self) -> &PredicateTemplate {
        &self.template
    }

    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[must_use]
    pub fn tuples(&self) -> &[Vec<Constant>] {
        self.tuples.items()
    }
}

/// Global column ids of all decision atoms, grouped by template in
/// declaration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnMap {
    blocks: Vec<ColumnBlock>,
}

impl ColumnMap {
    /// Lays the templates out consecutively in the given order.
    #[must_use]
    pub fn new(templates: Vec<(PredicateTemplate, OrderedIndex<Vec<Constant>>)>) -> Self {
        let mut offset = 0;
        let blocks = templates
            .into_iter()
            .map(|(template, tuples)| {
                let block = ColumnBlock {
                    template,
                    offset,
                    tuples,
                };
                offset += block.tuples.len();
                block
            })
            .collect();
        Self { blocks }
    }

    /// Total number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.iter().map(|b| b.tuples.len()).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn blocks(&self) -> &[ColumnBlock] {
        &self.blocks
    }

    /// Global column of a ground decision atom.
    #[must_use]
    pub fn column(&self, atom: &Atom) -> Option<usize> {
        let block = self.blocks.iter().find(|b| &b.template == atom.template())?;
        let tuple = atom.ground_arguments()?;
        block.tuples.get(&tuple).map(|i| block.offset + i)
    }

    /// The decision atom of every column, in column order.
    pub fn atoms(&self) -> impl Iterator<Item = Atom> + '_ {
        self.blocks.iter().flat_map(|block| {
            block.tuples.items().iter().filter_map(move |tuple| {
                let args = tuple.iter().cloned().map(Term::Const).collect();
                Atom::new(&block.template, args).ok()
            })
        })
    }
}

/// A linear program in standard form: minimize `cᵀx` subject to `Gx ≤ h`
/// and `Ax = b`, with `x` free.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LpArtifact {
    pub c: Vec<f64>,
    pub g: SparseMatrix,
    pub h: Vec<f64>,
    pub a: SparseMatrix,
    pub b: Vec<f64>,
}

impl LpArtifact {
    #[must_use]
    pub fn num_columns(&self) -> usize {
        self.c.len()
    }

    #[must_use]
    pub fn num_inequalities(&self) -> usize {
        self.h.len()
    }

    #[must_use]
    pub fn num_equalities(&self) -> usize {
        self.b.len()
    }

    /// `cᵀx`.
    #[must_use]
    pub fn objective(&self, x: &[f64]) -> f64 {
        self.c.iter().zip(x).map(|(c, x)| c * x).sum()
    }

    /// Whether `x` satisfies every row within `tolerance`.
    #[must_use]
    pub fn is_feasible(&self, x: &[f64], tolerance: f64) -> bool {
        if x.len() != self.num_columns() {
            return false;
        }
        let gx = self.g.mul_vec(x);
        let ax = self.a.mul_vec(x);
        gx.iter().zip(&self.h).all(|(l, r)| *l <= r + tolerance)
            && ax.iter().zip(&self.b).all(|(l, r)| (l - r).abs() <= tolerance)
    }
}

impl fmt::Display for LpArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "LP: {} column(s), {} inequality row(s) ({} nnz), {} equality row(s) ({} nnz)",
            self.num_columns(),
            self.num_inequalities(),
            self.g.nnz(),
            self.num_equalities(),
            self.a.nnz()
        )
    }
}
