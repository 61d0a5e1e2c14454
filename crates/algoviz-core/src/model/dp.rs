//! Dynamic-programming table model.

use super::{unsupported, Snapshot, VisualModel};
use crate::error::{Error, Result};
use crate::step::Mutation;

/// A labelled grid of optional cells. Row 0 and column 0 start filled with zeros.
#[derive(Debug, Clone)]
pub struct DpTableModel {
    row_labels: Vec<String>,
    col_labels: Vec<String>,
    cells: Vec<Vec<Option<i64>>>,
    baseline: Vec<Vec<Option<i64>>>,
}

impl DpTableModel {
    /// A table with the given headers. The first row and column are base cases.
    pub fn new(row_labels: Vec<String>, col_labels: Vec<String>) -> Self {
        let cols = col_labels.len();
        let cells: Vec<Vec<Option<i64>>> = (0..row_labels.len())
            .map(|r| (0..cols).map(|c| (r == 0 || c == 0).then_some(0)).collect())
            .collect();
        Self {
            row_labels,
            col_labels,
            baseline: cells.clone(),
            cells,
        }
    }

    /// Table for 0/1 knapsack: one row per item plus the empty row, one column per capacity.
    pub fn knapsack(items: &[(u32, i64)], capacity: u32) -> Self {
        let rows = std::iter::once("-".to_string())
            .chain(items.iter().map(|(w, v)| format!("w{} v{}", w, v)))
            .collect();
        let cols = (0..=capacity).map(|w| w.to_string()).collect();
        Self::new(rows, cols)
    }

    /// Table for the longest common subsequence of `a` (rows) and `b` (columns).
    pub fn lcs(a: &str, b: &str) -> Self {
        let header = |s: &str| {
            std::iter::once(String::new())
                .chain(s.chars().map(String::from))
                .collect()
        };
        Self::new(header(a), header(b))
    }

    pub fn rows(&self) -> usize {
        self.row_labels.len()
    }

    pub fn cols(&self) -> usize {
        self.col_labels.len()
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<i64> {
        self.cells.get(row)?.get(col).copied().flatten()
    }

    /// Whether every cell holds a value.
    pub fn is_complete(&self) -> bool {
        self.cells.iter().flatten().all(Option::is_some)
    }
}

impl VisualModel for DpTableModel {
    fn kind(&self) -> &'static str {
        "dp_table"
    }

    fn mutate(&mut self, mutation: &Mutation) -> Result<()> {
        match *mutation {
            Mutation::SetCell { row, col, value } => {
                let (rows, cols) = (self.rows(), self.cols());
                let cell = self
                    .cells
                    .get_mut(row)
                    .and_then(|r| r.get_mut(col))
                    .ok_or_else(|| {
                        Error::inconsistent(format!(
                            "cell ({}, {}) outside {}x{} table",
                            row, col, rows, cols
                        ))
                    })?;
                *cell = Some(value);
                Ok(())
            }
            ref other => Err(unsupported(self.kind(), other)),
        }
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot::Grid {
            row_labels: self.row_labels.clone(),
            col_labels: self.col_labels.clone(),
            cells: self.cells.clone(),
        }
    }

    fn reset(&mut self) {
        self.cells = self.baseline.clone();
    }

    fn rebase(&mut self) {
        self.baseline = self.cells.clone();
    }

    fn clone_box(&self) -> Box<dyn VisualModel> {
        Box::new(self.clone())
    }
}
