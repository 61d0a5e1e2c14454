//! Segment tree model: a flat `4n` slot array over a backing array.
//!
//! Slot 0 is the root; slot `i` has children `2i + 1` and `2i + 2`.

use std::str::FromStr;

use algoviz_layout::Side;
use serde::{Deserialize, Serialize};

use super::{unsupported, ChildLink, Snapshot, TreeNodeView, VisualModel};
use crate::error::{Error, Result};
use crate::step::{Mutation, NodeId};

/// Largest backing array accepted.
pub const MAX_SEGMENT_LEN: usize = 32;

/// How two child values combine into their parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Combiner {
    Sum,
    Min,
    Max,
}

impl Combiner {
    pub fn combine(&self, a: i64, b: i64) -> i64 {
        match self {
            Combiner::Sum => a.saturating_add(b),
            Combiner::Min => a.min(b),
            Combiner::Max => a.max(b),
        }
    }

    /// Neutral value returned by queries that miss a segment.
    pub fn identity(&self) -> i64 {
        match self {
            Combiner::Sum => 0,
            Combiner::Min => i64::MAX,
            Combiner::Max => i64::MIN,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Combiner::Sum => "sum",
            Combiner::Min => "min",
            Combiner::Max => "max",
        }
    }
}

impl FromStr for Combiner {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sum" => Ok(Combiner::Sum),
            "min" => Ok(Combiner::Min),
            "max" => Ok(Combiner::Max),
            _ => Err(Error::invalid(format!("unknown combiner '{}'", s))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct State {
    values: Vec<i64>,
    slots: Vec<Option<i64>>,
}

#[derive(Debug, Clone)]
pub struct SegmentTreeModel {
    combiner: Combiner,
    ranges: Vec<Option<(usize, usize)>>,
    current: State,
    baseline: State,
}

fn assign_ranges(ranges: &mut [Option<(usize, usize)>], slot: usize, start: usize, end: usize) {
    ranges[slot] = Some((start, end));
    if start == end {
        return;
    }
    let mid = (start + end) / 2;
    assign_ranges(ranges, 2 * slot + 1, start, mid);
    assign_ranges(ranges, 2 * slot + 2, mid + 1, end);
}

impl SegmentTreeModel {
    /// An unbuilt tree over `values`.
    pub fn new(values: Vec<i64>, combiner: Combiner) -> Result<Self> {
        if values.is_empty() || values.len() > MAX_SEGMENT_LEN {
            return Err(Error::invalid(format!(
                "segment tree needs 1 to {} values, got {}",
                MAX_SEGMENT_LEN,
                values.len()
            )));
        }
        let n = values.len();
        let mut ranges = vec![None; 4 * n];
        assign_ranges(&mut ranges, 0, 0, n - 1);
        let state = State {
            values,
            slots: vec![None; 4 * n],
        };
        Ok(Self {
            combiner,
            ranges,
            current: state.clone(),
            baseline: state,
        })
    }

    pub fn combiner(&self) -> Combiner {
        self.combiner
    }

    pub fn values(&self) -> &[i64] {
        &self.current.values
    }

    pub fn len(&self) -> usize {
        self.current.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.values.is_empty()
    }

    /// Number of slots in the flat array (`4n`).
    pub fn capacity(&self) -> usize {
        self.current.slots.len()
    }

    pub fn slot(&self, slot: usize) -> Option<i64> {
        self.current.slots.get(slot).copied().flatten()
    }

    /// Inclusive 0-based range covered by `slot`.
    pub fn range(&self, slot: usize) -> Option<(usize, usize)> {
        self.ranges.get(slot).copied().flatten()
    }

    /// Whether every node in use holds a value.
    pub fn is_built(&self) -> bool {
        self.ranges
            .iter()
            .zip(&self.current.slots)
            .all(|(range, value)| range.is_none() || value.is_some())
    }

    /// Whether every built node agrees with its children and the backing array.
    pub fn is_consistent(&self) -> bool {
        (0..self.capacity()).all(|slot| match (self.range(slot), self.slot(slot)) {
            (Some((l, r)), Some(v)) if l == r => v == self.current.values[l],
            (Some(_), Some(v)) => match (self.slot(2 * slot + 1), self.slot(2 * slot + 2)) {
                (Some(a), Some(b)) => v == self.combiner.combine(a, b),
                _ => false,
            },
            _ => true,
        })
    }

    /// Fold the backing array over an inclusive 0-based range without the tree.
    pub fn fold_range(&self, left: usize, right: usize) -> i64 {
        self.current.values[left..=right]
            .iter()
            .fold(self.combiner.identity(), |acc, &v| self.combiner.combine(acc, v))
    }

    fn label(&self, slot: usize, (l, r): (usize, usize)) -> String {
        let value = self.slot(slot).map_or_else(|| "-".to_string(), |v| v.to_string());
        if l == r {
            format!("[{}] {}", l + 1, value)
        } else {
            format!("[{}..{}] {}", l + 1, r + 1, value)
        }
    }
}

impl VisualModel for SegmentTreeModel {
    fn kind(&self) -> &'static str {
        "segment_tree"
    }

    fn mutate(&mut self, mutation: &Mutation) -> Result<()> {
        match *mutation {
            Mutation::SetTreeSlot { slot, value } => {
                if self.range(slot).is_none() {
                    return Err(Error::inconsistent(format!("slot {} is not part of the tree", slot)));
                }
                self.current.slots[slot] = Some(value);
            }
            Mutation::SetLeaf { index, value } => {
                let n = self.len();
                let cell = self.current.values.get_mut(index).ok_or_else(|| {
                    Error::inconsistent(format!("leaf {} out of bounds for {} values", index, n))
                })?;
                *cell = value;
            }
            ref other => return Err(unsupported(self.kind(), other)),
        }
        Ok(())
    }

    fn snapshot(&self) -> Snapshot {
        let nodes = (0..self.capacity())
            .filter_map(|slot| {
                let range = self.range(slot)?;
                let children = if range.0 == range.1 {
                    Vec::new()
                } else {
                    vec![
                        ChildLink {
                            id: NodeId((2 * slot + 1) as u64),
                            side: Some(Side::Left),
                        },
                        ChildLink {
                            id: NodeId((2 * slot + 2) as u64),
                            side: Some(Side::Right),
                        },
                    ]
                };
                Some(TreeNodeView {
                    id: NodeId(slot as u64),
                    label: self.label(slot, range),
                    children,
                    terminal: false,
                })
            })
            .collect();
        Snapshot::Tree {
            root: Some(NodeId(0)),
            nodes,
            array: self.current.values.clone(),
        }
    }

    fn reset(&mut self) {
        self.current = self.baseline.clone();
    }

    fn rebase(&mut self) {
        self.baseline = self.current.clone();
    }

    fn clone_box(&self) -> Box<dyn VisualModel> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranges_cover_the_array() {
        let model = SegmentTreeModel::new(vec![1, 3, 5, 7, 9, 11], Combiner::Sum).unwrap();
        assert_eq!(model.capacity(), 24);
        assert_eq!(model.range(0), Some((0, 5)));
        assert_eq!(model.range(1), Some((0, 2)));
        assert_eq!(model.range(2), Some((3, 5)));
        let leaves = (0..model.capacity())
            .filter(|&s| matches!(model.range(s), Some((l, r)) if l == r))
            .count();
        assert_eq!(leaves, 6);
        assert!(!model.is_built());
    }

    #[test]
    fn fold_range_per_combiner() {
        let values = vec![1, 3, 5, 7, 9, 11];
        let sum = SegmentTreeModel::new(values.clone(), Combiner::Sum).unwrap();
        let min = SegmentTreeModel::new(values.clone(), Combiner::Min).unwrap();
        let max = SegmentTreeModel::new(values, Combiner::Max).unwrap();
        assert_eq!(sum.fold_range(1, 4), 24);
        assert_eq!(min.fold_range(1, 4), 3);
        assert_eq!(max.fold_range(1, 4), 9);
    }

    #[test]
    fn rejects_unused_slots_and_bad_sizes() {
        let mut model = SegmentTreeModel::new(vec![1, 2, 3], Combiner::Sum).unwrap();
        // slot 5 covers [2,2]; slot 7 would be a child of the leaf at slot 3
        assert!(model.mutate(&Mutation::SetTreeSlot { slot: 5, value: 3 }).is_ok());
        assert!(model.mutate(&Mutation::SetTreeSlot { slot: 7, value: 3 }).is_err());
        assert!(model.mutate(&Mutation::SetLeaf { index: 3, value: 0 }).is_err());
        assert!(SegmentTreeModel::new(Vec::new(), Combiner::Sum).is_err());
        assert!(SegmentTreeModel::new(vec![0; MAX_SEGMENT_LEN + 1], Combiner::Max).is_err());
    }

    #[test]
    fn snapshot_is_a_tree_with_backing_array() {
        let model = SegmentTreeModel::new(vec![4, 2], Combiner::Min).unwrap();
        let snapshot = model.snapshot();
        let Snapshot::Tree { nodes, array, .. } = &snapshot else {
            panic!("segment tree snapshot should be a tree");
        };
        assert_eq!(nodes.len(), 3);
        assert_eq!(array, &vec![4, 2]);
        assert_eq!(nodes[0].label, "[1..2] -");
        assert_eq!(snapshot.hierarchy().unwrap().len(), 3);
    }
}
