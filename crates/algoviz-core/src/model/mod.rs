//! Visual models: in-memory mirrors of the structures being animated.
//!
//! A model is mutated only by applying steps. Every model remembers the
//! baseline it was generated with so `reset` can return to it.

mod array;
mod bst;
mod dp;
mod graph;
mod segment;
mod trie;

pub use array::{ArrayModel, ArrayShape, HeapOrder};
pub use bst::{BstModel, BstNode};
pub use dp::DpTableModel;
pub use graph::{node_label, Edge, GraphModel, MAX_WEIGHT};
pub use segment::{Combiner, SegmentTreeModel, MAX_SEGMENT_LEN};
pub use trie::{TrieModel, TRIE_ROOT};

use algoviz_layout::{Hierarchy, Side};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::step::{EdgeState, Mutation, NodeId, Step};

/// A structure that can be animated one step at a time.
pub trait VisualModel: Send + Sync + std::fmt::Debug {
    /// Short model name ("array", "bst", ...).
    fn kind(&self) -> &'static str;

    /// Perform a single mutation. On error the model is left unchanged.
    fn mutate(&mut self, mutation: &Mutation) -> Result<()>;

    /// Read-only view for renderers.
    fn snapshot(&self) -> Snapshot;

    /// Return to the baseline captured when the model was generated.
    fn reset(&mut self);

    /// Make the current state the new baseline.
    fn rebase(&mut self);

    fn clone_box(&self) -> Box<dyn VisualModel>;

    /// Apply a step's mutation, if it has one.
    fn apply(&mut self, step: &Step) -> Result<()> {
        match &step.mutation {
            Some(mutation) => self.mutate(mutation),
            None => Ok(()),
        }
    }
}

impl Clone for Box<dyn VisualModel> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

pub(crate) fn unsupported(model: &'static str, mutation: &Mutation) -> Error {
    Error::UnsupportedMutation {
        model,
        mutation: mutation.name(),
    }
}

/// A child link in a tree snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildLink {
    pub id: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side: Option<Side>,
}

/// A node in a tree snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNodeView {
    pub id: NodeId,
    pub label: String,
    pub children: Vec<ChildLink>,
    /// Trie nodes that end a word; always false elsewhere.
    #[serde(default)]
    pub terminal: bool,
}

/// A node in a graph snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNodeView {
    pub id: NodeId,
    pub label: String,
    pub distance: Option<u64>,
    pub previous: Option<NodeId>,
    pub visited: bool,
}

/// An edge in a graph snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeView {
    pub from: NodeId,
    pub to: NodeId,
    pub weight: u64,
    pub state: EdgeState,
}

/// Read-only render view of any model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Snapshot {
    Array {
        values: Vec<i64>,
        ids: Vec<NodeId>,
        shape: ArrayShape,
    },
    Tree {
        root: Option<NodeId>,
        nodes: Vec<TreeNodeView>,
        /// Backing array shown under segment trees.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        array: Vec<i64>,
    },
    Graph {
        nodes: Vec<GraphNodeView>,
        edges: Vec<EdgeView>,
    },
    Grid {
        row_labels: Vec<String>,
        col_labels: Vec<String>,
        cells: Vec<Vec<Option<i64>>>,
    },
}

impl Snapshot {
    /// Number of drawable elements.
    pub fn len(&self) -> usize {
        match self {
            Snapshot::Array { values, .. } => values.len(),
            Snapshot::Tree { nodes, .. } => nodes.len(),
            Snapshot::Graph { nodes, .. } => nodes.len(),
            Snapshot::Grid { cells, .. } => cells.iter().map(Vec::len).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Layout hierarchy for tree-shaped snapshots (trees and heaps).
    ///
    /// Heap node ids are array positions.
    pub fn hierarchy(&self) -> Option<Hierarchy> {
        let mut h = Hierarchy::new();
        match self {
            Snapshot::Tree { nodes, .. } => {
                for node in nodes {
                    h.add_node(node.id.0).ok()?;
                }
                for node in nodes {
                    for child in &node.children {
                        h.attach(node.id.0, child.id.0, child.side).ok()?;
                    }
                }
                Some(h)
            }
            Snapshot::Array {
                values,
                shape: ArrayShape::Heap,
                ..
            } => {
                for i in 0..values.len() {
                    h.add_node(i as u64).ok()?;
                }
                for i in 1..values.len() {
                    let side = if i % 2 == 1 { Side::Left } else { Side::Right };
                    h.attach(((i - 1) / 2) as u64, i as u64, Some(side)).ok()?;
                }
                Some(h)
            }
            _ => None,
        }
    }
}
