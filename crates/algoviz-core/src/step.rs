//! Steps: the atomic, ordered units of algorithm progress.

use std::collections::BTreeMap;
use std::fmt;

use algoviz_layout::Side;
use serde::{Deserialize, Serialize};

/// A stable element identifier, independent of on-screen position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a step concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementId {
    /// An array position.
    Index(usize),
    /// A tree or graph node.
    Node(NodeId),
    /// An undirected graph edge.
    Edge(NodeId, NodeId),
    /// A dynamic-programming table cell.
    Cell(usize, usize),
}

/// Step category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Compare,
    Swap,
    Visit,
    Mutate,
    Conclude,
    /// Looking at an element before deciding where to go.
    Examine,
    /// A search hit.
    Found,
    /// A shortest-path relaxation.
    Relax,
    /// Part of a reconstructed path or optimal solution.
    Path,
}

/// Semantic highlight applied by renderers to a step's subjects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Highlight {
    Comparing,
    Swapping,
    Pivot,
    Sorted,
    Examining,
    ExaminingLeft,
    ExaminingRight,
    PathLeft,
    PathRight,
    Inserting,
    Deleting,
    Replacing,
    Found,
    Visiting,
    Visited,
    Current,
    Start,
    End,
    Optimal,
    Highlighted,
    /// No emphasis; used by steps that only narrate or clear.
    None,
}

impl Highlight {
    /// CSS-style class name.
    pub fn class(&self) -> &'static str {
        match self {
            Highlight::Comparing => "comparing",
            Highlight::Swapping => "swapping",
            Highlight::Pivot => "pivot",
            Highlight::Sorted => "sorted",
            Highlight::Examining => "examining",
            Highlight::ExaminingLeft => "examining-left",
            Highlight::ExaminingRight => "examining-right",
            Highlight::PathLeft => "path-left",
            Highlight::PathRight => "path-right",
            Highlight::Inserting => "inserting",
            Highlight::Deleting => "deleting",
            Highlight::Replacing => "replacing",
            Highlight::Found => "found",
            Highlight::Visiting => "visiting",
            Highlight::Visited => "visited",
            Highlight::Current => "current",
            Highlight::Start => "start",
            Highlight::End => "end",
            Highlight::Optimal => "optimal",
            Highlight::Highlighted => "highlighted",
            Highlight::None => "none",
        }
    }
}

/// Visual state of a graph edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeState {
    Idle,
    Current,
    Visited,
    Path,
}

/// Declarative patch describing how a step changes a visual model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Mutation {
    // Arrays and array-backed heaps
    Swap { i: usize, j: usize },
    Set { index: usize, value: i64 },
    Push { value: i64 },
    Pop,

    // Binary search trees
    /// Attach a new node; `parent: None` makes it the root.
    AttachNode {
        parent: Option<NodeId>,
        side: Side,
        id: NodeId,
        value: i64,
    },
    SetNodeValue { id: NodeId, value: i64 },
    /// Remove a node with at most one child, relinking that child in its place.
    SpliceNode { id: NodeId },

    // Tries
    AddTrieChild { parent: NodeId, id: NodeId, ch: char },
    SetTerminal { id: NodeId, terminal: bool },
    /// Remove a childless node.
    RemoveTrieChild { parent: NodeId, ch: char },

    // Graphs
    SetDistance {
        node: NodeId,
        distance: u64,
        previous: Option<NodeId>,
    },
    MarkVisited { node: NodeId },
    MarkEdge { from: NodeId, to: NodeId, state: EdgeState },

    // Segment trees
    SetTreeSlot { slot: usize, value: i64 },
    SetLeaf { index: usize, value: i64 },

    // Dynamic programming tables
    SetCell { row: usize, col: usize, value: i64 },
}

impl Mutation {
    /// Variant name, for error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Mutation::Swap { .. } => "swap",
            Mutation::Set { .. } => "set",
            Mutation::Push { .. } => "push",
            Mutation::Pop => "pop",
            Mutation::AttachNode { .. } => "attach_node",
            Mutation::SetNodeValue { .. } => "set_node_value",
            Mutation::SpliceNode { .. } => "splice_node",
            Mutation::AddTrieChild { .. } => "add_trie_child",
            Mutation::SetTerminal { .. } => "set_terminal",
            Mutation::RemoveTrieChild { .. } => "remove_trie_child",
            Mutation::SetDistance { .. } => "set_distance",
            Mutation::MarkVisited { .. } => "mark_visited",
            Mutation::MarkEdge { .. } => "mark_edge",
            Mutation::SetTreeSlot { .. } => "set_tree_slot",
            Mutation::SetLeaf { .. } => "set_leaf",
            Mutation::SetCell { .. } => "set_cell",
        }
    }
}

/// Counters a step contributes to the run's statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepMetrics {
    pub comparisons: u64,
    pub swaps: u64,
    pub operations: u64,
}

impl std::ops::AddAssign for StepMetrics {
    fn add_assign(&mut self, rhs: Self) {
        self.comparisons += rhs.comparisons;
        self.swaps += rhs.swaps;
        self.operations += rhs.operations;
    }
}

/// One atomic unit of algorithm progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub kind: StepKind,
    pub subjects: Vec<ElementId>,
    pub highlight: Highlight,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mutation: Option<Mutation>,
    /// Pseudocode panel id to 1-based line numbers.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub code_refs: BTreeMap<String, Vec<u32>>,
    #[serde(default)]
    pub metrics: StepMetrics,
    #[serde(default)]
    pub narration: String,
}

impl Step {
    pub fn new(kind: StepKind, highlight: Highlight) -> Self {
        Self {
            kind,
            subjects: Vec::new(),
            highlight,
            mutation: None,
            code_refs: BTreeMap::new(),
            metrics: StepMetrics::default(),
            narration: String::new(),
        }
    }

    #[must_use]
    pub fn on(mut self, subject: ElementId) -> Self {
        self.subjects.push(subject);
        self
    }

    #[must_use]
    pub fn on_all(mut self, subjects: impl IntoIterator<Item = ElementId>) -> Self {
        self.subjects.extend(subjects);
        self
    }

    #[must_use]
    pub fn indices(self, indices: impl IntoIterator<Item = usize>) -> Self {
        self.on_all(indices.into_iter().map(ElementId::Index))
    }

    #[must_use]
    pub fn mutate(mut self, mutation: Mutation) -> Self {
        self.mutation = Some(mutation);
        self
    }

    #[must_use]
    pub fn lines(mut self, panel: &str, lines: &[u32]) -> Self {
        self.code_refs.insert(panel.to_string(), lines.to_vec());
        self
    }

    #[must_use]
    pub fn says(mut self, narration: impl Into<String>) -> Self {
        self.narration = narration.into();
        self
    }

    #[must_use]
    pub fn compares(mut self, n: u64) -> Self {
        self.metrics.comparisons += n;
        self
    }

    #[must_use]
    pub fn swaps(mut self, n: u64) -> Self {
        self.metrics.swaps += n;
        self
    }

    #[must_use]
    pub fn operations(mut self, n: u64) -> Self {
        self.metrics.operations += n;
        self
    }
}
