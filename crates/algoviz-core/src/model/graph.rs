//! Undirected weighted graph model.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{unsupported, EdgeView, GraphNodeView, Snapshot, VisualModel};
use crate::error::{Error, Result};
use crate::step::{EdgeState, Mutation, NodeId};

/// An undirected edge. `from < to` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
    pub weight: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Marks {
    distance: Vec<Option<u64>>,
    previous: Vec<Option<NodeId>>,
    visited: Vec<bool>,
    edges: BTreeMap<(NodeId, NodeId), EdgeState>,
}

impl Marks {
    fn clean(n: usize) -> Self {
        Self {
            distance: vec![None; n],
            previous: vec![None; n],
            visited: vec![false; n],
            edges: BTreeMap::new(),
        }
    }
}

fn key(a: NodeId, b: NodeId) -> (NodeId, NodeId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Graph with per-node search state and per-edge marks.
///
/// The topology is fixed at construction; only marks change.
#[derive(Debug, Clone)]
pub struct GraphModel {
    labels: Vec<String>,
    edges: Vec<Edge>,
    adjacency: Vec<Vec<(usize, u64)>>,
    marks: Marks,
}

/// Heaviest edge accepted by [`GraphModel::new`].
pub const MAX_WEIGHT: u64 = 1_000_000;

/// Node label for position `i`: A..Z, then numbered.
pub fn node_label(i: usize) -> String {
    if i < 26 {
        char::from(b'A' + i as u8).to_string()
    } else {
        format!("N{}", i)
    }
}

impl GraphModel {
    /// Build a graph over `n` nodes from `(a, b, weight)` triples.
    ///
    /// Self loops, duplicate edges, unknown endpoints and weights outside
    /// `1..=MAX_WEIGHT` are rejected.
    pub fn new(n: usize, edges: &[(usize, usize, u64)]) -> Result<Self> {
        if n == 0 {
            return Err(Error::invalid("graph needs at least one node"));
        }
        let mut adjacency = vec![Vec::new(); n];
        let mut seen = Vec::with_capacity(edges.len());
        for &(a, b, weight) in edges {
            if a >= n || b >= n {
                return Err(Error::invalid(format!("edge {}-{} references a missing node", a, b)));
            }
            if a == b {
                return Err(Error::invalid(format!("self loop on node {}", a)));
            }
            if weight == 0 || weight > MAX_WEIGHT {
                return Err(Error::invalid(format!(
                    "edge {}-{} has weight {}, expected 1..={}",
                    a, b, weight, MAX_WEIGHT
                )));
            }
            let (from, to) = key(NodeId(a as u64), NodeId(b as u64));
            if seen.iter().any(|e: &Edge| e.from == from && e.to == to) {
                return Err(Error::invalid(format!("duplicate edge {}-{}", a, b)));
            }
            seen.push(Edge { from, to, weight });
            adjacency[a].push((b, weight));
            adjacency[b].push((a, weight));
        }
        Ok(Self {
            labels: (0..n).map(node_label).collect(),
            edges: seen,
            adjacency,
            marks: Marks::clean(n),
        })
    }

    /// The fixed six-node weighted graph used by the shortest-path demo.
    ///
    /// Shortest A to F distance is 13 along A C B D E F.
    pub fn sample_weighted() -> Self {
        const EDGES: [(usize, usize, u64); 9] = [
            (0, 1, 4),
            (0, 2, 2),
            (1, 2, 1),
            (1, 3, 5),
            (2, 3, 8),
            (2, 4, 10),
            (3, 4, 2),
            (3, 5, 6),
            (4, 5, 3),
        ];
        let mut adjacency = vec![Vec::new(); 6];
        let mut edges = Vec::new();
        for (a, b, weight) in EDGES {
            adjacency[a].push((b, weight));
            adjacency[b].push((a, weight));
            edges.push(Edge {
                from: NodeId(a as u64),
                to: NodeId(b as u64),
                weight,
            });
        }
        Self {
            labels: (0..6).map(node_label).collect(),
            edges,
            adjacency,
            marks: Marks::clean(6),
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn label(&self, node: usize) -> &str {
        self.labels.get(node).map_or("?", String::as_str)
    }

    /// Neighbours of `node` with edge weights, in insertion order.
    pub fn neighbors(&self, node: usize) -> &[(usize, u64)] {
        self.adjacency.get(node).map_or(&[], Vec::as_slice)
    }

    pub fn distance(&self, node: usize) -> Option<u64> {
        self.marks.distance.get(node).copied().flatten()
    }

    pub fn previous(&self, node: usize) -> Option<NodeId> {
        self.marks.previous.get(node).copied().flatten()
    }

    pub fn is_visited(&self, node: usize) -> bool {
        self.marks.visited.get(node).copied().unwrap_or(false)
    }

    pub fn edge_state(&self, a: usize, b: usize) -> EdgeState {
        self.marks
            .edges
            .get(&key(NodeId(a as u64), NodeId(b as u64)))
            .copied()
            .unwrap_or(EdgeState::Idle)
    }

    /// Visited nodes in index order.
    pub fn visited(&self) -> Vec<usize> {
        (0..self.len()).filter(|&i| self.is_visited(i)).collect()
    }

    /// Follow `previous` links back from `target`.
    pub fn path_to(&self, target: usize) -> Vec<usize> {
        let mut path = vec![target];
        let mut cur = target;
        while let Some(prev) = self.previous(cur) {
            cur = prev.0 as usize;
            if path.contains(&cur) {
                break;
            }
            path.push(cur);
        }
        path.reverse();
        path
    }

    /// Whether every node is reachable from node 0.
    pub fn is_connected(&self) -> bool {
        let mut seen = vec![false; self.len()];
        let mut stack = vec![0];
        while let Some(node) = stack.pop() {
            if std::mem::replace(&mut seen[node], true) {
                continue;
            }
            stack.extend(self.neighbors(node).iter().map(|&(n, _)| n));
        }
        seen.into_iter().all(|s| s)
    }

    fn index(&self, node: NodeId) -> Result<usize> {
        let i = node.0 as usize;
        if i < self.len() {
            Ok(i)
        } else {
            Err(Error::inconsistent(format!("graph has no node {}", node)))
        }
    }
}

impl VisualModel for GraphModel {
    fn kind(&self) -> &'static str {
        "graph"
    }

    fn mutate(&mut self, mutation: &Mutation) -> Result<()> {
        match *mutation {
            Mutation::SetDistance {
                node,
                distance,
                previous,
            } => {
                let i = self.index(node)?;
                if let Some(prev) = previous {
                    self.index(prev)?;
                }
                self.marks.distance[i] = Some(distance);
                self.marks.previous[i] = previous;
            }
            Mutation::MarkVisited { node } => {
                let i = self.index(node)?;
                self.marks.visited[i] = true;
            }
            Mutation::MarkEdge { from, to, state } => {
                let k = key(from, to);
                if !self.edges.iter().any(|e| (e.from, e.to) == k) {
                    return Err(Error::inconsistent(format!("no edge between {} and {}", from, to)));
                }
                self.marks.edges.insert(k, state);
            }
            ref other => return Err(unsupported(self.kind(), other)),
        }
        Ok(())
    }

    fn snapshot(&self) -> Snapshot {
        let nodes = (0..self.len())
            .map(|i| GraphNodeView {
                id: NodeId(i as u64),
                label: self.labels[i].clone(),
                distance: self.distance(i),
                previous: self.previous(i),
                visited: self.is_visited(i),
            })
            .collect();
        let edges = self
            .edges
            .iter()
            .map(|e| EdgeView {
                from: e.from,
                to: e.to,
                weight: e.weight,
                state: self.marks.edges.get(&(e.from, e.to)).copied().unwrap_or(EdgeState::Idle),
            })
            .collect();
        Snapshot::Graph { nodes, edges }
    }

    fn reset(&mut self) {
        self.marks = Marks::clean(self.len());
    }

    // Search marks are run state; the baseline is always the bare topology.
    fn rebase(&mut self) {}

    fn clone_box(&self) -> Box<dyn VisualModel> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_graph_shape() {
        let g = GraphModel::sample_weighted();
        assert_eq!(g.len(), 6);
        assert_eq!(g.edges().len(), 9);
        assert_eq!(g.neighbors(0), &[(1, 4), (2, 2)]);
        assert!(g.is_connected());
        assert_eq!(g.label(5), "F");
    }

    #[test]
    fn rejects_bad_edges() {
        assert!(GraphModel::new(3, &[(0, 3, 1)]).is_err());
        assert!(GraphModel::new(3, &[(1, 1, 1)]).is_err());
        assert!(GraphModel::new(3, &[(0, 1, 1), (1, 0, 2)]).is_err());
        assert!(GraphModel::new(3, &[(0, 1, 0)]).is_err());
        assert!(GraphModel::new(0, &[]).is_err());
        assert!(GraphModel::new(2, &[(0, 1, MAX_WEIGHT + 1)]).is_err());
        assert!(GraphModel::new(2, &[(0, 1, MAX_WEIGHT)]).is_ok());
    }

    #[test]
    fn marks_and_reset() {
        let mut g = GraphModel::new(3, &[(0, 1, 1), (1, 2, 1)]).unwrap();
        g.mutate(&Mutation::MarkVisited { node: NodeId(1) }).unwrap();
        g.mutate(&Mutation::MarkEdge { from: NodeId(2), to: NodeId(1), state: EdgeState::Visited })
            .unwrap();
        assert_eq!(g.edge_state(1, 2), EdgeState::Visited);
        assert_eq!(g.visited(), vec![1]);

        let err = g
            .mutate(&Mutation::MarkEdge { from: NodeId(0), to: NodeId(2), state: EdgeState::Path })
            .unwrap_err();
        assert!(matches!(err, Error::InconsistentStep(_)));

        g.reset();
        assert!(g.visited().is_empty());
        assert_eq!(g.edge_state(1, 2), EdgeState::Idle);
    }

    #[test]
    fn path_follows_previous_links() {
        let mut g = GraphModel::new(3, &[(0, 1, 1), (1, 2, 1)]).unwrap();
        g.mutate(&Mutation::SetDistance { node: NodeId(0), distance: 0, previous: None }).unwrap();
        g.mutate(&Mutation::SetDistance { node: NodeId(1), distance: 1, previous: Some(NodeId(0)) })
            .unwrap();
        g.mutate(&Mutation::SetDistance { node: NodeId(2), distance: 2, previous: Some(NodeId(1)) })
            .unwrap();
        assert_eq!(g.path_to(2), vec![0, 1, 2]);
        assert_eq!(g.distance(2), Some(2));
    }
}
