//! Prefix tree model.

use std::collections::BTreeMap;

use super::{unsupported, ChildLink, Snapshot, TreeNodeView, VisualModel};
use crate::error::{Error, Result};
use crate::step::{Mutation, NodeId};

/// The root node's id. It carries no character.
pub const TRIE_ROOT: NodeId = NodeId(0);

#[derive(Debug, Clone, PartialEq, Eq)]
struct TrieNode {
    ch: Option<char>,
    parent: Option<NodeId>,
    children: BTreeMap<char, NodeId>,
    terminal: bool,
}

impl TrieNode {
    fn root() -> Self {
        Self {
            ch: None,
            parent: None,
            children: BTreeMap::new(),
            terminal: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Arena {
    nodes: BTreeMap<NodeId, TrieNode>,
    next_id: u64,
}

impl Default for Arena {
    fn default() -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert(TRIE_ROOT, TrieNode::root());
        Self { nodes, next_id: 1 }
    }
}

/// Trie over lowercase words. Children are kept in character order.
#[derive(Debug, Clone, Default)]
pub struct TrieModel {
    current: Arena,
    baseline: Arena,
}

impl TrieModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a trie holding `words`.
    pub fn from_words<S: AsRef<str>>(words: &[S]) -> Result<Self> {
        let mut model = Self::new();
        for word in words {
            let mut node = TRIE_ROOT;
            for ch in word.as_ref().chars() {
                node = match model.child(node, ch) {
                    Some(next) => next,
                    None => {
                        let id = model.allocate_id();
                        model.mutate(&Mutation::AddTrieChild { parent: node, id, ch })?;
                        id
                    }
                };
            }
            model.mutate(&Mutation::SetTerminal { id: node, terminal: true })?;
        }
        model.rebase();
        Ok(model)
    }

    /// Id the next added node should take.
    pub fn next_id(&self) -> NodeId {
        NodeId(self.current.next_id)
    }

    pub fn allocate_id(&mut self) -> NodeId {
        let id = NodeId(self.current.next_id);
        self.current.next_id += 1;
        id
    }

    /// Child of `node` along `ch`.
    pub fn child(&self, node: NodeId, ch: char) -> Option<NodeId> {
        self.current.nodes.get(&node)?.children.get(&ch).copied()
    }

    pub fn is_terminal(&self, node: NodeId) -> bool {
        self.current.nodes.get(&node).is_some_and(|n| n.terminal)
    }

    pub fn child_count(&self, node: NodeId) -> usize {
        self.current.nodes.get(&node).map_or(0, |n| n.children.len())
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.current.nodes.get(&node)?.parent
    }

    /// Whether `word` was inserted as a whole word.
    pub fn contains(&self, word: &str) -> bool {
        self.walk(word).is_some_and(|n| self.is_terminal(n))
    }

    /// Node reached by following `prefix` from the root.
    pub fn walk(&self, prefix: &str) -> Option<NodeId> {
        prefix.chars().try_fold(TRIE_ROOT, |node, ch| self.child(node, ch))
    }

    /// Stored words in lexicographic order.
    pub fn words(&self) -> Vec<String> {
        let mut out = Vec::new();
        let mut prefix = String::new();
        self.collect(TRIE_ROOT, &mut prefix, &mut out);
        out
    }

    fn collect(&self, node: NodeId, prefix: &mut String, out: &mut Vec<String>) {
        let Some(n) = self.current.nodes.get(&node) else {
            return;
        };
        if n.terminal {
            out.push(prefix.clone());
        }
        for (&ch, &child) in &n.children {
            prefix.push(ch);
            self.collect(child, prefix, out);
            prefix.pop();
        }
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.current.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.child_count(TRIE_ROOT) == 0
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut TrieNode> {
        self.current
            .nodes
            .get_mut(&id)
            .ok_or_else(|| Error::inconsistent(format!("trie node {} does not exist", id)))
    }
}

impl VisualModel for TrieModel {
    fn kind(&self) -> &'static str {
        "trie"
    }

    fn mutate(&mut self, mutation: &Mutation) -> Result<()> {
        match *mutation {
            Mutation::AddTrieChild { parent, id, ch } => {
                if self.current.nodes.contains_key(&id) {
                    return Err(Error::inconsistent(format!("trie node {} already exists", id)));
                }
                let node = self.node_mut(parent)?;
                if node.children.contains_key(&ch) {
                    return Err(Error::inconsistent(format!(
                        "trie node {} already has a '{}' child",
                        parent, ch
                    )));
                }
                node.children.insert(ch, id);
                self.current.nodes.insert(
                    id,
                    TrieNode {
                        ch: Some(ch),
                        parent: Some(parent),
                        children: BTreeMap::new(),
                        terminal: false,
                    },
                );
                self.current.next_id = self.current.next_id.max(id.0 + 1);
            }
            Mutation::SetTerminal { id, terminal } => {
                self.node_mut(id)?.terminal = terminal;
            }
            Mutation::RemoveTrieChild { parent, ch } => {
                let child = self
                    .child(parent, ch)
                    .ok_or_else(|| Error::inconsistent(format!("{} has no '{}' child", parent, ch)))?;
                if self.child_count(child) > 0 {
                    return Err(Error::inconsistent(format!("trie node {} still has children", child)));
                }
                self.node_mut(parent)?.children.remove(&ch);
                self.current.nodes.remove(&child);
            }
            ref other => return Err(unsupported(self.kind(), other)),
        }
        Ok(())
    }

    fn snapshot(&self) -> Snapshot {
        let nodes = self
            .current
            .nodes
            .iter()
            .map(|(&id, node)| TreeNodeView {
                id,
                label: node.ch.map_or_else(|| "root".to_string(), String::from),
                children: node
                    .children
                    .values()
                    .map(|&child| ChildLink { id: child, side: None })
                    .collect(),
                terminal: node.terminal,
            })
            .collect();
        Snapshot::Tree {
            root: Some(TRIE_ROOT),
            nodes,
            array: Vec::new(),
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
    fn shares_prefixes() {
        let trie = TrieModel::from_words(&["car", "cat", "do"]).unwrap();
        // root, c, a, r, t, d, o
        assert_eq!(trie.len(), 7);
        assert_eq!(trie.words(), vec!["car", "cat", "do"]);
        assert!(trie.contains("cat"));
        assert!(!trie.contains("ca"));
        assert!(trie.walk("ca").is_some());
    }

    #[test]
    fn remove_requires_leaf() {
        let mut trie = TrieModel::from_words(&["ab"]).unwrap();
        let a = trie.child(TRIE_ROOT, 'a').unwrap();
        let err = trie
            .mutate(&Mutation::RemoveTrieChild { parent: TRIE_ROOT, ch: 'a' })
            .unwrap_err();
        assert!(matches!(err, Error::InconsistentStep(_)));

        trie.mutate(&Mutation::RemoveTrieChild { parent: a, ch: 'b' }).unwrap();
        trie.mutate(&Mutation::RemoveTrieChild { parent: TRIE_ROOT, ch: 'a' }).unwrap();
        assert!(trie.is_empty());
        assert_eq!(trie.len(), 1);
    }

    #[test]
    fn duplicate_child_is_inconsistent() {
        let mut trie = TrieModel::from_words(&["a"]).unwrap();
        let id = trie.allocate_id();
        assert!(trie
            .mutate(&Mutation::AddTrieChild { parent: TRIE_ROOT, id, ch: 'a' })
            .is_err());
    }

    #[test]
    fn snapshot_marks_terminals() {
        let trie = TrieModel::from_words(&["a"]).unwrap();
        let Snapshot::Tree { nodes, .. } = trie.snapshot() else {
            panic!("trie snapshot should be a tree");
        };
        let a = nodes.iter().find(|n| n.label == "a").unwrap();
        assert!(a.terminal);
        assert!(trie.snapshot().hierarchy().is_some());
    }

    #[test]
    fn reset_restores_words() {
        let mut trie = TrieModel::from_words(&["hi"]).unwrap();
        let h = trie.child(TRIE_ROOT, 'h').unwrap();
        let i = trie.child(h, 'i').unwrap();
        trie.mutate(&Mutation::SetTerminal { id: i, terminal: false }).unwrap();
        assert!(trie.words().is_empty());
        trie.reset();
        assert_eq!(trie.words(), vec!["hi"]);
    }
}
