//! Binary search tree model.
//!
//! Each node exclusively owns its children. Node ids are stable: a node keeps
//! its id however the tree is relinked around it.

use algoviz_layout::Side;

use super::{unsupported, ChildLink, Snapshot, TreeNodeView, VisualModel};
use crate::error::{Error, Result};
use crate::step::{Mutation, NodeId};

type Link = Option<Box<BstNode>>;

/// A tree node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BstNode {
    id: NodeId,
    value: i64,
    left: Link,
    right: Link,
}

impl BstNode {
    fn new(id: NodeId, value: i64) -> Self {
        Self {
            id,
            value,
            left: None,
            right: None,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    pub fn left(&self) -> Option<&BstNode> {
        self.left.as_deref()
    }

    pub fn right(&self) -> Option<&BstNode> {
        self.right.as_deref()
    }

    pub fn child(&self, side: Side) -> Option<&BstNode> {
        match side {
            Side::Left => self.left(),
            Side::Right => self.right(),
        }
    }

    fn child_mut(&mut self, side: Side) -> &mut Link {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }
}

fn find(link: &Link, id: NodeId) -> Option<&BstNode> {
    let node = link.as_deref()?;
    if node.id == id {
        return Some(node);
    }
    find(&node.left, id).or_else(|| find(&node.right, id))
}

/// The link that owns node `id`.
fn owning_link(link: &mut Link, id: NodeId) -> Option<&mut Link> {
    if link.as_ref().is_some_and(|n| n.id == id) {
        return Some(link);
    }
    let node = link.as_mut()?;
    if find(&node.left, id).is_some() {
        owning_link(&mut node.left, id)
    } else {
        owning_link(&mut node.right, id)
    }
}

fn node_mut(link: &mut Link, id: NodeId) -> Option<&mut BstNode> {
    owning_link(link, id).and_then(|l| l.as_deref_mut())
}

/// Binary search tree over distinct integer values.
#[derive(Debug, Clone, Default)]
pub struct BstModel {
    root: Link,
    baseline: Link,
    next_id: u64,
}

impl BstModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree by inserting `values` in order. Duplicates are rejected.
    pub fn from_values(values: &[i64]) -> Result<Self> {
        let mut model = Self::new();
        for &value in values {
            if model.contains(value) {
                return Err(Error::invalid(format!("duplicate value {}", value)));
            }
            let (parent, side) = model.insertion_point(value);
            let id = model.allocate_id();
            model.mutate(&Mutation::AttachNode {
                parent,
                side,
                id,
                value,
            })?;
        }
        model.rebase();
        Ok(model)
    }

    pub fn root(&self) -> Option<&BstNode> {
        self.root.as_deref()
    }

    pub fn node(&self, id: NodeId) -> Option<&BstNode> {
        find(&self.root, id)
    }

    pub fn contains(&self, value: i64) -> bool {
        let mut cur = self.root();
        while let Some(node) = cur {
            if value == node.value {
                return true;
            }
            cur = if value < node.value { node.left() } else { node.right() };
        }
        false
    }

    /// Parent and side a new `value` would hang from.
    pub fn insertion_point(&self, value: i64) -> (Option<NodeId>, Side) {
        let mut parent = None;
        let mut side = Side::Left;
        let mut cur = self.root();
        while let Some(node) = cur {
            parent = Some(node.id);
            side = if value < node.value { Side::Left } else { Side::Right };
            cur = node.child(side);
        }
        (parent, side)
    }

    /// Id the next attached node should take.
    pub fn next_id(&self) -> NodeId {
        NodeId(self.next_id)
    }

    /// Reserve a fresh node id.
    pub fn allocate_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn len(&self) -> usize {
        self.in_order().len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Values in in-order sequence.
    pub fn in_order(&self) -> Vec<i64> {
        let mut out = Vec::new();
        let mut stack: Vec<&BstNode> = Vec::new();
        let mut cur = self.root();
        while cur.is_some() || !stack.is_empty() {
            while let Some(node) = cur {
                stack.push(node);
                cur = node.left();
            }
            if let Some(node) = stack.pop() {
                out.push(node.value);
                cur = node.right();
            }
        }
        out
    }

    /// Whether every node's left subtree is smaller and right subtree larger.
    pub fn is_valid_bst(&self) -> bool {
        self.in_order().windows(2).all(|w| w[0] < w[1])
    }

    pub fn height(&self) -> usize {
        fn depth(node: Option<&BstNode>) -> usize {
            node.map_or(0, |n| 1 + depth(n.left()).max(depth(n.right())))
        }
        depth(self.root())
    }

    fn attach(&mut self, parent: Option<NodeId>, side: Side, id: NodeId, value: i64) -> Result<()> {
        if self.node(id).is_some() {
            return Err(Error::inconsistent(format!("node {} already exists", id)));
        }
        let slot = match parent {
            None => &mut self.root,
            Some(parent) => node_mut(&mut self.root, parent)
                .ok_or_else(|| Error::inconsistent(format!("parent {} not in tree", parent)))?
                .child_mut(side),
        };
        if slot.is_some() {
            return Err(Error::inconsistent(format!("{:?} slot of {:?} is occupied", side, parent)));
        }
        *slot = Some(Box::new(BstNode::new(id, value)));
        self.next_id = self.next_id.max(id.0 + 1);
        Ok(())
    }

    fn splice(&mut self, id: NodeId) -> Result<()> {
        let link = owning_link(&mut self.root, id)
            .ok_or_else(|| Error::inconsistent(format!("node {} not in tree", id)))?;
        if link.as_ref().is_some_and(|n| n.left.is_some() && n.right.is_some()) {
            return Err(Error::inconsistent(format!("node {} has two children", id)));
        }
        if let Some(mut node) = link.take() {
            *link = node.left.take().or_else(|| node.right.take());
        }
        Ok(())
    }
}

impl VisualModel for BstModel {
    fn kind(&self) -> &'static str {
        "bst"
    }

    fn mutate(&mut self, mutation: &Mutation) -> Result<()> {
        match *mutation {
            Mutation::AttachNode {
                parent,
                side,
                id,
                value,
            } => self.attach(parent, side, id, value),
            Mutation::SetNodeValue { id, value } => {
                let node = node_mut(&mut self.root, id)
                    .ok_or_else(|| Error::inconsistent(format!("node {} not in tree", id)))?;
                node.value = value;
                Ok(())
            }
            Mutation::SpliceNode { id } => self.splice(id),
            ref other => Err(unsupported(self.kind(), other)),
        }
    }

    fn snapshot(&self) -> Snapshot {
        let mut nodes = Vec::new();
        let mut stack: Vec<&BstNode> = self.root().into_iter().collect();
        while let Some(node) = stack.pop() {
            let mut children = Vec::new();
            for side in [Side::Left, Side::Right] {
                if let Some(child) = node.child(side) {
                    children.push(ChildLink {
                        id: child.id,
                        side: Some(side),
                    });
                    stack.push(child);
                }
            }
            nodes.push(TreeNodeView {
                id: node.id,
                label: node.value.to_string(),
                children,
                terminal: false,
            });
        }
        Snapshot::Tree {
            root: self.root().map(|n| n.id),
            nodes,
            array: Vec::new(),
        }
    }

    fn reset(&mut self) {
        self.root = self.baseline.clone();
    }

    fn rebase(&mut self) {
        self.baseline = self.root.clone();
    }

    fn clone_box(&self) -> Box<dyn VisualModel> {
        Box::new(self.clone())
    }
}
