//! Allocation-based hierarchical layout.

use std::collections::HashMap;

use crate::{LayoutError, Point, Result};

/// Which side of its parent a child hangs on.
///
/// Only binary structures know their sides; n-ary children (trie edges)
/// are attached with no side and are never nudged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Side {
    Left,
    Right,
}

/// Spacing parameters for a hierarchical layout.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayoutConfig {
    /// Horizontal width allocated per node in a subtree.
    pub unit_width: f64,
    /// Vertical distance between depths.
    pub level_height: f64,
    /// Top margin above the root.
    pub top: f64,
    /// Left margin before the root's band.
    pub left: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            unit_width: 60.0,
            level_height: 80.0,
            top: 40.0,
            left: 20.0,
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    id: u64,
    parent: Option<usize>,
    children: Vec<(usize, Option<Side>)>,
}

/// A rooted hierarchy of node ids, built incrementally.
#[derive(Debug, Clone, Default)]
pub struct Hierarchy {
    entries: Vec<Entry>,
    index: HashMap<u64, usize>,
}

impl Hierarchy {
    /// Create an empty hierarchy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node with no parent yet.
    pub fn add_node(&mut self, id: u64) -> Result<()> {
        if self.index.contains_key(&id) {
            return Err(LayoutError::DuplicateNode(id));
        }
        self.index.insert(id, self.entries.len());
        self.entries.push(Entry {
            id,
            parent: None,
            children: Vec::new(),
        });
        Ok(())
    }

    /// Attach `child` below `parent`, optionally on a known side.
    pub fn attach(&mut self, parent: u64, child: u64, side: Option<Side>) -> Result<()> {
        let p = self.slot(parent)?;
        let c = self.slot(child)?;
        if self.entries[c].parent.is_some() {
            return Err(LayoutError::AlreadyAttached(child));
        }
        self.entries[c].parent = Some(p);
        let children = &mut self.entries[p].children;
        children.push((c, side));
        // Left children always precede right children.
        children.sort_by_key(|(_, side)| match side {
            Some(Side::Left) => 0,
            None => 1,
            Some(Side::Right) => 2,
        });
        Ok(())
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the hierarchy has no nodes.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The single parentless node, if any.
    pub fn root(&self) -> Result<Option<u64>> {
        let roots: Vec<_> = self.entries.iter().filter(|e| e.parent.is_none()).collect();
        match roots.len() {
            0 => Ok(None),
            1 => Ok(Some(roots[0].id)),
            n => Err(LayoutError::MultipleRoots(n)),
        }
    }

    /// Number of nodes in the subtree rooted at `id` (including itself).
    pub fn subtree_size(&self, id: u64) -> Result<usize> {
        let slot = self.slot(id)?;
        Ok(self.sizes()[slot])
    }

    /// Compute node positions.
    pub fn layout(&self, config: &LayoutConfig) -> Result<TreeLayout> {
        let Some(root) = self.root()? else {
            return Ok(TreeLayout::default());
        };
        let sizes = self.sizes();
        let mut layout = TreeLayout::default();
        let mut max_depth = 0;

        // (slot, band start, depth)
        let mut stack = vec![(self.slot(root)?, config.left, 0usize)];
        while let Some((slot, start, depth)) = stack.pop() {
            let entry = &self.entries[slot];
            let band = sizes[slot] as f64 * config.unit_width;
            let x = start + band / 2.0;
            let y = config.top + depth as f64 * config.level_height;
            layout.positions.insert(entry.id, Point::new(x, y));
            max_depth = max_depth.max(depth);

            let nudge = match entry.children.as_slice() {
                [(_, Some(Side::Left))] => -config.unit_width / 2.0,
                [(_, Some(Side::Right))] => config.unit_width / 2.0,
                _ => 0.0,
            };

            let mut cursor = start + config.unit_width / 2.0 + nudge;
            for &(child, _) in &entry.children {
                layout.edges.push((entry.id, self.entries[child].id));
                stack.push((child, cursor, depth + 1));
                cursor += sizes[child] as f64 * config.unit_width;
            }
        }

        layout.width = sizes[self.slot(root)?] as f64 * config.unit_width + 2.0 * config.left;
        layout.height = 2.0 * config.top + max_depth as f64 * config.level_height;
        Ok(layout)
    }

    fn slot(&self, id: u64) -> Result<usize> {
        self.index.get(&id).copied().ok_or(LayoutError::UnknownNode(id))
    }

    /// Subtree sizes by slot, computed children-first.
    fn sizes(&self) -> Vec<usize> {
        let mut sizes = vec![1usize; self.entries.len()];
        let mut order = Vec::with_capacity(self.entries.len());
        let mut stack: Vec<usize> = (0..self.entries.len())
            .filter(|&i| self.entries[i].parent.is_none())
            .collect();
        while let Some(slot) = stack.pop() {
            order.push(slot);
            stack.extend(self.entries[slot].children.iter().map(|(c, _)| *c));
        }
        for &slot in order.iter().rev() {
            if let Some(parent) = self.entries[slot].parent {
                sizes[parent] += sizes[slot];
            }
        }
        sizes
    }
}

/// Computed positions for a hierarchy.
#[derive(Debug, Clone, Default)]
pub struct TreeLayout {
    positions: HashMap<u64, Point>,
    edges: Vec<(u64, u64)>,
    /// Total canvas width needed, margins included.
    pub width: f64,
    /// Total canvas height needed, margins included.
    pub height: f64,
}

impl TreeLayout {
    /// Position of a node.
    pub fn position(&self, id: u64) -> Option<Point> {
        self.positions.get(&id).copied()
    }

    /// Parent/child pairs, parents first.
    pub fn edges(&self) -> &[(u64, u64)] {
        &self.edges
    }

    /// Number of positioned nodes.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether nothing was positioned.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Iterate over all positions.
    pub fn iter(&self) -> impl Iterator<Item = (u64, Point)> + '_ {
        self.positions.iter().map(|(id, p)| (*id, *p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn bst(values: &[i64]) -> Hierarchy {
        // Node id == value for test trees.
        let mut h = Hierarchy::new();
        let mut children: HashMap<i64, (Option<i64>, Option<i64>)> = HashMap::new();
        let mut root: Option<i64> = None;
        for &v in values {
            if children.contains_key(&v) {
                continue;
            }
            h.add_node(v as u64).unwrap();
            children.insert(v, (None, None));
            let Some(mut cur) = root else {
                root = Some(v);
                continue;
            };
            loop {
                let (l, r) = children[&cur];
                if v < cur {
                    match l {
                        Some(next) => cur = next,
                        None => {
                            children.get_mut(&cur).unwrap().0 = Some(v);
                            h.attach(cur as u64, v as u64, Some(Side::Left)).unwrap();
                            break;
                        }
                    }
                } else {
                    match r {
                        Some(next) => cur = next,
                        None => {
                            children.get_mut(&cur).unwrap().1 = Some(v);
                            h.attach(cur as u64, v as u64, Some(Side::Right)).unwrap();
                            break;
                        }
                    }
                }
            }
        }
        h
    }

    #[test]
    fn empty_hierarchy_has_empty_layout() {
        let layout = Hierarchy::new().layout(&LayoutConfig::default()).unwrap();
        assert!(layout.is_empty());
    }

    #[test]
    fn root_is_centered_in_its_band() {
        let h = bst(&[5, 3, 8]);
        let cfg = LayoutConfig::default();
        let layout = h.layout(&cfg).unwrap();
        let root = layout.position(5).unwrap();
        assert_eq!(root.x, cfg.left + 3.0 * cfg.unit_width / 2.0);
        assert_eq!(root.y, cfg.top);
    }

    #[test]
    fn depth_maps_linearly_to_y() {
        let h = bst(&[5, 3, 1]);
        let cfg = LayoutConfig::default();
        let layout = h.layout(&cfg).unwrap();
        assert_eq!(layout.position(3).unwrap().y, cfg.top + cfg.level_height);
        assert_eq!(layout.position(1).unwrap().y, cfg.top + 2.0 * cfg.level_height);
    }

    #[test]
    fn single_left_child_is_strictly_left() {
        let layout = bst(&[5, 3]).layout(&LayoutConfig::default()).unwrap();
        assert!(layout.position(3).unwrap().x < layout.position(5).unwrap().x);
    }

    #[test]
    fn single_right_child_is_strictly_right() {
        let layout = bst(&[5, 8]).layout(&LayoutConfig::default()).unwrap();
        assert!(layout.position(8).unwrap().x > layout.position(5).unwrap().x);
    }

    #[test]
    fn unsided_single_child_stays_below_parent() {
        let mut h = Hierarchy::new();
        h.add_node(1).unwrap();
        h.add_node(2).unwrap();
        h.attach(1, 2, None).unwrap();
        let layout = h.layout(&LayoutConfig::default()).unwrap();
        assert_eq!(layout.position(1).unwrap().x, layout.position(2).unwrap().x);
    }

    #[test]
    fn subtree_sizes_count_descendants() {
        let h = bst(&[5, 3, 8, 1, 4]);
        assert_eq!(h.subtree_size(5).unwrap(), 5);
        assert_eq!(h.subtree_size(3).unwrap(), 3);
        assert_eq!(h.subtree_size(8).unwrap(), 1);
    }

    #[test]
    fn attach_rejects_second_parent() {
        let mut h = Hierarchy::new();
        for id in 1..=3 {
            h.add_node(id).unwrap();
        }
        h.attach(1, 3, None).unwrap();
        assert_eq!(h.attach(2, 3, None), Err(LayoutError::AlreadyAttached(3)));
    }

    #[test]
    fn detects_multiple_roots() {
        let mut h = Hierarchy::new();
        h.add_node(1).unwrap();
        h.add_node(2).unwrap();
        assert_eq!(h.root(), Err(LayoutError::MultipleRoots(2)));
        assert!(h.layout(&LayoutConfig::default()).is_err());
    }

    #[test]
    fn edges_follow_structure() {
        let layout = bst(&[5, 3, 8]).layout(&LayoutConfig::default()).unwrap();
        let mut edges = layout.edges().to_vec();
        edges.sort();
        assert_eq!(edges, vec![(5, 3), (5, 8)]);
    }

    proptest! {
        #[test]
        fn same_depth_nodes_never_overlap(values in proptest::collection::vec(0i64..200, 1..40)) {
            let h = bst(&values);
            let cfg = LayoutConfig::default();
            let layout = h.layout(&cfg).unwrap();
            let mut by_depth: HashMap<i64, Vec<f64>> = HashMap::new();
            for (_, p) in layout.iter() {
                by_depth.entry(p.y as i64).or_default().push(p.x);
            }
            for xs in by_depth.values_mut() {
                xs.sort_by(|a, b| a.partial_cmp(b).unwrap());
                for pair in xs.windows(2) {
                    prop_assert!(pair[1] - pair[0] >= cfg.unit_width - 1e-9);
                }
            }
        }

        #[test]
        fn every_node_fits_the_canvas(values in proptest::collection::vec(0i64..200, 1..40)) {
            let layout = bst(&values).layout(&LayoutConfig::default()).unwrap();
            for (_, p) in layout.iter() {
                prop_assert!(p.x > 0.0 && p.x < layout.width);
                prop_assert!(p.y > 0.0 && p.y < layout.height);
            }
        }
    }
}
