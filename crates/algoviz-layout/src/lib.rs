//! Algoviz Layout
//!
//! Pure geometry for projecting animated data structures onto a 2D canvas.
//!
//! # Hierarchical Layout
//!
//! Trees (binary search trees, heaps, tries, segment trees) are laid out by
//! allocation: every node owns a horizontal band whose width is proportional
//! to the number of nodes in its subtree, and sits at the centre of that band.
//! Depth maps linearly to the vertical axis.
//!
//! A node with a single child would otherwise sit directly above it, hiding
//! whether the child is a left or a right child. Such children (and their
//! subtrees) are nudged half a unit toward their side. The nudge never leaves
//! the parent's band, so subtrees never overlap.
//!
//! # Linear Layouts
//!
//! - Arrays render as bars scaled to the largest value.
//! - Graphs render with their nodes evenly spaced on a ring.

mod linear;
mod tree;

pub use linear::{bar_layout, ring_layout, ring_radius, BarRect, Margin};
pub use tree::{Hierarchy, LayoutConfig, Side, TreeLayout};

use thiserror::Error;

/// Result type for layout operations.
pub type Result<T> = std::result::Result<T, LayoutError>;

/// Errors raised while building a hierarchy.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    /// A referenced node was never added.
    #[error("unknown node {0}")]
    UnknownNode(u64),

    /// A node id was added twice.
    #[error("duplicate node {0}")]
    DuplicateNode(u64),

    /// A node was attached below a second parent.
    #[error("node {0} already has a parent")]
    AlreadyAttached(u64),

    /// The hierarchy has more than one parentless node.
    #[error("hierarchy has {0} roots, expected at most one")]
    MultipleRoots(usize),
}

/// A point on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a new point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}
