//! A renderer that prints each frame as text.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as _;
use std::io::Write;

use algoviz_core::model::{ArrayShape, EdgeView, GraphNodeView, TreeNodeView};
use algoviz_core::{ElementId, Highlight, NodeId, Snapshot};
use algoviz_player::{Error, Frame, Renderer, Result};
use colored::{Color, Colorize};

/// Widest bar, in characters.
const BAR_WIDTH: usize = 40;

fn color_of(highlight: Highlight) -> Option<Color> {
    match highlight {
        Highlight::Comparing | Highlight::Examining | Highlight::ExaminingLeft | Highlight::ExaminingRight => {
            Some(Color::Yellow)
        }
        Highlight::Swapping | Highlight::Deleting => Some(Color::Red),
        Highlight::Pivot => Some(Color::Magenta),
        Highlight::Sorted | Highlight::Found | Highlight::Optimal | Highlight::Visited => Some(Color::Green),
        Highlight::Inserting | Highlight::Replacing => Some(Color::Cyan),
        Highlight::Visiting
        | Highlight::Current
        | Highlight::Start
        | Highlight::End
        | Highlight::PathLeft
        | Highlight::PathRight => Some(Color::Blue),
        Highlight::Highlighted => Some(Color::White),
        Highlight::None => None,
    }
}

/// Prints frames to any writer: bars for arrays, an indented outline for
/// trees, an adjacency list for graphs and a table for DP grids.
///
/// Highlighted elements are colored, or marked with `*` when color is off.
pub struct TerminalRenderer<W> {
    out: W,
    color: bool,
    highlights: BTreeMap<ElementId, Highlight>,
    /// Largest magnitude seen at the last reflow; bars scale against it.
    scale: i64,
}

impl<W: Write + Send> TerminalRenderer<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self {
            out,
            color,
            highlights: BTreeMap::new(),
            scale: 1,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn paint(&self, text: &str, element: ElementId) -> String {
        let Some(highlight) = self.highlights.get(&element).copied() else {
            return text.to_string();
        };
        match (self.color, color_of(highlight)) {
            (true, Some(color)) => text.color(color).bold().to_string(),
            (false, Some(_)) => format!("{}*", text),
            (_, None) => text.to_string(),
        }
    }

    fn bars(&self, buf: &mut String, values: &[i64]) {
        let scale = values.iter().map(|v| v.abs()).max().unwrap_or(0).max(self.scale).max(1);
        for (i, &value) in values.iter().enumerate() {
            let len = ((value.unsigned_abs() as usize) * BAR_WIDTH).div_ceil(scale as usize);
            let bar = "█".repeat(len.max(1));
            let _ = writeln!(buf, "{:>3} {} {}", i, self.paint(&bar, ElementId::Index(i)), value);
        }
    }

    fn outline(&self, buf: &mut String, root: Option<NodeId>, nodes: &[TreeNodeView]) {
        let by_id: HashMap<NodeId, &TreeNodeView> = nodes.iter().map(|n| (n.id, n)).collect();
        let mut stack: Vec<(NodeId, usize, &str)> = root.map(|r| (r, 0, "")).into_iter().collect();
        while let Some((id, depth, tag)) = stack.pop() {
            let Some(node) = by_id.get(&id) else {
                continue;
            };
            let mark = if node.terminal { " ($)" } else { "" };
            let label = format!("{}{}", node.label, mark);
            let _ = writeln!(buf, "{}{}{}", "  ".repeat(depth), tag, self.paint(&label, ElementId::Node(id)));
            for child in node.children.iter().rev() {
                let tag = match child.side {
                    Some(algoviz_core::Side::Left) => "L: ",
                    Some(algoviz_core::Side::Right) => "R: ",
                    None => "",
                };
                stack.push((child.id, depth + 1, tag));
            }
        }
    }

    fn adjacency(&self, buf: &mut String, nodes: &[GraphNodeView], edges: &[EdgeView]) {
        let labels: HashMap<NodeId, &str> = nodes.iter().map(|n| (n.id, n.label.as_str())).collect();
        for node in nodes {
            let distance = match node.distance {
                Some(d) => d.to_string(),
                None => "∞".to_string(),
            };
            let neighbors: Vec<String> = edges
                .iter()
                .filter_map(|e| {
                    let other = if e.from == node.id {
                        e.to
                    } else if e.to == node.id {
                        e.from
                    } else {
                        return None;
                    };
                    let text = format!("{}({})", labels.get(&other).copied().unwrap_or("?"), e.weight);
                    Some(self.paint(&text, edge_id(e.from, e.to)))
                })
                .collect();
            let _ = writeln!(
                buf,
                "{} [d={}] -> {}",
                self.paint(&node.label, ElementId::Node(node.id)),
                distance,
                neighbors.join(", ")
            );
        }
    }

    fn table(&self, buf: &mut String, row_labels: &[String], col_labels: &[String], cells: &[Vec<Option<i64>>]) {
        let _ = write!(buf, "{:>6}", "");
        for label in col_labels {
            let _ = write!(buf, "{:>5}", label);
        }
        buf.push('\n');
        for (r, row) in cells.iter().enumerate() {
            let _ = write!(buf, "{:>6}", row_labels.get(r).map(String::as_str).unwrap_or(""));
            for (c, cell) in row.iter().enumerate() {
                let text = match cell {
                    Some(v) => format!("{:>5}", v),
                    None => format!("{:>5}", "."),
                };
                buf.push_str(&self.paint(&text, ElementId::Cell(r, c)));
            }
            buf.push('\n');
        }
    }
}

/// Edges are undirected; highlights may name either direction.
fn edge_id(a: NodeId, b: NodeId) -> ElementId {
    ElementId::Edge(a.min(b), a.max(b))
}

fn normalize(element: ElementId) -> ElementId {
    match element {
        ElementId::Edge(a, b) => edge_id(a, b),
        other => other,
    }
}

impl<W: Write + Send> Renderer for TerminalRenderer<W> {
    fn draw(&mut self, snapshot: &Snapshot, frame: &Frame) -> Result<()> {
        self.highlights.clear();
        if frame.highlight != Highlight::None {
            for subject in &frame.subjects {
                self.highlights.insert(normalize(*subject), frame.highlight);
            }
        }

        let mut buf = String::new();
        match frame.step {
            Some(index) => {
                let _ = writeln!(buf, "step {}: {}", index + 1, frame.narration);
            }
            None => buf.push_str("initial state\n"),
        }
        match snapshot {
            Snapshot::Array { values, shape, .. } => {
                if *shape == ArrayShape::Heap {
                    buf.push_str("heap\n");
                }
                self.bars(&mut buf, values);
            }
            Snapshot::Tree { root, nodes, array } => {
                self.outline(&mut buf, *root, nodes);
                if !array.is_empty() {
                    let _ = writeln!(buf, "array: {:?}", array);
                }
            }
            Snapshot::Graph { nodes, edges } => self.adjacency(&mut buf, nodes, edges),
            Snapshot::Grid {
                row_labels,
                col_labels,
                cells,
            } => self.table(&mut buf, row_labels, col_labels, cells),
        }
        buf.push('\n');

        self.out
            .write_all(buf.as_bytes())
            .and_then(|_| self.out.flush())
            .map_err(|e| Error::Render(e.to_string()))
    }

    fn clear_highlights(&mut self) {
        self.highlights.clear();
    }

    fn reflow(&mut self, snapshot: &Snapshot) -> Result<()> {
        self.scale = match snapshot {
            Snapshot::Array { values, .. } => values.iter().map(|v| v.abs()).max().unwrap_or(1).max(1),
            _ => 1,
        };
        Ok(())
    }

    fn highlighted(&self) -> usize {
        self.highlights.len()
    }
}
