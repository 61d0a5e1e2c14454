//! Binary search tree insert, delete, search and traversals.
//!
//! Recursive operations emit an examining step before descending into a child
//! and a concluding step for each ancestor as the recursion unwinds.

use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use algoviz_layout::Side;
use serde::{Deserialize, Serialize};

use super::{Outcome, Recorder, StepProgram};
use crate::catalog::Algorithm;
use crate::error::{Error, Result};
use crate::model::BstModel;
use crate::step::{ElementId, Highlight, Mutation, NodeId, Step, StepKind};

/// Traversal order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Traversal {
    InOrder,
    PreOrder,
    PostOrder,
    LevelOrder,
}

impl fmt::Display for Traversal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Traversal::InOrder => "in-order",
            Traversal::PreOrder => "pre-order",
            Traversal::PostOrder => "post-order",
            Traversal::LevelOrder => "level-order",
        })
    }
}

impl FromStr for Traversal {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "inorder" => Ok(Traversal::InOrder),
            "preorder" => Ok(Traversal::PreOrder),
            "postorder" => Ok(Traversal::PostOrder),
            "levelorder" | "bfs" => Ok(Traversal::LevelOrder),
            _ => Err(Error::invalid(format!("unknown traversal '{}'", s))),
        }
    }
}

fn side_name(side: Side) -> &'static str {
    match side {
        Side::Left => "LEFT",
        Side::Right => "RIGHT",
    }
}

fn node(id: NodeId) -> ElementId {
    ElementId::Node(id)
}

/// A node's value and children as seen by the recorder right now.
fn parts(rec: &Recorder<BstModel>, id: NodeId) -> Result<(i64, Option<NodeId>, Option<NodeId>)> {
    let n = rec
        .model()
        .node(id)
        .ok_or_else(|| Error::inconsistent(format!("node {} vanished", id)))?;
    Ok((n.value(), n.left().map(|c| c.id()), n.right().map(|c| c.id())))
}

/// Descent from the root, as taken on the way down.
struct Hop {
    id: NodeId,
    value: i64,
    side: Side,
}

/// Emit the examine and turn steps at one node, returning the side taken.
fn descend(rec: &mut Recorder<BstModel>, id: NodeId, at: i64, value: i64, lines: [&[u32]; 3]) -> Result<Side> {
    rec.emit(
        lines[0],
        Step::new(StepKind::Examine, Highlight::Examining)
            .on(node(id))
            .compares(1)
            .says(format!("Compare {} with {}", value, at)),
    )?;
    let (side, highlight, turn, why) = if value < at {
        (Side::Left, Highlight::ExaminingLeft, lines[1], "smaller")
    } else {
        (Side::Right, Highlight::ExaminingRight, lines[2], "larger")
    };
    rec.emit(
        turn,
        Step::new(StepKind::Examine, highlight)
            .on(node(id))
            .says(format!("{} is {} than {}, go {}", value, why, at, side_name(side).to_lowercase())),
    )?;
    Ok(side)
}

/// Concluding steps for each ancestor, deepest first.
fn unwind(rec: &mut Recorder<BstModel>, path: &[Hop], lines: &[u32]) -> Result<()> {
    for hop in path.iter().rev() {
        let highlight = match hop.side {
            Side::Left => Highlight::PathLeft,
            Side::Right => Highlight::PathRight,
        };
        rec.emit(
            lines,
            Step::new(StepKind::Conclude, highlight)
                .on(node(hop.id))
                .says(format!("Return to {}", hop.value)),
        )?;
    }
    Ok(())
}

/// Insert `value`, rejecting duplicates.
pub fn insert(tree: &BstModel, value: i64) -> Result<StepProgram> {
    if tree.contains(value) {
        return Err(Error::invalid(format!("{} is already in the tree", value)));
    }
    let mut rec = Recorder::new(Algorithm::BstInsert, tree.clone());
    let mut path: Vec<Hop> = Vec::new();
    let mut cur = rec.model().root().map(|n| n.id());

    while let Some(id) = cur {
        let (at, left, right) = parts(&rec, id)?;
        let side = descend(&mut rec, id, at, value, [&[2, 4], &[5], &[6, 7]])?;
        path.push(Hop { id, value: at, side });
        cur = match side {
            Side::Left => left,
            Side::Right => right,
        };
    }

    let id = rec.model().next_id();
    let (parent, side, narration) = match path.last() {
        Some(hop) => (
            Some(hop.id),
            hop.side,
            format!("Inserted {} as {} child of {}", value, side_name(hop.side), hop.value),
        ),
        None => (None, Side::Left, format!("Inserted {} as the root", value)),
    };
    rec.emit(
        &[2, 3],
        Step::new(StepKind::Mutate, Highlight::Inserting)
            .on(node(id))
            .mutate(Mutation::AttachNode {
                parent,
                side,
                id,
                value,
            })
            .operations(1)
            .says(narration),
    )?;
    unwind(&mut rec, &path, &[8])?;
    Ok(rec.finish(Outcome::Done))
}

/// Delete `value`, relinking a sole child or copying in the in-order successor.
pub fn delete(tree: &BstModel, value: i64) -> Result<StepProgram> {
    if !tree.contains(value) {
        return Err(Error::invalid(format!("{} is not in the tree", value)));
    }
    let mut rec = Recorder::new(Algorithm::BstDelete, tree.clone());
    let mut path: Vec<Hop> = Vec::new();
    let mut cur = rec.model().root().map(|n| n.id());

    let (target, left, right) = loop {
        let id = cur.ok_or_else(|| Error::inconsistent(format!("lost track of {}", value)))?;
        let (at, left, right) = parts(&rec, id)?;
        if at == value {
            rec.emit(
                &[3, 7],
                Step::new(StepKind::Found, Highlight::Found)
                    .on(node(id))
                    .compares(1)
                    .says(format!("Found {}", value)),
            )?;
            break (id, left, right);
        }
        let side = descend(&mut rec, id, at, value, [&[3], &[4], &[5, 6]])?;
        path.push(Hop { id, value: at, side });
        cur = match side {
            Side::Left => left,
            Side::Right => right,
        };
    };

    match (left, right) {
        (None, None) => {
            rec.emit(
                &[8],
                Step::new(StepKind::Mutate, Highlight::Deleting)
                    .on(node(target))
                    .mutate(Mutation::SpliceNode { id: target })
                    .operations(1)
                    .says(format!("Removed leaf {}", value)),
            )?;
        }
        (None, Some(_)) | (Some(_), None) => {
            let (lines, which) = if left.is_none() {
                (&[8][..], "right")
            } else {
                (&[9][..], "left")
            };
            rec.emit(
                lines,
                Step::new(StepKind::Mutate, Highlight::Deleting)
                    .on(node(target))
                    .mutate(Mutation::SpliceNode { id: target })
                    .operations(1)
                    .says(format!("Removed {}; its {} child takes its place", value, which)),
            )?;
        }
        (Some(_), Some(first)) => {
            let mut succ = first;
            rec.emit(
                &[10],
                Step::new(StepKind::Examine, Highlight::ExaminingRight)
                    .on(node(succ))
                    .says("Look for the successor in the right subtree"),
            )?;
            while let (_, Some(next), _) = parts(&rec, succ)? {
                succ = next;
                rec.emit(
                    &[10],
                    Step::new(StepKind::Examine, Highlight::ExaminingLeft)
                        .on(node(succ))
                        .says("Keep going left"),
                )?;
            }
            let (succ_value, _, _) = parts(&rec, succ)?;
            rec.emit(
                &[11],
                Step::new(StepKind::Mutate, Highlight::Replacing)
                    .on_all([node(target), node(succ)])
                    .mutate(Mutation::SetNodeValue {
                        id: target,
                        value: succ_value,
                    })
                    .operations(1)
                    .says(format!("Replace {} with its successor {}", value, succ_value)),
            )?;
            rec.emit(
                &[12],
                Step::new(StepKind::Mutate, Highlight::Deleting)
                    .on(node(succ))
                    .mutate(Mutation::SpliceNode { id: succ })
                    .operations(1)
                    .says(format!("Remove the old {} node", succ_value)),
            )?;
        }
    }
    unwind(&mut rec, &path, &[13])?;
    Ok(rec.finish(Outcome::Done))
}

/// Search for `value`. A miss is a normal outcome, not an error.
pub fn search(tree: &BstModel, value: i64) -> Result<StepProgram> {
    let mut rec = Recorder::new(Algorithm::BstSearch, tree.clone());
    let mut cur = rec.model().root().map(|n| n.id());

    while let Some(id) = cur {
        let (at, left, right) = parts(&rec, id)?;
        if at == value {
            rec.emit(
                &[3],
                Step::new(StepKind::Found, Highlight::Found)
                    .on(node(id))
                    .compares(1)
                    .says(format!("Found {}", value)),
            )?;
            return Ok(rec.finish(Outcome::Found { found: true }));
        }
        let side = descend(&mut rec, id, at, value, [&[3], &[4, 5], &[6]])?;
        cur = match side {
            Side::Left => left,
            Side::Right => right,
        };
    }

    rec.emit(
        &[2],
        Step::new(StepKind::Conclude, Highlight::None).says(format!("{} is not in the tree", value)),
    )?;
    Ok(rec.finish(Outcome::Found { found: false }))
}

/// Listing lines of a recursive traversal: entry, visit, done.
struct TraversalLines {
    entry: &'static [u32],
    visit: &'static [u32],
    done: &'static [u32],
}

/// Visit every node in `order`.
pub fn traverse(tree: &BstModel, order: Traversal) -> Result<StepProgram> {
    let Some(root) = tree.root().map(|n| n.id()) else {
        return Err(Error::invalid("cannot traverse an empty tree"));
    };
    let mut rec = Recorder::new(Algorithm::BstTraversal, tree.clone());
    let mut out = Vec::new();
    let lines = match order {
        Traversal::InOrder => TraversalLines {
            entry: &[2],
            visit: &[4],
            done: &[5],
        },
        Traversal::PreOrder => TraversalLines {
            entry: &[7],
            visit: &[8],
            done: &[10],
        },
        Traversal::PostOrder => TraversalLines {
            entry: &[12],
            visit: &[15],
            done: &[15],
        },
        Traversal::LevelOrder => {
            level_order(&mut rec, root, &mut out)?;
            return Ok(rec.finish(Outcome::Sequence { values: out }));
        }
    };
    recurse(&mut rec, root, order, &lines, &mut out)?;
    Ok(rec.finish(Outcome::Sequence { values: out }))
}

fn visit(rec: &mut Recorder<BstModel>, id: NodeId, value: i64, lines: &[u32], out: &mut Vec<i64>) -> Result<()> {
    out.push(value);
    rec.emit(
        lines,
        Step::new(StepKind::Visit, Highlight::Visiting)
            .on(node(id))
            .operations(1)
            .says(format!("Visit {}", value)),
    )
}

fn recurse(
    rec: &mut Recorder<BstModel>,
    id: NodeId,
    order: Traversal,
    lines: &TraversalLines,
    out: &mut Vec<i64>,
) -> Result<()> {
    let (value, left, right) = parts(rec, id)?;
    rec.emit(
        lines.entry,
        Step::new(StepKind::Examine, Highlight::Examining)
            .on(node(id))
            .says(format!("Enter {}", value)),
    )?;
    if order == Traversal::PreOrder {
        visit(rec, id, value, lines.visit, out)?;
    }
    if let Some(l) = left {
        recurse(rec, l, order, lines, out)?;
    }
    if order == Traversal::InOrder {
        visit(rec, id, value, lines.visit, out)?;
    }
    if let Some(r) = right {
        recurse(rec, r, order, lines, out)?;
    }
    if order == Traversal::PostOrder {
        visit(rec, id, value, lines.visit, out)?;
    }
    rec.emit(
        lines.done,
        Step::new(StepKind::Conclude, Highlight::Visited)
            .on(node(id))
            .says(format!("Done with the subtree of {}", value)),
    )
}

fn level_order(rec: &mut Recorder<BstModel>, root: NodeId, out: &mut Vec<i64>) -> Result<()> {
    rec.emit(
        &[17],
        Step::new(StepKind::Examine, Highlight::Examining)
            .on(node(root))
            .says("Queue the root"),
    )?;
    let mut queue = VecDeque::from([root]);
    while let Some(id) = queue.pop_front() {
        let (value, left, right) = parts(rec, id)?;
        visit(rec, id, value, &[18, 19], out)?;
        for child in [left, right].into_iter().flatten() {
            queue.push_back(child);
            rec.emit(
                &[20],
                Step::new(StepKind::Examine, Highlight::Examining)
                    .on(node(child))
                    .says("Queue child"),
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::VisualModel;
    use proptest::prelude::*;

    fn tree() -> BstModel {
        BstModel::from_values(&[5, 3, 8, 1, 4]).unwrap()
    }

    /// Follow a program to its end on a concrete model.
    fn run(tree: &BstModel, program: &StepProgram) -> BstModel {
        let mut model = tree.clone();
        program.replay_into(&mut model).unwrap();
        model
    }

    #[test]
    fn delete_keeps_the_invariant() {
        let tree = tree();
        let after = run(&tree, &delete(&tree, 3).unwrap());
        assert_eq!(after.in_order(), vec![1, 4, 5, 8]);
        assert!(after.is_valid_bst());
    }

    #[test]
    fn delete_of_two_child_node_uses_successor() {
        let tree = BstModel::from_values(&[5, 3, 8, 7, 9, 6]).unwrap();
        let root = tree.root().unwrap().id();
        let program = delete(&tree, 5).unwrap();
        let after = run(&tree, &program);
        assert_eq!(after.root().unwrap().id(), root);
        assert_eq!(after.root().unwrap().value(), 6);
        assert_eq!(after.in_order(), vec![3, 6, 7, 8, 9]);
        assert!(program.steps().iter().any(|s| s.highlight == Highlight::Replacing));
    }

    #[test]
    fn insert_examines_before_descending_and_unwinds_after() {
        let tree = tree();
        let program = insert(&tree, 7).unwrap();
        let highlights: Vec<_> = program.steps().iter().map(|s| s.highlight).collect();
        assert_eq!(
            highlights,
            vec![
                Highlight::Examining,
                Highlight::ExaminingRight,
                Highlight::Examining,
                Highlight::ExaminingLeft,
                Highlight::Inserting,
                Highlight::PathLeft,
                Highlight::PathRight,
            ]
        );
        let inserting = &program.steps()[4];
        assert_eq!(inserting.narration, "Inserted 7 as LEFT child of 8");
        assert_eq!(run(&tree, &program).in_order(), vec![1, 3, 4, 5, 7, 8]);
    }

    #[test]
    fn insert_into_empty_tree_makes_root() {
        let program = insert(&BstModel::new(), 10).unwrap();
        assert_eq!(program.len(), 1);
        assert_eq!(run(&BstModel::new(), &program).in_order(), vec![10]);
    }

    #[test]
    fn invalid_requests_record_nothing() {
        let tree = tree();
        assert!(matches!(insert(&tree, 4), Err(Error::InvalidInput(_))));
        assert!(matches!(delete(&tree, 42), Err(Error::InvalidInput(_))));
        assert!(matches!(
            traverse(&BstModel::new(), Traversal::InOrder),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn search_reports_hits_and_misses() {
        let tree = tree();
        assert_eq!(search(&tree, 4).unwrap().outcome(), &Outcome::Found { found: true });
        let miss = search(&tree, 6).unwrap();
        assert_eq!(miss.outcome(), &Outcome::Found { found: false });
        assert_eq!(miss.end_state().snapshot(), tree.snapshot());
    }

    #[test]
    fn traversal_orders() {
        let tree = tree();
        let seq = |order| match traverse(&tree, order).unwrap().outcome().clone() {
            Outcome::Sequence { values } => values,
            other => panic!("unexpected outcome {:?}", other),
        };
        assert_eq!(seq(Traversal::InOrder), vec![1, 3, 4, 5, 8]);
        assert_eq!(seq(Traversal::PreOrder), vec![5, 3, 1, 4, 8]);
        assert_eq!(seq(Traversal::PostOrder), vec![1, 4, 3, 8, 5]);
        assert_eq!(seq(Traversal::LevelOrder), vec![5, 3, 8, 1, 4]);
        assert_eq!("Post-Order".parse::<Traversal>().unwrap(), Traversal::PostOrder);
    }

    proptest! {
        #[test]
        fn invariant_holds_after_insert_and_delete(
            values in prop::collection::hash_set(0i64..200, 1..25),
            extra in 200i64..300,
        ) {
            let values: Vec<i64> = values.into_iter().collect();
            let tree = BstModel::from_values(&values).unwrap();

            let grown = run(&tree, &insert(&tree, extra).unwrap());
            prop_assert!(grown.is_valid_bst());
            prop_assert_eq!(grown.len(), values.len() + 1);

            for &victim in &values {
                let shrunk = run(&grown, &delete(&grown, victim).unwrap());
                prop_assert!(shrunk.is_valid_bst());
                prop_assert!(!shrunk.contains(victim));
                prop_assert_eq!(shrunk.len(), values.len());
            }
        }
    }
}
