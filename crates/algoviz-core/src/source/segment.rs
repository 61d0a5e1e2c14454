//! Segment tree build, range query and point update.
//!
//! Query and update positions are 1-based and inclusive, as typed by a user;
//! the tree itself is indexed from 0.

use super::{Outcome, Recorder, StepProgram};
use crate::catalog::Algorithm;
use crate::error::{Error, Result};
use crate::model::{Combiner, SegmentTreeModel, VisualModel};
use crate::step::{ElementId, Highlight, Mutation, NodeId, Step, StepKind};

fn slot(s: usize) -> ElementId {
    ElementId::Node(NodeId(s as u64))
}

fn slot_value(rec: &Recorder<SegmentTreeModel>, s: usize) -> Result<i64> {
    rec.model()
        .slot(s)
        .ok_or_else(|| Error::inconsistent(format!("slot {} has not been built", s)))
}

fn span(start: usize, end: usize) -> String {
    if start == end {
        format!("[{}]", start + 1)
    } else {
        format!("[{}..{}]", start + 1, end + 1)
    }
}

/// Build a tree over `values` from the leaves up.
pub fn build(values: &[i64], combiner: Combiner) -> Result<StepProgram> {
    let model = SegmentTreeModel::new(values.to_vec(), combiner)?;
    let mut rec = Recorder::new(Algorithm::SegmentBuild, model);
    build_node(&mut rec, 0, 0, values.len() - 1)?;
    let root = slot_value(&rec, 0)?;
    Ok(rec.finish(Outcome::Value { value: root }))
}

/// A fully built tree, without recording how it was built.
pub fn built_tree(values: &[i64], combiner: Combiner) -> Result<SegmentTreeModel> {
    let program = build(values, combiner)?;
    let mut model = SegmentTreeModel::new(values.to_vec(), combiner)?;
    program.replay_into(&mut model)?;
    model.rebase();
    Ok(model)
}

fn build_node(rec: &mut Recorder<SegmentTreeModel>, s: usize, start: usize, end: usize) -> Result<()> {
    rec.emit(
        &[1],
        Step::new(StepKind::Examine, Highlight::Examining)
            .on(slot(s))
            .says(format!("Build {}", span(start, end))),
    )?;
    if start == end {
        let value = rec.model().values()[start];
        return rec.emit(
            &[2],
            Step::new(StepKind::Mutate, Highlight::Highlighted)
                .on_all([slot(s), ElementId::Index(start)])
                .mutate(Mutation::SetTreeSlot { slot: s, value })
                .operations(1)
                .says(format!("Leaf {} holds {}", span(start, end), value)),
        );
    }
    let mid = (start + end) / 2;
    build_node(rec, 2 * s + 1, start, mid)?;
    build_node(rec, 2 * s + 2, mid + 1, end)?;
    combine_into(rec, s, start, end, &[6])
}

fn combine_into(rec: &mut Recorder<SegmentTreeModel>, s: usize, start: usize, end: usize, lines: &[u32]) -> Result<()> {
    let combiner = rec.model().combiner();
    let (a, b) = (slot_value(rec, 2 * s + 1)?, slot_value(rec, 2 * s + 2)?);
    let value = combiner.combine(a, b);
    rec.emit(
        lines,
        Step::new(StepKind::Mutate, Highlight::Highlighted)
            .on_all([slot(s), slot(2 * s + 1), slot(2 * s + 2)])
            .mutate(Mutation::SetTreeSlot { slot: s, value })
            .compares(u64::from(combiner != Combiner::Sum))
            .operations(1)
            .says(format!("{} of {} is {}({}, {}) = {}", combiner.name(), span(start, end), combiner.name(), a, b, value)),
    )
}

fn require_built(tree: &SegmentTreeModel) -> Result<()> {
    if tree.is_built() {
        Ok(())
    } else {
        Err(Error::invalid("segment tree has not been built"))
    }
}

/// Combine the values at 1-based positions `left..=right`.
pub fn query(tree: &SegmentTreeModel, left: usize, right: usize) -> Result<StepProgram> {
    require_built(tree)?;
    let n = tree.len();
    if left == 0 || left > right || right > n {
        return Err(Error::invalid(format!(
            "query range [{}, {}] must satisfy 1 ≤ left ≤ right ≤ {}",
            left, right, n
        )));
    }
    let mut rec = Recorder::new(Algorithm::SegmentQuery, tree.clone());
    let value = query_node(&mut rec, 0, 0, n - 1, left - 1, right - 1)?;
    rec.emit(
        &[11],
        Step::new(StepKind::Conclude, Highlight::Found)
            .on(slot(0))
            .says(format!(
                "{} over {} is {}",
                tree.combiner().name(),
                span(left - 1, right - 1),
                value
            )),
    )?;
    Ok(rec.finish(Outcome::Value { value }))
}

fn query_node(
    rec: &mut Recorder<SegmentTreeModel>,
    s: usize,
    start: usize,
    end: usize,
    l: usize,
    r: usize,
) -> Result<i64> {
    rec.emit(
        &[7],
        Step::new(StepKind::Examine, Highlight::Examining)
            .on(slot(s))
            .compares(1)
            .says(format!("Visit {}", span(start, end))),
    )?;
    let combiner = rec.model().combiner();
    if r < start || end < l {
        rec.emit(
            &[8],
            Step::new(StepKind::Conclude, Highlight::None)
                .on(slot(s))
                .says(format!("{} lies outside the query", span(start, end))),
        )?;
        return Ok(combiner.identity());
    }
    if l <= start && end <= r {
        let value = slot_value(rec, s)?;
        rec.emit(
            &[9],
            Step::new(StepKind::Found, Highlight::Found)
                .on(slot(s))
                .says(format!("{} lies inside the query: use {}", span(start, end), value)),
        )?;
        return Ok(value);
    }
    let mid = (start + end) / 2;
    let a = query_node(rec, 2 * s + 1, start, mid, l, r)?;
    let b = query_node(rec, 2 * s + 2, mid + 1, end, l, r)?;
    let value = combiner.combine(a, b);
    rec.emit(
        &[11],
        Step::new(StepKind::Conclude, Highlight::Highlighted)
            .on(slot(s))
            .compares(u64::from(combiner != Combiner::Sum))
            .says(format!("Partial {} for {} is {}", combiner.name(), span(start, end), value)),
    )?;
    Ok(value)
}

/// Set 1-based `position` to `value` and repair the path to the root.
pub fn update(tree: &SegmentTreeModel, position: usize, value: i64) -> Result<StepProgram> {
    require_built(tree)?;
    let n = tree.len();
    if position == 0 || position > n {
        return Err(Error::invalid(format!("position {} must be within 1..={}", position, n)));
    }
    let mut rec = Recorder::new(Algorithm::SegmentUpdate, tree.clone());
    update_node(&mut rec, 0, 0, n - 1, position - 1, value)?;
    Ok(rec.finish(Outcome::Done))
}

fn update_node(
    rec: &mut Recorder<SegmentTreeModel>,
    s: usize,
    start: usize,
    end: usize,
    i: usize,
    value: i64,
) -> Result<()> {
    if start == end {
        rec.emit(
            &[13],
            Step::new(StepKind::Mutate, Highlight::Replacing)
                .on(ElementId::Index(i))
                .mutate(Mutation::SetLeaf { index: i, value })
                .operations(1)
                .says(format!("Array position {} becomes {}", i + 1, value)),
        )?;
        return rec.emit(
            &[13],
            Step::new(StepKind::Mutate, Highlight::Replacing)
                .on(slot(s))
                .mutate(Mutation::SetTreeSlot { slot: s, value })
                .operations(1)
                .says(format!("Leaf {} becomes {}", span(start, end), value)),
        );
    }
    let mid = (start + end) / 2;
    let (child, lo, hi, lines) = if i <= mid {
        (2 * s + 1, start, mid, &[15][..])
    } else {
        (2 * s + 2, mid + 1, end, &[16][..])
    };
    rec.emit(
        lines,
        Step::new(StepKind::Examine, Highlight::Examining)
            .on(slot(s))
            .compares(1)
            .says(format!("Position {} is in {}", i + 1, span(lo, hi))),
    )?;
    update_node(rec, child, lo, hi, i, value)?;
    combine_into(rec, s, start, end, &[17])
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALUES: [i64; 6] = [1, 3, 5, 7, 9, 11];

    fn value(program: &StepProgram) -> i64 {
        match program.outcome() {
            Outcome::Value { value } => *value,
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn build_fills_every_slot() {
        let tree = built_tree(&VALUES, Combiner::Sum).unwrap();
        assert!(tree.is_built());
        assert!(tree.is_consistent());
        assert_eq!(tree.slot(0), Some(36));
    }

    #[test]
    fn range_two_to_five() {
        let cases = [(Combiner::Sum, 24), (Combiner::Min, 3), (Combiner::Max, 9)];
        for (combiner, expected) in cases {
            let tree = built_tree(&VALUES, combiner).unwrap();
            let program = query(&tree, 2, 5).unwrap();
            assert_eq!(value(&program), expected, "{:?}", combiner);
            assert_eq!(tree.fold_range(1, 4), expected);
            assert_eq!(program.end_state().snapshot(), tree.snapshot());
        }
    }

    #[test]
    fn every_range_matches_a_direct_fold() {
        for combiner in [Combiner::Sum, Combiner::Min, Combiner::Max] {
            let tree = built_tree(&VALUES, combiner).unwrap();
            for l in 1..=VALUES.len() {
                for r in l..=VALUES.len() {
                    assert_eq!(value(&query(&tree, l, r).unwrap()), tree.fold_range(l - 1, r - 1));
                }
            }
        }
    }

    #[test]
    fn update_repairs_ancestors() {
        let tree = built_tree(&VALUES, Combiner::Sum).unwrap();
        let program = update(&tree, 3, 20).unwrap();
        let mut after = tree.clone();
        program.replay_into(&mut after).unwrap();
        assert_eq!(after.values(), &[1, 3, 20, 7, 9, 11]);
        assert!(after.is_consistent());
        assert_eq!(after.slot(0), Some(51));
        assert_eq!(value(&query(&after, 2, 5).unwrap()), 39);
    }

    #[test]
    fn invalid_ranges_are_rejected() {
        let tree = built_tree(&VALUES, Combiner::Sum).unwrap();
        assert!(matches!(query(&tree, 0, 2), Err(Error::InvalidInput(_))));
        assert!(matches!(query(&tree, 4, 3), Err(Error::InvalidInput(_))));
        assert!(matches!(query(&tree, 2, 7), Err(Error::InvalidInput(_))));
        assert!(matches!(update(&tree, 7, 1), Err(Error::InvalidInput(_))));

        let unbuilt = SegmentTreeModel::new(VALUES.to_vec(), Combiner::Sum).unwrap();
        assert!(matches!(query(&unbuilt, 1, 2), Err(Error::InvalidInput(_))));
    }
}
