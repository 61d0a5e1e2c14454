//! Array-backed binary heap: insert, extract root, heapify.

use super::sorting::{compare, swap};
use super::{Outcome, Recorder, StepProgram};
use crate::catalog::Algorithm;
use crate::error::{Error, Result};
use crate::model::{ArrayModel, ArrayShape, HeapOrder};
use crate::step::{Highlight, Mutation, Step, StepKind};

/// Five full levels.
pub const MAX_HEAP_LEN: usize = 31;

fn order_of(heap: &ArrayModel) -> Result<HeapOrder> {
    match (heap.shape(), heap.order()) {
        (ArrayShape::Heap, Some(order)) => Ok(order),
        _ => Err(Error::invalid("model is not a heap")),
    }
}

fn order_name(order: HeapOrder) -> &'static str {
    match order {
        HeapOrder::Min => "smaller",
        HeapOrder::Max => "larger",
    }
}

/// Append `value` and sift it up.
pub fn insert(heap: &ArrayModel, value: i64) -> Result<StepProgram> {
    let order = order_of(heap)?;
    if heap.len() >= MAX_HEAP_LEN {
        return Err(Error::invalid(format!("heap is full ({} elements)", MAX_HEAP_LEN)));
    }
    let mut rec = Recorder::new(Algorithm::HeapInsert, heap.clone());
    let mut i = heap.len();
    rec.emit(
        &[2],
        Step::new(StepKind::Mutate, Highlight::Inserting)
            .indices([i])
            .mutate(Mutation::Push { value })
            .operations(1)
            .says(format!("Append {} at index {}", value, i)),
    )?;
    while i > 0 {
        let parent = (i - 1) / 2;
        let (child, above) = compare(&mut rec, i, parent, &[3])?;
        if !order.precedes(child, above) {
            break;
        }
        swap(&mut rec, i, parent, &[4, 5])?;
        i = parent;
    }
    rec.emit(
        &[3],
        Step::new(StepKind::Conclude, Highlight::Highlighted)
            .indices([i])
            .says(format!("{} settles at index {}", value, i)),
    )?;
    Ok(rec.finish(Outcome::Done))
}

/// Remove and report the root.
pub fn extract(heap: &ArrayModel) -> Result<StepProgram> {
    order_of(heap)?;
    let Some(&root) = heap.values().first() else {
        return Err(Error::invalid("cannot extract from an empty heap"));
    };
    let mut rec = Recorder::new(Algorithm::HeapExtract, heap.clone());
    rec.emit(
        &[7],
        Step::new(StepKind::Found, Highlight::Found)
            .indices([0])
            .says(format!("Root is {}", root)),
    )?;
    let last = heap.len() - 1;
    if last > 0 {
        swap(&mut rec, 0, last, &[8])?;
    }
    rec.emit(
        &[8],
        Step::new(StepKind::Mutate, Highlight::Deleting)
            .indices([last])
            .mutate(Mutation::Pop)
            .operations(1)
            .says(format!("Remove {}", root)),
    )?;
    sift_down(&mut rec, 0, &[9])?;
    Ok(rec.finish(Outcome::Value { value: root }))
}

/// Turn `values` into a heap bottom-up.
pub fn heapify(values: &[i64], order: HeapOrder) -> Result<StepProgram> {
    if values.is_empty() || values.len() > MAX_HEAP_LEN {
        return Err(Error::invalid(format!(
            "heapify needs 1 to {} values, got {}",
            MAX_HEAP_LEN,
            values.len()
        )));
    }
    let mut rec = Recorder::new(Algorithm::Heapify, ArrayModel::heap(values.to_vec(), order));
    for i in (0..values.len() / 2).rev() {
        let v = rec.model().values()[i];
        rec.emit(
            &[15],
            Step::new(StepKind::Examine, Highlight::Current)
                .indices([i])
                .says(format!("Sift down {} from index {}", v, i)),
        )?;
        sift_down(&mut rec, i, &[15])?;
    }
    Ok(rec.finish(Outcome::Done))
}

fn sift_down(rec: &mut Recorder<ArrayModel>, mut i: usize, entry: &[u32]) -> Result<()> {
    let Some(order) = rec.model().order() else {
        return Err(Error::inconsistent("sift down on a plain array"));
    };
    let n = rec.model().len();
    if n > 0 {
        rec.emit(
            entry,
            Step::new(StepKind::Examine, Highlight::Examining)
                .indices([i])
                .says(format!("Restore heap order below index {}", i)),
        )?;
    }
    loop {
        let mut best = i;
        for child in [2 * i + 1, 2 * i + 2] {
            if child < n {
                let (c, b) = compare(rec, child, best, &[12])?;
                if order.precedes(c, b) {
                    best = child;
                }
            }
        }
        if best == i {
            return Ok(());
        }
        let (above, below) = (rec.model().values()[i], rec.model().values()[best]);
        rec.emit(
            &[13],
            Step::new(StepKind::Examine, Highlight::Pivot)
                .indices([best])
                .says(format!("{} is {} than {}", below, order_name(order), above)),
        )?;
        swap(rec, i, best, &[13])?;
        i = best;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn run(heap: &ArrayModel, program: &StepProgram) -> ArrayModel {
        let mut model = heap.clone();
        program.replay_into(&mut model).unwrap();
        model
    }

    #[test]
    fn insert_sifts_up() {
        let heap = ArrayModel::heap(vec![1, 3, 2, 7], HeapOrder::Min);
        let after = run(&heap, &insert(&heap, 0).unwrap());
        assert_eq!(after.values()[0], 0);
        assert!(after.is_heap());
        assert_eq!(after.len(), 5);
    }

    #[test]
    fn extract_returns_root_and_keeps_order() {
        let heap = ArrayModel::heap(vec![9, 7, 8, 1, 3], HeapOrder::Max);
        let program = extract(&heap).unwrap();
        assert_eq!(program.outcome(), &Outcome::Value { value: 9 });
        let after = run(&heap, &program);
        assert_eq!(after.values()[0], 8);
        assert!(after.is_heap());
        assert_eq!(after.len(), 4);
    }

    #[test]
    fn extract_last_element_empties_heap() {
        let heap = ArrayModel::heap(vec![4], HeapOrder::Min);
        let after = run(&heap, &extract(&heap).unwrap());
        assert!(after.is_empty());
        assert!(matches!(extract(&after), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn rejects_plain_arrays_and_overflow() {
        assert!(insert(&ArrayModel::new(vec![1]), 2).is_err());
        let full = ArrayModel::heap((0..MAX_HEAP_LEN as i64).collect(), HeapOrder::Min);
        assert!(insert(&full, 99).is_err());
        assert!(heapify(&[], HeapOrder::Max).is_err());
    }

    proptest! {
        #[test]
        fn heap_property_after_every_program(
            values in prop::collection::vec(1i64..50, 1..20),
            extra in 1i64..50,
            max in any::<bool>(),
        ) {
            let order = if max { HeapOrder::Max } else { HeapOrder::Min };
            let program = heapify(&values, order).unwrap();
            let heap = run(&ArrayModel::heap(values.clone(), order), &program);
            prop_assert!(heap.is_heap());

            let grown = run(&heap, &insert(&heap, extra).unwrap());
            prop_assert!(grown.is_heap());

            let shrunk = run(&grown, &extract(&grown).unwrap());
            prop_assert!(shrunk.is_heap());
            prop_assert_eq!(shrunk.len(), values.len());
        }
    }
}
