//! Comparison sorts over an [`ArrayModel`].

use super::{Outcome, Recorder, StepProgram};
use crate::catalog::{Algorithm, Family};
use crate::error::{Error, Result};
use crate::model::ArrayModel;
use crate::step::{Highlight, Mutation, Step, StepKind};

/// Largest array accepted by the sorting sources.
pub const MAX_ARRAY_LEN: usize = 100;

/// Record `algorithm` sorting `values` into ascending order.
pub fn sort(algorithm: Algorithm, values: &[i64]) -> Result<StepProgram> {
    if algorithm.family() != Family::Sorting {
        return Err(Error::invalid(format!("{} is not a sorting algorithm", algorithm)));
    }
    if values.is_empty() {
        return Err(Error::invalid("cannot sort an empty array"));
    }
    if values.len() > MAX_ARRAY_LEN {
        return Err(Error::invalid(format!(
            "array of {} exceeds the limit of {}",
            values.len(),
            MAX_ARRAY_LEN
        )));
    }

    let mut rec = Recorder::new(algorithm, ArrayModel::new(values.to_vec()));
    let n = values.len();
    let done: &[u32] = match algorithm {
        Algorithm::BubbleSort => {
            bubble(&mut rec)?;
            &[8]
        }
        Algorithm::SelectionSort => {
            selection(&mut rec)?;
            &[11]
        }
        Algorithm::InsertionSort => {
            insertion(&mut rec)?;
            &[9]
        }
        Algorithm::MergeSort => {
            merge_sort(&mut rec, 0, n - 1)?;
            &[]
        }
        Algorithm::QuickSort => {
            quick(&mut rec, 0, n - 1)?;
            &[]
        }
        _ => {
            heap_sort(&mut rec)?;
            &[]
        }
    };
    rec.emit(
        done,
        Step::new(StepKind::Conclude, Highlight::Sorted)
            .indices(0..n)
            .says("Array is sorted"),
    )?;
    let sorted = rec.model().values().to_vec();
    Ok(rec.finish(Outcome::Sorted { values: sorted }))
}

fn value(rec: &Recorder<ArrayModel>, i: usize) -> i64 {
    rec.model().values()[i]
}

/// Compare positions `a` and `b`, returning their values.
pub(super) fn compare(
    rec: &mut Recorder<ArrayModel>,
    a: usize,
    b: usize,
    lines: &[u32],
) -> Result<(i64, i64)> {
    let (va, vb) = (value(rec, a), value(rec, b));
    rec.emit(
        lines,
        Step::new(StepKind::Compare, Highlight::Comparing)
            .indices([a, b])
            .compares(1)
            .says(format!("Compare {} with {}", va, vb)),
    )?;
    Ok((va, vb))
}

pub(super) fn swap(rec: &mut Recorder<ArrayModel>, a: usize, b: usize, lines: &[u32]) -> Result<()> {
    let (va, vb) = (value(rec, a), value(rec, b));
    rec.emit(
        lines,
        Step::new(StepKind::Swap, Highlight::Swapping)
            .indices([a, b])
            .mutate(Mutation::Swap { i: a, j: b })
            .swaps(1)
            .says(format!("Swap {} and {}", va, vb)),
    )
}

fn settle(rec: &mut Recorder<ArrayModel>, i: usize, lines: &[u32]) -> Result<()> {
    let v = value(rec, i);
    rec.emit(
        lines,
        Step::new(StepKind::Conclude, Highlight::Sorted)
            .indices([i])
            .says(format!("{} is in its final place", v)),
    )
}

fn bubble(rec: &mut Recorder<ArrayModel>) -> Result<()> {
    let n = rec.model().len();
    for i in 0..n - 1 {
        for j in 0..n - i - 1 {
            let (a, b) = compare(rec, j, j + 1, &[4, 5])?;
            if a > b {
                swap(rec, j, j + 1, &[6])?;
            }
        }
        settle(rec, n - i - 1, &[7])?;
    }
    Ok(())
}

fn selection(rec: &mut Recorder<ArrayModel>) -> Result<()> {
    let n = rec.model().len();
    for i in 0..n - 1 {
        let mut min = i;
        let v = value(rec, i);
        rec.emit(
            &[4],
            Step::new(StepKind::Examine, Highlight::Current)
                .indices([i])
                .says(format!("Assume {} is the minimum", v)),
        )?;
        for j in i + 1..n {
            let (candidate, best) = compare(rec, j, min, &[5, 6])?;
            if candidate < best {
                min = j;
                rec.emit(
                    &[7],
                    Step::new(StepKind::Examine, Highlight::Current)
                        .indices([j])
                        .says(format!("New minimum {}", candidate)),
                )?;
            }
        }
        if min != i {
            swap(rec, i, min, &[8, 9])?;
        }
        settle(rec, i, &[10])?;
    }
    Ok(())
}

fn insertion(rec: &mut Recorder<ArrayModel>) -> Result<()> {
    let n = rec.model().len();
    for i in 1..n {
        let key = value(rec, i);
        rec.emit(
            &[3, 4],
            Step::new(StepKind::Examine, Highlight::Current)
                .indices([i])
                .says(format!("Insert {} into the sorted prefix", key)),
        )?;
        let mut j = i;
        while j > 0 {
            let (left, key) = compare(rec, j - 1, j, &[5])?;
            if left <= key {
                break;
            }
            swap(rec, j - 1, j, &[6, 7])?;
            j -= 1;
        }
        rec.emit(
            &[8],
            Step::new(StepKind::Conclude, Highlight::Inserting)
                .indices([j])
                .says(format!("{} settles at index {}", key, j)),
        )?;
    }
    Ok(())
}

fn merge_sort(rec: &mut Recorder<ArrayModel>, lo: usize, hi: usize) -> Result<()> {
    if lo >= hi {
        return Ok(());
    }
    let mid = (lo + hi) / 2;
    rec.emit(
        &[3],
        Step::new(StepKind::Examine, Highlight::Examining)
            .indices(lo..=hi)
            .says(format!("Split [{}..{}] at {}", lo, hi, mid)),
    )?;
    merge_sort(rec, lo, mid)?;
    merge_sort(rec, mid + 1, hi)?;
    merge(rec, lo, mid, hi)
}

fn write(rec: &mut Recorder<ArrayModel>, k: usize, value: i64, lines: &[u32]) -> Result<()> {
    rec.emit(
        lines,
        Step::new(StepKind::Mutate, Highlight::Replacing)
            .indices([k])
            .mutate(Mutation::Set { index: k, value })
            .operations(1)
            .says(format!("Write {} to index {}", value, k)),
    )
}

fn merge(rec: &mut Recorder<ArrayModel>, lo: usize, mid: usize, hi: usize) -> Result<()> {
    let left = rec.model().values()[lo..=mid].to_vec();
    let right = rec.model().values()[mid + 1..=hi].to_vec();
    let (mut i, mut j, mut k) = (0, 0, lo);

    while i < left.len() && j < right.len() {
        rec.emit(
            &[10, 11],
            Step::new(StepKind::Compare, Highlight::Comparing)
                .indices([lo + i, mid + 1 + j])
                .compares(1)
                .says(format!("Compare {} with {}", left[i], right[j])),
        )?;
        if left[i] <= right[j] {
            write(rec, k, left[i], &[11])?;
            i += 1;
        } else {
            write(rec, k, right[j], &[12])?;
            j += 1;
        }
        k += 1;
    }
    for &v in left[i..].iter().chain(&right[j..]) {
        write(rec, k, v, &[14])?;
        k += 1;
    }

    rec.emit(
        &[6],
        Step::new(StepKind::Conclude, Highlight::Highlighted)
            .indices(lo..=hi)
            .says(format!("Merged [{}..{}]", lo, hi)),
    )
}

fn quick(rec: &mut Recorder<ArrayModel>, lo: usize, hi: usize) -> Result<()> {
    if lo > hi {
        return Ok(());
    }
    if lo == hi {
        return settle(rec, lo, &[2]);
    }
    rec.emit(
        &[2, 3],
        Step::new(StepKind::Examine, Highlight::Examining)
            .indices(lo..=hi)
            .says(format!("Partition [{}..{}]", lo, hi)),
    )?;
    let p = partition(rec, lo, hi)?;
    if p > lo {
        quick(rec, lo, p - 1)?;
    }
    quick(rec, p + 1, hi)
}

/// Lomuto partition around `A[hi]`; returns the pivot's final index.
fn partition(rec: &mut Recorder<ArrayModel>, lo: usize, hi: usize) -> Result<usize> {
    let pivot = value(rec, hi);
    rec.emit(
        &[7],
        Step::new(StepKind::Examine, Highlight::Pivot)
            .indices([hi])
            .says(format!("Pivot is {}", pivot)),
    )?;
    let mut store = lo;
    for j in lo..hi {
        let (v, _) = compare(rec, j, hi, &[9, 10])?;
        if v < pivot {
            if store != j {
                swap(rec, store, j, &[11])?;
            }
            store += 1;
        }
    }
    if store != hi {
        swap(rec, store, hi, &[12])?;
    }
    settle(rec, store, &[13])?;
    Ok(store)
}

fn heap_sort(rec: &mut Recorder<ArrayModel>) -> Result<()> {
    let n = rec.model().len();
    for i in (0..n / 2).rev() {
        sift_down(rec, i, n)?;
    }
    for end in (1..n).rev() {
        swap(rec, 0, end, &[6])?;
        settle(rec, end, &[5])?;
        sift_down(rec, 0, end)?;
    }
    Ok(())
}

fn sift_down(rec: &mut Recorder<ArrayModel>, mut i: usize, n: usize) -> Result<()> {
    loop {
        let (l, r) = (2 * i + 1, 2 * i + 2);
        let mut largest = i;
        if l < n {
            let (a, b) = compare(rec, l, largest, &[10])?;
            if a > b {
                largest = l;
            }
        }
        if r < n {
            let (a, b) = compare(rec, r, largest, &[11])?;
            if a > b {
                largest = r;
            }
        }
        if largest == i {
            return Ok(());
        }
        swap(rec, i, largest, &[12, 13])?;
        i = largest;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::ElementId;
    use proptest::prelude::*;

    const SORTS: [Algorithm; 6] = [
        Algorithm::BubbleSort,
        Algorithm::SelectionSort,
        Algorithm::InsertionSort,
        Algorithm::MergeSort,
        Algorithm::QuickSort,
        Algorithm::HeapSort,
    ];

    #[test]
    fn bubble_sort_example() {
        let program = sort(Algorithm::BubbleSort, &[5, 3, 8, 1]).unwrap();
        assert_eq!(program.outcome(), &Outcome::Sorted { values: vec![1, 3, 5, 8] });
        let metrics = program.total_metrics();
        assert_eq!(metrics.comparisons, 6);
        assert_eq!(metrics.swaps, 4);

        let first = &program.steps()[0];
        assert_eq!(first.kind, StepKind::Compare);
        assert_eq!(first.subjects, vec![ElementId::Index(0), ElementId::Index(1)]);
        assert_eq!(first.code_refs["bubble_sort"], vec![4, 5]);
    }

    #[test]
    fn quick_sort_marks_the_pivot_before_partitioning() {
        let program = sort(Algorithm::QuickSort, &[3, 1, 2]).unwrap();
        let kinds: Vec<_> = program.steps().iter().take(2).map(|s| s.highlight).collect();
        assert_eq!(kinds, vec![Highlight::Examining, Highlight::Pivot]);
    }

    #[test]
    fn single_element_needs_no_swaps() {
        for algorithm in SORTS {
            let program = sort(algorithm, &[42]).unwrap();
            assert_eq!(program.total_metrics().swaps, 0);
            assert_eq!(program.outcome(), &Outcome::Sorted { values: vec![42] });
        }
    }

    #[test]
    fn rejects_invalid_input() {
        assert!(matches!(sort(Algorithm::BubbleSort, &[]), Err(Error::InvalidInput(_))));
        let big = vec![1; MAX_ARRAY_LEN + 1];
        assert!(matches!(sort(Algorithm::MergeSort, &big), Err(Error::InvalidInput(_))));
        assert!(matches!(sort(Algorithm::Bfs, &[1]), Err(Error::InvalidInput(_))));
    }

    proptest! {
        #[test]
        fn every_sort_matches_std(values in prop::collection::vec(-50i64..50, 1..40)) {
            let mut expected = values.clone();
            expected.sort();
            for algorithm in SORTS {
                let program = sort(algorithm, &values).unwrap();
                let replayed = program.replay().unwrap();
                prop_assert_eq!(
                    replayed.snapshot(),
                    program.end_state().snapshot()
                );
                prop_assert_eq!(
                    program.outcome(),
                    &Outcome::Sorted { values: expected.clone() }
                );
            }
        }
    }
}
