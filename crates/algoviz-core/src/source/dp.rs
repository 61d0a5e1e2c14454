//! Table-filling dynamic programs: 0/1 knapsack and longest common subsequence.

use super::{Outcome, Recorder, StepProgram};
use crate::catalog::Algorithm;
use crate::error::{Error, Result};
use crate::model::DpTableModel;
use crate::step::{ElementId, Highlight, Mutation, Step, StepKind};

/// `(weight, value)` pairs of the demo knapsack.
pub const SAMPLE_ITEMS: [(u32, i64); 5] = [(2, 3), (3, 4), (4, 5), (5, 6), (6, 7)];

pub const MAX_CAPACITY: u32 = 20;
pub const MAX_ITEMS: usize = 8;
pub const MAX_ITEM_VALUE: i64 = 1_000_000;
pub const MAX_LCS_LEN: usize = 12;

fn cell(row: usize, col: usize) -> ElementId {
    ElementId::Cell(row, col)
}

fn read(rec: &Recorder<DpTableModel>, row: usize, col: usize) -> Result<i64> {
    rec.model()
        .cell(row, col)
        .ok_or_else(|| Error::inconsistent(format!("cell ({}, {}) read before it was filled", row, col)))
}

/// Fill the knapsack table for `items` and `capacity`, then trace back the chosen items.
pub fn knapsack(items: &[(u32, i64)], capacity: u32) -> Result<StepProgram> {
    if capacity == 0 || capacity > MAX_CAPACITY {
        return Err(Error::invalid(format!("capacity must be within 1..={}", MAX_CAPACITY)));
    }
    if items.is_empty() || items.len() > MAX_ITEMS {
        return Err(Error::invalid(format!("knapsack needs 1 to {} items", MAX_ITEMS)));
    }
    if let Some((w, v)) = items
        .iter()
        .find(|(w, v)| *w == 0 || !(0..=MAX_ITEM_VALUE).contains(v))
    {
        return Err(Error::invalid(format!(
            "item (weight {}, value {}) needs a positive weight and a value within 0..={}",
            w, v, MAX_ITEM_VALUE
        )));
    }

    let mut rec = Recorder::new(Algorithm::Knapsack, DpTableModel::knapsack(items, capacity));
    let (n, cap) = (items.len(), capacity as usize);

    for i in 1..=n {
        let (weight, value) = (items[i - 1].0 as usize, items[i - 1].1);
        for w in 1..=cap {
            let skip = read(&rec, i - 1, w)?;
            let (lines, step) = if weight <= w {
                let take = read(&rec, i - 1, w - weight)? + value;
                let best = skip.max(take);
                let step = Step::new(StepKind::Mutate, Highlight::Current)
                    .on_all([cell(i, w), cell(i - 1, w), cell(i - 1, w - weight)])
                    .mutate(Mutation::SetCell { row: i, col: w, value: best })
                    .compares(1)
                    .says(format!(
                        "Item {} fits in {}: max(skip {}, take {}) = {}",
                        i, w, skip, take, best
                    ));
                (&[5, 6][..], step)
            } else {
                let step = Step::new(StepKind::Mutate, Highlight::Current)
                    .on_all([cell(i, w), cell(i - 1, w)])
                    .mutate(Mutation::SetCell { row: i, col: w, value: skip })
                    .says(format!("Item {} is too heavy for {}: keep {}", i, w, skip));
                (&[7, 8][..], step)
            };
            rec.emit(lines, step)?;
        }
    }

    let best = read(&rec, n, cap)?;
    let mut chosen = Vec::new();
    let mut w = cap;
    for i in (1..=n).rev() {
        let (here, above) = (read(&rec, i, w)?, read(&rec, i - 1, w)?);
        if here != above {
            chosen.push(i - 1);
            rec.emit(
                &[10, 11],
                Step::new(StepKind::Path, Highlight::Optimal)
                    .on(cell(i, w))
                    .compares(1)
                    .says(format!("{} differs from {}: take item {}", here, above, i)),
            )?;
            w -= items[i - 1].0 as usize;
        } else {
            rec.emit(
                &[10],
                Step::new(StepKind::Examine, Highlight::Examining)
                    .on(cell(i, w))
                    .compares(1)
                    .says(format!("Item {} is not needed", i)),
            )?;
        }
    }
    chosen.reverse();
    Ok(rec.finish(Outcome::Selection { value: best, items: chosen }))
}

/// Fill the LCS table for `a` and `b` and trace back one longest subsequence.
///
/// Inputs are letters only and compared case-insensitively.
pub fn lcs(a: &str, b: &str) -> Result<StepProgram> {
    let normalize = |s: &str| -> Result<Vec<char>> {
        let chars: Vec<char> = s.trim().chars().map(|c| c.to_ascii_uppercase()).collect();
        if chars.is_empty() || chars.len() > MAX_LCS_LEN {
            return Err(Error::invalid(format!(
                "strings must have 1 to {} letters",
                MAX_LCS_LEN
            )));
        }
        if let Some(bad) = chars.iter().find(|c| !c.is_ascii_uppercase()) {
            return Err(Error::invalid(format!("'{}' is not a letter", bad)));
        }
        Ok(chars)
    };
    let (x, y) = (normalize(a)?, normalize(b)?);
    let xs: String = x.iter().collect();
    let ys: String = y.iter().collect();
    let mut rec = Recorder::new(Algorithm::Lcs, DpTableModel::lcs(&xs, &ys));

    for i in 1..=x.len() {
        for j in 1..=y.len() {
            let (lines, step) = if x[i - 1] == y[j - 1] {
                let value = read(&rec, i - 1, j - 1)? + 1;
                let step = Step::new(StepKind::Mutate, Highlight::Found)
                    .on_all([cell(i, j), cell(i - 1, j - 1)])
                    .mutate(Mutation::SetCell { row: i, col: j, value })
                    .compares(1)
                    .says(format!("{} matches: diagonal + 1 = {}", x[i - 1], value));
                (&[5, 6][..], step)
            } else {
                let (up, left) = (read(&rec, i - 1, j)?, read(&rec, i, j - 1)?);
                let step = Step::new(StepKind::Mutate, Highlight::Current)
                    .on_all([cell(i, j), cell(i - 1, j), cell(i, j - 1)])
                    .mutate(Mutation::SetCell { row: i, col: j, value: up.max(left) })
                    .compares(1)
                    .says(format!("{} differs from {}: max({}, {})", x[i - 1], y[j - 1], up, left));
                (&[7, 8][..], step)
            };
            rec.emit(lines, step)?;
        }
    }

    let (mut i, mut j) = (x.len(), y.len());
    let mut picked = Vec::new();
    while i > 0 && j > 0 {
        if x[i - 1] == y[j - 1] {
            picked.push(x[i - 1]);
            rec.emit(
                &[9],
                Step::new(StepKind::Path, Highlight::Optimal)
                    .on(cell(i, j))
                    .says(format!("{} is part of the subsequence", x[i - 1])),
            )?;
            i -= 1;
            j -= 1;
        } else {
            rec.emit(
                &[9],
                Step::new(StepKind::Examine, Highlight::Examining)
                    .on(cell(i, j))
                    .compares(1)
                    .says("Follow the larger neighbor"),
            )?;
            if read(&rec, i - 1, j)? >= read(&rec, i, j - 1)? {
                i -= 1;
            } else {
                j -= 1;
            }
        }
    }
    picked.reverse();
    let text: String = picked.into_iter().collect();
    Ok(rec.finish(Outcome::Subsequence {
        length: text.chars().count(),
        text,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn knapsack_sample_optimum() {
        let program = knapsack(&SAMPLE_ITEMS, 10).unwrap();
        let Outcome::Selection { value, items } = program.outcome().clone() else {
            panic!("unexpected outcome {:?}", program.outcome());
        };
        assert_eq!(value, 13);
        let weight: u32 = items.iter().map(|&i| SAMPLE_ITEMS[i].0).sum();
        let total: i64 = items.iter().map(|&i| SAMPLE_ITEMS[i].1).sum();
        assert!(weight <= 10);
        assert_eq!(total, 13);
    }

    #[test]
    fn knapsack_fills_the_whole_table() {
        let program = knapsack(&SAMPLE_ITEMS, 10).unwrap();
        let mut table = DpTableModel::knapsack(&SAMPLE_ITEMS, 10);
        program.replay_into(&mut table).unwrap();
        assert!(table.is_complete());
        assert_eq!(table.cell(5, 10), Some(13));
        assert_eq!(table.cell(1, 1), Some(0));
        assert_eq!(table.cell(1, 2), Some(3));
    }

    #[test]
    fn lcs_of_classic_pair() {
        let program = lcs("ABCBDAB", "BDCABA").unwrap();
        let Outcome::Subsequence { length, text } = program.outcome().clone() else {
            panic!("unexpected outcome {:?}", program.outcome());
        };
        assert_eq!(length, 4);
        assert_eq!(text.len(), 4);
        assert!(program.steps().iter().all(|s| s.code_refs.contains_key("lcs")));
    }

    #[test]
    fn lcs_is_case_insensitive() {
        let lower = lcs("abc", "ac").unwrap();
        let upper = lcs("ABC", "AC").unwrap();
        assert_eq!(lower.steps(), upper.steps());
    }

    #[test]
    fn rejects_bad_parameters() {
        assert!(matches!(knapsack(&SAMPLE_ITEMS, 0), Err(Error::InvalidInput(_))));
        assert!(matches!(knapsack(&SAMPLE_ITEMS, 21), Err(Error::InvalidInput(_))));
        assert!(matches!(knapsack(&[(0, 3)], 5), Err(Error::InvalidInput(_))));
        assert!(matches!(lcs("", "A"), Err(Error::InvalidInput(_))));
        assert!(matches!(lcs("A1", "A"), Err(Error::InvalidInput(_))));
        assert!(matches!(lcs(&"A".repeat(13), "A"), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn rejects_huge_values() {
        let items = [(1, i64::MAX), (1, 1)];
        assert!(matches!(knapsack(&items, 2), Err(Error::InvalidInput(_))));
        assert!(matches!(knapsack(&[(1, MAX_ITEM_VALUE + 1)], 1), Err(Error::InvalidInput(_))));

        let program = knapsack(&[(1, MAX_ITEM_VALUE); MAX_ITEMS], MAX_CAPACITY).unwrap();
        let Outcome::Selection { value, .. } = program.outcome().clone() else {
            panic!("unexpected outcome {:?}", program.outcome());
        };
        assert_eq!(value, MAX_ITEM_VALUE * MAX_ITEMS as i64);
    }
}
