//! Array model for sorting and array-backed binary heaps.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{unsupported, Snapshot, VisualModel};
use crate::error::{Error, Result};
use crate::step::{Mutation, NodeId};

/// How an array is meant to be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrayShape {
    /// Bar chart.
    Bars,
    /// Complete binary tree in heap order.
    Heap,
}

/// Heap ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeapOrder {
    Min,
    Max,
}

impl HeapOrder {
    /// Whether `a` belongs above `b`.
    pub fn precedes(&self, a: i64, b: i64) -> bool {
        match self {
            HeapOrder::Min => a < b,
            HeapOrder::Max => a > b,
        }
    }
}

impl FromStr for HeapOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "min" | "min-heap" => Ok(HeapOrder::Min),
            "max" | "max-heap" => Ok(HeapOrder::Max),
            _ => Err(Error::invalid(format!("unknown heap order '{}'", s))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Slots {
    values: Vec<i64>,
    ids: Vec<NodeId>,
    next_id: u64,
}

/// Array of values; each element keeps its id when swapped.
#[derive(Debug, Clone)]
pub struct ArrayModel {
    current: Slots,
    baseline: Slots,
    shape: ArrayShape,
    order: Option<HeapOrder>,
}

impl ArrayModel {
    /// A bar-chart array.
    pub fn new(values: Vec<i64>) -> Self {
        Self::with_shape(values, ArrayShape::Bars, None)
    }

    /// A heap-shaped array. `values` is taken as-is; it need not be a heap yet.
    pub fn heap(values: Vec<i64>, order: HeapOrder) -> Self {
        Self::with_shape(values, ArrayShape::Heap, Some(order))
    }

    fn with_shape(values: Vec<i64>, shape: ArrayShape, order: Option<HeapOrder>) -> Self {
        let ids = (0..values.len() as u64).map(NodeId).collect();
        let slots = Slots {
            next_id: values.len() as u64,
            values,
            ids,
        };
        Self {
            current: slots.clone(),
            baseline: slots,
            shape,
            order,
        }
    }

    pub fn values(&self) -> &[i64] {
        &self.current.values
    }

    pub fn ids(&self) -> &[NodeId] {
        &self.current.ids
    }

    pub fn len(&self) -> usize {
        self.current.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.values.is_empty()
    }

    pub fn shape(&self) -> ArrayShape {
        self.shape
    }

    pub fn order(&self) -> Option<HeapOrder> {
        self.order
    }

    /// Whether the values satisfy the heap property for this model's order.
    pub fn is_heap(&self) -> bool {
        let Some(order) = self.order else {
            return false;
        };
        let v = &self.current.values;
        (1..v.len()).all(|i| !order.precedes(v[i], v[(i - 1) / 2]))
    }

    fn check(&self, index: usize) -> Result<()> {
        if index < self.len() {
            Ok(())
        } else {
            Err(Error::inconsistent(format!(
                "index {} out of bounds for array of {}",
                index,
                self.len()
            )))
        }
    }
}

impl VisualModel for ArrayModel {
    fn kind(&self) -> &'static str {
        match self.shape {
            ArrayShape::Bars => "array",
            ArrayShape::Heap => "heap",
        }
    }

    fn mutate(&mut self, mutation: &Mutation) -> Result<()> {
        match *mutation {
            Mutation::Swap { i, j } => {
                self.check(i)?;
                self.check(j)?;
                self.current.values.swap(i, j);
                self.current.ids.swap(i, j);
            }
            Mutation::Set { index, value } => {
                self.check(index)?;
                self.current.values[index] = value;
            }
            Mutation::Push { value } => {
                let slots = &mut self.current;
                slots.values.push(value);
                slots.ids.push(NodeId(slots.next_id));
                slots.next_id += 1;
            }
            Mutation::Pop => {
                if self.current.values.pop().is_none() {
                    return Err(Error::inconsistent("pop from empty array"));
                }
                self.current.ids.pop();
            }
            ref other => return Err(unsupported(self.kind(), other)),
        }
        Ok(())
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot::Array {
            values: self.current.values.clone(),
            ids: self.current.ids.clone(),
            shape: self.shape,
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
    fn swap_moves_ids_with_values() {
        let mut model = ArrayModel::new(vec![5, 3]);
        model.mutate(&Mutation::Swap { i: 0, j: 1 }).unwrap();
        assert_eq!(model.values(), &[3, 5]);
        assert_eq!(model.ids(), &[NodeId(1), NodeId(0)]);
    }

    #[test]
    fn out_of_bounds_is_inconsistent_and_leaves_state() {
        let mut model = ArrayModel::new(vec![1, 2]);
        let err = model.mutate(&Mutation::Swap { i: 0, j: 5 }).unwrap_err();
        assert!(matches!(err, Error::InconsistentStep(_)));
        assert_eq!(model.values(), &[1, 2]);
    }

    #[test]
    fn push_pop_and_reset() {
        let mut model = ArrayModel::heap(vec![1], HeapOrder::Min);
        model.mutate(&Mutation::Push { value: 4 }).unwrap();
        assert_eq!(model.ids(), &[NodeId(0), NodeId(1)]);
        model.mutate(&Mutation::Pop).unwrap();
        model.mutate(&Mutation::Pop).unwrap();
        assert!(model.mutate(&Mutation::Pop).is_err());
        model.reset();
        assert_eq!(model.values(), &[1]);
    }

    #[test]
    fn rejects_foreign_mutations() {
        let mut model = ArrayModel::new(vec![1]);
        let err = model.mutate(&Mutation::SetCell { row: 0, col: 0, value: 1 }).unwrap_err();
        assert_eq!(
            err,
            Error::UnsupportedMutation { model: "array", mutation: "set_cell" }
        );
    }

    #[test]
    fn heap_property() {
        assert!(ArrayModel::heap(vec![1, 3, 2, 7], HeapOrder::Min).is_heap());
        assert!(!ArrayModel::heap(vec![3, 1, 2], HeapOrder::Min).is_heap());
        assert!(ArrayModel::heap(vec![9, 4, 8, 1], HeapOrder::Max).is_heap());
        assert!(!ArrayModel::new(vec![1, 2]).is_heap());
    }
}
