//! Step sources: instrumented algorithms that record their progress as steps.
//!
//! Every source validates its parameters first and fails with
//! [`Error::InvalidInput`] before recording anything. It then runs against a
//! shadow copy of the model through a [`Recorder`], which applies each step as
//! it is emitted. The algorithm reads state only from that shadow, so the
//! recorded steps are by construction the one path from the baseline to the
//! end state.

pub mod bst;
pub mod dp;
pub mod graph;
pub mod heap;
pub mod segment;
pub mod sorting;
pub mod trie;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::Algorithm;
use crate::error::Result;
use crate::model::VisualModel;
use crate::pseudocode::Listing;
use crate::step::{Step, StepMetrics};

#[cfg(doc)]
use crate::error::Error;

/// What an algorithm computed, besides the model changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Outcome {
    /// The model was changed in place and there is nothing else to report.
    Done,
    Sorted { values: Vec<i64> },
    Found { found: bool },
    /// Values in the order they were visited.
    Sequence { values: Vec<i64> },
    /// A single computed value (range query, extracted root).
    Value { value: i64 },
    /// Graph node indices in visit order.
    Order { nodes: Vec<usize> },
    /// Shortest path; `distance` is `None` when the target is unreachable.
    Path { distance: Option<u64>, nodes: Vec<usize> },
    /// Optimal knapsack value and the chosen item indices.
    Selection { value: i64, items: Vec<usize> },
    Subsequence { length: usize, text: String },
}

/// A baseline model plus the ordered steps that animate one run.
#[derive(Debug, Clone)]
pub struct StepProgram {
    algorithm: Algorithm,
    initial: Box<dyn VisualModel>,
    end: Box<dyn VisualModel>,
    steps: Vec<Step>,
    outcome: Outcome,
}

impl StepProgram {
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn listing(&self) -> &'static Listing {
        self.algorithm.listing()
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    /// The model as it was before the first step.
    pub fn initial(&self) -> &dyn VisualModel {
        self.initial.as_ref()
    }

    /// A fresh copy of the baseline, ready to be stepped.
    pub fn fresh_model(&self) -> Box<dyn VisualModel> {
        self.initial.clone()
    }

    /// The model as it is after the last step.
    pub fn end_state(&self) -> &dyn VisualModel {
        self.end.as_ref()
    }

    /// Apply every step to a fresh baseline and return the result.
    pub fn replay(&self) -> Result<Box<dyn VisualModel>> {
        let mut model = self.fresh_model();
        self.replay_into(model.as_mut())?;
        Ok(model)
    }

    /// Apply every step to `model`, which must match the baseline.
    ///
    /// Lets callers holding a concrete model type follow a run.
    pub fn replay_into<M: VisualModel + ?Sized>(&self, model: &mut M) -> Result<()> {
        for step in &self.steps {
            model.apply(step)?;
        }
        Ok(())
    }

    /// Sum of all step metrics.
    pub fn total_metrics(&self) -> StepMetrics {
        let mut total = StepMetrics::default();
        for step in &self.steps {
            total += step.metrics;
        }
        total
    }
}

/// Records steps while keeping a shadow model in lockstep.
pub(crate) struct Recorder<M> {
    algorithm: Algorithm,
    initial: M,
    shadow: M,
    steps: Vec<Step>,
}

impl<M> Recorder<M>
where
    M: VisualModel + Clone + 'static,
{
    pub(crate) fn new(algorithm: Algorithm, mut model: M) -> Self {
        model.rebase();
        Self {
            algorithm,
            initial: model.clone(),
            shadow: model,
            steps: Vec::new(),
        }
    }

    /// Current state: the baseline with every recorded step applied.
    pub(crate) fn model(&self) -> &M {
        &self.shadow
    }

    /// Tag `step` with `lines` of this algorithm's listing, apply it, record it.
    pub(crate) fn emit(&mut self, lines: &[u32], step: Step) -> Result<()> {
        let step = if lines.is_empty() {
            step
        } else {
            step.lines(self.algorithm.listing().id, lines)
        };
        self.shadow.apply(&step)?;
        self.steps.push(step);
        Ok(())
    }

    pub(crate) fn finish(self, outcome: Outcome) -> StepProgram {
        debug!(algorithm = %self.algorithm, steps = self.steps.len(), "recorded step program");
        StepProgram {
            algorithm: self.algorithm,
            initial: Box::new(self.initial),
            end: Box::new(self.shadow),
            steps: self.steps,
            outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ArrayModel, BstModel, Combiner, GraphModel, HeapOrder, TrieModel};
    use crate::pseudocode;

    fn sample_programs() -> Vec<StepProgram> {
        let values = [5, 3, 8, 1, 9, 2];
        let mut programs: Vec<StepProgram> = [
            Algorithm::BubbleSort,
            Algorithm::SelectionSort,
            Algorithm::InsertionSort,
            Algorithm::MergeSort,
            Algorithm::QuickSort,
            Algorithm::HeapSort,
        ]
        .into_iter()
        .map(|a| sorting::sort(a, &values).unwrap())
        .collect();

        let tree = BstModel::from_values(&[5, 3, 8, 1, 4]).unwrap();
        programs.push(bst::insert(&tree, 7).unwrap());
        programs.push(bst::delete(&tree, 3).unwrap());
        programs.push(bst::search(&tree, 4).unwrap());
        programs.push(bst::traverse(&tree, bst::Traversal::PostOrder).unwrap());

        let heap = ArrayModel::heap(vec![1, 3, 2, 7], HeapOrder::Min);
        programs.push(heap::insert(&heap, 0).unwrap());
        programs.push(heap::extract(&heap).unwrap());
        programs.push(heap::heapify(&[4, 9, 1, 7, 3], HeapOrder::Max).unwrap());

        let trie = TrieModel::from_words(&["car", "cat"]).unwrap();
        programs.push(trie::insert(&trie, "cart").unwrap());
        programs.push(trie::search(&trie, "ca").unwrap());
        programs.push(trie::delete(&trie, "cat").unwrap());

        let graph = GraphModel::sample_weighted();
        programs.push(graph::bfs(&graph, 0).unwrap());
        programs.push(graph::dfs(&graph, 0).unwrap());
        programs.push(graph::dijkstra(&graph, 0, 5).unwrap());

        programs.push(segment::build(&[1, 3, 5, 7, 9, 11], Combiner::Sum).unwrap());
        let tree = segment::built_tree(&[1, 3, 5, 7, 9, 11], Combiner::Max).unwrap();
        programs.push(segment::query(&tree, 2, 5).unwrap());
        programs.push(segment::update(&tree, 3, 20).unwrap());

        programs.push(dp::knapsack(&dp::SAMPLE_ITEMS, 10).unwrap());
        programs.push(dp::lcs("ABCB", "BCA").unwrap());
        programs
    }

    #[test]
    fn replay_reaches_the_recorded_end_state() {
        for program in sample_programs() {
            let replayed = program.replay().unwrap();
            assert_eq!(
                replayed.snapshot(),
                program.end_state().snapshot(),
                "{} replay diverged",
                program.algorithm()
            );
        }
    }

    #[test]
    fn code_refs_point_into_their_listing() {
        for program in sample_programs() {
            let listing = program.listing();
            for step in program.steps() {
                for (panel, lines) in &step.code_refs {
                    assert_eq!(panel, listing.id);
                    assert!(pseudocode::listing(panel).is_some());
                    for &line in lines {
                        assert!(
                            listing.line(line).is_some(),
                            "{} references line {} of {}",
                            program.algorithm(),
                            line,
                            panel
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn fresh_model_is_the_baseline() {
        let program = sorting::sort(Algorithm::BubbleSort, &[2, 1]).unwrap();
        assert_eq!(program.fresh_model().snapshot(), program.initial().snapshot());
        assert_ne!(program.initial().snapshot(), program.end_state().snapshot());
        assert_eq!(program.total_metrics().swaps, 1);
    }
}
