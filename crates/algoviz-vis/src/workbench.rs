//! The structures a session works on, and turning requests into step programs.
//!
//! Operations that change a structure (inserting into the tree, extracting
//! from the heap, updating the segment tree, ...) stage their end state when
//! prepared. The host commits it once the run completes, so the next request
//! starts from where the last finished run ended.

use algoviz_core::model::{ArrayModel, BstModel, Combiner, GraphModel, HeapOrder, SegmentTreeModel, TrieModel};
use algoviz_core::source::{bst, dp, graph, heap, segment, sorting, trie};
use algoviz_core::source::bst::Traversal;
use algoviz_core::{Algorithm, Error, Generator, GeneratorConfig, Result, StepProgram, VisualModel};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// One algorithm run, as submitted by a form or the command line.
///
/// Only the fields an algorithm needs are read; the rest are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlgorithmRequest {
    pub algorithm: Option<Algorithm>,
    /// Input array for sorts, heapify and segment build; generated when absent.
    pub values: Option<Vec<i64>>,
    /// Value to insert, delete or search for; new value for segment updates.
    pub value: Option<i64>,
    pub word: Option<String>,
    pub traversal: Option<Traversal>,
    pub order: Option<HeapOrder>,
    pub combiner: Option<Combiner>,
    /// Graph source, by node index.
    pub start: Option<usize>,
    pub target: Option<usize>,
    /// 1-based inclusive query range.
    pub left: Option<usize>,
    pub right: Option<usize>,
    /// 1-based segment update position.
    pub position: Option<usize>,
    pub capacity: Option<u32>,
    /// Knapsack `(weight, value)` pairs.
    pub items: Option<Vec<(u32, i64)>>,
    /// The two LCS strings.
    pub first: Option<String>,
    pub second: Option<String>,
}

impl AlgorithmRequest {
    pub fn new(algorithm: Algorithm) -> Self {
        Self {
            algorithm: Some(algorithm),
            ..Self::default()
        }
    }
}

fn required<T>(field: Option<T>, name: &str, algorithm: Algorithm) -> Result<T> {
    field.ok_or_else(|| Error::InvalidInput(format!("{} needs '{}'", algorithm, name)))
}

/// A structure's end state, waiting for its run to finish.
#[derive(Debug, Clone)]
enum Change {
    Tree(BstModel),
    Heap(ArrayModel),
    Trie(TrieModel),
    Segment(SegmentTreeModel),
}

impl Change {
    fn follow(mut self, program: &StepProgram) -> Result<Self> {
        match &mut self {
            Change::Tree(model) => follow(model, program)?,
            Change::Heap(model) => follow(model, program)?,
            Change::Trie(model) => follow(model, program)?,
            Change::Segment(model) => follow(model, program)?,
        }
        Ok(self)
    }
}

/// The session's current structures plus the seeded generator.
pub struct Workbench {
    generator: Generator,
    tree: BstModel,
    heap: ArrayModel,
    trie: TrieModel,
    graph: GraphModel,
    segment: Option<SegmentTreeModel>,
    pending: Option<Change>,
}

impl Workbench {
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        let mut generator = Generator::new(config);
        let tree = generator.bst()?;
        let heap = ArrayModel::heap(Vec::new(), HeapOrder::Min);
        let graph = generator.graph()?;
        Ok(Self {
            generator,
            tree,
            heap,
            trie: TrieModel::new(),
            graph,
            segment: None,
            pending: None,
        })
    }

    pub fn tree(&self) -> &BstModel {
        &self.tree
    }

    pub fn heap(&self) -> &ArrayModel {
        &self.heap
    }

    pub fn trie(&self) -> &TrieModel {
        &self.trie
    }

    pub fn graph(&self) -> &GraphModel {
        &self.graph
    }

    pub fn segment(&self) -> Option<&SegmentTreeModel> {
        self.segment.as_ref()
    }

    /// Replace every structure with freshly generated ones.
    pub fn regenerate(&mut self) -> Result<()> {
        self.tree = self.generator.bst()?;
        self.graph = self.generator.graph()?;
        self.heap = ArrayModel::heap(Vec::new(), HeapOrder::Min);
        self.trie = TrieModel::new();
        self.segment = None;
        self.pending = None;
        info!(tree = self.tree.len(), graph = self.graph.len(), "structures regenerated");
        Ok(())
    }

    /// Build the step program for `request` and stage the end state of the
    /// structure it changes. Nothing moves until [`Workbench::commit`].
    ///
    /// A failed request leaves any earlier staged change in place.
    pub fn prepare(&mut self, request: &AlgorithmRequest) -> Result<StepProgram> {
        let algorithm = request
            .algorithm
            .ok_or_else(|| Error::InvalidInput("request names no algorithm".into()))?;
        // replaces the structure instead of continuing from it
        let mut fresh = None;
        let program = match algorithm {
            Algorithm::BubbleSort
            | Algorithm::SelectionSort
            | Algorithm::InsertionSort
            | Algorithm::MergeSort
            | Algorithm::QuickSort
            | Algorithm::HeapSort => {
                let values = match &request.values {
                    Some(values) => values.clone(),
                    None => self.generator.array(),
                };
                sorting::sort(algorithm, &values)?
            }

            Algorithm::BstInsert => bst::insert(&self.tree, required(request.value, "value", algorithm)?)?,
            Algorithm::BstDelete => bst::delete(&self.tree, required(request.value, "value", algorithm)?)?,
            Algorithm::BstSearch => bst::search(&self.tree, required(request.value, "value", algorithm)?)?,
            Algorithm::BstTraversal => bst::traverse(&self.tree, request.traversal.unwrap_or(Traversal::InOrder))?,

            Algorithm::HeapInsert => heap::insert(&self.heap, required(request.value, "value", algorithm)?)?,
            Algorithm::HeapExtract => heap::extract(&self.heap)?,
            Algorithm::Heapify => {
                let values = match &request.values {
                    Some(values) => values.clone(),
                    None => self.generator.heap_values(),
                };
                let order = request.order.or(self.heap.order()).unwrap_or(HeapOrder::Min);
                let program = heap::heapify(&values, order)?;
                fresh = Some(Change::Heap(ArrayModel::heap(values, order)));
                program
            }

            Algorithm::TrieInsert => trie::insert(&self.trie, &word(request, algorithm)?)?,
            Algorithm::TrieSearch => trie::search(&self.trie, &word(request, algorithm)?)?,
            Algorithm::TrieDelete => trie::delete(&self.trie, &word(request, algorithm)?)?,

            Algorithm::Bfs => graph::bfs(&self.graph, request.start.unwrap_or(0))?,
            Algorithm::Dfs => graph::dfs(&self.graph, request.start.unwrap_or(0))?,
            Algorithm::Dijkstra => {
                let target = request.target.unwrap_or(self.graph.len() - 1);
                graph::dijkstra(&self.graph, request.start.unwrap_or(0), target)?
            }

            Algorithm::SegmentBuild => {
                let values = match &request.values {
                    Some(values) => values.clone(),
                    None => self.generator.segment_values(8),
                };
                let combiner = request.combiner.unwrap_or(Combiner::Sum);
                let program = segment::build(&values, combiner)?;
                fresh = Some(Change::Segment(SegmentTreeModel::new(values, combiner)?));
                program
            }
            Algorithm::SegmentQuery => {
                let tree = self.built_segment(algorithm)?;
                segment::query(
                    tree,
                    required(request.left, "left", algorithm)?,
                    required(request.right, "right", algorithm)?,
                )?
            }
            Algorithm::SegmentUpdate => {
                let tree = self.built_segment(algorithm)?;
                segment::update(
                    tree,
                    required(request.position, "position", algorithm)?,
                    required(request.value, "value", algorithm)?,
                )?
            }

            Algorithm::Knapsack => {
                let items = request.items.as_deref().unwrap_or(&dp::SAMPLE_ITEMS);
                dp::knapsack(items, request.capacity.unwrap_or(10))?
            }
            Algorithm::Lcs => dp::lcs(
                request.first.as_deref().unwrap_or("ABCBDAB"),
                request.second.as_deref().unwrap_or("BDCABA"),
            )?,
        };
        self.pending = self.end_state(&program, fresh)?;
        Ok(program)
    }

    /// Whether a prepared change is waiting to be committed.
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Move the structure the last prepared program changes to its end state.
    pub fn commit(&mut self) {
        let Some(change) = self.pending.take() else {
            return;
        };
        debug!(?change, "committing structure change");
        match change {
            Change::Tree(tree) => self.tree = tree,
            Change::Heap(heap) => self.heap = heap,
            Change::Trie(trie) => self.trie = trie,
            Change::Segment(tree) => self.segment = Some(tree),
        }
    }

    /// Drop the staged change of a run that did not finish.
    pub fn discard(&mut self) {
        if self.pending.take().is_some() {
            debug!("structure change discarded");
        }
    }

    fn built_segment(&self, algorithm: Algorithm) -> Result<&SegmentTreeModel> {
        self.segment
            .as_ref()
            .ok_or_else(|| Error::InvalidInput(format!("{} needs a segment tree; build one first", algorithm)))
    }

    /// The structure `program` changes, replayed to its end state.
    fn end_state(&self, program: &StepProgram, fresh: Option<Change>) -> Result<Option<Change>> {
        let base = match (fresh, program.algorithm()) {
            (Some(change), _) => change,
            (None, Algorithm::BstInsert | Algorithm::BstDelete) => Change::Tree(self.tree.clone()),
            (None, Algorithm::HeapInsert | Algorithm::HeapExtract) => Change::Heap(self.heap.clone()),
            (None, Algorithm::TrieInsert | Algorithm::TrieDelete) => Change::Trie(self.trie.clone()),
            (None, Algorithm::SegmentUpdate) => match &self.segment {
                Some(tree) => Change::Segment(tree.clone()),
                None => return Ok(None),
            },
            _ => return Ok(None),
        };
        base.follow(program).map(Some)
    }
}

fn follow<M: VisualModel>(model: &mut M, program: &StepProgram) -> Result<()> {
    program.replay_into(model)?;
    model.rebase();
    Ok(())
}

fn word(request: &AlgorithmRequest, algorithm: Algorithm) -> Result<String> {
    required(request.word.as_deref(), "word", algorithm).map(|w| w.trim().to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use algoviz_core::Outcome;

    fn bench() -> Workbench {
        Workbench::new(GeneratorConfig::default()).unwrap()
    }

    #[test]
    fn tree_operations_chain() {
        let mut bench = bench();
        let before = bench.tree().len();
        let value = 1000;

        let mut insert = AlgorithmRequest::new(Algorithm::BstInsert);
        insert.value = Some(value);
        bench.prepare(&insert).unwrap();
        assert_eq!(bench.tree().len(), before);
        bench.commit();
        assert_eq!(bench.tree().len(), before + 1);
        assert!(bench.tree().contains(value));
        assert!(bench.tree().is_valid_bst());

        let mut search = AlgorithmRequest::new(Algorithm::BstSearch);
        search.value = Some(value);
        assert_eq!(bench.prepare(&search).unwrap().outcome(), &Outcome::Found { found: true });

        let mut delete = AlgorithmRequest::new(Algorithm::BstDelete);
        delete.value = Some(value);
        bench.prepare(&delete).unwrap();
        bench.commit();
        assert_eq!(bench.tree().len(), before);
        assert!(bench.prepare(&delete).is_err());
    }

    #[test]
    fn heap_and_trie_carry_forward() {
        let mut bench = bench();
        for v in [5, 2, 9] {
            let mut req = AlgorithmRequest::new(Algorithm::HeapInsert);
            req.value = Some(v);
            bench.prepare(&req).unwrap();
            bench.commit();
        }
        assert_eq!(bench.heap().values()[0], 2);
        let program = bench.prepare(&AlgorithmRequest::new(Algorithm::HeapExtract)).unwrap();
        assert_eq!(program.outcome(), &Outcome::Value { value: 2 });
        bench.commit();
        assert_eq!(bench.heap().len(), 2);

        let mut req = AlgorithmRequest::new(Algorithm::TrieInsert);
        req.word = Some("Tree".into());
        bench.prepare(&req).unwrap();
        bench.commit();
        assert_eq!(bench.trie().words(), vec!["tree"]);
    }

    #[test]
    fn segment_requires_build() {
        let mut bench = bench();
        let mut query = AlgorithmRequest::new(Algorithm::SegmentQuery);
        query.left = Some(2);
        query.right = Some(5);
        assert!(matches!(bench.prepare(&query), Err(Error::InvalidInput(_))));

        let mut build = AlgorithmRequest::new(Algorithm::SegmentBuild);
        build.values = Some(vec![1, 3, 5, 7, 9, 11]);
        bench.prepare(&build).unwrap();
        assert!(matches!(bench.prepare(&query), Err(Error::InvalidInput(_))));
        bench.commit();
        assert_eq!(bench.prepare(&query).unwrap().outcome(), &Outcome::Value { value: 24 });

        let mut update = AlgorithmRequest::new(Algorithm::SegmentUpdate);
        update.position = Some(3);
        update.value = Some(20);
        bench.prepare(&update).unwrap();
        bench.commit();
        assert_eq!(bench.prepare(&query).unwrap().outcome(), &Outcome::Value { value: 39 });
    }

    #[test]
    fn discarded_change_leaves_structures_alone() {
        let mut bench = bench();
        let tree = bench.tree().clone();
        let mut insert = AlgorithmRequest::new(Algorithm::BstInsert);
        insert.value = Some(1000);
        bench.prepare(&insert).unwrap();
        assert!(bench.has_pending());

        bench.discard();
        bench.commit();
        assert!(!bench.has_pending());
        assert_eq!(bench.tree().len(), tree.len());
        assert!(!bench.tree().contains(1000));

        let search = AlgorithmRequest::new(Algorithm::BstTraversal);
        bench.prepare(&search).unwrap();
        assert!(!bench.has_pending());
    }

    #[test]
    fn missing_fields_are_invalid_input() {
        let mut bench = bench();
        assert!(matches!(bench.prepare(&AlgorithmRequest::default()), Err(Error::InvalidInput(_))));
        let err = bench.prepare(&AlgorithmRequest::new(Algorithm::BstInsert)).unwrap_err();
        assert!(err.to_string().contains("'value'"));
    }

    #[test]
    fn same_seed_same_programs() {
        let request = AlgorithmRequest::new(Algorithm::MergeSort);
        let a = bench().prepare(&request).unwrap();
        let b = bench().prepare(&request).unwrap();
        assert_eq!(a.steps(), b.steps());

        let dijkstra = AlgorithmRequest::new(Algorithm::Dijkstra);
        assert_eq!(bench().prepare(&dijkstra).unwrap().steps(), bench().prepare(&dijkstra).unwrap().steps());
    }

    #[test]
    fn request_parses_from_json() {
        let request: AlgorithmRequest =
            serde_json::from_str(r#"{"algorithm":"segment_query","left":2,"right":5}"#).unwrap();
        assert_eq!(request.algorithm, Some(Algorithm::SegmentQuery));
        assert_eq!((request.left, request.right), (Some(2), Some(5)));
        assert!(request.values.is_none());
    }
}
