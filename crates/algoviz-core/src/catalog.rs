//! Algorithm catalog: names, families, pseudocode and complexity notes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::pseudocode::{self, Listing};

/// Every animated algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    BubbleSort,
    SelectionSort,
    InsertionSort,
    MergeSort,
    QuickSort,
    HeapSort,
    BstInsert,
    BstDelete,
    BstSearch,
    BstTraversal,
    HeapInsert,
    HeapExtract,
    Heapify,
    TrieInsert,
    TrieSearch,
    TrieDelete,
    Bfs,
    Dfs,
    Dijkstra,
    SegmentBuild,
    SegmentQuery,
    SegmentUpdate,
    Knapsack,
    Lcs,
}

/// Which visualizer an algorithm belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Family {
    Sorting,
    SearchTree,
    BinaryHeap,
    Trie,
    Graph,
    SegmentTree,
    DynamicProgramming,
}

/// Best, average and worst case of one measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Bounds {
    pub best: &'static str,
    pub average: &'static str,
    pub worst: &'static str,
}

const fn bounds(best: &'static str, average: &'static str, worst: &'static str) -> Bounds {
    Bounds {
        best,
        average,
        worst,
    }
}

/// Theoretical cost of an algorithm as shown in the stats panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Complexity {
    pub time: Bounds,
    pub space: Bounds,
    pub stable: bool,
    pub adaptive: bool,
}

impl Algorithm {
    pub const ALL: [Algorithm; 24] = [
        Algorithm::BubbleSort,
        Algorithm::SelectionSort,
        Algorithm::InsertionSort,
        Algorithm::MergeSort,
        Algorithm::QuickSort,
        Algorithm::HeapSort,
        Algorithm::BstInsert,
        Algorithm::BstDelete,
        Algorithm::BstSearch,
        Algorithm::BstTraversal,
        Algorithm::HeapInsert,
        Algorithm::HeapExtract,
        Algorithm::Heapify,
        Algorithm::TrieInsert,
        Algorithm::TrieSearch,
        Algorithm::TrieDelete,
        Algorithm::Bfs,
        Algorithm::Dfs,
        Algorithm::Dijkstra,
        Algorithm::SegmentBuild,
        Algorithm::SegmentQuery,
        Algorithm::SegmentUpdate,
        Algorithm::Knapsack,
        Algorithm::Lcs,
    ];

    /// Identifier used on the wire and on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::BubbleSort => "bubble_sort",
            Algorithm::SelectionSort => "selection_sort",
            Algorithm::InsertionSort => "insertion_sort",
            Algorithm::MergeSort => "merge_sort",
            Algorithm::QuickSort => "quick_sort",
            Algorithm::HeapSort => "heap_sort",
            Algorithm::BstInsert => "bst_insert",
            Algorithm::BstDelete => "bst_delete",
            Algorithm::BstSearch => "bst_search",
            Algorithm::BstTraversal => "bst_traversal",
            Algorithm::HeapInsert => "heap_insert",
            Algorithm::HeapExtract => "heap_extract",
            Algorithm::Heapify => "heapify",
            Algorithm::TrieInsert => "trie_insert",
            Algorithm::TrieSearch => "trie_search",
            Algorithm::TrieDelete => "trie_delete",
            Algorithm::Bfs => "bfs",
            Algorithm::Dfs => "dfs",
            Algorithm::Dijkstra => "dijkstra",
            Algorithm::SegmentBuild => "segment_build",
            Algorithm::SegmentQuery => "segment_query",
            Algorithm::SegmentUpdate => "segment_update",
            Algorithm::Knapsack => "knapsack",
            Algorithm::Lcs => "lcs",
        }
    }

    pub fn family(&self) -> Family {
        use Algorithm::*;
        match self {
            BubbleSort | SelectionSort | InsertionSort | MergeSort | QuickSort | HeapSort => {
                Family::Sorting
            }
            BstInsert | BstDelete | BstSearch | BstTraversal => Family::SearchTree,
            HeapInsert | HeapExtract | Heapify => Family::BinaryHeap,
            TrieInsert | TrieSearch | TrieDelete => Family::Trie,
            Bfs | Dfs | Dijkstra => Family::Graph,
            SegmentBuild | SegmentQuery | SegmentUpdate => Family::SegmentTree,
            Knapsack | Lcs => Family::DynamicProgramming,
        }
    }

    /// Pseudocode panel the algorithm's steps point into.
    pub fn listing(&self) -> &'static Listing {
        use Algorithm::*;
        match self {
            BubbleSort => &pseudocode::BUBBLE_SORT,
            SelectionSort => &pseudocode::SELECTION_SORT,
            InsertionSort => &pseudocode::INSERTION_SORT,
            MergeSort => &pseudocode::MERGE_SORT,
            QuickSort => &pseudocode::QUICK_SORT,
            HeapSort => &pseudocode::HEAP_SORT,
            BstInsert => &pseudocode::BST_INSERT,
            BstDelete => &pseudocode::BST_DELETE,
            BstSearch => &pseudocode::BST_SEARCH,
            BstTraversal => &pseudocode::BST_TRAVERSAL,
            HeapInsert | HeapExtract | Heapify => &pseudocode::BINARY_HEAP,
            TrieInsert | TrieSearch | TrieDelete => &pseudocode::TRIE,
            Bfs => &pseudocode::BFS,
            Dfs => &pseudocode::DFS,
            Dijkstra => &pseudocode::DIJKSTRA,
            SegmentBuild | SegmentQuery | SegmentUpdate => &pseudocode::SEGMENT_TREE,
            Knapsack => &pseudocode::KNAPSACK,
            Lcs => &pseudocode::LCS,
        }
    }

    pub fn complexity(&self) -> Complexity {
        use Algorithm::*;
        const N2: Bounds = bounds("O(n²)", "O(n²)", "O(n²)");
        const NLOGN: Bounds = bounds("O(n log n)", "O(n log n)", "O(n log n)");
        const ONE: Bounds = bounds("O(1)", "O(1)", "O(1)");
        const TREE_PATH: Bounds = bounds("O(log n)", "O(log n)", "O(n)");
        const HEAP_PATH: Bounds = bounds("O(1)", "O(log n)", "O(log n)");
        const LINEAR: Bounds = bounds("O(n)", "O(n)", "O(n)");
        const GRAPH: Bounds = bounds("O(V + E)", "O(V + E)", "O(V + E)");
        const WORD: Bounds = bounds("O(m)", "O(m)", "O(m)");

        let (time, space, stable, adaptive) = match self {
            BubbleSort => (N2, ONE, true, false),
            SelectionSort => (N2, ONE, false, false),
            InsertionSort => (bounds("O(n)", "O(n²)", "O(n²)"), ONE, true, true),
            MergeSort => (NLOGN, LINEAR, true, false),
            QuickSort => (
                bounds("O(n log n)", "O(n log n)", "O(n²)"),
                bounds("O(log n)", "O(log n)", "O(n)"),
                false,
                true,
            ),
            HeapSort => (NLOGN, ONE, false, false),
            BstInsert | BstDelete => (TREE_PATH, TREE_PATH, true, true),
            BstSearch => (bounds("O(1)", "O(log n)", "O(n)"), bounds("O(1)", "O(log n)", "O(n)"), true, true),
            BstTraversal => (LINEAR, bounds("O(log n)", "O(log n)", "O(n)"), true, false),
            HeapInsert | HeapExtract => (HEAP_PATH, ONE, false, true),
            Heapify => (LINEAR, ONE, false, false),
            TrieInsert | TrieSearch | TrieDelete => (WORD, WORD, true, false),
            Bfs | Dfs => (GRAPH, bounds("O(V)", "O(V)", "O(V)"), true, false),
            Dijkstra => (
                bounds("O(E log V)", "O(E log V)", "O(E log V)"),
                bounds("O(V)", "O(V)", "O(V)"),
                true,
                true,
            ),
            SegmentBuild => (LINEAR, LINEAR, true, false),
            SegmentQuery | SegmentUpdate => (
                bounds("O(log n)", "O(log n)", "O(log n)"),
                bounds("O(log n)", "O(log n)", "O(log n)"),
                true,
                false,
            ),
            Knapsack => (
                bounds("O(nW)", "O(nW)", "O(nW)"),
                bounds("O(nW)", "O(nW)", "O(nW)"),
                true,
                false,
            ),
            Lcs => (
                bounds("O(mn)", "O(mn)", "O(mn)"),
                bounds("O(mn)", "O(mn)", "O(mn)"),
                true,
                false,
            ),
        };
        Complexity {
            time,
            space,
            stable,
            adaptive,
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        Algorithm::ALL
            .into_iter()
            .find(|a| a.name() == wanted)
            .ok_or_else(|| Error::NotFound(format!("unknown algorithm '{}'", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_from_str() {
        for algorithm in Algorithm::ALL {
            assert_eq!(algorithm.name().parse::<Algorithm>().unwrap(), algorithm);
        }
        assert_eq!("Quick-Sort".parse::<Algorithm>().unwrap(), Algorithm::QuickSort);
        assert!(matches!("bogo_sort".parse::<Algorithm>(), Err(Error::NotFound(_))));
    }

    #[test]
    fn serde_name_matches_display() {
        let json = serde_json::to_string(&Algorithm::SegmentQuery).unwrap();
        assert_eq!(json, "\"segment_query\"");
    }

    #[test]
    fn families_share_listings() {
        assert_eq!(Algorithm::HeapInsert.listing().id, Algorithm::Heapify.listing().id);
        assert_eq!(Algorithm::Dijkstra.family(), Family::Graph);
        assert_eq!(Algorithm::QuickSort.complexity().time.worst, "O(n²)");
    }
}
