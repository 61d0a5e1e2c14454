//! Built-in pseudocode listings.
//!
//! Step sources reference these listings by id and 1-based line number, so the
//! text here and the `code_refs` emitted by each source move together.

use serde::Serialize;

/// A pseudocode panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Listing {
    pub id: &'static str,
    pub title: &'static str,
    pub lines: &'static [&'static str],
}

impl Listing {
    /// Text of 1-based `line`.
    pub fn line(&self, line: u32) -> Option<&'static str> {
        let index = (line as usize).checked_sub(1)?;
        self.lines.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

pub const BUBBLE_SORT: Listing = Listing {
    id: "bubble_sort",
    title: "Bubble Sort",
    lines: &[
        "procedure bubbleSort(A)",
        "  n ← length(A)",
        "  for i ← 0 to n - 2",
        "    for j ← 0 to n - i - 2",
        "      if A[j] > A[j + 1] then",
        "        swap(A[j], A[j + 1])",
        "    A[n - i - 1] is in place",
        "  return A",
    ],
};

pub const SELECTION_SORT: Listing = Listing {
    id: "selection_sort",
    title: "Selection Sort",
    lines: &[
        "procedure selectionSort(A)",
        "  n ← length(A)",
        "  for i ← 0 to n - 2",
        "    min ← i",
        "    for j ← i + 1 to n - 1",
        "      if A[j] < A[min] then",
        "        min ← j",
        "    if min ≠ i then",
        "      swap(A[i], A[min])",
        "    A[i] is in place",
        "  return A",
    ],
};

pub const INSERTION_SORT: Listing = Listing {
    id: "insertion_sort",
    title: "Insertion Sort",
    lines: &[
        "procedure insertionSort(A)",
        "  for i ← 1 to length(A) - 1",
        "    key ← A[i]",
        "    j ← i - 1",
        "    while j ≥ 0 and A[j] > key",
        "      A[j + 1] ← A[j]",
        "      j ← j - 1",
        "    A[j + 1] ← key",
        "  return A",
    ],
};

pub const MERGE_SORT: Listing = Listing {
    id: "merge_sort",
    title: "Merge Sort",
    lines: &[
        "procedure mergeSort(A, lo, hi)",
        "  if lo ≥ hi then return",
        "  mid ← ⌊(lo + hi) / 2⌋",
        "  mergeSort(A, lo, mid)",
        "  mergeSort(A, mid + 1, hi)",
        "  merge(A, lo, mid, hi)",
        "procedure merge(A, lo, mid, hi)",
        "  L ← A[lo..mid]; R ← A[mid + 1..hi]",
        "  k ← lo",
        "  while L and R are not empty",
        "    if L[0] ≤ R[0] then A[k] ← pop(L)",
        "    else A[k] ← pop(R)",
        "    k ← k + 1",
        "  copy what is left of L or R into A[k..hi]",
    ],
};

pub const QUICK_SORT: Listing = Listing {
    id: "quick_sort",
    title: "Quick Sort",
    lines: &[
        "procedure quickSort(A, lo, hi)",
        "  if lo < hi then",
        "    p ← partition(A, lo, hi)",
        "    quickSort(A, lo, p - 1)",
        "    quickSort(A, p + 1, hi)",
        "procedure partition(A, lo, hi)",
        "  pivot ← A[hi]",
        "  i ← lo - 1",
        "  for j ← lo to hi - 1",
        "    if A[j] < pivot then",
        "      i ← i + 1; swap(A[i], A[j])",
        "  swap(A[i + 1], A[hi])",
        "  return i + 1",
    ],
};

pub const HEAP_SORT: Listing = Listing {
    id: "heap_sort",
    title: "Heap Sort",
    lines: &[
        "procedure heapSort(A)",
        "  n ← length(A)",
        "  for i ← ⌊n / 2⌋ - 1 down to 0",
        "    siftDown(A, i, n)",
        "  for end ← n - 1 down to 1",
        "    swap(A[0], A[end])",
        "    siftDown(A, 0, end)",
        "procedure siftDown(A, i, n)",
        "  largest ← i; l ← 2i + 1; r ← 2i + 2",
        "  if l < n and A[l] > A[largest] then largest ← l",
        "  if r < n and A[r] > A[largest] then largest ← r",
        "  if largest ≠ i then",
        "    swap(A[i], A[largest]); siftDown(A, largest, n)",
    ],
};

pub const BST_INSERT: Listing = Listing {
    id: "bst_insert",
    title: "BST Insert",
    lines: &[
        "procedure insert(node, value)",
        "  if node = null then",
        "    return new Node(value)",
        "  if value < node.value then",
        "    node.left ← insert(node.left, value)",
        "  else if value > node.value then",
        "    node.right ← insert(node.right, value)",
        "  return node",
    ],
};

pub const BST_DELETE: Listing = Listing {
    id: "bst_delete",
    title: "BST Delete",
    lines: &[
        "procedure delete(node, value)",
        "  if node = null then return null",
        "  if value < node.value then",
        "    node.left ← delete(node.left, value)",
        "  else if value > node.value then",
        "    node.right ← delete(node.right, value)",
        "  else",
        "    if node.left = null then return node.right",
        "    if node.right = null then return node.left",
        "    succ ← minimum(node.right)",
        "    node.value ← succ.value",
        "    node.right ← delete(node.right, succ.value)",
        "  return node",
    ],
};

pub const BST_SEARCH: Listing = Listing {
    id: "bst_search",
    title: "BST Search",
    lines: &[
        "procedure search(node, value)",
        "  if node = null then return not found",
        "  if value = node.value then return node",
        "  if value < node.value then",
        "    return search(node.left, value)",
        "  return search(node.right, value)",
    ],
};

pub const BST_TRAVERSAL: Listing = Listing {
    id: "bst_traversal",
    title: "Tree Traversals",
    lines: &[
        "procedure inOrder(node)",
        "  if node = null then return",
        "  inOrder(node.left)",
        "  visit(node)",
        "  inOrder(node.right)",
        "procedure preOrder(node)",
        "  if node = null then return",
        "  visit(node)",
        "  preOrder(node.left)",
        "  preOrder(node.right)",
        "procedure postOrder(node)",
        "  if node = null then return",
        "  postOrder(node.left)",
        "  postOrder(node.right)",
        "  visit(node)",
        "procedure levelOrder(root)",
        "  queue ← [root]",
        "  while queue is not empty",
        "    node ← dequeue(queue); visit(node)",
        "    enqueue the children of node",
    ],
};

pub const BINARY_HEAP: Listing = Listing {
    id: "binary_heap",
    title: "Binary Heap",
    lines: &[
        "procedure insert(H, value)",
        "  append value to H; i ← last index",
        "  while i > 0 and H[i] comes before H[parent(i)]",
        "    swap(H[i], H[parent(i)])",
        "    i ← parent(i)",
        "procedure extractRoot(H)",
        "  root ← H[0]",
        "  H[0] ← H[last]; remove last",
        "  siftDown(H, 0)",
        "  return root",
        "procedure siftDown(H, i)",
        "  best ← first of i, left(i), right(i) in heap order",
        "  if best ≠ i then swap(H[i], H[best]); siftDown(H, best)",
        "procedure heapify(H)",
        "  for i ← ⌊n / 2⌋ - 1 down to 0: siftDown(H, i)",
    ],
};

pub const TRIE: Listing = Listing {
    id: "trie",
    title: "Trie",
    lines: &[
        "procedure insert(word)",
        "  node ← root",
        "  for each ch in word",
        "    if ch ∉ node.children then",
        "      node.children[ch] ← new Node",
        "    node ← node.children[ch]",
        "  node.isEnd ← true",
        "procedure search(word)",
        "  node ← root",
        "  for each ch in word",
        "    if ch ∉ node.children then return false",
        "    node ← node.children[ch]",
        "  return node.isEnd",
        "procedure delete(node, word, depth)",
        "  if depth = length(word) then node.isEnd ← false",
        "  else delete(node.children[word[depth]], word, depth + 1)",
        "  if node has no children and not node.isEnd then",
        "    remove node from its parent",
    ],
};

pub const BFS: Listing = Listing {
    id: "bfs",
    title: "Breadth-First Search",
    lines: &[
        "procedure BFS(G, start)",
        "  visited ← {start}; queue ← [start]",
        "  while queue is not empty",
        "    node ← dequeue(queue)",
        "    visit(node)",
        "    for each neighbor of node",
        "      if neighbor ∉ visited then",
        "        visited ← visited ∪ {neighbor}",
        "        enqueue(queue, neighbor)",
    ],
};

pub const DFS: Listing = Listing {
    id: "dfs",
    title: "Depth-First Search",
    lines: &[
        "procedure DFS(G, start)",
        "  stack ← [start]",
        "  while stack is not empty",
        "    node ← pop(stack)",
        "    if node ∈ visited then continue",
        "    visit(node); visited ← visited ∪ {node}",
        "    for each neighbor of node in reverse order",
        "      if neighbor ∉ visited then push(stack, neighbor)",
    ],
};

pub const DIJKSTRA: Listing = Listing {
    id: "dijkstra",
    title: "Dijkstra's Shortest Path",
    lines: &[
        "procedure Dijkstra(G, source, target)",
        "  dist[v] ← ∞ for all v; dist[source] ← 0",
        "  queue ← {source}",
        "  while queue is not empty",
        "    u ← node in queue with smallest dist",
        "    if u is visited then continue",
        "    mark u visited",
        "    if u = target then break",
        "    for each edge (u, v, w)",
        "      if dist[u] + w < dist[v] then",
        "        dist[v] ← dist[u] + w; prev[v] ← u",
        "        add v to queue",
        "  follow prev from target back to source",
    ],
};

pub const SEGMENT_TREE: Listing = Listing {
    id: "segment_tree",
    title: "Segment Tree",
    lines: &[
        "procedure build(node, start, end)",
        "  if start = end then tree[node] ← A[start]; return",
        "  mid ← ⌊(start + end) / 2⌋",
        "  build(2·node + 1, start, mid)",
        "  build(2·node + 2, mid + 1, end)",
        "  tree[node] ← combine(tree[2·node + 1], tree[2·node + 2])",
        "procedure query(node, start, end, l, r)",
        "  if r < start or end < l then return identity",
        "  if l ≤ start and end ≤ r then return tree[node]",
        "  mid ← ⌊(start + end) / 2⌋",
        "  return combine(query(left, start, mid, l, r), query(right, mid + 1, end, l, r))",
        "procedure update(node, start, end, i, value)",
        "  if start = end then A[i] ← value; tree[node] ← value; return",
        "  mid ← ⌊(start + end) / 2⌋",
        "  if i ≤ mid then update(2·node + 1, start, mid, i, value)",
        "  else update(2·node + 2, mid + 1, end, i, value)",
        "  tree[node] ← combine(tree[2·node + 1], tree[2·node + 2])",
    ],
};

pub const KNAPSACK: Listing = Listing {
    id: "knapsack",
    title: "0/1 Knapsack",
    lines: &[
        "procedure knapsack(items, W)",
        "  dp[0][w] ← 0 for all w; dp[i][0] ← 0 for all i",
        "  for i ← 1 to n",
        "    for w ← 1 to W",
        "      if weight[i] ≤ w then",
        "        dp[i][w] ← max(dp[i-1][w], dp[i-1][w - weight[i]] + value[i])",
        "      else",
        "        dp[i][w] ← dp[i-1][w]",
        "  w ← W",
        "  for i ← n down to 1",
        "    if dp[i][w] ≠ dp[i-1][w] then take item i; w ← w - weight[i]",
    ],
};

pub const LCS: Listing = Listing {
    id: "lcs",
    title: "Longest Common Subsequence",
    lines: &[
        "procedure LCS(X, Y)",
        "  dp[i][0] ← 0; dp[0][j] ← 0",
        "  for i ← 1 to |X|",
        "    for j ← 1 to |Y|",
        "      if X[i] = Y[j] then",
        "        dp[i][j] ← dp[i-1][j-1] + 1",
        "      else",
        "        dp[i][j] ← max(dp[i-1][j], dp[i][j-1])",
        "  trace back from dp[|X|][|Y|]",
    ],
};

/// Every built-in listing.
pub const ALL: &[Listing] = &[
    BUBBLE_SORT,
    SELECTION_SORT,
    INSERTION_SORT,
    MERGE_SORT,
    QUICK_SORT,
    HEAP_SORT,
    BST_INSERT,
    BST_DELETE,
    BST_SEARCH,
    BST_TRAVERSAL,
    BINARY_HEAP,
    TRIE,
    BFS,
    DFS,
    DIJKSTRA,
    SEGMENT_TREE,
    KNAPSACK,
    LCS,
];

/// Look up a listing by id.
pub fn listing(id: &str) -> Option<&'static Listing> {
    ALL.iter().find(|l| l.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_are_unique() {
        let ids: HashSet<_> = ALL.iter().map(|l| l.id).collect();
        assert_eq!(ids.len(), ALL.len());
    }

    #[test]
    fn lines_are_one_based() {
        assert_eq!(BUBBLE_SORT.line(1), Some("procedure bubbleSort(A)"));
        assert_eq!(BUBBLE_SORT.line(0), None);
        assert_eq!(BUBBLE_SORT.line(9), None);
        assert_eq!(TRIE.len(), 18);
    }

    #[test]
    fn lookup_by_id() {
        assert_eq!(listing("dijkstra").map(|l| l.title), Some("Dijkstra's Shortest Path"));
        assert!(listing("bogo_sort").is_none());
    }
}
