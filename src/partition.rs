//! Connected components.
//!
//! Invariants:
//! - Output length equals `graph.node_count()`.
//! - Labels are contiguous in `0..k`, numbered in order of each component's smallest node id.

use crate::graph::GraphRef;

/// Disjoint-set forest with path halving and union by size.
struct Forest {
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl Forest {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            size: vec![1; n],
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    /// Returns whether two distinct sets were merged.
    fn union(&mut self, a: usize, b: usize) -> bool {
        let (mut a, mut b) = (self.find(a), self.find(b));
        if a == b {
            return false;
        }
        if self.size[a] < self.size[b] {
            std::mem::swap(&mut a, &mut b);
        }
        self.parent[b] = a;
        self.size[a] += self.size[b];
        true
    }
}

/// Merge every edge; returns the forest and the number of sets left.
fn merge_edges<G: GraphRef>(graph: &G) -> (Forest, usize) {
    let n = graph.node_count();
    let mut forest = Forest::new(n);
    let mut count = n;
    for u in 0..n {
        for &v in graph.neighbors_ref(u) {
            if v < n && forest.union(u, v) {
                count -= 1;
            }
        }
    }
    (forest, count)
}

/// Component label of every node.
///
/// Edges are treated as undirected, so a directed adapter yields its weakly connected
/// components.
pub fn connected_components<G: GraphRef>(graph: &G) -> Vec<usize> {
    let (mut forest, count) = merge_edges(graph);
    let n = graph.node_count();
    let mut label_of_root = vec![usize::MAX; n];
    let mut labels = Vec::with_capacity(n);
    let mut next = 0usize;
    for u in 0..n {
        let root = forest.find(u);
        if label_of_root[root] == usize::MAX {
            label_of_root[root] = next;
            next += 1;
        }
        labels.push(label_of_root[root]);
    }
    debug_assert_eq!(next, count);
    labels
}

/// Number of connected components (isolated nodes count as one each).
pub fn component_count<G: GraphRef>(graph: &G) -> usize {
    merge_edges(graph).1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::UndirectedGraph;

    #[test]
    fn two_components_and_an_isolated_node() {
        // 0-1-2, 3-4, 5
        let g = UndirectedGraph::from_edges(6, &[(0, 1, 1.0), (1, 2, 1.0), (3, 4, 1.0)]).unwrap();
        let labels = connected_components(&g);
        assert_eq!(labels, vec![0, 0, 0, 1, 1, 2]);
        assert_eq!(component_count(&g), 3);
    }

    #[test]
    fn empty_graph_has_no_components() {
        let g = UndirectedGraph::new(0);
        assert!(connected_components(&g).is_empty());
        assert_eq!(component_count(&g), 0);
    }

    #[test]
    fn labels_follow_smallest_member() {
        // 4-0, 3-1, 2 alone
        let g = UndirectedGraph::from_edges(5, &[(4, 0, 1.0), (3, 1, 2.0)]).unwrap();
        assert_eq!(connected_components(&g), vec![0, 1, 2, 1, 0]);
        assert_eq!(component_count(&g), 3);
    }

    #[test]
    fn count_agrees_with_labels_on_random_graphs() {
        for seed in 0..5 {
            let g = crate::generators::erdos_renyi(40, 0.04, seed).unwrap();
            let labels = connected_components(&g);
            let distinct = labels.iter().max().map_or(0, |k| k + 1);
            assert_eq!(component_count(&g), distinct);
        }
    }
}
