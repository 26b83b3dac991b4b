//! Graph adapters and the undirected weighted graph used by the signal operators.
//!
//! Two adapter families:
//! - `Graph` / `WeightedGraph`: owned neighbor lists, easy to implement for foreign types
//!   (dense matrices, `petgraph` graphs).
//! - `GraphRef` / `WeightedGraphRef`: borrowed neighbor slices, used on hot paths
//!   (Laplacian application, Chebyshev recurrences) to avoid per-step allocations.
//!
//! `UndirectedGraph` implements all four.

use nalgebra::DMatrix;

use crate::{Error, Result};

/// Minimal graph adapter: node ids are `0..node_count()`.
pub trait Graph {
    fn node_count(&self) -> usize;
    fn neighbors(&self, node: usize) -> Vec<usize>;

    fn out_degree(&self, node: usize) -> usize {
        self.neighbors(node).len()
    }
}

/// A `Graph` whose edges carry a scalar weight.
///
/// `edge_weight(u, v)` is only meaningful when `v` appears in `neighbors(u)`.
pub trait WeightedGraph: Graph {
    fn edge_weight(&self, source: usize, target: usize) -> f64;
}

/// Borrowed-slice adapter.
pub trait GraphRef {
    fn node_count(&self) -> usize;
    fn neighbors_ref(&self, node: usize) -> &[usize];
}

/// Borrowed-slice weighted adapter.
///
/// `weights_ref(u)[i]` is the weight of the edge to `neighbors_ref(u)[i]`.
pub trait WeightedGraphRef: GraphRef {
    fn weights_ref(&self, node: usize) -> &[f64];
}

/// Dense row-major adjacency matrix; a non-zero entry `adj[u][v]` is an edge `u -> v`.
#[derive(Debug, Clone, Copy)]
pub struct AdjacencyMatrix<'a>(pub &'a [Vec<f64>]);

impl Graph for AdjacencyMatrix<'_> {
    fn node_count(&self) -> usize {
        self.0.len()
    }

    fn neighbors(&self, node: usize) -> Vec<usize> {
        self.0[node]
            .iter()
            .enumerate()
            .filter(|(_, &w)| w != 0.0)
            .map(|(v, _)| v)
            .collect()
    }
}

impl WeightedGraph for AdjacencyMatrix<'_> {
    fn edge_weight(&self, source: usize, target: usize) -> f64 {
        self.0[source][target]
    }
}

/// Undirected graph with finite, non-negative edge weights and no self loops.
///
/// Every edge `{u, v}` is stored in both adjacency lists with the same weight.
///
/// With the `serde` feature, graphs (de)serialize as a node count plus an edge list, and
/// deserialization goes through [`UndirectedGraph::from_edges`].
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "EdgeList", into = "EdgeList")
)]
pub struct UndirectedGraph {
    neighbors: Vec<Vec<usize>>,
    weights: Vec<Vec<f64>>,
}

#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize)]
struct EdgeList {
    nodes: usize,
    edges: Vec<(usize, usize, f64)>,
}

#[cfg(feature = "serde")]
impl TryFrom<EdgeList> for UndirectedGraph {
    type Error = Error;

    fn try_from(raw: EdgeList) -> Result<Self> {
        Self::from_edges(raw.nodes, &raw.edges)
    }
}

#[cfg(feature = "serde")]
impl From<UndirectedGraph> for EdgeList {
    fn from(g: UndirectedGraph) -> Self {
        Self {
            nodes: g.node_count(),
            edges: g.edges().collect(),
        }
    }
}

impl UndirectedGraph {
    /// Graph with `n` isolated nodes.
    pub fn new(n: usize) -> Self {
        Self {
            neighbors: vec![Vec::new(); n],
            weights: vec![Vec::new(); n],
        }
    }

    /// Build from an undirected edge list. Repeated edges keep the last weight.
    pub fn from_edges(n: usize, edges: &[(usize, usize, f64)]) -> Result<Self> {
        let mut g = Self::new(n);
        for &(u, v, w) in edges {
            g.add_edge(u, v, w)?;
        }
        Ok(g)
    }

    /// Build from a dense weight matrix.
    ///
    /// The matrix must be square, symmetric (exactly), finite, non-negative, with a zero
    /// diagonal.
    pub fn from_dense(w: &DMatrix<f64>) -> Result<Self> {
        let n = w.nrows();
        if w.ncols() != n {
            return Err(Error::NotSquare {
                rows: n,
                cols: w.ncols(),
            });
        }
        let mut g = Self::new(n);
        for i in 0..n {
            if !w[(i, i)].is_finite() {
                return Err(Error::NonFinite("weight matrix"));
            }
            if w[(i, i)] != 0.0 {
                return Err(Error::InvalidParameter(format!(
                    "weight matrix diagonal must be zero (w[{i},{i}]={})",
                    w[(i, i)]
                )));
            }
            for j in (i + 1)..n {
                let (a, b) = (w[(i, j)], w[(j, i)]);
                if !a.is_finite() || !b.is_finite() {
                    return Err(Error::NonFinite("weight matrix"));
                }
                if a != b {
                    return Err(Error::NotSymmetric {
                        row: i,
                        col: j,
                        gap: (a - b).abs(),
                    });
                }
                if a > 0.0 {
                    g.add_edge(i, j, a)?;
                } else if a < 0.0 {
                    return Err(Error::InvalidParameter(
                        "edge weights must be non-negative".to_string(),
                    ));
                }
            }
        }
        Ok(g)
    }

    /// Import any weighted adapter, symmetrizing by the larger of `w(u,v)` and `w(v,u)`.
    ///
    /// Self loops and non-positive or non-finite weights are dropped.
    pub fn from_adapter<G: WeightedGraph>(graph: &G) -> Self {
        let n = graph.node_count();
        let mut g = Self::new(n);
        for u in 0..n {
            for v in graph.neighbors(u) {
                if v >= n || v == u {
                    continue;
                }
                let w = graph.edge_weight(u, v);
                if !w.is_finite() || w <= 0.0 {
                    continue;
                }
                let w = g.edge_weight(u, v).map_or(w, |old| old.max(w));
                g.insert_or_update(u, v, w);
            }
        }
        g
    }

    pub fn node_count(&self) -> usize {
        self.neighbors.len()
    }

    /// Number of undirected edges.
    pub fn edge_count(&self) -> usize {
        self.neighbors.iter().map(Vec::len).sum::<usize>() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }

    /// Append an isolated node and return its id.
    pub fn add_node(&mut self) -> usize {
        self.neighbors.push(Vec::new());
        self.weights.push(Vec::new());
        self.neighbors.len() - 1
    }

    /// Remove `node` and its incident edges. Ids above `node` shift down by one.
    pub fn remove_node(&mut self, node: usize) -> Result<()> {
        self.check_node(node)?;
        let incident = std::mem::take(&mut self.neighbors[node]);
        for &v in &incident {
            self.detach(v, node);
        }
        self.neighbors.remove(node);
        self.weights.remove(node);
        for list in &mut self.neighbors {
            for v in list.iter_mut() {
                if *v > node {
                    *v -= 1;
                }
            }
        }
        Ok(())
    }

    /// Insert edge `{u, v}` or overwrite its weight. A zero weight removes the edge.
    pub fn add_edge(&mut self, u: usize, v: usize, weight: f64) -> Result<()> {
        self.check_node(u)?;
        self.check_node(v)?;
        if u == v {
            return Err(Error::InvalidParameter(format!(
                "self loops are not allowed (node {u})"
            )));
        }
        if !weight.is_finite() {
            return Err(Error::InvalidParameter(
                "edge weights must be finite".to_string(),
            ));
        }
        if weight < 0.0 {
            return Err(Error::InvalidParameter(
                "edge weights must be non-negative".to_string(),
            ));
        }
        if weight == 0.0 {
            self.remove_edge(u, v)?;
        } else {
            self.insert_or_update(u, v, weight);
        }
        Ok(())
    }

    /// `u`, `v` in range, distinct, and `weight` finite and positive.
    fn insert_or_update(&mut self, u: usize, v: usize, weight: f64) {
        match self.position(u, v) {
            Some(i) => {
                self.weights[u][i] = weight;
                if let Some(j) = self.position(v, u) {
                    self.weights[v][j] = weight;
                }
            }
            None => {
                self.neighbors[u].push(v);
                self.weights[u].push(weight);
                self.neighbors[v].push(u);
                self.weights[v].push(weight);
            }
        }
    }

    /// Remove edge `{u, v}`. Returns whether it existed.
    pub fn remove_edge(&mut self, u: usize, v: usize) -> Result<bool> {
        self.check_node(u)?;
        self.check_node(v)?;
        if self.position(u, v).is_none() {
            return Ok(false);
        }
        self.detach(u, v);
        self.detach(v, u);
        Ok(true)
    }

    pub fn has_edge(&self, u: usize, v: usize) -> bool {
        u < self.node_count() && self.position(u, v).is_some()
    }

    pub fn edge_weight(&self, u: usize, v: usize) -> Option<f64> {
        if u >= self.node_count() {
            return None;
        }
        self.position(u, v).map(|i| self.weights[u][i])
    }

    /// Number of incident edges.
    pub fn degree(&self, node: usize) -> usize {
        self.neighbors[node].len()
    }

    /// Sum of incident edge weights, `d_u = Σ_v w(u,v)`.
    pub fn weighted_degree(&self, node: usize) -> f64 {
        self.weights[node].iter().sum()
    }

    pub fn weighted_degrees(&self) -> Vec<f64> {
        (0..self.node_count())
            .map(|u| self.weighted_degree(u))
            .collect()
    }

    /// Each undirected edge once, as `(u, v, w)` with `u < v`, ordered by `u`.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.neighbors.iter().enumerate().flat_map(move |(u, list)| {
            list.iter()
                .zip(self.weights[u].iter())
                .filter(move |(&v, _)| u < v)
                .map(move |(&v, &w)| (u, v, w))
        })
    }

    /// Dense symmetric weight matrix `W`.
    pub fn to_dense(&self) -> DMatrix<f64> {
        let n = self.node_count();
        let mut w = DMatrix::zeros(n, n);
        for (u, v, weight) in self.edges() {
            w[(u, v)] = weight;
            w[(v, u)] = weight;
        }
        w
    }

    fn check_node(&self, node: usize) -> Result<()> {
        if node >= self.node_count() {
            return Err(Error::IndexOutOfBounds(node));
        }
        Ok(())
    }

    fn position(&self, u: usize, v: usize) -> Option<usize> {
        self.neighbors[u].iter().position(|&x| x == v)
    }

    /// Drop `v` from `u`'s lists (one direction only).
    fn detach(&mut self, u: usize, v: usize) {
        if let Some(i) = self.position(u, v) {
            self.neighbors[u].swap_remove(i);
            self.weights[u].swap_remove(i);
        }
    }
}

impl Graph for UndirectedGraph {
    fn node_count(&self) -> usize {
        self.neighbors.len()
    }

    fn neighbors(&self, node: usize) -> Vec<usize> {
        self.neighbors[node].clone()
    }

    fn out_degree(&self, node: usize) -> usize {
        self.neighbors[node].len()
    }
}

impl WeightedGraph for UndirectedGraph {
    fn edge_weight(&self, source: usize, target: usize) -> f64 {
        UndirectedGraph::edge_weight(self, source, target).unwrap_or(0.0)
    }
}

impl GraphRef for UndirectedGraph {
    fn node_count(&self) -> usize {
        self.neighbors.len()
    }

    fn neighbors_ref(&self, node: usize) -> &[usize] {
        &self.neighbors[node]
    }
}

impl WeightedGraphRef for UndirectedGraph {
    fn weights_ref(&self, node: usize) -> &[f64] {
        &self.weights[node]
    }
}

#[cfg(feature = "petgraph")]
mod petgraph_impls {
    use super::{Graph, WeightedGraph};
    use petgraph::graph::{IndexType, NodeIndex};
    use petgraph::EdgeType;

    impl<N, Ty: EdgeType, Ix: IndexType> Graph for petgraph::Graph<N, f64, Ty, Ix> {
        fn node_count(&self) -> usize {
            petgraph::Graph::node_count(self)
        }

        fn neighbors(&self, node: usize) -> Vec<usize> {
            petgraph::Graph::neighbors(self, NodeIndex::new(node))
                .map(|n| n.index())
                .collect()
        }
    }

    impl<N, Ty: EdgeType, Ix: IndexType> WeightedGraph for petgraph::Graph<N, f64, Ty, Ix> {
        fn edge_weight(&self, source: usize, target: usize) -> f64 {
            self.find_edge(NodeIndex::new(source), NodeIndex::new(target))
                .map_or(0.0, |e| self[e])
        }
    }
}
