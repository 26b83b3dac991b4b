//! Graph Laplacians.
//!
//! Everything here assumes a symmetric adapter (each undirected edge visible from both ends),
//! which is what `UndirectedGraph` provides.
//!
//! - Combinatorial: \(L = D - W\)
//! - Normalized: \(L = I - D^{-1/2} W D^{-1/2}\) on non-isolated nodes; isolated nodes get a
//!   zero row and column, so for both kinds the multiplicity of the eigenvalue 0 equals the
//!   number of connected components.

use nalgebra::DMatrix;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::graph::{UndirectedGraph, WeightedGraphRef};
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LaplacianKind {
    #[default]
    Combinatorial,
    Normalized,
}

fn degrees<G: WeightedGraphRef>(graph: &G) -> Vec<f64> {
    (0..graph.node_count())
        .map(|u| graph.weights_ref(u).iter().sum::<f64>())
        .collect()
}

/// `d^{-1/2}`, with 0 for isolated nodes.
fn inv_sqrt_degrees(deg: &[f64]) -> Vec<f64> {
    deg.iter()
        .map(|&d| if d > 0.0 { 1.0 / d.sqrt() } else { 0.0 })
        .collect()
}

pub(crate) fn check_signal(n: usize, x: &[f64]) -> Result<()> {
    if x.len() != n {
        return Err(Error::DimensionMismatch {
            expected: n,
            got: x.len(),
        });
    }
    if x.iter().any(|v| !v.is_finite()) {
        return Err(Error::NonFinite("signal"));
    }
    Ok(())
}

/// Dense Laplacian matrix.
pub fn laplacian_matrix<G: WeightedGraphRef>(graph: &G, kind: LaplacianKind) -> DMatrix<f64> {
    let n = graph.node_count();
    let deg = degrees(graph);
    let mut l = DMatrix::zeros(n, n);
    match kind {
        LaplacianKind::Combinatorial => {
            for u in 0..n {
                l[(u, u)] = deg[u];
                for (&v, &w) in graph.neighbors_ref(u).iter().zip(graph.weights_ref(u)) {
                    l[(u, v)] -= w;
                }
            }
        }
        LaplacianKind::Normalized => {
            let s = inv_sqrt_degrees(&deg);
            for u in 0..n {
                if deg[u] > 0.0 {
                    l[(u, u)] = 1.0;
                }
                for (&v, &w) in graph.neighbors_ref(u).iter().zip(graph.weights_ref(u)) {
                    l[(u, v)] -= s[u] * w * s[v];
                }
            }
        }
    }
    l
}

/// Matrix-free `y = L x`, O(nnz).
pub fn laplacian_apply<G: WeightedGraphRef>(
    graph: &G,
    kind: LaplacianKind,
    x: &[f64],
) -> Result<Vec<f64>> {
    check_signal(graph.node_count(), x)?;
    Ok(laplacian_apply_unchecked(graph, kind, x))
}

pub(crate) fn laplacian_apply_unchecked<G: WeightedGraphRef>(
    graph: &G,
    kind: LaplacianKind,
    x: &[f64],
) -> Vec<f64> {
    let n = graph.node_count();
    let mut y = vec![0.0; n];
    match kind {
        LaplacianKind::Combinatorial => {
            for u in 0..n {
                let mut acc = 0.0;
                for (&v, &w) in graph.neighbors_ref(u).iter().zip(graph.weights_ref(u)) {
                    acc += w * (x[u] - x[v]);
                }
                y[u] = acc;
            }
        }
        LaplacianKind::Normalized => {
            let deg = degrees(graph);
            let s = inv_sqrt_degrees(&deg);
            for u in 0..n {
                if deg[u] == 0.0 {
                    continue;
                }
                let mut acc = x[u];
                for (&v, &w) in graph.neighbors_ref(u).iter().zip(graph.weights_ref(u)) {
                    acc -= s[u] * w * s[v] * x[v];
                }
                y[u] = acc;
            }
        }
    }
    y
}

/// Dirichlet energy \(x^\top L x = \sum_{\{u,v\}} w_{uv} (x_u - x_v)^2\) of the combinatorial
/// Laplacian. Always \(\ge 0\).
pub fn quadratic_form(graph: &UndirectedGraph, x: &[f64]) -> Result<f64> {
    check_signal(graph.node_count(), x)?;
    Ok(graph
        .edges()
        .map(|(u, v, w)| w * (x[u] - x[v]).powi(2))
        .sum())
}

/// Edge gradient: one entry per edge of `graph.edges()`, \(\sqrt{w_{uv}}\,(x_v - x_u)\).
///
/// `gradient(x)` squared and summed equals `quadratic_form(x)`.
pub fn gradient(graph: &UndirectedGraph, x: &[f64]) -> Result<Vec<f64>> {
    check_signal(graph.node_count(), x)?;
    Ok(graph
        .edges()
        .map(|(u, v, w)| w.sqrt() * (x[v] - x[u]))
        .collect())
}

/// Gershgorin upper bound on the largest Laplacian eigenvalue.
pub fn lambda_max_upper_bound<G: WeightedGraphRef>(graph: &G, kind: LaplacianKind) -> f64 {
    match kind {
        LaplacianKind::Combinatorial => 2.0 * degrees(graph).into_iter().fold(0.0, f64::max),
        LaplacianKind::Normalized => 2.0,
    }
}

#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PowerIterationConfig {
    pub max_iterations: usize,
    /// Relative change in the Rayleigh quotient below which iteration stops.
    pub tolerance: f64,
    /// Seed for the random start vector.
    pub seed: u64,
}

impl Default for PowerIterationConfig {
    fn default() -> Self {
        Self {
            max_iterations: 500,
            tolerance: 1e-8,
            seed: 0,
        }
    }
}

impl PowerIterationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 {
            return Err(Error::InvalidParameter(
                "max_iterations must be > 0".to_string(),
            ));
        }
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(Error::InvalidParameter(
                "tolerance must be finite and > 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Largest-eigenvalue estimate with convergence reporting.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LambdaMaxEstimate {
    pub value: f64,
    pub iterations: usize,
    pub converged: bool,
}

/// Power iteration on `L`.
///
/// `value` is a Rayleigh quotient, so it never exceeds the true \(\lambda_{max}\).
pub fn estimate_lambda_max<G: WeightedGraphRef>(
    graph: &G,
    kind: LaplacianKind,
    config: PowerIterationConfig,
) -> Result<LambdaMaxEstimate> {
    config.validate()?;
    let n = graph.node_count();
    if n == 0 {
        return Ok(LambdaMaxEstimate {
            value: 0.0,
            iterations: 0,
            converged: true,
        });
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut x: Vec<f64> = (0..n).map(|_| rng.gen::<f64>() - 0.5).collect();
    normalize(&mut x);

    let mut lambda = 0.0_f64;
    let mut iterations = 0usize;
    let mut converged = false;
    for _ in 0..config.max_iterations {
        iterations += 1;
        let y = laplacian_apply_unchecked(graph, kind, &x);
        let next: f64 = x.iter().zip(&y).map(|(a, b)| a * b).sum();
        let norm = y.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm == 0.0 {
            // x landed in the null space: no edges at all.
            lambda = 0.0;
            converged = true;
            break;
        }
        x = y.into_iter().map(|v| v / norm).collect();
        let delta = (next - lambda).abs();
        lambda = next;
        if delta <= config.tolerance * lambda.abs().max(1.0) {
            converged = true;
            break;
        }
    }

    if !converged {
        tracing::warn!(
            iterations,
            estimate = lambda,
            "power iteration for lambda_max did not converge"
        );
    }
    Ok(LambdaMaxEstimate {
        value: lambda.max(0.0),
        iterations,
        converged,
    })
}

fn normalize(x: &mut [f64]) {
    let norm = x.iter().map(|v| v * v).sum::<f64>().sqrt();
    if norm > 0.0 {
        x.iter_mut().for_each(|v| *v /= norm);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::{complete, path, ring};
    use proptest::prelude::*;

    #[test]
    fn combinatorial_rows_sum_to_zero() {
        let g = UndirectedGraph::from_edges(3, &[(0, 1, 2.0), (1, 2, 1.0)]).unwrap();
        let l = laplacian_matrix(&g, LaplacianKind::Combinatorial);
        assert_eq!(l[(1, 1)], 3.0);
        assert_eq!(l[(0, 1)], -2.0);
        for i in 0..3 {
            let s: f64 = l.row(i).iter().sum();
            assert!(s.abs() < 1e-12);
        }
    }

    #[test]
    fn normalized_has_unit_diagonal_except_isolated() {
        let mut g = path(3).unwrap();
        g.add_node();
        let l = laplacian_matrix(&g, LaplacianKind::Normalized);
        assert_eq!(l[(0, 0)], 1.0);
        assert_eq!(l[(3, 3)], 0.0);
        assert!((l[(0, 1)] + 1.0 / 2f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn apply_matches_dense_product() {
        let g = UndirectedGraph::from_edges(
            4,
            &[(0, 1, 1.0), (1, 2, 0.5), (2, 3, 2.0), (0, 3, 1.5)],
        )
        .unwrap();
        let x = [1.0, -2.0, 0.5, 3.0];
        for kind in [LaplacianKind::Combinatorial, LaplacianKind::Normalized] {
            let dense = laplacian_matrix(&g, kind) * nalgebra::DVector::from_column_slice(&x);
            let sparse = laplacian_apply(&g, kind, &x).unwrap();
            for (a, b) in dense.iter().zip(&sparse) {
                assert!((a - b).abs() < 1e-12, "{kind:?}: {a} vs {b}");
            }
        }
    }

    #[test]
    fn apply_rejects_wrong_length() {
        let g = path(3).unwrap();
        let err = laplacian_apply(&g, LaplacianKind::Combinatorial, &[1.0]).unwrap_err();
        assert!(matches!(
            err,
            Error::DimensionMismatch {
                expected: 3,
                got: 1
            }
        ));
    }

    #[test]
    fn lambda_max_of_complete_graph() {
        // K_n: combinatorial spectrum {0, n, ..., n}.
        let g = complete(6).unwrap();
        let est =
            estimate_lambda_max(&g, LaplacianKind::Combinatorial, PowerIterationConfig::default())
                .unwrap();
        assert!(est.converged);
        assert!((est.value - 6.0).abs() < 1e-6, "value={}", est.value);
        assert!(est.value <= lambda_max_upper_bound(&g, LaplacianKind::Combinatorial) + 1e-12);
    }

    #[test]
    fn lambda_max_of_edgeless_graph_is_zero() {
        let g = UndirectedGraph::new(4);
        let est =
            estimate_lambda_max(&g, LaplacianKind::Normalized, PowerIterationConfig::default())
                .unwrap();
        assert_eq!(est.value, 0.0);
        assert!(est.converged);
    }

    #[test]
    fn gradient_energy_matches_quadratic_form() {
        let g = ring(5).unwrap();
        let x = [0.3, -1.0, 2.0, 0.0, 1.5];
        let grad = gradient(&g, &x).unwrap();
        assert_eq!(grad.len(), g.edge_count());
        let energy: f64 = grad.iter().map(|v| v * v).sum();
        let q = quadratic_form(&g, &x).unwrap();
        assert!((energy - q).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn prop_quadratic_form_matches_dense_and_is_nonnegative(
            n in 2usize..8,
            edges in proptest::collection::vec((0usize..8, 0usize..8, 0.1f64..5.0), 0..20),
            xs in proptest::collection::vec(-10.0f64..10.0, 8),
        ) {
            let mut g = UndirectedGraph::new(n);
            for (u, v, w) in edges {
                if u < n && v < n && u != v {
                    g.add_edge(u, v, w).unwrap();
                }
            }
            let x = &xs[..n];
            let q = quadratic_form(&g, x).unwrap();
            prop_assert!(q >= 0.0);
            let lx = laplacian_apply(&g, LaplacianKind::Combinatorial, x).unwrap();
            let dense_q: f64 = x.iter().zip(&lx).map(|(a, b)| a * b).sum();
            prop_assert!((q - dense_q).abs() <= 1e-8 * q.max(1.0), "q={} dense={}", q, dense_q);
        }
    }
}
