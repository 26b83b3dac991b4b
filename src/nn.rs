//! Neighborhood graphs over point clouds.
//!
//! Edge weights use the Gaussian kernel \(w_{ij} = \exp(-d_{ij}^2 / \sigma)\) on Euclidean
//! distance. Weights that underflow to zero are not inserted.
//!
//! Neighbor search is brute force, O(n² · dim). With the `parallel` feature the per-point
//! search runs on rayon; the output is identical to the serial path.

use crate::graph::UndirectedGraph;
use crate::{Error, Result};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KnnConfig {
    /// Neighbors per point (before symmetrization).
    pub k: usize,
    /// Kernel width. `None` uses the mean squared distance to the k nearest neighbors.
    pub sigma: Option<f64>,
}

impl Default for KnnConfig {
    fn default() -> Self {
        Self { k: 10, sigma: None }
    }
}

impl KnnConfig {
    pub fn validate(&self) -> Result<()> {
        if self.k == 0 {
            return Err(Error::InvalidParameter("k must be > 0".to_string()));
        }
        validate_sigma(self.sigma)
    }
}

#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RadiusConfig {
    pub radius: f64,
    /// Kernel width. `None` uses the mean squared length of the admitted edges.
    pub sigma: Option<f64>,
}

impl RadiusConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(Error::InvalidParameter(
                "radius must be finite and > 0".to_string(),
            ));
        }
        validate_sigma(self.sigma)
    }
}

fn validate_sigma(sigma: Option<f64>) -> Result<()> {
    match sigma {
        Some(s) if !s.is_finite() || s <= 0.0 => Err(Error::InvalidParameter(
            "sigma must be finite and > 0".to_string(),
        )),
        _ => Ok(()),
    }
}

/// Returns the shared dimension.
fn validate_points(points: &[Vec<f64>]) -> Result<usize> {
    let dim = points.first().map_or(0, Vec::len);
    for p in points {
        if p.len() != dim {
            return Err(Error::DimensionMismatch {
                expected: dim,
                got: p.len(),
            });
        }
        if p.iter().any(|x| !x.is_finite()) {
            return Err(Error::NonFinite("point coordinates"));
        }
    }
    Ok(dim)
}

fn sq_dist(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum()
}

/// The `k` nearest other points of `points[i]`, as `(index, squared distance)`.
///
/// Ties are broken by index so the result does not depend on scheduling.
fn nearest(points: &[Vec<f64>], i: usize, k: usize) -> Vec<(usize, f64)> {
    let mut cand: Vec<(usize, f64)> = points
        .iter()
        .enumerate()
        .filter(|&(j, _)| j != i)
        .map(|(j, p)| (j, sq_dist(&points[i], p)))
        .collect();
    cand.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
    cand.truncate(k);
    cand
}

fn all_nearest(points: &[Vec<f64>], k: usize) -> Vec<Vec<(usize, f64)>> {
    #[cfg(feature = "parallel")]
    {
        (0..points.len())
            .into_par_iter()
            .map(|i| nearest(points, i, k))
            .collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        (0..points.len()).map(|i| nearest(points, i, k)).collect()
    }
}

fn mean(xs: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = xs.fold((0.0, 0usize), |(s, c), x| (s + x, c + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Resolve the kernel width; a degenerate (all-zero) default falls back to 1.
fn kernel_width(sigma: Option<f64>, sq_dists: impl Iterator<Item = f64>) -> f64 {
    sigma.unwrap_or_else(|| match mean(sq_dists) {
        Some(m) if m > 0.0 => m,
        _ => 1.0,
    })
}

/// k-nearest-neighbor graph, symmetrized by union: `{i, j}` is an edge if either point is
/// among the other's `k` nearest. Every node ends up with degree `>= k` (barring weight
/// underflow).
pub fn knn_graph(points: &[Vec<f64>], config: KnnConfig) -> Result<UndirectedGraph> {
    config.validate()?;
    let n = points.len();
    if config.k >= n {
        return Err(Error::InvalidParameter(format!(
            "k must be < number of points (k={} n={n})",
            config.k
        )));
    }
    let dim = validate_points(points)?;

    let neighbors = all_nearest(points, config.k);
    let sigma = kernel_width(
        config.sigma,
        neighbors.iter().flatten().map(|&(_, d2)| d2),
    );

    let mut g = UndirectedGraph::new(n);
    for (i, list) in neighbors.iter().enumerate() {
        for &(j, d2) in list {
            let w = (-d2 / sigma).exp();
            if w > 0.0 {
                g.add_edge(i, j, w)?;
            }
        }
    }
    tracing::debug!(
        n,
        dim,
        k = config.k,
        sigma,
        edges = g.edge_count(),
        "built knn graph"
    );
    Ok(g)
}

/// Radius graph: `{i, j}` is an edge when `‖p_i - p_j‖ <= radius`.
pub fn radius_graph(points: &[Vec<f64>], config: RadiusConfig) -> Result<UndirectedGraph> {
    config.validate()?;
    let dim = validate_points(points)?;
    let n = points.len();
    let r2 = config.radius * config.radius;

    let mut pairs = Vec::new();
    for i in 0..n {
        for j in (i + 1)..n {
            let d2 = sq_dist(&points[i], &points[j]);
            if d2 <= r2 {
                pairs.push((i, j, d2));
            }
        }
    }
    let sigma = kernel_width(config.sigma, pairs.iter().map(|&(_, _, d2)| d2));

    let mut g = UndirectedGraph::new(n);
    for (i, j, d2) in pairs {
        let w = (-d2 / sigma).exp();
        if w > 0.0 {
            g.add_edge(i, j, w)?;
        }
    }
    tracing::debug!(
        n,
        dim,
        radius = config.radius,
        sigma,
        edges = g.edge_count(),
        "built radius graph"
    );
    Ok(g)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifold::sample_unit_cube;

    fn line_points() -> Vec<Vec<f64>> {
        (0..5).map(|i| vec![i as f64]).collect()
    }

    #[test]
    fn knn_on_a_line_links_adjacent_points() {
        let g = knn_graph(
            &line_points(),
            KnnConfig {
                k: 1,
                sigma: Some(1.0),
            },
        )
        .unwrap();
        assert_eq!(g.edge_count(), 4);
        assert!((g.edge_weight(0, 1).unwrap() - (-1.0f64).exp()).abs() < 1e-12);
        assert!(!g.has_edge(0, 2));
    }

    #[test]
    fn knn_degrees_are_at_least_k() {
        let pts = sample_unit_cube(60, 2, 11).unwrap();
        let g = knn_graph(&pts, KnnConfig { k: 5, sigma: None }).unwrap();
        assert!((0..60).all(|u| g.degree(u) >= 5));
        let w = g.to_dense();
        assert_eq!(w, w.transpose());
    }

    #[test]
    fn knn_rejects_bad_input() {
        let pts = line_points();
        assert!(knn_graph(&pts, KnnConfig { k: 5, sigma: None }).is_err());
        assert!(knn_graph(&pts, KnnConfig { k: 0, sigma: None }).is_err());
        assert!(knn_graph(
            &pts,
            KnnConfig {
                k: 1,
                sigma: Some(0.0)
            }
        )
        .is_err());
        let ragged = vec![vec![0.0, 1.0], vec![1.0]];
        assert!(matches!(
            knn_graph(&ragged, KnnConfig { k: 1, sigma: None }),
            Err(Error::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn radius_graph_respects_radius() {
        let g = radius_graph(
            &line_points(),
            RadiusConfig {
                radius: 2.0,
                sigma: None,
            },
        )
        .unwrap();
        // distance 1 pairs (4) and distance 2 pairs (3)
        assert_eq!(g.edge_count(), 7);
        assert!(g.has_edge(0, 2));
        assert!(!g.has_edge(0, 3));
        // sigma = mean(1,1,1,1,4,4,4) = 16/7
        let expected = (-7.0f64 / 16.0).exp();
        assert!((g.edge_weight(1, 2).unwrap() - expected).abs() < 1e-12);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn parallel_search_matches_serial() {
        let pts = sample_unit_cube(120, 3, 4).unwrap();
        let serial: Vec<_> = (0..pts.len()).map(|i| nearest(&pts, i, 7)).collect();
        assert_eq!(all_nearest(&pts, 7), serial);
    }
}
