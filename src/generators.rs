//! Graph generators.
//!
//! Random models take an explicit seed and are deterministic given `(parameters, seed)`.
//! All generated edges have weight `1.0`.

use std::collections::HashSet;

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::graph::UndirectedGraph;
use crate::{Error, Result};

/// Erdős–Rényi \(G(n, p)\): every unordered pair is an edge independently with probability `p`.
pub fn erdos_renyi(n: usize, p: f64, seed: u64) -> Result<UndirectedGraph> {
    if !p.is_finite() || !(0.0..=1.0).contains(&p) {
        return Err(Error::InvalidParameter("p must be in [0,1]".to_string()));
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let mut g = UndirectedGraph::new(n);
    for u in 0..n {
        for v in (u + 1)..n {
            if rng.gen::<f64>() < p {
                g.add_edge(u, v, 1.0)?;
            }
        }
    }
    tracing::debug!(n, p, edges = g.edge_count(), "generated erdos-renyi graph");
    Ok(g)
}

/// Barabási–Albert preferential attachment.
///
/// Starts from a star on `m + 1` nodes; each further node attaches to `m` distinct existing
/// nodes chosen with probability proportional to their degree. The result has
/// `m + (n - m - 1) * m` edges.
pub fn barabasi_albert(n: usize, m: usize, seed: u64) -> Result<UndirectedGraph> {
    if m == 0 || m >= n {
        return Err(Error::InvalidParameter(format!(
            "barabasi_albert requires 1 <= m < n (m={m} n={n})"
        )));
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let mut g = UndirectedGraph::new(n);

    // Each node appears once per incident edge, so uniform sampling is degree-proportional.
    let mut repeated: Vec<usize> = Vec::with_capacity(2 * m * n);
    for leaf in 1..=m {
        g.add_edge(0, leaf, 1.0)?;
        repeated.extend([0, leaf]);
    }

    let mut targets: HashSet<usize> = HashSet::with_capacity(m);
    for source in (m + 1)..n {
        targets.clear();
        while targets.len() < m {
            targets.insert(repeated[rng.gen_range(0..repeated.len())]);
        }
        // HashSet order is not deterministic; sort before touching the graph.
        let mut chosen: Vec<usize> = targets.iter().copied().collect();
        chosen.sort_unstable();
        for &t in &chosen {
            g.add_edge(source, t, 1.0)?;
            repeated.extend([source, t]);
        }
    }
    tracing::debug!(n, m, edges = g.edge_count(), "generated barabasi-albert graph");
    Ok(g)
}

/// Watts–Strogatz small-world graph.
///
/// Ring lattice where each node links to its `k / 2` nearest neighbors on either side; then
/// each lattice edge `(u, u + j)` is rewired with probability `beta` to `(u, w)` for a uniformly
/// chosen `w` that is neither `u` nor already adjacent to it. The edge count `n * k / 2` is
/// preserved.
pub fn watts_strogatz(n: usize, k: usize, beta: f64, seed: u64) -> Result<UndirectedGraph> {
    if k < 2 || k % 2 != 0 || k >= n {
        return Err(Error::InvalidParameter(format!(
            "watts_strogatz requires even k with 2 <= k < n (k={k} n={n})"
        )));
    }
    if !beta.is_finite() || !(0.0..=1.0).contains(&beta) {
        return Err(Error::InvalidParameter("beta must be in [0,1]".to_string()));
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let mut g = UndirectedGraph::new(n);
    let half = k / 2;
    for j in 1..=half {
        for u in 0..n {
            g.add_edge(u, (u + j) % n, 1.0)?;
        }
    }

    let mut rewired = 0usize;
    for j in 1..=half {
        for u in 0..n {
            if rng.gen::<f64>() >= beta {
                continue;
            }
            let v = (u + j) % n;
            if !g.has_edge(u, v) || g.degree(u) >= n - 1 {
                continue;
            }
            let w = loop {
                let w = rng.gen_range(0..n);
                if w != u && !g.has_edge(u, w) {
                    break w;
                }
            };
            g.remove_edge(u, v)?;
            g.add_edge(u, w, 1.0)?;
            rewired += 1;
        }
    }
    tracing::debug!(n, k, beta, rewired, "generated watts-strogatz graph");
    Ok(g)
}

/// Path `0 - 1 - ... - (n-1)`.
pub fn path(n: usize) -> Result<UndirectedGraph> {
    let mut g = UndirectedGraph::new(n);
    for u in 1..n {
        g.add_edge(u - 1, u, 1.0)?;
    }
    Ok(g)
}

/// Cycle on `n >= 3` nodes.
pub fn ring(n: usize) -> Result<UndirectedGraph> {
    if n < 3 {
        return Err(Error::InvalidParameter(format!(
            "ring requires n >= 3 (n={n})"
        )));
    }
    let mut g = path(n)?;
    g.add_edge(n - 1, 0, 1.0)?;
    Ok(g)
}

/// 4-connected `rows x cols` lattice; node `(r, c)` has id `r * cols + c`.
pub fn grid2d(rows: usize, cols: usize) -> Result<UndirectedGraph> {
    let mut g = UndirectedGraph::new(rows * cols);
    for r in 0..rows {
        for c in 0..cols {
            let u = r * cols + c;
            if c + 1 < cols {
                g.add_edge(u, u + 1, 1.0)?;
            }
            if r + 1 < rows {
                g.add_edge(u, u + cols, 1.0)?;
            }
        }
    }
    Ok(g)
}

pub fn complete(n: usize) -> Result<UndirectedGraph> {
    let mut g = UndirectedGraph::new(n);
    for u in 0..n {
        for v in (u + 1)..n {
            g.add_edge(u, v, 1.0)?;
        }
    }
    Ok(g)
}
