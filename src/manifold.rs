//! Point clouds sampled from simple manifolds.
//!
//! Pair with [`crate::nn::knn_graph`] or [`crate::nn::radius_graph`] to get a graph whose
//! Laplacian approximates the manifold's Laplace–Beltrami operator.

use std::f64::consts::PI;

use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::{Distribution, Normal, StandardNormal};

use crate::{Error, Result};

/// `n` points uniform in `[0, 1)^dim`.
pub fn sample_unit_cube(n: usize, dim: usize, seed: u64) -> Result<Vec<Vec<f64>>> {
    if dim == 0 {
        return Err(Error::InvalidParameter("dim must be > 0".to_string()));
    }
    let mut rng = StdRng::seed_from_u64(seed);
    Ok((0..n)
        .map(|_| (0..dim).map(|_| rng.gen::<f64>()).collect())
        .collect())
}

/// `n` points uniform on the unit sphere \(S^{dim-1} \subset \mathbb{R}^{dim}\).
pub fn sample_sphere(n: usize, dim: usize, seed: u64) -> Result<Vec<Vec<f64>>> {
    if dim < 2 {
        return Err(Error::InvalidParameter(format!(
            "sphere requires dim >= 2 (dim={dim})"
        )));
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let mut points = Vec::with_capacity(n);
    while points.len() < n {
        let p: Vec<f64> = (0..dim).map(|_| StandardNormal.sample(&mut rng)).collect();
        let norm = p.iter().map(|v: &f64| v * v).sum::<f64>().sqrt();
        // Rejection keeps the direction well defined.
        if norm > 1e-12 {
            points.push(p.into_iter().map(|v| v / norm).collect());
        }
    }
    Ok(points)
}

/// Swiss roll in \(\mathbb{R}^3\): \(t = \tfrac{3\pi}{2}(1 + 2u)\), point
/// \((t\cos t,\ 21v,\ t\sin t)\) plus isotropic Gaussian noise of standard deviation `noise`.
pub fn sample_swiss_roll(n: usize, noise: f64, seed: u64) -> Result<Vec<Vec<f64>>> {
    let jitter = Normal::new(0.0, noise)
        .map_err(|e| Error::InvalidParameter(format!("noise: {e}")))?;
    let mut rng = StdRng::seed_from_u64(seed);
    Ok((0..n)
        .map(|_| {
            let t = 1.5 * PI * (1.0 + 2.0 * rng.gen::<f64>());
            let h = 21.0 * rng.gen::<f64>();
            vec![
                t * t.cos() + jitter.sample(&mut rng),
                h + jitter.sample(&mut rng),
                t * t.sin() + jitter.sample(&mut rng),
            ]
        })
        .collect())
}
