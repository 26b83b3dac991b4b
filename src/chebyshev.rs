//! Chebyshev approximation of spectral filters.
//!
//! A kernel \(\hat{g}\) on \([0, \lambda_{max}]\) is expanded as
//! \[
//!   \hat{g}(\lambda) \approx \tfrac{1}{2} c_0 + \sum_{k=1}^{K} c_k\, T_k\!\left(\frac{\lambda - a}{a}\right),
//!   \qquad a = \lambda_{max} / 2,
//! \]
//! and \(\hat{g}(L)x\) is evaluated with the three-term recurrence
//! \(T_k(y) = 2y\,T_{k-1}(y) - T_{k-2}(y)\) using only products with \(L\):
//! O(K · nnz(L)), no eigendecomposition.
//!
//! Accuracy depends on `lambda_max` bounding the true spectrum; values beyond it fall outside
//! the approximation interval.

use std::f64::consts::PI;

use crate::graph::WeightedGraphRef;
use crate::laplacian::{check_signal, laplacian_apply_unchecked, LaplacianKind};
use crate::{Error, Result};

#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChebyshevConfig {
    /// Polynomial order `K` (number of coefficients is `K + 1`).
    pub order: usize,
    /// Upper end of the approximation interval. `None` lets the caller pick a bound
    /// (see [`crate::spectrum::SpectralGraph::lambda_max_bound`]).
    pub lambda_max: Option<f64>,
}

impl Default for ChebyshevConfig {
    fn default() -> Self {
        Self {
            order: 30,
            lambda_max: None,
        }
    }
}

impl ChebyshevConfig {
    pub fn validate(&self) -> Result<()> {
        if self.order == 0 {
            return Err(Error::InvalidParameter("order must be > 0".to_string()));
        }
        if let Some(l) = self.lambda_max {
            validate_lambda_max(l)?;
        }
        Ok(())
    }
}

fn validate_lambda_max(lambda_max: f64) -> Result<()> {
    if !lambda_max.is_finite() || lambda_max <= 0.0 {
        return Err(Error::InvalidParameter(
            "lambda_max must be finite and > 0".to_string(),
        ));
    }
    Ok(())
}

/// Chebyshev coefficients `c_0..=c_order` of `kernel` on `[0, lambda_max]`, by Gauss–Chebyshev
/// quadrature on `order + 1` nodes.
pub fn chebyshev_coefficients<F: Fn(f64) -> f64>(
    kernel: F,
    order: usize,
    lambda_max: f64,
) -> Result<Vec<f64>> {
    if order == 0 {
        return Err(Error::InvalidParameter("order must be > 0".to_string()));
    }
    validate_lambda_max(lambda_max)?;

    let n = order + 1;
    let a = lambda_max / 2.0;
    let samples: Vec<(f64, f64)> = (0..n)
        .map(|i| {
            let theta = PI * (i as f64 + 0.5) / n as f64;
            let lambda = a * theta.cos() + a;
            (theta, kernel(lambda))
        })
        .collect();
    if let Some(&(theta, value)) = samples.iter().find(|(_, v)| !v.is_finite()) {
        return Err(Error::NonFiniteKernel {
            lambda: a * theta.cos() + a,
            value,
        });
    }

    Ok((0..n)
        .map(|k| {
            2.0 / n as f64
                * samples
                    .iter()
                    .map(|&(theta, g)| g * (k as f64 * theta).cos())
                    .sum::<f64>()
        })
        .collect())
}

/// Evaluate the expansion at a scalar `lambda` (Clenshaw recurrence).
pub fn chebyshev_eval(coeffs: &[f64], lambda_max: f64, lambda: f64) -> f64 {
    let Some((&c0, rest)) = coeffs.split_first() else {
        return 0.0;
    };
    let a = lambda_max / 2.0;
    let y = (lambda - a) / a;
    let mut b1 = 0.0;
    let mut b2 = 0.0;
    for &c in rest.iter().rev() {
        let b0 = 2.0 * y * b1 - b2 + c;
        b2 = b1;
        b1 = b0;
    }
    0.5 * c0 + y * b1 - b2
}

/// \(y \approx \hat{g}(L)\,x\) from precomputed coefficients, one product with `L` per order.
pub fn chebyshev_apply<G: WeightedGraphRef>(
    graph: &G,
    kind: LaplacianKind,
    coeffs: &[f64],
    lambda_max: f64,
    x: &[f64],
) -> Result<Vec<f64>> {
    check_signal(graph.node_count(), x)?;
    validate_lambda_max(lambda_max)?;
    Ok(chebyshev_apply_bank(graph, kind, &[coeffs], lambda_max, x)
        .pop()
        .unwrap_or_default())
}

/// Apply several expansions at once, sharing the recurrence `T_k(L̃) x`.
///
/// Inputs are assumed validated.
pub(crate) fn chebyshev_apply_bank<G: WeightedGraphRef>(
    graph: &G,
    kind: LaplacianKind,
    bank: &[&[f64]],
    lambda_max: f64,
    x: &[f64],
) -> Vec<Vec<f64>> {
    let n = x.len();
    let a = lambda_max / 2.0;
    let order = bank.iter().map(|c| c.len()).max().unwrap_or(0);

    let mut out: Vec<Vec<f64>> = bank
        .iter()
        .map(|c| {
            let c0 = c.first().copied().unwrap_or(0.0);
            x.iter().map(|&v| 0.5 * c0 * v).collect()
        })
        .collect();
    if order < 2 {
        return out;
    }

    // T_0 x = x, T_1 x = (L x - a x) / a
    let mut prev = x.to_vec();
    let lx = laplacian_apply_unchecked(graph, kind, x);
    let mut curr: Vec<f64> = lx.iter().zip(x).map(|(l, v)| (l - a * v) / a).collect();
    accumulate(&mut out, bank, 1, &curr);

    for k in 2..order {
        let lc = laplacian_apply_unchecked(graph, kind, &curr);
        let next: Vec<f64> = (0..n)
            .map(|i| 2.0 / a * (lc[i] - a * curr[i]) - prev[i])
            .collect();
        accumulate(&mut out, bank, k, &next);
        prev = std::mem::replace(&mut curr, next);
    }
    tracing::trace!(nodes = n, order = order - 1, filters = bank.len(), "chebyshev recurrence");
    out
}

fn accumulate(out: &mut [Vec<f64>], bank: &[&[f64]], k: usize, t_k: &[f64]) {
    for (y, coeffs) in out.iter_mut().zip(bank) {
        if let Some(&c) = coeffs.get(k) {
            for (yi, &ti) in y.iter_mut().zip(t_k) {
                *yi += c * ti;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::ring;
    use crate::spectrum::Spectrum;

    #[test]
    fn polynomial_kernels_are_reproduced_exactly() {
        let coeffs = chebyshev_coefficients(|l| 3.0 * l * l - l + 2.0, 4, 4.0).unwrap();
        for lambda in [0.0, 0.5, 1.7, 3.2, 4.0] {
            let expected = 3.0 * lambda * lambda - lambda + 2.0;
            let got = chebyshev_eval(&coeffs, 4.0, lambda);
            assert!((got - expected).abs() < 1e-10, "{lambda}: {got} vs {expected}");
        }
        // degree-2 polynomial: higher coefficients vanish
        assert!(coeffs[3..].iter().all(|c| c.abs() < 1e-12));
    }

    #[test]
    fn smooth_kernel_converges() {
        let heat = |l: f64| (-2.0 * l).exp();
        let coeffs = chebyshev_coefficients(heat, 25, 2.0).unwrap();
        for i in 0..=20 {
            let lambda = 0.1 * i as f64;
            assert!((chebyshev_eval(&coeffs, 2.0, lambda) - heat(lambda)).abs() < 1e-10);
        }
    }

    #[test]
    fn coefficients_reject_bad_input() {
        assert!(chebyshev_coefficients(|l| l, 0, 2.0).is_err());
        assert!(chebyshev_coefficients(|l| l, 5, 0.0).is_err());
        assert!(chebyshev_coefficients(|l| l, 5, f64::INFINITY).is_err());
        let err = chebyshev_coefficients(|_| f64::NAN, 5, 2.0).unwrap_err();
        assert!(matches!(err, Error::NonFiniteKernel { .. }));
    }

    #[test]
    fn apply_matches_exact_filter_on_ring() {
        let g = ring(8).unwrap();
        let s = Spectrum::of_graph(&g, LaplacianKind::Combinatorial).unwrap();
        let heat = |l: f64| (-0.5 * l).exp();
        let x: Vec<f64> = (0..8).map(|i| (i as f64 * 0.9).sin()).collect();

        let coeffs = chebyshev_coefficients(heat, 30, s.lambda_max()).unwrap();
        let approx =
            chebyshev_apply(&g, LaplacianKind::Combinatorial, &coeffs, s.lambda_max(), &x)
                .unwrap();
        let exact = s.apply_kernel(heat, &x).unwrap();
        for (a, e) in approx.iter().zip(&exact) {
            assert!((a - e).abs() < 1e-8, "{a} vs {e}");
        }
    }

    #[test]
    fn apply_rejects_wrong_signal_length() {
        let g = ring(4).unwrap();
        let err = chebyshev_apply(&g, LaplacianKind::Normalized, &[1.0, 1.0], 2.0, &[1.0])
            .unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { .. }));
    }
}
