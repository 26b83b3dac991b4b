//! Spectral graph filters.
//!
//! The core operator maps a signal \(x\) to \(y = \hat{g}(L)\,x\) for a scalar kernel
//! \(\hat{g}\) applied to the Laplacian eigenvalues:
//! \[
//!   y = U\,\mathrm{diag}(\hat{g}(\lambda_1), \dots, \hat{g}(\lambda_N))\,U^\top x.
//! \]
//! [`spectral_filter`] does this for an arbitrary symmetric matrix. [`Filter`] holds a bank of
//! kernels and runs them against a [`SpectralGraph`] either exactly (full eigenbasis, O(N³)
//! once, cached) or through a Chebyshev expansion (O(K · nnz(L)) per kernel, no
//! eigendecomposition).
//!
//! Kernels that produce a non-finite value at any evaluated eigenvalue (or Chebyshev node) are
//! reported as [`Error::NonFiniteKernel`].

use nalgebra::DMatrix;

use crate::chebyshev::{chebyshev_apply_bank, chebyshev_coefficients, ChebyshevConfig};
use crate::laplacian::check_signal;
use crate::spectrum::{SpectralGraph, Spectrum};
use crate::{Error, Result};

/// A scalar frequency response \(\hat{g}: \mathbb{R} \to \mathbb{R}\).
pub type Kernel = Box<dyn Fn(f64) -> f64 + Send + Sync>;

/// \(y = \hat{g}(L)\,x\) by full eigendecomposition of the symmetric matrix `l`.
///
/// Rejects non-square, non-symmetric or non-finite `l`, signals of the wrong length, and
/// kernels that are non-finite at some eigenvalue.
pub fn spectral_filter<F: Fn(f64) -> f64>(
    l: &DMatrix<f64>,
    kernel: F,
    x: &[f64],
) -> Result<Vec<f64>> {
    check_signal(l.nrows(), x)?;
    Spectrum::compute(l)?.apply_kernel(kernel, x)
}

/// The dense operator \(\hat{g}(L)\).
pub fn spectral_filter_operator<F: Fn(f64) -> f64>(
    l: &DMatrix<f64>,
    kernel: F,
) -> Result<DMatrix<f64>> {
    Spectrum::compute(l)?.operator(kernel)
}

/// How a [`Filter`] evaluates \(\hat{g}(L)\,x\).
#[derive(Debug, Clone, Copy, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FilterMethod {
    /// Full eigenbasis (computed once per `SpectralGraph`).
    #[default]
    Exact,
    /// Truncated Chebyshev expansion.
    Chebyshev(ChebyshevConfig),
}

/// A bank of one or more kernels.
pub struct Filter {
    kernels: Vec<Kernel>,
}

impl std::fmt::Debug for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Filter")
            .field("kernels", &self.kernels.len())
            .finish()
    }
}

impl Filter {
    pub fn new(kernels: Vec<Kernel>) -> Result<Self> {
        if kernels.is_empty() {
            return Err(Error::InvalidParameter(
                "a filter needs at least one kernel".to_string(),
            ));
        }
        Ok(Self { kernels })
    }

    /// Single-kernel filter.
    pub fn from_fn<F>(kernel: F) -> Self
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        Self {
            kernels: vec![Box::new(kernel) as Kernel],
        }
    }

    /// Heat kernel \(\hat{g}(\lambda) = e^{-\tau \lambda / \lambda_{max}}\).
    pub fn heat(tau: f64, lambda_max: f64) -> Result<Self> {
        Self::heat_bank(&[tau], lambda_max)
    }

    /// One heat kernel per `tau`.
    pub fn heat_bank(taus: &[f64], lambda_max: f64) -> Result<Self> {
        if !lambda_max.is_finite() || lambda_max <= 0.0 {
            return Err(Error::InvalidParameter(
                "lambda_max must be finite and > 0".to_string(),
            ));
        }
        if taus.iter().any(|t| !t.is_finite()) {
            return Err(Error::InvalidParameter("tau must be finite".to_string()));
        }
        let kernels = taus
            .iter()
            .map(|&tau| Box::new(move |l: f64| (-tau * l / lambda_max).exp()) as Kernel)
            .collect();
        Self::new(kernels)
    }

    /// Ideal band pass: 1 on `[band_min, band_max]`, 0 elsewhere.
    pub fn rectangular(band_min: f64, band_max: f64) -> Result<Self> {
        if !band_min.is_finite() || !band_max.is_finite() || band_min > band_max {
            return Err(Error::InvalidParameter(format!(
                "rectangular band must satisfy band_min <= band_max (got [{band_min}, {band_max}])"
            )));
        }
        Ok(Self::from_fn(move |l| {
            if (band_min..=band_max).contains(&l) {
                1.0
            } else {
                0.0
            }
        }))
    }

    pub fn len(&self) -> usize {
        self.kernels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kernels.is_empty()
    }

    pub fn kernels(&self) -> &[Kernel] {
        &self.kernels
    }

    /// Response of every kernel at `lambda`.
    pub fn evaluate(&self, lambda: f64) -> Vec<f64> {
        self.kernels.iter().map(|g| g(lambda)).collect()
    }

    /// Run every kernel on `x`; one output signal per kernel.
    pub fn analyze(
        &self,
        graph: &SpectralGraph,
        x: &[f64],
        method: FilterMethod,
    ) -> Result<Vec<Vec<f64>>> {
        run_bank(&self.kernels, graph, x, method)
    }

    /// Single-kernel convenience for [`Filter::analyze`].
    pub fn apply(
        &self,
        graph: &SpectralGraph,
        x: &[f64],
        method: FilterMethod,
    ) -> Result<Vec<f64>> {
        if self.kernels.len() != 1 {
            return Err(Error::InvalidParameter(format!(
                "apply needs a single-kernel filter (got {} kernels); use analyze",
                self.kernels.len()
            )));
        }
        Ok(self.analyze(graph, x, method)?.pop().unwrap_or_default())
    }

    /// Adjoint of [`Filter::analyze`]: \(\sum_k \hat{g}_k(L)\,c_k\).
    pub fn synthesize(
        &self,
        graph: &SpectralGraph,
        coefficients: &[Vec<f64>],
        method: FilterMethod,
    ) -> Result<Vec<f64>> {
        if coefficients.len() != self.kernels.len() {
            return Err(Error::DimensionMismatch {
                expected: self.kernels.len(),
                got: coefficients.len(),
            });
        }
        let n = graph.node_count();
        let mut out = vec![0.0; n];
        for (g, c) in self.kernels.iter().zip(coefficients) {
            let part = run_bank(&[g], graph, c, method)?;
            for (o, p) in out.iter_mut().zip(&part[0]) {
                *o += p;
            }
        }
        Ok(out)
    }

    /// Frame bounds \((A, B)\): the min and max of \(\sum_k \hat{g}_k(\lambda)^2\) over `points`
    /// uniformly spaced samples of \([0, \lambda_{max}]\).
    ///
    /// `analyze` followed by `synthesize` scales a signal's energy by a factor in `[A, B]`;
    /// `A == B` means a tight frame.
    pub fn frame_bounds(&self, lambda_max: f64, points: usize) -> Result<(f64, f64)> {
        if !lambda_max.is_finite() || lambda_max < 0.0 {
            return Err(Error::InvalidParameter(
                "lambda_max must be finite and >= 0".to_string(),
            ));
        }
        if points < 2 {
            return Err(Error::InvalidParameter("points must be >= 2".to_string()));
        }
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for i in 0..points {
            let lambda = lambda_max * i as f64 / (points - 1) as f64;
            let mut energy = 0.0_f64;
            for g in &self.kernels {
                energy += checked_response(g, lambda)?.powi(2);
            }
            lo = lo.min(energy);
            hi = hi.max(energy);
        }
        Ok((lo, hi))
    }
}

fn run_bank<K: Fn(f64) -> f64>(
    kernels: &[K],
    graph: &SpectralGraph,
    x: &[f64],
    method: FilterMethod,
) -> Result<Vec<Vec<f64>>> {
    check_signal(graph.node_count(), x)?;
    match method {
        FilterMethod::Exact => {
            let spectrum = graph.spectrum()?;
            kernels.iter().map(|g| spectrum.apply_kernel(g, x)).collect()
        }
        FilterMethod::Chebyshev(config) => {
            config.validate()?;
            let lambda_max = match config.lambda_max {
                Some(l) => l,
                None => graph.lambda_max_bound()?,
            };
            if lambda_max <= 0.0 {
                // No edges: L = 0, so g(L) x = g(0) x.
                return kernels
                    .iter()
                    .map(|g| {
                        let g0 = checked_response(g, 0.0)?;
                        Ok(x.iter().map(|v| g0 * v).collect())
                    })
                    .collect();
            }
            let coeffs = kernels
                .iter()
                .map(|g| chebyshev_coefficients(g, config.order, lambda_max))
                .collect::<Result<Vec<_>>>()?;
            let bank: Vec<&[f64]> = coeffs.iter().map(Vec::as_slice).collect();
            Ok(chebyshev_apply_bank(
                graph.graph(),
                graph.kind(),
                &bank,
                lambda_max,
                x,
            ))
        }
    }
}

fn checked_response<K: Fn(f64) -> f64>(kernel: &K, lambda: f64) -> Result<f64> {
    let value = kernel(lambda);
    if !value.is_finite() {
        return Err(Error::NonFiniteKernel { lambda, value });
    }
    Ok(value)
}
