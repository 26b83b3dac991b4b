//! Laplacian spectrum and the graph Fourier transform.
//!
//! For a symmetric \(L = U \Lambda U^\top\) with ascending eigenvalues:
//! - forward transform: \(\hat{x} = U^\top x\)
//! - inverse transform: \(x = U \hat{x}\)
//! - spectral operator: \(\hat{g}(L) = U\,\mathrm{diag}(\hat{g}(\lambda))\,U^\top\)

use std::sync::OnceLock;

use nalgebra::{DMatrix, DVector, SymmetricEigen};

use crate::graph::UndirectedGraph;
use crate::laplacian::{
    check_signal, estimate_lambda_max, lambda_max_upper_bound, laplacian_matrix, LaplacianKind,
    PowerIterationConfig,
};
use crate::{Error, Result};

/// Relative tolerance for the symmetry check.
const SYMMETRY_TOLERANCE: f64 = 1e-10;

/// Safety margin applied to power-iteration estimates of \(\lambda_{max}\).
const LAMBDA_MAX_MARGIN: f64 = 1.01;

/// Reject non-square, non-finite or non-symmetric matrices.
pub(crate) fn check_symmetric(m: &DMatrix<f64>) -> Result<()> {
    let (rows, cols) = m.shape();
    if rows != cols {
        return Err(Error::NotSquare { rows, cols });
    }
    if m.iter().any(|v| !v.is_finite()) {
        return Err(Error::NonFinite("matrix"));
    }
    let scale = m.amax().max(1.0);
    for i in 0..rows {
        for j in (i + 1)..cols {
            let gap = (m[(i, j)] - m[(j, i)]).abs();
            if gap > SYMMETRY_TOLERANCE * scale {
                return Err(Error::NotSymmetric {
                    row: i,
                    col: j,
                    gap,
                });
            }
        }
    }
    Ok(())
}

/// Evaluate `kernel` on every eigenvalue, surfacing the first non-finite response.
pub(crate) fn eval_kernel<F: Fn(f64) -> f64>(kernel: F, lambdas: &[f64]) -> Result<Vec<f64>> {
    lambdas
        .iter()
        .map(|&lambda| {
            let value = kernel(lambda);
            if value.is_finite() {
                Ok(value)
            } else {
                Err(Error::NonFiniteKernel { lambda, value })
            }
        })
        .collect()
}

/// Eigenpairs of a symmetric matrix, eigenvalues ascending.
#[derive(Debug, Clone)]
pub struct Spectrum {
    eigenvalues: Vec<f64>,
    /// Orthonormal eigenvectors, one per column, in eigenvalue order.
    eigenvectors: DMatrix<f64>,
}

impl Spectrum {
    /// Full eigendecomposition of a symmetric matrix. O(n³).
    pub fn compute(matrix: &DMatrix<f64>) -> Result<Self> {
        check_symmetric(matrix)?;
        let n = matrix.nrows();
        if n == 0 {
            return Ok(Self {
                eigenvalues: Vec::new(),
                eigenvectors: DMatrix::zeros(0, 0),
            });
        }

        let eig = SymmetricEigen::try_new(matrix.clone(), f64::EPSILON, 0)
            .ok_or(Error::Decomposition("symmetric eigensolver did not converge"))?;

        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| eig.eigenvalues[a].total_cmp(&eig.eigenvalues[b]));
        let eigenvalues: Vec<f64> = order.iter().map(|&k| eig.eigenvalues[k]).collect();
        let eigenvectors = DMatrix::from_fn(n, n, |i, k| eig.eigenvectors[(i, order[k])]);

        tracing::debug!(
            n,
            lambda_min = eigenvalues[0],
            lambda_max = eigenvalues[n - 1],
            "computed spectrum"
        );
        Ok(Self {
            eigenvalues,
            eigenvectors,
        })
    }

    /// Spectrum of the graph's Laplacian.
    pub fn of_graph(graph: &UndirectedGraph, kind: LaplacianKind) -> Result<Self> {
        Self::compute(&laplacian_matrix(graph, kind))
    }

    pub fn len(&self) -> usize {
        self.eigenvalues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.eigenvalues.is_empty()
    }

    pub fn eigenvalues(&self) -> &[f64] {
        &self.eigenvalues
    }

    pub fn eigenvectors(&self) -> &DMatrix<f64> {
        &self.eigenvectors
    }

    /// The `k`-th eigenvector (`k`-th smallest eigenvalue).
    pub fn eigenvector(&self, k: usize) -> Result<Vec<f64>> {
        if k >= self.len() {
            return Err(Error::IndexOutOfBounds(k));
        }
        Ok(self.eigenvectors.column(k).iter().copied().collect())
    }

    /// Largest eigenvalue (0 for an empty spectrum).
    pub fn lambda_max(&self) -> f64 {
        self.eigenvalues.last().copied().unwrap_or(0.0)
    }

    /// Eigenvalues with `|λ| <= tol`. For a Laplacian: the number of connected components.
    pub fn zero_eigenvalue_count(&self, tol: f64) -> usize {
        self.eigenvalues.iter().filter(|l| l.abs() <= tol).count()
    }

    /// \(\max_{i,k} |U_{ik}|\): how localized the Fourier basis is.
    pub fn coherence(&self) -> f64 {
        self.eigenvectors.amax()
    }

    /// Graph Fourier transform \(\hat{x} = U^\top x\).
    pub fn gft(&self, x: &[f64]) -> Result<Vec<f64>> {
        check_signal(self.len(), x)?;
        let xh = self.eigenvectors.tr_mul(&DVector::from_column_slice(x));
        Ok(xh.iter().copied().collect())
    }

    /// Inverse graph Fourier transform \(x = U \hat{x}\).
    pub fn igft(&self, x_hat: &[f64]) -> Result<Vec<f64>> {
        check_signal(self.len(), x_hat)?;
        let x = &self.eigenvectors * DVector::from_column_slice(x_hat);
        Ok(x.iter().copied().collect())
    }

    /// `kernel` evaluated on each eigenvalue; the frequency response of a filter.
    pub fn kernel_response<F: Fn(f64) -> f64>(&self, kernel: F) -> Result<Vec<f64>> {
        eval_kernel(kernel, &self.eigenvalues)
    }

    /// \(y = \hat{g}(L)\,x\) via the full eigenbasis.
    pub fn apply_kernel<F: Fn(f64) -> f64>(&self, kernel: F, x: &[f64]) -> Result<Vec<f64>> {
        let response = self.kernel_response(kernel)?;
        let mut xh = self.gft(x)?;
        for (c, g) in xh.iter_mut().zip(&response) {
            *c *= g;
        }
        self.igft(&xh)
    }

    /// Dense operator \(\hat{g}(L) = U\,\mathrm{diag}(\hat{g}(\lambda))\,U^\top\).
    pub fn operator<F: Fn(f64) -> f64>(&self, kernel: F) -> Result<DMatrix<f64>> {
        let response = self.kernel_response(kernel)?;
        let u = &self.eigenvectors;
        let scaled = u * DMatrix::from_diagonal(&DVector::from_vec(response));
        Ok(scaled * u.transpose())
    }
}

/// A graph together with its Laplacian kind, caching the spectrum and the \(\lambda_{max}\)
/// bound the first time they are needed.
#[derive(Debug)]
pub struct SpectralGraph {
    graph: UndirectedGraph,
    kind: LaplacianKind,
    spectrum: OnceLock<Spectrum>,
    lambda_max: OnceLock<f64>,
}

impl SpectralGraph {
    pub fn new(graph: UndirectedGraph, kind: LaplacianKind) -> Self {
        Self {
            graph,
            kind,
            spectrum: OnceLock::new(),
            lambda_max: OnceLock::new(),
        }
    }

    pub fn graph(&self) -> &UndirectedGraph {
        &self.graph
    }

    pub fn kind(&self) -> LaplacianKind {
        self.kind
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn into_graph(self) -> UndirectedGraph {
        self.graph
    }

    /// Dense Laplacian (not cached).
    pub fn laplacian(&self) -> DMatrix<f64> {
        laplacian_matrix(&self.graph, self.kind)
    }

    /// Full spectrum, computed on first use.
    pub fn spectrum(&self) -> Result<&Spectrum> {
        if let Some(s) = self.spectrum.get() {
            return Ok(s);
        }
        let s = Spectrum::compute(&self.laplacian())?;
        Ok(self.spectrum.get_or_init(|| s))
    }

    pub fn is_spectrum_computed(&self) -> bool {
        self.spectrum.get().is_some()
    }

    /// Upper bound on \(\lambda_{max}\) for polynomial filtering.
    ///
    /// Exact if the spectrum is already cached; otherwise a power-iteration estimate padded by
    /// 1%, or the Gershgorin bound if the iteration did not converge.
    pub fn lambda_max_bound(&self) -> Result<f64> {
        if let Some(s) = self.spectrum.get() {
            return Ok(s.lambda_max());
        }
        if let Some(&l) = self.lambda_max.get() {
            return Ok(l);
        }
        let est = estimate_lambda_max(&self.graph, self.kind, PowerIterationConfig::default())?;
        let bound = lambda_max_upper_bound(&self.graph, self.kind);
        let value = if est.converged {
            (est.value * LAMBDA_MAX_MARGIN).min(bound)
        } else {
            bound
        };
        tracing::trace!(
            estimate = est.value,
            iterations = est.iterations,
            bound = value,
            "lambda_max bound"
        );
        Ok(*self.lambda_max.get_or_init(|| value))
    }

    pub fn gft(&self, x: &[f64]) -> Result<Vec<f64>> {
        self.spectrum()?.gft(x)
    }

    pub fn igft(&self, x_hat: &[f64]) -> Result<Vec<f64>> {
        self.spectrum()?.igft(x_hat)
    }
}
