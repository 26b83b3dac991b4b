//! `graphsig`: graph signal processing on undirected weighted graphs.
//!
//! Build a graph (random models, lattices, or neighborhood graphs over sampled manifolds), take
//! its Laplacian, and filter node signals in the graph spectral domain, either exactly through
//! the eigenbasis or with a Chebyshev polynomial in \(L\).
//!
//! ```
//! use graphsig::{generators, Filter, FilterMethod, LaplacianKind, SpectralGraph};
//!
//! let sg = SpectralGraph::new(generators::ring(8)?, LaplacianKind::Combinatorial);
//! let heat = Filter::heat(2.0, sg.lambda_max_bound()?)?;
//! let mut x = vec![0.0; 8];
//! x[0] = 1.0;
//! let y = heat.apply(&sg, &x, FilterMethod::Exact)?;
//! assert!((y.iter().sum::<f64>() - 1.0).abs() < 1e-9);
//! # Ok::<(), graphsig::Error>(())
//! ```
//!
//! Public invariants (must not drift):
//! - **Node order**: signals and outputs are indexed by node id \(0..n-1\).
//! - **Spectral order**: eigenpairs are sorted by ascending eigenvalue.
//! - **Determinism**: randomized generators and samplers are deterministic given their seed.
//! - **No silent non-finites**: non-finite inputs and kernel responses are errors, not NaNs in
//!   the output.
//!
//! Swappable (allowed to change without breaking the contract):
//! - eigensolver and neighbor-search internals
//! - serial vs parallel neighbor search (`parallel` feature)
//! - Chebyshev recurrence details (so long as the approximation semantics hold)

pub mod chebyshev;
pub mod filter;
pub mod generators;
pub mod graph;
pub mod laplacian;
pub mod manifold;
pub mod nn;
pub mod partition;
pub mod spectrum;
pub mod wavelets;

pub use chebyshev::{chebyshev_apply, chebyshev_coefficients, chebyshev_eval, ChebyshevConfig};
pub use filter::{spectral_filter, spectral_filter_operator, Filter, FilterMethod, Kernel};
pub use graph::{
    AdjacencyMatrix, Graph, GraphRef, UndirectedGraph, WeightedGraph, WeightedGraphRef,
};
pub use laplacian::{
    estimate_lambda_max, gradient, lambda_max_upper_bound, laplacian_apply, laplacian_matrix,
    quadratic_form, LambdaMaxEstimate, LaplacianKind, PowerIterationConfig,
};
pub use nn::{knn_graph, radius_graph, KnnConfig, RadiusConfig};
pub use partition::{component_count, connected_components};
pub use spectrum::{SpectralGraph, Spectrum};
pub use wavelets::{log_scales, mexican_hat, MexicanHatConfig};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("index out of bounds: {0}")]
    IndexOutOfBounds(usize),
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
    #[error("matrix must be square (got {rows}x{cols})")]
    NotSquare { rows: usize, cols: usize },
    #[error("matrix is not symmetric at ({row},{col}): |a_ij - a_ji| = {gap}")]
    NotSymmetric { row: usize, col: usize, gap: f64 },
    #[error("non-finite value in {0}")]
    NonFinite(&'static str),
    #[error("kernel is not finite at lambda={lambda} (got {value})")]
    NonFiniteKernel { lambda: f64, value: f64 },
    #[error("decomposition failed: {0}")]
    Decomposition(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;
