use graphsig::{
    generators, laplacian_matrix, quadratic_form, spectral_filter, LaplacianKind, Spectrum,
    UndirectedGraph,
};
use nalgebra::DVector;
use proptest::prelude::*;

fn assert_close(a: &[f64], b: &[f64], tol: f64) {
    assert_eq!(a.len(), b.len());
    for (i, (x, y)) in a.iter().zip(b).enumerate() {
        assert!((x - y).abs() <= tol, "index {i}: {x} vs {y}");
    }
}

/// Random weighted graph on `n` nodes from an edge soup (self loops and out-of-range ids dropped).
fn build(n: usize, edges: &[(usize, usize, f64)]) -> UndirectedGraph {
    let mut g = UndirectedGraph::new(n);
    for &(u, v, w) in edges {
        if u < n && v < n && u != v {
            g.add_edge(u, v, w).unwrap();
        }
    }
    g
}

fn graph_strategy() -> impl Strategy<Value = (UndirectedGraph, Vec<f64>)> {
    (1usize..9)
        .prop_flat_map(|n| {
            (
                Just(n),
                proptest::collection::vec((0..n, 0..n, 0.1f64..4.0), 0..24),
                proptest::collection::vec(-5.0f64..5.0, n),
            )
        })
        .prop_map(|(n, edges, x)| (build(n, &edges), x))
}

proptest! {
    #[test]
    fn identity_kernel_equals_laplacian_product((g, x) in graph_strategy()) {
        for kind in [LaplacianKind::Combinatorial, LaplacianKind::Normalized] {
            let l = laplacian_matrix(&g, kind);
            let y = spectral_filter(&l, |lambda| lambda, &x).unwrap();
            let lx = &l * DVector::from_column_slice(&x);
            for (a, b) in y.iter().zip(lx.iter()) {
                prop_assert!((a - b).abs() <= 1e-8, "{:?}: {} vs {}", kind, a, b);
            }
        }
    }

    #[test]
    fn constant_kernel_is_identity((g, x) in graph_strategy()) {
        let l = laplacian_matrix(&g, LaplacianKind::Combinatorial);
        let y = spectral_filter(&l, |_| 1.0, &x).unwrap();
        for (a, b) in y.iter().zip(&x) {
            prop_assert!((a - b).abs() <= 1e-9);
        }
    }

    #[test]
    fn fourier_round_trip((g, x) in graph_strategy()) {
        let s = Spectrum::of_graph(&g, LaplacianKind::Normalized).unwrap();
        let back = s.igft(&s.gft(&x).unwrap()).unwrap();
        for (a, b) in back.iter().zip(&x) {
            prop_assert!((a - b).abs() <= 1e-9);
        }
    }

    #[test]
    fn smoothness_is_nonnegative((g, x) in graph_strategy()) {
        prop_assert!(quadratic_form(&g, &x).unwrap() >= 0.0);
        let s = Spectrum::of_graph(&g, LaplacianKind::Combinatorial).unwrap();
        prop_assert!(s.eigenvalues().iter().all(|&l| l >= -1e-9));
    }

    #[test]
    fn zero_eigenvalues_count_components((g, _x) in graph_strategy()) {
        let k = graphsig::component_count(&g);
        for kind in [LaplacianKind::Combinatorial, LaplacianKind::Normalized] {
            let s = Spectrum::of_graph(&g, kind).unwrap();
            prop_assert_eq!(s.zero_eigenvalue_count(1e-8), k, "{:?}", kind);
        }
    }
}

#[test]
fn disjoint_union_has_one_zero_eigenvalue_per_component() {
    // ring(4) on 0..4, path(3) on 4..7, isolated 7
    let mut g = UndirectedGraph::new(8);
    for (u, v, w) in generators::ring(4).unwrap().edges() {
        g.add_edge(u, v, w).unwrap();
    }
    for (u, v, w) in generators::path(3).unwrap().edges() {
        g.add_edge(u + 4, v + 4, w).unwrap();
    }
    let s = Spectrum::of_graph(&g, LaplacianKind::Combinatorial).unwrap();
    assert_eq!(s.zero_eigenvalue_count(1e-9), 3);
    assert!(s.eigenvalues()[3] > 0.1);
}

#[test]
fn eigenvalues_are_ascending_and_start_at_zero() {
    let g = generators::watts_strogatz(20, 4, 0.3, 5).unwrap();
    let s = Spectrum::of_graph(&g, LaplacianKind::Combinatorial).unwrap();
    assert!(s.eigenvalues()[0].abs() < 1e-9);
    assert!(s.eigenvalues().windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn manifold_knn_graph_is_connected_and_filterable() {
    use graphsig::{
        knn_graph, manifold, ChebyshevConfig, Filter, FilterMethod, KnnConfig, SpectralGraph,
    };

    let pts = manifold::sample_sphere(80, 3, 21).unwrap();
    let g = knn_graph(&pts, KnnConfig { k: 12, sigma: None }).unwrap();
    assert_eq!(graphsig::component_count(&g), 1);

    let sg = SpectralGraph::new(g, LaplacianKind::Normalized);
    // smooth signal: height on the sphere
    let x: Vec<f64> = pts.iter().map(|p| p[2]).collect();
    let heat = Filter::heat(1.0, 2.0).unwrap();
    let exact = heat.apply(&sg, &x, FilterMethod::Exact).unwrap();
    let cheb = heat
        .apply(
            &sg,
            &x,
            FilterMethod::Chebyshev(ChebyshevConfig {
                order: 30,
                lambda_max: Some(2.0),
            }),
        )
        .unwrap();
    assert_close(&exact, &cheb, 1e-8);
}

#[test]
fn non_finite_kernel_is_an_error() {
    let l = laplacian_matrix(&generators::path(4).unwrap(), LaplacianKind::Combinatorial);
    let err = spectral_filter(&l, |lambda| (lambda - 100.0).sqrt(), &[1.0; 4]).unwrap_err();
    assert!(matches!(err, graphsig::Error::NonFiniteKernel { .. }), "{err}");
}

#[cfg(feature = "petgraph")]
mod petgraph_adapters {
    use super::assert_close;
    use graphsig::{laplacian_matrix, LaplacianKind, UndirectedGraph};
    use petgraph::prelude::*;

    #[test]
    fn undirected_petgraph_imports_symmetrically() {
        // 0 - 1 - 2
        let mut g: UnGraph<(), f64> = UnGraph::new_undirected();
        let a = g.add_node(());
        let b = g.add_node(());
        let c = g.add_node(());
        g.add_edge(a, b, 2.0);
        g.add_edge(b, c, 0.5);

        let ug = UndirectedGraph::from_adapter(&g);
        assert_eq!(ug.edge_count(), 2);
        assert_eq!(ug.edge_weight(1, 0), Some(2.0));

        let l = laplacian_matrix(&ug, LaplacianKind::Combinatorial);
        let row: Vec<f64> = l.row(1).iter().copied().collect();
        assert_close(&row, &[-2.0, 2.5, -0.5], 1e-12);
    }

    #[test]
    fn directed_petgraph_keeps_heavier_direction() {
        let mut g: DiGraph<(), f64> = DiGraph::new();
        let a = g.add_node(());
        let b = g.add_node(());
        g.add_edge(a, b, 1.0);
        g.add_edge(b, a, 3.0);
        let ug = UndirectedGraph::from_adapter(&g);
        assert_eq!(ug.edge_weight(0, 1), Some(3.0));
    }
}
