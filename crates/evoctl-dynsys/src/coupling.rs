//! Coupling matrices for oscillator networks.
//!
//! Every generator returns the negative Laplacian `-L = A - D` of an
//! undirected graph: off-diagonal entries are 1 for connected pairs and the
//! diagonal holds the negated degree, so every row sums to zero and a
//! synchronized network feels no coupling force.

use nalgebra::DMatrix;

/// Builds `-L` from an undirected edge list over `n` nodes.
fn negative_laplacian(n: usize, edges: &[(usize, usize)]) -> DMatrix<f64> {
    let mut m = DMatrix::zeros(n, n);
    for &(u, v) in edges {
        assert!(u < n && v < n && u != v);
        m[(u, v)] += 1.0;
        m[(v, u)] += 1.0;
        m[(u, u)] -= 1.0;
        m[(v, v)] -= 1.0;
    }
    m
}

/// All-to-all coupling.
///
/// ```
/// use evoctl_dynsys::coupling::global_coupling;
///
/// let a = global_coupling(3);
/// assert_eq!(a[(0, 0)], -2.0);
/// assert_eq!(a[(0, 1)], 1.0);
/// ```
#[must_use]
pub fn global_coupling(n: usize) -> DMatrix<f64> {
    let edges: Vec<_> = (0..n).flat_map(|u| (u + 1..n).map(move |v| (u, v))).collect();
    negative_laplacian(n, &edges)
}

/// Disjoint pairs: unit 2i couples with unit 2i+1.
///
/// # Panics
///
/// Panics if `n` is odd.
#[must_use]
pub fn pairwise_coupling(n: usize) -> DMatrix<f64> {
    assert!(n % 2 == 0, "pairwise coupling needs an even unit count");
    let edges: Vec<_> = (0..n / 2).map(|i| (2 * i, 2 * i + 1)).collect();
    negative_laplacian(n, &edges)
}

/// Ring of units, each coupled to its two neighbors.
#[must_use]
pub fn circular_array_coupling(n: usize) -> DMatrix<f64> {
    if n < 2 {
        return DMatrix::zeros(n, n);
    }
    if n == 2 {
        // a two-node cycle degenerates to a single edge
        return negative_laplacian(2, &[(0, 1)]);
    }
    let edges: Vec<_> = (0..n).map(|u| (u, (u + 1) % n)).collect();
    negative_laplacian(n, &edges)
}

/// 2-D grid of `rows * cols` units, optionally wrapped into a torus.
///
/// Units are numbered row-major, matching a sorted node list.
#[must_use]
pub fn grid_2d_coupling(rows: usize, cols: usize, periodic: bool) -> DMatrix<f64> {
    let idx = |r: usize, c: usize| r * cols + c;
    let mut edges = Vec::new();
    for r in 0..rows {
        for c in 0..cols {
            if c + 1 < cols {
                edges.push((idx(r, c), idx(r, c + 1)));
            } else if periodic && cols > 2 {
                edges.push((idx(r, c), idx(r, 0)));
            }
            if r + 1 < rows {
                edges.push((idx(r, c), idx(r + 1, c)));
            } else if periodic && rows > 2 {
                edges.push((idx(r, c), idx(0, c)));
            }
        }
    }
    negative_laplacian(rows * cols, &edges)
}

/// Dorogovtsev-Goltsev-Mendes graph of the given generation.
///
/// Generation 0 is a single edge; each generation adds one node per existing
/// edge, connected to that edge's endpoints. The result is a deterministic
/// scale-free pseudofractal with `3^g` edges.
#[must_use]
pub fn dorogovtsev_goltsev_mendes_coupling(generation: usize) -> DMatrix<f64> {
    let mut edges = vec![(0usize, 1usize)];
    let mut next_node = 2;
    for _ in 0..generation {
        let mut new_edges = Vec::with_capacity(2 * edges.len());
        for &(u, v) in &edges {
            new_edges.push((u, next_node));
            new_edges.push((v, next_node));
            next_node += 1;
        }
        edges.extend(new_edges);
    }
    negative_laplacian(next_node, &edges)
}
