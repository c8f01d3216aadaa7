//! Neighborhood formation and cross-cloud association.
//!
//! Every cloud gets one [`NeighborIndex`]. From it we derive the fixed-size
//! neighborhoods of its own points and the nearest-point association of the
//! other cloud's points.

pub mod association;
pub mod search;

pub use association::associate;
pub use search::NeighborIndex;

/// K-nearest neighborhoods of every point of a cloud.
///
/// Stored row-major as flat `[N * K]` arrays. Row `i` starts with `i` itself
/// at distance 0, followed by its neighbors nearest first.
#[derive(Debug, Clone, PartialEq)]
pub struct Neighborhoods {
    k: usize,
    indices: Vec<usize>,
    distances: Vec<f64>,
}

impl Neighborhoods {
    /// Wrap flat row-major index and distance arrays of row length `k`.
    pub(crate) fn from_flat(k: usize, indices: Vec<usize>, distances: Vec<f64>) -> Self {
        debug_assert_eq!(indices.len(), distances.len());
        debug_assert!(k > 0 && indices.len() % k == 0);
        Self {
            k,
            indices,
            distances,
        }
    }

    /// Number of points (rows).
    pub fn len(&self) -> usize {
        self.indices.len() / self.k
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Neighbors per point, the point itself included.
    pub fn k(&self) -> usize {
        self.k
    }

    /// Neighbor indices of point `i`.
    pub fn indices(&self, i: usize) -> &[usize] {
        &self.indices[i * self.k..(i + 1) * self.k]
    }

    /// Euclidean distances from point `i` to its neighbors.
    pub fn distances(&self, i: usize) -> &[f64] {
        &self.distances[i * self.k..(i + 1) * self.k]
    }
}
