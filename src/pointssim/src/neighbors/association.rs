//! Nearest-point association between two clouds.
//!
//! Each direction is computed on its own: the map from B to A is in general
//! not the inverse of the map from A to B.

use rayon::prelude::*;

use super::NeighborIndex;

/// For every query point, the index of its nearest point in `source`.
///
/// Ties are resolved by whichever point the index returns first.
pub fn associate(source: &NeighborIndex, query: &[[f64; 3]]) -> Vec<usize> {
    query
        .par_iter()
        .map(|point| source.nearest_one(point).0)
        .collect()
}
