//! KD-tree based neighbor search over point cloud geometry.
//!
//! The tree is built once per cloud and is read-only afterwards, so a single
//! index can serve queries from every rayon worker at once.
//!
//! # Usage
//!
//! ```ignore
//! let index = NeighborIndex::build(&cloud.geometry)?;
//! let nearest = index.nearest_n(&query_point, 12);
//! for (idx, distance) in nearest {
//!     // Process neighbor...
//! }
//! ```

use kiddo::immutable::float::kdtree::ImmutableKdTree;
use kiddo::SquaredEuclidean;
use rayon::prelude::*;
use tracing::debug;

use super::Neighborhoods;
use crate::error::{Result, SsimError};

/// Bucket size for the KD-tree.
///
/// Larger than the kiddo default to cope with voxelized clouds, where many
/// points share a coordinate on one axis.
const BUCKET_SIZE: usize = 256;

/// KD-tree based search structure for one point cloud.
#[derive(Debug)]
pub struct NeighborIndex {
    /// f64 coordinates, u64 items (point index), 3 dimensions.
    kdtree: ImmutableKdTree<f64, u64, 3, BUCKET_SIZE>,
    /// Indexed points, in input order.
    points: Vec<[f64; 3]>,
}

impl NeighborIndex {
    /// Build an index from point coordinates.
    ///
    /// The item stored for each point is its position in `points`.
    ///
    /// # Errors
    /// [`SsimError::EmptyCloud`] if `points` is empty and
    /// [`SsimError::NonFiniteCoordinate`] if a coordinate is NaN or infinite.
    pub fn build(points: &[[f64; 3]]) -> Result<Self> {
        if points.is_empty() {
            return Err(SsimError::EmptyCloud);
        }
        if let Some(index) = points
            .iter()
            .position(|p| !p.iter().all(|c| c.is_finite()))
        {
            return Err(SsimError::NonFiniteCoordinate { index });
        }

        let kdtree: ImmutableKdTree<f64, u64, 3, BUCKET_SIZE> = points.into();
        debug!(points = points.len(), "built neighbor index");

        Ok(Self {
            kdtree,
            points: points.to_vec(),
        })
    }

    /// Number of indexed points.
    pub fn len(&self) -> usize {
        self.kdtree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.kdtree.size() == 0
    }

    /// Indexed points, in input order.
    pub fn points(&self) -> &[[f64; 3]] {
        &self.points
    }

    /// Nearest indexed point to `point`, as `(index, distance)`.
    pub fn nearest_one(&self, point: &[f64; 3]) -> (usize, f64) {
        let nn = self.kdtree.nearest_one::<SquaredEuclidean>(point);
        (nn.item as usize, nn.distance.sqrt())
    }

    /// The `k` nearest indexed points, nearest first, as `(index, distance)`.
    pub fn nearest_n(&self, point: &[f64; 3], k: usize) -> Vec<(usize, f64)> {
        self.kdtree
            .nearest_n::<SquaredEuclidean>(point, k)
            .iter()
            .map(|nn| (nn.item as usize, nn.distance.sqrt()))
            .collect()
    }

    /// All indexed points within `radius` of `point`, nearest first, as
    /// `(index, distance)`.
    pub fn within(&self, point: &[f64; 3], radius: f64) -> Vec<(usize, f64)> {
        // Kiddo uses squared distance
        let radius_sq = radius * radius;
        self.kdtree
            .within::<SquaredEuclidean>(point, radius_sq)
            .iter()
            .map(|nn| (nn.item as usize, nn.distance.sqrt()))
            .collect()
    }

    /// Neighbors of point `index` of this cloud, itself first.
    ///
    /// The tree gives no ordering among equidistant points, so the self
    /// entry is moved to the front explicitly.
    pub fn self_nearest_n(&self, index: usize, k: usize) -> Vec<(usize, f64)> {
        let mut row = self.nearest_n(&self.points[index], k);
        match row.iter().position(|&(item, _)| item == index) {
            Some(0) => {}
            Some(pos) => row[..=pos].rotate_right(1),
            None => {
                row.insert(0, (index, 0.0));
                row.truncate(k);
            }
        }
        row
    }

    /// K-nearest neighborhoods of every indexed point, self included.
    ///
    /// # Errors
    /// [`SsimError::NeighborhoodTooLarge`] if `k` exceeds the number of points.
    pub fn neighborhoods(&self, k: usize) -> Result<Neighborhoods> {
        let n = self.len();
        if k > n {
            return Err(SsimError::NeighborhoodTooLarge { k, points: n });
        }

        let rows: Vec<Vec<(usize, f64)>> = (0..n)
            .into_par_iter()
            .map(|i| self.self_nearest_n(i, k))
            .collect();

        let mut indices = Vec::with_capacity(n * k);
        let mut distances = Vec::with_capacity(n * k);
        for row in rows {
            for (idx, dist) in row {
                indices.push(idx);
                distances.push(dist);
            }
        }

        Ok(Neighborhoods::from_flat(k, indices, distances))
    }
}
