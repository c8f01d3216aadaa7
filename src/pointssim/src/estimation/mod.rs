//! Normal and curvature estimation by local quadric fitting.
//!
//! Used when a cloud does not carry normals or curvatures of its own. Every
//! point is processed independently on the rayon pool:
//! 1. Neighborhood query (k-nearest or fixed radius), the point included
//! 2. Principal-axis frame from the neighborhood covariance
//! 3. Least-squares quadric height field in that frame
//! 4. Normal and curvature from the fitted coefficients
//!
//! Points whose neighborhood is degenerate get NaN normal and curvature;
//! this never fails the whole cloud.

pub mod quadric;

pub use quadric::{fit_point, LocalFrame, QuadricSurface, MIN_FIT_POINTS};

use nalgebra::Vector3;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, SsimError};
use crate::neighbors::NeighborIndex;

/// How the fitting neighborhood of a point is selected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NeighborSearch {
    /// The k nearest points, the point itself included.
    Knn(usize),
    /// All points within the given distance.
    Radius(f64),
}

impl Default for NeighborSearch {
    fn default() -> Self {
        Self::Knn(12)
    }
}

/// Configuration for quadric normal/curvature estimation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct QuadricFitConfig {
    pub search: NeighborSearch,
}

impl QuadricFitConfig {
    pub fn validate(&self) -> Result<()> {
        match self.search {
            NeighborSearch::Knn(k) if k < MIN_FIT_POINTS => Err(SsimError::Configuration(
                format!("quadric fit needs at least {MIN_FIT_POINTS} neighbors, got {k}"),
            )),
            NeighborSearch::Radius(r) if !(r.is_finite() && r > 0.0) => Err(
                SsimError::Configuration(format!("search radius must be positive, got {r}")),
            ),
            _ => Ok(()),
        }
    }
}

/// Estimated normals and curvatures, aligned with the input points.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalCurvature {
    /// Unit normals; NaN for degenerate points.
    pub normals: Vec<[f64; 3]>,
    /// Curvatures; NaN for degenerate points.
    pub curvatures: Vec<f64>,
    /// Number of degenerate points.
    pub num_failed: usize,
}

/// Estimate normals and curvatures of `points`.
///
/// # Errors
/// Configuration errors for an invalid `config`, input errors for an empty
/// or non-finite point set or a k larger than the cloud.
pub fn estimate_normals_curvatures(
    points: &[[f64; 3]],
    config: &QuadricFitConfig,
) -> Result<NormalCurvature> {
    config.validate()?;
    let index = NeighborIndex::build(points)?;
    estimate_with_index(&index, config)
}

/// Estimate normals and curvatures of the points held by `index`.
pub fn estimate_with_index(
    index: &NeighborIndex,
    config: &QuadricFitConfig,
) -> Result<NormalCurvature> {
    config.validate()?;
    let n = index.len();
    if let NeighborSearch::Knn(k) = config.search {
        if k > n {
            return Err(SsimError::NeighborhoodTooLarge { k, points: n });
        }
    }

    let points = index.points();
    let fits: Vec<Option<(Vector3<f64>, f64)>> = (0..n)
        .into_par_iter()
        .map(|i| {
            let neighbors = match config.search {
                NeighborSearch::Knn(k) => index.self_nearest_n(i, k),
                NeighborSearch::Radius(r) => index.within(&points[i], r),
            };
            let neighborhood: Vec<Vector3<f64>> = neighbors
                .iter()
                .map(|&(j, _)| Vector3::from(points[j]))
                .collect();
            fit_point(&Vector3::from(points[i]), &neighborhood)
        })
        .collect();

    let mut normals = Vec::with_capacity(n);
    let mut curvatures = Vec::with_capacity(n);
    let mut num_failed = 0;
    for fit in fits {
        match fit {
            Some((normal, curvature)) => {
                normals.push([normal.x, normal.y, normal.z]);
                curvatures.push(curvature);
            }
            None => {
                normals.push([f64::NAN; 3]);
                curvatures.push(f64::NAN);
                num_failed += 1;
            }
        }
    }

    if num_failed > 0 {
        warn!(
            failed = num_failed,
            total = n,
            "quadric fit degenerate for some points, recorded as NaN"
        );
    }
    debug!(points = n, search = ?config.search, "estimated normals and curvatures");

    Ok(NormalCurvature {
        normals,
        curvatures,
        num_failed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{make_sphere_surface, make_xy_plane};
    use approx::assert_relative_eq;

    #[test]
    fn test_planar_patch() {
        let points = make_xy_plane(2.0, 0.25, 0.5);
        let config = QuadricFitConfig {
            search: NeighborSearch::Knn(9),
        };
        let result = estimate_normals_curvatures(&points, &config).unwrap();

        assert_eq!(result.num_failed, 0);
        assert_eq!(result.normals.len(), points.len());
        for (normal, curvature) in result.normals.iter().zip(&result.curvatures) {
            assert_relative_eq!(normal[0], 0.0, epsilon = 1e-9);
            assert_relative_eq!(normal[1], 0.0, epsilon = 1e-9);
            assert_relative_eq!(normal[2].abs(), 1.0, epsilon = 1e-9);
            assert_relative_eq!(*curvature, 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_sphere_surface() {
        let cloud = make_sphere_surface(1.0, 2000);
        let config = QuadricFitConfig {
            search: NeighborSearch::Knn(20),
        };
        let result = estimate_normals_curvatures(&cloud.geometry, &config).unwrap();
        assert_eq!(result.num_failed, 0);

        let truth = cloud.normals.as_ref().unwrap();
        for i in 0..cloud.len() {
            let est = Vector3::from(result.normals[i]);
            let exp = Vector3::from(truth[i]);
            assert!(est.dot(&exp).abs() > 0.99, "normal {i} off: {est:?}");
            assert_relative_eq!(result.curvatures[i].abs(), 1.0, epsilon = 0.1);
        }
    }

    #[test]
    fn test_degenerate_neighborhoods_are_nan() {
        // A plane plus a far away line of points and one isolated point.
        let mut points = make_xy_plane(2.0, 0.25, 0.0);
        let plane_len = points.len();
        for i in 0..5 {
            points.push([10.0 + i as f64, 10.0, 10.0]);
        }
        points.push([-50.0, -50.0, -50.0]);

        let config = QuadricFitConfig {
            search: NeighborSearch::Radius(1.5),
        };
        let result = estimate_normals_curvatures(&points, &config).unwrap();

        assert_eq!(result.num_failed, 6);
        for i in 0..plane_len {
            assert!(result.curvatures[i].is_finite());
            assert_relative_eq!(result.normals[i][2].abs(), 1.0, epsilon = 1e-9);
        }
        for i in plane_len..points.len() {
            assert!(result.curvatures[i].is_nan());
            assert!(result.normals[i].iter().all(|c| c.is_nan()));
        }
    }

    #[test]
    fn test_knn_larger_than_cloud() {
        let points = make_xy_plane(1.0, 0.5, 0.0);
        let config = QuadricFitConfig {
            search: NeighborSearch::Knn(20),
        };
        assert_eq!(
            estimate_normals_curvatures(&points, &config).unwrap_err(),
            SsimError::NeighborhoodTooLarge { k: 20, points: 9 }
        );
    }

    #[test]
    fn test_invalid_config() {
        let config = QuadricFitConfig {
            search: NeighborSearch::Knn(3),
        };
        assert!(config.validate().unwrap_err().is_configuration());

        let config = QuadricFitConfig {
            search: NeighborSearch::Radius(f64::NAN),
        };
        assert!(config.validate().unwrap_err().is_configuration());

        assert!(QuadricFitConfig::default().validate().is_ok());
    }
}
