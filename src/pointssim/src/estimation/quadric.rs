//! Local quadric surface fitting.
//!
//! A neighborhood is expressed in its principal-axis frame (largest variance
//! along local x, smallest along local z) and a height field
//! `z = p20·x² + p11·xy + p10·x + p02·y² + p01·y + p00` is fitted by least
//! squares. The surface normal and curvature at the origin follow from the
//! coefficients.

use nalgebra::{DMatrix, DVector, Matrix3, Vector3};

/// Minimum points for a determined quadric fit.
pub const MIN_FIT_POINTS: usize = 6;

/// Smallest accepted ratio of the middle to the largest covariance
/// eigenvalue. Below it the neighborhood is collinear and the tangent plane
/// is undefined.
const MIN_PLANARITY_RATIO: f64 = 1e-12;

/// Orthonormal frame of a neighborhood from its principal axes.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalFrame {
    /// Neighborhood centroid.
    pub centroid: Vector3<f64>,
    /// Columns are the principal axes, by decreasing variance.
    pub basis: Matrix3<f64>,
}

impl LocalFrame {
    /// Principal-axis frame of `points`.
    ///
    /// Returns `None` if there are fewer than 2 points, the covariance is not
    /// finite, the eigen-decomposition does not converge, or the points are
    /// collinear or coincident.
    pub fn from_points(points: &[Vector3<f64>]) -> Option<Self> {
        if points.len() < 2 {
            return None;
        }

        let n = points.len() as f64;
        let centroid = points.iter().sum::<Vector3<f64>>() / n;

        let mut covariance = Matrix3::zeros();
        for p in points {
            let d = p - centroid;
            covariance += d * d.transpose();
        }
        covariance /= n - 1.0;

        if !covariance.iter().all(|c| c.is_finite()) {
            return None;
        }

        let eigen = covariance.try_symmetric_eigen(f64::EPSILON, 1000)?;
        if !eigen.eigenvalues.iter().all(|ev| ev.is_finite()) {
            return None;
        }

        // Sort axes by decreasing eigenvalue
        let mut order = [0usize, 1, 2];
        order.sort_by(|&a, &b| eigen.eigenvalues[b].total_cmp(&eigen.eigenvalues[a]));

        let largest = eigen.eigenvalues[order[0]];
        let middle = eigen.eigenvalues[order[1]];
        if largest <= 0.0 || middle <= largest * MIN_PLANARITY_RATIO {
            return None;
        }

        let basis = Matrix3::from_columns(&[
            eigen.eigenvectors.column(order[0]).into_owned(),
            eigen.eigenvectors.column(order[1]).into_owned(),
            eigen.eigenvectors.column(order[2]).into_owned(),
        ]);

        Some(Self { centroid, basis })
    }

    /// Coordinates of `point` in this frame.
    pub fn to_local(&self, point: &Vector3<f64>) -> Vector3<f64> {
        self.basis.transpose() * (point - self.centroid)
    }

    /// Rotate a local direction back into the original frame.
    pub fn to_global_direction(&self, direction: &Vector3<f64>) -> Vector3<f64> {
        self.basis * direction
    }
}

/// Coefficients of `z = p20·x² + p11·xy + p10·x + p02·y² + p01·y + p00`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadricSurface {
    pub p20: f64,
    pub p11: f64,
    pub p10: f64,
    pub p02: f64,
    pub p01: f64,
    pub p00: f64,
}

impl QuadricSurface {
    /// Least-squares fit to points given in a local frame.
    ///
    /// Returns `None` when the design matrix is rank deficient (fewer than
    /// six points, or points not spreading over the plane) or the solution is
    /// not finite.
    pub fn fit(points: &[Vector3<f64>]) -> Option<Self> {
        let n = points.len();
        if n < MIN_FIT_POINTS {
            return None;
        }

        let design = DMatrix::from_fn(n, 6, |row, col| {
            let p = &points[row];
            match col {
                0 => p.x * p.x,
                1 => p.x * p.y,
                2 => p.x,
                3 => p.y * p.y,
                4 => p.y,
                _ => 1.0,
            }
        });
        let heights = DVector::from_iterator(n, points.iter().map(|p| p.z));

        let svd = design.svd(true, true);
        let max_sv = svd.singular_values.max();
        if !max_sv.is_finite() || max_sv <= 0.0 {
            return None;
        }
        let tolerance = max_sv * n as f64 * f64::EPSILON;
        if svd.rank(tolerance) < 6 {
            return None;
        }

        let coeffs = svd.solve(&heights, tolerance).ok()?;
        if !coeffs.iter().all(|c| c.is_finite()) {
            return None;
        }

        Some(Self {
            p20: coeffs[0],
            p11: coeffs[1],
            p10: coeffs[2],
            p02: coeffs[3],
            p01: coeffs[4],
            p00: coeffs[5],
        })
    }

    /// Unit normal of the surface at the local origin.
    pub fn normal(&self) -> Vector3<f64> {
        Vector3::new(-self.p10, -self.p01, 1.0).normalize()
    }

    /// Curvature of the surface at the local origin.
    pub fn curvature(&self) -> f64 {
        let (p20, p11, p10, p02, p01) = (self.p20, self.p11, self.p10, self.p02, self.p01);
        ((1.0 + p10 * p10) * p20 + (1.0 + p01 * p01) * p02 - 4.0 * p20 * p02 * p11)
            / (1.0 + p01 * p01 + p10 * p10).powf(1.5)
    }
}

/// Normal and curvature at `query` from its neighborhood (query included).
///
/// Returns `None` for degenerate neighborhoods.
pub fn fit_point(
    query: &Vector3<f64>,
    neighborhood: &[Vector3<f64>],
) -> Option<(Vector3<f64>, f64)> {
    let frame = LocalFrame::from_points(neighborhood)?;

    let origin = frame.to_local(query);
    let local: Vec<Vector3<f64>> = neighborhood
        .iter()
        .map(|p| frame.to_local(p) - origin)
        .collect();

    let surface = QuadricSurface::fit(&local)?;

    let normal = frame.to_global_direction(&surface.normal()).normalize();
    let curvature = surface.curvature();
    if !normal.iter().all(|c| c.is_finite()) || !curvature.is_finite() {
        return None;
    }

    Some((normal, curvature))
}
