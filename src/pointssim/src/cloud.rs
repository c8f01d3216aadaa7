//! Point cloud container with optional per-point attributes.

use crate::config::AttributeKind;
use crate::error::{Result, SsimError};

/// An index-ordered point cloud.
///
/// Geometry is mandatory. Normals, curvatures and colors are optional, and
/// when present must have exactly one row per point.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointCloud {
    /// Point coordinates.
    pub geometry: Vec<[f64; 3]>,
    /// Per-point normal vectors (not necessarily unit length).
    pub normals: Option<Vec<[f64; 3]>>,
    /// Per-point curvature values.
    pub curvatures: Option<Vec<f64>>,
    /// Per-point RGB colors in the 0-255 range.
    pub colors: Option<Vec<[u8; 3]>>,
}

impl PointCloud {
    /// Create a cloud from coordinates only.
    pub fn new(geometry: Vec<[f64; 3]>) -> Self {
        Self {
            geometry,
            ..Default::default()
        }
    }

    /// Create a cloud from single-precision coordinates.
    pub fn from_f32(points: &[[f32; 3]]) -> Self {
        Self::new(
            points
                .iter()
                .map(|p| [p[0] as f64, p[1] as f64, p[2] as f64])
                .collect(),
        )
    }

    pub fn with_normals(mut self, normals: Vec<[f64; 3]>) -> Self {
        self.normals = Some(normals);
        self
    }

    pub fn with_curvatures(mut self, curvatures: Vec<f64>) -> Self {
        self.curvatures = Some(curvatures);
        self
    }

    pub fn with_colors(mut self, colors: Vec<[u8; 3]>) -> Self {
        self.colors = Some(colors);
        self
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.geometry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.geometry.is_empty()
    }

    /// Whether the data backing `attribute` is present.
    pub fn has(&self, attribute: AttributeKind) -> bool {
        match attribute {
            AttributeKind::Geometry => true,
            AttributeKind::Normal => self.normals.is_some(),
            AttributeKind::Curvature => self.curvatures.is_some(),
            AttributeKind::Color => self.colors.is_some(),
        }
    }

    /// Check that the cloud is non-empty, has finite coordinates and that
    /// every present attribute is aligned with the geometry.
    pub fn validate(&self) -> Result<()> {
        if self.geometry.is_empty() {
            return Err(SsimError::EmptyCloud);
        }

        if let Some(index) = self
            .geometry
            .iter()
            .position(|p| !p.iter().all(|c| c.is_finite()))
        {
            return Err(SsimError::NonFiniteCoordinate { index });
        }

        let expected = self.len();
        let lengths = [
            (AttributeKind::Normal, self.normals.as_ref().map(Vec::len)),
            (
                AttributeKind::Curvature,
                self.curvatures.as_ref().map(Vec::len),
            ),
            (AttributeKind::Color, self.colors.as_ref().map(Vec::len)),
        ];
        for (attribute, actual) in lengths {
            match actual {
                Some(actual) if actual != expected => {
                    return Err(SsimError::AttributeLength {
                        attribute,
                        expected,
                        actual,
                    });
                }
                _ => {}
            }
        }

        Ok(())
    }
}
