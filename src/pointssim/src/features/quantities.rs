//! Local-quantity matrices.

use std::f64::consts::FRAC_2_PI;

use nalgebra::Vector3;
use rayon::prelude::*;

use crate::cloud::PointCloud;
use crate::color::luminance_channel;
use crate::config::AttributeKind;
use crate::error::{Result, SsimError};
use crate::neighbors::Neighborhoods;

/// Row-major `[rows * cols]` matrix of local quantities, one row per point.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantityMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl QuantityMatrix {
    /// Wrap a flat row-major buffer of `rows * cols` values.
    pub(crate) fn from_flat(rows: usize, cols: usize, data: Vec<f64>) -> Self {
        debug_assert_eq!(data.len(), rows * cols, "buffer does not match shape");
        Self { rows, cols, data }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Quantities of point `i`.
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }
}

/// Build the local-quantity matrix of `attribute` for every point of `cloud`.
///
/// Geometry and normal rows skip the self entry of the neighborhood and have
/// `K - 1` columns. Curvature and color rows keep it and have `K` columns.
///
/// # Errors
/// [`SsimError::MissingAttribute`] if the cloud lacks the attribute data.
pub fn local_quantities(
    attribute: AttributeKind,
    cloud: &PointCloud,
    neighborhoods: &Neighborhoods,
    cloud_label: &'static str,
) -> Result<QuantityMatrix> {
    let missing = || SsimError::MissingAttribute {
        attribute,
        cloud: cloud_label,
    };

    let skip = usize::from(attribute.excludes_self());
    let rows = neighborhoods.len();
    let cols = neighborhoods.k() - skip;

    let data: Vec<f64> = match attribute {
        AttributeKind::Geometry => (0..rows)
            .into_par_iter()
            .flat_map_iter(|i| neighborhoods.distances(i)[skip..].to_vec())
            .collect(),
        AttributeKind::Normal => {
            let normals = cloud.normals.as_ref().ok_or_else(missing)?;
            (0..rows)
                .into_par_iter()
                .flat_map_iter(|i| {
                    let n_i = &normals[i];
                    neighborhoods.indices(i)[skip..]
                        .iter()
                        .map(|&j| normal_similarity(n_i, &normals[j]))
                        .collect::<Vec<_>>()
                })
                .collect()
        }
        AttributeKind::Curvature => {
            let curvatures = cloud.curvatures.as_ref().ok_or_else(missing)?;
            gather(neighborhoods, skip, curvatures)
        }
        AttributeKind::Color => {
            let colors = cloud.colors.as_ref().ok_or_else(missing)?;
            let luma = luminance_channel(colors);
            gather(neighborhoods, skip, &luma)
        }
    };

    Ok(QuantityMatrix::from_flat(rows, cols, data))
}

/// Per-point scalar of every neighbor, row by row.
fn gather(neighborhoods: &Neighborhoods, skip: usize, values: &[f64]) -> Vec<f64> {
    (0..neighborhoods.len())
        .into_par_iter()
        .flat_map_iter(|i| {
            neighborhoods.indices(i)[skip..]
                .iter()
                .map(|&j| values[j])
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Angular similarity of two normals, in [0, 1].
///
/// `1 - (2/π)·acos(|n_a·n_b| / (|n_a||n_b|))`. The orientation of a normal is
/// ignored. Zero-length or NaN normals give NaN.
pub fn normal_similarity(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    let va = Vector3::from(*a);
    let vb = Vector3::from(*b);
    let cos = va.dot(&vb).abs() / (va.norm() * vb.norm());
    // Rounding can push |cos| just past 1; clamp keeps NaN as NaN.
    1.0 - FRAC_2_PI * cos.clamp(-1.0, 1.0).acos()
}
