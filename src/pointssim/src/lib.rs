//! Structural similarity scoring for 3-D point clouds.
//!
//! Two point clouds are compared attribute by attribute (geometry, normals,
//! curvature, color luminance). For every point a neighborhood-level statistic
//! is computed, points are associated with their nearest counterpart in the
//! other cloud, and the relative differences of the statistics are pooled into
//! similarity scores in [0, 1], where 1 means structurally identical.
//!
//! # Architecture
//!
//! The pipeline is split into stages:
//! - Neighborhoods: K-nearest neighbors of every point (kd-tree)
//! - Association: nearest point of the other cloud, both directions
//! - Local quantities: per-neighbor distances, normal similarities,
//!   curvatures or luminances
//! - Feature maps: one dispersion statistic per point and estimator
//! - Error maps and pooling: per-point relative error, reduced to scores
//!
//! Normals and curvatures that a cloud does not carry can be estimated by
//! local quadric fitting ([`estimation`]).
//!
//! # Usage
//!
//! ```ignore
//! use pointssim::{AttributeKind, Estimator, Pooling, PointCloud, PointSsim, SsimConfig};
//!
//! let reference = PointCloud::new(load_points("reference.ply")).with_colors(load_colors());
//! let distorted = PointCloud::new(load_points("distorted.ply")).with_colors(load_colors());
//!
//! let config = SsimConfig::builder()
//!     .attributes([AttributeKind::Geometry, AttributeKind::Color])
//!     .estimators([Estimator::Variance])
//!     .poolings([Pooling::Mean])
//!     .neighborhood_size(12)
//!     .build()?;
//!
//! let results = PointSsim::new(config)?.compute(&reference, &distorted)?;
//! for (attribute, scores) in results.iter() {
//!     if let Some(sym) = &scores.sym {
//!         println!("{attribute}: {}", sym.value(0, 0));
//!     }
//! }
//! ```

pub mod cloud;
pub mod color;
pub mod config;
pub mod error;
pub mod estimation;
pub mod features;
pub mod neighbors;
pub mod scoring;
pub mod test_utils;

pub use cloud::PointCloud;
pub use color::{luminance_channel, rgb_to_luminance};
pub use config::{AttributeKind, ReferenceMode, SsimConfig, SsimConfigBuilder};
pub use error::{Result, SsimError};
pub use estimation::{
    estimate_normals_curvatures, NeighborSearch, NormalCurvature, QuadricFitConfig,
};
pub use features::{feature_maps, local_quantities, Estimator, QuantityMatrix};
pub use neighbors::{associate, NeighborIndex, Neighborhoods};

// High-level API
pub use scoring::{
    compute_pointssim, error_map, pool, similarity_map, AttributeScores, PointSsim, Pooling,
    ScoreTable, SimilarityMaps, SsimResults,
};
