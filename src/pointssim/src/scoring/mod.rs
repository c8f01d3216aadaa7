//! Error maps, pooling and the end-to-end scoring pipeline.
//!
//! This module turns pairs of feature maps into similarity scores:
//! - **Error map**: relative difference between a point's feature and the
//!   feature of its associated point in the reference cloud
//! - **Pooling**: reduction of a per-point similarity map to one score
//! - **Pipeline**: per attribute, estimator, pooling method and reference
//!   direction, assembled into [`SsimResults`]

pub mod error_map;
pub mod pipeline;
pub mod pooling;

pub use error_map::{error_map, relative_error, similarity_map};
pub use pipeline::{
    compute_pointssim, AttributeScores, PointSsim, ScoreTable, SimilarityMaps, SsimResults,
};
pub use pooling::{pool, Pooling};
