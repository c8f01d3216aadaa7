//! Per-point local quantities and the feature maps derived from them.
//!
//! For each attribute a point's neighborhood is turned into a row of local
//! quantities (distances, normal similarities, curvatures or luminances).
//! Every row is then reduced to one scalar per estimator, giving one feature
//! map per estimator.

pub mod estimators;
pub mod quantities;

pub use estimators::{extract, feature_maps, Estimator};
pub use quantities::{local_quantities, QuantityMatrix};
