//! Error types for point cloud similarity scoring.
//!
//! Only configuration and input problems are errors. Numerical degeneracy in
//! per-point computations is recorded as NaN in the output instead.

use thiserror::Error;

use crate::config::AttributeKind;

/// Result type alias
pub type Result<T> = std::result::Result<T, SsimError>;

/// Point cloud similarity error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SsimError {
    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Unknown estimator: {0:?}")]
    UnknownEstimator(String),

    #[error("Unknown pooling method: {0:?}")]
    UnknownPooling(String),

    #[error("Unknown attribute: {0:?}")]
    UnknownAttribute(String),

    #[error("Unknown reference mode: {0:?}")]
    UnknownReference(String),

    /// A requested attribute is not present on one of the clouds
    #[error("Attribute {attribute} requested but missing on cloud {cloud}")]
    MissingAttribute {
        attribute: AttributeKind,
        cloud: &'static str,
    },

    /// Point set without any points
    #[error("Point cloud is empty")]
    EmptyCloud,

    #[error("Non-finite coordinate at point {index}")]
    NonFiniteCoordinate { index: usize },

    /// Attribute array not aligned with geometry
    #[error("Attribute {attribute} has {actual} rows, expected {expected}")]
    AttributeLength {
        attribute: AttributeKind,
        expected: usize,
        actual: usize,
    },

    #[error("Neighborhood size {k} exceeds the {points} available points")]
    NeighborhoodTooLarge { k: usize, points: usize },
}

impl SsimError {
    /// Whether this error stems from the configuration rather than the data.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::Configuration(_)
                | Self::UnknownEstimator(_)
                | Self::UnknownPooling(_)
                | Self::UnknownAttribute(_)
                | Self::UnknownReference(_)
                | Self::MissingAttribute { .. }
        )
    }

    /// Whether this error stems from the supplied point data.
    pub fn is_input(&self) -> bool {
        !self.is_configuration()
    }
}
