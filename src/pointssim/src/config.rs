//! Scoring configuration.
//!
//! [`SsimConfig`] is an immutable value validated once before any
//! computation. Names accepted from text (`FromStr`, serde) are closed sets;
//! anything else is a configuration error.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SsimError};
use crate::estimation::{NeighborSearch, QuadricFitConfig};
use crate::features::Estimator;
use crate::scoring::Pooling;

/// Point attribute that can be scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum AttributeKind {
    Geometry,
    Normal,
    Curvature,
    Color,
}

impl AttributeKind {
    pub const ALL: [AttributeKind; 4] = [
        AttributeKind::Geometry,
        AttributeKind::Normal,
        AttributeKind::Curvature,
        AttributeKind::Color,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Geometry => "geometry",
            Self::Normal => "normal",
            Self::Curvature => "curvature",
            Self::Color => "color",
        }
    }

    /// Whether the self entry of each neighborhood is dropped before
    /// computing local quantities. Distances and angles to the point itself
    /// are trivially 0 and 1.
    pub fn excludes_self(self) -> bool {
        matches!(self, Self::Geometry | Self::Normal)
    }
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AttributeKind {
    type Err = SsimError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "geometry" | "geom" => Ok(Self::Geometry),
            "normal" | "norm" | "normals" => Ok(Self::Normal),
            "curvature" | "curv" => Ok(Self::Curvature),
            "color" | "colour" | "luma" | "luminance" => Ok(Self::Color),
            _ => Err(SsimError::UnknownAttribute(s.to_string())),
        }
    }
}

impl TryFrom<String> for AttributeKind {
    type Error = SsimError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

/// Which cloud(s) serve as reference when computing error maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum ReferenceMode {
    /// Both directions, plus the symmetric (worst-case) score.
    #[default]
    Symmetric,
    /// A is the reference; only the "B given A" score is computed.
    ReferenceA,
    /// B is the reference; only the "A given B" score is computed.
    ReferenceB,
}

impl ReferenceMode {
    /// Whether the score of B with A as reference is computed.
    pub fn computes_ba(self) -> bool {
        matches!(self, Self::Symmetric | Self::ReferenceA)
    }

    /// Whether the score of A with B as reference is computed.
    pub fn computes_ab(self) -> bool {
        matches!(self, Self::Symmetric | Self::ReferenceB)
    }
}

impl FromStr for ReferenceMode {
    type Err = SsimError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "symmetric" | "both" | "0" => Ok(Self::Symmetric),
            "reference_a" | "a" | "1" => Ok(Self::ReferenceA),
            "reference_b" | "b" | "2" => Ok(Self::ReferenceB),
            _ => Err(SsimError::UnknownReference(s.to_string())),
        }
    }
}

impl TryFrom<String> for ReferenceMode {
    type Error = SsimError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

/// Configuration for point cloud similarity scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SsimConfig {
    /// Attributes to score.
    pub attributes: Vec<AttributeKind>,

    /// Dispersion estimators; each produces its own feature map.
    pub estimators: Vec<Estimator>,

    /// Pooling methods applied to every similarity map.
    pub poolings: Vec<Pooling>,

    /// Number of neighbors per point, the point itself included.
    pub neighborhood_size: usize,

    /// Added to the error-map denominator to avoid 0/0.
    pub constant: f64,

    /// Reference direction(s).
    pub reference: ReferenceMode,

    /// When set, normals and curvatures missing from a cloud are estimated
    /// by local quadric fitting. When `None`, requesting an absent attribute
    /// is a configuration error.
    pub estimation: Option<QuadricFitConfig>,

    /// Keep the per-point similarity maps in the results.
    pub retain_maps: bool,
}

impl Default for SsimConfig {
    fn default() -> Self {
        Self {
            attributes: vec![AttributeKind::Geometry],
            estimators: vec![Estimator::Variance],
            poolings: vec![Pooling::Mean],
            neighborhood_size: 12,
            constant: f64::EPSILON,
            reference: ReferenceMode::Symmetric,
            estimation: None,
            retain_maps: false,
        }
    }
}

impl SsimConfig {
    /// Create a builder for configuring a run.
    pub fn builder() -> SsimConfigBuilder {
        SsimConfigBuilder::new()
    }

    /// Reject invalid combinations before any computation starts.
    pub fn validate(&self) -> Result<()> {
        if self.attributes.is_empty() {
            return Err(SsimError::Configuration(
                "at least one attribute must be enabled".into(),
            ));
        }
        if self.estimators.is_empty() {
            return Err(SsimError::Configuration(
                "at least one estimator is required".into(),
            ));
        }
        if self.poolings.is_empty() {
            return Err(SsimError::Configuration(
                "at least one pooling method is required".into(),
            ));
        }
        // Geometry and normal drop the self entry and need one real neighbor.
        if self.neighborhood_size < 2 {
            return Err(SsimError::Configuration(format!(
                "neighborhood size must be at least 2, got {}",
                self.neighborhood_size
            )));
        }
        if !self.constant.is_finite() || self.constant < 0.0 {
            return Err(SsimError::Configuration(format!(
                "error-map constant must be finite and non-negative, got {}",
                self.constant
            )));
        }
        if let Some(estimation) = &self.estimation {
            estimation.validate()?;
        }
        Ok(())
    }

    /// Attributes in scoring order, without duplicates.
    pub fn enabled_attributes(&self) -> Vec<AttributeKind> {
        AttributeKind::ALL
            .into_iter()
            .filter(|a| self.attributes.contains(a))
            .collect()
    }
}

/// Builder for [`SsimConfig`].
#[derive(Debug, Clone, Default)]
pub struct SsimConfigBuilder {
    config: SsimConfig,
}

impl SsimConfigBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attributes(mut self, attributes: impl IntoIterator<Item = AttributeKind>) -> Self {
        self.config.attributes = attributes.into_iter().collect();
        self
    }

    pub fn estimators(mut self, estimators: impl IntoIterator<Item = Estimator>) -> Self {
        self.config.estimators = estimators.into_iter().collect();
        self
    }

    pub fn poolings(mut self, poolings: impl IntoIterator<Item = Pooling>) -> Self {
        self.config.poolings = poolings.into_iter().collect();
        self
    }

    /// Set the neighborhood size K (the point itself included).
    pub fn neighborhood_size(mut self, k: usize) -> Self {
        self.config.neighborhood_size = k;
        self
    }

    /// Set the error-map stabilizing constant.
    pub fn constant(mut self, constant: f64) -> Self {
        self.config.constant = constant;
        self
    }

    pub fn reference(mut self, reference: ReferenceMode) -> Self {
        self.config.reference = reference;
        self
    }

    /// Estimate missing normals/curvatures with the given neighborhood search.
    pub fn estimate_missing(mut self, search: NeighborSearch) -> Self {
        self.config.estimation = Some(QuadricFitConfig { search });
        self
    }

    pub fn retain_maps(mut self, retain: bool) -> Self {
        self.config.retain_maps = retain;
        self
    }

    /// Validate and build the configuration.
    pub fn build(self) -> Result<SsimConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
