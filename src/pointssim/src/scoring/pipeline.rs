//! End-to-end structural similarity between two point clouds.
//!
//! One run of [`PointSsim::compute`]:
//! 1. Validate both clouds
//! 2. Build one neighbor index per cloud
//! 3. Estimate missing normals/curvatures (when configured)
//! 4. Form the K-neighborhoods of every point and associate each point with
//!    its nearest point in the other cloud
//! 5. Per attribute: local quantities, feature maps, similarity maps, pooling
//!
//! The "BA" score rates B against A as the reference, "AB" rates A against B,
//! and the symmetric score keeps the lower of the two for every entry.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, warn};

use super::error_map::similarity_map;
use super::pooling::{pool, Pooling};
use crate::cloud::PointCloud;
use crate::config::{AttributeKind, SsimConfig};
use crate::error::{Result, SsimError};
use crate::estimation::estimate_with_index;
use crate::features::{feature_maps, local_quantities, Estimator};
use crate::neighbors::{associate, NeighborIndex, Neighborhoods};

/// Pooled similarity scores of one direction, estimators × pooling methods.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreTable {
    estimators: Vec<Estimator>,
    poolings: Vec<Pooling>,
    /// Row-major `[estimators * poolings]`.
    values: Vec<f64>,
}

impl ScoreTable {
    fn from_fn(
        estimators: &[Estimator],
        poolings: &[Pooling],
        mut f: impl FnMut(usize, usize) -> f64,
    ) -> Self {
        let mut values = Vec::with_capacity(estimators.len() * poolings.len());
        for e in 0..estimators.len() {
            for p in 0..poolings.len() {
                values.push(f(e, p));
            }
        }
        Self {
            estimators: estimators.to_vec(),
            poolings: poolings.to_vec(),
            values,
        }
    }

    pub fn estimators(&self) -> &[Estimator] {
        &self.estimators
    }

    pub fn poolings(&self) -> &[Pooling] {
        &self.poolings
    }

    /// Score at row `e` (estimator) and column `p` (pooling method).
    pub fn value(&self, e: usize, p: usize) -> f64 {
        self.values[e * self.poolings.len() + p]
    }

    /// Score for an estimator and pooling method, if both were configured.
    pub fn get(&self, estimator: Estimator, pooling: Pooling) -> Option<f64> {
        let e = self.estimators.iter().position(|&x| x == estimator)?;
        let p = self.poolings.iter().position(|&x| x == pooling)?;
        Some(self.value(e, p))
    }

    /// All entries with their labels, row by row.
    pub fn iter(&self) -> impl Iterator<Item = (Estimator, Pooling, f64)> + '_ {
        let cols = self.poolings.len();
        self.values
            .iter()
            .enumerate()
            .map(move |(i, &v)| (self.estimators[i / cols], self.poolings[i % cols], v))
    }

    /// Element-wise minimum of two tables with the same layout.
    ///
    /// An entry that is NaN in either table stays NaN.
    pub fn min(&self, other: &ScoreTable) -> ScoreTable {
        debug_assert_eq!(self.estimators, other.estimators);
        debug_assert_eq!(self.poolings, other.poolings);
        let values = self
            .values
            .iter()
            .zip(&other.values)
            .map(|(&a, &b)| if a.is_nan() || b.is_nan() { f64::NAN } else { a.min(b) })
            .collect();
        ScoreTable {
            estimators: self.estimators.clone(),
            poolings: self.poolings.clone(),
            values,
        }
    }
}

/// Per-point similarity maps of one direction, one per estimator.
///
/// Each map is aligned with the points of the cloud being rated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarityMaps {
    estimators: Vec<Estimator>,
    maps: Vec<Vec<f64>>,
}

impl SimilarityMaps {
    pub fn get(&self, estimator: Estimator) -> Option<&[f64]> {
        let e = self.estimators.iter().position(|&x| x == estimator)?;
        Some(&self.maps[e])
    }

    pub fn iter(&self) -> impl Iterator<Item = (Estimator, &[f64])> + '_ {
        self.estimators
            .iter()
            .copied()
            .zip(self.maps.iter().map(Vec::as_slice))
    }
}

/// Scores of one attribute. Entries are `None` when the reference mode did
/// not ask for them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeScores {
    /// B rated against A as the reference.
    pub ba: Option<ScoreTable>,
    /// A rated against B as the reference.
    pub ab: Option<ScoreTable>,
    /// Element-wise minimum of `ba` and `ab`.
    pub sym: Option<ScoreTable>,
    /// Similarity maps over the points of B, when retained.
    pub ba_maps: Option<SimilarityMaps>,
    /// Similarity maps over the points of A, when retained.
    pub ab_maps: Option<SimilarityMaps>,
}

/// Scores of every enabled attribute.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SsimResults {
    scores: BTreeMap<AttributeKind, AttributeScores>,
}

impl SsimResults {
    pub fn get(&self, attribute: AttributeKind) -> Option<&AttributeScores> {
        self.scores.get(&attribute)
    }

    /// Attributes and their scores, in attribute order.
    pub fn iter(&self) -> impl Iterator<Item = (AttributeKind, &AttributeScores)> + '_ {
        self.scores.iter().map(|(&k, v)| (k, v))
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Convert to JSON string. NaN scores become `null`.
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Convert to pretty JSON string.
    pub fn to_json_pretty(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Point cloud structural similarity scorer.
///
/// Holds a validated configuration; every call to [`compute`](Self::compute)
/// is independent.
///
/// # Example
/// ```
/// use pointssim::{AttributeKind, PointCloud, PointSsim, SsimConfig};
///
/// let points: Vec<[f64; 3]> = (0..64)
///     .map(|i| [(i % 8) as f64, (i / 8) as f64, ((i * 7) % 5) as f64 * 0.1])
///     .collect();
/// let a = PointCloud::new(points.clone());
/// let b = PointCloud::new(points);
///
/// let scorer = PointSsim::new(SsimConfig::default()).unwrap();
/// let results = scorer.compute(&a, &b).unwrap();
/// let sym = results.get(AttributeKind::Geometry).unwrap().sym.as_ref().unwrap();
/// assert_eq!(sym.value(0, 0), 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct PointSsim {
    config: SsimConfig,
}

impl PointSsim {
    /// Create a scorer.
    ///
    /// # Errors
    /// Returns a configuration error if `config` is invalid.
    pub fn new(config: SsimConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SsimConfig {
        &self.config
    }

    /// Score cloud `b` against cloud `a` (and vice versa, per reference mode).
    ///
    /// # Errors
    /// - Configuration errors when a requested attribute is missing and
    ///   estimation is disabled
    /// - Input errors for empty or non-finite clouds, misaligned attributes,
    ///   or a neighborhood size larger than either cloud
    pub fn compute(&self, a: &PointCloud, b: &PointCloud) -> Result<SsimResults> {
        let config = &self.config;
        let attributes = config.enabled_attributes();

        a.validate()?;
        b.validate()?;
        for (cloud, label) in [(a, "A"), (b, "B")] {
            check_attributes(cloud, label, &attributes, config)?;
        }
        let k = config.neighborhood_size;
        for cloud in [a, b] {
            if k > cloud.len() {
                return Err(SsimError::NeighborhoodTooLarge {
                    k,
                    points: cloud.len(),
                });
            }
        }

        let start = Instant::now();
        let index_a = NeighborIndex::build(&a.geometry)?;
        let index_b = NeighborIndex::build(&b.geometry)?;

        let a = prepare_cloud(a, &index_a, &attributes, config)?;
        let b = prepare_cloud(b, &index_b, &attributes, config)?;

        let neighborhoods_a = index_a.neighborhoods(k)?;
        let neighborhoods_b = index_b.neighborhoods(k)?;

        let reference = config.reference;
        let ba_association = reference
            .computes_ba()
            .then(|| associate(&index_a, &b.geometry));
        let ab_association = reference
            .computes_ab()
            .then(|| associate(&index_b, &a.geometry));
        debug!(
            points_a = a.len(),
            points_b = b.len(),
            k,
            ?reference,
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "neighborhoods and associations ready"
        );

        let sides = Sides {
            a: &a,
            b: &b,
            neighborhoods_a: &neighborhoods_a,
            neighborhoods_b: &neighborhoods_b,
            ba_association: ba_association.as_deref(),
            ab_association: ab_association.as_deref(),
        };

        let mut scores = BTreeMap::new();
        for attribute in attributes {
            let start = Instant::now();
            let entry = self.score_attribute(attribute, &sides)?;
            debug!(
                %attribute,
                elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
                "attribute scored"
            );
            scores.insert(attribute, entry);
        }

        Ok(SsimResults { scores })
    }

    fn score_attribute(
        &self,
        attribute: AttributeKind,
        sides: &Sides<'_>,
    ) -> Result<AttributeScores> {
        let config = &self.config;

        let quantities_a = local_quantities(attribute, sides.a, sides.neighborhoods_a, "A")?;
        let quantities_b = local_quantities(attribute, sides.b, sides.neighborhoods_b, "B")?;
        let features_a = feature_maps(&quantities_a, &config.estimators);
        let features_b = feature_maps(&quantities_b, &config.estimators);

        let ba = sides
            .ba_association
            .map(|assoc| self.rate(attribute, "BA", &features_b, &features_a, assoc));
        let ab = sides
            .ab_association
            .map(|assoc| self.rate(attribute, "AB", &features_a, &features_b, assoc));

        let (ba, ba_maps) = split(ba);
        let (ab, ab_maps) = split(ab);
        let sym = match (&ba, &ab) {
            (Some(ba), Some(ab)) => Some(ba.min(ab)),
            _ => None,
        };

        Ok(AttributeScores {
            ba,
            ab,
            sym,
            ba_maps,
            ab_maps,
        })
    }

    /// Rate `query` features against the associated `reference` features.
    fn rate(
        &self,
        attribute: AttributeKind,
        direction: &str,
        query: &[Vec<f64>],
        reference: &[Vec<f64>],
        association: &[usize],
    ) -> (ScoreTable, Option<SimilarityMaps>) {
        let config = &self.config;
        let maps: Vec<Vec<f64>> = query
            .iter()
            .zip(reference)
            .map(|(q, r)| similarity_map(q, r, association, config.constant))
            .collect();

        let table = ScoreTable::from_fn(&config.estimators, &config.poolings, |e, p| {
            pool(&maps[e], config.poolings[p])
        });
        for (estimator, pooling, value) in table.iter() {
            if value.is_nan() {
                warn!(
                    %attribute,
                    direction,
                    %estimator,
                    %pooling,
                    "similarity map has no finite values, score is NaN"
                );
            }
        }

        let maps = config.retain_maps.then(|| SimilarityMaps {
            estimators: config.estimators.clone(),
            maps,
        });
        (table, maps)
    }
}

/// Score `b` against `a` with `config`.
///
/// Convenience wrapper around [`PointSsim`].
pub fn compute_pointssim(
    a: &PointCloud,
    b: &PointCloud,
    config: &SsimConfig,
) -> Result<SsimResults> {
    PointSsim::new(config.clone())?.compute(a, b)
}

/// Per-run state shared by every attribute.
struct Sides<'a> {
    a: &'a PointCloud,
    b: &'a PointCloud,
    neighborhoods_a: &'a Neighborhoods,
    neighborhoods_b: &'a Neighborhoods,
    ba_association: Option<&'a [usize]>,
    ab_association: Option<&'a [usize]>,
}

fn split(
    rated: Option<(ScoreTable, Option<SimilarityMaps>)>,
) -> (Option<ScoreTable>, Option<SimilarityMaps>) {
    match rated {
        Some((table, maps)) => (Some(table), maps),
        None => (None, None),
    }
}

/// Fail early for attributes that are missing and cannot be estimated.
fn check_attributes(
    cloud: &PointCloud,
    label: &'static str,
    attributes: &[AttributeKind],
    config: &SsimConfig,
) -> Result<()> {
    for &attribute in attributes {
        let estimable = matches!(attribute, AttributeKind::Normal | AttributeKind::Curvature)
            && config.estimation.is_some();
        if !cloud.has(attribute) && !estimable {
            return Err(SsimError::MissingAttribute {
                attribute,
                cloud: label,
            });
        }
    }
    Ok(())
}

/// Fill in missing normals and curvatures by quadric fitting when needed.
fn prepare_cloud<'c>(
    cloud: &'c PointCloud,
    index: &NeighborIndex,
    attributes: &[AttributeKind],
    config: &SsimConfig,
) -> Result<Cow<'c, PointCloud>> {
    let Some(estimation) = &config.estimation else {
        return Ok(Cow::Borrowed(cloud));
    };
    let needs_normals = attributes.contains(&AttributeKind::Normal) && cloud.normals.is_none();
    let needs_curvatures =
        attributes.contains(&AttributeKind::Curvature) && cloud.curvatures.is_none();
    if !needs_normals && !needs_curvatures {
        return Ok(Cow::Borrowed(cloud));
    }

    let estimated = estimate_with_index(index, estimation)?;
    let mut cloud = cloud.clone();
    if needs_normals {
        cloud.normals = Some(estimated.normals);
    }
    if needs_curvatures {
        cloud.curvatures = Some(estimated.curvatures);
    }
    Ok(Cow::Owned(cloud))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReferenceMode;
    use crate::estimation::NeighborSearch;
    use crate::test_utils::{gradient_colors, make_half_cubic, make_sphere_surface, make_xy_plane};
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rand_distr::{Distribution, Normal};

    /// Sphere with normals, curvatures and colors.
    fn full_sphere(num_points: usize) -> PointCloud {
        let cloud = make_sphere_surface(1.0, num_points);
        let colors = gradient_colors(&cloud.geometry);
        cloud.with_colors(colors)
    }

    fn with_noise(cloud: &PointCloud, sigma: f64, seed: u64) -> PointCloud {
        let mut rng = StdRng::seed_from_u64(seed);
        let normal = Normal::new(0.0, sigma).unwrap();
        let mut noisy = cloud.clone();
        for p in noisy.geometry.iter_mut() {
            for c in p.iter_mut() {
                *c += normal.sample(&mut rng);
            }
        }
        noisy
    }

    fn all_config() -> SsimConfig {
        SsimConfig::builder()
            .attributes(AttributeKind::ALL)
            .estimators(Estimator::ALL)
            .poolings(Pooling::ALL)
            .build()
            .unwrap()
    }

    #[test]
    fn test_identical_clouds_score_one() {
        let a = full_sphere(400);
        let b = full_sphere(400);

        let results = compute_pointssim(&a, &b, &all_config()).unwrap();
        assert_eq!(results.len(), 4);

        for (attribute, scores) in results.iter() {
            for table in [&scores.ba, &scores.ab, &scores.sym] {
                let table = table.as_ref().unwrap();
                assert_eq!(table.estimators().len(), Estimator::ALL.len());
                assert_eq!(table.poolings().len(), Pooling::ALL.len());
                for (estimator, pooling, value) in table.iter() {
                    assert_eq!(value, 1.0, "{attribute} {estimator} {pooling}");
                }
            }
        }
    }

    #[test]
    fn test_zero_features_score_one() {
        // Flat patch: zero curvature everywhere, all-black colors
        let points = make_xy_plane(2.0, 0.25, 0.0);
        let n = points.len();
        let cloud = PointCloud::new(points)
            .with_curvatures(vec![0.0; n])
            .with_colors(vec![[0, 0, 0]; n]);

        for constant in [f64::EPSILON, 0.0] {
            let config = SsimConfig::builder()
                .attributes([AttributeKind::Curvature, AttributeKind::Color])
                .estimators(Estimator::ALL)
                .poolings(Pooling::ALL)
                .neighborhood_size(9)
                .constant(constant)
                .build()
                .unwrap();

            let results = compute_pointssim(&cloud, &cloud, &config).unwrap();
            for (attribute, scores) in results.iter() {
                for (estimator, pooling, value) in scores.sym.as_ref().unwrap().iter() {
                    assert_eq!(value, 1.0, "{attribute} {estimator} {pooling} c={constant}");
                }
            }
        }
    }

    #[test]
    fn test_half_cube_normals() {
        let a = make_half_cubic(2.0, 0.25);
        let config = SsimConfig::builder()
            .attributes([AttributeKind::Normal])
            .estimators([Estimator::Mean, Estimator::Variance])
            .poolings([Pooling::Mean, Pooling::Min])
            .neighborhood_size(8)
            .build()
            .unwrap();

        let results = compute_pointssim(&a, &a, &config).unwrap();
        let sym = results.get(AttributeKind::Normal).unwrap().sym.as_ref().unwrap();
        for (_, _, value) in sym.iter() {
            assert_eq!(value, 1.0);
        }

        // Tilt the normals of the ZX face by 45 degrees
        let mut b = a.clone();
        for normal in b.normals.as_mut().unwrap().iter_mut() {
            if *normal == [0.0, 1.0, 0.0] {
                *normal = [0.0, 1.0, 1.0];
            }
        }

        let results = compute_pointssim(&a, &b, &config).unwrap();
        let scores = results.get(AttributeKind::Normal).unwrap();
        let sym = scores.sym.as_ref().unwrap();
        let mean = sym.get(Estimator::Mean, Pooling::Mean).unwrap();
        assert!(mean < 1.0, "mean {mean}");
        assert!(mean > 0.0, "mean {mean}");
        assert!(sym.get(Estimator::Mean, Pooling::Min).unwrap() <= mean);
    }

    #[test]
    fn test_symmetric_is_elementwise_min() {
        let a = full_sphere(500);
        let b = with_noise(&a, 0.02, 7);

        let results = compute_pointssim(&a, &b, &all_config()).unwrap();
        for (_, scores) in results.iter() {
            let ba = scores.ba.as_ref().unwrap();
            let ab = scores.ab.as_ref().unwrap();
            let sym = scores.sym.as_ref().unwrap();
            for e in 0..ba.estimators().len() {
                for p in 0..ba.poolings().len() {
                    let (x, y) = (ba.value(e, p), ab.value(e, p));
                    assert!(x.is_finite() && y.is_finite());
                    assert_eq!(sym.value(e, p), x.min(y));
                }
            }
        }
    }

    #[test]
    fn test_distortion_lowers_geometry_score() {
        let a = full_sphere(500);
        let b = with_noise(&a, 0.03, 11);

        let results = compute_pointssim(&a, &b, &SsimConfig::default()).unwrap();
        let sym = results.get(AttributeKind::Geometry).unwrap().sym.as_ref().unwrap();
        let score = sym.get(Estimator::Variance, Pooling::Mean).unwrap();
        assert!(score < 1.0, "score {score}");
        assert!(score >= 0.0, "score {score}");
    }

    #[test]
    fn test_scores_within_unit_interval_for_geometry() {
        let a = full_sphere(300);
        let b = with_noise(&a, 0.05, 3);
        let config = SsimConfig::builder()
            .estimators(Estimator::ALL)
            .poolings(Pooling::ALL)
            .build()
            .unwrap();

        let results = compute_pointssim(&a, &b, &config).unwrap();
        let scores = results.get(AttributeKind::Geometry).unwrap();
        for table in [&scores.ba, &scores.ab] {
            for (_, _, value) in table.as_ref().unwrap().iter() {
                assert!((0.0..=1.0).contains(&value), "value {value}");
            }
        }
    }

    #[test]
    fn test_missing_attribute_is_configuration_error() {
        let a = full_sphere(100);
        let b = PointCloud::new(a.geometry.clone());
        let config = SsimConfig::builder()
            .attributes([AttributeKind::Normal])
            .build()
            .unwrap();

        let err = compute_pointssim(&a, &b, &config).unwrap_err();
        assert!(err.is_configuration());
        assert_eq!(
            err,
            SsimError::MissingAttribute {
                attribute: AttributeKind::Normal,
                cloud: "B",
            }
        );

        // Color is never estimated
        let config = SsimConfig::builder()
            .attributes([AttributeKind::Color])
            .estimate_missing(NeighborSearch::Knn(12))
            .build()
            .unwrap();
        let err = compute_pointssim(&b, &a, &config).unwrap_err();
        assert_eq!(
            err,
            SsimError::MissingAttribute {
                attribute: AttributeKind::Color,
                cloud: "A",
            }
        );
    }

    #[test]
    fn test_neighborhood_larger_than_cloud() {
        let a = PointCloud::new(vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
        let b = full_sphere(50);

        let err = compute_pointssim(&a, &b, &SsimConfig::default()).unwrap_err();
        assert!(err.is_input());
        assert_eq!(err, SsimError::NeighborhoodTooLarge { k: 12, points: 3 });
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        let a = full_sphere(50);
        let empty = PointCloud::default();
        let err = compute_pointssim(&a, &empty, &SsimConfig::default()).unwrap_err();
        assert_eq!(err, SsimError::EmptyCloud);

        let config = SsimConfig {
            neighborhood_size: 0,
            ..Default::default()
        };
        assert!(PointSsim::new(config).unwrap_err().is_configuration());
    }

    #[test]
    fn test_reference_modes() {
        let a = full_sphere(200);
        let b = with_noise(&a, 0.01, 5);

        let config = SsimConfig::builder()
            .reference(ReferenceMode::ReferenceA)
            .build()
            .unwrap();
        let results = compute_pointssim(&a, &b, &config).unwrap();
        let scores = results.get(AttributeKind::Geometry).unwrap();
        assert!(scores.ba.is_some());
        assert!(scores.ab.is_none());
        assert!(scores.sym.is_none());

        let config = SsimConfig::builder()
            .reference(ReferenceMode::ReferenceB)
            .build()
            .unwrap();
        let results_b = compute_pointssim(&a, &b, &config).unwrap();
        let scores_b = results_b.get(AttributeKind::Geometry).unwrap();
        assert!(scores_b.ba.is_none());
        assert!(scores_b.ab.is_some());
        assert!(scores_b.sym.is_none());

        // Each direction is independent of whether the other one is computed
        let both = compute_pointssim(&a, &b, &SsimConfig::default()).unwrap();
        let both = both.get(AttributeKind::Geometry).unwrap();
        assert_eq!(both.ba, scores.ba);
        assert_eq!(both.ab, scores_b.ab);
    }

    #[test]
    fn test_retained_maps_pool_to_scores() {
        let a = full_sphere(300);
        let b = with_noise(&make_sphere_surface(1.0, 250), 0.01, 9);
        let config = SsimConfig::builder()
            .estimators([Estimator::Variance, Estimator::Median])
            .poolings([Pooling::Mean, Pooling::Min])
            .retain_maps(true)
            .build()
            .unwrap();

        let results = compute_pointssim(&a, &b, &config).unwrap();
        let scores = results.get(AttributeKind::Geometry).unwrap();

        let ba_maps = scores.ba_maps.as_ref().unwrap();
        let ab_maps = scores.ab_maps.as_ref().unwrap();
        let median_ba = ba_maps.get(Estimator::Median).unwrap();
        assert_eq!(median_ba.len(), b.len());
        assert_eq!(ab_maps.get(Estimator::Variance).unwrap().len(), a.len());
        assert!(ba_maps.get(Estimator::Qcd).is_none());

        let ba = scores.ba.as_ref().unwrap();
        assert_relative_eq!(
            ba.get(Estimator::Median, Pooling::Mean).unwrap(),
            pool(median_ba, Pooling::Mean)
        );
        assert_relative_eq!(
            ba.get(Estimator::Median, Pooling::Min).unwrap(),
            pool(median_ba, Pooling::Min)
        );
    }

    #[test]
    fn test_maps_not_retained_by_default() {
        let a = full_sphere(100);
        let results = compute_pointssim(&a, &a, &SsimConfig::default()).unwrap();
        let scores = results.get(AttributeKind::Geometry).unwrap();
        assert!(scores.ba_maps.is_none());
        assert!(scores.ab_maps.is_none());
    }

    #[test]
    fn test_estimated_attributes() {
        let sphere = make_sphere_surface(1.0, 400);
        let a = PointCloud::new(sphere.geometry.clone());
        let b = PointCloud::new(sphere.geometry);

        let config = SsimConfig::builder()
            .attributes([AttributeKind::Normal, AttributeKind::Curvature])
            .estimators([Estimator::Variance, Estimator::Mean])
            .estimate_missing(NeighborSearch::Knn(16))
            .build()
            .unwrap();

        let results = compute_pointssim(&a, &b, &config).unwrap();
        assert_eq!(results.len(), 2);
        for (_, scores) in results.iter() {
            for (_, _, value) in scores.sym.as_ref().unwrap().iter() {
                assert_eq!(value, 1.0);
            }
        }
    }

    #[test]
    fn test_score_table_min_propagates_nan() {
        let estimators = [Estimator::Mean];
        let poolings = [Pooling::Mean, Pooling::Max];
        let a = ScoreTable::from_fn(&estimators, &poolings, |_, p| [0.5, f64::NAN][p]);
        let b = ScoreTable::from_fn(&estimators, &poolings, |_, p| [0.7, 0.2][p]);

        let sym = a.min(&b);
        assert_eq!(sym.get(Estimator::Mean, Pooling::Mean), Some(0.5));
        assert!(sym.value(0, 1).is_nan());
        assert_eq!(sym.get(Estimator::Qcd, Pooling::Mean), None);
    }

    #[test]
    fn test_results_serialize() {
        let a = full_sphere(60);
        let results = compute_pointssim(&a, &a, &SsimConfig::default()).unwrap();
        let json = results.to_json().unwrap();
        assert!(json.contains("\"geometry\""));
        assert!(json.contains("\"Variance\""));
        assert!(json.contains("\"ab_maps\":null"));

        let pretty = results.to_json_pretty().unwrap();
        let value: serde_json::Value = serde_json::from_str(&pretty).unwrap();
        assert_eq!(value["scores"]["geometry"]["sym"]["values"][0], 1.0);
    }
}
