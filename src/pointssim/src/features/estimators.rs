//! Dispersion estimators reducing a row of local quantities to one scalar.
//!
//! Non-finite quantities (e.g. NaN from points whose normal could not be
//! estimated) are ignored within a row. A row without any finite value
//! yields NaN. Ratio estimators are 0 for rows without spread.

use std::fmt;
use std::str::FromStr;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::QuantityMatrix;
use crate::error::{Result, SsimError};

/// Statistic computed over each neighborhood's local quantities.
///
/// Deserialized through [`FromStr`], so names and aliases are
/// case-insensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Estimator {
    /// Population variance.
    Variance,
    /// Population standard deviation.
    StdDev,
    Median,
    /// Mean absolute deviation around the mean.
    #[serde(rename = "MeanAD")]
    MeanAd,
    /// Median absolute deviation around the median.
    #[serde(rename = "MedianAD")]
    MedianAd,
    /// Coefficient of variation, `std / mean`; 0 for a constant row.
    #[serde(rename = "COV")]
    Cov,
    /// Quartile coefficient of dispersion, `(Q3 - Q1) / (Q3 + Q1)`; 0 when
    /// `Q3 == Q1`.
    #[serde(rename = "QCD")]
    Qcd,
    /// Location rather than dispersion; useful as a baseline.
    Mean,
}

impl Estimator {
    pub const ALL: [Estimator; 8] = [
        Estimator::Variance,
        Estimator::StdDev,
        Estimator::Median,
        Estimator::MeanAd,
        Estimator::MedianAd,
        Estimator::Cov,
        Estimator::Qcd,
        Estimator::Mean,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Variance => "Variance",
            Self::StdDev => "StdDev",
            Self::Median => "Median",
            Self::MeanAd => "MeanAD",
            Self::MedianAd => "MedianAD",
            Self::Cov => "COV",
            Self::Qcd => "QCD",
            Self::Mean => "Mean",
        }
    }

    /// Apply the estimator to ascending-sorted finite values.
    pub fn apply_sorted(self, sorted: &[f64]) -> f64 {
        if sorted.is_empty() {
            return f64::NAN;
        }
        match self {
            Self::Variance => variance(sorted),
            Self::StdDev => variance(sorted).sqrt(),
            Self::Median => median_sorted(sorted),
            Self::MeanAd => {
                let m = mean(sorted);
                sorted.iter().map(|x| (x - m).abs()).sum::<f64>() / sorted.len() as f64
            }
            Self::MedianAd => {
                let m = median_sorted(sorted);
                let mut deviations: Vec<f64> = sorted.iter().map(|x| (x - m).abs()).collect();
                deviations.sort_by(f64::total_cmp);
                median_sorted(&deviations)
            }
            Self::Cov => {
                let std = variance(sorted).sqrt();
                if std == 0.0 {
                    0.0
                } else {
                    std / mean(sorted)
                }
            }
            Self::Qcd => {
                let q1 = quantile_sorted(sorted, 0.25);
                let q3 = quantile_sorted(sorted, 0.75);
                if q3 == q1 {
                    0.0
                } else {
                    (q3 - q1) / (q3 + q1)
                }
            }
            Self::Mean => mean(sorted),
        }
    }

    /// Apply the estimator to a raw row, ignoring non-finite entries.
    pub fn apply(self, row: &[f64]) -> f64 {
        self.apply_sorted(&sorted_finite(row))
    }
}

impl fmt::Display for Estimator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Estimator {
    type Err = SsimError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "variance" | "var" => Ok(Self::Variance),
            "stddev" | "std" => Ok(Self::StdDev),
            "median" => Ok(Self::Median),
            "meanad" => Ok(Self::MeanAd),
            "medianad" => Ok(Self::MedianAd),
            "cov" => Ok(Self::Cov),
            "qcd" => Ok(Self::Qcd),
            "mean" => Ok(Self::Mean),
            _ => Err(SsimError::UnknownEstimator(s.to_string())),
        }
    }
}

impl TryFrom<String> for Estimator {
    type Error = SsimError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

/// Reduce every row of `quantities` with `estimator`.
pub fn extract(quantities: &QuantityMatrix, estimator: Estimator) -> Vec<f64> {
    (0..quantities.rows())
        .into_par_iter()
        .map(|i| estimator.apply(quantities.row(i)))
        .collect()
}

/// One feature map per estimator, in the order given.
///
/// Each row is filtered and sorted once and shared by all estimators.
pub fn feature_maps(quantities: &QuantityMatrix, estimators: &[Estimator]) -> Vec<Vec<f64>> {
    let per_row: Vec<Vec<f64>> = (0..quantities.rows())
        .into_par_iter()
        .map(|i| {
            let sorted = sorted_finite(quantities.row(i));
            estimators.iter().map(|e| e.apply_sorted(&sorted)).collect()
        })
        .collect();

    (0..estimators.len())
        .map(|e| per_row.iter().map(|row| row[e]).collect())
        .collect()
}

/// Finite entries of `row`, ascending.
fn sorted_finite(row: &[f64]) -> Vec<f64> {
    let mut values: Vec<f64> = row.iter().copied().filter(|x| x.is_finite()).collect();
    values.sort_by(f64::total_cmp);
    values
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn variance(values: &[f64]) -> f64 {
    let m = mean(values);
    values.iter().map(|x| (x - m) * (x - m)).sum::<f64>() / values.len() as f64
}

/// Median of ascending-sorted values; NaN when empty.
pub(crate) fn median_sorted(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return f64::NAN;
    }
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        0.5 * (sorted[n / 2 - 1] + sorted[n / 2])
    }
}

/// Quantile of ascending-sorted values.
///
/// The j-th smallest value (1-based) sits at probability `(j - 0.5) / n`.
/// Probabilities in between are linearly interpolated and those outside
/// `[0.5 / n, 1 - 0.5 / n]` clamp to the minimum or maximum.
pub(crate) fn quantile_sorted(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return f64::NAN;
    }
    let h = n as f64 * p - 0.5;
    if h <= 0.0 {
        return sorted[0];
    }
    if h >= (n - 1) as f64 {
        return sorted[n - 1];
    }
    let lo = h.floor() as usize;
    let frac = h - lo as f64;
    sorted[lo] + frac * (sorted[lo + 1] - sorted[lo])
}
