//! Pooling of per-point maps into a single score.
//!
//! NaN entries (points whose feature could not be computed) are skipped.
//! A map without any finite entry pools to NaN.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SsimError};
use crate::features::estimators::median_sorted;

/// Reduction applied to a similarity map.
///
/// Deserialized through [`FromStr`], so names are case-insensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Pooling {
    Mean,
    Min,
    Max,
    Median,
    /// Root mean square, `sqrt(mean(x²))`.
    #[serde(rename = "RMS")]
    Rms,
    /// Mean square, `mean(x²)`.
    #[serde(rename = "MSE")]
    Mse,
}

impl Pooling {
    pub const ALL: [Pooling; 6] = [
        Pooling::Mean,
        Pooling::Min,
        Pooling::Max,
        Pooling::Median,
        Pooling::Rms,
        Pooling::Mse,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Mean => "Mean",
            Self::Min => "Min",
            Self::Max => "Max",
            Self::Median => "Median",
            Self::Rms => "RMS",
            Self::Mse => "MSE",
        }
    }
}

impl fmt::Display for Pooling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Pooling {
    type Err = SsimError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "mean" => Ok(Self::Mean),
            "min" => Ok(Self::Min),
            "max" => Ok(Self::Max),
            "median" => Ok(Self::Median),
            "rms" | "rmse" => Ok(Self::Rms),
            "mse" | "ms" => Ok(Self::Mse),
            _ => Err(SsimError::UnknownPooling(s.to_string())),
        }
    }
}

impl TryFrom<String> for Pooling {
    type Error = SsimError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

/// Pool `values` with `method`, ignoring NaN entries.
pub fn pool(values: &[f64], method: Pooling) -> f64 {
    let finite: Vec<f64> = values.iter().copied().filter(|x| !x.is_nan()).collect();
    if finite.is_empty() {
        return f64::NAN;
    }
    let n = finite.len() as f64;

    match method {
        Pooling::Mean => finite.iter().sum::<f64>() / n,
        Pooling::Min => finite.iter().copied().fold(f64::INFINITY, f64::min),
        Pooling::Max => finite.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        Pooling::Median => {
            let mut sorted = finite;
            sorted.sort_by(f64::total_cmp);
            median_sorted(&sorted)
        }
        Pooling::Rms => (finite.iter().map(|x| x * x).sum::<f64>() / n).sqrt(),
        Pooling::Mse => finite.iter().map(|x| x * x).sum::<f64>() / n,
    }
}
