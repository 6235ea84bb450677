//! Quantile thresholds over land cells.
//!
//! Cut-points are chosen per world from the sorted land distribution, so a
//! dry world and a wet world both end up with the configured share of cells
//! in each bucket.

use serde::Serialize;

use crate::config::QuantileProportions;
use crate::tilemap::Tilemap;

/// Three ordered cut-points splitting a distribution into four buckets.
///
/// `low <= medium <= high` always; the inequalities are strict whenever the
/// sampled values at the three cut positions differ.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Thresholds {
    pub low_threshold: f32,
    pub medium_threshold: f32,
    pub high_threshold: f32,
    /// Smallest and largest sampled value.
    pub min: f32,
    pub max: f32,
    /// Number of cells the thresholds were computed from.
    pub sample_count: usize,
}

impl Thresholds {
    /// Bucket index `0..=3` for a value: below low, below medium, below high,
    /// or at/above high.
    pub fn bucket(&self, value: f32) -> usize {
        if value < self.low_threshold {
            0
        } else if value < self.medium_threshold {
            1
        } else if value < self.high_threshold {
            2
        } else {
            3
        }
    }

    /// Lower and upper edge of a bucket.
    pub fn bucket_bounds(&self, bucket: usize) -> (f32, f32) {
        match bucket {
            0 => (self.min, self.low_threshold),
            1 => (self.low_threshold, self.medium_threshold),
            2 => (self.medium_threshold, self.high_threshold),
            _ => (self.high_threshold, self.max),
        }
    }
}

/// Quantile cut-points over the non-ocean cells of `values`.
///
/// Falls back to every cell when the map has no land. The cut for a share `p`
/// of `n` samples is the sorted value at index `round(p·n)` (clamped to the
/// last sample), so the count strictly below it is `round(p·n)` when values
/// are distinct.
pub fn compute_thresholds(
    values: &Tilemap<f32>,
    ocean: &Tilemap<bool>,
    proportions: &QuantileProportions,
) -> Thresholds {
    let mut samples: Vec<f32> = values
        .iter()
        .filter(|&(x, y, _)| !*ocean.get(x, y))
        .map(|(_, _, &v)| v)
        .collect();
    if samples.is_empty() {
        samples = values.as_slice().to_vec();
    }
    if samples.is_empty() {
        return Thresholds {
            low_threshold: 0.0,
            medium_threshold: 0.0,
            high_threshold: 0.0,
            min: 0.0,
            max: 0.0,
            sample_count: 0,
        };
    }

    samples.sort_by(|a, b| a.total_cmp(b));
    let n = samples.len();
    let at = |share: f32| {
        let k = ((share * n as f32).round() as usize).min(n - 1);
        samples[k]
    };
    let [a, b, c] = proportions.cut_points();

    Thresholds {
        low_threshold: at(a),
        medium_threshold: at(b),
        high_threshold: at(c),
        min: samples[0],
        max: samples[n - 1],
        sample_count: n,
    }
}

/// Precipitation bucket.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum PrecipitationClass {
    Arid,
    Low,
    Medium,
    High,
}

impl PrecipitationClass {
    pub fn classify(value: f32, thresholds: &Thresholds) -> Self {
        match thresholds.bucket(value) {
            0 => PrecipitationClass::Arid,
            1 => PrecipitationClass::Low,
            2 => PrecipitationClass::Medium,
            _ => PrecipitationClass::High,
        }
    }
}

/// Temperature bucket.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum TemperatureClass {
    Cold,
    Cool,
    Warm,
    Hot,
}

impl TemperatureClass {
    pub fn classify(value: f32, thresholds: &Thresholds) -> Self {
        match thresholds.bucket(value) {
            0 => TemperatureClass::Cold,
            1 => TemperatureClass::Cool,
            2 => TemperatureClass::Warm,
            _ => TemperatureClass::Hot,
        }
    }
}
