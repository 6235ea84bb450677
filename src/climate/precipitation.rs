//! Precipitation in five retained stages.
//!
//! `BaseNoise` → `TemperatureShaped` → `Base` (quantile-equalised) →
//! `WithRainShadow` → `Final` (coastal bonus). Each grid is produced once and
//! kept for display and probing.

use crate::climate::coastal::{apply_coastal_moisture, distance_to_ocean};
use crate::climate::noise::CoherentNoise;
use crate::climate::rain_shadow::apply_rain_shadow;
use crate::config::{PrecipitationParams, QuantileProportions};
use crate::thresholds::{compute_thresholds, Thresholds};
use crate::tilemap::Tilemap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PrecipitationStage {
    BaseNoise,
    TemperatureShaped,
    Base,
    WithRainShadow,
    Final,
}

impl PrecipitationStage {
    pub const ALL: [PrecipitationStage; 5] = [
        PrecipitationStage::BaseNoise,
        PrecipitationStage::TemperatureShaped,
        PrecipitationStage::Base,
        PrecipitationStage::WithRainShadow,
        PrecipitationStage::Final,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PrecipitationStage::BaseNoise => "precipitation_noise",
            PrecipitationStage::TemperatureShaped => "precipitation_shaped",
            PrecipitationStage::Base => "precipitation_base",
            PrecipitationStage::WithRainShadow => "precipitation_rain_shadow",
            PrecipitationStage::Final => "precipitation_final",
        }
    }
}

#[derive(Clone, Debug)]
pub struct PrecipitationStages {
    pub base_noise: Tilemap<f32>,
    pub temperature_shaped: Tilemap<f32>,
    pub base: Tilemap<f32>,
    /// Cut-points used to equalise `temperature_shaped` into `base`.
    pub base_thresholds: Thresholds,
    pub with_rain_shadow: Tilemap<f32>,
    pub final_stage: Tilemap<f32>,
    pub distance_to_ocean: Tilemap<f32>,
    /// Cut-points over the final land distribution.
    pub thresholds: Thresholds,
}

impl PrecipitationStages {
    pub fn get(&self, stage: PrecipitationStage) -> &Tilemap<f32> {
        match stage {
            PrecipitationStage::BaseNoise => &self.base_noise,
            PrecipitationStage::TemperatureShaped => &self.temperature_shaped,
            PrecipitationStage::Base => &self.base,
            PrecipitationStage::WithRainShadow => &self.with_rain_shadow,
            PrecipitationStage::Final => &self.final_stage,
        }
    }
}

/// Stage 2: warm cells keep their noise, cold cells are pulled toward the
/// `curve_bonus` fraction of it.
///
/// `shaped = noise · (T^γ · (1 − bonus) + bonus)`
pub fn temperature_shaped(base_noise: &Tilemap<f32>, temperature: &Tilemap<f32>, params: &PrecipitationParams) -> Tilemap<f32> {
    Tilemap::from_fn_par(base_noise.width, base_noise.height, |x, y| {
        let t = temperature.get(x, y).clamp(0.0, 1.0);
        let potential = t.powf(params.gamma) * (1.0 - params.curve_bonus) + params.curve_bonus;
        base_noise.get(x, y) * potential
    })
}

/// Stage 3: map each value to its quantile position so the land cells fill
/// the four buckets in the configured shares.
///
/// A value in bucket `k` lands at `cum[k] + frac · share[k]`, where `frac` is
/// its position between the bucket's edges.
pub fn quantile_equalize(values: &Tilemap<f32>, thresholds: &Thresholds, proportions: &QuantileProportions) -> Tilemap<f32> {
    let shares = [proportions.arid, proportions.low, proportions.medium, proportions.high];
    let [a, b, c] = proportions.cut_points();
    let starts = [0.0, a, b, c];

    values.map(|&v| {
        let k = thresholds.bucket(v);
        let (lower, upper) = thresholds.bucket_bounds(k);
        let frac = if upper > lower {
            ((v - lower) / (upper - lower)).clamp(0.0, 1.0)
        } else {
            0.0
        };
        (starts[k] + frac * shares[k]).clamp(0.0, 1.0)
    })
}

/// Run every precipitation stage.
pub fn compute_precipitation(
    heightmap: &Tilemap<f32>,
    ocean: &Tilemap<bool>,
    sea_level: f32,
    temperature: &Tilemap<f32>,
    params: &PrecipitationParams,
    proportions: &QuantileProportions,
    seed: u32,
) -> PrecipitationStages {
    let width = heightmap.width;
    let height = heightmap.height;

    let base_noise = CoherentNoise::new(seed, &params.noise).unit_field(width, height);
    let temperature_shaped = temperature_shaped(&base_noise, temperature, params);

    let base_thresholds = compute_thresholds(&temperature_shaped, ocean, proportions);
    let base = quantile_equalize(&temperature_shaped, &base_thresholds, proportions);

    let with_rain_shadow = apply_rain_shadow(&base, heightmap, ocean, sea_level, &params.rain_shadow);

    let distance_to_ocean = distance_to_ocean(ocean);
    let final_stage = apply_coastal_moisture(
        &with_rain_shadow,
        heightmap,
        ocean,
        &distance_to_ocean,
        sea_level,
        &params.coastal,
    );
    let thresholds = compute_thresholds(&final_stage, ocean, proportions);

    PrecipitationStages {
        base_noise,
        temperature_shaped,
        base,
        base_thresholds,
        with_rain_shadow,
        final_stage,
        distance_to_ocean,
        thresholds,
    }
}
