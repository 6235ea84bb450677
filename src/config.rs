//! Generation parameters.
//!
//! Every stage receives `&GenerationParameters`; nothing reads ambient state.
//! All sections default sensibly so a config file only needs to name the
//! values it overrides.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How the pit filler treats the flats it creates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PitFillMode {
    /// Raise filled cells a small step above their outlet so every filled cell
    /// has a strictly lower neighbour.
    #[default]
    Epsilon,
    /// Fill depressions to a flat surface at the spill level.
    Flat,
}

/// Absolute elevation breakpoints for relief classification and river sources.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElevationLevels {
    pub hill: f32,
    pub mountain: f32,
    pub peak: f32,
}

impl Default for ElevationLevels {
    fn default() -> Self {
        Self {
            hill: 0.55,
            mountain: 0.70,
            peak: 0.85,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HydrologyParams {
    /// Depressions with at least this many cells are kept as lakes/inner seas.
    pub min_basin_area: usize,
    pub pit_fill: PitFillMode,
    /// Minimum rise per filled cell in `Epsilon` mode.
    pub fill_epsilon: f32,
    pub levels: ElevationLevels,
    /// Accumulated flow (cells) a mountain cell needs to start a river.
    pub river_source_accumulation: f32,
}

impl Default for HydrologyParams {
    fn default() -> Self {
        Self {
            min_basin_area: 12,
            pit_fill: PitFillMode::Epsilon,
            fill_epsilon: 1e-5,
            levels: ElevationLevels::default(),
            river_source_accumulation: 25.0,
        }
    }
}

/// Octave settings for the coherent noise fields.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseParams {
    pub octaves: u32,
    /// Base frequency in cycles across the map width.
    pub frequency: f64,
    pub persistence: f64,
    pub lacunarity: f64,
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            octaves: 4,
            frequency: 3.0,
            persistence: 0.5,
            lacunarity: 2.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemperatureParams {
    pub noise: NoiseParams,
    pub noise_weight: f32,
    /// Thermal-equator shift, in normalised latitude, per 90 degrees of tilt.
    pub tilt_shift: f32,
    /// Exponent applied to the star distance when warming or cooling the map.
    pub distance_sensitivity: f32,
    /// Cooling of land above sea level in the final stage. Zero disables it.
    pub lapse_rate: f32,
}

impl Default for TemperatureParams {
    fn default() -> Self {
        Self {
            noise: NoiseParams::default(),
            noise_weight: 0.25,
            tilt_shift: 0.5,
            distance_sensitivity: 0.5,
            lapse_rate: 0.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RainShadowParams {
    /// How far upwind (cells) to look for barriers.
    pub reach: f32,
    /// Samples taken along the upwind ray.
    pub steps: u32,
    /// Barrier height that produces the full reduction.
    pub barrier_scale: f32,
    /// Largest fraction of precipitation a barrier can remove.
    pub strength: f32,
}

impl Default for RainShadowParams {
    fn default() -> Self {
        Self {
            reach: 12.0,
            steps: 12,
            barrier_scale: 0.3,
            strength: 0.6,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoastalParams {
    /// Distance (cells) at which the coastal bonus reaches zero.
    pub reach: f32,
    /// Bonus added right at the coast.
    pub max_bonus: f32,
    /// Height above sea level at which resistance is complete.
    pub resistance_height: f32,
    /// Fraction of the bonus removed at full resistance.
    pub resistance_strength: f32,
}

impl Default for CoastalParams {
    fn default() -> Self {
        Self {
            reach: 10.0,
            max_bonus: 0.25,
            resistance_height: 0.5,
            resistance_strength: 0.8,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrecipitationParams {
    pub noise: NoiseParams,
    pub gamma: f32,
    pub curve_bonus: f32,
    pub rain_shadow: RainShadowParams,
    pub coastal: CoastalParams,
}

impl Default for PrecipitationParams {
    fn default() -> Self {
        Self {
            noise: NoiseParams {
                frequency: 4.0,
                ..NoiseParams::default()
            },
            gamma: 2.0,
            curve_bonus: 0.2,
            rain_shadow: RainShadowParams::default(),
            coastal: CoastalParams::default(),
        }
    }
}

/// Share of land cells that should fall in each of the four buckets.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuantileProportions {
    pub arid: f32,
    pub low: f32,
    pub medium: f32,
    pub high: f32,
}

impl Default for QuantileProportions {
    fn default() -> Self {
        Self {
            arid: 0.25,
            low: 0.25,
            medium: 0.25,
            high: 0.25,
        }
    }
}

impl QuantileProportions {
    /// Cumulative shares at the three cut-points.
    pub fn cut_points(&self) -> [f32; 3] {
        [
            self.arid,
            self.arid + self.low,
            self.arid + self.low + self.medium,
        ]
    }
}

/// Everything a generation run reads besides the input grids and world
/// parameters. Read once at start, never mutated.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationParameters {
    pub hydrology: HydrologyParams,
    pub temperature: TemperatureParams,
    pub precipitation: PrecipitationParams,
    pub thresholds: QuantileProportions,
}

impl GenerationParameters {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let params: Self = serde_json::from_str(json)?;
        params.validate()?;
        Ok(params)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let h = &self.hydrology;
        if !(h.fill_epsilon.is_finite() && h.fill_epsilon >= 0.0) {
            return Err(ConfigError::invalid("hydrology.fill_epsilon", "must be finite and >= 0"));
        }
        let l = &h.levels;
        if !(l.hill.is_finite() && l.mountain.is_finite() && l.peak.is_finite()) {
            return Err(ConfigError::invalid("hydrology.levels", "levels must be finite"));
        }
        if !(l.hill < l.mountain && l.mountain < l.peak) {
            return Err(ConfigError::invalid(
                "hydrology.levels",
                format!("expected hill < mountain < peak, got {} / {} / {}", l.hill, l.mountain, l.peak),
            ));
        }
        if !(h.river_source_accumulation.is_finite() && h.river_source_accumulation >= 1.0) {
            return Err(ConfigError::invalid(
                "hydrology.river_source_accumulation",
                "must be at least 1 (a cell always drains itself)",
            ));
        }

        let t = &self.temperature;
        check_noise("temperature.noise", &t.noise)?;
        check_unit("temperature.noise_weight", t.noise_weight, f32::MAX)?;
        check_unit("temperature.tilt_shift", t.tilt_shift, 1.0)?;
        check_unit("temperature.distance_sensitivity", t.distance_sensitivity, 8.0)?;
        check_unit("temperature.lapse_rate", t.lapse_rate, f32::MAX)?;

        let p = &self.precipitation;
        check_noise("precipitation.noise", &p.noise)?;
        if !(p.gamma.is_finite() && p.gamma > 0.0) {
            return Err(ConfigError::invalid("precipitation.gamma", "must be > 0"));
        }
        check_unit("precipitation.curve_bonus", p.curve_bonus, 1.0)?;
        if !(p.rain_shadow.reach.is_finite() && p.rain_shadow.reach >= 0.0) {
            return Err(ConfigError::invalid("precipitation.rain_shadow.reach", "must be >= 0"));
        }
        if !(p.rain_shadow.barrier_scale.is_finite() && p.rain_shadow.barrier_scale > 0.0) {
            return Err(ConfigError::invalid("precipitation.rain_shadow.barrier_scale", "must be > 0"));
        }
        check_unit("precipitation.rain_shadow.strength", p.rain_shadow.strength, 1.0)?;
        if !(p.coastal.reach.is_finite() && p.coastal.reach > 0.0) {
            return Err(ConfigError::invalid("precipitation.coastal.reach", "must be > 0"));
        }
        check_unit("precipitation.coastal.max_bonus", p.coastal.max_bonus, 1.0)?;
        if !(p.coastal.resistance_height.is_finite() && p.coastal.resistance_height > 0.0) {
            return Err(ConfigError::invalid("precipitation.coastal.resistance_height", "must be > 0"));
        }
        check_unit("precipitation.coastal.resistance_strength", p.coastal.resistance_strength, 1.0)?;

        let q = &self.thresholds;
        let shares = [q.arid, q.low, q.medium, q.high];
        if shares.iter().any(|s| !s.is_finite() || *s < 0.0) {
            return Err(ConfigError::invalid("thresholds", "bucket shares must be >= 0"));
        }
        let total: f32 = shares.iter().sum();
        if (total - 1.0).abs() > 1e-3 {
            return Err(ConfigError::invalid(
                "thresholds",
                format!("bucket shares must sum to 1, got {total}"),
            ));
        }

        Ok(())
    }
}

fn check_unit(field: &'static str, value: f32, max: f32) -> Result<(), ConfigError> {
    if value.is_finite() && (0.0..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("{value} is outside [0, {max}]")))
    }
}

fn check_noise(field: &'static str, noise: &NoiseParams) -> Result<(), ConfigError> {
    if noise.octaves == 0 {
        return Err(ConfigError::invalid(field, "octaves must be at least 1"));
    }
    if !(noise.frequency.is_finite() && noise.frequency > 0.0) {
        return Err(ConfigError::invalid(field, "frequency must be > 0"));
    }
    if !(noise.persistence.is_finite() && noise.lacunarity.is_finite()) {
        return Err(ConfigError::invalid(field, "persistence and lacunarity must be finite"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        GenerationParameters::default().validate().unwrap();
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let params = GenerationParameters::from_json_str(
            r#"{ "hydrology": { "min_basin_area": 40, "pit_fill": "flat" } }"#,
        )
        .unwrap();
        assert_eq!(params.hydrology.min_basin_area, 40);
        assert_eq!(params.hydrology.pit_fill, PitFillMode::Flat);
        assert_eq!(params.hydrology.levels, ElevationLevels::default());
        assert_eq!(params.precipitation.gamma, 2.0);
    }

    #[test]
    fn test_rejects_unordered_levels() {
        let err = GenerationParameters::from_json_str(
            r#"{ "hydrology": { "levels": { "hill": 0.8, "mountain": 0.7, "peak": 0.9 } } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "hydrology.levels", .. }));
    }

    #[test]
    fn test_rejects_shares_not_summing_to_one() {
        let mut params = GenerationParameters::default();
        params.thresholds.high = 0.5;
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_cut_points_are_cumulative() {
        let q = QuantileProportions {
            arid: 0.1,
            low: 0.2,
            medium: 0.3,
            high: 0.4,
        };
        let [a, b, c] = q.cut_points();
        approx::assert_abs_diff_eq!(a, 0.1, epsilon = 1e-6);
        approx::assert_abs_diff_eq!(b, 0.3, epsilon = 1e-6);
        approx::assert_abs_diff_eq!(c, 0.6, epsilon = 1e-6);
    }
}
