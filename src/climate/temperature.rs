//! Temperature in four retained stages.
//!
//! Every stage is min-max normalised to `[0, 1]` on its own, so the values are
//! relative temperatures for this world rather than degrees.

use std::f32::consts::FRAC_PI_2;

use crate::climate::noise::CoherentNoise;
use crate::config::TemperatureParams;
use crate::tilemap::Tilemap;
use crate::world::WorldParameters;

/// Which temperature stage to read.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TemperatureStage {
    LatitudeOnly,
    WithNoise,
    WithDistance,
    Final,
}

impl TemperatureStage {
    pub const ALL: [TemperatureStage; 4] = [
        TemperatureStage::LatitudeOnly,
        TemperatureStage::WithNoise,
        TemperatureStage::WithDistance,
        TemperatureStage::Final,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TemperatureStage::LatitudeOnly => "temperature_latitude",
            TemperatureStage::WithNoise => "temperature_noise",
            TemperatureStage::WithDistance => "temperature_distance",
            TemperatureStage::Final => "temperature_final",
        }
    }
}

#[derive(Clone, Debug)]
pub struct TemperatureStages {
    pub latitude_only: Tilemap<f32>,
    pub with_noise: Tilemap<f32>,
    pub with_distance: Tilemap<f32>,
    pub final_stage: Tilemap<f32>,
}

impl TemperatureStages {
    pub fn get(&self, stage: TemperatureStage) -> &Tilemap<f32> {
        match stage {
            TemperatureStage::LatitudeOnly => &self.latitude_only,
            TemperatureStage::WithNoise => &self.with_noise,
            TemperatureStage::WithDistance => &self.with_distance,
            TemperatureStage::Final => &self.final_stage,
        }
    }
}

/// Geographic latitude of a row centre: `+1` at the northern edge, `-1` at
/// the southern edge, `0` halfway.
///
/// Rows `y` and `height - 1 - y` get exactly opposite latitudes.
pub fn row_latitude(y: usize, height: usize) -> f32 {
    if height == 0 {
        return 0.0;
    }
    let half = height as f32 / 2.0;
    (half - (y as f32 + 0.5)) / half
}

/// Latitude of the thermal equator for a given axial tilt.
pub fn thermal_equator(axial_tilt_deg: f32, tilt_shift: f32) -> f32 {
    (axial_tilt_deg / 90.0) * tilt_shift
}

/// Stage 1: a cosine bump centred on the tilted equator, symmetric about it.
pub fn latitude_only(width: usize, height: usize, axial_tilt_deg: f32, params: &TemperatureParams) -> Tilemap<f32> {
    let equator = thermal_equator(axial_tilt_deg, params.tilt_shift);
    let span = 1.0 + equator.abs();
    Tilemap::from_fn_par(width, height, |_, y| {
        let offset = ((row_latitude(y, height) - equator).abs() / span).min(1.0);
        (offset * FRAC_PI_2).cos()
    })
    .normalized()
}

/// Stage 2: perturb with coherent noise and renormalise.
pub fn with_noise(previous: &Tilemap<f32>, noise: &CoherentNoise, params: &TemperatureParams) -> Tilemap<f32> {
    let field = noise.signed_field(previous.width, previous.height);
    Tilemap::from_fn_par(previous.width, previous.height, |x, y| {
        previous.get(x, y) + field.get(x, y) * params.noise_weight
    })
    .normalized()
}

/// Stage 3: closer stars warm the map, farther ones cool it.
///
/// Values are raised to `distance^sensitivity`; below 1 that lifts the
/// distribution toward hot, above 1 it sinks toward cold.
pub fn with_distance(previous: &Tilemap<f32>, distance_to_star: f32, params: &TemperatureParams) -> Tilemap<f32> {
    let exponent = distance_to_star.powf(params.distance_sensitivity);
    previous.map(|&v| v.max(0.0).powf(exponent)).normalized()
}

/// Stage 4: identity unless a lapse rate is configured, in which case land
/// above sea level is cooled in proportion to its height.
pub fn final_stage(
    previous: &Tilemap<f32>,
    heightmap: &Tilemap<f32>,
    sea_level: f32,
    params: &TemperatureParams,
) -> Tilemap<f32> {
    if params.lapse_rate <= 0.0 {
        return previous.clone();
    }
    let peak = heightmap.min_max().map_or(sea_level, |(_, hi)| hi);
    let relief = (peak - sea_level).max(f32::EPSILON);
    Tilemap::from_fn_par(previous.width, previous.height, |x, y| {
        let above = (heightmap.get(x, y) - sea_level).max(0.0) / relief;
        previous.get(x, y) - params.lapse_rate * above
    })
    .normalized()
}

/// Run all four stages.
pub fn compute_temperature(
    heightmap: &Tilemap<f32>,
    sea_level: f32,
    world: &WorldParameters,
    params: &TemperatureParams,
    seed: u32,
) -> TemperatureStages {
    let width = heightmap.width;
    let height = heightmap.height;
    let noise = CoherentNoise::new(seed, &params.noise);

    let latitude_only = latitude_only(width, height, world.axial_tilt_deg, params);
    let with_noise = with_noise(&latitude_only, &noise, params);
    let with_distance = with_distance(&with_noise, world.distance_to_star, params);
    let final_stage = final_stage(&with_distance, heightmap, sea_level, params);

    TemperatureStages {
        latitude_only,
        with_noise,
        with_distance,
        final_stage,
    }
}
