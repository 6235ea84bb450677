//! Climate track: temperature and precipitation, every stage retained.

pub mod coastal;
pub mod noise;
pub mod precipitation;
pub mod rain_shadow;
pub mod temperature;

use crate::config::GenerationParameters;
use crate::seeds::ClimateSeeds;
use crate::thresholds::{compute_thresholds, Thresholds};
use crate::tilemap::Tilemap;
use crate::util::{PipelineStep, Timed};
use crate::world::WorldParameters;

pub use precipitation::{PrecipitationStage, PrecipitationStages};
pub use rain_shadow::{prevailing_wind, Wind, WindBand};
pub use temperature::{TemperatureStage, TemperatureStages};

#[derive(Clone, Debug)]
pub struct ClimateLayers {
    pub seeds: ClimateSeeds,
    pub temperature: TemperatureStages,
    /// Cut-points over the final land temperature.
    pub temperature_thresholds: Thresholds,
    pub precipitation: PrecipitationStages,
}

/// Run both climate calculators. Needs only the raw heightmap and the ocean
/// mask from the hydrology track.
pub fn run_climate(
    heightmap: &Tilemap<f32>,
    ocean: &Tilemap<bool>,
    sea_level: f32,
    world: &WorldParameters,
    params: &GenerationParameters,
) -> ClimateLayers {
    let _t = Timed::start(PipelineStep::Climate);
    let seeds = ClimateSeeds::from_master(world.seed);

    let temperature = {
        let _t = Timed::start(PipelineStep::TemperatureStages);
        temperature::compute_temperature(heightmap, sea_level, world, &params.temperature, seeds.temperature)
    };
    let temperature_thresholds = compute_thresholds(&temperature.final_stage, ocean, &params.thresholds);

    let precipitation = {
        let _t = Timed::start(PipelineStep::PrecipitationStages);
        precipitation::compute_precipitation(
            heightmap,
            ocean,
            sea_level,
            &temperature.final_stage,
            &params.precipitation,
            &params.thresholds,
            seeds.precipitation,
        )
    };

    log::info!(
        "Precipitation thresholds: low {:.3}, medium {:.3}, high {:.3} over {} cells",
        precipitation.thresholds.low_threshold,
        precipitation.thresholds.medium_threshold,
        precipitation.thresholds.high_threshold,
        precipitation.thresholds.sample_count
    );
    log::debug!(
        "Temperature thresholds: low {:.3}, medium {:.3}, high {:.3}",
        temperature_thresholds.low_threshold,
        temperature_thresholds.medium_threshold,
        temperature_thresholds.high_threshold
    );

    ClimateLayers {
        seeds,
        temperature,
        temperature_thresholds,
        precipitation,
    }
}
