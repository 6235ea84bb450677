//! One-shot generation: validate, run hydrology, run climate.

use crate::climate::run_climate;
use crate::config::GenerationParameters;
use crate::error::GenerationError;
use crate::hydrology::{run_hydrology, Relief};
use crate::tilemap::Tilemap;
use crate::util::{PipelineStep, Timed};
use crate::world::{GenerationInput, WorldLayers, WorldParameters};

/// Produce every layer for `input`.
///
/// All validation happens before the first stage runs, so an error means no
/// work was done. The result is fully built before it is returned.
pub fn generate(
    input: &GenerationInput,
    world: &WorldParameters,
    params: &GenerationParameters,
) -> Result<WorldLayers, GenerationError> {
    input.validate()?;
    world.validate()?;
    params.validate()?;

    let _t = Timed::start(PipelineStep::Generation);
    let heightmap = &input.heightmap;
    log::info!(
        "Generating {}x{} world (seed {}, sea level {:.3}, tilt {:.1}°, star distance {:.2})",
        heightmap.width,
        heightmap.height,
        world.seed,
        input.sea_level,
        world.axial_tilt_deg,
        world.distance_to_star
    );

    let hydrology = run_hydrology(heightmap, input.sea_level, &params.hydrology);
    if !hydrology.forced_sinks.is_empty() {
        log::warn!("{} cells forced to sinks after a flow cycle", hydrology.forced_sinks.len());
    }

    let relief = Tilemap::from_fn(heightmap.width, heightmap.height, |x, y| {
        Relief::classify(*heightmap.get(x, y), *hydrology.ocean.get(x, y), &params.hydrology.levels)
    });

    let climate = run_climate(heightmap, &hydrology.ocean, input.sea_level, world, params);

    Ok(WorldLayers {
        width: heightmap.width,
        height: heightmap.height,
        sea_level: input.sea_level,
        world: *world,
        heightmap: heightmap.clone(),
        plates: input.plates.clone(),
        relief,
        hydrology,
        climate,
    })
}
