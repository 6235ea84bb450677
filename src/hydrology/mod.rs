//! Hydrology track: ocean, basins, pit filling, D8 routing, accumulation and
//! river sources.
//!
//! Stages run strictly in order and each produces its grid exactly once:
//!
//! 1. [`ocean::ocean_mask`] and the pre-fill local minima
//! 2. [`basins::find_depressions`] + [`basins::preserve_basins`]
//! 3. [`fill::fill_pits`]
//! 4. [`flow::FlowDirections::route`]
//! 5. [`accumulation::accumulate_resolving_cycles`]
//! 6. [`rivers::find_river_sources`] + [`rivers::trace_rivers`]

pub mod accumulation;
pub mod basins;
pub mod fill;
pub mod flood;
pub mod flow;
pub mod ocean;
pub mod rivers;
pub mod validate;

use crate::config::HydrologyParams;
use crate::tilemap::Tilemap;
use crate::util::{PipelineStep, Timed};

pub use basins::{Basin, BasinRole, PreservedBasins};
pub use flow::{FlowDirections, SINK};
pub use rivers::{Relief, RiverNetworkStats, RiverPath, Terminus};

/// Every grid the hydrology track produces.
#[derive(Clone, Debug)]
pub struct HydrologyLayers {
    pub ocean: Tilemap<bool>,
    /// Land local minima on the raw heightmap, before any filling.
    pub pre_fill_minima: Vec<(usize, usize)>,
    pub basins: PreservedBasins,
    /// Edge cells an ocean-less map drains through; empty when there is ocean.
    pub outlet: Vec<(usize, usize)>,
    pub filled: Tilemap<f32>,
    pub flow: FlowDirections,
    pub accumulation: Tilemap<f32>,
    /// Cells forced to sinks because their directions formed a cycle.
    pub forced_sinks: Vec<(usize, usize)>,
    pub river_sources: Vec<(usize, usize)>,
    pub rivers: Vec<RiverPath>,
}

impl HydrologyLayers {
    pub fn river_stats(&self) -> RiverNetworkStats {
        RiverNetworkStats::from_paths(&self.rivers)
    }

    pub fn ocean_cells(&self) -> usize {
        ocean::count_ocean(&self.ocean)
    }
}

/// Run the whole hydrology track over a validated heightmap.
pub fn run_hydrology(heightmap: &Tilemap<f32>, sea_level: f32, params: &HydrologyParams) -> HydrologyLayers {
    let _t = Timed::start(PipelineStep::Hydrology);

    let (ocean, pre_fill_minima) = {
        let _t = Timed::start(PipelineStep::ElevationClassification);
        let ocean = ocean::ocean_mask(heightmap, sea_level);
        let minima = ocean::local_minima(heightmap, &ocean, None);
        (ocean, minima)
    };
    log::debug!(
        "Ocean cells: {}, pre-fill minima: {}",
        ocean::count_ocean(&ocean),
        pre_fill_minima.len()
    );
    let outlet = flood::outlet_cells(heightmap, &ocean);
    if !outlet.is_empty() {
        log::info!("No ocean below sea level {}; draining through {} edge cells", sea_level, outlet.len());
    }

    let basins = {
        let _t = Timed::start(PipelineStep::BasinPreservation);
        let depressions = basins::find_depressions(heightmap, &ocean);
        let found = depressions.len();
        let kept = basins::preserve_basins(heightmap, depressions, params.min_basin_area);
        log::debug!(
            "Depressions: {} found, {} preserved (min area {})",
            found,
            kept.len(),
            params.min_basin_area
        );
        kept
    };

    let filled = {
        let _t = Timed::start(PipelineStep::PitFilling);
        fill::fill_pits(heightmap, &ocean, &basins, params.pit_fill, params.fill_epsilon)
    };

    let mut flow = {
        let _t = Timed::start(PipelineStep::FlowRouting);
        FlowDirections::route(&filled, &basins)
    };

    let (accumulation, forced_sinks) = {
        let _t = Timed::start(PipelineStep::FlowAccumulation);
        let (acc, forced) = accumulation::accumulate_resolving_cycles(&mut flow);
        (acc.values, forced)
    };

    let (river_sources, rivers) = {
        let _t = Timed::start(PipelineStep::RiverSources);
        let sources = rivers::find_river_sources(
            &filled,
            &accumulation,
            params.levels.mountain,
            params.river_source_accumulation,
        );
        let paths = rivers::trace_rivers(&sources, &flow, &ocean, &basins);
        (sources, paths)
    };

    log::info!(
        "Hydrology: {} basins, {} river sources, {} sinks",
        basins.len(),
        river_sources.len(),
        flow.sink_count()
    );

    HydrologyLayers {
        ocean,
        pre_fill_minima,
        basins,
        outlet,
        filled,
        flow,
        accumulation,
        forced_sinks,
        river_sources,
        rivers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PitFillMode;

    #[test]
    fn test_ramp_scenario() {
        let heightmap = Tilemap::from_fn(10, 10, |x, y| 1.0 - (x + y) as f32 / 18.0);
        let layers = run_hydrology(&heightmap, 0.1, &HydrologyParams::default());

        assert_eq!(*layers.accumulation.get(9, 9), 100.0);
        assert!(layers.basins.is_empty());
        assert!(layers.forced_sinks.is_empty());
        // Every path ends at the south-east corner.
        for y in 0..10 {
            for x in 0..10 {
                let (mut cx, mut cy) = (x, y);
                while let Some(next) = layers.flow.downstream(cx, cy) {
                    (cx, cy) = next;
                }
                assert_eq!((cx, cy), (9, 9));
            }
        }
    }

    #[test]
    fn test_ramp_without_ocean_drains_to_corner() {
        let heightmap = Tilemap::from_fn(10, 10, |x, y| 1.0 - (x + y) as f32 / 18.0);
        let layers = run_hydrology(&heightmap, -1.0, &HydrologyParams::default());

        assert_eq!(layers.ocean_cells(), 0);
        assert!(layers.basins.is_empty());
        assert_eq!(layers.outlet, vec![(9, 9)]);
        assert_eq!(layers.flow.sink_count(), 1);
        assert_eq!(*layers.accumulation.get(9, 9), 100.0);
        for y in 0..10 {
            for x in 0..10 {
                let (mut cx, mut cy) = (x, y);
                while let Some(next) = layers.flow.downstream(cx, cy) {
                    (cx, cy) = next;
                }
                assert_eq!((cx, cy), (9, 9));
            }
        }
    }

    #[test]
    fn test_flat_scenario_is_one_plateau() {
        let heightmap = Tilemap::new_with(5, 5, 0.5f32);
        let layers = run_hydrology(&heightmap, 0.3, &HydrologyParams::default());

        assert_eq!(layers.ocean_cells(), 0);
        assert!(layers.basins.is_empty());
        assert_eq!(layers.outlet.len(), 25);
        assert_eq!(layers.flow.sink_count(), 25);
        assert_eq!(layers.filled, heightmap);
    }

    #[test]
    fn test_flat_scenario_ignores_min_area() {
        let heightmap = Tilemap::new_with(5, 5, 0.5f32);
        let params = HydrologyParams {
            min_basin_area: 1,
            ..HydrologyParams::default()
        };
        let layers = run_hydrology(&heightmap, 0.3, &params);

        assert!(layers.basins.is_empty());
        assert_eq!(layers.filled, heightmap);
        assert_eq!(layers.flow.sink_count(), 25);
        assert!(layers.accumulation.as_slice().iter().all(|&a| a == 1.0));
    }

    #[test]
    fn test_reruns_are_identical() {
        let heightmap = Tilemap::from_fn(16, 12, |x, y| {
            ((x as f32 * 0.7).sin() + (y as f32 * 0.45).cos()) * 0.5 + 0.3
        });
        let params = HydrologyParams {
            min_basin_area: 3,
            pit_fill: PitFillMode::Epsilon,
            ..HydrologyParams::default()
        };
        let a = run_hydrology(&heightmap, 0.0, &params);
        let b = run_hydrology(&heightmap, 0.0, &params);

        assert_eq!(a.filled, b.filled);
        assert_eq!(a.flow, b.flow);
        assert_eq!(a.accumulation, b.accumulation);
        assert_eq!(a.river_sources, b.river_sources);
        let centers_a: Vec<_> = a.basins.iter().map(|b| (b.center, b.pour_point)).collect();
        let centers_b: Vec<_> = b.basins.iter().map(|b| (b.center, b.pour_point)).collect();
        assert_eq!(centers_a, centers_b);
    }
}
