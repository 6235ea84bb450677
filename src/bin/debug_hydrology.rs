//! Debug tool for the hydrology track.
//! Runs every synthetic terrain through both fill modes and prints the
//! invariant report for each.

use std::process::ExitCode;

use hydroclimate::config::{HydrologyParams, PitFillMode};
use hydroclimate::hydrology::run_hydrology;
use hydroclimate::hydrology::validate::check_invariants;
use hydroclimate::synthetic;
use hydroclimate::tilemap::Tilemap;

const SEED: u32 = 42;

fn main() -> ExitCode {
    env_logger::init();

    let terrains: Vec<(&str, Tilemap<f32>, f32)> = vec![
        ("ramp", synthetic::ramp(64, 64), 0.1),
        ("dry ramp", synthetic::ramp(64, 64), -1.0),
        ("flat", synthetic::flat(32, 32, 0.5), 0.3),
        ("ridge", synthetic::ridge(96, 48, 48, 6, 0.9), 0.1),
        ("bowl", synthetic::bowl(33, 0.8, 8.0, 0.5), 0.1),
        ("island", synthetic::noise_island(256, 128, SEED), 0.3),
    ];

    let mut failures = 0;
    for (name, heightmap, sea_level) in &terrains {
        for mode in [PitFillMode::Epsilon, PitFillMode::Flat] {
            println!();
            println!("=== {} ({}x{}, {:?} fill) ===", name, heightmap.width, heightmap.height, mode);
            let params = HydrologyParams {
                pit_fill: mode,
                ..HydrologyParams::default()
            };
            let layers = run_hydrology(heightmap, *sea_level, &params);
            let stats = layers.river_stats();
            println!(
                "Ocean {} cells, outlet {} cells, {} basins, {} pre-fill minima, {} sinks",
                layers.ocean_cells(),
                layers.outlet.len(),
                layers.basins.len(),
                layers.pre_fill_minima.len(),
                layers.flow.sink_count()
            );
            println!(
                "Rivers: {} ({} to ocean, {} to basins, {} to sinks), max length {}",
                stats.count, stats.reaching_ocean, stats.ending_in_basins, stats.ending_in_sinks, stats.max_length
            );

            let report = check_invariants(&layers, mode);
            report.print();
            if !report.is_clean() {
                failures += 1;
            }
        }
    }

    println!();
    if failures == 0 {
        println!("All hydrology invariants hold.");
        ExitCode::SUCCESS
    } else {
        println!("{} runs violated invariants.", failures);
        ExitCode::FAILURE
    }
}
