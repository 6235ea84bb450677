//! Maritime moisture: distance to the ocean and the coastal bonus.

use std::collections::VecDeque;

use crate::config::CoastalParams;
use crate::tilemap::Tilemap;

/// Multi-source BFS distance (4-connected steps) from every ocean cell.
///
/// Ocean cells are `0`. Without any ocean every cell is `f32::INFINITY`.
pub fn distance_to_ocean(ocean: &Tilemap<bool>) -> Tilemap<f32> {
    let mut distance = Tilemap::new_with(ocean.width, ocean.height, f32::INFINITY);
    let mut queue = VecDeque::new();

    for (x, y, &is_ocean) in ocean.iter() {
        if is_ocean {
            distance.set(x, y, 0.0);
            queue.push_back((x, y));
        }
    }

    while let Some((x, y)) = queue.pop_front() {
        let next = *distance.get(x, y) + 1.0;
        for (nx, ny) in ocean.neighbors_4(x, y) {
            if next < *distance.get(nx, ny) {
                distance.set(nx, ny, next);
                queue.push_back((nx, ny));
            }
        }
    }

    distance
}

/// Bonus for a land cell `distance` cells from the coast standing
/// `height_above_sea` over sea level.
///
/// Decays as `sqrt(1 - d/reach)` and is cut by up to `resistance_strength`
/// as the cell rises toward `resistance_height`.
pub fn coastal_bonus(distance: f32, height_above_sea: f32, params: &CoastalParams) -> f32 {
    if !distance.is_finite() {
        return 0.0;
    }
    let reach = (1.0 - distance / params.reach).max(0.0);
    let decay = params.max_bonus * reach.sqrt();
    let resistance = (height_above_sea.max(0.0) / params.resistance_height).min(1.0);
    decay * (1.0 - params.resistance_strength * resistance)
}

/// Add the coastal bonus to land cells, clamped to `[0, 1]`.
pub fn apply_coastal_moisture(
    precipitation: &Tilemap<f32>,
    heightmap: &Tilemap<f32>,
    ocean: &Tilemap<bool>,
    distance: &Tilemap<f32>,
    sea_level: f32,
    params: &CoastalParams,
) -> Tilemap<f32> {
    Tilemap::from_fn_par(precipitation.width, precipitation.height, |x, y| {
        let p = *precipitation.get(x, y);
        if *ocean.get(x, y) {
            return p;
        }
        let bonus = coastal_bonus(*distance.get(x, y), heightmap.get(x, y) - sea_level, params);
        (p + bonus).clamp(0.0, 1.0)
    })
}
