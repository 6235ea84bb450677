//! Ocean detection and local-minimum extraction.
//!
//! Ocean is water that can reach the map border: every cell at or below sea
//! level that is 4-connected to a border cell at or below sea level. Cells
//! below sea level that cannot reach the border are land here; they become
//! candidate basin interiors.

use std::collections::VecDeque;

use rayon::prelude::*;

use crate::tilemap::Tilemap;

/// Flood-fill the ocean from every submerged border cell (4-connectivity).
pub fn ocean_mask(heightmap: &Tilemap<f32>, sea_level: f32) -> Tilemap<bool> {
    let width = heightmap.width;
    let height = heightmap.height;
    let mut ocean = Tilemap::new_with(width, height, false);
    let mut queue = VecDeque::new();

    let submerged = |x: usize, y: usize| *heightmap.get(x, y) <= sea_level;

    for y in 0..height {
        for x in 0..width {
            if heightmap.is_border(x, y) && submerged(x, y) {
                ocean.set(x, y, true);
                queue.push_back((x, y));
            }
        }
    }

    while let Some((x, y)) = queue.pop_front() {
        for (nx, ny) in heightmap.neighbors_4(x, y) {
            if !*ocean.get(nx, ny) && submerged(nx, ny) {
                ocean.set(nx, ny, true);
                queue.push_back((nx, ny));
            }
        }
    }

    ocean
}

/// Land cells whose elevation is `<=` every 8-connected neighbour.
///
/// Ties count as minima, so a flat region yields all of its interior cells.
/// Cells flagged in `exclude` (for example preserved basins) are skipped, as
/// are ocean cells. Results are in row-major order.
pub fn local_minima(
    heightmap: &Tilemap<f32>,
    ocean: &Tilemap<bool>,
    exclude: Option<&Tilemap<bool>>,
) -> Vec<(usize, usize)> {
    (0..heightmap.height)
        .into_par_iter()
        .flat_map_iter(|y| {
            (0..heightmap.width).filter_map(move |x| {
                if *ocean.get(x, y) || exclude.is_some_and(|mask| *mask.get(x, y)) {
                    return None;
                }
                let h = *heightmap.get(x, y);
                let is_minimum = heightmap
                    .neighbors_8(x, y)
                    .all(|(nx, ny)| h <= *heightmap.get(nx, ny));
                is_minimum.then_some((x, y))
            })
        })
        .collect()
}

/// Number of ocean cells in a mask.
pub fn count_ocean(ocean: &Tilemap<bool>) -> usize {
    ocean.iter().filter(|(_, _, &o)| o).count()
}
