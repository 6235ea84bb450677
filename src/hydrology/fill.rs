//! Priority-flood pit filling (Barnes et al. 2014).
//!
//! The flood starts from the ocean (or the edge outlet of an ocean-less map)
//! and from the rims of preserved basins, and works upward. Every other cell
//! ends up at least as high as the cell that reached it, so every filled cell
//! has a descending (or, in `Flat` mode, level) path back to a seed.

use crate::config::PitFillMode;
use crate::hydrology::basins::PreservedBasins;
use crate::hydrology::flood::{self, FloodQueue};
use crate::tilemap::Tilemap;

/// Fill every depression that is neither ocean nor a preserved basin.
///
/// Ocean and basin cells keep their raw elevation. Without an ocean the map
/// drains through [`flood::outlet_cells`], which also keep theirs.
pub fn fill_pits(
    heightmap: &Tilemap<f32>,
    ocean: &Tilemap<bool>,
    basins: &PreservedBasins,
    mode: PitFillMode,
    epsilon: f32,
) -> Tilemap<f32> {
    let width = heightmap.width;
    let height = heightmap.height;
    let mut filled = heightmap.clone();
    let mut visited = Tilemap::new_with(width, height, false);
    let mut queue = FloodQueue::new();

    for (x, y, &h) in heightmap.iter() {
        if *ocean.get(x, y) {
            visited.set(x, y, true);
            queue.push(h, heightmap.index(x, y));
        } else if basins.contains(x, y) {
            // Interior cells are never queued; only the rim feeds the flood.
            visited.set(x, y, true);
            let on_rim = heightmap
                .neighbors_8(x, y)
                .any(|(nx, ny)| !basins.contains(nx, ny));
            if on_rim {
                queue.push(h, heightmap.index(x, y));
            }
        }
    }
    for (x, y) in flood::outlet_cells(heightmap, ocean) {
        if !*visited.get(x, y) {
            visited.set(x, y, true);
            queue.push(*heightmap.get(x, y), heightmap.index(x, y));
        }
    }

    while let Some((level, idx)) = queue.pop() {
        let (cx, cy) = heightmap.coords(idx);
        let floor = match mode {
            PitFillMode::Flat => level,
            PitFillMode::Epsilon => (level + epsilon).max(next_up(level)),
        };

        for (nx, ny) in heightmap.neighbors_8(cx, cy) {
            if *visited.get(nx, ny) {
                continue;
            }
            visited.set(nx, ny, true);
            let value = heightmap.get(nx, ny).max(floor);
            filled.set(nx, ny, value);
            queue.push(value, heightmap.index(nx, ny));
        }
    }

    filled
}

/// Smallest `f32` strictly greater than `value` (finite inputs only).
pub fn next_up(value: f32) -> f32 {
    if value.is_nan() || value == f32::INFINITY {
        return value;
    }
    if value == 0.0 {
        return f32::from_bits(1);
    }
    let bits = value.to_bits();
    if value > 0.0 {
        f32::from_bits(bits + 1)
    } else {
        f32::from_bits(bits - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hydrology::basins::{find_depressions, preserve_basins};
    use crate::hydrology::ocean::{local_minima, ocean_mask};

    /// Dome rising to the centre; every border cell sits below sea level 0.1.
    fn dome() -> Tilemap<f32> {
        Tilemap::from_fn(12, 12, |x, y| {
            let dx = x as f32 - 5.5;
            let dy = y as f32 - 5.5;
            1.0 - (dx * dx + dy * dy).sqrt() / 6.0
        })
    }

    fn island_with_pits() -> Tilemap<f32> {
        let mut map = dome();
        map.set(4, 4, 0.2);
        map.set(7, 6, 0.3);
        map
    }

    fn filled_for(
        map: &Tilemap<f32>,
        min_area: usize,
        mode: PitFillMode,
    ) -> (Tilemap<f32>, Tilemap<bool>, PreservedBasins) {
        let ocean = ocean_mask(map, 0.1);
        let basins = preserve_basins(map, find_depressions(map, &ocean), min_area);
        let filled = fill_pits(map, &ocean, &basins, mode, 1e-5);
        (filled, ocean, basins)
    }

    #[test]
    fn test_fill_never_lowers_and_keeps_ocean() {
        let map = island_with_pits();
        let (filled, ocean, _) = filled_for(&map, 1000, PitFillMode::Epsilon);
        for (x, y, &h) in map.iter() {
            assert!(*filled.get(x, y) >= h);
            if *ocean.get(x, y) {
                assert_eq!(*filled.get(x, y), h);
            }
        }
        assert!(*filled.get(4, 4) > 0.2);
        assert!(*filled.get(7, 6) > 0.3);
    }

    #[test]
    fn test_no_minima_remain_after_epsilon_fill() {
        let map = island_with_pits();
        let (filled, ocean, basins) = filled_for(&map, 1000, PitFillMode::Epsilon);
        let mask = basins.mask();
        assert!(local_minima(&filled, &ocean, Some(&mask)).is_empty());
    }

    #[test]
    fn test_refilling_is_idempotent() {
        let map = island_with_pits();
        let (filled, ocean, basins) = filled_for(&map, 1000, PitFillMode::Epsilon);
        let again = fill_pits(&filled, &ocean, &basins, PitFillMode::Epsilon, 1e-5);
        assert_eq!(filled, again);
    }

    #[test]
    fn test_preserved_basins_keep_raw_elevation() {
        let mut map = dome();
        for y in 5..8 {
            for x in 5..8 {
                map.set(x, y, 0.3);
            }
        }
        map.set(6, 6, 0.25);
        map.set(3, 7, 0.2);
        let (filled, ocean, basins) = filled_for(&map, 5, PitFillMode::Epsilon);

        assert_eq!(basins.len(), 1);
        assert!(basins.contains(6, 6));
        for basin in basins.iter() {
            for &(x, y) in &basin.cells {
                assert_eq!(*filled.get(x, y), *map.get(x, y));
            }
        }
        // The single-cell pit was still filled.
        assert!(*filled.get(3, 7) > 0.2);
        let mask = basins.mask();
        assert!(local_minima(&filled, &ocean, Some(&mask)).is_empty());
    }

    #[test]
    fn test_flat_mode_fills_to_spill_level() {
        let mut map = Tilemap::from_fn(5, 5, |x, y| {
            if x == 0 || y == 0 || x == 4 || y == 4 {
                -1.0
            } else {
                1.0
            }
        });
        map.set(2, 2, 0.5);
        let (filled, _, _) = filled_for(&map, 1000, PitFillMode::Flat);
        assert_eq!(*filled.get(2, 2), 1.0);
    }

    #[test]
    fn test_equal_pits_fill_to_the_same_level() {
        let mut map = Tilemap::from_fn(7, 5, |x, y| {
            if x == 0 || y == 0 || x == 6 || y == 4 {
                -1.0
            } else {
                1.0
            }
        });
        map.set(2, 2, 0.5);
        map.set(4, 2, 0.5);
        let (filled, _, _) = filled_for(&map, 1000, PitFillMode::Epsilon);

        assert!(*filled.get(2, 2) > 1.0);
        assert_eq!(*filled.get(2, 2), *filled.get(4, 2));
        let (again, _, _) = filled_for(&map, 1000, PitFillMode::Epsilon);
        assert_eq!(filled, again);
    }

    #[test]
    fn test_flat_map_without_ocean_stays_flat() {
        let map = Tilemap::new_with(5, 5, 0.5f32);
        let ocean = ocean_mask(&map, 0.3);
        let filled = fill_pits(&map, &ocean, &PreservedBasins::empty(5, 5), PitFillMode::Epsilon, 1e-5);
        assert_eq!(filled, map);
    }

    #[test]
    fn test_ramp_without_ocean_is_untouched() {
        let map = Tilemap::from_fn(10, 10, |x, y| 1.0 - (x + y) as f32 / 18.0);
        let ocean = ocean_mask(&map, -1.0);
        let filled = fill_pits(&map, &ocean, &PreservedBasins::empty(10, 10), PitFillMode::Epsilon, 1e-5);
        assert_eq!(filled, map);
    }

    #[test]
    fn test_pit_without_ocean_drains_to_edge_outlet() {
        // The interior pit is the global minimum but not the outlet.
        let mut map = Tilemap::new_with(6, 6, 1.0f32);
        map.set(3, 3, 0.1);
        map.set(5, 2, 0.6);
        let ocean = ocean_mask(&map, 0.0);
        let filled = fill_pits(&map, &ocean, &PreservedBasins::empty(6, 6), PitFillMode::Epsilon, 1e-5);

        assert!(*filled.get(3, 3) > 1.0);
        assert_eq!(*filled.get(5, 2), 0.6);
        assert_eq!(local_minima(&filled, &ocean, None), vec![(5, 2)]);
    }

    #[test]
    fn test_next_up() {
        assert!(next_up(1.0) > 1.0);
        assert!(next_up(-1.0) > -1.0);
        assert!(next_up(0.0) > 0.0);
        assert!(next_up(-0.0) > 0.0);
        assert_eq!(next_up(1.0e6) - 1.0e6, 0.0625);
    }
}
