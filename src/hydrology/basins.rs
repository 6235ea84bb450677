//! Closed-depression discovery and basin preservation.
//!
//! A priority flood grows inward from the ocean, lowest cell first; a map
//! without ocean is flooded from its outlet on the edge instead. Whenever
//! the flood steps from a cell at level `L` onto a neighbour lower than `L`,
//! it has found a depression: every cell below `L` connected to that
//! neighbour is collected as one depression whose surface is `L` and whose
//! pour point is the cell the flood came from. Large depressions are kept as
//! lakes or inner seas; small ones are left for the pit filler.

use std::collections::VecDeque;

use crate::hydrology::flood::{self, is_lower, FloodQueue};
use crate::tilemap::Tilemap;

/// A depression found by the flood, before the area filter.
#[derive(Clone, Debug)]
pub struct Depression {
    /// Row-major cells, in discovery order.
    pub cells: Vec<(usize, usize)>,
    /// Level the depression fills to before spilling.
    pub spill_elevation: f32,
    /// Lowest cell inside the depression (earliest row-major on ties).
    pub lowest: Option<(usize, usize)>,
    /// Cell the depression overflows through.
    pub pour_point: Option<(usize, usize)>,
}

/// A preserved closed depression: future lake or inner sea.
#[derive(Clone, Debug, PartialEq)]
pub struct Basin {
    pub id: usize,
    pub cells: Vec<(usize, usize)>,
    pub area: usize,
    /// Surface elevation minus the lowest cell's elevation.
    pub depth: f32,
    /// The basin's deepest cell.
    pub center: (usize, usize),
    /// Lowest cell on the basin rim; where it would overflow.
    pub pour_point: (usize, usize),
    pub surface_elevation: f32,
}

/// How a cell relates to a preserved basin, for display layers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum BasinRole {
    Interior,
    Center,
    PourPoint,
}

/// All preserved basins plus per-cell membership and role indexes.
#[derive(Clone, Debug)]
pub struct PreservedBasins {
    basins: Vec<Basin>,
    membership: Tilemap<Option<usize>>,
    roles: Tilemap<Option<(usize, BasinRole)>>,
}

impl PreservedBasins {
    /// No basins on a `width × height` map.
    pub fn empty(width: usize, height: usize) -> Self {
        Self {
            basins: Vec::new(),
            membership: Tilemap::new_with(width, height, None),
            roles: Tilemap::new_with(width, height, None),
        }
    }

    fn from_basins(width: usize, height: usize, basins: Vec<Basin>) -> Self {
        let mut membership = Tilemap::new_with(width, height, None);
        let mut roles = Tilemap::new_with(width, height, None);
        for basin in &basins {
            for &(x, y) in &basin.cells {
                membership.set(x, y, Some(basin.id));
                roles.set(x, y, Some((basin.id, BasinRole::Interior)));
            }
        }
        // Markers overwrite interiors; walking backwards lets the lowest id
        // win a shared cell, and a basin's center wins over its pour point.
        for basin in basins.iter().rev() {
            let (px, py) = basin.pour_point;
            roles.set(px, py, Some((basin.id, BasinRole::PourPoint)));
            let (cx, cy) = basin.center;
            roles.set(cx, cy, Some((basin.id, BasinRole::Center)));
        }
        Self {
            basins,
            membership,
            roles,
        }
    }

    pub fn len(&self) -> usize {
        self.basins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.basins.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Basin> {
        self.basins.iter()
    }

    pub fn get(&self, id: usize) -> Option<&Basin> {
        self.basins.get(id)
    }

    /// Does any preserved basin contain this cell?
    pub fn contains(&self, x: usize, y: usize) -> bool {
        self.basin_id_at(x, y).is_some()
    }

    pub fn basin_id_at(&self, x: usize, y: usize) -> Option<usize> {
        self.membership.try_get(x, y).copied().flatten()
    }

    pub fn basin_at(&self, x: usize, y: usize) -> Option<&Basin> {
        self.basin_id_at(x, y).and_then(|id| self.basins.get(id))
    }

    /// Role of a cell relative to the basins. Center and pour point win over
    /// plain membership; a pour point outside its basin still reports its role.
    pub fn role_at(&self, x: usize, y: usize) -> Option<(usize, BasinRole)> {
        self.roles.try_get(x, y).copied().flatten()
    }

    /// Boolean footprint of all basins.
    pub fn mask(&self) -> Tilemap<bool> {
        self.membership.map(|m| m.is_some())
    }

    /// Total number of preserved cells.
    pub fn cell_count(&self) -> usize {
        self.basins.iter().map(|b| b.area).sum()
    }
}

/// Find every closed depression on the map.
///
/// The flood is seeded from the ocean. A map with no ocean drains off its
/// edge instead, so the flood starts from [`flood::outlet_cells`].
pub fn find_depressions(heightmap: &Tilemap<f32>, ocean: &Tilemap<bool>) -> Vec<Depression> {
    let mut processed = Tilemap::new_with(heightmap.width, heightmap.height, false);
    let mut queue = FloodQueue::new();
    let mut depressions = Vec::new();

    let seeds = ocean
        .iter()
        .filter(|(_, _, &o)| o)
        .map(|(x, y, _)| (x, y))
        .chain(flood::outlet_cells(heightmap, ocean));
    for (x, y) in seeds {
        processed.set(x, y, true);
        queue.push(*heightmap.get(x, y), heightmap.index(x, y));
    }

    while let Some((level, idx)) = queue.pop() {
        let (cx, cy) = heightmap.coords(idx);

        for (nx, ny) in heightmap.neighbors_8(cx, cy) {
            if *processed.get(nx, ny) {
                continue;
            }
            processed.set(nx, ny, true);
            let elevation = *heightmap.get(nx, ny);

            if elevation >= level {
                queue.push(elevation, heightmap.index(nx, ny));
                continue;
            }

            // Stepped down off the rim: collect everything below the spill level.
            let mut cells = vec![(nx, ny)];
            let mut lowest = (nx, ny);
            let mut inner = VecDeque::from([(nx, ny)]);

            while let Some((bx, by)) = inner.pop_front() {
                for (ox, oy) in heightmap.neighbors_8(bx, by) {
                    if *processed.get(ox, oy) {
                        continue;
                    }
                    let e = *heightmap.get(ox, oy);
                    processed.set(ox, oy, true);
                    if e < level {
                        cells.push((ox, oy));
                        inner.push_back((ox, oy));
                        if is_lower(heightmap, (ox, oy), lowest) {
                            lowest = (ox, oy);
                        }
                    } else {
                        // Far shore: back onto the main flood.
                        queue.push(e, heightmap.index(ox, oy));
                    }
                }
            }

            depressions.push(Depression {
                cells,
                spill_elevation: level,
                lowest: Some(lowest),
                pour_point: Some((cx, cy)),
            });
        }
    }

    depressions
}

/// Keep depressions of at least `min_area` cells; drop degenerate ones.
///
/// Ids are assigned in discovery order, which is fixed by the flood's
/// `(elevation, row-major index)` ordering.
pub fn preserve_basins(
    heightmap: &Tilemap<f32>,
    depressions: Vec<Depression>,
    min_area: usize,
) -> PreservedBasins {
    let mut basins = Vec::new();

    for depression in depressions {
        let (Some(center), Some(pour_point)) = (depression.lowest, depression.pour_point) else {
            log::debug!("Dropping degenerate depression: no lowest cell or pour point");
            continue;
        };
        if depression.cells.is_empty() || !depression.spill_elevation.is_finite() {
            log::debug!("Dropping degenerate depression at {:?}", center);
            continue;
        }
        if depression.cells.len() < min_area {
            continue;
        }

        let floor = *heightmap.get(center.0, center.1);
        basins.push(Basin {
            id: basins.len(),
            area: depression.cells.len(),
            depth: (depression.spill_elevation - floor).max(0.0),
            center,
            pour_point,
            surface_elevation: depression.spill_elevation,
            cells: depression.cells,
        });
    }

    PreservedBasins::from_basins(heightmap.width, heightmap.height, basins)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hydrology::ocean::ocean_mask;

    /// 11x11 plateau at 1.0 bordered by ocean, with a 3x3 bowl in the middle
    /// and a single-cell pit near a corner.
    fn plateau_with_bowl() -> Tilemap<f32> {
        let mut map = Tilemap::from_fn(11, 11, |x, y| {
            if x == 0 || y == 0 || x == 10 || y == 10 {
                -1.0
            } else {
                1.0
            }
        });
        for y in 4..7 {
            for x in 4..7 {
                map.set(x, y, 0.6);
            }
        }
        map.set(5, 5, 0.4);
        map.set(2, 8, 0.8);
        map
    }

    #[test]
    fn test_finds_bowl_and_pit() {
        let map = plateau_with_bowl();
        let ocean = ocean_mask(&map, 0.0);
        let depressions = find_depressions(&map, &ocean);

        assert_eq!(depressions.len(), 2);
        let bowl = depressions.iter().find(|d| d.cells.len() == 9).unwrap();
        assert_eq!(bowl.spill_elevation, 1.0);
        assert_eq!(bowl.lowest, Some((5, 5)));

        let pit = depressions.iter().find(|d| d.cells.len() == 1).unwrap();
        assert_eq!(pit.cells, vec![(2, 8)]);
    }

    #[test]
    fn test_min_area_filters_small_depressions() {
        let map = plateau_with_bowl();
        let ocean = ocean_mask(&map, 0.0);
        let basins = preserve_basins(&map, find_depressions(&map, &ocean), 5);

        assert_eq!(basins.len(), 1);
        let bowl = basins.get(0).unwrap();
        assert_eq!(bowl.area, 9);
        assert_eq!(bowl.center, (5, 5));
        approx::assert_abs_diff_eq!(bowl.depth, 0.6, epsilon = 1e-6);
        approx::assert_abs_diff_eq!(bowl.surface_elevation, 1.0);
        assert!(basins.contains(4, 4));
        assert!(!basins.contains(2, 8));

        // Pour point is on the rim, outside the bowl.
        let (px, py) = bowl.pour_point;
        assert_eq!(basins.basin_id_at(px, py), None);
        assert_eq!(*map.get(px, py), 1.0);
    }

    #[test]
    fn test_roles() {
        let map = plateau_with_bowl();
        let ocean = ocean_mask(&map, 0.0);
        let basins = preserve_basins(&map, find_depressions(&map, &ocean), 5);
        let pour = basins.get(0).unwrap().pour_point;

        assert_eq!(basins.role_at(5, 5), Some((0, BasinRole::Center)));
        assert_eq!(basins.role_at(4, 6), Some((0, BasinRole::Interior)));
        assert_eq!(basins.role_at(pour.0, pour.1), Some((0, BasinRole::PourPoint)));
        assert_eq!(basins.role_at(9, 9), None);
    }

    #[test]
    fn test_basins_never_overlap_ocean() {
        // Submerged inland pocket: below sea level but not border-connected.
        let mut map = plateau_with_bowl();
        map.set(5, 5, -0.5);
        let ocean = ocean_mask(&map, 0.0);
        let basins = preserve_basins(&map, find_depressions(&map, &ocean), 1);

        for basin in basins.iter() {
            for &(x, y) in &basin.cells {
                assert!(!*ocean.get(x, y));
            }
        }
        assert!(basins.contains(5, 5));
    }

    #[test]
    fn test_role_lookup_matches_basin_records() {
        let mut map = plateau_with_bowl();
        map.set(2, 8, 0.2);
        let ocean = ocean_mask(&map, 0.0);
        let basins = preserve_basins(&map, find_depressions(&map, &ocean), 1);
        assert_eq!(basins.len(), 2);

        for basin in basins.iter() {
            for &(x, y) in &basin.cells {
                let expected = if (x, y) == basin.center {
                    BasinRole::Center
                } else {
                    BasinRole::Interior
                };
                assert_eq!(basins.role_at(x, y), Some((basin.id, expected)));
            }
            let (px, py) = basin.pour_point;
            assert_eq!(basins.role_at(px, py), Some((basin.id, BasinRole::PourPoint)));
        }
        assert_eq!(basins.role_at(11, 0), None);
    }

    #[test]
    fn test_flat_map_without_ocean_has_no_depression() {
        let map = Tilemap::new_with(5, 5, 0.5f32);
        let ocean = ocean_mask(&map, 0.3);
        assert!(find_depressions(&map, &ocean).is_empty());
        assert!(preserve_basins(&map, find_depressions(&map, &ocean), 1).is_empty());
    }

    #[test]
    fn test_ramp_without_ocean_has_no_depression() {
        let map = Tilemap::from_fn(10, 10, |x, y| 1.0 - (x + y) as f32 / 18.0);
        let ocean = ocean_mask(&map, -1.0);
        assert!(find_depressions(&map, &ocean).is_empty());
    }

    #[test]
    fn test_bowl_found_without_ocean() {
        // Same plateau, but the border is raised above sea level.
        let raw = plateau_with_bowl();
        let map = Tilemap::from_fn(11, 11, |x, y| if raw.is_border(x, y) { 0.9 } else { *raw.get(x, y) });
        let ocean = ocean_mask(&map, 0.0);
        let depressions = find_depressions(&map, &ocean);

        let bowl = depressions.iter().find(|d| d.cells.len() == 9).unwrap();
        assert_eq!(bowl.spill_elevation, 1.0);
        assert_eq!(bowl.lowest, Some((5, 5)));
        // Every collected cell sits below the surface.
        for &(x, y) in &bowl.cells {
            assert!(*map.get(x, y) < bowl.spill_elevation);
        }
    }

    #[test]
    fn test_equal_minima_resolve_in_row_major_order() {
        // Two identical pits; the western one is discovered first.
        let mut map = Tilemap::from_fn(7, 5, |x, y| {
            if x == 0 || y == 0 || x == 6 || y == 4 {
                -1.0
            } else {
                1.0
            }
        });
        map.set(2, 2, 0.5);
        map.set(4, 2, 0.5);
        let ocean = ocean_mask(&map, 0.0);

        let basins = preserve_basins(&map, find_depressions(&map, &ocean), 1);
        let centers: Vec<_> = basins.iter().map(|b| b.center).collect();
        assert_eq!(centers, vec![(2, 2), (4, 2)]);
        let ids: Vec<_> = basins.iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![0, 1]);
        assert_eq!(basins.basin_id_at(2, 2), Some(0));
        assert_eq!(basins.basin_id_at(4, 2), Some(1));
    }
}
