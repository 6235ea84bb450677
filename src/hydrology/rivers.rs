//! River sources, relief classes and river tracing.

use serde::Serialize;

use crate::config::ElevationLevels;
use crate::hydrology::basins::PreservedBasins;
use crate::hydrology::flow::FlowDirections;
use crate::tilemap::Tilemap;

/// Coarse elevation class of a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Relief {
    Ocean,
    Lowland,
    Hill,
    Mountain,
    Peak,
}

impl Relief {
    pub fn classify(elevation: f32, is_ocean: bool, levels: &ElevationLevels) -> Self {
        if is_ocean {
            Relief::Ocean
        } else if elevation >= levels.peak {
            Relief::Peak
        } else if elevation >= levels.mountain {
            Relief::Mountain
        } else if elevation >= levels.hill {
            Relief::Hill
        } else {
            Relief::Lowland
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Relief::Ocean => "ocean",
            Relief::Lowland => "lowland",
            Relief::Hill => "hill",
            Relief::Mountain => "mountain",
            Relief::Peak => "peak",
        }
    }
}

/// Cells at or above mountain level whose accumulated flow reaches
/// `min_accumulation`, in row-major order.
pub fn find_river_sources(
    filled: &Tilemap<f32>,
    accumulation: &Tilemap<f32>,
    mountain_level: f32,
    min_accumulation: f32,
) -> Vec<(usize, usize)> {
    let mut sources = Vec::new();
    for (x, y, &h) in filled.iter() {
        if h >= mountain_level && *accumulation.get(x, y) >= min_accumulation {
            sources.push((x, y));
        }
    }
    sources
}

/// Where a traced river ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Terminus {
    Ocean,
    Basin(usize),
    /// A land sink outside any basin (flat or forced).
    Sink,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RiverPath {
    pub source: (usize, usize),
    /// Cells from the source down to (and including) the mouth.
    pub cells: Vec<(usize, usize)>,
    pub terminus: Terminus,
}

impl RiverPath {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Follow the flow from each source until it enters the ocean, a preserved
/// basin, or a sink. Steps are capped at the cell count.
pub fn trace_rivers(
    sources: &[(usize, usize)],
    flow: &FlowDirections,
    ocean: &Tilemap<bool>,
    basins: &PreservedBasins,
) -> Vec<RiverPath> {
    let max_steps = ocean.len();

    sources
        .iter()
        .map(|&source| {
            let mut cells = vec![source];
            let (mut x, mut y) = source;
            let mut terminus = Terminus::Sink;

            for _ in 0..max_steps {
                if *ocean.get(x, y) {
                    terminus = Terminus::Ocean;
                    break;
                }
                if let Some(id) = basins.basin_id_at(x, y) {
                    terminus = Terminus::Basin(id);
                    break;
                }
                match flow.downstream(x, y) {
                    Some(next) => {
                        (x, y) = next;
                        cells.push(next);
                    }
                    None => break,
                }
            }

            RiverPath {
                source,
                cells,
                terminus,
            }
        })
        .collect()
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RiverNetworkStats {
    pub count: usize,
    pub reaching_ocean: usize,
    pub ending_in_basins: usize,
    pub ending_in_sinks: usize,
    pub mean_length: f32,
    pub max_length: usize,
}

impl RiverNetworkStats {
    pub fn from_paths(paths: &[RiverPath]) -> Self {
        if paths.is_empty() {
            return Self::default();
        }
        let mut stats = Self {
            count: paths.len(),
            ..Self::default()
        };
        let mut total = 0usize;
        for path in paths {
            match path.terminus {
                Terminus::Ocean => stats.reaching_ocean += 1,
                Terminus::Basin(_) => stats.ending_in_basins += 1,
                Terminus::Sink => stats.ending_in_sinks += 1,
            }
            total += path.len();
            stats.max_length = stats.max_length.max(path.len());
        }
        stats.mean_length = total as f32 / paths.len() as f32;
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hydrology::accumulation::FlowAccumulation;
    use crate::hydrology::ocean::ocean_mask;

    #[test]
    fn test_relief_classes() {
        let levels = ElevationLevels::default();
        assert_eq!(Relief::classify(0.9, false, &levels), Relief::Peak);
        assert_eq!(Relief::classify(0.70, false, &levels), Relief::Mountain);
        assert_eq!(Relief::classify(0.6, false, &levels), Relief::Hill);
        assert_eq!(Relief::classify(0.2, false, &levels), Relief::Lowland);
        assert_eq!(Relief::classify(0.9, true, &levels), Relief::Ocean);
    }

    #[test]
    fn test_sources_need_both_height_and_flow() {
        let filled = Tilemap::from_vec(3, 1, vec![0.9f32, 0.9, 0.5]).unwrap();
        let acc = Tilemap::from_vec(3, 1, vec![10.0f32, 30.0, 30.0]).unwrap();
        let sources = find_river_sources(&filled, &acc, 0.7, 25.0);
        assert_eq!(sources, vec![(1, 0)]);
    }

    #[test]
    fn test_rivers_on_ramp_reach_ocean() {
        // Steep ramp from the north-west corner into a south-east sea.
        let map = Tilemap::from_fn(10, 10, |x, y| 1.0 - (x + y) as f32 / 18.0);
        let ocean = ocean_mask(&map, 0.1);
        let basins = PreservedBasins::empty(10, 10);
        let flow = FlowDirections::route(&map, &basins);
        let acc = FlowAccumulation::compute(&flow);

        let sources = find_river_sources(&map, &acc.values, 0.7, 1.0);
        assert!(!sources.is_empty());
        let rivers = trace_rivers(&sources, &flow, &ocean, &basins);
        assert!(rivers.iter().all(|r| r.terminus == Terminus::Ocean));

        let stats = RiverNetworkStats::from_paths(&rivers);
        assert_eq!(stats.count, sources.len());
        assert_eq!(stats.reaching_ocean, sources.len());
        assert!(stats.max_length >= 2);
    }

    #[test]
    fn test_river_into_flat_ends_at_sink() {
        let codes = Tilemap::from_vec(3, 1, vec![2i8, 2, -1]).unwrap();
        let flow = FlowDirections::from_codes(codes);
        let ocean = Tilemap::new_with(3, 1, false);
        let rivers = trace_rivers(&[(0, 0)], &flow, &ocean, &PreservedBasins::empty(3, 1));
        assert_eq!(rivers[0].cells, vec![(0, 0), (1, 0), (2, 0)]);
        assert_eq!(rivers[0].terminus, Terminus::Sink);
    }
}
