//! D8 flow routing over the filled heightmap.

use rayon::prelude::*;

use crate::hydrology::basins::PreservedBasins;
use crate::tilemap::{Tilemap, OCTANT_DISTANCE};

/// Direction code for a terminal cell.
pub const SINK: i8 = -1;

/// One D8 direction code per cell: `0..=7` (N, NE, E, ... NW) or [`SINK`].
#[derive(Clone, Debug, PartialEq)]
pub struct FlowDirections {
    codes: Tilemap<i8>,
}

impl FlowDirections {
    /// Route every cell toward its steepest strictly-lower neighbour.
    ///
    /// Slope is drop over horizontal distance, so diagonals count `√2`. Ties
    /// keep the earliest octant in N, NE, E, SE, S, SW, W, NW order. Preserved
    /// basin cells are sinks; so is any cell with no lower neighbour. Ocean
    /// cells are routed like land so drainage continues to the lowest ocean
    /// cell.
    pub fn route(filled: &Tilemap<f32>, basins: &PreservedBasins) -> Self {
        let width = filled.width;
        let height = filled.height;
        let mut codes = Tilemap::new_with(width, height, SINK);

        if width > 0 {
            let rows: Vec<Vec<i8>> = (0..height)
                .into_par_iter()
                .map(|y| {
                    (0..width)
                        .map(|x| {
                            if basins.contains(x, y) {
                                SINK
                            } else {
                                steepest_descent(filled, x, y)
                            }
                        })
                        .collect()
                })
                .collect();
            for (y, row) in rows.into_iter().enumerate() {
                for (x, code) in row.into_iter().enumerate() {
                    codes.set(x, y, code);
                }
            }
        }

        Self { codes }
    }

    /// Wrap precomputed codes. Values outside `-1..=7` are treated as sinks.
    pub fn from_codes(codes: Tilemap<i8>) -> Self {
        let codes = codes.map(|&c| if (0..8).contains(&c) { c } else { SINK });
        Self { codes }
    }

    pub fn width(&self) -> usize {
        self.codes.width
    }

    pub fn height(&self) -> usize {
        self.codes.height
    }

    pub fn get(&self, x: usize, y: usize) -> i8 {
        *self.codes.get(x, y)
    }

    pub fn is_sink(&self, x: usize, y: usize) -> bool {
        self.get(x, y) == SINK
    }

    /// The cell this one drains into, or `None` for a sink.
    pub fn downstream(&self, x: usize, y: usize) -> Option<(usize, usize)> {
        let code = self.get(x, y);
        if code == SINK {
            return None;
        }
        self.codes.offset(x, y, code as usize)
    }

    /// Turn the given cells into sinks.
    pub fn force_sinks(&mut self, cells: &[(usize, usize)]) {
        for &(x, y) in cells {
            self.codes.set(x, y, SINK);
        }
    }

    pub fn grid(&self) -> &Tilemap<i8> {
        &self.codes
    }

    pub fn sink_count(&self) -> usize {
        self.codes.as_slice().iter().filter(|&&c| c == SINK).count()
    }
}

fn steepest_descent(filled: &Tilemap<f32>, x: usize, y: usize) -> i8 {
    let here = *filled.get(x, y);
    let mut best = SINK;
    let mut best_slope = 0.0f32;

    for dir in 0..8 {
        let Some((nx, ny)) = filled.offset(x, y, dir) else {
            continue;
        };
        let drop = here - *filled.get(nx, ny);
        if drop <= 0.0 {
            continue;
        }
        let slope = drop / OCTANT_DISTANCE[dir];
        if slope > best_slope {
            best_slope = slope;
            best = dir as i8;
        }
    }

    best
}
