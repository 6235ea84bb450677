//! Pieces shared by the depression search and the pit filler: the
//! min-priority queue both floods grow from, and the outlet used when a map
//! has no ocean.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, VecDeque};

use ordered_float::OrderedFloat;

use crate::tilemap::Tilemap;

/// Min-queue of cells keyed by `(elevation, row-major index)`.
///
/// Equal elevations pop in row-major order, which keeps basin ids and filled
/// values independent of insertion order.
#[derive(Debug, Default)]
pub struct FloodQueue {
    heap: BinaryHeap<Reverse<(OrderedFloat<f32>, usize)>>,
}

impl FloodQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, elevation: f32, idx: usize) {
        self.heap.push(Reverse((OrderedFloat(elevation), idx)));
    }

    /// Lowest `(elevation, index)` entry.
    pub fn pop(&mut self) -> Option<(f32, usize)> {
        self.heap.pop().map(|Reverse((e, idx))| (e.0, idx))
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

/// Where an ocean-less map drains off the edge.
///
/// That is the lowest border cell (earliest row-major on ties) plus every
/// cell 8-connected to it at exactly the same elevation, so a level plain
/// around the outlet drains as a whole. Empty when the map has any ocean.
pub fn outlet_cells(heightmap: &Tilemap<f32>, ocean: &Tilemap<bool>) -> Vec<(usize, usize)> {
    if ocean.as_slice().iter().any(|&o| o) {
        return Vec::new();
    }

    let mut lowest: Option<(usize, usize)> = None;
    for (x, y, _) in heightmap.iter() {
        if heightmap.is_border(x, y) && lowest.map_or(true, |l| is_lower(heightmap, (x, y), l)) {
            lowest = Some((x, y));
        }
    }
    let Some(start) = lowest else {
        return Vec::new();
    };

    let level = *heightmap.get(start.0, start.1);
    let mut seen = Tilemap::new_with(heightmap.width, heightmap.height, false);
    seen.set(start.0, start.1, true);
    let mut cells = vec![start];
    let mut frontier = VecDeque::from([start]);

    while let Some((x, y)) = frontier.pop_front() {
        for (nx, ny) in heightmap.neighbors_8(x, y) {
            if *seen.get(nx, ny) || *heightmap.get(nx, ny) != level {
                continue;
            }
            seen.set(nx, ny, true);
            cells.push((nx, ny));
            frontier.push_back((nx, ny));
        }
    }

    cells.sort_by_key(|&(x, y)| heightmap.index(x, y));
    cells
}

/// Strictly lower, or equal and earlier in row-major order.
pub(crate) fn is_lower(heightmap: &Tilemap<f32>, a: (usize, usize), b: (usize, usize)) -> bool {
    let ea = *heightmap.get(a.0, a.1);
    let eb = *heightmap.get(b.0, b.1);
    ea < eb || (ea == eb && heightmap.index(a.0, a.1) < heightmap.index(b.0, b.1))
}
