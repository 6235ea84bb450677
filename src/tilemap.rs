//! Bounded 2D grid shared by every pipeline stage.
//!
//! Cells are addressed as `(x, y)` with `x` the column and `y` the row; `y = 0`
//! is the northern edge. The grid does not wrap: neighbour queries only ever
//! return in-bounds cells.

use rayon::prelude::*;

/// D8 octant offsets, indexed by direction code.
/// 7 0 1
/// 6 X 2
/// 5 4 3
pub const DX: [i32; 8] = [0, 1, 1, 1, 0, -1, -1, -1];
pub const DY: [i32; 8] = [-1, -1, 0, 1, 1, 1, 0, -1];

/// Compass names for the direction codes, in the same order as `DX`/`DY`.
pub const OCTANT_NAMES: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];

/// Horizontal distance to the neighbour in each octant.
pub const OCTANT_DISTANCE: [f32; 8] = [
    1.0,
    std::f32::consts::SQRT_2,
    1.0,
    std::f32::consts::SQRT_2,
    1.0,
    std::f32::consts::SQRT_2,
    1.0,
    std::f32::consts::SQRT_2,
];

/// A `width × height` grid stored row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct Tilemap<T> {
    pub width: usize,
    pub height: usize,
    data: Vec<T>,
}

impl<T: Clone + Default> Tilemap<T> {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![T::default(); width * height],
        }
    }
}

impl<T: Clone> Tilemap<T> {
    pub fn new_with(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    /// Fill the entire map with a value.
    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }
}

impl<T> Tilemap<T> {
    /// Wrap an existing row-major buffer. Returns `None` if the length does not
    /// match `width * height`.
    pub fn from_vec(width: usize, height: usize, data: Vec<T>) -> Option<Self> {
        if data.len() != width * height {
            return None;
        }
        Some(Self { width, height, data })
    }

    /// Build a grid by evaluating `f(x, y)` for every cell in row-major order.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self { width, height, data }
    }

    /// Row-parallel variant of [`Tilemap::from_fn`] for pure per-cell functions.
    pub fn from_fn_par<F>(width: usize, height: usize, f: F) -> Self
    where
        T: Send + Default + Clone,
        F: Fn(usize, usize) -> T + Sync,
    {
        let mut data = vec![T::default(); width * height];
        if width > 0 {
            data.par_chunks_mut(width)
                .enumerate()
                .for_each(|(y, row)| {
                    for (x, cell) in row.iter_mut().enumerate() {
                        *cell = f(x, y);
                    }
                });
        }
        Self { width, height, data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn same_size<U>(&self, other: &Tilemap<U>) -> bool {
        self.width == other.width && self.height == other.height
    }

    pub fn in_bounds(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// Row-major index of `(x, y)`.
    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.width && y < self.height);
        y * self.width + x
    }

    /// Inverse of [`Tilemap::index`].
    #[inline]
    pub fn coords(&self, idx: usize) -> (usize, usize) {
        (idx % self.width, idx / self.width)
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> &T {
        &self.data[self.index(x, y)]
    }

    #[inline]
    pub fn get_mut(&mut self, x: usize, y: usize) -> &mut T {
        let idx = self.index(x, y);
        &mut self.data[idx]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: T) {
        let idx = self.index(x, y);
        self.data[idx] = value;
    }

    /// Bounds-checked lookup.
    pub fn try_get(&self, x: usize, y: usize) -> Option<&T> {
        if x < self.width && y < self.height {
            Some(self.get(x, y))
        } else {
            None
        }
    }

    /// Flat row-major view of the cells.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn is_border(&self, x: usize, y: usize) -> bool {
        x == 0 || y == 0 || x + 1 == self.width || y + 1 == self.height
    }

    /// In-bounds 4-connected neighbours in N, E, S, W order.
    pub fn neighbors_4(&self, x: usize, y: usize) -> impl Iterator<Item = (usize, usize)> + '_ {
        [0usize, 2, 4, 6]
            .into_iter()
            .filter_map(move |dir| self.offset(x, y, dir))
    }

    /// In-bounds 8-connected neighbours in octant order (N, NE, E, ... NW).
    pub fn neighbors_8(&self, x: usize, y: usize) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..8).filter_map(move |dir| self.offset(x, y, dir))
    }

    /// Neighbour of `(x, y)` in octant `dir`, or `None` if it falls off the map.
    #[inline]
    pub fn offset(&self, x: usize, y: usize, dir: usize) -> Option<(usize, usize)> {
        let nx = x as i64 + DX[dir] as i64;
        let ny = y as i64 + DY[dir] as i64;
        if self.in_bounds(nx, ny) {
            Some((nx as usize, ny as usize))
        } else {
            None
        }
    }

    /// Iterate over all cells with their coordinates.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &T)> {
        let width = self.width;
        self.data.iter().enumerate().map(move |(idx, val)| (idx % width, idx / width, val))
    }

    /// Iterate mutably over all cells with their coordinates.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (usize, usize, &mut T)> {
        let width = self.width;
        self.data
            .iter_mut()
            .enumerate()
            .map(move |(idx, val)| (idx % width, idx / width, val))
    }

    /// Apply `f` to every cell, producing a new grid of the same size.
    pub fn map<U>(&self, f: impl Fn(&T) -> U) -> Tilemap<U> {
        Tilemap {
            width: self.width,
            height: self.height,
            data: self.data.iter().map(f).collect(),
        }
    }
}

impl Tilemap<f32> {
    /// Smallest and largest values, or `None` for an empty grid.
    pub fn min_max(&self) -> Option<(f32, f32)> {
        self.data.iter().fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }

    /// Min-max normalisation to `[0, 1]`. A constant grid maps to all zeros.
    pub fn normalized(&self) -> Tilemap<f32> {
        let Some((lo, hi)) = self.min_max() else {
            return self.clone();
        };
        let range = hi - lo;
        if range <= f32::EPSILON * hi.abs().max(1.0) {
            return self.map(|_| 0.0);
        }
        self.map(|&v| ((v - lo) / range).clamp(0.0, 1.0))
    }

    pub fn mean(&self) -> f32 {
        if self.data.is_empty() {
            return 0.0;
        }
        self.data.iter().map(|&v| v as f64).sum::<f64>() as f32 / self.data.len() as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neighbors_do_not_wrap() {
        let map = Tilemap::new_with(4, 3, 0u8);
        let corner: Vec<_> = map.neighbors_8(0, 0).collect();
        assert_eq!(corner, vec![(1, 0), (1, 1), (0, 1)]);

        let edge: Vec<_> = map.neighbors_4(3, 1).collect();
        assert_eq!(edge, vec![(3, 0), (3, 2), (2, 1)]);

        assert_eq!(map.neighbors_8(1, 1).count(), 8);
    }

    #[test]
    fn test_index_roundtrip_is_row_major() {
        let map = Tilemap::from_fn(5, 4, |x, y| (x, y));
        assert_eq!(map.index(2, 3), 17);
        assert_eq!(map.coords(17), (2, 3));
        assert_eq!(*map.get(2, 3), (2, 3));
    }

    #[test]
    fn test_from_fn_par_matches_from_fn() {
        let serial = Tilemap::from_fn(13, 7, |x, y| (x * 31 + y * 7) as f32);
        let parallel = Tilemap::from_fn_par(13, 7, |x, y| (x * 31 + y * 7) as f32);
        assert_eq!(serial, parallel);
    }

    #[test]
    fn test_normalized_range_and_constant_grid() {
        let map = Tilemap::from_fn(3, 3, |x, y| (x + y) as f32 * 2.0 - 1.0);
        let norm = map.normalized();
        assert_eq!(norm.min_max(), Some((0.0, 1.0)));

        let flat = Tilemap::new_with(3, 3, 0.7f32).normalized();
        assert!(flat.iter().all(|(_, _, &v)| v == 0.0));
    }

    #[test]
    fn test_offset_directions_follow_compass() {
        let map = Tilemap::new_with(3, 3, 0u8);
        assert_eq!(map.offset(1, 1, 0), Some((1, 0)));
        assert_eq!(map.offset(1, 1, 2), Some((2, 1)));
        assert_eq!(map.offset(1, 1, 5), Some((0, 2)));
        assert_eq!(map.offset(0, 0, 7), None);
    }
}
