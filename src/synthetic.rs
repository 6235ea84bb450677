//! Deterministic synthetic terrain for tests and the binaries.
//!
//! Every generator returns elevations roughly in `[0, 1]` and is a pure
//! function of its arguments.

use noise::{NoiseFn, Perlin};

use crate::tilemap::Tilemap;

/// Monotonic ramp from `1.0` at `(0, 0)` down to `0.0` at the opposite corner.
pub fn ramp(width: usize, height: usize) -> Tilemap<f32> {
    let span = (width + height).saturating_sub(2).max(1) as f32;
    Tilemap::from_fn(width, height, |x, y| 1.0 - (x + y) as f32 / span)
}

pub fn flat(width: usize, height: usize, elevation: f32) -> Tilemap<f32> {
    Tilemap::new_with(width, height, elevation)
}

/// Low plain with a north-south ridge of `ridge_height` at column `ridge_x`,
/// falling off linearly over `half_width` columns on either side.
pub fn ridge(width: usize, height: usize, ridge_x: usize, half_width: usize, ridge_height: f32) -> Tilemap<f32> {
    let base = 0.2;
    Tilemap::from_fn(width, height, |x, _| {
        let d = (x as f32 - ridge_x as f32).abs();
        let falloff = (1.0 - d / (half_width as f32 + 1.0)).max(0.0);
        base + (ridge_height - base).max(0.0) * falloff
    })
}

/// Square plateau at `rim` with a closed bowl of `depth` in the middle.
///
/// The outer ring of cells sits at `0` so that, with a positive sea level,
/// the plateau has an ocean on every side.
pub fn bowl(size: usize, rim: f32, bowl_radius: f32, depth: f32) -> Tilemap<f32> {
    let c = (size as f32 - 1.0) / 2.0;
    Tilemap::from_fn(size, size, |x, y| {
        if x == 0 || y == 0 || x + 1 == size || y + 1 == size {
            return 0.0;
        }
        let dx = x as f32 - c;
        let dy = y as f32 - c;
        let r = (dx * dx + dy * dy).sqrt();
        if r <= bowl_radius {
            rim - depth * (1.0 - r / (bowl_radius + 1.0))
        } else {
            rim
        }
    })
}

/// Perlin-perturbed radial island, normalised to `[0, 1]`.
///
/// Edges fall below any sea level above `0.1`, so the island is always
/// surrounded by ocean. Interior noise produces pits, ridges and the odd
/// closed depression.
pub fn noise_island(width: usize, height: usize, seed: u32) -> Tilemap<f32> {
    let perlin = Perlin::new(seed);
    let detail = Perlin::new(seed.wrapping_add(1111));
    let cx = (width as f64 - 1.0) / 2.0;
    let cy = (height as f64 - 1.0) / 2.0;
    let radius = cx.min(cy).max(1.0);

    Tilemap::from_fn_par(width, height, |x, y| {
        let nx = x as f64 / width as f64;
        let ny = y as f64 / height as f64;
        let dx = (x as f64 - cx) / radius;
        let dy = (y as f64 - cy) / radius;
        let falloff = (1.0 - (dx * dx + dy * dy).sqrt()).max(0.0);

        let broad = perlin.get([nx * 3.0, ny * 3.0]);
        let fine = detail.get([nx * 11.0, ny * 11.0]) * 0.35;
        let edge = x == 0 || y == 0 || x + 1 == width || y + 1 == height;
        if edge {
            0.0
        } else {
            ((falloff * 0.9 + (broad + fine) * 0.3 * falloff.sqrt()).clamp(0.0, 1.0)) as f32
        }
    })
    .normalized()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ramp_corners() {
        let map = ramp(10, 10);
        assert_eq!(*map.get(0, 0), 1.0);
        assert_eq!(*map.get(9, 9), 0.0);
        assert!(map.get(3, 4) > map.get(4, 4));
    }

    #[test]
    fn test_ridge_peaks_at_column() {
        let map = ridge(30, 5, 15, 2, 0.9);
        assert_eq!(*map.get(15, 2), 0.9);
        assert!(map.get(14, 2) < map.get(15, 2));
        assert_eq!(*map.get(0, 2), 0.2);
    }

    #[test]
    fn test_bowl_is_closed() {
        let map = bowl(15, 0.8, 3.0, 0.4);
        assert!(*map.get(7, 7) < 0.8);
        assert_eq!(*map.get(2, 7), 0.8);
        assert_eq!(*map.get(0, 7), 0.0);
    }

    #[test]
    fn test_noise_island_is_deterministic_with_ocean_border() {
        let a = noise_island(32, 24, 9);
        let b = noise_island(32, 24, 9);
        assert_eq!(a, b);
        assert_ne!(a, noise_island(32, 24, 10));
        for x in 0..32 {
            assert_eq!(*a.get(x, 0), 0.0);
            assert_eq!(*a.get(x, 23), 0.0);
        }
        let (lo, hi) = a.min_max().unwrap();
        assert_eq!(lo, 0.0);
        assert_eq!(hi, 1.0);
    }
}
