//! Coherent noise fields for the climate stages.

use noise::{NoiseFn, Perlin};

use crate::config::NoiseParams;
use crate::tilemap::Tilemap;

/// Fractal Perlin noise sampled over the map.
pub struct CoherentNoise {
    perlin: Perlin,
    params: NoiseParams,
}

impl CoherentNoise {
    pub fn new(seed: u32, params: &NoiseParams) -> Self {
        Self {
            perlin: Perlin::new(seed),
            params: *params,
        }
    }

    /// Octave sum at normalised map coordinates, scaled back to roughly `[-1, 1]`.
    pub fn sample(&self, nx: f64, ny: f64) -> f64 {
        let mut amplitude = 1.0;
        let mut frequency = self.params.frequency;
        let mut total = 0.0;
        let mut norm = 0.0;

        for _ in 0..self.params.octaves {
            total += self.perlin.get([nx * frequency, ny * frequency]) * amplitude;
            norm += amplitude;
            amplitude *= self.params.persistence;
            frequency *= self.params.lacunarity;
        }

        if norm > 0.0 {
            (total / norm).clamp(-1.0, 1.0)
        } else {
            0.0
        }
    }

    /// Signed field in `[-1, 1]`, one sample per cell centre.
    pub fn signed_field(&self, width: usize, height: usize) -> Tilemap<f32> {
        Tilemap::from_fn_par(width, height, |x, y| {
            let nx = (x as f64 + 0.5) / width as f64;
            let ny = (y as f64 + 0.5) / height as f64;
            self.sample(nx, ny) as f32
        })
    }

    /// Field rescaled to exactly `[0, 1]` by min-max normalisation.
    pub fn unit_field(&self, width: usize, height: usize) -> Tilemap<f32> {
        self.signed_field(width, height).normalized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_field() {
        let params = NoiseParams::default();
        let a = CoherentNoise::new(11, &params).signed_field(16, 8);
        let b = CoherentNoise::new(11, &params).signed_field(16, 8);
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seeds_differ() {
        let params = NoiseParams::default();
        let a = CoherentNoise::new(1, &params).signed_field(16, 8);
        let b = CoherentNoise::new(2, &params).signed_field(16, 8);
        assert_ne!(a, b);
    }

    #[test]
    fn test_unit_field_spans_zero_to_one() {
        let field = CoherentNoise::new(5, &NoiseParams::default()).unit_field(32, 32);
        let (lo, hi) = field.min_max().unwrap();
        assert_eq!(lo, 0.0);
        assert_eq!(hi, 1.0);
        assert!(field.as_slice().iter().all(|v| (0.0..=1.0).contains(v)));
    }
}
