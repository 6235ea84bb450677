//! Prevailing winds and orographic rain shadow.

use serde::Serialize;

use crate::climate::temperature::row_latitude;
use crate::config::RainShadowParams;
use crate::tilemap::Tilemap;

/// Global circulation band, by absolute latitude.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum WindBand {
    /// Equatorial calms, weak easterly drift.
    Doldrums,
    /// Easterlies blowing toward the equator.
    Trades,
    /// Mid-latitude westerlies blowing poleward.
    Westerlies,
    PolarEasterlies,
}

impl WindBand {
    pub fn at(latitude: f32) -> Self {
        let lat = latitude.abs();
        if lat < 0.15 {
            WindBand::Doldrums
        } else if lat < 0.35 {
            WindBand::Trades
        } else if lat < 0.65 {
            WindBand::Westerlies
        } else {
            WindBand::PolarEasterlies
        }
    }
}

/// Direction the wind blows toward (unit vector, `+y` is south) and its
/// relative strength.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Wind {
    pub dx: f32,
    pub dy: f32,
    pub strength: f32,
}

impl Wind {
    fn from_vector(vx: f32, vy: f32) -> Self {
        let strength = (vx * vx + vy * vy).sqrt();
        if strength <= 0.0 {
            return Self {
                dx: 0.0,
                dy: 0.0,
                strength: 0.0,
            };
        }
        Self {
            dx: vx / strength,
            dy: vy / strength,
            strength,
        }
    }
}

/// Prevailing wind at a signed latitude (`+` north).
///
/// Zonal components come straight from the band; meridional components flip
/// with the hemisphere so trades always head for the equator and westerlies
/// always head for the pole.
pub fn prevailing_wind(latitude: f32) -> (WindBand, Wind) {
    let band = WindBand::at(latitude);
    // In the northern hemisphere the equator lies toward +y.
    let equatorward = if latitude >= 0.0 { 1.0 } else { -1.0 };
    let wind = match band {
        WindBand::Doldrums => Wind::from_vector(-0.3, 0.0),
        WindBand::Trades => Wind::from_vector(-0.85, 0.2 * equatorward),
        WindBand::Westerlies => Wind::from_vector(0.9, -0.15 * equatorward),
        WindBand::PolarEasterlies => Wind::from_vector(-0.6, 0.0),
    };
    (band, wind)
}

/// Fraction of moisture a cell loses to barriers upwind of it, in `[0, 1]`.
///
/// Samples `steps` points along the upwind ray out to `reach` cells. A sample
/// higher than the cell blocks in proportion to how much higher it is
/// (saturating at `barrier_scale`), with nearer barriers counting more.
pub fn shadow_factor(
    heightmap: &Tilemap<f32>,
    sea_level: f32,
    x: usize,
    y: usize,
    wind: Wind,
    params: &RainShadowParams,
) -> f32 {
    if params.steps == 0 || params.reach <= 0.0 || wind.strength <= 0.0 {
        return 0.0;
    }
    let own = heightmap.get(x, y).max(sea_level);
    let mut blocking = 0.0f32;

    for step in 1..=params.steps {
        let t = step as f32 / params.steps as f32;
        let distance = t * params.reach;
        let sx = (x as f32 - wind.dx * distance).round() as i64;
        let sy = (y as f32 - wind.dy * distance).round() as i64;
        if !heightmap.in_bounds(sx, sy) {
            break;
        }
        let barrier = heightmap.get(sx as usize, sy as usize).max(sea_level);
        if barrier > own {
            let height_factor = ((barrier - own) / params.barrier_scale).min(1.0);
            let distance_factor = 1.0 - 0.5 * t;
            blocking = blocking.max(height_factor * distance_factor);
        }
    }

    blocking
}

/// Reduce precipitation on land cells behind upwind barriers. Ocean cells
/// pass through unchanged.
pub fn apply_rain_shadow(
    precipitation: &Tilemap<f32>,
    heightmap: &Tilemap<f32>,
    ocean: &Tilemap<bool>,
    sea_level: f32,
    params: &RainShadowParams,
) -> Tilemap<f32> {
    let height = precipitation.height;
    Tilemap::from_fn_par(precipitation.width, height, |x, y| {
        let p = *precipitation.get(x, y);
        if *ocean.get(x, y) {
            return p;
        }
        let (_, wind) = prevailing_wind(row_latitude(y, height));
        let block = shadow_factor(heightmap, sea_level, x, y, wind, params);
        p * (1.0 - block * params.strength * wind.strength.min(1.0))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bands_follow_latitude() {
        assert_eq!(prevailing_wind(0.05).0, WindBand::Doldrums);
        assert_eq!(prevailing_wind(-0.25).0, WindBand::Trades);
        assert_eq!(prevailing_wind(0.5).0, WindBand::Westerlies);
        assert_eq!(prevailing_wind(-0.9).0, WindBand::PolarEasterlies);
    }

    #[test]
    fn test_trades_head_for_equator_in_both_hemispheres() {
        let (_, north) = prevailing_wind(0.25);
        let (_, south) = prevailing_wind(-0.25);
        assert!(north.dx < 0.0 && south.dx < 0.0);
        assert!(north.dy > 0.0, "north trades blow south");
        assert!(south.dy < 0.0, "south trades blow north");
        approx::assert_abs_diff_eq!(north.dx * north.dx + north.dy * north.dy, 1.0, epsilon = 1e-5);
    }

    /// Low plain with a north-south ridge at column 20.
    fn ridge_map() -> Tilemap<f32> {
        Tilemap::from_fn(40, 20, |x, _| if x == 20 { 0.9 } else { 0.2 })
    }

    #[test]
    fn test_leeward_side_is_drier_than_windward() {
        let heightmap = ridge_map();
        let ocean = Tilemap::new_with(40, 20, false);
        let precipitation = Tilemap::new_with(40, 20, 0.5f32);
        let params = RainShadowParams::default();
        let shadowed = apply_rain_shadow(&precipitation, &heightmap, &ocean, 0.0, &params);

        // Row 5 sits in the westerlies: wind blows east, so the lee is east.
        assert_eq!(prevailing_wind(row_latitude(5, 20)).0, WindBand::Westerlies);
        for offset in 1..=5 {
            let windward = *shadowed.get(20 - offset, 5);
            let leeward = *shadowed.get(20 + offset, 5);
            assert!(leeward < windward, "offset {offset}: {leeward} !< {windward}");
            assert_eq!(windward, 0.5);
        }
    }

    #[test]
    fn test_flat_terrain_is_untouched() {
        let heightmap = Tilemap::new_with(10, 10, 0.4f32);
        let ocean = Tilemap::new_with(10, 10, false);
        let precipitation = Tilemap::from_fn(10, 10, |x, y| (x * y) as f32 / 81.0);
        let shadowed = apply_rain_shadow(&precipitation, &heightmap, &ocean, 0.0, &RainShadowParams::default());
        assert_eq!(shadowed, precipitation);
    }
}
