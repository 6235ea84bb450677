//! World inputs and the generated result.
//!
//! `GenerationInput` and `WorldParameters` go in; `WorldLayers` comes out and
//! is read-only from then on. Display and probe layers read it by reference.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::climate::{prevailing_wind, ClimateLayers, WindBand};
use crate::climate::temperature::row_latitude;
use crate::error::GenerationError;
use crate::hydrology::{BasinRole, HydrologyLayers, Relief};
use crate::thresholds::{PrecipitationClass, TemperatureClass};
use crate::tilemap::{Tilemap, OCTANT_NAMES};

/// Per-world scalars, supplied once at generation start.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldParameters {
    pub seed: u64,
    /// Degrees; positive tilts the thermal equator north.
    pub axial_tilt_deg: f32,
    /// Multiplier of the reference star distance; 1 is Earth-like.
    pub distance_to_star: f32,
}

impl Default for WorldParameters {
    fn default() -> Self {
        Self {
            seed: 0,
            axial_tilt_deg: 23.5,
            distance_to_star: 1.0,
        }
    }
}

impl WorldParameters {
    pub fn validate(&self) -> Result<(), GenerationError> {
        if !(self.axial_tilt_deg.is_finite() && (-90.0..=90.0).contains(&self.axial_tilt_deg)) {
            return Err(GenerationError::InvalidWorldParameter {
                name: "axial_tilt_deg",
                value: self.axial_tilt_deg,
                reason: "must be within [-90, 90]",
            });
        }
        if !(self.distance_to_star.is_finite() && self.distance_to_star > 0.0) {
            return Err(GenerationError::InvalidWorldParameter {
                name: "distance_to_star",
                value: self.distance_to_star,
                reason: "must be finite and > 0",
            });
        }
        Ok(())
    }
}

/// Grids handed over by the terrain generator.
#[derive(Clone, Debug)]
pub struct GenerationInput {
    pub heightmap: Tilemap<f32>,
    /// Tectonic plate ids, carried through untouched.
    pub plates: Option<Tilemap<u16>>,
    pub sea_level: f32,
}

/// On-disk heightmap format.
#[derive(Debug, Serialize, Deserialize)]
struct HeightmapFile {
    width: usize,
    height: usize,
    /// Row-major elevations.
    elevation: Vec<f32>,
    #[serde(default)]
    plates: Option<Vec<u16>>,
    #[serde(default)]
    sea_level: f32,
}

impl GenerationInput {
    pub fn new(heightmap: Tilemap<f32>, sea_level: f32) -> Self {
        Self {
            heightmap,
            plates: None,
            sea_level,
        }
    }

    pub fn with_plates(mut self, plates: Tilemap<u16>) -> Self {
        self.plates = Some(plates);
        self
    }

    /// Load `{ "width", "height", "elevation": [..], "plates"?, "sea_level"? }`.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, GenerationError> {
        let text = std::fs::read_to_string(path)?;
        let file: HeightmapFile = serde_json::from_str(&text)?;

        let len = file.elevation.len();
        let heightmap = Tilemap::from_vec(file.width, file.height, file.elevation).ok_or(
            GenerationError::ElevationSizeMismatch {
                width: file.width,
                height: file.height,
                len,
            },
        )?;
        let plates = match file.plates {
            Some(ids) => {
                let plates_len = ids.len();
                let map = Tilemap::from_vec(file.width, file.height, ids).ok_or(
                    GenerationError::PlatesSizeMismatch {
                        width: file.width,
                        height: file.height,
                        plates_width: plates_len,
                        plates_height: 1,
                    },
                )?;
                Some(map)
            }
            None => None,
        };

        Ok(Self {
            heightmap,
            plates,
            sea_level: file.sea_level,
        })
    }

    /// Save in the format [`GenerationInput::from_json_file`] reads.
    pub fn to_json_file(&self, path: impl AsRef<Path>) -> Result<(), GenerationError> {
        let file = HeightmapFile {
            width: self.heightmap.width,
            height: self.heightmap.height,
            elevation: self.heightmap.as_slice().to_vec(),
            plates: self.plates.as_ref().map(|p| p.as_slice().to_vec()),
            sea_level: self.sea_level,
        };
        std::fs::write(path, serde_json::to_string(&file)?)?;
        Ok(())
    }

    /// Reject anything the pipeline cannot process.
    pub fn validate(&self) -> Result<(), GenerationError> {
        let heightmap = &self.heightmap;
        if heightmap.is_empty() {
            return Err(GenerationError::EmptyGrid {
                width: heightmap.width,
                height: heightmap.height,
            });
        }
        if let Some((x, y, &value)) = heightmap.iter().find(|(_, _, v)| !v.is_finite()) {
            return Err(GenerationError::NonFiniteElevation { x, y, value });
        }
        if let Some(plates) = &self.plates {
            if !plates.same_size(heightmap) {
                return Err(GenerationError::PlatesSizeMismatch {
                    width: heightmap.width,
                    height: heightmap.height,
                    plates_width: plates.width,
                    plates_height: plates.height,
                });
            }
        }
        if !self.sea_level.is_finite() {
            return Err(GenerationError::NonFiniteSeaLevel(self.sea_level));
        }
        Ok(())
    }
}

/// Everything one generation run produced.
#[derive(Clone, Debug)]
pub struct WorldLayers {
    pub width: usize,
    pub height: usize,
    pub sea_level: f32,
    pub world: WorldParameters,
    pub heightmap: Tilemap<f32>,
    pub plates: Option<Tilemap<u16>>,
    pub relief: Tilemap<Relief>,
    pub hydrology: HydrologyLayers,
    pub climate: ClimateLayers,
}

impl WorldLayers {
    pub fn forced_sinks(&self) -> &[(usize, usize)] {
        &self.hydrology.forced_sinks
    }

    pub fn is_ocean(&self, x: usize, y: usize) -> bool {
        *self.hydrology.ocean.get(x, y)
    }

    /// Display-only erosion indicator: filled elevation times accumulated flow.
    pub fn erosion_hotspot(&self, x: usize, y: usize) -> f32 {
        self.hydrology.filled.get(x, y) * self.hydrology.accumulation.get(x, y)
    }

    /// Every stored value for one cell, or `None` outside the map.
    pub fn probe(&self, x: usize, y: usize) -> Option<CellProbe> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let hydro = &self.hydrology;
        let temperature = &self.climate.temperature;
        let precipitation = &self.climate.precipitation;

        let flow_direction = hydro.flow.get(x, y);
        let basin_role = hydro.basins.role_at(x, y);
        let temperature_final = *temperature.final_stage.get(x, y);
        let precipitation_final = *precipitation.final_stage.get(x, y);

        Some(CellProbe {
            x,
            y,
            elevation: *self.heightmap.get(x, y),
            filled_elevation: *hydro.filled.get(x, y),
            relief: *self.relief.get(x, y),
            is_ocean: self.is_ocean(x, y),
            plate: self.plates.as_ref().map(|p| *p.get(x, y)),
            basin_id: basin_role.map(|(id, _)| id),
            basin_role: basin_role.map(|(_, role)| role),
            flow_direction,
            flow_direction_name: (flow_direction >= 0).then(|| OCTANT_NAMES[flow_direction as usize]),
            accumulation: *hydro.accumulation.get(x, y),
            is_river_source: hydro.river_sources.contains(&(x, y)),
            erosion_hotspot: self.erosion_hotspot(x, y),
            temperature_latitude: *temperature.latitude_only.get(x, y),
            temperature_noise: *temperature.with_noise.get(x, y),
            temperature_distance: *temperature.with_distance.get(x, y),
            temperature: temperature_final,
            temperature_class: TemperatureClass::classify(temperature_final, &self.climate.temperature_thresholds),
            wind_band: prevailing_wind(row_latitude(y, self.height)).0,
            precipitation_noise: *precipitation.base_noise.get(x, y),
            precipitation_shaped: *precipitation.temperature_shaped.get(x, y),
            precipitation_base: *precipitation.base.get(x, y),
            precipitation_rain_shadow: *precipitation.with_rain_shadow.get(x, y),
            precipitation: precipitation_final,
            precipitation_class: PrecipitationClass::classify(precipitation_final, &precipitation.thresholds),
            distance_to_ocean: *precipitation.distance_to_ocean.get(x, y),
        })
    }
}

/// One cell's view of every layer.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CellProbe {
    pub x: usize,
    pub y: usize,
    pub elevation: f32,
    pub filled_elevation: f32,
    pub relief: Relief,
    pub is_ocean: bool,
    pub plate: Option<u16>,
    pub basin_id: Option<usize>,
    pub basin_role: Option<BasinRole>,
    pub flow_direction: i8,
    pub flow_direction_name: Option<&'static str>,
    pub accumulation: f32,
    pub is_river_source: bool,
    pub erosion_hotspot: f32,
    pub temperature_latitude: f32,
    pub temperature_noise: f32,
    pub temperature_distance: f32,
    pub temperature: f32,
    pub temperature_class: TemperatureClass,
    pub wind_band: WindBand,
    pub precipitation_noise: f32,
    pub precipitation_shaped: f32,
    pub precipitation_base: f32,
    pub precipitation_rain_shadow: f32,
    pub precipitation: f32,
    pub precipitation_class: PrecipitationClass,
    /// `INFINITY` when the map has no ocean.
    pub distance_to_ocean: f32,
}

impl CellProbe {
    pub fn basin_str(&self) -> String {
        match (self.basin_id, self.basin_role) {
            (Some(id), Some(BasinRole::Center)) => format!("basin #{id} (center)"),
            (Some(id), Some(BasinRole::PourPoint)) => format!("basin #{id} (pour point)"),
            (Some(id), _) => format!("basin #{id}"),
            _ => "none".to_string(),
        }
    }

    pub fn flow_str(&self) -> String {
        match self.flow_direction_name {
            Some(name) => format!("{} ({:.0} cells upstream)", name, self.accumulation),
            None => format!("sink ({:.0} cells upstream)", self.accumulation),
        }
    }

    pub fn print(&self) {
        println!("Cell ({}, {})", self.x, self.y);
        println!(
            "  Elevation:     {:.4} (filled {:.4}, {})",
            self.elevation,
            self.filled_elevation,
            self.relief.name()
        );
        println!("  Basin:         {}", self.basin_str());
        println!("  Flow:          {}", self.flow_str());
        if self.is_river_source {
            println!("  River source");
        }
        println!(
            "  Temperature:   {:.3} ({:?}) [lat {:.3}, noise {:.3}, dist {:.3}]",
            self.temperature,
            self.temperature_class,
            self.temperature_latitude,
            self.temperature_noise,
            self.temperature_distance
        );
        println!(
            "  Precipitation: {:.3} ({:?}) [noise {:.3}, shaped {:.3}, base {:.3}, shadow {:.3}]",
            self.precipitation,
            self.precipitation_class,
            self.precipitation_noise,
            self.precipitation_shaped,
            self.precipitation_base,
            self.precipitation_rain_shadow
        );
        println!("  Wind:          {:?}", self.wind_band);
        println!("  Coast:         {:.0} cells", self.distance_to_ocean);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_world_parameter_ranges() {
        assert!(WorldParameters::default().validate().is_ok());
        let bad_tilt = WorldParameters {
            axial_tilt_deg: 120.0,
            ..WorldParameters::default()
        };
        assert!(matches!(
            bad_tilt.validate(),
            Err(GenerationError::InvalidWorldParameter { name: "axial_tilt_deg", .. })
        ));
        let bad_distance = WorldParameters {
            distance_to_star: -1.0,
            ..WorldParameters::default()
        };
        assert!(bad_distance.validate().is_err());
    }

    #[test]
    fn test_input_validation() {
        let empty = GenerationInput::new(Tilemap::new(0, 4), 0.0);
        assert!(matches!(empty.validate(), Err(GenerationError::EmptyGrid { .. })));

        let mut heightmap = Tilemap::new_with(3, 3, 0.5f32);
        heightmap.set(2, 1, f32::NAN);
        let nan = GenerationInput::new(heightmap, 0.0);
        assert!(matches!(
            nan.validate(),
            Err(GenerationError::NonFiniteElevation { x: 2, y: 1, .. })
        ));

        let plates = GenerationInput::new(Tilemap::new_with(3, 3, 0.5f32), 0.0).with_plates(Tilemap::new(2, 3));
        assert!(matches!(plates.validate(), Err(GenerationError::PlatesSizeMismatch { .. })));

        let sea = GenerationInput::new(Tilemap::new_with(3, 3, 0.5f32), f32::INFINITY);
        assert!(matches!(sea.validate(), Err(GenerationError::NonFiniteSeaLevel(_))));
    }

    #[test]
    fn test_heightmap_file_roundtrip() {
        let path = std::env::temp_dir().join(format!("hydroclimate_input_{}.json", std::process::id()));
        let input = GenerationInput::new(Tilemap::from_fn(4, 2, |x, y| (x + y) as f32 * 0.1), 0.15)
            .with_plates(Tilemap::from_fn(4, 2, |x, _| x as u16));
        input.to_json_file(&path).unwrap();

        let loaded = GenerationInput::from_json_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded.heightmap, input.heightmap);
        assert_eq!(loaded.plates, input.plates);
        assert_eq!(loaded.sea_level, 0.15);
    }

    #[test]
    fn test_heightmap_file_size_mismatch() {
        let path = std::env::temp_dir().join(format!("hydroclimate_bad_{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "width": 3, "height": 3, "elevation": [0.0, 1.0] }"#).unwrap();
        let result = GenerationInput::from_json_file(&path);
        std::fs::remove_file(&path).ok();
        assert!(matches!(
            result,
            Err(GenerationError::ElevationSizeMismatch { len: 2, .. })
        ));
    }
}
