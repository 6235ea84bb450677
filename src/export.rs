use std::fs;
use std::path::{Path, PathBuf};

use image::{GrayImage, ImageBuffer, Luma, Rgb, RgbImage};
use serde::Serialize;
use thiserror::Error;

use crate::climate::{PrecipitationStage, TemperatureStage};
use crate::hydrology::{BasinRole, Relief, RiverNetworkStats};
use crate::thresholds::Thresholds;
use crate::tilemap::Tilemap;
use crate::world::{WorldLayers, WorldParameters};

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("image export failed: {0}")]
    Image(#[from] image::ImageError),
    #[error("export I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("summary serialisation failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Write a scalar grid as 8-bit grayscale, min-max normalised.
pub fn save_grid_png(grid: &Tilemap<f32>, path: impl AsRef<Path>) -> Result<(), ExportError> {
    let (lo, hi) = finite_range(grid);
    let span = hi - lo;
    let img: GrayImage = ImageBuffer::from_fn(grid.width as u32, grid.height as u32, |x, y| {
        let v = *grid.get(x as usize, y as usize);
        let t = if v.is_finite() && span > 0.0 {
            (v - lo) / span
        } else if v.is_finite() {
            0.0
        } else {
            1.0
        };
        Luma([(t.clamp(0.0, 1.0) * 255.0) as u8])
    });
    img.save(path)?;
    Ok(())
}

/// Write a `[0, 1]` grid through [`CLIMATE_RAMP`]. Values are clamped; ocean
/// cells are painted flat blue when a mask is given.
pub fn save_ramp_png(
    grid: &Tilemap<f32>,
    ocean: Option<&Tilemap<bool>>,
    path: impl AsRef<Path>,
) -> Result<(), ExportError> {
    let img: RgbImage = ImageBuffer::from_fn(grid.width as u32, grid.height as u32, |x, y| {
        let (x, y) = (x as usize, y as usize);
        if ocean.is_some_and(|o| *o.get(x, y)) {
            return Rgb(OCEAN_COLOR);
        }
        Rgb(ramp_color(*grid.get(x, y)))
    });
    img.save(path)?;
    Ok(())
}

const OCEAN_COLOR: [u8; 3] = [28, 58, 112];

/// Cold/dry to hot/wet stops at uneven positions; the middle is stretched
/// because most land cells fall there.
const CLIMATE_RAMP: [(f32, [u8; 3]); 7] = [
    (0.00, [48, 18, 96]),
    (0.15, [40, 92, 180]),
    (0.35, [52, 168, 160]),
    (0.50, [124, 196, 92]),
    (0.65, [232, 216, 120]),
    (0.85, [236, 128, 52]),
    (1.00, [150, 24, 32]),
];

fn ramp_color(t: f32) -> [u8; 3] {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let upper = CLIMATE_RAMP
        .iter()
        .position(|&(at, _)| at >= t)
        .unwrap_or(CLIMATE_RAMP.len() - 1)
        .max(1);
    let (a_at, a) = CLIMATE_RAMP[upper - 1];
    let (b_at, b) = CLIMATE_RAMP[upper];
    let w = (t - a_at) / (b_at - a_at);
    std::array::from_fn(|i| (a[i] as f32 + (b[i] as f32 - a[i] as f32) * w).round() as u8)
}

fn relief_color(relief: Relief) -> [u8; 3] {
    match relief {
        Relief::Ocean => OCEAN_COLOR,
        Relief::Lowland => [96, 152, 72],
        Relief::Hill => [164, 160, 92],
        Relief::Mountain => [132, 108, 84],
        Relief::Peak => [236, 236, 240],
    }
}

/// Relief classes with basins, river paths and river sources drawn on top.
pub fn save_hydrology_png(layers: &WorldLayers, path: impl AsRef<Path>) -> Result<(), ExportError> {
    let hydro = &layers.hydrology;
    let mut img: RgbImage = ImageBuffer::from_fn(layers.width as u32, layers.height as u32, |x, y| {
        let (x, y) = (x as usize, y as usize);
        let color = match hydro.basins.role_at(x, y) {
            Some((_, BasinRole::Center)) => [20, 40, 160],
            Some((_, BasinRole::PourPoint)) => [240, 200, 40],
            Some((_, BasinRole::Interior)) => [60, 110, 200],
            None => relief_color(*layers.relief.get(x, y)),
        };
        Rgb(color)
    });

    for river in &hydro.rivers {
        for &(x, y) in &river.cells {
            if !hydro.ocean.get(x, y) && !hydro.basins.contains(x, y) {
                img.put_pixel(x as u32, y as u32, Rgb([80, 170, 255]));
            }
        }
    }
    for &(x, y) in &hydro.river_sources {
        img.put_pixel(x as u32, y as u32, Rgb([255, 60, 60]));
    }

    img.save(path)?;
    Ok(())
}

/// Everything worth reading after a run, without the grids.
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub width: usize,
    pub height: usize,
    pub sea_level: f32,
    pub world: WorldParameters,
    pub ocean_cells: usize,
    pub basin_count: usize,
    pub basin_cells: usize,
    pub sink_count: usize,
    pub forced_sinks: usize,
    pub max_accumulation: f32,
    pub river_sources: usize,
    pub rivers: RiverNetworkStats,
    pub temperature_thresholds: Thresholds,
    pub precipitation_thresholds: Thresholds,
    pub base_precipitation_thresholds: Thresholds,
}

impl RunSummary {
    pub fn from_layers(layers: &WorldLayers) -> Self {
        let hydro = &layers.hydrology;
        Self {
            width: layers.width,
            height: layers.height,
            sea_level: layers.sea_level,
            world: layers.world,
            ocean_cells: hydro.ocean_cells(),
            basin_count: hydro.basins.len(),
            basin_cells: hydro.basins.cell_count(),
            sink_count: hydro.flow.sink_count(),
            forced_sinks: hydro.forced_sinks.len(),
            max_accumulation: hydro.accumulation.min_max().map_or(0.0, |(_, hi)| hi),
            river_sources: hydro.river_sources.len(),
            rivers: hydro.river_stats(),
            temperature_thresholds: layers.climate.temperature_thresholds,
            precipitation_thresholds: layers.climate.precipitation.thresholds,
            base_precipitation_thresholds: layers.climate.precipitation.base_thresholds,
        }
    }

    pub fn print(&self) {
        let cells = (self.width * self.height).max(1) as f64;
        println!("World {}x{} (seed {})", self.width, self.height, self.world.seed);
        println!(
            "  Ocean: {} cells ({:.1}%)",
            self.ocean_cells,
            100.0 * self.ocean_cells as f64 / cells
        );
        println!("  Basins: {} ({} cells)", self.basin_count, self.basin_cells);
        println!(
            "  Sinks: {} ({} forced), max accumulation {:.0}",
            self.sink_count, self.forced_sinks, self.max_accumulation
        );
        println!(
            "  Rivers: {} from {} sources ({} reach the ocean, {} end in basins, mean length {:.1}, max {})",
            self.rivers.count,
            self.river_sources,
            self.rivers.reaching_ocean,
            self.rivers.ending_in_basins,
            self.rivers.mean_length,
            self.rivers.max_length
        );
        print_thresholds("Temperature", &self.temperature_thresholds);
        print_thresholds("Precipitation", &self.precipitation_thresholds);
    }
}

fn print_thresholds(label: &str, t: &Thresholds) {
    println!(
        "  {} thresholds: {:.3} / {:.3} / {:.3} (range {:.3}..{:.3})",
        label, t.low_threshold, t.medium_threshold, t.high_threshold, t.min, t.max
    );
}

/// Dump every stage grid plus overlays and `summary.json` into `dir`.
/// Returns the written paths.
pub fn export_all(layers: &WorldLayers, dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, ExportError> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;
    let mut written = Vec::new();
    let hydro = &layers.hydrology;

    let mut save = |name: &str, grid: &Tilemap<f32>| -> Result<(), ExportError> {
        let path = dir.join(format!("{name}.png"));
        save_grid_png(grid, &path)?;
        written.push(path);
        Ok(())
    };
    save("elevation", &layers.heightmap)?;
    save("filled", &hydro.filled)?;
    save("accumulation", &hydro.accumulation.map(|a| a.ln()))?;
    save("distance_to_ocean", &layers.climate.precipitation.distance_to_ocean)?;
    for stage in TemperatureStage::ALL {
        save(stage.name(), layers.climate.temperature.get(stage))?;
    }
    for stage in PrecipitationStage::ALL {
        save(stage.name(), layers.climate.precipitation.get(stage))?;
    }

    let path = dir.join("temperature.png");
    save_ramp_png(&layers.climate.temperature.final_stage, None, &path)?;
    written.push(path);

    let path = dir.join("precipitation.png");
    save_ramp_png(&layers.climate.precipitation.final_stage, Some(&hydro.ocean), &path)?;
    written.push(path);

    let path = dir.join("hydrology.png");
    save_hydrology_png(layers, &path)?;
    written.push(path);

    let path = dir.join("summary.json");
    fs::write(&path, serde_json::to_string_pretty(&RunSummary::from_layers(layers))?)?;
    written.push(path);

    log::info!("Exported {} files to {}", written.len(), dir.display());
    Ok(written)
}

fn finite_range(grid: &Tilemap<f32>) -> (f32, f32) {
    grid.as_slice()
        .iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc: Option<(f32, f32)>, &v| match acc {
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            None => Some((v, v)),
        })
        .unwrap_or((0.0, 0.0))
}
