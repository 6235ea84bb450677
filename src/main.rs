use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use hydroclimate::export::{self, RunSummary};
use hydroclimate::{generate, synthetic, GenerationInput, GenerationParameters, WorldParameters};

#[derive(Parser, Debug)]
#[command(name = "hydroclimate")]
#[command(about = "Derive drainage, temperature and precipitation layers from a heightmap")]
struct Args {
    /// Heightmap JSON file (width, height, elevation[, plates, sea_level]).
    /// A synthetic island is generated when omitted.
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Width of the synthetic island
    #[arg(short = 'W', long, default_value = "256")]
    width: usize,

    /// Height of the synthetic island
    #[arg(short = 'H', long, default_value = "128")]
    height: usize,

    /// Random seed (uses random seed if not specified)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Sea level; overrides the value in the heightmap file
    #[arg(long)]
    sea_level: Option<f32>,

    /// Axial tilt in degrees
    #[arg(long, default_value = "23.5", allow_negative_numbers = true)]
    tilt: f32,

    /// Distance to the star, relative to the reference distance
    #[arg(long, default_value = "1.0")]
    star_distance: f32,

    /// Generation parameters as JSON; defaults are used for missing fields
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write every stage grid and a summary into this directory
    #[arg(short, long)]
    export: Option<PathBuf>,

    /// Print every layer for one cell, as "x,y"
    #[arg(long, value_parser = parse_cell)]
    probe: Option<(usize, usize)>,
}

fn parse_cell(s: &str) -> Result<(usize, usize), String> {
    let (x, y) = s.split_once(',').ok_or_else(|| format!("expected x,y, got '{s}'"))?;
    let x = x.trim().parse().map_err(|e| format!("bad x: {e}"))?;
    let y = y.trim().parse().map_err(|e| format!("bad y: {e}"))?;
    Ok((x, y))
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let seed = args.seed.unwrap_or_else(rand::random);
    println!("Generating with seed: {}", seed);

    let params = match &args.config {
        Some(path) => GenerationParameters::from_json_file(path)?,
        None => GenerationParameters::default(),
    };

    let mut input = match &args.input {
        Some(path) => {
            println!("Loading heightmap from {}", path.display());
            GenerationInput::from_json_file(path)?
        }
        None => {
            println!("Synthesising {}x{} island", args.width, args.height);
            let heightmap = synthetic::noise_island(args.width, args.height, seed as u32);
            GenerationInput::new(heightmap, 0.3)
        }
    };
    if let Some(sea_level) = args.sea_level {
        input.sea_level = sea_level;
    }

    let world = WorldParameters {
        seed,
        axial_tilt_deg: args.tilt,
        distance_to_star: args.star_distance,
    };

    let layers = generate(&input, &world, &params)?;
    RunSummary::from_layers(&layers).print();

    if let Some((x, y)) = args.probe {
        match layers.probe(x, y) {
            Some(probe) => probe.print(),
            None => println!("Cell ({}, {}) is outside the {}x{} map", x, y, layers.width, layers.height),
        }
    }

    if let Some(dir) = &args.export {
        let written = export::export_all(&layers, dir)?;
        println!("Wrote {} files to {}", written.len(), dir.display());
    }

    Ok(())
}
