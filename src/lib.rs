//! Hydrology and climate generation over a raw heightmap.
//!
//! Re-exports modules for use by binaries and tools. The entry point is
//! [`pipeline::generate`].

pub mod climate;
pub mod config;
pub mod error;
pub mod export;
pub mod hydrology;
pub mod pipeline;
pub mod seeds;
pub mod synthetic;
pub mod thresholds;
pub mod tilemap;
pub mod util;
pub mod world;

pub use config::GenerationParameters;
pub use error::{ConfigError, GenerationError};
pub use pipeline::generate;
pub use world::{CellProbe, GenerationInput, WorldLayers, WorldParameters};
