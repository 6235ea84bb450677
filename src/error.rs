//! Error types surfaced at the generation boundary.

use thiserror::Error;

/// Failures loading or validating [`crate::config::GenerationParameters`].
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid parameter `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Reasons a generation request is rejected before any stage runs.
///
/// Generation is all-or-nothing: when one of these is returned no partial
/// result exists.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("heightmap has zero cells ({width}x{height})")]
    EmptyGrid { width: usize, height: usize },
    #[error("heightmap has {len} values, expected {width}x{height}")]
    ElevationSizeMismatch { width: usize, height: usize, len: usize },
    #[error("non-finite elevation {value} at ({x}, {y})")]
    NonFiniteElevation { x: usize, y: usize, value: f32 },
    #[error("plates map is {plates_width}x{plates_height}, heightmap is {width}x{height}")]
    PlatesSizeMismatch {
        width: usize,
        height: usize,
        plates_width: usize,
        plates_height: usize,
    },
    #[error("sea level must be finite, got {0}")]
    NonFiniteSeaLevel(f32),
    #[error("world parameter `{name}` = {value} is out of range: {reason}")]
    InvalidWorldParameter {
        name: &'static str,
        value: f32,
        reason: &'static str,
    },
    #[error("invalid generation parameters: {0}")]
    InvalidParameters(#[from] ConfigError),
    #[error("failed to read heightmap: {0}")]
    InputIo(#[from] std::io::Error),
    #[error("failed to parse heightmap: {0}")]
    InputParse(#[from] serde_json::Error),
}
