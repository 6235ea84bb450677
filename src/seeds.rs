//! Seed management for the climate noise fields.
//!
//! Each noise field gets its own seed, derived from the world's master seed,
//! so the temperature and precipitation fields are uncorrelated while staying
//! reproducible for a fixed master seed.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Seeds for the coherent noise fields used by the climate track.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClimateSeeds {
    /// Master seed (kept for display/reference)
    pub master: u64,
    /// Temperature perturbation noise
    pub temperature: u32,
    /// Precipitation base noise
    pub precipitation: u32,
}

impl ClimateSeeds {
    /// Derive all sub-seeds from a master seed.
    ///
    /// Sub-seeds are drawn from a ChaCha8 stream in a fixed order, so adding a
    /// new field at the end never changes the existing ones.
    pub fn from_master(master: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(master);
        Self {
            master,
            temperature: rng.gen(),
            precipitation: rng.gen(),
        }
    }
}
