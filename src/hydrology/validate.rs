//! Post-hoc checks of the hydrology invariants.
//!
//! Nothing in the pipeline depends on this; it exists for tests and for the
//! `debug_hydrology` binary.

use serde::Serialize;

use crate::config::PitFillMode;
use crate::hydrology::ocean::local_minima;
use crate::hydrology::HydrologyLayers;
use crate::tilemap::Tilemap;

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct HydrologyReport {
    pub cells: usize,
    /// Cells whose flow path never reaches a sink.
    pub non_draining: usize,
    /// Flow edges where accumulation decreases downstream.
    pub monotonicity_violations: usize,
    /// Local minima left on the filled map outside ocean, basins and outlet.
    pub residual_pits: usize,
    /// Basin cells that are also ocean.
    pub basin_ocean_overlap: usize,
    /// Cells forced to sinks after a flow cycle.
    pub forced_sinks: usize,
    /// Residual pits only count against `Epsilon` fills; `Flat` fills leave
    /// level plateaus by construction.
    pub fill_mode: PitFillMode,
}

impl HydrologyReport {
    pub fn is_clean(&self) -> bool {
        let pits_ok = self.fill_mode == PitFillMode::Flat || self.residual_pits == 0;
        self.non_draining == 0
            && self.monotonicity_violations == 0
            && self.basin_ocean_overlap == 0
            && pits_ok
    }

    pub fn print(&self) {
        println!("Hydrology invariants ({} cells):", self.cells);
        println!("  Non-draining cells:       {}", self.non_draining);
        println!("  Monotonicity violations:  {}", self.monotonicity_violations);
        println!("  Residual pits:            {} ({:?} fill)", self.residual_pits, self.fill_mode);
        println!("  Basin/ocean overlap:      {}", self.basin_ocean_overlap);
        println!("  Forced sinks:             {}", self.forced_sinks);
        println!("  Status: {}", if self.is_clean() { "OK" } else { "VIOLATED" });
    }
}

pub fn check_invariants(layers: &HydrologyLayers, fill_mode: PitFillMode) -> HydrologyReport {
    let width = layers.filled.width;
    let height = layers.filled.height;

    let mut monotonicity_violations = 0;
    for y in 0..height {
        for x in 0..width {
            if let Some((dx, dy)) = layers.flow.downstream(x, y) {
                if *layers.accumulation.get(dx, dy) < *layers.accumulation.get(x, y) {
                    monotonicity_violations += 1;
                }
            }
        }
    }

    let mut mask = layers.basins.mask();
    for &(x, y) in &layers.outlet {
        mask.set(x, y, true);
    }
    let residual_pits = local_minima(&layers.filled, &layers.ocean, Some(&mask)).len();

    let basin_ocean_overlap = layers
        .basins
        .iter()
        .flat_map(|b| b.cells.iter())
        .filter(|&&(x, y)| *layers.ocean.get(x, y))
        .count();

    HydrologyReport {
        cells: width * height,
        non_draining: count_non_draining(layers),
        monotonicity_violations,
        residual_pits,
        basin_ocean_overlap,
        forced_sinks: layers.forced_sinks.len(),
        fill_mode,
    }
}

/// Walk each cell's flow path (at most `W×H` steps) and count those that
/// never reach a sink. Paths already known to drain are memoised.
fn count_non_draining(layers: &HydrologyLayers) -> usize {
    const UNKNOWN: u8 = 0;
    const DRAINS: u8 = 1;
    const STUCK: u8 = 2;

    let width = layers.filled.width;
    let height = layers.filled.height;
    let limit = width * height;
    let mut state = Tilemap::new_with(width, height, UNKNOWN);
    let mut path = Vec::new();

    for y in 0..height {
        for x in 0..width {
            if *state.get(x, y) != UNKNOWN {
                continue;
            }
            path.clear();
            let (mut cx, mut cy) = (x, y);
            let mut outcome = STUCK;
            for _ in 0..=limit {
                match *state.get(cx, cy) {
                    DRAINS => {
                        outcome = DRAINS;
                        break;
                    }
                    STUCK => break,
                    _ => {}
                }
                path.push((cx, cy));
                match layers.flow.downstream(cx, cy) {
                    Some(next) => (cx, cy) = next,
                    None => {
                        outcome = DRAINS;
                        break;
                    }
                }
            }
            for &(px, py) in &path {
                state.set(px, py, outcome);
            }
        }
    }

    state.as_slice().iter().filter(|&&s| s == STUCK).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HydrologyParams;
    use crate::hydrology::flow::FlowDirections;
    use crate::hydrology::run_hydrology;

    fn noisy_island() -> Tilemap<f32> {
        Tilemap::from_fn(24, 20, |x, y| {
            let dx = x as f32 - 11.5;
            let dy = y as f32 - 9.5;
            let r = (dx * dx + dy * dy).sqrt() / 11.0;
            1.0 - r + 0.15 * ((x as f32 * 0.9).sin() * (y as f32 * 1.3).cos())
        })
    }

    #[test]
    fn test_generated_hydrology_is_clean() {
        let params = HydrologyParams {
            min_basin_area: 4,
            ..HydrologyParams::default()
        };
        let layers = run_hydrology(&noisy_island(), 0.15, &params);
        let report = check_invariants(&layers, params.pit_fill);
        assert!(report.is_clean(), "{report:?}");
        assert_eq!(report.cells, 480);
    }

    #[test]
    fn test_detects_broken_flow() {
        let params = HydrologyParams::default();
        let mut layers = run_hydrology(&noisy_island(), 0.15, &params);
        // Point two cells at each other.
        let mut codes = layers.flow.grid().clone();
        codes.set(5, 5, 2);
        codes.set(6, 5, 6);
        layers.flow = FlowDirections::from_codes(codes);

        let report = check_invariants(&layers, params.pit_fill);
        assert!(report.non_draining >= 2);
        assert!(!report.is_clean());
    }
}
