//! Flow accumulation in topological order.
//!
//! Every cell contributes one unit. Cells are processed with Kahn's
//! algorithm: a cell is released once everything draining into it has been
//! counted, then passes its total downstream.

use std::collections::VecDeque;

use crate::hydrology::flow::FlowDirections;
use crate::tilemap::Tilemap;

#[derive(Clone, Debug)]
pub struct FlowAccumulation {
    pub values: Tilemap<f32>,
    /// Cells still holding in-degree after the queue drained. These sit on
    /// direction cycles and never got a final value.
    pub unresolved: Vec<(usize, usize)>,
}

impl FlowAccumulation {
    pub fn compute(flow: &FlowDirections) -> Self {
        let width = flow.width();
        let height = flow.height();
        let mut values = Tilemap::new_with(width, height, 1.0f32);
        let mut in_degree = Tilemap::new_with(width, height, 0u8);

        for y in 0..height {
            for x in 0..width {
                if let Some((dx, dy)) = flow.downstream(x, y) {
                    *in_degree.get_mut(dx, dy) += 1;
                }
            }
        }

        // Ridge and edge cells first, in row-major order.
        let mut queue: VecDeque<(usize, usize)> = in_degree
            .iter()
            .filter(|(_, _, &d)| d == 0)
            .map(|(x, y, _)| (x, y))
            .collect();

        while let Some((x, y)) = queue.pop_front() {
            let Some((dx, dy)) = flow.downstream(x, y) else {
                continue;
            };
            let contribution = *values.get(x, y);
            *values.get_mut(dx, dy) += contribution;

            let remaining = in_degree.get_mut(dx, dy);
            *remaining -= 1;
            if *remaining == 0 {
                queue.push_back((dx, dy));
            }
        }

        let unresolved = in_degree
            .iter()
            .filter(|(_, _, &d)| d > 0)
            .map(|(x, y, _)| (x, y))
            .collect();

        Self { values, unresolved }
    }

    pub fn get(&self, x: usize, y: usize) -> f32 {
        *self.values.get(x, y)
    }

    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }

    pub fn max(&self) -> f32 {
        self.values.min_max().map_or(0.0, |(_, hi)| hi)
    }
}

/// Accumulate, forcing any direction cycle to sinks first.
///
/// Returns the accumulation and the cells that had to be forced. A cycle can
/// only come from routing over equal or non-monotonic elevations, so the
/// forced list is normally empty.
pub fn accumulate_resolving_cycles(flow: &mut FlowDirections) -> (FlowAccumulation, Vec<(usize, usize)>) {
    let first = FlowAccumulation::compute(flow);
    if first.is_complete() {
        return (first, Vec::new());
    }

    let forced = first.unresolved;
    log::warn!(
        "Flow directions contain cycles: forcing {} cells to sinks",
        forced.len()
    );
    flow.force_sinks(&forced);
    (FlowAccumulation::compute(flow), forced)
}
