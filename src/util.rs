//! Small shared helpers.

use std::time::{Duration, Instant};

/// Every timed step of a generation run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineStep {
    Generation,
    Hydrology,
    ElevationClassification,
    BasinPreservation,
    PitFilling,
    FlowRouting,
    FlowAccumulation,
    RiverSources,
    Climate,
    TemperatureStages,
    PrecipitationStages,
}

impl PipelineStep {
    pub fn label(self) -> &'static str {
        match self {
            PipelineStep::Generation => "generation",
            PipelineStep::Hydrology => "hydrology",
            PipelineStep::ElevationClassification => "elevation classification",
            PipelineStep::BasinPreservation => "basin preservation",
            PipelineStep::PitFilling => "pit filling",
            PipelineStep::FlowRouting => "flow routing",
            PipelineStep::FlowAccumulation => "flow accumulation",
            PipelineStep::RiverSources => "river sources",
            PipelineStep::Climate => "climate",
            PipelineStep::TemperatureStages => "temperature stages",
            PipelineStep::PrecipitationStages => "precipitation stages",
        }
    }

    /// Whole runs and tracks report at INFO, their inner stages at DEBUG.
    pub fn level(self) -> log::Level {
        match self {
            PipelineStep::Generation | PipelineStep::Hydrology | PipelineStep::Climate => log::Level::Info,
            _ => log::Level::Debug,
        }
    }
}

/// Scope guard that reports how long a [`PipelineStep`] took once dropped.
///
/// ```ignore
/// let _t = Timed::start(PipelineStep::PitFilling);
/// // logs "pit filling took 12.3ms" at DEBUG on drop
/// ```
pub struct Timed {
    step: PipelineStep,
    start: Instant,
}

impl Timed {
    pub fn start(step: PipelineStep) -> Self {
        log::trace!("{} started", step.label());
        Self {
            step,
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for Timed {
    fn drop(&mut self) {
        let ms = self.elapsed().as_secs_f64() * 1000.0;
        log::log!(self.step.level(), "{} took {:.1}ms", self.step.label(), ms);
    }
}
