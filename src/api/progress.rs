//! Stage notifications emitted while a run is in progress.

use std::fmt;

/// One of the three sequential phases of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Generation,
    Critique,
    Resolution,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Generation => write!(f, "generation"),
            Stage::Critique => write!(f, "critique"),
            Stage::Resolution => write!(f, "resolution"),
        }
    }
}

/// Receives progress events from the orchestrator. All methods default to no-ops.
pub trait StageObserver: Send + Sync {
    fn on_stage_start(&self, _stage: Stage) {}

    /// Called after answer option `index` of `total` has been generated.
    fn on_option_generated(&self, _index: u32, _total: u32) {}

    fn on_stage_complete(&self, _stage: Stage) {}
}

/// Observer that ignores every event.
pub struct NoProgress;

impl StageObserver for NoProgress {}
