mod engine;
mod phase;

pub use engine::{Cycle, SharedCycle};
pub use phase::{Phase, PhaseDurations, MIN_PHASE_DURATION_MS};

pub(crate) use engine::now_ms;
