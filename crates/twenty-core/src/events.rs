use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cycle::Phase;

/// Every cycle state change produces an Event.
/// The CLI prints them as JSON; the daemon logs them as they happen.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    CycleStarted {
        phase: Phase,
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    CyclePaused {
        phase: Phase,
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    CycleResumed {
        phase: Phase,
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    /// User skipped the rest of the current phase.
    PhaseSkipped {
        from: Phase,
        to: Phase,
        at: DateTime<Utc>,
    },
    /// A phase ran its full duration.
    PhaseCompleted {
        phase: Phase,
        next_phase: Phase,
        /// Duration the completed phase was locked to, in milliseconds.
        duration_ms: u64,
        at: DateTime<Utc>,
    },
    /// Configured durations changed; applied at the next phase entry.
    DurationsUpdated {
        work_ms: u64,
        break_ms: u64,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        phase: Phase,
        phase_label: String,
        running: bool,
        remaining_ms: u64,
        total_ms: u64,
        phase_progress: f64,
        at: DateTime<Utc>,
    },
}
