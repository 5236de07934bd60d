use serde::{Deserialize, Serialize};

/// One segment of the work/break cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Work,
    Break,
}

impl Phase {
    /// The phase that follows this one. The cycle only ever alternates.
    pub fn other(self) -> Self {
        match self {
            Phase::Work => Phase::Break,
            Phase::Break => Phase::Work,
        }
    }

    /// Display label for notifications and status output.
    pub fn display_name(self) -> &'static str {
        match self {
            Phase::Work => "Work",
            Phase::Break => "Break",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Floor for configured phase durations. A zero-length phase would fire
/// its wake-up immediately and spin the cycle.
pub const MIN_PHASE_DURATION_MS: u64 = 60 * 1000;

/// Configured per-phase durations in milliseconds.
///
/// Values below one minute are clamped up when read through
/// [`for_phase`](Self::for_phase), so a bad config cannot produce a
/// zero-length phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseDurations {
    pub work_ms: u64,
    pub break_ms: u64,
}

impl PhaseDurations {
    pub fn from_minutes(work_min: u64, break_min: u64) -> Self {
        Self {
            work_ms: work_min.saturating_mul(60).saturating_mul(1000),
            break_ms: break_min.saturating_mul(60).saturating_mul(1000),
        }
    }

    /// Configured duration for `phase`, clamped to at least one minute.
    pub fn for_phase(&self, phase: Phase) -> u64 {
        let ms = match phase {
            Phase::Work => self.work_ms,
            Phase::Break => self.break_ms,
        };
        ms.max(MIN_PHASE_DURATION_MS)
    }
}

impl Default for PhaseDurations {
    fn default() -> Self {
        Self::from_minutes(25, 5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn other_alternates() {
        assert_eq!(Phase::Work.other(), Phase::Break);
        assert_eq!(Phase::Break.other(), Phase::Work);
        assert_eq!(Phase::Work.other().other(), Phase::Work);
    }

    #[test]
    fn durations_from_minutes() {
        let d = PhaseDurations::from_minutes(25, 5);
        assert_eq!(d.for_phase(Phase::Work), 25 * 60 * 1000);
        assert_eq!(d.for_phase(Phase::Break), 5 * 60 * 1000);
    }

    #[test]
    fn zero_duration_clamps_to_a_minute() {
        let d = PhaseDurations::from_minutes(0, 0);
        assert_eq!(d.for_phase(Phase::Work), MIN_PHASE_DURATION_MS);
        assert_eq!(d.for_phase(Phase::Break), MIN_PHASE_DURATION_MS);
    }
}
