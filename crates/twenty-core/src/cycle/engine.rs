//! Cycle state machine.
//!
//! The cycle is a wall-clock-based state machine. It stores timestamps
//! and derives remaining time on read -- no internal thread counts down,
//! so the state survives process death as long as it is persisted.
//!
//! ## State Transitions
//!
//! ```text
//! Work-paused  <──pause/resume──>  Work-running
//!      │                               │
//!    skip                      skip / expiration
//!      │                               │
//!      v                               v
//! Break-paused <──pause/resume──> Break-running
//! ```
//!
//! Expiration is the only transition besides an explicit skip: once the
//! locked duration has fully elapsed, the phase flips and elapsed time
//! resets for the new phase.
//!
//! Commands come in pairs: `start()` reads the wall clock itself, while
//! `start_at(now)` takes the clock reading as a parameter. The receiver
//! and the tests go through the `*_at` variants so every computation uses
//! a single clock reading.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::phase::{Phase, PhaseDurations};
use crate::events::Event;

/// Shared handle to the process-wide cycle instance.
///
/// Mutations are short arithmetic over stored timestamps; nothing blocks
/// or performs I/O while the lock is held.
pub type SharedCycle = Arc<Mutex<Cycle>>;

/// The stateful timer tracking the current phase and elapsed time.
///
/// Serde round-trippable: persisting a running cycle and loading it after
/// a restart reconstructs consistent remaining time from the stored
/// wall-clock timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cycle {
    phase: Phase,
    /// Duration locked in when the current phase was entered. Duration
    /// changes apply at the next phase entry, never retroactively.
    phase_duration_ms: u64,
    durations: PhaseDurations,
    /// Epoch ms at which the phase clock last started or resumed.
    /// `None` while paused; never used to compute remaining time then.
    #[serde(default)]
    started_at_epoch_ms: Option<u64>,
    /// Time spent in the current phase before the last pause.
    accumulated_ms: u64,
    running: bool,
}

impl Cycle {
    /// Create a new cycle: Work phase, paused, nothing elapsed.
    pub fn new(durations: PhaseDurations) -> Self {
        Self {
            phase: Phase::Work,
            phase_duration_ms: durations.for_phase(Phase::Work),
            durations,
            started_at_epoch_ms: None,
            accumulated_ms: 0,
            running: false,
        }
    }

    /// Wrap into the shared handle collaborators hold.
    pub fn shared(self) -> SharedCycle {
        Arc::new(Mutex::new(self))
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn phase_name(&self) -> &'static str {
        self.phase.display_name()
    }

    pub fn running(&self) -> bool {
        self.running
    }

    /// Duration the current phase was locked to at entry.
    pub fn phase_duration_ms(&self) -> u64 {
        self.phase_duration_ms
    }

    pub fn durations(&self) -> PhaseDurations {
        self.durations
    }

    pub fn remaining_ms(&self) -> u64 {
        self.remaining_ms_at(now_ms())
    }

    /// Explicit-clock variant of [`remaining_ms`](Self::remaining_ms).
    ///
    /// The clock is read exactly once and threaded through the whole
    /// computation, so a concurrent pause cannot tear the result.
    pub fn remaining_ms_at(&self, now_epoch_ms: u64) -> u64 {
        self.phase_duration_ms
            .saturating_sub(self.elapsed_ms_at(now_epoch_ms))
    }

    /// 0.0 .. 1.0 progress within the current phase.
    pub fn phase_progress(&self) -> f64 {
        if self.phase_duration_ms == 0 {
            return 0.0;
        }
        1.0 - (self.remaining_ms() as f64 / self.phase_duration_ms as f64)
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            phase: self.phase,
            phase_label: self.phase_name().to_string(),
            running: self.running,
            remaining_ms: self.remaining_ms(),
            total_ms: self.phase_duration_ms,
            phase_progress: self.phase_progress(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Option<Event> {
        self.start_at(now_ms())
    }

    /// Paused -> running. No-op if already running.
    pub fn start_at(&mut self, now_epoch_ms: u64) -> Option<Event> {
        if self.running {
            return None;
        }
        self.running = true;
        self.started_at_epoch_ms = Some(now_epoch_ms);
        Some(Event::CycleStarted {
            phase: self.phase,
            remaining_ms: self.remaining_ms_at(now_epoch_ms),
            at: Utc::now(),
        })
    }

    pub fn resume(&mut self) -> Option<Event> {
        self.resume_at(now_ms())
    }

    /// Same transition as [`start_at`](Self::start_at) with its own event
    /// label, so callers can tell a fresh start from a resume.
    pub fn resume_at(&mut self, now_epoch_ms: u64) -> Option<Event> {
        if self.running {
            return None;
        }
        self.running = true;
        self.started_at_epoch_ms = Some(now_epoch_ms);
        Some(Event::CycleResumed {
            phase: self.phase,
            remaining_ms: self.remaining_ms_at(now_epoch_ms),
            at: Utc::now(),
        })
    }

    pub fn pause(&mut self) -> Option<Event> {
        self.pause_at(now_ms())
    }

    /// Running -> paused. Folds live elapsed time into `accumulated_ms`,
    /// clamped so it never exceeds the locked phase duration.
    pub fn pause_at(&mut self, now_epoch_ms: u64) -> Option<Event> {
        if !self.running {
            return None;
        }
        self.accumulated_ms = self
            .elapsed_ms_at(now_epoch_ms)
            .min(self.phase_duration_ms);
        self.running = false;
        self.started_at_epoch_ms = None;
        Some(Event::CyclePaused {
            phase: self.phase,
            remaining_ms: self.remaining_ms_at(now_epoch_ms),
            at: Utc::now(),
        })
    }

    pub fn skip(&mut self) -> Option<Event> {
        self.skip_at(now_ms())
    }

    /// Abandon the rest of the current phase and enter the other one.
    /// Running/paused status is preserved.
    pub fn skip_at(&mut self, now_epoch_ms: u64) -> Option<Event> {
        let from = self.phase;
        self.enter_phase(from.other(), now_epoch_ms);
        Some(Event::PhaseSkipped {
            from,
            to: self.phase,
            at: Utc::now(),
        })
    }

    pub fn complete_phase(&mut self, expected: Phase) -> Option<Event> {
        self.complete_phase_at(expected, now_ms())
    }

    /// Eager phase transition driven by a fired wake-up.
    ///
    /// Returns `None` when the wake-up is stale: the cycle has already
    /// left `expected` (the user skipped) or is no longer running (the
    /// user paused after the wake-up was armed).
    pub fn complete_phase_at(&mut self, expected: Phase, now_epoch_ms: u64) -> Option<Event> {
        if !self.running || self.phase != expected {
            return None;
        }
        let completed = self.phase;
        let duration_ms = self.phase_duration_ms;
        self.enter_phase(completed.other(), now_epoch_ms);
        Some(Event::PhaseCompleted {
            phase: completed,
            next_phase: self.phase,
            duration_ms,
            at: Utc::now(),
        })
    }

    pub fn refresh(&mut self) -> Vec<Event> {
        self.refresh_at(now_ms())
    }

    /// Absorb wall-clock time that passed while nobody was looking.
    ///
    /// While the cycle is running and the locked duration has fully
    /// elapsed, flip to the other phase and carry the leftover elapsed
    /// time forward; after a long sleep this can produce several
    /// completions in one call. Returns the completion events in order.
    pub fn refresh_at(&mut self, now_epoch_ms: u64) -> Vec<Event> {
        let mut events = Vec::new();
        while self.running && self.remaining_ms_at(now_epoch_ms) == 0 {
            let leftover = self
                .elapsed_ms_at(now_epoch_ms)
                .saturating_sub(self.phase_duration_ms);
            let completed = self.phase;
            let duration_ms = self.phase_duration_ms;
            // Backdate the new phase's start so the leftover counts
            // toward it.
            self.enter_phase(completed.other(), now_epoch_ms.saturating_sub(leftover));
            events.push(Event::PhaseCompleted {
                phase: completed,
                next_phase: self.phase,
                duration_ms,
                at: Utc::now(),
            });
        }
        events
    }

    /// Record new configured durations. Takes effect at the next phase
    /// entry; the phase already in progress keeps its locked duration.
    pub fn set_durations(&mut self, durations: PhaseDurations) -> Option<Event> {
        if durations == self.durations {
            return None;
        }
        self.durations = durations;
        Some(Event::DurationsUpdated {
            work_ms: durations.for_phase(Phase::Work),
            break_ms: durations.for_phase(Phase::Break),
            at: Utc::now(),
        })
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Elapsed time in the current phase at `now_epoch_ms`.
    fn elapsed_ms_at(&self, now_epoch_ms: u64) -> u64 {
        let live = match (self.running, self.started_at_epoch_ms) {
            (true, Some(started)) => now_epoch_ms.saturating_sub(started),
            _ => 0,
        };
        self.accumulated_ms.saturating_add(live)
    }

    /// Enter `next`: lock its configured duration and reset the phase
    /// clock. Preserves running/paused status.
    fn enter_phase(&mut self, next: Phase, now_epoch_ms: u64) {
        self.phase = next;
        self.phase_duration_ms = self.durations.for_phase(next);
        self.accumulated_ms = 0;
        self.started_at_epoch_ms = if self.running {
            Some(now_epoch_ms)
        } else {
            None
        };
    }
}

pub(crate) fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIN: u64 = 60 * 1000;

    fn cycle_25_5() -> Cycle {
        Cycle::new(PhaseDurations::from_minutes(25, 5))
    }

    #[test]
    fn new_cycle_is_paused_work() {
        let cycle = cycle_25_5();
        assert_eq!(cycle.phase(), Phase::Work);
        assert!(!cycle.running());
        assert_eq!(cycle.remaining_ms_at(0), 25 * MIN);
    }

    #[test]
    fn start_pause_resume() {
        let mut cycle = cycle_25_5();
        assert!(cycle.start_at(1_000).is_some());
        assert!(cycle.running());
        // Already running: no-op.
        assert!(cycle.start_at(2_000).is_none());

        assert!(cycle.pause_at(61_000).is_some());
        assert!(!cycle.running());
        assert!(cycle.pause_at(62_000).is_none());

        assert!(cycle.resume_at(100_000).is_some());
        assert!(cycle.running());
    }

    #[test]
    fn remaining_counts_down_only_while_running() {
        let mut cycle = cycle_25_5();
        cycle.start_at(0);
        assert_eq!(cycle.remaining_ms_at(5 * MIN), 20 * MIN);

        cycle.pause_at(5 * MIN);
        // Clock frozen at the accumulated elapsed time.
        assert_eq!(cycle.remaining_ms_at(15 * MIN), 20 * MIN);

        cycle.resume_at(15 * MIN);
        assert_eq!(cycle.remaining_ms_at(16 * MIN), 19 * MIN);
    }

    #[test]
    fn pause_resume_round_trip_preserves_remaining() {
        let mut cycle = cycle_25_5();
        cycle.start_at(0);
        let before = cycle.remaining_ms_at(7 * MIN);
        cycle.pause_at(7 * MIN);
        cycle.resume_at(7 * MIN);
        assert_eq!(cycle.remaining_ms_at(7 * MIN), before);
    }

    #[test]
    fn work_phase_expires_into_break() {
        let mut cycle = cycle_25_5();
        cycle.start_at(0);
        assert_eq!(cycle.remaining_ms_at(25 * MIN), 0);

        let events = cycle.refresh_at(25 * MIN);
        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0],
            Event::PhaseCompleted {
                phase: Phase::Work,
                next_phase: Phase::Break,
                ..
            }
        ));
        assert_eq!(cycle.phase(), Phase::Break);
        assert!(cycle.running());
        assert_eq!(cycle.remaining_ms_at(25 * MIN), 5 * MIN);
    }

    #[test]
    fn refresh_carries_leftover_into_next_phase() {
        let mut cycle = cycle_25_5();
        cycle.start_at(0);
        // 25 min work + 2 min into the break.
        let events = cycle.refresh_at(27 * MIN);
        assert_eq!(events.len(), 1);
        assert_eq!(cycle.phase(), Phase::Break);
        assert_eq!(cycle.remaining_ms_at(27 * MIN), 3 * MIN);
    }

    #[test]
    fn refresh_absorbs_multiple_expirations() {
        let mut cycle = cycle_25_5();
        cycle.start_at(0);
        // 25 + 5 + 25 = 55 min: work, break, and a second work phase all
        // fully elapsed; 1 min into the second break.
        let events = cycle.refresh_at(56 * MIN);
        assert_eq!(events.len(), 3);
        assert_eq!(cycle.phase(), Phase::Break);
        assert_eq!(cycle.remaining_ms_at(56 * MIN), 4 * MIN);
    }

    #[test]
    fn refresh_is_a_no_op_while_paused() {
        let mut cycle = cycle_25_5();
        cycle.start_at(0);
        cycle.pause_at(10 * MIN);
        assert!(cycle.refresh_at(120 * MIN).is_empty());
        assert_eq!(cycle.phase(), Phase::Work);
        assert_eq!(cycle.remaining_ms_at(120 * MIN), 15 * MIN);
    }

    #[test]
    fn skip_flips_phase_and_resets_elapsed() {
        let mut cycle = cycle_25_5();
        cycle.start_at(0);
        let event = cycle.skip_at(10 * MIN);
        assert!(matches!(
            event,
            Some(Event::PhaseSkipped {
                from: Phase::Work,
                to: Phase::Break,
                ..
            })
        ));
        assert_eq!(cycle.phase(), Phase::Break);
        assert!(cycle.running());
        assert_eq!(cycle.remaining_ms_at(10 * MIN), 5 * MIN);
    }

    #[test]
    fn skip_while_paused_stays_paused() {
        let mut cycle = cycle_25_5();
        cycle.skip_at(0);
        assert_eq!(cycle.phase(), Phase::Break);
        assert!(!cycle.running());
        assert_eq!(cycle.remaining_ms_at(60 * MIN), 5 * MIN);
    }

    #[test]
    fn complete_phase_matches_expected() {
        let mut cycle = cycle_25_5();
        cycle.start_at(0);
        let event = cycle.complete_phase_at(Phase::Work, 25 * MIN);
        assert!(matches!(
            event,
            Some(Event::PhaseCompleted {
                phase: Phase::Work,
                next_phase: Phase::Break,
                duration_ms: 1_500_000,
                ..
            })
        ));
        assert_eq!(cycle.phase(), Phase::Break);
    }

    #[test]
    fn complete_phase_drops_stale_expected() {
        let mut cycle = cycle_25_5();
        cycle.start_at(0);
        cycle.skip_at(10 * MIN); // now in Break
        assert!(cycle.complete_phase_at(Phase::Work, 25 * MIN).is_none());
        assert_eq!(cycle.phase(), Phase::Break);
    }

    #[test]
    fn complete_phase_drops_when_paused() {
        let mut cycle = cycle_25_5();
        cycle.start_at(0);
        cycle.pause_at(10 * MIN);
        assert!(cycle.complete_phase_at(Phase::Work, 25 * MIN).is_none());
    }

    #[test]
    fn duration_change_applies_at_next_phase_entry() {
        let mut cycle = cycle_25_5();
        cycle.start_at(0);
        assert!(cycle
            .set_durations(PhaseDurations::from_minutes(50, 10))
            .is_some());
        // Phase in progress keeps its locked duration.
        assert_eq!(cycle.phase_duration_ms(), 25 * MIN);
        assert_eq!(cycle.remaining_ms_at(5 * MIN), 20 * MIN);

        cycle.skip_at(5 * MIN); // Break: new durations already apply
        assert_eq!(cycle.phase_duration_ms(), 10 * MIN);
        cycle.skip_at(5 * MIN);
        assert_eq!(cycle.phase_duration_ms(), 50 * MIN);
    }

    #[test]
    fn set_durations_is_a_no_op_when_unchanged() {
        let mut cycle = cycle_25_5();
        assert!(cycle
            .set_durations(PhaseDurations::from_minutes(25, 5))
            .is_none());
    }

    #[test]
    fn serde_round_trip_preserves_remaining() {
        let mut cycle = cycle_25_5();
        cycle.start_at(0);
        cycle.pause_at(5 * MIN);

        let json = serde_json::to_string(&cycle).unwrap();
        let restored: Cycle = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.phase(), Phase::Work);
        assert!(!restored.running());
        assert_eq!(restored.remaining_ms_at(90 * MIN), 20 * MIN);
    }
}
