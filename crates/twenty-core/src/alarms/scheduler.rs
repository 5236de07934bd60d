//! Translates cycle state into the single pending wake-up.

use std::sync::Arc;

use super::service::{AlarmService, WakeUp, REQUEST_NOTIFY_PHASE_COMPLETE};
use crate::cycle::{now_ms, SharedCycle};
use crate::error::AlarmError;

/// Schedules platform wake-ups from the current state of the cycle.
///
/// There should be only one scheduler active at any given time: all
/// wake-ups share one identifying key, so a second scheduler would
/// silently replace the first one's alarms.
pub struct AlarmScheduler {
    cycle: SharedCycle,
    service: Arc<dyn AlarmService>,
}

impl AlarmScheduler {
    pub fn new(cycle: SharedCycle, service: Arc<dyn AlarmService>) -> Self {
        Self { cycle, service }
    }

    /// Update the pending wake-up from the current cycle state.
    ///
    /// Running: schedule exactly one wake-up at the moment the current
    /// phase expires, replacing whatever was pending. Paused: cancel, so
    /// a paused cycle never fires a spurious notification. Idempotent;
    /// call after any cycle mutation.
    ///
    /// If the platform denies exact scheduling this degrades to inexact
    /// scheduling with a logged warning; the operation itself never
    /// fails.
    pub fn update_alarms(&self) {
        let now = now_ms();
        let (running, remaining_ms, phase) = {
            let cycle = self.cycle.lock().unwrap_or_else(|e| e.into_inner());
            (cycle.running(), cycle.remaining_ms_at(now), cycle.phase())
        };

        if !running {
            self.service.cancel(REQUEST_NOTIFY_PHASE_COMPLETE);
            return;
        }

        let at_epoch_ms = now.saturating_add(remaining_ms);
        let wake_up = WakeUp {
            phase,
            scheduled_for_epoch_ms: at_epoch_ms,
        };
        match self
            .service
            .schedule_exact(REQUEST_NOTIFY_PHASE_COMPLETE, at_epoch_ms, wake_up)
        {
            Ok(()) => {}
            Err(AlarmError::ExactSchedulingDenied) => {
                eprintln!("Warning: exact wake-up scheduling denied; falling back to inexact");
                if let Err(e) =
                    self.service
                        .schedule_inexact(REQUEST_NOTIFY_PHASE_COMPLETE, at_epoch_ms, wake_up)
                {
                    eprintln!("Warning: failed to schedule wake-up: {e}");
                }
            }
            Err(e) => eprintln!("Warning: failed to schedule wake-up: {e}"),
        }
    }
}
