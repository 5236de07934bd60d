//! Wake-up entry point.
//!
//! Invoked when a scheduled wake-up fires. The receiver works from the
//! payload plus the shared cycle handle and persisted storage only: by
//! the time a wake-up is delivered the user may already have paused or
//! skipped, so the payload phase is validated before anything else
//! happens.

use std::sync::{Arc, Mutex};

use chrono::Duration as ChronoDuration;

use super::scheduler::AlarmScheduler;
use super::service::WakeUp;
use crate::cycle::{now_ms, SharedCycle};
use crate::events::Event;
use crate::notifications::Notifier;
use crate::storage::Database;

/// Handles fired wake-ups: completes the phase, persists the new cycle
/// state, posts the notification, then arms the wake-up for the phase
/// that just began.
pub struct AlarmReceiver {
    cycle: SharedCycle,
    scheduler: Arc<AlarmScheduler>,
    notifier: Arc<dyn Notifier>,
    store: Mutex<Database>,
}

impl AlarmReceiver {
    pub fn new(
        cycle: SharedCycle,
        scheduler: Arc<AlarmScheduler>,
        notifier: Arc<dyn Notifier>,
        store: Database,
    ) -> Self {
        Self {
            cycle,
            scheduler,
            notifier,
            store: Mutex::new(store),
        }
    }

    /// Handle a fired wake-up.
    ///
    /// Eagerly pushes the phase transition into the cycle and persists it
    /// before the notification is posted, so the transition survives even
    /// if the process dies right after. Stale wake-ups -- the cycle
    /// already left the payload's phase, or was paused after scheduling --
    /// are dropped without a notification. Returns the completion event,
    /// or `None` for a stale wake-up.
    pub fn handle_wake_up(&self, wake_up: WakeUp) -> Option<Event> {
        let (event, snapshot) = {
            let mut cycle = self.cycle.lock().unwrap_or_else(|e| e.into_inner());
            let event = cycle.complete_phase_at(wake_up.phase, now_ms());
            (event, cycle.clone())
        };

        let event = match event {
            Some(event) => event,
            None => {
                eprintln!(
                    "Stale wake-up for phase {}; dropping",
                    wake_up.phase.display_name()
                );
                return None;
            }
        };

        self.persist(&snapshot, &event);

        if let Event::PhaseCompleted { phase, .. } = &event {
            if let Err(e) = self.notifier.notify_phase_complete(*phase) {
                eprintln!("Warning: failed to post notification: {e}");
            }
        }

        // The cycle is still running in the new phase; arm its wake-up.
        self.scheduler.update_alarms();
        Some(event)
    }

    fn persist(&self, snapshot: &crate::cycle::Cycle, event: &Event) {
        let store = self.store.lock().unwrap_or_else(|e| e.into_inner());
        if let Err(e) = store.save_cycle(snapshot) {
            eprintln!("Warning: failed to persist cycle state: {e}");
        }
        if let Event::PhaseCompleted {
            phase,
            duration_ms,
            at,
            ..
        } = event
        {
            let started_at = *at - ChronoDuration::milliseconds(*duration_ms as i64);
            if let Err(e) = store.record_phase(*phase, duration_ms / 60_000, started_at, *at) {
                eprintln!("Warning: failed to record completed phase: {e}");
            }
        }
    }
}
