//! The platform wake-up port.
//!
//! A wake-up is a callback delivered at (approximately) a target
//! wall-clock time, even if nothing else is going on in the process. The
//! scheduler hands the platform a serialized payload; the platform later
//! invokes the receiver with that payload and nothing else -- the handler
//! may not assume any prior in-memory state beyond what the payload and
//! persisted storage provide.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cycle::{now_ms, Phase};
use crate::error::AlarmError;

/// Identifying key for the single "phase complete" wake-up. Scheduling
/// again under the same key replaces the pending wake-up, so at most one
/// is outstanding at any time.
pub const REQUEST_NOTIFY_PHASE_COMPLETE: u32 = 10;

/// Payload carried by a scheduled wake-up.
///
/// Carries the phase the wake-up was armed for, so the receiver can tell
/// that the cycle moved on between scheduling and firing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WakeUp {
    pub phase: Phase,
    /// Epoch ms the wake-up was scheduled to fire at.
    pub scheduled_for_epoch_ms: u64,
}

/// OS alarm service port.
///
/// Implementations must replace any pending wake-up already scheduled
/// under the same key, and must treat `cancel` for an unknown key as a
/// no-op.
pub trait AlarmService: Send + Sync {
    /// Schedule a doze-exempt wake-up at an exact time.
    ///
    /// Returns [`AlarmError::ExactSchedulingDenied`] when the platform
    /// refuses exact scheduling; callers fall back to
    /// [`schedule_inexact`](Self::schedule_inexact).
    fn schedule_exact(&self, key: u32, at_epoch_ms: u64, wake_up: WakeUp)
        -> Result<(), AlarmError>;

    /// Best-effort scheduling; may fire late under power management.
    fn schedule_inexact(
        &self,
        key: u32,
        at_epoch_ms: u64,
        wake_up: WakeUp,
    ) -> Result<(), AlarmError>;

    /// Cancel the pending wake-up for `key`, if any.
    fn cancel(&self, key: u32);
}

/// In-process alarm service backed by the tokio timer.
///
/// Each scheduled key owns one sleeping task; scheduling again under the
/// same key aborts the previous task. Fired payloads are delivered on an
/// unbounded channel, one message per wake-up. The tokio timer has no
/// exactness tiers, so both scheduling methods arm the same sleep.
pub struct TokioAlarmService {
    handle: tokio::runtime::Handle,
    fired: tokio::sync::mpsc::UnboundedSender<WakeUp>,
    pending: Mutex<HashMap<u32, tokio::task::JoinHandle<()>>>,
}

impl TokioAlarmService {
    /// Must be called from within a tokio runtime; sleep tasks spawn onto
    /// the current runtime. Fired wake-ups arrive on the paired receiver
    /// of `fired`.
    pub fn new(fired: tokio::sync::mpsc::UnboundedSender<WakeUp>) -> Self {
        Self {
            handle: tokio::runtime::Handle::current(),
            fired,
            pending: Mutex::new(HashMap::new()),
        }
    }

    fn arm(&self, key: u32, at_epoch_ms: u64, wake_up: WakeUp) -> Result<(), AlarmError> {
        let delay = Duration::from_millis(at_epoch_ms.saturating_sub(now_ms()));
        let fired = self.fired.clone();
        let task = self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = fired.send(wake_up);
        });

        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = pending.insert(key, task) {
            previous.abort();
        }
        Ok(())
    }
}

impl AlarmService for TokioAlarmService {
    fn schedule_exact(
        &self,
        key: u32,
        at_epoch_ms: u64,
        wake_up: WakeUp,
    ) -> Result<(), AlarmError> {
        self.arm(key, at_epoch_ms, wake_up)
    }

    fn schedule_inexact(
        &self,
        key: u32,
        at_epoch_ms: u64,
        wake_up: WakeUp,
    ) -> Result<(), AlarmError> {
        self.arm(key, at_epoch_ms, wake_up)
    }

    fn cancel(&self, key: u32) {
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(task) = pending.remove(&key) {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fires_after_deadline() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let service = TokioAlarmService::new(tx);
        let wake_up = WakeUp {
            phase: Phase::Work,
            scheduled_for_epoch_ms: now_ms() + 10,
        };
        service
            .schedule_exact(REQUEST_NOTIFY_PHASE_COMPLETE, wake_up.scheduled_for_epoch_ms, wake_up)
            .unwrap();
        let fired = rx.recv().await.unwrap();
        assert_eq!(fired, wake_up);
    }

    #[tokio::test]
    async fn rescheduling_replaces_the_pending_wake_up() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let service = TokioAlarmService::new(tx);
        let stale = WakeUp {
            phase: Phase::Work,
            scheduled_for_epoch_ms: now_ms() + 50,
        };
        let fresh = WakeUp {
            phase: Phase::Break,
            scheduled_for_epoch_ms: now_ms() + 20,
        };
        service
            .schedule_exact(REQUEST_NOTIFY_PHASE_COMPLETE, stale.scheduled_for_epoch_ms, stale)
            .unwrap();
        service
            .schedule_exact(REQUEST_NOTIFY_PHASE_COMPLETE, fresh.scheduled_for_epoch_ms, fresh)
            .unwrap();

        let fired = rx.recv().await.unwrap();
        assert_eq!(fired.phase, Phase::Break);
        // The replaced task was aborted; nothing else is queued.
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn cancel_drops_the_pending_wake_up() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let service = TokioAlarmService::new(tx);
        let wake_up = WakeUp {
            phase: Phase::Work,
            scheduled_for_epoch_ms: now_ms() + 20,
        };
        service
            .schedule_exact(REQUEST_NOTIFY_PHASE_COMPLETE, wake_up.scheduled_for_epoch_ms, wake_up)
            .unwrap();
        service.cancel(REQUEST_NOTIFY_PHASE_COMPLETE);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(rx.try_recv().is_err());
    }
}
