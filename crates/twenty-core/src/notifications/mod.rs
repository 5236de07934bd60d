//! Notification port.
//!
//! The core never talks to a notification backend directly; it formats
//! the message and hands it to whatever [`Notifier`] the composition root
//! provided.

use crate::cycle::Phase;
use crate::error::NotifyError;

/// Posts user-visible notifications when a phase completes.
pub trait Notifier: Send + Sync {
    /// Post a notification describing the completed phase (and implicitly
    /// the phase that is starting). One notification per fired wake-up;
    /// implementations need no dedup logic.
    fn notify_phase_complete(&self, phase: Phase) -> Result<(), NotifyError>;
}

/// Title and body text for a phase-completion notification, shared by
/// every notifier backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseMessage {
    pub title: String,
    pub body: String,
}

impl PhaseMessage {
    pub fn for_phase(phase: Phase) -> Self {
        match phase {
            Phase::Work => Self {
                title: "Work phase complete".into(),
                body: "Time for a break. Look away from the screen.".into(),
            },
            Phase::Break => Self {
                title: "Break is over".into(),
                body: "Back to work.".into(),
            },
        }
    }
}
