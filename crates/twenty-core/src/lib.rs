//! # Twenty Core Library
//!
//! Core business logic for the Twenty focus-cycle timer. The design is
//! CLI-first: every operation is available through the standalone CLI
//! binary, and any GUI shell would be a thin layer over this library.
//!
//! ## Architecture
//!
//! - **Cycle**: a wall-clock-based state machine tracking the repeating
//!   work/break cycle. Remaining time is derived from stored timestamps
//!   on read -- no thread counts down.
//! - **Alarms**: translates cycle state into exactly one pending wake-up
//!   through the [`AlarmService`] port. A fired wake-up is handled by the
//!   [`AlarmReceiver`], which completes the phase, persists the result,
//!   and posts a notification.
//! - **Notifications**: the [`Notifier`] port consumed by the receiver;
//!   backends are supplied by the composition root.
//! - **Storage**: TOML configuration and SQLite persistence for cycle
//!   state and completed-phase history.
//!
//! ## Key Components
//!
//! - [`Cycle`]: core cycle state machine
//! - [`AlarmScheduler`]: keeps the pending wake-up in sync with the cycle
//! - [`Database`]: cycle persistence and phase history
//! - [`Config`]: application configuration management

pub mod alarms;
pub mod cycle;
pub mod error;
pub mod events;
pub mod notifications;
pub mod storage;

pub use alarms::{
    AlarmReceiver, AlarmScheduler, AlarmService, TokioAlarmService, WakeUp,
    REQUEST_NOTIFY_PHASE_COMPLETE,
};
pub use cycle::{Cycle, Phase, PhaseDurations, SharedCycle, MIN_PHASE_DURATION_MS};
pub use error::{AlarmError, ConfigError, CoreError, NotifyError, StorageError};
pub use events::Event;
pub use notifications::{Notifier, PhaseMessage};
pub use storage::{Config, Database, PhaseRecord, Stats};
