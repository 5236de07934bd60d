mod receiver;
mod scheduler;
mod service;

pub use receiver::AlarmReceiver;
pub use scheduler::AlarmScheduler;
pub use service::{
    AlarmService, TokioAlarmService, WakeUp, REQUEST_NOTIFY_PHASE_COMPLETE,
};
