//! Foreground timer daemon.
//!
//! Builds the object graph bottom-up: config and storage first, then the
//! cycle, then the alarm service, scheduler, notifier, and receiver. The
//! loop blocks on fired wake-ups until Ctrl-C, which pauses the cycle and
//! persists it so a later `cycle resume` picks up where it left off.

use std::sync::Arc;

use notify_rust::Notification;
use twenty_core::{
    AlarmReceiver, AlarmScheduler, AlarmService, Config, Database, Notifier, NotifyError, Phase,
    PhaseMessage, TokioAlarmService,
};

use super::cycle::{load_cycle, record_missed};

/// Desktop notifier backed by the platform notification daemon.
struct DesktopNotifier {
    enabled: bool,
    persistent: bool,
    sound: bool,
}

impl DesktopNotifier {
    fn from_config(config: &Config) -> Self {
        Self {
            enabled: config.notifications.enabled,
            persistent: config.notifications.persistent,
            sound: config.notifications.sound,
        }
    }
}

impl Notifier for DesktopNotifier {
    fn notify_phase_complete(&self, phase: Phase) -> Result<(), NotifyError> {
        if !self.enabled {
            return Ok(());
        }
        let message = PhaseMessage::for_phase(phase);
        let mut notification = Notification::new();
        notification
            .appname("twenty")
            .summary(&message.title)
            .body(&message.body);
        if self.sound {
            notification.sound_name("message-new-instant");
        }
        if self.persistent {
            notification.timeout(notify_rust::Timeout::Never);
        }
        notification
            .show()
            .map(|_| ())
            .map_err(|e| NotifyError::PostFailed(e.to_string()))
    }
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run_daemon())
}

async fn run_daemon() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let db = Database::open()?;

    let mut initial = load_cycle(&db, &config);
    let missed = initial.refresh();
    record_missed(&db, &missed);

    if let Some(event) = initial.start() {
        println!("{}", serde_json::to_string_pretty(&event)?);
    } else {
        println!("{}", serde_json::to_string_pretty(&initial.snapshot())?);
    }
    db.save_cycle(&initial)?;

    let cycle = initial.shared();
    let (fired_tx, mut fired_rx) = tokio::sync::mpsc::unbounded_channel();
    let service: Arc<dyn AlarmService> = Arc::new(TokioAlarmService::new(fired_tx));
    let scheduler = Arc::new(AlarmScheduler::new(Arc::clone(&cycle), service));
    let notifier: Arc<dyn Notifier> = Arc::new(DesktopNotifier::from_config(&config));
    let receiver = AlarmReceiver::new(
        Arc::clone(&cycle),
        Arc::clone(&scheduler),
        notifier,
        db,
    );

    scheduler.update_alarms();

    loop {
        tokio::select! {
            fired = fired_rx.recv() => {
                match fired {
                    Some(wake_up) => {
                        if let Some(event) = receiver.handle_wake_up(wake_up) {
                            println!("{}", serde_json::to_string_pretty(&event)?);
                        }
                    }
                    None => return Ok(()),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                let snapshot = {
                    let mut cycle = cycle.lock().unwrap_or_else(|e| e.into_inner());
                    if let Some(event) = cycle.pause() {
                        println!("{}", serde_json::to_string_pretty(&event)?);
                    }
                    cycle.clone()
                };
                scheduler.update_alarms();
                Database::open()?.save_cycle(&snapshot)?;
                return Ok(());
            }
        }
    }
}
