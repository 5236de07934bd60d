use chrono::Duration as ChronoDuration;
use clap::Subcommand;
use twenty_core::{Config, Cycle, Database, Event};

#[derive(Subcommand)]
pub enum CycleAction {
    /// Start the phase clock
    Start,
    /// Pause the phase clock
    Pause,
    /// Resume a paused cycle
    Resume,
    /// Skip to the other phase
    Skip,
    /// Print current cycle state as JSON
    Status,
}

/// Load the persisted cycle, syncing configured durations (they apply at
/// the next phase entry). Falls back to a fresh cycle when nothing usable
/// is stored.
pub(crate) fn load_cycle(db: &Database, config: &Config) -> Cycle {
    match db.load_cycle() {
        Ok(Some(mut cycle)) => {
            cycle.set_durations(config.durations());
            cycle
        }
        Ok(None) => Cycle::new(config.durations()),
        Err(e) => {
            eprintln!("Warning: failed to load cycle state: {e}");
            Cycle::new(config.durations())
        }
    }
}

/// Record completions that happened while no process was watching the
/// clock (found by `refresh()` on load).
pub(crate) fn record_missed(db: &Database, events: &[Event]) {
    for event in events {
        if let Event::PhaseCompleted {
            phase,
            duration_ms,
            at,
            ..
        } = event
        {
            let started_at = *at - ChronoDuration::milliseconds(*duration_ms as i64);
            if let Err(e) = db.record_phase(*phase, duration_ms / 60_000, started_at, *at) {
                eprintln!("Warning: failed to record completed phase: {e}");
            }
        }
    }
}

pub fn run(action: CycleAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let db = Database::open()?;
    let mut cycle = load_cycle(&db, &config);

    // Absorb wall-clock time since the last invocation.
    let missed = cycle.refresh();
    record_missed(&db, &missed);

    let event = match action {
        CycleAction::Start => cycle.start(),
        CycleAction::Pause => cycle.pause(),
        CycleAction::Resume => cycle.resume(),
        CycleAction::Skip => cycle.skip(),
        CycleAction::Status => None,
    };

    match event {
        Some(event) => println!("{}", serde_json::to_string_pretty(&event)?),
        None => println!("{}", serde_json::to_string_pretty(&cycle.snapshot())?),
    }

    db.save_cycle(&cycle)?;
    Ok(())
}
