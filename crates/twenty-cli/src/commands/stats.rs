use clap::Subcommand;
use twenty_core::Database;

#[derive(Subcommand)]
pub enum StatsAction {
    /// Phases completed today
    Today,
    /// All-time totals
    All,
    /// Recently completed phases, newest first
    Log {
        #[arg(long, default_value = "10")]
        limit: u32,
    },
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    match action {
        StatsAction::Today => {
            let stats = db.stats_today()?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        StatsAction::All => {
            let stats = db.stats_all()?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        StatsAction::Log { limit } => {
            let records = db.recent_phases(limit)?;
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
    }
    Ok(())
}
