use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "twenty-cli", version, about = "Twenty focus-cycle CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Cycle control
    Cycle {
        #[command(subcommand)]
        action: commands::cycle::CycleAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Completed-phase statistics
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// Run the timer in the foreground, posting desktop notifications
    Run,
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Cycle { action } => commands::cycle::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Stats { action } => commands::stats::run(action),
        Commands::Run => commands::run::run(),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
