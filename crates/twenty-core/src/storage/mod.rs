mod config;
pub mod database;

pub use config::Config;
pub use database::{Database, PhaseRecord, Stats};

use std::path::PathBuf;

/// Returns `~/.config/twenty[-dev]/` based on TWENTY_ENV.
///
/// Set TWENTY_ENV=dev to use a development data directory.
///
/// # Errors
/// Returns an error if the config directory cannot be created.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("TWENTY_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("twenty-dev")
    } else {
        base_dir.join("twenty")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
