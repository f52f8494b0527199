mod config;
pub mod database;
pub mod store;

pub use config::{CacheConfig, Config, GeneratorConfig, LoggingConfig, MoodConfig};
pub use database::Database;
pub use store::ItineraryStore;

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns the data directory, creating it if needed.
///
/// `WAYFARER_DATA_DIR` wins when set. Otherwise `~/.config/wayfarer/`, or
/// `~/.config/wayfarer-dev/` with `WAYFARER_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("WAYFARER_DATA_DIR") {
        Some(custom) if !custom.is_empty() => PathBuf::from(custom),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("WAYFARER_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("wayfarer-dev")
            } else {
                base_dir.join("wayfarer")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
