pub mod config;
pub mod session_log;

pub use config::Config;
pub use session_log::{load_history, LogEntry, SessionLog, SessionRecord, SessionStats};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `~/.config/focusorb[-dev]/` based on FOCUSORB_ENV.
///
/// Set FOCUSORB_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("FOCUSORB_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("focusorb-dev")
    } else {
        base_dir.join("focusorb")
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}

/// Where the task list is kept between runs.
///
/// # Errors
/// See [`data_dir`].
pub fn tasks_path() -> Result<PathBuf, ConfigError> {
    Ok(data_dir()?.join("tasks.json"))
}

/// Where finished monitor sessions are appended.
///
/// # Errors
/// See [`data_dir`].
pub fn sessions_path() -> Result<PathBuf, ConfigError> {
    Ok(data_dir()?.join("sessions.json"))
}
