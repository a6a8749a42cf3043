mod config;
pub mod database;

pub use config::{ClockConfig, Config, NotificationsConfig, TimerConfig};
pub use database::{Database, SessionRecord, Stats};

use std::path::PathBuf;

use crate::error::CoreError;

/// Returns the data directory, `~/.config/focusloop[-dev]/` by default.
///
/// `FOCUSLOOP_DATA_DIR` overrides the location outright (used by tests);
/// `FOCUSLOOP_ENV=dev` switches to the development directory.
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn data_dir() -> Result<PathBuf, CoreError> {
    if let Ok(dir) = std::env::var("FOCUSLOOP_DATA_DIR") {
        let dir = PathBuf::from(dir);
        std::fs::create_dir_all(&dir)?;
        return Ok(dir);
    }

    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("FOCUSLOOP_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("focusloop-dev")
    } else {
        base_dir.join("focusloop")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
