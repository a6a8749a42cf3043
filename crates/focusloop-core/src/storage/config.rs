//! TOML-based application configuration.
//!
//! Stores user preferences:
//! - Session durations and the break cadence
//! - Notification behavior
//! - Wall-clock display format
//!
//! Configuration is stored at `~/.config/focusloop/config.toml`. Values are
//! never silently corrected: converting to a [`SessionConfig`] validates and
//! rejects garbled settings.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::error::{ConfigError, CoreError};
use crate::timer::SessionConfig;

/// Session timing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_focus_min")]
    pub focus_min: u32,
    #[serde(default = "default_short_break_min")]
    pub short_break_min: u32,
    #[serde(default = "default_long_break_min")]
    pub long_break_min: u32,
    #[serde(default = "default_sessions_before_long_break")]
    pub sessions_before_long_break: u32,
    #[serde(default = "default_true")]
    pub auto_advance: bool,
}

/// Notification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    /// Ring the terminal bell on completions and alarms.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// Wall-clock display configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClockConfig {
    #[serde(default)]
    pub use_24_hour: bool,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/focusloop/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default)]
    pub clock: ClockConfig,
}

// Default functions
fn default_focus_min() -> u32 {
    25
}
fn default_short_break_min() -> u32 {
    5
}
fn default_long_break_min() -> u32 {
    15
}
fn default_sessions_before_long_break() -> u32 {
    4
}
fn default_true() -> bool {
    true
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            focus_min: default_focus_min(),
            short_break_min: default_short_break_min(),
            long_break_min: default_long_break_min(),
            sessions_before_long_break: default_sessions_before_long_break(),
            auto_advance: true,
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self { use_24_hour: false }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timer: TimerConfig::default(),
            notifications: NotificationsConfig::default(),
            clock: ClockConfig::default(),
        }
    }
}

impl Config {
    fn path() -> Result<PathBuf, CoreError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk, writing the defaults out first if no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, CoreError> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content)
                    .map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Load from disk, returning the defaults on any error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), CoreError> {
        let path = Self::path()?;
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn json_pointer(key: &str) -> String {
        format!("/{}", key.replace('.', "/"))
    }

    /// Get a config value as a string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let value = json.pointer(&Self::json_pointer(key))?;
        match value {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key. The new value must parse as
    /// the existing value's type. Does not persist; call [`Config::save`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for unknown keys, non-leaf keys
    /// and values of the wrong type.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), CoreError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut json = serde_json::to_value(&*self)?;
        let slot = json
            .pointer_mut(&Self::json_pointer(key))
            .ok_or_else(|| invalid("unknown config key".to_string()))?;

        let new_value = match &*slot {
            serde_json::Value::Bool(_) => serde_json::Value::Bool(
                value
                    .parse::<bool>()
                    .map_err(|_| invalid(format!("cannot parse '{value}' as bool")))?,
            ),
            serde_json::Value::Number(_) => {
                let n = value
                    .parse::<u64>()
                    .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?;
                serde_json::Value::Number(n.into())
            }
            serde_json::Value::String(_) | serde_json::Value::Null => {
                serde_json::Value::String(value.to_string())
            }
            _ => return Err(invalid("not a settable leaf key".to_string()).into()),
        };
        *slot = new_value;

        *self = serde_json::from_value(json)?;
        Ok(())
    }

    /// Validated conversion to the timer core's [`SessionConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when durations are zero or the
    /// long-break cadence is zero.
    pub fn session_config(&self) -> Result<SessionConfig, ConfigError> {
        SessionConfig::from_minutes(
            self.timer.focus_min,
            self.timer.short_break_min,
            self.timer.long_break_min,
            self.timer.sessions_before_long_break,
            self.timer.auto_advance,
        )
    }
}
