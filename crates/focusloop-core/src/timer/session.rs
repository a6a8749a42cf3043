use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionKind {
    Focus,
    ShortBreak,
    LongBreak,
}

impl SessionKind {
    pub fn is_focus(self) -> bool {
        matches!(self, SessionKind::Focus)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SessionKind::Focus => "focus",
            SessionKind::ShortBreak => "short_break",
            SessionKind::LongBreak => "long_break",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SessionKind::Focus => "Focus",
            SessionKind::ShortBreak => "Short Break",
            SessionKind::LongBreak => "Long Break",
        }
    }
}

/// Validated cycle configuration. Immutable once constructed; replaced
/// wholesale when settings are saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    focus_secs: u64,
    short_break_secs: u64,
    long_break_secs: u64,
    sessions_before_long_break: u32,
    auto_advance: bool,
}

impl SessionConfig {
    /// Construct a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if any duration is zero or the
    /// long-break cadence is zero.
    pub fn new(
        focus_secs: u64,
        short_break_secs: u64,
        long_break_secs: u64,
        sessions_before_long_break: u32,
        auto_advance: bool,
    ) -> Result<Self, ConfigError> {
        for (key, value) in [
            ("focus_secs", focus_secs),
            ("short_break_secs", short_break_secs),
            ("long_break_secs", long_break_secs),
        ] {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: "duration must be positive".to_string(),
                });
            }
        }
        if sessions_before_long_break == 0 {
            return Err(ConfigError::InvalidValue {
                key: "sessions_before_long_break".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(Self {
            focus_secs,
            short_break_secs,
            long_break_secs,
            sessions_before_long_break,
            auto_advance,
        })
    }

    /// Construct from minute-granularity settings, as stored in the config file.
    ///
    /// # Errors
    ///
    /// Same validation as [`SessionConfig::new`].
    pub fn from_minutes(
        focus_min: u32,
        short_break_min: u32,
        long_break_min: u32,
        sessions_before_long_break: u32,
        auto_advance: bool,
    ) -> Result<Self, ConfigError> {
        Self::new(
            u64::from(focus_min) * 60,
            u64::from(short_break_min) * 60,
            u64::from(long_break_min) * 60,
            sessions_before_long_break,
            auto_advance,
        )
    }

    pub fn duration_secs(&self, kind: SessionKind) -> u64 {
        match kind {
            SessionKind::Focus => self.focus_secs,
            SessionKind::ShortBreak => self.short_break_secs,
            SessionKind::LongBreak => self.long_break_secs,
        }
    }

    /// Duration in milliseconds, saturating on overflow.
    pub fn duration_ms(&self, kind: SessionKind) -> u64 {
        self.duration_secs(kind).saturating_mul(1000)
    }

    /// Session kind that follows `completed`, given the updated count of
    /// completed focus sessions.
    pub fn next_kind(&self, completed: SessionKind, completed_focus: u32) -> SessionKind {
        match completed {
            SessionKind::Focus => {
                if completed_focus % self.sessions_before_long_break == 0 {
                    SessionKind::LongBreak
                } else {
                    SessionKind::ShortBreak
                }
            }
            SessionKind::ShortBreak | SessionKind::LongBreak => SessionKind::Focus,
        }
    }

    pub fn sessions_before_long_break(&self) -> u32 {
        self.sessions_before_long_break
    }

    pub fn auto_advance(&self) -> bool {
        self.auto_advance
    }
}

impl Default for SessionConfig {
    /// The classic 25/5/15 profile with a long break every 4 focus sessions.
    fn default() -> Self {
        Self {
            focus_secs: 25 * 60,
            short_break_secs: 5 * 60,
            long_break_secs: 15 * 60,
            sessions_before_long_break: 4,
            auto_advance: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_durations() {
        assert!(SessionConfig::new(0, 300, 900, 4, false).is_err());
        assert!(SessionConfig::new(1500, 0, 900, 4, false).is_err());
        assert!(SessionConfig::new(1500, 300, 0, 4, false).is_err());
    }

    #[test]
    fn rejects_zero_cadence() {
        let err = SessionConfig::new(1500, 300, 900, 0, false).unwrap_err();
        assert!(err.to_string().contains("sessions_before_long_break"));
    }

    #[test]
    fn from_minutes_converts_to_seconds() {
        let config = SessionConfig::from_minutes(25, 5, 15, 4, true).unwrap();
        assert_eq!(config.duration_secs(SessionKind::Focus), 1500);
        assert_eq!(config.duration_secs(SessionKind::ShortBreak), 300);
        assert_eq!(config.duration_secs(SessionKind::LongBreak), 900);
    }

    #[test]
    fn break_cadence() {
        let config = SessionConfig::default();
        assert_eq!(
            config.next_kind(SessionKind::Focus, 1),
            SessionKind::ShortBreak
        );
        assert_eq!(
            config.next_kind(SessionKind::Focus, 4),
            SessionKind::LongBreak
        );
        assert_eq!(
            config.next_kind(SessionKind::ShortBreak, 4),
            SessionKind::Focus
        );
        assert_eq!(
            config.next_kind(SessionKind::LongBreak, 8),
            SessionKind::Focus
        );
    }
}
