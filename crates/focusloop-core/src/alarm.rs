//! Daily alarm.
//!
//! Like the session countdown, the alarm is deadline-based: arming computes
//! the next absolute ring instant, and `check(now)` compares against it.
//! Delayed checks fire once and re-arm for the following day.

use chrono::{DateTime, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alarm {
    time: NaiveTime,
    /// Next absolute ring instant. None until armed.
    next_ring: Option<DateTime<Utc>>,
}

impl Alarm {
    pub fn new(time: NaiveTime) -> Self {
        Self {
            time,
            next_ring: None,
        }
    }

    /// Parse an `HH:MM` (24-hour) alarm time.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for anything that is not a
    /// valid `HH:MM` time.
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let time = NaiveTime::parse_from_str(s.trim(), "%H:%M").map_err(|e| {
            ConfigError::InvalidValue {
                key: "alarm".to_string(),
                message: format!("expected HH:MM, got '{s}': {e}"),
            }
        })?;
        Ok(Self::new(time))
    }

    pub fn time(&self) -> NaiveTime {
        self.time
    }

    pub fn next_ring(&self) -> Option<DateTime<Utc>> {
        self.next_ring
    }

    /// Schedule the next ring: today if the alarm time is still ahead,
    /// otherwise tomorrow.
    pub fn arm(&mut self, now: DateTime<Utc>) {
        let today = now.date_naive().and_time(self.time).and_utc();
        self.next_ring = Some(if today > now {
            today
        } else {
            (now.date_naive() + chrono::Days::new(1))
                .and_time(self.time)
                .and_utc()
        });
    }

    /// Fire if the ring deadline has passed, re-arming for the next day.
    /// At most one event per deadline, no matter how late the check is.
    pub fn check(&mut self, now: DateTime<Utc>) -> Option<Event> {
        let ring = self.next_ring?;
        if now < ring {
            return None;
        }
        self.arm(now);
        Some(Event::AlarmRang { at: now })
    }

    /// `HH:MM` rendering of the configured time.
    pub fn display_time(&self) -> String {
        format!("{:02}:{:02}", self.time.hour(), self.time.minute())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn morning() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 5, 6, 30, 0).unwrap()
    }

    #[test]
    fn parse_accepts_hh_mm() {
        let alarm = Alarm::parse("07:15").unwrap();
        assert_eq!(alarm.display_time(), "07:15");
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(Alarm::parse("7 oclock").is_err());
        assert!(Alarm::parse("25:00").is_err());
        assert!(Alarm::parse("").is_err());
    }

    #[test]
    fn arms_for_today_when_still_ahead() {
        let mut alarm = Alarm::parse("07:00").unwrap();
        alarm.arm(morning());
        assert_eq!(
            alarm.next_ring().unwrap(),
            Utc.with_ymd_and_hms(2026, 1, 5, 7, 0, 0).unwrap()
        );
    }

    #[test]
    fn arms_for_tomorrow_when_already_past() {
        let mut alarm = Alarm::parse("06:00").unwrap();
        alarm.arm(morning());
        assert_eq!(
            alarm.next_ring().unwrap(),
            Utc.with_ymd_and_hms(2026, 1, 6, 6, 0, 0).unwrap()
        );
    }

    #[test]
    fn fires_once_then_rearms_next_day() {
        let mut alarm = Alarm::parse("07:00").unwrap();
        alarm.arm(morning());
        assert!(alarm.check(morning()).is_none());

        let ring = Utc.with_ymd_and_hms(2026, 1, 5, 7, 0, 0).unwrap();
        assert!(alarm.check(ring).is_some());
        // Immediately after firing, the deadline is tomorrow.
        assert!(alarm.check(ring + Duration::seconds(1)).is_none());
        assert_eq!(
            alarm.next_ring().unwrap(),
            Utc.with_ymd_and_hms(2026, 1, 6, 7, 0, 0).unwrap()
        );
    }

    #[test]
    fn late_check_fires_only_once() {
        let mut alarm = Alarm::parse("07:00").unwrap();
        alarm.arm(morning());
        // The process was asleep for two days past the deadline.
        let late = Utc.with_ymd_and_hms(2026, 1, 7, 9, 0, 0).unwrap();
        assert!(alarm.check(late).is_some());
        assert!(alarm.check(late + Duration::seconds(30)).is_none());
        assert_eq!(
            alarm.next_ring().unwrap(),
            Utc.with_ymd_and_hms(2026, 1, 8, 7, 0, 0).unwrap()
        );
    }

    #[test]
    fn unarmed_alarm_never_fires() {
        let mut alarm = Alarm::parse("07:00").unwrap();
        assert!(alarm.check(morning()).is_none());
    }
}
