//! Injectable clock source.
//!
//! The timer engine never reads the global clock; every operation takes an
//! explicit `now`. Driving layers obtain `now` from a [`Clock`] so tests can
//! substitute synthetic time.

use chrono::{DateTime, Utc};

/// Source of the current instant.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock backed [`Clock`] for production use.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
