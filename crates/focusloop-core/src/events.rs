use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::SessionKind;

/// Every state change in the timer produces an Event.
/// The CLI prints them; notification sinks subscribe to them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    SessionStarted {
        kind: SessionKind,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    SessionPaused {
        kind: SessionKind,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// A session ran (or was skipped) down to zero. `focused_secs` is the
    /// real focused time credited to the session, zero for breaks.
    SessionCompleted {
        kind: SessionKind,
        cycle_index: u32,
        focused_secs: u64,
        started_at: Option<DateTime<Utc>>,
        at: DateTime<Utc>,
    },
    /// The cycle advanced to `kind` after a completion.
    SessionSwitched {
        kind: SessionKind,
        cycle_index: u32,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    SessionReset {
        kind: SessionKind,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// The daily alarm deadline passed.
    AlarmRang {
        at: DateTime<Utc>,
    },
    StateSnapshot {
        kind: SessionKind,
        cycle_index: u32,
        running: bool,
        remaining_secs: u64,
        total_secs: u64,
        progress_pct: f64,
        at: DateTime<Utc>,
    },
}
