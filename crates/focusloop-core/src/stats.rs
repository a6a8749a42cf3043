//! Focused-time accounting.
//!
//! The ledger is credited from observed countdown progress, not from tick
//! counts, so delayed or missed ticks never undercount focused time.

use serde::{Deserialize, Serialize};

use crate::timer::SessionKind;

/// Running totals accumulated by the timer engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusLedger {
    /// Real focused milliseconds, credited proportionally to elapsed time.
    focused_ms: u64,
    completed_focus: u32,
    completed_breaks: u32,
    skipped: u32,
}

impl FocusLedger {
    /// Credit focused time observed between two flushes.
    pub fn credit_focus(&mut self, ms: u64) {
        self.focused_ms = self.focused_ms.saturating_add(ms);
    }

    pub fn record_completion(&mut self, kind: SessionKind) {
        if kind.is_focus() {
            self.completed_focus += 1;
        } else {
            self.completed_breaks += 1;
        }
    }

    pub fn record_skip(&mut self) {
        self.skipped += 1;
    }

    pub fn focused_ms(&self) -> u64 {
        self.focused_ms
    }

    pub fn focused_secs(&self) -> u64 {
        self.focused_ms / 1000
    }

    pub fn completed_focus(&self) -> u32 {
        self.completed_focus
    }

    pub fn completed_breaks(&self) -> u32 {
        self.completed_breaks
    }

    pub fn skipped(&self) -> u32 {
        self.skipped
    }
}
