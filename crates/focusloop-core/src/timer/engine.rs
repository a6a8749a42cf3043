//! Session timer engine.
//!
//! The engine is a wall-clock-based state machine. It has no internal
//! threads and never reads the global clock -- the caller passes `now` into
//! every operation and invokes `tick(now)` periodically (about once per
//! second; exact periodicity does not matter).
//!
//! While running, the countdown is always recomputed from an absolute
//! deadline, `max(0, deadline - now)`. A delayed or missed tick therefore
//! shifts nothing: elapsed real time, not callback count, determines the
//! remaining time.
//!
//! ## State transitions
//!
//! ```text
//! {Focus, ShortBreak, LongBreak} x {running, paused}
//! start/pause toggle the running bit; completion and skip advance the kind
//! per the cycle rule and land in paused (or running, with auto-advance).
//! ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::session::{SessionConfig, SessionKind};
use crate::events::Event;
use crate::stats::FocusLedger;

/// Core session timer.
///
/// The serialized form of this struct is the persistence snapshot: callers
/// save it after every mutating operation and restore it at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionTimer {
    config: SessionConfig,
    kind: SessionKind,
    /// Count of completed focus sessions; drives short vs long break selection.
    cycle_index: u32,
    running: bool,
    /// Absolute instant the countdown reaches zero. Set only while running;
    /// the source of truth for the remaining time until then.
    deadline: Option<DateTime<Utc>>,
    /// Remaining milliseconds. Authoritative while paused. While running it
    /// holds the value observed at the last flush, so the next flush can
    /// credit the focused-time delta.
    remaining_ms: u64,
    /// Instant the current session was first started, for history records.
    #[serde(default)]
    started_at: Option<DateTime<Utc>>,
    /// Focused milliseconds credited to the current session so far.
    #[serde(default)]
    session_credit_ms: u64,
    #[serde(default)]
    ledger: FocusLedger,
}

impl SessionTimer {
    /// Create a timer in the initial state: `Focus`, paused, cycle index 0,
    /// the full focus duration remaining.
    pub fn new(config: SessionConfig) -> Self {
        let remaining_ms = config.duration_ms(SessionKind::Focus);
        Self {
            config,
            kind: SessionKind::Focus,
            cycle_index: 0,
            running: false,
            deadline: None,
            remaining_ms,
            started_at: None,
            session_credit_ms: 0,
            ledger: FocusLedger::default(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn kind(&self) -> SessionKind {
        self.kind
    }

    pub fn cycle_index(&self) -> u32 {
        self.cycle_index
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn ledger(&self) -> &FocusLedger {
        &self.ledger
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn total_secs(&self) -> u64 {
        self.config.duration_secs(self.kind)
    }

    /// Remaining milliseconds at `now`. Derived from the deadline while
    /// running, from the stored value while paused.
    pub fn remaining_ms(&self, now: DateTime<Utc>) -> u64 {
        match self.deadline {
            Some(deadline) if self.running => millis_until(deadline, now),
            _ => self.remaining_ms,
        }
    }

    pub fn remaining_secs(&self, now: DateTime<Utc>) -> u64 {
        self.remaining_ms(now).div_ceil(1000)
    }

    /// 0.0 .. 1.0 progress within the current session.
    pub fn progress(&self, now: DateTime<Utc>) -> f64 {
        let total = self.config.duration_ms(self.kind);
        if total == 0 {
            return 0.0;
        }
        1.0 - (self.remaining_ms(now) as f64 / total as f64)
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self, now: DateTime<Utc>) -> Event {
        Event::StateSnapshot {
            kind: self.kind,
            cycle_index: self.cycle_index,
            running: self.running,
            remaining_secs: self.remaining_secs(now),
            total_secs: self.total_secs(),
            progress_pct: (self.progress(now) * 100.0).min(100.0),
            at: now,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin (or resume) the countdown. No-op while already running.
    pub fn start(&mut self, now: DateTime<Utc>) -> Option<Event> {
        if self.running {
            return None;
        }
        self.deadline = Some(now + Duration::milliseconds(self.remaining_ms as i64));
        self.running = true;
        if self.started_at.is_none() {
            self.started_at = Some(now);
        }
        Some(Event::SessionStarted {
            kind: self.kind,
            remaining_secs: self.remaining_ms.div_ceil(1000),
            at: now,
        })
    }

    /// Freeze the countdown, making the stored remainder authoritative.
    /// No-op while already paused.
    pub fn pause(&mut self, now: DateTime<Utc>) -> Option<Event> {
        if !self.running {
            return None;
        }
        self.flush(now);
        self.running = false;
        self.deadline = None;
        Some(Event::SessionPaused {
            kind: self.kind,
            remaining_secs: self.remaining_ms.div_ceil(1000),
            at: now,
        })
    }

    /// Periodic progress check. Returns the completion/switch events when the
    /// deadline has passed, at most one completion per call.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Vec<Event> {
        if !self.running {
            return Vec::new();
        }
        self.flush(now);
        if self.remaining_ms == 0 {
            self.complete(now)
        } else {
            Vec::new()
        }
    }

    /// Restore the current session to its full configured duration. The
    /// session kind and cycle index are unchanged.
    pub fn reset(&mut self, now: DateTime<Utc>) -> Event {
        self.running = false;
        self.deadline = None;
        self.remaining_ms = self.config.duration_ms(self.kind);
        self.started_at = None;
        self.session_credit_ms = 0;
        Event::SessionReset {
            kind: self.kind,
            remaining_secs: self.remaining_ms.div_ceil(1000),
            at: now,
        }
    }

    /// Force the remainder to zero and advance exactly as natural completion
    /// would. The discarded remainder is not credited to the ledger.
    pub fn skip(&mut self, now: DateTime<Utc>) -> Vec<Event> {
        self.remaining_ms = 0;
        self.deadline = None;
        self.ledger.record_skip();
        self.complete(now)
    }

    /// Replace the configuration wholesale. Stops the countdown and re-bases
    /// the current session on the new duration; kind and cycle index persist.
    pub fn set_config(&mut self, config: SessionConfig, now: DateTime<Utc>) -> Event {
        self.config = config;
        self.reset(now)
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Recompute the remainder from the deadline and credit the observed
    /// focused-time delta since the previous flush.
    fn flush(&mut self, now: DateTime<Utc>) {
        let Some(deadline) = self.deadline else {
            return;
        };
        let current = millis_until(deadline, now);
        let elapsed = self.remaining_ms.saturating_sub(current);
        if self.kind.is_focus() {
            self.ledger.credit_focus(elapsed);
            self.session_credit_ms = self.session_credit_ms.saturating_add(elapsed);
        }
        self.remaining_ms = current;
    }

    /// Finish the current session and switch to the next kind per the cycle
    /// rule. Only called once the remainder is zero.
    fn complete(&mut self, now: DateTime<Utc>) -> Vec<Event> {
        self.running = false;
        self.deadline = None;

        let completed = self.kind;
        self.ledger.record_completion(completed);
        if completed.is_focus() {
            self.cycle_index = self.cycle_index.saturating_add(1);
        }

        let focused_secs = self.session_credit_ms / 1000;
        let started_at = self.started_at;

        let next = self.config.next_kind(completed, self.cycle_index);
        self.kind = next;
        self.remaining_ms = self.config.duration_ms(next);
        self.started_at = None;
        self.session_credit_ms = 0;

        let mut events = vec![
            Event::SessionCompleted {
                kind: completed,
                cycle_index: self.cycle_index,
                focused_secs,
                started_at,
                at: now,
            },
            Event::SessionSwitched {
                kind: next,
                cycle_index: self.cycle_index,
                remaining_secs: self.remaining_ms.div_ceil(1000),
                at: now,
            },
        ];
        if self.config.auto_advance() {
            events.extend(self.start(now));
        }
        events
    }
}

fn millis_until(deadline: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    (deadline - now).num_milliseconds().max(0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 5, 9, 0, 0).unwrap()
    }

    fn at(secs: i64) -> DateTime<Utc> {
        t0() + Duration::seconds(secs)
    }

    /// 25m focus, 5m short break, 15m long break, long break every 4.
    fn manual_config() -> SessionConfig {
        SessionConfig::new(1500, 300, 900, 4, false).unwrap()
    }

    fn completed_count(events: &[Event]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, Event::SessionCompleted { .. }))
            .count()
    }

    /// Run the current session to completion and return the emitted events.
    fn finish_session(timer: &mut SessionTimer, start: DateTime<Utc>) -> Vec<Event> {
        timer.start(start);
        let past_deadline = start + Duration::seconds(timer.total_secs() as i64 + 1);
        timer.tick(past_deadline)
    }

    #[test]
    fn initial_state_is_paused_focus() {
        let timer = SessionTimer::new(manual_config());
        assert_eq!(timer.kind(), SessionKind::Focus);
        assert_eq!(timer.cycle_index(), 0);
        assert!(!timer.is_running());
        assert_eq!(timer.remaining_secs(t0()), 1500);
    }

    #[test]
    fn countdown_tracks_elapsed_time() {
        let mut timer = SessionTimer::new(manual_config());
        timer.start(t0());
        let events = timer.tick(at(100));
        assert!(events.is_empty());
        assert_eq!(timer.remaining_secs(at(100)), 1400);
        assert!(timer.is_running());
    }

    #[test]
    fn start_is_idempotent() {
        let mut timer = SessionTimer::new(manual_config());
        assert!(timer.start(t0()).is_some());
        assert!(timer.start(at(5)).is_none());
        assert_eq!(timer.remaining_secs(at(10)), 1490);
    }

    #[test]
    fn pause_twice_equals_pause_once() {
        let mut timer = SessionTimer::new(manual_config());
        timer.start(t0());
        assert!(timer.pause(at(60)).is_some());
        let after_first = timer.clone();
        assert!(timer.pause(at(120)).is_none());
        assert_eq!(timer, after_first);
        assert_eq!(timer.remaining_secs(at(120)), 1440);
    }

    #[test]
    fn pause_freezes_remainder() {
        let mut timer = SessionTimer::new(manual_config());
        timer.start(t0());
        timer.pause(at(300));
        // An hour passes while paused; the remainder must not move.
        assert_eq!(timer.remaining_secs(at(3900)), 1200);
        timer.start(at(3900));
        assert_eq!(timer.remaining_secs(at(3910)), 1190);
    }

    #[test]
    fn overdue_tick_completes_exactly_once() {
        let config = SessionConfig::new(10, 300, 900, 4, false).unwrap();
        let mut timer = SessionTimer::new(config);
        timer.start(t0());
        // Simulates 5 seconds of missed ticks past the 10s deadline.
        let events = timer.tick(at(15));
        assert_eq!(completed_count(&events), 1);
        assert!(!timer.is_running());
        assert_eq!(timer.kind(), SessionKind::ShortBreak);
        // Only the configured duration is credited, not the overshoot.
        assert_eq!(timer.ledger().focused_secs(), 10);
    }

    #[test]
    fn cycle_produces_short_short_short_long() {
        let mut timer = SessionTimer::new(manual_config());
        let mut breaks = Vec::new();
        let mut clock = t0();
        for round in 1..=4u32 {
            let events = finish_session(&mut timer, clock);
            assert_eq!(completed_count(&events), 1);
            assert_eq!(timer.cycle_index(), round);
            breaks.push(timer.kind());
            clock = clock + Duration::seconds(3600);
            // Run the break down too so the next focus session can start.
            let events = finish_session(&mut timer, clock);
            assert_eq!(completed_count(&events), 1);
            assert_eq!(timer.kind(), SessionKind::Focus);
            clock = clock + Duration::seconds(3600);
        }
        assert_eq!(
            breaks,
            vec![
                SessionKind::ShortBreak,
                SessionKind::ShortBreak,
                SessionKind::ShortBreak,
                SessionKind::LongBreak,
            ]
        );
    }

    #[test]
    fn reset_keeps_kind() {
        let mut timer = SessionTimer::new(manual_config());
        // Advance into the short break, burn some of it, then reset.
        finish_session(&mut timer, t0());
        assert_eq!(timer.kind(), SessionKind::ShortBreak);
        timer.start(at(2000));
        timer.tick(at(2100));
        timer.reset(at(2100));
        assert_eq!(timer.kind(), SessionKind::ShortBreak);
        assert!(!timer.is_running());
        assert_eq!(timer.remaining_secs(at(2100)), 300);
    }

    #[test]
    fn skip_advances_like_completion() {
        let mut timer = SessionTimer::new(manual_config());
        // Three completed focus sessions put the cycle index at 3.
        let mut clock = t0();
        for _ in 0..3 {
            finish_session(&mut timer, clock);
            clock = clock + Duration::seconds(3600);
            finish_session(&mut timer, clock);
            clock = clock + Duration::seconds(3600);
        }
        assert_eq!(timer.cycle_index(), 3);
        assert_eq!(timer.kind(), SessionKind::Focus);

        let events = timer.skip(clock);
        assert_eq!(completed_count(&events), 1);
        assert_eq!(timer.kind(), SessionKind::LongBreak);
        assert_eq!(timer.cycle_index(), 4);
        assert_eq!(timer.ledger().skipped(), 1);
    }

    #[test]
    fn skip_credits_no_remainder() {
        let mut timer = SessionTimer::new(manual_config());
        timer.start(t0());
        timer.tick(at(100));
        let before = timer.ledger().focused_ms();
        timer.skip(at(100));
        assert_eq!(timer.ledger().focused_ms(), before);
    }

    #[test]
    fn focus_credit_is_proportional_to_real_time() {
        let mut timer = SessionTimer::new(manual_config());
        timer.start(t0());
        timer.tick(at(7));
        timer.tick(at(19));
        assert_eq!(timer.ledger().focused_ms(), 19_000);
        // Breaks are never credited.
        timer.skip(at(19));
        timer.start(at(20));
        timer.tick(at(50));
        assert_eq!(timer.ledger().focused_ms(), 19_000);
    }

    #[test]
    fn auto_advance_starts_next_session() {
        let config = SessionConfig::new(60, 30, 90, 4, true).unwrap();
        let mut timer = SessionTimer::new(config);
        timer.start(t0());
        let events = timer.tick(at(61));
        assert!(matches!(events.last(), Some(Event::SessionStarted { .. })));
        assert!(timer.is_running());
        assert_eq!(timer.kind(), SessionKind::ShortBreak);
        assert_eq!(timer.remaining_secs(at(61)), 30);
    }

    #[test]
    fn end_to_end_focus_session() {
        let mut timer = SessionTimer::new(manual_config());
        timer.start(t0());
        let mut completions = 0;
        for i in 1..=1500 {
            completions += completed_count(&timer.tick(at(i)));
        }
        assert_eq!(completions, 1);
        assert_eq!(timer.kind(), SessionKind::ShortBreak);
        assert_eq!(timer.cycle_index(), 1);
        assert_eq!(timer.remaining_secs(at(1500)), 300);
        assert_eq!(timer.ledger().focused_secs(), 1500);
    }

    #[test]
    fn snapshot_round_trips_through_serde() {
        let mut timer = SessionTimer::new(manual_config());
        timer.start(t0());
        timer.tick(at(42));
        timer.pause(at(90));
        let json = serde_json::to_string(&timer).unwrap();
        let restored: SessionTimer = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, timer);
        assert_eq!(restored.remaining_secs(at(5000)), 1410);
    }

    #[test]
    fn set_config_rebases_current_kind() {
        let mut timer = SessionTimer::new(manual_config());
        timer.start(t0());
        timer.tick(at(60));
        let new_config = SessionConfig::new(3000, 600, 1800, 2, false).unwrap();
        timer.set_config(new_config, at(60));
        assert_eq!(timer.kind(), SessionKind::Focus);
        assert!(!timer.is_running());
        assert_eq!(timer.remaining_secs(at(60)), 3000);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn remaining_matches_elapsed(d in 1u64..1500) {
                let mut timer = SessionTimer::new(manual_config());
                timer.start(t0());
                let now = at(d as i64);
                let events = timer.tick(now);
                prop_assert!(events.is_empty());
                prop_assert_eq!(timer.remaining_secs(now), 1500 - d);
            }

            #[test]
            fn overshoot_completes_exactly_once(d in 1500u64..1_000_000) {
                let mut timer = SessionTimer::new(manual_config());
                timer.start(t0());
                let events = timer.tick(at(d as i64));
                prop_assert_eq!(completed_count(&events), 1);
                prop_assert_eq!(timer.ledger().focused_secs(), 1500);
            }

            #[test]
            fn tick_split_never_changes_outcome(d1 in 1u64..1499, d2 in 1500u64..3000) {
                // One observation or two, the countdown lands in the same place.
                let mut split = SessionTimer::new(manual_config());
                split.start(t0());
                split.tick(at(d1 as i64));
                let split_events = split.tick(at(d2 as i64));

                let mut single = SessionTimer::new(manual_config());
                single.start(t0());
                let single_events = single.tick(at(d2 as i64));

                prop_assert_eq!(completed_count(&split_events), completed_count(&single_events));
                prop_assert_eq!(split.kind(), single.kind());
                prop_assert_eq!(split.ledger().focused_ms(), single.ledger().focused_ms());
            }
        }
    }
}
