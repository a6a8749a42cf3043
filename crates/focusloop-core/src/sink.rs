//! Collaborator interfaces and the host that fans timer activity out to them.
//!
//! The engine itself performs no environment access. Rendering, notification
//! and persistence are behind sink traits; [`TimerHost`] wires an engine, a
//! [`Clock`] and one sink of each kind together, so the driving layer only
//! issues commands.

use chrono::{DateTime, Utc};

use crate::clock::Clock;
use crate::error::CoreError;
use crate::events::Event;
use crate::timer::{SessionKind, SessionTimer};

/// Receives `(kind, remaining)` on every tick and on every state transition.
pub trait DisplaySink {
    fn render(&mut self, kind: SessionKind, remaining_secs: u64);
}

/// Receives every emitted [`Event`]. Implementations decide whether to play
/// a sound, show a notification or just print.
pub trait NotificationSink {
    fn notify(&mut self, event: &Event);
}

/// Receives the engine snapshot after every mutating operation and supplies
/// one at startup. The format is opaque to the core.
pub trait PersistenceSink {
    fn persist(&mut self, timer: &SessionTimer) -> Result<(), CoreError>;
}

/// Owns a [`SessionTimer`] and drives it against a clock, dispatching to the
/// attached sinks after every command.
pub struct TimerHost<C: Clock> {
    timer: SessionTimer,
    clock: C,
    display: Box<dyn DisplaySink>,
    notifier: Box<dyn NotificationSink>,
    store: Box<dyn PersistenceSink>,
}

impl<C: Clock> TimerHost<C> {
    pub fn new(
        timer: SessionTimer,
        clock: C,
        display: Box<dyn DisplaySink>,
        notifier: Box<dyn NotificationSink>,
        store: Box<dyn PersistenceSink>,
    ) -> Self {
        Self {
            timer,
            clock,
            display,
            notifier,
            store,
        }
    }

    pub fn timer(&self) -> &SessionTimer {
        &self.timer
    }

    pub fn start(&mut self) -> Result<(), CoreError> {
        let now = self.clock.now();
        let events: Vec<Event> = self.timer.start(now).into_iter().collect();
        self.dispatch(&events, now)
    }

    pub fn pause(&mut self) -> Result<(), CoreError> {
        let now = self.clock.now();
        let events: Vec<Event> = self.timer.pause(now).into_iter().collect();
        self.dispatch(&events, now)
    }

    pub fn tick(&mut self) -> Result<(), CoreError> {
        let now = self.clock.now();
        let events = self.timer.tick(now);
        self.dispatch(&events, now)
    }

    pub fn reset(&mut self) -> Result<(), CoreError> {
        let now = self.clock.now();
        let events = vec![self.timer.reset(now)];
        self.dispatch(&events, now)
    }

    pub fn skip(&mut self) -> Result<(), CoreError> {
        let now = self.clock.now();
        let events = self.timer.skip(now);
        self.dispatch(&events, now)
    }

    fn dispatch(&mut self, events: &[Event], now: DateTime<Utc>) -> Result<(), CoreError> {
        self.display
            .render(self.timer.kind(), self.timer.remaining_secs(now));
        for event in events {
            self.notifier.notify(event);
        }
        self.store.persist(&self.timer)
    }
}
