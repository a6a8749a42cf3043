//! # Focusloop Core Library
//!
//! Core business logic for Focusloop, a focus-session timer. All operations
//! are available through the standalone CLI binary, which is a thin layer
//! over this library.
//!
//! ## Architecture
//!
//! - **Session Timer**: a deadline-based state machine; the caller invokes
//!   `tick(now)` periodically and the countdown is recomputed from an
//!   absolute deadline, so delayed or missed ticks cause no drift
//! - **Sinks**: display, notification and persistence collaborators behind
//!   traits, fanned out to by [`TimerHost`]
//! - **Storage**: SQLite session history and TOML-based configuration
//! - **Alarm**: a daily wall-clock alarm, also deadline-based
//!
//! ## Key Components
//!
//! - [`SessionTimer`]: core timer state machine
//! - [`SessionConfig`]: validated cycle configuration
//! - [`Database`]: session history and statistics persistence
//! - [`Config`]: application configuration management

pub mod alarm;
pub mod clock;
pub mod error;
pub mod events;
pub mod format;
pub mod sink;
pub mod stats;
pub mod storage;
pub mod timer;

pub use alarm::Alarm;
pub use clock::{Clock, SystemClock};
pub use error::{ConfigError, CoreError, DatabaseError};
pub use events::Event;
pub use sink::{DisplaySink, NotificationSink, PersistenceSink, TimerHost};
pub use stats::FocusLedger;
pub use storage::{Config, Database, Stats};
pub use timer::{SessionConfig, SessionKind, SessionTimer};
