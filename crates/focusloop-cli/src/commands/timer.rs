use std::io::Write;
use std::rc::Rc;

use chrono::Utc;
use clap::Subcommand;
use focusloop_core::format::{format_mmss, render_progress_bar};
use focusloop_core::storage::Database;
use focusloop_core::{
    Config, CoreError, DisplaySink, Event, NotificationSink, PersistenceSink, SessionConfig,
    SessionKind, SessionTimer, SystemClock, TimerHost,
};

use super::alarm::load_alarm;

pub(crate) const ENGINE_KEY: &str = "session_timer";

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start or resume the current session
    Start,
    /// Pause the current session
    Pause,
    /// Apply one tick and print any resulting events
    Tick,
    /// Skip to the next session in the cycle
    Skip,
    /// Reset the current session to its full duration
    Reset,
    /// Print current timer state as JSON
    Status,
    /// Drive the timer in the foreground, ticking once per second
    Run,
}

fn load_timer(db: &Database) -> Result<SessionTimer, Box<dyn std::error::Error>> {
    if let Ok(Some(json)) = db.kv_get(ENGINE_KEY) {
        if let Ok(timer) = serde_json::from_str::<SessionTimer>(&json) {
            return Ok(timer);
        }
    }
    let config = Config::load_or_default().session_config()?;
    Ok(SessionTimer::new(config))
}

pub(crate) fn save_timer(db: &Database, timer: &SessionTimer) -> Result<(), CoreError> {
    let json = serde_json::to_string(timer)?;
    db.kv_set(ENGINE_KEY, &json)?;
    Ok(())
}

/// Print events and record any completion into the history table.
fn report(
    db: &Database,
    timer: &SessionTimer,
    events: &[Event],
    skipped: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    for event in events {
        if let Event::SessionCompleted {
            kind,
            focused_secs,
            started_at,
            at,
            ..
        } = event
        {
            db.record_session(
                *kind,
                timer.config().duration_secs(*kind),
                *focused_secs,
                skipped,
                *started_at,
                *at,
            )?;
        }
        println!("{}", serde_json::to_string_pretty(event)?);
    }
    Ok(())
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let mut timer = load_timer(&db)?;
    let now = Utc::now();

    match action {
        TimerAction::Start => match timer.start(now) {
            Some(event) => report(&db, &timer, &[event], false)?,
            None => eprintln!("already running"),
        },
        TimerAction::Pause => match timer.pause(now) {
            Some(event) => report(&db, &timer, &[event], false)?,
            None => eprintln!("already paused"),
        },
        TimerAction::Tick => {
            let events = timer.tick(now);
            if events.is_empty() {
                println!("{}", serde_json::to_string_pretty(&timer.snapshot(now))?);
            } else {
                report(&db, &timer, &events, false)?;
            }
        }
        TimerAction::Skip => {
            let events = timer.skip(now);
            report(&db, &timer, &events, true)?;
        }
        TimerAction::Reset => {
            let event = timer.reset(now);
            report(&db, &timer, &[event], false)?;
        }
        TimerAction::Status => {
            println!("{}", serde_json::to_string_pretty(&timer.snapshot(now))?);
        }
        TimerAction::Run => return run_loop(db, timer),
    }

    save_timer(&db, &timer)?;
    Ok(())
}

// ── Foreground loop ──────────────────────────────────────────────────

struct TerminalDisplay {
    config: SessionConfig,
}

impl DisplaySink for TerminalDisplay {
    fn render(&mut self, kind: SessionKind, remaining_secs: u64) {
        let total = self.config.duration_secs(kind).max(1);
        let progress = 1.0 - remaining_secs as f64 / total as f64;
        print!(
            "\r{:<11} {} {}  ",
            kind.label(),
            format_mmss(remaining_secs),
            render_progress_bar(progress, 24)
        );
        let _ = std::io::stdout().flush();
    }
}

struct SessionRecorder {
    db: Rc<Database>,
    config: SessionConfig,
    bell: bool,
}

impl NotificationSink for SessionRecorder {
    fn notify(&mut self, event: &Event) {
        if let Event::SessionCompleted {
            kind,
            focused_secs,
            started_at,
            at,
            ..
        } = event
        {
            if let Err(e) = self.db.record_session(
                *kind,
                self.config.duration_secs(*kind),
                *focused_secs,
                false,
                *started_at,
                *at,
            ) {
                eprintln!("failed to record session: {e}");
            }
            if self.bell {
                print!("\x07");
            }
        }
        match serde_json::to_string(event) {
            Ok(json) => println!("\n{json}"),
            Err(e) => eprintln!("failed to serialize event: {e}"),
        }
    }
}

struct KvStore {
    db: Rc<Database>,
}

impl PersistenceSink for KvStore {
    fn persist(&mut self, timer: &SessionTimer) -> Result<(), CoreError> {
        save_timer(&self.db, timer)
    }
}

fn run_loop(db: Database, timer: SessionTimer) -> Result<(), Box<dyn std::error::Error>> {
    let app_config = Config::load_or_default();
    let session_config = timer.config().clone();
    let db = Rc::new(db);
    let mut alarm = load_alarm(&db);

    let mut host = TimerHost::new(
        timer,
        SystemClock,
        Box::new(TerminalDisplay {
            config: session_config.clone(),
        }),
        Box::new(SessionRecorder {
            db: db.clone(),
            config: session_config,
            bell: app_config.notifications.enabled,
        }),
        Box::new(KvStore { db: db.clone() }),
    );
    host.start()?;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(1));
        loop {
            interval.tick().await;
            if let Err(e) = host.tick() {
                eprintln!("error: {e}");
            }
            if let Some(alarm) = alarm.as_mut() {
                if let Some(event) = alarm.check(Utc::now()) {
                    if app_config.notifications.enabled {
                        print!("\x07");
                    }
                    match serde_json::to_string(&event) {
                        Ok(json) => println!("\n{json}"),
                        Err(e) => eprintln!("failed to serialize event: {e}"),
                    }
                    if let Err(e) = super::alarm::save_alarm(&db, alarm) {
                        eprintln!("failed to save alarm: {e}");
                    }
                }
            }
        }
    })
}
