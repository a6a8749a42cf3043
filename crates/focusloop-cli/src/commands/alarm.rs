use chrono::Utc;
use clap::Subcommand;
use focusloop_core::storage::Database;
use focusloop_core::{Alarm, CoreError};

pub(crate) const ALARM_KEY: &str = "alarm";

#[derive(Subcommand)]
pub enum AlarmAction {
    /// Set the daily alarm (HH:MM, 24-hour)
    Set { time: String },
    /// Remove the alarm
    Clear,
    /// Print the alarm state as JSON
    Status,
}

pub(crate) fn load_alarm(db: &Database) -> Option<Alarm> {
    db.kv_get(ALARM_KEY)
        .ok()
        .flatten()
        .and_then(|json| serde_json::from_str(&json).ok())
}

pub(crate) fn save_alarm(db: &Database, alarm: &Alarm) -> Result<(), CoreError> {
    let json = serde_json::to_string(alarm)?;
    db.kv_set(ALARM_KEY, &json)?;
    Ok(())
}

pub fn run(action: AlarmAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        AlarmAction::Set { time } => {
            let mut alarm = Alarm::parse(&time)?;
            alarm.arm(Utc::now());
            save_alarm(&db, &alarm)?;
            match alarm.next_ring() {
                Some(ring) => println!("alarm set for {} (next ring {ring})", alarm.display_time()),
                None => println!("alarm set for {}", alarm.display_time()),
            }
        }
        AlarmAction::Clear => {
            db.kv_delete(ALARM_KEY)?;
            println!("alarm cleared");
        }
        AlarmAction::Status => match load_alarm(&db) {
            Some(alarm) => println!("{}", serde_json::to_string_pretty(&alarm)?),
            None => println!("no alarm set"),
        },
    }
    Ok(())
}
