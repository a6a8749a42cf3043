use chrono::Utc;
use clap::Subcommand;
use focusloop_core::storage::Database;
use focusloop_core::Config;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key (e.g. "timer.focus_min", "clock.use_24_hour")
        key: String,
    },
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// New value
        value: String,
    },
    /// List all config values
    List,
    /// Reset config to defaults
    Reset,
}

/// Re-base the stored timer on freshly saved timing settings.
fn apply_to_timer(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let Some(json) = db.kv_get(super::timer::ENGINE_KEY)? else {
        return Ok(());
    };
    let Ok(mut timer) = serde_json::from_str::<focusloop_core::SessionTimer>(&json) else {
        return Ok(());
    };
    timer.set_config(config.session_config()?, Utc::now());
    super::timer::save_timer(&db, &timer)?;
    Ok(())
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load_or_default();
            match config.get(&key) {
                Some(value) => println!("{value}"),
                None => {
                    eprintln!("unknown key: {key}");
                    std::process::exit(1);
                }
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load_or_default();
            config.set(&key, &value)?;
            config.save()?;
            if key.starts_with("timer.") {
                apply_to_timer(&config)?;
            }
            println!("ok");
        }
        ConfigAction::List => {
            let config = Config::load_or_default();
            let json = serde_json::to_string_pretty(&config)?;
            println!("{json}");
        }
        ConfigAction::Reset => {
            let config = Config::default();
            config.save()?;
            apply_to_timer(&config)?;
            println!("config reset to defaults");
        }
    }
    Ok(())
}
