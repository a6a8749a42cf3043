use chrono::Local;
use focusloop_core::format::format_clock;
use focusloop_core::Config;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let now = Local::now();
    println!("{}", format_clock(now.time(), config.clock.use_24_hour));
    Ok(())
}
