//! Display formatting helpers for countdowns and the wall clock.

use chrono::{NaiveTime, Timelike};

/// Format a countdown remainder as MM:SS.
pub fn format_mmss(secs: u64) -> String {
    let minutes = secs / 60;
    let seconds = secs % 60;
    format!("{minutes:02}:{seconds:02}")
}

/// Format a wall-clock time, either 24-hour or 12-hour with AM/PM.
/// In 12-hour mode midnight and noon render as 12.
pub fn format_clock(time: NaiveTime, use_24_hour: bool) -> String {
    if use_24_hour {
        format!(
            "{:02}:{:02}:{:02}",
            time.hour(),
            time.minute(),
            time.second()
        )
    } else {
        let hour = match time.hour() % 12 {
            0 => 12,
            h => h,
        };
        let meridiem = if time.hour() >= 12 { "PM" } else { "AM" };
        format!(
            "{:02}:{:02}:{:02} {meridiem}",
            hour,
            time.minute(),
            time.second()
        )
    }
}

/// Render a progress bar of the given width for a 0.0 .. 1.0 progress value.
pub fn render_progress_bar(progress: f64, width: usize) -> String {
    let filled = (progress.clamp(0.0, 1.0) * width as f64) as usize;
    let empty = width.saturating_sub(filled);
    format!("[{}{}]", "█".repeat(filled), "░".repeat(empty))
}
