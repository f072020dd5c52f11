//! Human-readable relative timestamps shown next to incident and alert times.

use chrono::{DateTime, Utc};

const MINUTE: i64 = 60;
const HOUR: i64 = 3_600;
const DAY: i64 = 86_400;

/// Format `value` relative to the current time.
pub fn format_relative_time(value: DateTime<Utc>) -> String {
    format_relative_to(value, Utc::now())
}

/// Format `value` relative to `now`.
///
/// Future timestamps are reported as "just now".
pub fn format_relative_to(value: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - value).num_seconds();
    if seconds < MINUTE {
        return "just now".to_string();
    }
    if seconds < HOUR {
        let minutes = seconds / MINUTE;
        return format!("{minutes} minute{} ago", plural(minutes));
    }
    if seconds < DAY {
        let hours = seconds / HOUR;
        return format!("{hours} hour{} ago", plural(hours));
    }
    if seconds < 2 * DAY {
        let clock = value.format("%I:%M %p").to_string();
        return format!("yesterday at {}", clock.trim_start_matches('0'));
    }
    if seconds < 7 * DAY {
        return format!("{} days ago", seconds / DAY);
    }
    value.format("%b %d, %Y").to_string()
}

fn plural(count: i64) -> &'static str {
    if count == 1 { "" } else { "s" }
}
