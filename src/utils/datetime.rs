use chrono::{DateTime, Utc};

/// Timestamp embedded in the poll question, e.g. `2025-06-01 09:30 UTC`
pub fn format_poll_timestamp(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M UTC").to_string()
}

/// Human readable minutes, e.g. `1 minute`, `15 minutes`
pub fn format_minutes(minutes: u64) -> String {
    if minutes == 1 {
        "1 minute".to_string()
    } else {
        format!("{minutes} minutes")
    }
}
