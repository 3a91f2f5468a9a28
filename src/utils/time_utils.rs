use chrono::{DateTime, Utc};

/// Monotonic clock that also works in the browser.
pub type AppInstant = web_time::Instant;

pub const MS_IN_S: i64 = 1000;
pub const MS_IN_MIN: i64 = MS_IN_S * 60;
pub const MS_IN_H: i64 = MS_IN_MIN * 60;
pub const MS_IN_D: i64 = MS_IN_H * 24;

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

// Time Helper functions

fn format_epoch_ms(epoch_ms: i64, fmt: &str) -> String {
    match DateTime::<Utc>::from_timestamp_millis(epoch_ms) {
        Some(dt) => dt.format(fmt).to_string(),
        None => format!("{epoch_ms}ms"),
    }
}

/// Calendar date of an epoch timestamp, for axis labels.
pub fn epoch_ms_to_utc(epoch_ms: i64) -> String {
    format_epoch_ms(epoch_ms, DATE_FORMAT)
}

/// Date and minute of an epoch timestamp, for hover and table text.
pub fn epoch_ms_to_date_time(epoch_ms: i64) -> String {
    format_epoch_ms(epoch_ms, DATE_TIME_FORMAT)
}

pub fn now_timestamp_ms() -> i64 {
    Utc::now().timestamp_millis()
}

pub fn format_duration(ms: i64) -> String {
    let secs = ms / MS_IN_S;
    if secs < 60 {
        return format!("{}s", secs);
    }
    let mins = ms / MS_IN_MIN;
    if mins < 60 {
        return format!("{}m", mins);
    }
    let hours = ms / MS_IN_H;
    if hours < 24 {
        return format!("{}h", hours);
    }
    format!("{}d", ms / MS_IN_D)
}
