mod perf;
mod time_utils;

pub use time_utils::{
    AppInstant, MS_IN_D, MS_IN_H, MS_IN_MIN, MS_IN_S, epoch_ms_to_date_time, epoch_ms_to_utc,
    format_duration, now_timestamp_ms,
};
