//! Timestamp parsing and 12-hour clock formatting shared by both feeds.
//!
//! CTA feeds report naive local times in America/Chicago, so everything here
//! works on [`NaiveDateTime`] and never does timezone math on feed values.

use chrono::{NaiveDateTime, Utc};
use chrono_tz::America::Chicago;

/// Marker written into any record field whose value is unavailable.
pub const NOT_AVAILABLE: &str = "N/A";

/// Bus Tracker timestamps carry no seconds, e.g. `20250130 21:29`.
pub const BUS_TIMESTAMP_FORMAT: &str = "%Y%m%d %H:%M";

/// Train Tracker timestamps, e.g. `20250130 23:59:00`.
pub const TRAIN_TIMESTAMP_FORMAT: &str = "%Y%m%d %H:%M:%S";

/// Parses a Bus Tracker timestamp, returning `None` when it is malformed.
pub fn parse_bus_timestamp(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw.trim(), BUS_TIMESTAMP_FORMAT).ok()
}

/// Parses a Train Tracker timestamp, returning `None` when it is malformed.
pub fn parse_train_timestamp(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw.trim(), TRAIN_TIMESTAMP_FORMAT).ok()
}

/// Formats a time as `h:MM AM/PM` without a leading zero on the hour.
pub fn format_clock(dt: NaiveDateTime) -> String {
    dt.format("%-I:%M %p").to_string()
}

/// Current wall-clock time in Chicago, the zone both feeds report in.
pub fn chicago_now() -> NaiveDateTime {
    Utc::now().with_timezone(&Chicago).naive_local()
}
