//! Normalization of upstream arrival data into a status / ETA pair.
//!
//! Feeds describe arrivals in up to three ways: an absolute predicted
//! timestamp, a raw countdown (`"7"`, `"DUE"`, ...) and the feed's own "as-of"
//! time. [`derive_arrival`] folds whichever of those are usable into the
//! display strings shown for a prediction.

use std::fmt;

use chrono::{Duration, NaiveDateTime};
use serde::Serialize;

use crate::clock::{NOT_AVAILABLE, format_clock};

/// Bucketed arrival status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Predicted arrival is already behind the reference clock.
    Delayed,
    /// Arriving within 0–1 minute.
    Due,
    /// Arriving in more than one minute.
    Minutes(i64),
}

impl Status {
    /// Buckets a signed minute offset: negative is delayed, 0 and 1 are due.
    pub fn from_minutes(minutes: i64) -> Self {
        match minutes {
            m if m < 0 => Status::Delayed,
            0 | 1 => Status::Due,
            m => Status::Minutes(m),
        }
    }

    /// Minutes to add to the reference clock to get the actual arrival.
    ///
    /// `Due` counts as one minute out; a delayed vehicle has no estimate.
    pub fn offset_minutes(&self) -> Option<i64> {
        match self {
            Status::Delayed => None,
            Status::Due => Some(1),
            Status::Minutes(m) => Some(*m),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Delayed => f.write_str("Delayed"),
            Status::Due => f.write_str("DUE"),
            Status::Minutes(m) => write!(f, "{m} minutes"),
        }
    }
}

/// A raw countdown value as reported by the bus feed's `prdctdn` node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Countdown {
    Due,
    Minutes(i64),
}

impl Countdown {
    /// Accepts a signed integer or `DUE` (any case). Anything else is `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("DUE") {
            return Some(Countdown::Due);
        }
        raw.parse::<i64>().ok().map(Countdown::Minutes)
    }

    /// Stricter form used when no reference clock exists: only plain digits
    /// or `DUE` are trusted.
    fn parse_unsigned(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
            return raw.parse::<i64>().ok().map(Countdown::Minutes);
        }
        raw.eq_ignore_ascii_case("DUE").then_some(Countdown::Due)
    }

    fn status(self) -> Status {
        match self {
            Countdown::Due => Status::Due,
            Countdown::Minutes(m) => Status::from_minutes(m),
        }
    }
}

/// Whole minutes from `reference` to `arrival`, rounding half to even.
pub fn minutes_between(reference: NaiveDateTime, arrival: NaiveDateTime) -> i64 {
    let seconds = (arrival - reference).num_seconds() as f64;
    (seconds / 60.0).round_ties_even() as i64
}

/// Display-ready status and actual arrival time for one prediction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Arrival {
    pub status: String,
    pub actual_arrival: String,
}

impl Arrival {
    pub fn unavailable() -> Self {
        Self {
            status: NOT_AVAILABLE.to_string(),
            actual_arrival: NOT_AVAILABLE.to_string(),
        }
    }

    fn from_status(status: Status, reference: Option<NaiveDateTime>) -> Self {
        let actual_arrival = reference
            .zip(status.offset_minutes())
            .and_then(|(reference, minutes)| {
                reference.checked_add_signed(Duration::try_minutes(minutes)?)
            })
            .map(format_clock)
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());
        Self {
            status: status.to_string(),
            actual_arrival,
        }
    }
}

/// Derives the status and actual arrival of a prediction.
///
/// In priority order:
/// 1. reference clock and absolute arrival both known: bucket their
///    difference;
/// 2. reference clock known only: bucket the raw countdown (`DUE` or a
///    signed integer);
/// 3. no reference clock: bucket the raw countdown if it is `DUE` or a
///    non-negative integer, without an actual arrival time.
///
/// Anything else yields `N/A` for both fields.
pub fn derive_arrival(
    reference: Option<NaiveDateTime>,
    arrival: Option<NaiveDateTime>,
    raw_countdown: Option<&str>,
) -> Arrival {
    match (reference, arrival) {
        (Some(reference), Some(arrival)) => Arrival::from_status(
            Status::from_minutes(minutes_between(reference, arrival)),
            Some(reference),
        ),
        (Some(reference), None) => raw_countdown
            .and_then(Countdown::parse)
            .map(|c| Arrival::from_status(c.status(), Some(reference)))
            .unwrap_or_else(Arrival::unavailable),
        (None, _) => raw_countdown
            .and_then(Countdown::parse_unsigned)
            .map(|c| Arrival::from_status(c.status(), None))
            .unwrap_or_else(Arrival::unavailable),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 30)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn arrival(status: &str, actual: &str) -> Arrival {
        Arrival {
            status: status.to_string(),
            actual_arrival: actual.to_string(),
        }
    }

    #[test]
    fn test_status_buckets() {
        assert_eq!(Status::from_minutes(-3), Status::Delayed);
        assert_eq!(Status::from_minutes(0), Status::Due);
        assert_eq!(Status::from_minutes(1), Status::Due);
        assert_eq!(Status::from_minutes(2), Status::Minutes(2));
    }

    #[test]
    fn test_status_display() {
        assert_eq!(Status::Delayed.to_string(), "Delayed");
        assert_eq!(Status::Due.to_string(), "DUE");
        assert_eq!(Status::Minutes(12).to_string(), "12 minutes");
    }

    #[test]
    fn test_countdown_parse() {
        assert_eq!(Countdown::parse("DUE"), Some(Countdown::Due));
        assert_eq!(Countdown::parse("due"), Some(Countdown::Due));
        assert_eq!(Countdown::parse("7"), Some(Countdown::Minutes(7)));
        assert_eq!(Countdown::parse("-2"), Some(Countdown::Minutes(-2)));
        assert_eq!(Countdown::parse("DLY"), None);
        assert_eq!(Countdown::parse(""), None);
    }

    #[test]
    fn test_minutes_between_rounds_half_to_even() {
        assert_eq!(minutes_between(at(21, 29, 0), at(21, 30, 0)), 1);
        assert_eq!(minutes_between(at(21, 0, 0), at(21, 1, 30)), 2);
        assert_eq!(minutes_between(at(21, 0, 0), at(21, 2, 30)), 2);
        assert_eq!(minutes_between(at(21, 0, 0), at(20, 59, 30)), 0);
        assert_eq!(minutes_between(at(21, 0, 0), at(21, 4, 40)), 5);
    }

    #[test]
    fn test_one_minute_out_is_due() {
        let result = derive_arrival(Some(at(21, 29, 0)), Some(at(21, 30, 0)), None);
        assert_eq!(result, arrival("DUE", "9:30 PM"));
    }

    #[test]
    fn test_same_minute_is_due_one_minute_after_reference() {
        let result = derive_arrival(Some(at(21, 29, 0)), Some(at(21, 29, 0)), Some("3"));
        assert_eq!(result, arrival("DUE", "9:30 PM"));
    }

    #[test]
    fn test_past_arrival_is_delayed() {
        let result = derive_arrival(Some(at(21, 29, 0)), Some(at(21, 28, 0)), None);
        assert_eq!(result, arrival("Delayed", "N/A"));
    }

    #[test]
    fn test_minutes_out_adds_to_reference() {
        let result = derive_arrival(Some(at(6, 0, 0)), Some(at(6, 5, 0)), None);
        assert_eq!(result, arrival("5 minutes", "6:05 AM"));
    }

    #[test]
    fn test_absolute_time_wins_over_countdown() {
        let result = derive_arrival(Some(at(6, 0, 0)), Some(at(6, 10, 0)), Some("DUE"));
        assert_eq!(result, arrival("10 minutes", "6:10 AM"));
    }

    #[test]
    fn test_countdown_fallback_with_reference() {
        let reference = Some(at(21, 29, 0));
        assert_eq!(
            derive_arrival(reference, None, Some("4")),
            arrival("4 minutes", "9:33 PM")
        );
        assert_eq!(
            derive_arrival(reference, None, Some("1")),
            arrival("DUE", "9:30 PM")
        );
        assert_eq!(
            derive_arrival(reference, None, Some("Due")),
            arrival("DUE", "9:30 PM")
        );
        assert_eq!(
            derive_arrival(reference, None, Some("-1")),
            arrival("Delayed", "N/A")
        );
    }

    #[test]
    fn test_countdown_fallback_rejects_unknown_text() {
        let reference = Some(at(21, 29, 0));
        assert_eq!(derive_arrival(reference, None, Some("DLY")), Arrival::unavailable());
        assert_eq!(derive_arrival(reference, None, None), Arrival::unavailable());
    }

    #[test]
    fn test_without_reference_countdown_has_no_actual_time() {
        assert_eq!(derive_arrival(None, None, Some("8")), arrival("8 minutes", "N/A"));
        assert_eq!(derive_arrival(None, None, Some("0")), arrival("DUE", "N/A"));
        assert_eq!(derive_arrival(None, None, Some("due")), arrival("DUE", "N/A"));
    }

    #[test]
    fn test_without_reference_absolute_time_is_ignored() {
        let result = derive_arrival(None, Some(at(21, 40, 0)), Some("11"));
        assert_eq!(result, arrival("11 minutes", "N/A"));
        assert_eq!(
            derive_arrival(None, Some(at(21, 40, 0)), None),
            Arrival::unavailable()
        );
    }

    #[test]
    fn test_without_reference_negative_countdown_is_untrusted() {
        assert_eq!(derive_arrival(None, None, Some("-2")), Arrival::unavailable());
        assert_eq!(derive_arrival(None, None, Some("+2")), Arrival::unavailable());
    }

    #[test]
    fn test_huge_countdown_has_no_actual_time() {
        let result = derive_arrival(Some(at(21, 29, 0)), None, Some("9000000000000000000"));
        assert_eq!(result, arrival("9000000000000000000 minutes", "N/A"));
    }

    #[test]
    fn test_actual_arrival_crosses_midnight() {
        let result = derive_arrival(Some(at(23, 58, 0)), Some(at(23, 58, 0) + Duration::minutes(4)), None);
        assert_eq!(result, arrival("4 minutes", "12:02 AM"));
    }
}
