//! Time conversion and formatting for materialization stats.

use chrono::{DateTime, TimeZone, Utc};
use std::fmt::Display;

/// Convert unix seconds (as reported in step stats) to a UTC timestamp.
///
/// Returns None for non-finite or out-of-range values.
pub fn datetime_from_unix(secs: f64) -> Option<DateTime<Utc>> {
    if !secs.is_finite() {
        return None;
    }
    let whole = secs.floor();
    let nanos = ((secs - whole) * 1_000_000_000.0).round() as u32;
    Utc.timestamp_opt(whole as i64, nanos.min(999_999_999)).single()
}

/// Format a timestamp without seconds or timezone, e.g. "Jan 5, 3:07 PM".
pub fn format_timestamp<Tz>(dt: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    dt.format("%b %-d, %-I:%M %p").to_string()
}

/// Format the time between two unix-second instants as "H:MM:SS".
///
/// Negative spans clamp to zero.
pub fn format_elapsed(start: f64, end: f64) -> String {
    let seconds = (end - start).max(0.0).round() as u64;
    let hours = seconds / 3600;
    let mins = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{}:{:02}:{:02}", hours, mins, secs)
}

/// Format a refresh countdown as "M:SS".
pub fn format_countdown(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_datetime_from_unix() {
        let dt = datetime_from_unix(1_700_000_000.5).unwrap();
        assert_eq!(dt.timestamp(), 1_700_000_000);
        assert_eq!(dt.timestamp_subsec_millis(), 500);

        assert!(datetime_from_unix(f64::NAN).is_none());
        assert!(datetime_from_unix(f64::INFINITY).is_none());
    }

    #[test]
    fn test_format_timestamp_drops_seconds_and_zone() {
        let dt = Utc.with_ymd_and_hms(2024, 1, 5, 15, 7, 42).unwrap();
        assert_eq!(format_timestamp(&dt), "Jan 5, 3:07 PM");

        let morning = Utc.with_ymd_and_hms(2024, 11, 20, 0, 30, 0).unwrap();
        assert_eq!(format_timestamp(&morning), "Nov 20, 12:30 AM");
    }

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(100.0, 105.0), "0:00:05");
        assert_eq!(format_elapsed(0.0, 3723.0), "1:02:03");
        assert_eq!(format_elapsed(10.0, 5.0), "0:00:00");
    }

    #[test]
    fn test_format_countdown() {
        assert_eq!(format_countdown(0), "0:00");
        assert_eq!(format_countdown(15), "0:15");
        assert_eq!(format_countdown(75), "1:15");
    }
}
