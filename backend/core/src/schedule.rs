//! Due-date helpers: the allowed scheduling window, parsing and display.

use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Timelike};

use crate::error::ValidationError;

/// How far ahead a task may be scheduled when no config overrides it.
pub const DEFAULT_MAX_DUE_DAYS: u32 = 30;

/// Inclusive `(earliest, latest)` due dates relative to `today`.
pub fn due_window(today: NaiveDate, max_due_days: u32) -> (NaiveDate, NaiveDate) {
    (today, today + Duration::days(i64::from(max_due_days)))
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDate(raw.to_string()))
}

pub fn parse_time(raw: &str) -> Result<NaiveTime, ValidationError> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M")
        .map_err(|_| ValidationError::InvalidTime(raw.to_string()))
}

/// Human-readable due label.
///
/// Tasks due today show only the clock time (`2:30 PM`); anything else gets
/// the weekday and date as well (`Tuesday, 20 Oct at 9:05 AM`).
pub fn format_due(date: NaiveDate, time: NaiveTime, today: NaiveDate) -> String {
    let clock = twelve_hour(time);
    if date == today {
        return clock;
    }
    format!("{}, {} {} at {}", date.format("%A"), date.day(), date.format("%b"), clock)
}

fn twelve_hour(time: NaiveTime) -> String {
    let hour = match time.hour() % 12 {
        0 => 12,
        h => h,
    };
    let meridiem = if time.hour() >= 12 { "PM" } else { "AM" };
    format!("{hour}:{:02} {meridiem}", time.minute())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn today_shows_clock_only() {
        let today = day(2026, 10, 16);
        let t = NaiveTime::from_hms_opt(14, 30, 0).unwrap();
        assert_eq!(format_due(today, t, today), "2:30 PM");
    }

    #[test]
    fn other_days_include_weekday_and_month() {
        let today = day(2026, 10, 16);
        let t = NaiveTime::from_hms_opt(9, 5, 0).unwrap();
        assert_eq!(format_due(day(2026, 10, 20), t, today), "Tuesday, 20 Oct at 9:05 AM");
    }

    #[test]
    fn midnight_and_noon() {
        let today = day(2026, 10, 16);
        assert_eq!(format_due(today, NaiveTime::from_hms_opt(0, 0, 0).unwrap(), today), "12:00 AM");
        assert_eq!(format_due(today, NaiveTime::from_hms_opt(12, 7, 0).unwrap(), today), "12:07 PM");
    }

    #[test]
    fn window_is_inclusive() {
        let (lo, hi) = due_window(day(2026, 10, 16), 30);
        assert_eq!(lo, day(2026, 10, 16));
        assert_eq!(hi, day(2026, 11, 15));
    }

    #[test]
    fn parses_cli_inputs() {
        assert_eq!(parse_date("2026-10-20").unwrap(), day(2026, 10, 20));
        assert!(parse_date("20/10/2026").is_err());
        assert_eq!(parse_time("07:45").unwrap(), NaiveTime::from_hms_opt(7, 45, 0).unwrap());
        assert!(matches!(parse_time("7pm"), Err(ValidationError::InvalidTime(_))));
    }
}
