use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, Duration, Local, NaiveDate};

/// Parses a `YYYY-MM-DD` calendar day. All request-boundary date input
/// goes through here so malformed dates never reach the engines.
pub fn parse_day(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .with_context(|| format!("Invalid date format: {input}. Example: 2026-02-18"))
}

/// Truncates an instant to its calendar day in the configured zone.
pub fn start_of_day(instant: DateTime<Local>) -> NaiveDate {
    instant.date_naive()
}

pub fn today() -> NaiveDate {
    start_of_day(Local::now())
}

/// Weekday as 0-6 with Sunday = 0, matching the stored schedule values.
pub fn weekday_index(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

pub fn is_same_day(a: NaiveDate, b: NaiveDate) -> bool {
    a == b
}

/// Strict calendar-day ordering: true when `a` is a later day than `b`.
pub fn is_after(a: NaiveDate, b: NaiveDate) -> bool {
    a > b
}

pub fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    date + Duration::days(days)
}

pub fn subtract_days(date: NaiveDate, days: i64) -> NaiveDate {
    date - Duration::days(days)
}

pub fn previous_day(date: NaiveDate) -> NaiveDate {
    subtract_days(date, 1)
}

pub fn format_day(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
