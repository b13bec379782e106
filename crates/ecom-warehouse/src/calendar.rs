//! Date dimension attributes.

use chrono::{Datelike, NaiveDate, Weekday};

/// One `dim_date` row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRow {
    /// `YYYYMMDD` as an integer.
    pub date_key: i64,
    pub full_date: NaiveDate,
    pub year: i32,
    pub quarter: u32,
    pub month: u32,
    pub day: u32,
    pub month_name: String,
    pub day_name: String,
    /// ISO 8601 week number.
    pub week_of_year: u32,
    pub is_weekend: bool,
    pub is_holiday: bool,
}

impl DateRow {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date_key: date_key(date),
            full_date: date,
            year: date.year(),
            quarter: (date.month() - 1) / 3 + 1,
            month: date.month(),
            day: date.day(),
            month_name: date.format("%B").to_string(),
            day_name: date.format("%A").to_string(),
            week_of_year: date.iso_week().week(),
            is_weekend: matches!(date.weekday(), Weekday::Sat | Weekday::Sun),
            // No holiday calendar is configured.
            is_holiday: false,
        }
    }
}

pub fn date_key(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 10_000 + i64::from(date.month()) * 100 + i64::from(date.day())
}

/// Every day from `start` to `end`, both inclusive. Empty if `end < start`.
pub fn days_between(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |day| *day <= end)
}
