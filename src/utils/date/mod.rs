// Date utility functions

use chrono::{Datelike, Duration, NaiveDate, Weekday};

const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// ISO `YYYY-MM-DD` key identifying a day cell
pub fn date_key(date: NaiveDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}

pub fn parse_date_key(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key.trim(), DATE_KEY_FORMAT).ok()
}

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// First day of the month `delta` months away from `date`'s month
pub fn shift_month(date: NaiveDate, delta: i32) -> NaiveDate {
    let months = date.year() * 12 + date.month0() as i32 + delta;
    let year = months.div_euclid(12);
    let month0 = months.rem_euclid(12) as u32;
    NaiveDate::from_ymd_opt(year, month0 + 1, 1).unwrap_or_else(|| first_of_month(date))
}

pub fn last_of_month(date: NaiveDate) -> NaiveDate {
    shift_month(date, 1) - Duration::days(1)
}

/// Most recent `week_start` on or before `date`
pub fn start_of_week(date: NaiveDate, week_start: Weekday) -> NaiveDate {
    let offset = (7 + date.weekday().num_days_from_sunday() - week_start.num_days_from_sunday()) % 7;
    date - Duration::days(offset as i64)
}
