//! The `YYYY-MM-DD` text codec and the small amount of calendar arithmetic the picker needs.
//!
//! Dates are plain [`NaiveDate`]s: no time of day, no time zone.

use chrono::{Datelike as _, Days, Months, NaiveDate};

/// Why a piece of text is not a date.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseDateError {
    #[error("no date given")]
    Empty,

    #[error("expected a date formatted as YYYY-MM-DD")]
    Format,

    #[error("{year:04}-{month:02}-{day:02} is not a day in the calendar")]
    InvalidDate { year: i32, month: u32, day: u32 },
}

/// Parse a `YYYY-MM-DD` string.
///
/// Only exactly four digits, a dash, two digits, a dash and two digits are accepted.
/// The day must exist in that month: `2021-02-30` is rejected rather than rolled over into March.
///
/// # Errors
/// See [`ParseDateError`].
pub fn try_parse_date(text: &str) -> Result<NaiveDate, ParseDateError> {
    if text.is_empty() {
        return Err(ParseDateError::Empty);
    }

    let bytes = text.as_bytes();
    let shape_ok = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
    if !shape_ok {
        return Err(ParseDateError::Format);
    }

    // The shape check above guarantees these slices are ASCII digits.
    let year: i32 = text[0..4].parse().map_err(|_err| ParseDateError::Format)?;
    let month: u32 = text[5..7].parse().map_err(|_err| ParseDateError::Format)?;
    let day: u32 = text[8..10].parse().map_err(|_err| ParseDateError::Format)?;

    NaiveDate::from_ymd_opt(year, month, day).ok_or(ParseDateError::InvalidDate { year, month, day })
}

/// Parse a `YYYY-MM-DD` string, treating anything malformed as "no date".
///
/// ```
/// use chrono::NaiveDate;
/// use egui_date_field::parse_date;
///
/// assert_eq!(parse_date("2020-05-10"), NaiveDate::from_ymd_opt(2020, 5, 10));
/// assert_eq!(parse_date("2021-02-30"), None);
/// assert_eq!(parse_date("2021-5-3"), None);
/// ```
#[inline]
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    try_parse_date(text).ok()
}

/// Format as `YYYY-MM-DD`, zero-padding month and day.
pub fn format_date(date: NaiveDate) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        date.month(),
        date.day()
    )
}

/// The first day of the month `date` is in.
#[inline]
pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// The last day of the month `date` is in.
pub fn last_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(days_in_month(date)).unwrap_or(date)
}

/// Number of days in the month `date` is in (28-31).
pub fn days_in_month(date: NaiveDate) -> u32 {
    date.with_day(31)
        .map(|_| 31)
        .or_else(|| date.with_day(30).map(|_| 30))
        .or_else(|| date.with_day(29).map(|_| 29))
        .unwrap_or(28)
}

/// `date` shifted by a signed number of days.
///
/// Returns `date` unchanged if the result is not representable.
pub fn add_days(date: NaiveDate, delta: i64) -> NaiveDate {
    let shifted = if delta >= 0 {
        date.checked_add_days(Days::new(delta.unsigned_abs()))
    } else {
        date.checked_sub_days(Days::new(delta.unsigned_abs()))
    };
    shifted.unwrap_or(date)
}

/// `date` shifted by a signed number of months, keeping the day of month.
///
/// If the target month is shorter, the day is clamped to its last day (Jan 31 + 1 month = Feb 28/29).
/// Returns `date` unchanged if the result is not representable.
pub fn add_months(date: NaiveDate, delta: i32) -> NaiveDate {
    let shifted = if delta >= 0 {
        date.checked_add_months(Months::new(delta.unsigned_abs()))
    } else {
        date.checked_sub_months(Months::new(delta.unsigned_abs()))
    };
    shifted.unwrap_or(date)
}

/// `(year, month, 1)`, if `month` is `1..=12` and the year is representable.
#[inline]
pub fn month_start(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// English name of a month, `1..=12`.
pub fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        12 => "December",
        _ => "",
    }
}

/// What assistive technology hears when the displayed month changes, e.g. `"May 2020"`.
pub fn month_label(view_month: NaiveDate) -> String {
    format!("{} {}", month_name(view_month.month()), view_month.year())
}
