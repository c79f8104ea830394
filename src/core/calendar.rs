//! Calendar rule for the regular contribution day (third Thursday).

use crate::core::error::PlanError;
use chrono::{Datelike, NaiveDate, Weekday};

/// Returns the third Thursday of the given month.
///
/// Every month has at least four of each weekday, so a third Thursday always
/// exists; the only failure mode is a year/month outside chrono's range.
pub fn third_thursday(year: i32, month: u32) -> Result<NaiveDate, PlanError> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or(PlanError::InvalidDate { year, month })?;

    let mut thursdays = first
        .iter_days()
        .take_while(|d| d.month() == month)
        .filter(|d| d.weekday() == Weekday::Thu)
        .collect::<Vec<_>>();
    thursdays.sort();

    Ok(thursdays[2])
}

/// True if `date` is the regular contribution day of its month.
pub fn is_trigger_day(date: NaiveDate) -> bool {
    // third_thursday cannot fail for a date chrono already represents
    third_thursday(date.year(), date.month())
        .map(|t| t == date)
        .unwrap_or(false)
}

/// Returns next month's regular contribution day, wrapping December into
/// January of the following year.
pub fn next_trigger_date(today: NaiveDate) -> Result<NaiveDate, PlanError> {
    let (year, month) = if today.month() == 12 {
        (today.year() + 1, 1)
    } else {
        (today.year(), today.month() + 1)
    };
    third_thursday(year, month)
}
