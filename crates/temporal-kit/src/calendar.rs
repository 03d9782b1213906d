//! Calendar systems and proleptic Gregorian month arithmetic.
//!
//! Only ISO-8601 arithmetic is implemented. The `gregory` identifier is
//! accepted as an alias that shares the same month lengths and only differs
//! in how it is labelled when formatting.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TemporalError;

/// A calendar system identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalendarId {
    #[default]
    Iso8601,
    Gregory,
}

impl CalendarId {
    pub fn as_str(&self) -> &'static str {
        match self {
            CalendarId::Iso8601 => "iso8601",
            CalendarId::Gregory => "gregory",
        }
    }
}

impl fmt::Display for CalendarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CalendarId {
    type Err = TemporalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "iso8601" => Ok(CalendarId::Iso8601),
            "gregory" | "gregorian" => Ok(CalendarId::Gregory),
            _ => Err(TemporalError::InvalidCalendar(format!("'{s}'"))),
        }
    }
}

/// Whether `year` is a leap year in the proleptic Gregorian calendar.
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in `month` (1-12) of `year`. Returns 0 for an invalid month.
///
/// ```
/// use temporal_kit::calendar::days_in_month;
///
/// assert_eq!(days_in_month(2024, 2), 29);
/// assert_eq!(days_in_month(2023, 2), 28);
/// ```
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

pub fn days_in_year(year: i32) -> u32 {
    if is_leap_year(year) {
        366
    } else {
        365
    }
}

/// Shift a (year, month) pair by `months`, returning the new pair.
pub(crate) fn shift_month(year: i32, month: u32, months: i64) -> Option<(i32, u32)> {
    let index = i64::from(year)
        .checked_mul(12)?
        .checked_add(i64::from(month) - 1)?
        .checked_add(months)?;
    let year = i32::try_from(index.div_euclid(12)).ok()?;
    let month = (index.rem_euclid(12) + 1) as u32;
    Some((year, month))
}
