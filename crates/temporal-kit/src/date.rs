//! Calendar dates without a time of day or time zone.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, TimeDelta};

use crate::calendar::{days_in_month, days_in_year, is_leap_year, shift_month};
use crate::datetime::PlainDateTime;
use crate::duration::Duration;
use crate::error::{Result, TemporalError};
use crate::input::InputKind;
use crate::parse::{self, IsoDate, IsoOffset};
use crate::time::PlainTime;
use crate::unit::{Unit, NANOS_PER_DAY};
use crate::value::ValueKind;

/// A date in the ISO calendar, e.g. `2023-12-25`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlainDate {
    inner: NaiveDate,
}

impl PlainDate {
    /// Build a date from its fields, rejecting any field outside its range.
    ///
    /// ```
    /// use temporal_kit::PlainDate;
    ///
    /// assert!(PlainDate::new(2024, 2, 29).is_ok());
    /// assert!(PlainDate::new(2023, 2, 29).is_err());
    /// ```
    pub fn new(year: i32, month: u32, day: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(TemporalError::validation(
                "month",
                format!("{month} is out of range 1..=12"),
            ));
        }
        let max_day = days_in_month(year, month);
        if day < 1 || day > max_day {
            return Err(TemporalError::validation(
                "day",
                format!("{day} is out of range 1..={max_day} for {year}-{month:02}"),
            ));
        }
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Self::from_naive)
            .ok_or_else(|| {
                TemporalError::validation("year", format!("{year} is outside the supported range"))
            })
    }

    /// Range-checked date from parsed text fields.
    pub(crate) fn from_iso(date: &IsoDate) -> Result<Self> {
        Self::new(date.year, date.month, date.day)
    }

    pub(crate) fn from_naive(inner: NaiveDate) -> Self {
        PlainDate { inner }
    }

    pub(crate) fn naive(&self) -> NaiveDate {
        self.inner
    }

    pub fn year(&self) -> i32 {
        self.inner.year()
    }

    pub fn month(&self) -> u32 {
        self.inner.month()
    }

    pub fn day(&self) -> u32 {
        self.inner.day()
    }

    /// ISO day of week, Monday = 1 through Sunday = 7.
    pub fn day_of_week(&self) -> u32 {
        self.inner.weekday().number_from_monday()
    }

    pub fn day_of_year(&self) -> u32 {
        self.inner.ordinal()
    }

    pub fn days_in_month(&self) -> u32 {
        days_in_month(self.year(), self.month())
    }

    pub fn days_in_year(&self) -> u32 {
        days_in_year(self.year())
    }

    pub fn in_leap_year(&self) -> bool {
        is_leap_year(self.year())
    }

    /// Combine with a wall-clock time.
    pub fn to_plain_date_time(self, time: PlainTime) -> PlainDateTime {
        PlainDateTime::new(self, time)
    }

    pub fn start_of_month(&self) -> Self {
        self.with_day_clamped(1)
    }

    pub fn end_of_month(&self) -> Self {
        self.with_day_clamped(self.days_in_month())
    }

    pub fn start_of_year(&self) -> Self {
        Self::new(self.year(), 1, 1).unwrap_or(*self)
    }

    pub fn end_of_year(&self) -> Self {
        Self::new(self.year(), 12, 31).unwrap_or(*self)
    }

    fn with_day_clamped(&self, day: u32) -> Self {
        self.inner.with_day(day).map(Self::from_naive).unwrap_or(*self)
    }

    /// Days since 1970-01-01.
    pub(crate) fn epoch_days(&self) -> i64 {
        i64::from(self.inner.num_days_from_ce()) - 719_163
    }

    /// Move by whole months, clamping the day to the end of the target month.
    pub(crate) fn add_months_clamped(&self, months: i64) -> Result<Self> {
        if months == 0 {
            return Ok(*self);
        }
        let (year, month) = shift_month(self.year(), self.month(), months)
            .ok_or_else(|| TemporalError::overflow(format!("{self} plus {months} months")))?;
        let day = self.day().min(days_in_month(year, month));
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Self::from_naive)
            .ok_or_else(|| TemporalError::overflow(format!("{self} plus {months} months")))
    }

    pub(crate) fn add_days(&self, days: i64) -> Result<Self> {
        if days == 0 {
            return Ok(*self);
        }
        TimeDelta::try_days(days)
            .and_then(|delta| self.inner.checked_add_signed(delta))
            .map(Self::from_naive)
            .ok_or_else(|| TemporalError::overflow(format!("{self} plus {days} days")))
    }

    /// Apply the calendar part of a duration: months (with years) first, then days.
    pub(crate) fn add_calendar(&self, duration: &Duration, extra_days: i64) -> Result<Self> {
        let months = duration
            .get_years()
            .checked_mul(12)
            .and_then(|m| m.checked_add(duration.get_months()))
            .ok_or_else(|| TemporalError::overflow("duration months"))?;
        let days = duration
            .get_weeks()
            .checked_mul(7)
            .and_then(|d| d.checked_add(duration.get_days()))
            .and_then(|d| d.checked_add(extra_days))
            .ok_or_else(|| TemporalError::overflow("duration days"))?;
        self.add_months_clamped(months)?.add_days(days)
    }

    /// Add a duration. Adding months lands on the last valid day when the
    /// source day does not exist in the target month.
    ///
    /// ```
    /// use temporal_kit::{Duration, PlainDate};
    ///
    /// let jan31 = PlainDate::new(2023, 1, 31).unwrap();
    /// let feb = jan31.add(&Duration::months(1)).unwrap();
    /// assert_eq!(feb, PlainDate::new(2023, 2, 28).unwrap());
    /// ```
    pub fn add(&self, duration: &Duration) -> Result<Self> {
        let extra_days = i64::try_from(duration.time_nanos() / NANOS_PER_DAY)
            .map_err(|_| TemporalError::overflow("duration time part"))?;
        self.add_calendar(duration, extra_days)
    }

    pub fn subtract(&self, duration: &Duration) -> Result<Self> {
        self.add(&duration.negated())
    }

    /// Duration from `self` to `other`, carrying into units no coarser than `largest`.
    ///
    /// The result always satisfies `self.add(&self.until(other, u)?) == other`.
    pub fn until(&self, other: &PlainDate, largest: Unit) -> Result<Duration> {
        if largest < Unit::Day {
            return Err(TemporalError::InvalidUnit(format!(
                "largest unit for dates must be day or coarser, got {largest}"
            )));
        }
        let (years, months, weeks, days) = date_difference(self, other, largest)?;
        Ok(Duration::from_calendar(years, months, weeks, days))
    }

    pub fn since(&self, other: &PlainDate, largest: Unit) -> Result<Duration> {
        other.until(self, largest)
    }
}

/// Calendar difference as (years, months, weeks, days).
pub(crate) fn date_difference(
    start: &PlainDate,
    end: &PlainDate,
    largest: Unit,
) -> Result<(i64, i64, i64, i64)> {
    let sign: i64 = match end.cmp(start) {
        Ordering::Equal => return Ok((0, 0, 0, 0)),
        Ordering::Greater => 1,
        Ordering::Less => -1,
    };

    match largest {
        Unit::Year | Unit::Month => {
            let mut total = i64::from(end.year() - start.year()) * 12
                + i64::from(end.month()) - i64::from(start.month());
            let mut anchor = start.add_months_clamped(total)?;
            while (sign > 0 && anchor > *end) || (sign < 0 && anchor < *end) {
                total -= sign;
                anchor = start.add_months_clamped(total)?;
            }
            let days = end.epoch_days() - anchor.epoch_days();
            if largest == Unit::Year {
                Ok((total / 12, total % 12, 0, days))
            } else {
                Ok((0, total, 0, days))
            }
        }
        Unit::Week => {
            let days = end.epoch_days() - start.epoch_days();
            Ok((0, 0, days / 7, days % 7))
        }
        _ => Ok((0, 0, 0, end.epoch_days() - start.epoch_days())),
    }
}

impl fmt::Display for PlainDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{:02}-{:02}",
            parse::format_year(self.year()),
            self.month(),
            self.day()
        )
    }
}

impl FromStr for PlainDate {
    type Err = TemporalError;

    fn from_str(s: &str) -> Result<Self> {
        let fail = |reason: String| TemporalError::Conversion {
            input: InputKind::Text,
            target: ValueKind::PlainDate,
            reason,
        };
        let parsed = parse::parse_date_time(s).map_err(fail)?;
        if parsed.offset == Some(IsoOffset::Utc) {
            return Err(fail("'Z' designates an exact time, not a calendar date".into()));
        }
        if let Some(calendar) = &parsed.calendar {
            calendar.parse::<crate::calendar::CalendarId>()?;
        }
        let date = parsed.date.ok_or_else(|| fail(format!("no date in '{s}'")))?;
        // The time is dropped but must still be a real time of day.
        if let Some(time) = &parsed.time {
            PlainTime::from_iso(time).map_err(|e| fail(e.to_string()))?;
        }
        Self::from_iso(&date).map_err(|e| fail(e.to_string()))
    }
}
