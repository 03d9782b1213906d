//! Calendar date plus wall-clock time, with no time zone attached.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;

use crate::date::{date_difference, PlainDate};
use crate::duration::Duration;
use crate::error::{Result, TemporalError};
use crate::input::InputKind;
use crate::parse::{self, IsoOffset};
use crate::time::PlainTime;
use crate::unit::{Unit, NANOS_PER_DAY};
use crate::value::ValueKind;
use crate::zoned::{Disambiguation, ZonedDateTime};

/// A date and time without a zone, e.g. `2023-12-25T14:30:00`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlainDateTime {
    date: PlainDate,
    time: PlainTime,
}

impl PlainDateTime {
    pub fn new(date: PlainDate, time: PlainTime) -> Self {
        PlainDateTime { date, time }
    }

    pub(crate) fn from_naive(naive: NaiveDateTime) -> Self {
        PlainDateTime {
            date: PlainDate::from_naive(naive.date()),
            time: PlainTime::from_naive(naive.time()),
        }
    }

    pub(crate) fn naive(&self) -> NaiveDateTime {
        self.date.naive().and_time(self.time.naive())
    }

    pub fn date(&self) -> PlainDate {
        self.date
    }

    pub fn time(&self) -> PlainTime {
        self.time
    }

    pub fn to_plain_date(&self) -> PlainDate {
        self.date
    }

    pub fn to_plain_time(&self) -> PlainTime {
        self.time
    }

    /// Anchor this wall-clock reading in a time zone.
    pub fn to_zoned(&self, time_zone: &str, disambiguation: Disambiguation) -> Result<ZonedDateTime> {
        ZonedDateTime::from_plain(self, time_zone, disambiguation)
    }

    pub fn start_of_day(&self) -> Self {
        PlainDateTime::new(self.date, PlainTime::MIDNIGHT)
    }

    /// The last representable nanosecond of the same day.
    pub fn end_of_day(&self) -> Self {
        PlainDateTime::new(self.date, PlainTime::from_nanos_of_day(NANOS_PER_DAY - 1))
    }

    /// Nanoseconds since 1970-01-01T00:00 as if this were UTC.
    pub(crate) fn epoch_nanos(&self) -> i128 {
        i128::from(self.date.epoch_days()) * NANOS_PER_DAY + self.time.nanos_of_day()
    }

    /// Add a duration: calendar units move the date (clamping month ends),
    /// clock units move the time and carry whole days.
    pub fn add(&self, duration: &Duration) -> Result<Self> {
        let total = self.time.nanos_of_day() + duration.time_nanos();
        let carry = i64::try_from(total.div_euclid(NANOS_PER_DAY))
            .map_err(|_| TemporalError::overflow("duration time part"))?;
        let date = self.date.add_calendar(duration, carry)?;
        Ok(PlainDateTime::new(date, PlainTime::from_nanos_of_day(total)))
    }

    pub fn subtract(&self, duration: &Duration) -> Result<Self> {
        self.add(&duration.negated())
    }

    /// Duration from `self` to `other`.
    ///
    /// With `largest` at or above `Unit::Day` the date part is computed on the
    /// calendar and the time part is balanced up to hours. Finer units give
    /// an exact balanced clock duration.
    pub fn until(&self, other: &PlainDateTime, largest: Unit) -> Result<Duration> {
        if largest < Unit::Day {
            return Duration::from_nanos_balanced(other.epoch_nanos() - self.epoch_nanos(), largest);
        }

        let mut time_diff = other.time.nanos_of_day() - self.time.nanos_of_day();
        let mut end_date = other.date;
        if other > self && time_diff < 0 {
            end_date = end_date.add_days(-1)?;
            time_diff += NANOS_PER_DAY;
        } else if other < self && time_diff > 0 {
            end_date = end_date.add_days(1)?;
            time_diff -= NANOS_PER_DAY;
        }

        let (years, months, weeks, days) = date_difference(&self.date, &end_date, largest)?;
        let clock = Duration::from_nanos_balanced(time_diff, Unit::Hour)?;
        Ok(Duration::from_calendar(years, months, weeks, days).with_clock(&clock))
    }

    pub fn since(&self, other: &PlainDateTime, largest: Unit) -> Result<Duration> {
        other.until(self, largest)
    }
}

impl fmt::Display for PlainDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}T{}", self.date, self.time)
    }
}

impl FromStr for PlainDateTime {
    type Err = TemporalError;

    /// A date alone is accepted and reads as midnight.
    fn from_str(s: &str) -> Result<Self> {
        let fail = |reason: String| TemporalError::Conversion {
            input: InputKind::Text,
            target: ValueKind::PlainDateTime,
            reason,
        };
        let parsed = parse::parse_date_time(s).map_err(fail)?;
        if parsed.offset == Some(IsoOffset::Utc) {
            return Err(fail("'Z' designates an exact time, not a wall-clock time".into()));
        }
        let d = parsed.date.ok_or_else(|| fail(format!("no date in '{s}'")))?;
        let t = parsed.time.unwrap_or_default();
        let date = PlainDate::from_iso(&d).map_err(|e| fail(e.to_string()))?;
        let time = PlainTime::from_iso(&t).map_err(|e| fail(e.to_string()))?;
        Ok(PlainDateTime::new(date, time))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(s: &str) -> PlainDateTime {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_and_display() {
        let v = dt("2023-12-25T14:30:45");
        assert_eq!(v.to_string(), "2023-12-25T14:30:45");
        assert_eq!(v.date().day(), 25);
        assert_eq!(v.time().minute(), 30);
    }

    #[test]
    fn test_date_only_is_midnight() {
        assert_eq!(dt("2023-12-25").to_string(), "2023-12-25T00:00:00");
    }

    #[test]
    fn test_narrowing_round_trip() {
        let d = PlainDate::new(2024, 2, 29).unwrap();
        let t = PlainTime::new(23, 59, 1).unwrap();
        let v = d.to_plain_date_time(t);
        assert_eq!(v.to_plain_date(), d);
        assert_eq!(v.to_plain_time(), t);
    }

    #[test]
    fn test_add_time_carries_into_date() {
        let v = dt("2023-12-31T23:00").add(&Duration::hours(2)).unwrap();
        assert_eq!(v, dt("2024-01-01T01:00"));
        let v = dt("2024-01-01T01:00").subtract(&Duration::hours(2)).unwrap();
        assert_eq!(v, dt("2023-12-31T23:00"));
    }

    #[test]
    fn test_add_month_clamps() {
        let v = dt("2023-01-31T08:00").add(&Duration::months(1)).unwrap();
        assert_eq!(v, dt("2023-02-28T08:00"));
    }

    #[test]
    fn test_until_days_and_hours() {
        let d = dt("2023-01-01T10:00").until(&dt("2023-01-03T08:30"), Unit::Day).unwrap();
        assert_eq!((d.get_days(), d.get_hours(), d.get_minutes()), (1, 22, 30));
        assert_eq!(dt("2023-01-01T10:00").add(&d).unwrap(), dt("2023-01-03T08:30"));
    }

    #[test]
    fn test_until_negative_borrows_day() {
        let a = dt("2023-01-03T08:30");
        let b = dt("2023-01-01T10:00");
        let d = a.until(&b, Unit::Day).unwrap();
        assert_eq!((d.get_days(), d.get_hours(), d.get_minutes()), (-1, -22, -30));
        assert_eq!(a.add(&d).unwrap(), b);
    }

    #[test]
    fn test_until_in_hours() {
        let d = dt("2023-01-01T10:00").until(&dt("2023-01-03T08:30"), Unit::Hour).unwrap();
        assert_eq!((d.get_days(), d.get_hours(), d.get_minutes()), (0, 46, 30));
    }

    #[test]
    fn test_start_and_end_of_day() {
        let v = dt("2023-06-15T13:45:10");
        assert_eq!(v.start_of_day().to_string(), "2023-06-15T00:00:00");
        assert_eq!(v.end_of_day().to_string(), "2023-06-15T23:59:59.999999999");
    }
}
