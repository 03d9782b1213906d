//! Wall-clock times that wrap within a single day.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveTime, Timelike};

use crate::date::PlainDate;
use crate::duration::Duration;
use crate::error::{Result, TemporalError};
use crate::input::InputKind;
use crate::parse::{self, IsoOffset, IsoTime};
use crate::unit::{Unit, NANOS_PER_DAY, NANOS_PER_SECOND};
use crate::value::ValueKind;

/// A time of day with nanosecond precision, e.g. `14:30:45.5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlainTime {
    inner: NaiveTime,
}

impl PlainTime {
    pub const MIDNIGHT: PlainTime = PlainTime {
        inner: NaiveTime::MIN,
    };

    pub fn new(hour: u32, minute: u32, second: u32) -> Result<Self> {
        Self::from_fields(hour, minute, second, 0, 0, 0)
    }

    /// Build a time from every field, rejecting any field outside its range.
    pub fn from_fields(
        hour: u32,
        minute: u32,
        second: u32,
        millisecond: u32,
        microsecond: u32,
        nanosecond: u32,
    ) -> Result<Self> {
        check_range("hour", hour, 23)?;
        check_range("minute", minute, 59)?;
        check_range("second", second, 59)?;
        check_range("millisecond", millisecond, 999)?;
        check_range("microsecond", microsecond, 999)?;
        check_range("nanosecond", nanosecond, 999)?;
        let nanos = millisecond * 1_000_000 + microsecond * 1_000 + nanosecond;
        NaiveTime::from_hms_nano_opt(hour, minute, second, nanos)
            .map(Self::from_naive)
            .ok_or_else(|| TemporalError::validation("time", "invalid time of day"))
    }

    /// Range-checked time from parsed text fields.
    pub(crate) fn from_iso(time: &IsoTime) -> Result<Self> {
        Self::from_fields(
            time.hour,
            time.minute,
            time.second,
            time.nanosecond / 1_000_000,
            (time.nanosecond / 1_000) % 1_000,
            time.nanosecond % 1_000,
        )
    }

    pub(crate) fn from_naive(inner: NaiveTime) -> Self {
        // Leap-second representations are folded into :59.999999999.
        let inner = if inner.nanosecond() >= 1_000_000_000 {
            inner
                .with_nanosecond(999_999_999)
                .unwrap_or(inner)
        } else {
            inner
        };
        PlainTime { inner }
    }

    pub(crate) fn naive(&self) -> NaiveTime {
        self.inner
    }

    pub(crate) fn from_nanos_of_day(nanos: i128) -> Self {
        let nanos = nanos.rem_euclid(NANOS_PER_DAY);
        let secs = (nanos / NANOS_PER_SECOND) as u32;
        let sub = (nanos % NANOS_PER_SECOND) as u32;
        NaiveTime::from_num_seconds_from_midnight_opt(secs, sub)
            .map(Self::from_naive)
            .unwrap_or(Self::MIDNIGHT)
    }

    pub(crate) fn nanos_of_day(&self) -> i128 {
        i128::from(self.inner.num_seconds_from_midnight()) * NANOS_PER_SECOND
            + i128::from(self.subsec_nanos())
    }

    pub fn hour(&self) -> u32 {
        self.inner.hour()
    }

    pub fn minute(&self) -> u32 {
        self.inner.minute()
    }

    pub fn second(&self) -> u32 {
        self.inner.second()
    }

    pub fn millisecond(&self) -> u32 {
        self.subsec_nanos() / 1_000_000
    }

    pub fn microsecond(&self) -> u32 {
        (self.subsec_nanos() / 1_000) % 1_000
    }

    pub fn nanosecond(&self) -> u32 {
        self.subsec_nanos() % 1_000
    }

    /// All sub-second digits as one nanosecond count.
    pub fn subsec_nanos(&self) -> u32 {
        self.inner.nanosecond()
    }

    /// Add the clock part of a duration, wrapping around midnight. Calendar
    /// units are ignored.
    pub fn add(&self, duration: &Duration) -> Self {
        Self::from_nanos_of_day(self.nanos_of_day() + duration.time_nanos() % NANOS_PER_DAY)
    }

    pub fn subtract(&self, duration: &Duration) -> Self {
        self.add(&duration.negated())
    }

    /// Duration from `self` to `other` within the same day.
    pub fn until(&self, other: &PlainTime, largest: Unit) -> Result<Duration> {
        if largest > Unit::Hour {
            return Err(TemporalError::InvalidUnit(format!(
                "largest unit for times must be hour or finer, got {largest}"
            )));
        }
        Duration::from_nanos_balanced(other.nanos_of_day() - self.nanos_of_day(), largest)
    }

    pub fn since(&self, other: &PlainTime, largest: Unit) -> Result<Duration> {
        other.until(self, largest)
    }
}

fn check_range(field: &'static str, value: u32, max: u32) -> Result<()> {
    if value > max {
        return Err(TemporalError::validation(
            field,
            format!("{value} is out of range 0..={max}"),
        ));
    }
    Ok(())
}

impl fmt::Display for PlainTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}{}",
            self.hour(),
            self.minute(),
            self.second(),
            parse::fraction_suffix(self.subsec_nanos())
        )
    }
}

impl FromStr for PlainTime {
    type Err = TemporalError;

    fn from_str(s: &str) -> Result<Self> {
        let fail = |reason: String| TemporalError::Conversion {
            input: InputKind::Text,
            target: ValueKind::PlainTime,
            reason,
        };
        let parsed = parse::parse_date_time(s).map_err(fail)?;
        if parsed.offset == Some(IsoOffset::Utc) {
            return Err(fail("'Z' designates an exact time, not a wall-clock time".into()));
        }
        let time = parsed.time.ok_or_else(|| fail(format!("no time in '{s}'")))?;
        // The date is dropped but must still be a real date.
        if let Some(date) = &parsed.date {
            PlainDate::from_iso(date).map_err(|e| fail(e.to_string()))?;
        }
        Self::from_iso(&time).map_err(|e| fail(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time(s: &str) -> PlainTime {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_fields() {
        let t = time("14:30:45");
        assert_eq!((t.hour(), t.minute(), t.second()), (14, 30, 45));
    }

    #[test]
    fn test_subsecond_fields() {
        let t = time("01:02:03.123456789");
        assert_eq!(t.millisecond(), 123);
        assert_eq!(t.microsecond(), 456);
        assert_eq!(t.nanosecond(), 789);
        assert_eq!(t.to_string(), "01:02:03.123456789");
    }

    #[test]
    fn test_display_always_has_seconds() {
        assert_eq!(time("09:05").to_string(), "09:05:00");
        assert_eq!(time("09:05:00.5").to_string(), "09:05:00.5");
    }

    #[test]
    fn test_rejects_out_of_range() {
        let err = PlainTime::new(24, 0, 0).unwrap_err();
        assert!(matches!(err, TemporalError::Validation { field: "hour", .. }));
        let err = PlainTime::new(10, 60, 0).unwrap_err();
        assert!(matches!(err, TemporalError::Validation { field: "minute", .. }));
        assert!("25:00".parse::<PlainTime>().is_err());
    }

    #[test]
    fn test_rejects_invalid_date_part() {
        let err = "2023-02-30T10:00".parse::<PlainTime>().unwrap_err();
        assert!(matches!(err, TemporalError::Conversion { .. }));
        assert!(err.to_string().contains("day"));
        assert_eq!(time("2024-02-29T10:00"), time("10:00"));
    }

    #[test]
    fn test_rejects_date_only() {
        assert!("2023-12-25".parse::<PlainTime>().is_err());
    }

    #[test]
    fn test_add_wraps_around_midnight() {
        let t = time("23:30").add(&Duration::hours(1));
        assert_eq!(t, time("00:30"));
        let t = time("00:15").subtract(&Duration::minutes(30));
        assert_eq!(t, time("23:45"));
    }

    #[test]
    fn test_add_ignores_days() {
        assert_eq!(time("10:00").add(&Duration::days(3)), time("10:00"));
    }

    #[test]
    fn test_until_balances() {
        let d = time("08:00").until(&time("10:30:15"), Unit::Hour).unwrap();
        assert_eq!((d.get_hours(), d.get_minutes(), d.get_seconds()), (2, 30, 15));
        let d = time("08:00").until(&time("10:30"), Unit::Minute).unwrap();
        assert_eq!(d.get_minutes(), 150);
        let d = time("10:30").until(&time("08:00"), Unit::Hour).unwrap();
        assert_eq!((d.get_hours(), d.get_minutes()), (-2, -30));
    }

    #[test]
    fn test_until_rejects_day() {
        assert!(time("08:00").until(&time("09:00"), Unit::Day).is_err());
    }
}
