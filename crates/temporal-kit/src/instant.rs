//! Exact points on the timeline, independent of calendar and time zone.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeDelta, TimeZone, Utc};

use crate::date::PlainDate;
use crate::duration::Duration;
use crate::error::{Result, TemporalError};
use crate::input::InputKind;
use crate::parse::{self, IsoOffset};
use crate::time::PlainTime;
use crate::unit::{Unit, NANOS_PER_SECOND};
use crate::value::ValueKind;
use crate::zoned::ZonedDateTime;

/// An exact time with nanosecond precision, e.g. `2023-12-25T14:30:45Z`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Instant {
    inner: DateTime<Utc>,
}

impl Instant {
    pub(crate) fn from_utc(inner: DateTime<Utc>) -> Self {
        Instant { inner }
    }

    pub(crate) fn utc(&self) -> DateTime<Utc> {
        self.inner
    }

    pub fn from_epoch_milliseconds(millis: i64) -> Result<Self> {
        DateTime::from_timestamp_millis(millis)
            .map(Self::from_utc)
            .ok_or_else(|| TemporalError::overflow(format!("{millis} ms since epoch")))
    }

    pub fn from_epoch_nanoseconds(nanos: i128) -> Result<Self> {
        let secs = i64::try_from(nanos.div_euclid(NANOS_PER_SECOND))
            .map_err(|_| TemporalError::overflow(format!("{nanos} ns since epoch")))?;
        let sub = nanos.rem_euclid(NANOS_PER_SECOND) as u32;
        DateTime::from_timestamp(secs, sub)
            .map(Self::from_utc)
            .ok_or_else(|| TemporalError::overflow(format!("{nanos} ns since epoch")))
    }

    pub fn epoch_seconds(&self) -> i64 {
        self.inner.timestamp()
    }

    pub fn epoch_milliseconds(&self) -> i64 {
        self.inner.timestamp_millis()
    }

    pub fn epoch_nanoseconds(&self) -> i128 {
        i128::from(self.inner.timestamp()) * NANOS_PER_SECOND
            + i128::from(self.inner.timestamp_subsec_nanos())
    }

    /// View this instant in a time zone.
    pub fn to_zoned(&self, time_zone: &str) -> Result<ZonedDateTime> {
        ZonedDateTime::from_instant(self, time_zone)
    }

    /// Add clock units. Days and coarser units have no fixed length on the
    /// timeline and are rejected.
    pub fn add(&self, duration: &Duration) -> Result<Self> {
        if duration.has_date_units() {
            return Err(TemporalError::InvalidUnit(format!(
                "instants only accept hours and finer units, got {duration}"
            )));
        }
        let nanos = self
            .epoch_nanoseconds()
            .checked_add(duration.time_nanos())
            .ok_or_else(|| TemporalError::overflow(format!("{self} plus {duration}")))?;
        Self::from_epoch_nanoseconds(nanos)
    }

    pub fn subtract(&self, duration: &Duration) -> Result<Self> {
        self.add(&duration.negated())
    }

    pub fn until(&self, other: &Instant, largest: Unit) -> Result<Duration> {
        if largest > Unit::Hour {
            return Err(TemporalError::InvalidUnit(format!(
                "largest unit for instants must be hour or finer, got {largest}"
            )));
        }
        Duration::from_nanos_balanced(other.epoch_nanoseconds() - self.epoch_nanoseconds(), largest)
    }

    pub fn since(&self, other: &Instant, largest: Unit) -> Result<Duration> {
        other.until(self, largest)
    }
}

impl From<DateTime<Utc>> for Instant {
    fn from(value: DateTime<Utc>) -> Self {
        Instant::from_utc(value)
    }
}

impl From<DateTime<FixedOffset>> for Instant {
    fn from(value: DateTime<FixedOffset>) -> Self {
        Instant::from_utc(value.with_timezone(&Utc))
    }
}

impl fmt::Display for Instant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let naive = self.inner.naive_utc();
        let date = PlainDate::from_naive(naive.date());
        let time = PlainTime::from_naive(naive.time());
        write!(f, "{date}T{time}Z")
    }
}

impl FromStr for Instant {
    type Err = TemporalError;

    /// Requires a date, a time and a `Z` or numeric offset. A trailing zone
    /// annotation is accepted and ignored.
    fn from_str(s: &str) -> Result<Self> {
        let fail = |reason: String| TemporalError::Conversion {
            input: InputKind::Text,
            target: ValueKind::Instant,
            reason,
        };
        let parsed = parse::parse_date_time(s).map_err(fail)?;
        let d = parsed.date.ok_or_else(|| fail(format!("no date in '{s}'")))?;
        let t = parsed.time.ok_or_else(|| fail(format!("no time in '{s}'")))?;
        let offset = match parsed.offset {
            Some(IsoOffset::Utc) => 0,
            Some(IsoOffset::Fixed(secs)) => secs,
            None => return Err(fail(format!("missing 'Z' or UTC offset in '{s}'"))),
        };
        let date = PlainDate::from_iso(&d).map_err(|e| fail(e.to_string()))?;
        let time = PlainTime::new(t.hour, t.minute, t.second).map_err(|e| fail(e.to_string()))?;
        let naive: NaiveDateTime = date.naive().and_time(time.naive());
        let utc = naive
            .checked_sub_signed(TimeDelta::seconds(i64::from(offset)))
            .ok_or_else(|| fail("out of range".into()))?;
        let inner = Utc.from_utc_datetime(&utc);
        let nanos = i128::from(inner.timestamp()) * NANOS_PER_SECOND + i128::from(t.nanosecond);
        Self::from_epoch_nanoseconds(nanos).map_err(|e| fail(e.to_string()))
    }
}
