//! Signed spans of calendar and clock units.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TemporalError};
use crate::input::InputKind;
use crate::parse;
use crate::unit::{
    Unit, NANOS_PER_DAY, NANOS_PER_HOUR, NANOS_PER_MICRO, NANOS_PER_MILLI, NANOS_PER_MINUTE,
    NANOS_PER_SECOND,
};
use crate::value::ValueKind;

/// Component fields of a duration. Missing fields default to zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DurationFields {
    pub years: i64,
    pub months: i64,
    pub weeks: i64,
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
    pub milliseconds: i64,
    pub microseconds: i64,
    pub nanoseconds: i64,
}

impl DurationFields {
    fn as_array(&self) -> [i64; 10] {
        [
            self.years,
            self.months,
            self.weeks,
            self.days,
            self.hours,
            self.minutes,
            self.seconds,
            self.milliseconds,
            self.microseconds,
            self.nanoseconds,
        ]
    }

    fn from_array(v: [i64; 10]) -> Self {
        DurationFields {
            years: v[0],
            months: v[1],
            weeks: v[2],
            days: v[3],
            hours: v[4],
            minutes: v[5],
            seconds: v[6],
            milliseconds: v[7],
            microseconds: v[8],
            nanoseconds: v[9],
        }
    }
}

/// A span such as `P1Y2M` or `-PT1.5S`.
///
/// Every non-zero component carries the same sign, and the sub-second
/// components are kept within `-999..=999` by carrying into seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Duration {
    fields: DurationFields,
}

impl Duration {
    pub const ZERO: Duration = Duration {
        fields: DurationFields {
            years: 0,
            months: 0,
            weeks: 0,
            days: 0,
            hours: 0,
            minutes: 0,
            seconds: 0,
            milliseconds: 0,
            microseconds: 0,
            nanoseconds: 0,
        },
    };

    /// Build a duration from its fields.
    ///
    /// # Errors
    ///
    /// Fails with a validation error on field `sign` when components have
    /// different signs, and with an overflow error when a component is
    /// `i64::MIN`, which has no positive counterpart.
    pub fn from_fields(fields: DurationFields) -> Result<Self> {
        let values = fields.as_array();
        if values.contains(&i64::MIN) {
            return Err(TemporalError::overflow("duration component cannot be negated"));
        }
        if values.iter().any(|v| *v > 0) && values.iter().any(|v| *v < 0) {
            return Err(TemporalError::validation(
                "sign",
                "all non-zero duration components must share one sign",
            ));
        }

        let sub = i128::from(fields.milliseconds) * NANOS_PER_MILLI
            + i128::from(fields.microseconds) * NANOS_PER_MICRO
            + i128::from(fields.nanoseconds);
        let carry = i64::try_from(sub / NANOS_PER_SECOND)
            .map_err(|_| TemporalError::overflow("duration sub-second fields"))?;
        let rem = sub % NANOS_PER_SECOND;
        let seconds = fields
            .seconds
            .checked_add(carry)
            .ok_or_else(|| TemporalError::overflow("duration seconds"))?;

        Ok(Duration {
            fields: DurationFields {
                seconds,
                milliseconds: (rem / NANOS_PER_MILLI) as i64,
                microseconds: ((rem / NANOS_PER_MICRO) % 1_000) as i64,
                nanoseconds: (rem % 1_000) as i64,
                ..fields
            },
        })
    }

    /// One component, saturated to `-i64::MAX..=i64::MAX`.
    fn single(fields: DurationFields) -> Self {
        let fields = DurationFields::from_array(fields.as_array().map(|v| v.max(-i64::MAX)));
        // A single component always has one sign; only the sub-second carry remains.
        Self::from_fields(fields).unwrap_or(Duration { fields })
    }

    pub fn years(n: i64) -> Self {
        Self::single(DurationFields { years: n, ..Default::default() })
    }

    pub fn months(n: i64) -> Self {
        Self::single(DurationFields { months: n, ..Default::default() })
    }

    pub fn weeks(n: i64) -> Self {
        Self::single(DurationFields { weeks: n, ..Default::default() })
    }

    pub fn days(n: i64) -> Self {
        Self::single(DurationFields { days: n, ..Default::default() })
    }

    pub fn hours(n: i64) -> Self {
        Self::single(DurationFields { hours: n, ..Default::default() })
    }

    pub fn minutes(n: i64) -> Self {
        Self::single(DurationFields { minutes: n, ..Default::default() })
    }

    pub fn seconds(n: i64) -> Self {
        Self::single(DurationFields { seconds: n, ..Default::default() })
    }

    pub fn milliseconds(n: i64) -> Self {
        Self::single(DurationFields { milliseconds: n, ..Default::default() })
    }

    /// Calendar components from a difference computation, which share one sign.
    pub(crate) fn from_calendar(years: i64, months: i64, weeks: i64, days: i64) -> Self {
        Duration {
            fields: DurationFields {
                years,
                months,
                weeks,
                days,
                ..Default::default()
            },
        }
    }

    /// Replace the clock components (hours and finer) with those of `clock`.
    pub(crate) fn with_clock(&self, clock: &Duration) -> Self {
        Duration {
            fields: DurationFields {
                hours: clock.fields.hours,
                minutes: clock.fields.minutes,
                seconds: clock.fields.seconds,
                milliseconds: clock.fields.milliseconds,
                microseconds: clock.fields.microseconds,
                nanoseconds: clock.fields.nanoseconds,
                ..self.fields
            },
        }
    }

    /// Split `total` nanoseconds into units from `largest` (capped at days)
    /// down to nanoseconds.
    pub(crate) fn from_nanos_balanced(total: i128, largest: Unit) -> Result<Self> {
        let largest = largest.min(Unit::Day);
        let mut rest = total;
        let mut take = |unit: Unit, size: i128| -> Result<i64> {
            if unit > largest {
                return Ok(0);
            }
            let n = rest / size;
            rest %= size;
            i64::try_from(n)
                .ok()
                .filter(|n| *n != i64::MIN)
                .ok_or_else(|| TemporalError::overflow(format!("{total} ns as {unit}s")))
        };
        let days = take(Unit::Day, NANOS_PER_DAY)?;
        let hours = take(Unit::Hour, NANOS_PER_HOUR)?;
        let minutes = take(Unit::Minute, NANOS_PER_MINUTE)?;
        let seconds = take(Unit::Second, NANOS_PER_SECOND)?;
        let milliseconds = take(Unit::Millisecond, NANOS_PER_MILLI)?;
        let microseconds = take(Unit::Microsecond, NANOS_PER_MICRO)?;
        let nanoseconds = take(Unit::Nanosecond, 1)?;
        Ok(Duration {
            fields: DurationFields {
                days,
                hours,
                minutes,
                seconds,
                milliseconds,
                microseconds,
                nanoseconds,
                ..Default::default()
            },
        })
    }

    pub fn fields(&self) -> DurationFields {
        self.fields
    }

    pub fn get_years(&self) -> i64 {
        self.fields.years
    }

    pub fn get_months(&self) -> i64 {
        self.fields.months
    }

    pub fn get_weeks(&self) -> i64 {
        self.fields.weeks
    }

    pub fn get_days(&self) -> i64 {
        self.fields.days
    }

    pub fn get_hours(&self) -> i64 {
        self.fields.hours
    }

    pub fn get_minutes(&self) -> i64 {
        self.fields.minutes
    }

    pub fn get_seconds(&self) -> i64 {
        self.fields.seconds
    }

    pub fn get_milliseconds(&self) -> i64 {
        self.fields.milliseconds
    }

    pub fn get_microseconds(&self) -> i64 {
        self.fields.microseconds
    }

    pub fn get_nanoseconds(&self) -> i64 {
        self.fields.nanoseconds
    }

    /// -1, 0 or 1.
    pub fn sign(&self) -> i32 {
        self.fields
            .as_array()
            .iter()
            .find(|v| **v != 0)
            .map_or(0, |v| v.signum() as i32)
    }

    pub fn is_zero(&self) -> bool {
        self.sign() == 0
    }

    /// Constructors never store `i64::MIN`, so negation is exact.
    pub fn negated(&self) -> Self {
        let f = self.fields;
        Duration {
            fields: DurationFields {
                years: f.years.saturating_neg(),
                months: f.months.saturating_neg(),
                weeks: f.weeks.saturating_neg(),
                days: f.days.saturating_neg(),
                hours: f.hours.saturating_neg(),
                minutes: f.minutes.saturating_neg(),
                seconds: f.seconds.saturating_neg(),
                milliseconds: f.milliseconds.saturating_neg(),
                microseconds: f.microseconds.saturating_neg(),
                nanoseconds: f.nanoseconds.saturating_neg(),
            },
        }
    }

    pub fn abs(&self) -> Self {
        if self.sign() < 0 {
            self.negated()
        } else {
            *self
        }
    }

    /// Whether any of years, months or weeks is non-zero. These units have
    /// no fixed length without a starting date.
    pub fn has_calendar_units(&self) -> bool {
        self.fields.years != 0 || self.fields.months != 0 || self.fields.weeks != 0
    }

    /// Whether any of years, months, weeks or days is non-zero.
    pub fn has_date_units(&self) -> bool {
        self.has_calendar_units() || self.fields.days != 0
    }

    /// Hours and finer units as nanoseconds. Days are not included.
    pub(crate) fn time_nanos(&self) -> i128 {
        let f = &self.fields;
        i128::from(f.hours) * NANOS_PER_HOUR
            + i128::from(f.minutes) * NANOS_PER_MINUTE
            + i128::from(f.seconds) * NANOS_PER_SECOND
            + i128::from(f.milliseconds) * NANOS_PER_MILLI
            + i128::from(f.microseconds) * NANOS_PER_MICRO
            + i128::from(f.nanoseconds)
    }

    /// Exact length in nanoseconds, counting days as 24 hours.
    pub fn total_nanoseconds(&self) -> Result<i128> {
        if self.has_calendar_units() {
            return Err(TemporalError::InvalidUnit(format!(
                "{self} has years, months or weeks and no fixed length"
            )));
        }
        Ok(i128::from(self.fields.days) * NANOS_PER_DAY + self.time_nanos())
    }

    /// Normalize carries among days and clock units up to `largest`.
    /// Years, months and weeks are left as they are.
    ///
    /// ```
    /// use temporal_kit::{Duration, Unit};
    ///
    /// let d = Duration::minutes(135).balance(Unit::Hour).unwrap();
    /// assert_eq!((d.get_hours(), d.get_minutes()), (2, 15));
    /// ```
    pub fn balance(&self, largest: Unit) -> Result<Self> {
        let total = i128::from(self.fields.days) * NANOS_PER_DAY + self.time_nanos();
        let clock = Self::from_nanos_balanced(total, largest)?;
        Ok(Duration {
            fields: DurationFields {
                years: self.fields.years,
                months: self.fields.months,
                weeks: self.fields.weeks,
                ..clock.fields
            },
        })
    }

    /// The component stored for `unit`.
    pub fn get(&self, unit: Unit) -> i64 {
        let f = &self.fields;
        match unit {
            Unit::Year => f.years,
            Unit::Month => f.months,
            Unit::Week => f.weeks,
            Unit::Day => f.days,
            Unit::Hour => f.hours,
            Unit::Minute => f.minutes,
            Unit::Second => f.seconds,
            Unit::Millisecond => f.milliseconds,
            Unit::Microsecond => f.microseconds,
            Unit::Nanosecond => f.nanoseconds,
        }
    }

    /// Coarsest unit with a non-zero component, or `None` for a zero duration.
    pub fn largest_unit(&self) -> Option<Unit> {
        Unit::ALL
            .iter()
            .rev()
            .copied()
            .find(|unit| self.get(*unit) != 0)
    }

    /// Order two durations by their balanced fields, coarsest first.
    ///
    /// Days count as 24 hours, so `P1D` and `PT24H` compare equal.
    pub fn compare(&self, other: &Duration) -> Ordering {
        let key = |d: &Duration| d.balance(Unit::Day).unwrap_or(*d).fields.as_array();
        key(self).cmp(&key(other))
    }
}

impl TryFrom<DurationFields> for Duration {
    type Error = TemporalError;

    fn try_from(fields: DurationFields) -> Result<Self> {
        Duration::from_fields(fields)
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let abs = self.abs().fields;
        if self.sign() < 0 {
            f.write_str("-")?;
        }
        f.write_str("P")?;
        for (value, designator) in [
            (abs.years, 'Y'),
            (abs.months, 'M'),
            (abs.weeks, 'W'),
            (abs.days, 'D'),
        ] {
            if value != 0 {
                write!(f, "{value}{designator}")?;
            }
        }

        let sub = (abs.milliseconds * 1_000_000 + abs.microseconds * 1_000 + abs.nanoseconds) as u32;
        let has_seconds = abs.seconds != 0 || sub != 0;
        if abs.hours != 0 || abs.minutes != 0 || has_seconds {
            f.write_str("T")?;
            if abs.hours != 0 {
                write!(f, "{}H", abs.hours)?;
            }
            if abs.minutes != 0 {
                write!(f, "{}M", abs.minutes)?;
            }
            if has_seconds {
                write!(f, "{}{}S", abs.seconds, parse::fraction_suffix(sub))?;
            }
        } else if self.is_zero() {
            f.write_str("T0S")?;
        }
        Ok(())
    }
}

impl FromStr for Duration {
    type Err = TemporalError;

    fn from_str(s: &str) -> Result<Self> {
        let fail = |reason: String| TemporalError::Conversion {
            input: InputKind::Text,
            target: ValueKind::Duration,
            reason,
        };
        let p = parse::parse_duration(s).map_err(fail)?;
        Duration::from_fields(DurationFields {
            years: p.years,
            months: p.months,
            weeks: p.weeks,
            days: p.days,
            hours: p.hours,
            minutes: p.minutes,
            seconds: p.seconds,
            milliseconds: p.nanoseconds / 1_000_000,
            microseconds: (p.nanoseconds / 1_000) % 1_000,
            nanoseconds: p.nanoseconds % 1_000,
        })
        .map_err(|e| fail(e.to_string()))
    }
}
