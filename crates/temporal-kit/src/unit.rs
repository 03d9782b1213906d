//! Calendar and clock units, ordered from finest to coarsest.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TemporalError;

pub(crate) const NANOS_PER_MICRO: i128 = 1_000;
pub(crate) const NANOS_PER_MILLI: i128 = 1_000_000;
pub(crate) const NANOS_PER_SECOND: i128 = 1_000_000_000;
pub(crate) const NANOS_PER_MINUTE: i128 = 60 * NANOS_PER_SECOND;
pub(crate) const NANOS_PER_HOUR: i128 = 60 * NANOS_PER_MINUTE;
pub(crate) const NANOS_PER_DAY: i128 = 24 * NANOS_PER_HOUR;

/// A unit of time. `Unit::Year > Unit::Day > Unit::Nanosecond`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Nanosecond,
    Microsecond,
    Millisecond,
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl Unit {
    /// Every unit, finest first.
    pub const ALL: [Unit; 10] = [
        Unit::Nanosecond,
        Unit::Microsecond,
        Unit::Millisecond,
        Unit::Second,
        Unit::Minute,
        Unit::Hour,
        Unit::Day,
        Unit::Week,
        Unit::Month,
        Unit::Year,
    ];

    /// Whether this unit has a variable length that depends on the calendar.
    pub fn is_calendar_unit(self) -> bool {
        self >= Unit::Day
    }

    /// Exact length in nanoseconds of a clock unit. Days count as 24 hours.
    /// Returns `None` for weeks, months and years.
    pub(crate) fn nanos(self) -> Option<i128> {
        match self {
            Unit::Nanosecond => Some(1),
            Unit::Microsecond => Some(NANOS_PER_MICRO),
            Unit::Millisecond => Some(NANOS_PER_MILLI),
            Unit::Second => Some(NANOS_PER_SECOND),
            Unit::Minute => Some(NANOS_PER_MINUTE),
            Unit::Hour => Some(NANOS_PER_HOUR),
            Unit::Day => Some(NANOS_PER_DAY),
            Unit::Week | Unit::Month | Unit::Year => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Unit::Nanosecond => "nanosecond",
            Unit::Microsecond => "microsecond",
            Unit::Millisecond => "millisecond",
            Unit::Second => "second",
            Unit::Minute => "minute",
            Unit::Hour => "hour",
            Unit::Day => "day",
            Unit::Week => "week",
            Unit::Month => "month",
            Unit::Year => "year",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Unit {
    type Err = TemporalError;

    /// Accepts singular or plural unit names, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        match lower.as_str() {
            "ns" => return Ok(Unit::Nanosecond),
            "us" => return Ok(Unit::Microsecond),
            "ms" => return Ok(Unit::Millisecond),
            _ => {}
        }
        let singular = lower.strip_suffix('s').unwrap_or(&lower);
        match singular {
            "nanosecond" => Ok(Unit::Nanosecond),
            "microsecond" => Ok(Unit::Microsecond),
            "millisecond" => Ok(Unit::Millisecond),
            "second" | "sec" => Ok(Unit::Second),
            "minute" | "min" => Ok(Unit::Minute),
            "hour" | "h" => Ok(Unit::Hour),
            "day" | "d" => Ok(Unit::Day),
            "week" | "w" => Ok(Unit::Week),
            "month" => Ok(Unit::Month),
            "year" | "y" => Ok(Unit::Year),
            _ => Err(TemporalError::InvalidUnit(format!("'{s}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_order() {
        assert!(Unit::Year > Unit::Month);
        assert!(Unit::Day > Unit::Hour);
        assert!(Unit::Microsecond > Unit::Nanosecond);
    }

    #[test]
    fn test_unit_parse_plural_and_singular() {
        assert_eq!("days".parse::<Unit>().unwrap(), Unit::Day);
        assert_eq!("Year".parse::<Unit>().unwrap(), Unit::Year);
        assert_eq!("ms".parse::<Unit>().unwrap(), Unit::Millisecond);
        assert!("fortnight".parse::<Unit>().is_err());
    }

    #[test]
    fn test_calendar_units() {
        assert!(Unit::Day.is_calendar_unit());
        assert!(!Unit::Hour.is_calendar_unit());
        assert_eq!(Unit::Week.nanos(), None);
        assert_eq!(Unit::Hour.nanos(), Some(3_600_000_000_000));
    }
}
