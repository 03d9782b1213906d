//! The six canonical value kinds as one tagged union.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::date::PlainDate;
use crate::datetime::PlainDateTime;
use crate::duration::Duration;
use crate::error::{Result, TemporalError};
use crate::instant::Instant;
use crate::time::PlainTime;
use crate::unit::Unit;
use crate::zoned::ZonedDateTime;

/// Which canonical type a value is, or should be converted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValueKind {
    PlainDate,
    PlainTime,
    PlainDateTime,
    ZonedDateTime,
    Instant,
    Duration,
}

impl ValueKind {
    pub const ALL: [ValueKind; 6] = [
        ValueKind::PlainDate,
        ValueKind::PlainTime,
        ValueKind::PlainDateTime,
        ValueKind::ZonedDateTime,
        ValueKind::Instant,
        ValueKind::Duration,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ValueKind::PlainDate => "PlainDate",
            ValueKind::PlainTime => "PlainTime",
            ValueKind::PlainDateTime => "PlainDateTime",
            ValueKind::ZonedDateTime => "ZonedDateTime",
            ValueKind::Instant => "Instant",
            ValueKind::Duration => "Duration",
        }
    }

    /// Largest unit used when a difference is requested without one.
    pub fn default_largest_unit(self) -> Unit {
        match self {
            ValueKind::PlainDate | ValueKind::PlainDateTime => Unit::Day,
            ValueKind::PlainTime | ValueKind::ZonedDateTime => Unit::Hour,
            ValueKind::Instant | ValueKind::Duration => Unit::Second,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValueKind {
    type Err = TemporalError;

    /// Accepts `PlainDate`, `plain-date`, `plain_date` and the short forms
    /// `date`, `time`, `datetime`, `zoned`.
    fn from_str(s: &str) -> Result<Self> {
        let key: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "plaindate" | "date" => Ok(ValueKind::PlainDate),
            "plaintime" | "time" => Ok(ValueKind::PlainTime),
            "plaindatetime" | "datetime" => Ok(ValueKind::PlainDateTime),
            "zoneddatetime" | "zoned" => Ok(ValueKind::ZonedDateTime),
            "instant" => Ok(ValueKind::Instant),
            "duration" => Ok(ValueKind::Duration),
            _ => Err(TemporalError::Unsupported(format!("unknown value kind '{s}'"))),
        }
    }
}

/// A canonical temporal value of any kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum TemporalValue {
    PlainDate(PlainDate),
    PlainTime(PlainTime),
    PlainDateTime(PlainDateTime),
    ZonedDateTime(ZonedDateTime),
    Instant(Instant),
    Duration(Duration),
}

impl TemporalValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            TemporalValue::PlainDate(_) => ValueKind::PlainDate,
            TemporalValue::PlainTime(_) => ValueKind::PlainTime,
            TemporalValue::PlainDateTime(_) => ValueKind::PlainDateTime,
            TemporalValue::ZonedDateTime(_) => ValueKind::ZonedDateTime,
            TemporalValue::Instant(_) => ValueKind::Instant,
            TemporalValue::Duration(_) => ValueKind::Duration,
        }
    }

    /// Parse `s` with the canonical grammar of `kind`.
    pub fn parse(s: &str, kind: ValueKind) -> Result<Self> {
        Ok(match kind {
            ValueKind::PlainDate => TemporalValue::PlainDate(s.parse()?),
            ValueKind::PlainTime => TemporalValue::PlainTime(s.parse()?),
            ValueKind::PlainDateTime => TemporalValue::PlainDateTime(s.parse()?),
            ValueKind::ZonedDateTime => TemporalValue::ZonedDateTime(s.parse()?),
            ValueKind::Instant => TemporalValue::Instant(s.parse()?),
            ValueKind::Duration => TemporalValue::Duration(s.parse()?),
        })
    }

    /// Order two values of the same kind; `None` when the kinds differ.
    ///
    /// Zoned values are ordered by their instant, whatever their zones.
    pub fn try_compare(&self, other: &TemporalValue) -> Option<Ordering> {
        match (self, other) {
            (TemporalValue::PlainDate(a), TemporalValue::PlainDate(b)) => Some(a.cmp(b)),
            (TemporalValue::PlainTime(a), TemporalValue::PlainTime(b)) => Some(a.cmp(b)),
            (TemporalValue::PlainDateTime(a), TemporalValue::PlainDateTime(b)) => Some(a.cmp(b)),
            (TemporalValue::ZonedDateTime(a), TemporalValue::ZonedDateTime(b)) => {
                Some(ZonedDateTime::compare_instant(a, b))
            }
            (TemporalValue::Instant(a), TemporalValue::Instant(b)) => Some(a.cmp(b)),
            (TemporalValue::Duration(a), TemporalValue::Duration(b)) => Some(a.compare(b)),
            _ => None,
        }
    }

    /// Order two values of the same kind.
    ///
    /// # Panics
    ///
    /// Panics when the kinds differ. Use [`TemporalValue::try_compare`] or
    /// convert both sides to one kind first.
    pub fn compare(&self, other: &TemporalValue) -> Ordering {
        match self.try_compare(other) {
            Some(ordering) => ordering,
            None => panic!("cannot compare {} with {}", self.kind(), other.kind()),
        }
    }
}

impl fmt::Display for TemporalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemporalValue::PlainDate(v) => fmt::Display::fmt(v, f),
            TemporalValue::PlainTime(v) => fmt::Display::fmt(v, f),
            TemporalValue::PlainDateTime(v) => fmt::Display::fmt(v, f),
            TemporalValue::ZonedDateTime(v) => fmt::Display::fmt(v, f),
            TemporalValue::Instant(v) => fmt::Display::fmt(v, f),
            TemporalValue::Duration(v) => fmt::Display::fmt(v, f),
        }
    }
}

macro_rules! impl_from_value {
    ($($ty:ident),*) => {
        $(
            impl From<$ty> for TemporalValue {
                fn from(value: $ty) -> Self {
                    TemporalValue::$ty(value)
                }
            }
        )*
    };
}

impl_from_value!(PlainDate, PlainTime, PlainDateTime, ZonedDateTime, Instant, Duration);

/// Values serialize as their canonical ISO strings.
macro_rules! serde_via_string {
    ($($ty:ty),*) => {
        $(
            impl Serialize for $ty {
                fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
                    serializer.collect_str(self)
                }
            }

            impl<'de> Deserialize<'de> for $ty {
                fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
                    let s = String::deserialize(deserializer)?;
                    s.parse().map_err(serde::de::Error::custom)
                }
            }
        )*
    };
}

serde_via_string!(PlainDate, PlainTime, PlainDateTime, ZonedDateTime, Instant, Duration);
