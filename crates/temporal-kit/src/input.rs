//! Source representations accepted by the conversion engine.

use std::fmt;

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::duration::{Duration, DurationFields};
use crate::value::{TemporalValue, ValueKind};

/// Shape of an input, reported in conversion errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputKind {
    Text,
    Native,
    EpochMillis,
    Fields,
    DurationFields,
    Value(ValueKind),
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputKind::Text => f.write_str("string"),
            InputKind::Native => f.write_str("native date-time"),
            InputKind::EpochMillis => f.write_str("epoch milliseconds"),
            InputKind::Fields => f.write_str("date-time fields"),
            InputKind::DurationFields => f.write_str("duration fields"),
            InputKind::Value(kind) => write!(f, "{kind} value"),
        }
    }
}

/// A partial set of date and time fields, e.g. `{year, month, day}`.
///
/// Fields are wide signed integers so that out-of-range input (a negative
/// hour, month 13) reaches validation instead of failing to deserialize.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DateTimeFields {
    pub year: Option<i64>,
    pub month: Option<i64>,
    pub day: Option<i64>,
    pub hour: Option<i64>,
    pub minute: Option<i64>,
    pub second: Option<i64>,
    pub millisecond: Option<i64>,
    pub microsecond: Option<i64>,
    pub nanosecond: Option<i64>,
    pub time_zone: Option<String>,
    pub calendar: Option<String>,
}

impl DateTimeFields {
    pub fn date(year: i64, month: i64, day: i64) -> Self {
        DateTimeFields {
            year: Some(year),
            month: Some(month),
            day: Some(day),
            ..Default::default()
        }
    }

    pub fn with_time(self, hour: i64, minute: i64, second: i64) -> Self {
        DateTimeFields {
            hour: Some(hour),
            minute: Some(minute),
            second: Some(second),
            ..self
        }
    }

    pub fn with_time_zone(self, time_zone: impl Into<String>) -> Self {
        DateTimeFields {
            time_zone: Some(time_zone.into()),
            ..self
        }
    }

    pub(crate) fn has_date(&self) -> bool {
        self.year.is_some() || self.month.is_some() || self.day.is_some()
    }

    pub(crate) fn has_time(&self) -> bool {
        [
            self.hour,
            self.minute,
            self.second,
            self.millisecond,
            self.microsecond,
            self.nanosecond,
        ]
        .iter()
        .any(Option::is_some)
    }
}

/// Any value the conversion engine can normalize.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemporalInput {
    /// Canonical ISO-8601 text.
    Text(String),
    /// A host date-time. Plain targets read its wall-clock fields; exact
    /// targets read the moment it denotes.
    Native(DateTime<FixedOffset>),
    /// Milliseconds since 1970-01-01T00:00Z.
    EpochMillis(i64),
    Fields(DateTimeFields),
    DurationFields(DurationFields),
    Value(TemporalValue),
}

impl TemporalInput {
    pub fn kind(&self) -> InputKind {
        match self {
            TemporalInput::Text(_) => InputKind::Text,
            TemporalInput::Native(_) => InputKind::Native,
            TemporalInput::EpochMillis(_) => InputKind::EpochMillis,
            TemporalInput::Fields(_) => InputKind::Fields,
            TemporalInput::DurationFields(_) => InputKind::DurationFields,
            TemporalInput::Value(v) => InputKind::Value(v.kind()),
        }
    }
}

impl From<&str> for TemporalInput {
    fn from(value: &str) -> Self {
        TemporalInput::Text(value.to_string())
    }
}

impl From<String> for TemporalInput {
    fn from(value: String) -> Self {
        TemporalInput::Text(value)
    }
}

impl From<&String> for TemporalInput {
    fn from(value: &String) -> Self {
        TemporalInput::Text(value.clone())
    }
}

impl From<i64> for TemporalInput {
    fn from(value: i64) -> Self {
        TemporalInput::EpochMillis(value)
    }
}

impl From<DateTime<FixedOffset>> for TemporalInput {
    fn from(value: DateTime<FixedOffset>) -> Self {
        TemporalInput::Native(value)
    }
}

impl From<DateTime<Utc>> for TemporalInput {
    fn from(value: DateTime<Utc>) -> Self {
        TemporalInput::Native(value.fixed_offset())
    }
}

impl From<DateTimeFields> for TemporalInput {
    fn from(value: DateTimeFields) -> Self {
        TemporalInput::Fields(value)
    }
}

impl From<DurationFields> for TemporalInput {
    fn from(value: DurationFields) -> Self {
        TemporalInput::DurationFields(value)
    }
}

impl From<TemporalValue> for TemporalInput {
    fn from(value: TemporalValue) -> Self {
        TemporalInput::Value(value)
    }
}

impl From<&TemporalValue> for TemporalInput {
    fn from(value: &TemporalValue) -> Self {
        TemporalInput::Value(*value)
    }
}

macro_rules! impl_from_canonical {
    ($($ty:ident),*) => {
        $(
            impl From<crate::$ty> for TemporalInput {
                fn from(value: crate::$ty) -> Self {
                    TemporalInput::Value(value.into())
                }
            }
        )*
    };
}

impl_from_canonical!(PlainDate, PlainTime, PlainDateTime, ZonedDateTime, Instant);

impl From<Duration> for TemporalInput {
    fn from(value: Duration) -> Self {
        TemporalInput::Value(value.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_input_kinds() {
        assert_eq!(TemporalInput::from("2023-12-25").kind(), InputKind::Text);
        assert_eq!(TemporalInput::from(0_i64).kind(), InputKind::EpochMillis);
        let native = FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2023, 12, 25, 10, 0, 0)
            .unwrap();
        assert_eq!(TemporalInput::from(native).kind(), InputKind::Native);
        assert_eq!(
            TemporalInput::from(Duration::days(1)).kind(),
            InputKind::Value(ValueKind::Duration)
        );
    }

    #[test]
    fn test_fields_deserialize_camel_case() {
        let fields: DateTimeFields =
            serde_json::from_str(r#"{"year":2024,"month":2,"day":29,"timeZone":"Europe/Paris"}"#)
                .unwrap();
        assert_eq!(fields.year, Some(2024));
        assert_eq!(fields.time_zone.as_deref(), Some("Europe/Paris"));
        assert!(fields.has_date());
        assert!(!fields.has_time());
    }

    #[test]
    fn test_input_kind_display() {
        assert_eq!(InputKind::Value(ValueKind::Instant).to_string(), "Instant value");
        assert_eq!(InputKind::Text.to_string(), "string");
    }
}
