//! Normalization of heterogeneous input into canonical values.
//!
//! Host date-times are read two ways on purpose. Plain targets take the
//! wall-clock fields ("what the calendar page says"), while `Instant` and
//! `ZonedDateTime` take the moment the value denotes. A native value of
//! `2023-12-25T23:30+05:00` therefore becomes the plain date `2023-12-25`
//! but the instant `2023-12-25T18:30Z`.
//!
//! Epoch milliseconds are projected through the configured default time
//! zone and then follow the native path.

use std::borrow::Cow;

use chrono::{DateTime, FixedOffset};

use crate::calendar::CalendarId;
use crate::config::TemporalConfig;
use crate::date::PlainDate;
use crate::datetime::PlainDateTime;
use crate::duration::Duration;
use crate::error::{Result, TemporalError};
use crate::input::{DateTimeFields, InputKind, TemporalInput};
use crate::instant::Instant;
use crate::parse;
use crate::time::PlainTime;
use crate::unit::Unit;
use crate::value::{TemporalValue, ValueKind};
use crate::zoned::{Disambiguation, ZonedDateTime};

/// Conversion against one configuration snapshot.
///
/// The snapshot supplies the default time zone for epoch milliseconds and
/// zoned targets, and the default calendar stamped on zoned results.
///
/// ```
/// use temporal_kit::{Converter, TemporalConfig, TemporalInput};
///
/// let config = TemporalConfig::default();
/// let converter = Converter::new(&config);
/// let date = converter.to_plain_date(&TemporalInput::from("2023-12-25T14:30")).unwrap();
/// assert_eq!(date.to_string(), "2023-12-25");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Converter<'a> {
    config: &'a TemporalConfig,
}

impl<'a> Converter<'a> {
    pub fn new(config: &'a TemporalConfig) -> Self {
        Converter { config }
    }

    /// Convert `input` to a value of `kind`.
    ///
    /// # Errors
    ///
    /// Every failure is a [`TemporalError::Conversion`] naming the input
    /// shape and the target kind: malformed text, out-of-range fields, an
    /// unknown zone, or a shape that cannot represent `kind` (a date widened
    /// to a date-time, a time narrowed to a date).
    pub fn convert(&self, input: &TemporalInput, kind: ValueKind) -> Result<TemporalValue> {
        Ok(match kind {
            ValueKind::PlainDate => self.to_plain_date(input)?.into(),
            ValueKind::PlainTime => self.to_plain_time(input)?.into(),
            ValueKind::PlainDateTime => self.to_plain_date_time(input)?.into(),
            ValueKind::ZonedDateTime => self.to_zoned_date_time(input, None)?.into(),
            ValueKind::Instant => self.to_instant(input)?.into(),
            ValueKind::Duration => self.to_duration(input)?.into(),
        })
    }

    /// Narrow `input` to its calendar date.
    ///
    /// Native date-times give their wall-clock date; a dropped time part must
    /// still be a valid time of day.
    ///
    /// # Errors
    ///
    /// As for [`Converter::convert`].
    pub fn to_plain_date(&self, input: &TemporalInput) -> Result<PlainDate> {
        let target = ValueKind::PlainDate;
        let result = self.via_native(input).and_then(|input| match input.as_ref() {
            TemporalInput::Text(s) => s.parse(),
            TemporalInput::Native(dt) => Ok(PlainDate::from_naive(dt.naive_local().date())),
            TemporalInput::Fields(fields) => fields_date(fields),
            TemporalInput::Value(TemporalValue::PlainDate(v)) => Ok(*v),
            TemporalInput::Value(TemporalValue::PlainDateTime(v)) => Ok(v.to_plain_date()),
            TemporalInput::Value(TemporalValue::ZonedDateTime(v)) => Ok(v.to_plain_date()),
            _ => Err(unsupported()),
        });
        result.map_err(wrap(input.kind(), target))
    }

    /// Narrow `input` to its wall-clock time.
    ///
    /// # Errors
    ///
    /// As for [`Converter::convert`]; field records need at least one time
    /// field.
    pub fn to_plain_time(&self, input: &TemporalInput) -> Result<PlainTime> {
        let target = ValueKind::PlainTime;
        let result = self.via_native(input).and_then(|input| match input.as_ref() {
            TemporalInput::Text(s) => s.parse(),
            TemporalInput::Native(dt) => Ok(PlainTime::from_naive(dt.naive_local().time())),
            TemporalInput::Fields(fields) => {
                if !fields.has_time() {
                    return Err(TemporalError::validation("hour", "no time fields given"));
                }
                fields_time(fields)
            }
            TemporalInput::Value(TemporalValue::PlainTime(v)) => Ok(*v),
            TemporalInput::Value(TemporalValue::PlainDateTime(v)) => Ok(v.to_plain_time()),
            TemporalInput::Value(TemporalValue::ZonedDateTime(v)) => Ok(v.to_plain_time()),
            _ => Err(unsupported()),
        });
        result.map_err(wrap(input.kind(), target))
    }

    /// Read `input` as a wall-clock date and time. A date alone gives
    /// midnight; a time alone is rejected.
    ///
    /// # Errors
    ///
    /// As for [`Converter::convert`].
    pub fn to_plain_date_time(&self, input: &TemporalInput) -> Result<PlainDateTime> {
        let target = ValueKind::PlainDateTime;
        let result = self.via_native(input).and_then(|input| match input.as_ref() {
            TemporalInput::Text(s) => s.parse(),
            TemporalInput::Native(dt) => Ok(PlainDateTime::from_naive(dt.naive_local())),
            TemporalInput::Fields(fields) => fields_date_time(fields),
            TemporalInput::Value(TemporalValue::PlainDateTime(v)) => Ok(*v),
            TemporalInput::Value(TemporalValue::ZonedDateTime(v)) => Ok(v.to_plain_date_time()),
            _ => Err(unsupported()),
        });
        result.map_err(wrap(input.kind(), target))
    }

    /// Convert to a zoned value in `time_zone`, or in the configured default
    /// zone when `None`.
    ///
    /// Text carrying its own `[Zone]` keeps that zone unless `time_zone` is
    /// given, in which case the instant is re-projected. Wall-clock readings
    /// that fall in a gap or fold resolve with
    /// [`Disambiguation::Compatible`].
    ///
    /// # Errors
    ///
    /// As for [`Converter::convert`], including an unknown `time_zone`.
    ///
    /// # Examples
    ///
    /// ```
    /// use temporal_kit::{Converter, TemporalConfig, TemporalInput};
    ///
    /// let config = TemporalConfig::default();
    /// let converter = Converter::new(&config);
    /// let input = TemporalInput::from("2024-01-01T12:00:00Z");
    /// let tokyo = converter.to_zoned_date_time(&input, Some("Asia/Tokyo")).unwrap();
    /// assert_eq!(tokyo.to_string(), "2024-01-01T21:00:00+09:00[Asia/Tokyo]");
    /// ```
    pub fn to_zoned_date_time(
        &self,
        input: &TemporalInput,
        time_zone: Option<&str>,
    ) -> Result<ZonedDateTime> {
        let target = ValueKind::ZonedDateTime;
        let zone = time_zone.unwrap_or(&self.config.default_time_zone);
        let calendar = self.config.default_calendar;
        let result = match input {
            TemporalInput::Text(s) => self.text_to_zoned(s, time_zone, zone),
            TemporalInput::Native(dt) => {
                ZonedDateTime::from_instant(&Instant::from(*dt), zone).map(|z| z.with_calendar(calendar))
            }
            TemporalInput::EpochMillis(ms) => Instant::from_epoch_milliseconds(*ms)
                .and_then(|i| ZonedDateTime::from_instant(&i, zone))
                .map(|z| z.with_calendar(calendar)),
            TemporalInput::Fields(fields) => {
                let zone = time_zone.or(fields.time_zone.as_deref()).unwrap_or(zone);
                let calendar = match &fields.calendar {
                    Some(c) => c.parse::<CalendarId>(),
                    None => Ok(calendar),
                };
                calendar.and_then(|calendar| {
                    let plain = fields_date_time(fields)?;
                    ZonedDateTime::from_plain(&plain, zone, Disambiguation::Compatible)
                        .map(|z| z.with_calendar(calendar))
                })
            }
            TemporalInput::Value(TemporalValue::ZonedDateTime(v)) => match time_zone {
                Some(zone) => v.with_time_zone(zone),
                None => Ok(*v),
            },
            TemporalInput::Value(TemporalValue::Instant(v)) => {
                ZonedDateTime::from_instant(v, zone).map(|z| z.with_calendar(calendar))
            }
            TemporalInput::Value(TemporalValue::PlainDateTime(v)) => {
                ZonedDateTime::from_plain(v, zone, Disambiguation::Compatible)
                    .map(|z| z.with_calendar(calendar))
            }
            _ => Err(unsupported()),
        };
        result.map_err(wrap(input.kind(), target))
    }

    fn text_to_zoned(&self, s: &str, explicit: Option<&str>, zone: &str) -> Result<ZonedDateTime> {
        let calendar = self.config.default_calendar;
        let parsed = parse::parse_date_time(s).map_err(|reason| TemporalError::Conversion {
            input: InputKind::Text,
            target: ValueKind::ZonedDateTime,
            reason,
        })?;
        if parsed.zone.is_some() {
            let zoned: ZonedDateTime = s.parse()?;
            return match explicit {
                Some(zone) => zoned.with_time_zone(zone),
                None => Ok(zoned),
            };
        }
        if parsed.offset.is_some() {
            let instant: Instant = s.parse()?;
            return ZonedDateTime::from_instant(&instant, zone).map(|z| z.with_calendar(calendar));
        }
        let plain: PlainDateTime = s.parse()?;
        ZonedDateTime::from_plain(&plain, zone, Disambiguation::Compatible)
            .map(|z| z.with_calendar(calendar))
    }

    /// Read `input` as an exact moment. Text needs a `Z`, an offset or a
    /// `[Zone]`; plain values are rejected.
    ///
    /// # Errors
    ///
    /// As for [`Converter::convert`].
    pub fn to_instant(&self, input: &TemporalInput) -> Result<Instant> {
        let target = ValueKind::Instant;
        let result = match input {
            TemporalInput::Text(s) => {
                let annotated_without_offset = parse::parse_date_time(s)
                    .map(|p| p.zone.is_some() && p.offset.is_none())
                    .unwrap_or(false);
                if annotated_without_offset {
                    s.parse::<ZonedDateTime>().map(|z| z.to_instant())
                } else {
                    s.parse()
                }
            }
            TemporalInput::Native(dt) => Ok(Instant::from(*dt)),
            TemporalInput::EpochMillis(ms) => Instant::from_epoch_milliseconds(*ms),
            TemporalInput::Fields(_) => self.to_zoned_date_time(input, None).map(|z| z.to_instant()),
            TemporalInput::Value(TemporalValue::Instant(v)) => Ok(*v),
            TemporalInput::Value(TemporalValue::ZonedDateTime(v)) => Ok(v.to_instant()),
            _ => Err(unsupported()),
        };
        result.map_err(wrap(input.kind(), target))
    }

    /// Numbers are read as a length in milliseconds.
    ///
    /// # Errors
    ///
    /// As for [`Converter::convert`].
    pub fn to_duration(&self, input: &TemporalInput) -> Result<Duration> {
        let target = ValueKind::Duration;
        let result = match input {
            TemporalInput::Text(s) => s.parse(),
            TemporalInput::EpochMillis(ms) => Duration::milliseconds(*ms).balance(Unit::Hour),
            TemporalInput::DurationFields(fields) => Duration::from_fields(*fields),
            TemporalInput::Value(TemporalValue::Duration(v)) => Ok(*v),
            _ => Err(unsupported()),
        };
        result.map_err(wrap(input.kind(), target))
    }

    /// Replace epoch milliseconds with the equivalent native value in the
    /// default time zone.
    fn via_native<'i>(&self, input: &'i TemporalInput) -> Result<Cow<'i, TemporalInput>> {
        match input {
            TemporalInput::EpochMillis(ms) => {
                let native = self.epoch_to_native(*ms)?;
                Ok(Cow::Owned(TemporalInput::Native(native)))
            }
            other => Ok(Cow::Borrowed(other)),
        }
    }

    fn epoch_to_native(&self, millis: i64) -> Result<DateTime<FixedOffset>> {
        let tz = self.config.time_zone()?;
        let instant = Instant::from_epoch_milliseconds(millis)?;
        Ok(instant.utc().with_timezone(&tz).fixed_offset())
    }
}

fn unsupported() -> TemporalError {
    TemporalError::Unsupported("input shape cannot represent this kind".into())
}

/// Report any failure as a conversion error naming both kinds. Errors that
/// already are conversion errors pass through.
fn wrap(input: InputKind, target: ValueKind) -> impl Fn(TemporalError) -> TemporalError {
    move |err| match err {
        err @ TemporalError::Conversion { .. } => err,
        TemporalError::Unsupported(reason) => TemporalError::Conversion {
            input,
            target,
            reason,
        },
        other => TemporalError::Conversion {
            input,
            target,
            reason: other.to_string(),
        },
    }
}

fn narrow<T: TryFrom<i64>>(value: i64, field: &'static str) -> Result<T> {
    T::try_from(value).map_err(|_| TemporalError::validation(field, format!("{value} is out of range")))
}

fn required(value: Option<i64>, field: &'static str) -> Result<i64> {
    value.ok_or_else(|| TemporalError::validation(field, "is required"))
}

fn fields_date(fields: &DateTimeFields) -> Result<PlainDate> {
    if let Some(calendar) = &fields.calendar {
        calendar.parse::<CalendarId>()?;
    }
    // Time fields are dropped but must still be in range.
    if fields.has_time() {
        fields_time(fields)?;
    }
    PlainDate::new(
        narrow(required(fields.year, "year")?, "year")?,
        narrow(required(fields.month, "month")?, "month")?,
        narrow(required(fields.day, "day")?, "day")?,
    )
}

fn fields_time(fields: &DateTimeFields) -> Result<PlainTime> {
    let get = |value: Option<i64>, field| narrow::<u32>(value.unwrap_or(0), field);
    PlainTime::from_fields(
        get(fields.hour, "hour")?,
        get(fields.minute, "minute")?,
        get(fields.second, "second")?,
        get(fields.millisecond, "millisecond")?,
        get(fields.microsecond, "microsecond")?,
        get(fields.nanosecond, "nanosecond")?,
    )
}

fn fields_date_time(fields: &DateTimeFields) -> Result<PlainDateTime> {
    Ok(PlainDateTime::new(fields_date(fields)?, fields_time(fields)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn config() -> TemporalConfig {
        TemporalConfig::default()
    }

    fn native(offset_secs: i32, y: i32, mo: u32, d: u32, h: u32, mi: u32) -> TemporalInput {
        let dt = FixedOffset::east_opt(offset_secs)
            .unwrap()
            .with_ymd_and_hms(y, mo, d, h, mi, 0)
            .unwrap();
        TemporalInput::Native(dt)
    }

    #[test]
    fn test_string_to_each_kind() {
        let c = config();
        let conv = Converter::new(&c);
        let date = conv.to_plain_date(&"2023-12-25".into()).unwrap();
        assert_eq!((date.year(), date.month(), date.day()), (2023, 12, 25));
        assert_eq!(conv.to_plain_time(&"14:30:45".into()).unwrap().to_string(), "14:30:45");
        assert_eq!(
            conv.to_plain_date_time(&"2023-12-25 14:30".into()).unwrap().to_string(),
            "2023-12-25T14:30:00"
        );
        assert_eq!(
            conv.to_instant(&"2023-12-25T14:30:00Z".into()).unwrap().to_string(),
            "2023-12-25T14:30:00Z"
        );
        assert_eq!(conv.to_duration(&"P1Y2M".into()).unwrap().to_string(), "P1Y2M");
    }

    #[test]
    fn test_native_is_wall_clock_for_plain_and_exact_for_instant() {
        let c = config();
        let conv = Converter::new(&c);
        let input = native(5 * 3600, 2023, 12, 25, 23, 30);
        assert_eq!(conv.to_plain_date(&input).unwrap().to_string(), "2023-12-25");
        assert_eq!(conv.to_plain_time(&input).unwrap().to_string(), "23:30:00");
        assert_eq!(conv.to_instant(&input).unwrap().to_string(), "2023-12-25T18:30:00Z");
        let zoned = conv.to_zoned_date_time(&input, None).unwrap();
        assert_eq!(zoned.to_string(), "2023-12-25T18:30:00+00:00[UTC]");
    }

    #[test]
    fn test_epoch_millis_follow_default_zone() {
        let c = TemporalConfig {
            default_time_zone: "America/New_York".into(),
            ..TemporalConfig::default()
        };
        let conv = Converter::new(&c);
        // 2023-12-26T02:00:00Z is still the 25th in New York.
        let input = TemporalInput::EpochMillis(1_703_556_000_000);
        assert_eq!(conv.to_plain_date(&input).unwrap().to_string(), "2023-12-25");
        assert_eq!(conv.to_instant(&input).unwrap().to_string(), "2023-12-26T02:00:00Z");
    }

    #[test]
    fn test_epoch_millis_as_duration() {
        let c = config();
        let conv = Converter::new(&c);
        let d = conv.to_duration(&TemporalInput::EpochMillis(5_400_500)).unwrap();
        assert_eq!(d.to_string(), "PT1H30M0.5S");
    }

    #[test]
    fn test_fields() {
        let c = config();
        let conv = Converter::new(&c);
        let fields = DateTimeFields::date(2024, 2, 29);
        assert_eq!(conv.to_plain_date(&fields.clone().into()).unwrap().to_string(), "2024-02-29");
        assert_eq!(
            conv.to_plain_date_time(&fields.into()).unwrap().to_string(),
            "2024-02-29T00:00:00"
        );

        let err = conv.to_plain_date(&DateTimeFields::date(2023, 2, 29).into()).unwrap_err();
        assert!(matches!(
            err,
            TemporalError::Conversion {
                input: InputKind::Fields,
                target: ValueKind::PlainDate,
                ..
            }
        ));

        let negative_hour = DateTimeFields::date(2024, 1, 1).with_time(-1, 0, 0);
        assert!(conv.to_plain_date_time(&negative_hour.into()).is_err());
    }

    #[test]
    fn test_narrowing_checks_dropped_fields() {
        let c = config();
        let conv = Converter::new(&c);
        let bad_hour = DateTimeFields {
            hour: Some(99),
            ..DateTimeFields::date(2023, 12, 25)
        };
        let err = conv.to_plain_date(&bad_hour.into()).unwrap_err();
        assert!(matches!(err, TemporalError::Conversion { target: ValueKind::PlainDate, .. }));
        assert!(err.to_string().contains("hour"));

        let good = DateTimeFields::date(2023, 12, 25).with_time(23, 59, 59);
        assert_eq!(conv.to_plain_date(&good.into()).unwrap().to_string(), "2023-12-25");

        assert!(conv.to_plain_date(&"2023-12-25T99:99:99".into()).is_err());
        assert!(conv.to_plain_time(&"2023-02-30T10:00".into()).is_err());
    }

    #[test]
    fn test_fields_to_zoned_uses_field_zone() {
        let c = config();
        let conv = Converter::new(&c);
        let fields = DateTimeFields::date(2023, 12, 25)
            .with_time(9, 0, 0)
            .with_time_zone("Europe/Paris");
        let zoned = conv.to_zoned_date_time(&fields.into(), None).unwrap();
        assert_eq!(zoned.to_string(), "2023-12-25T09:00:00+01:00[Europe/Paris]");
    }

    #[test]
    fn test_narrowing_values() {
        let c = config();
        let conv = Converter::new(&c);
        let zoned: ZonedDateTime = "2023-12-25T14:30:00-05:00[America/New_York]".parse().unwrap();
        let input = TemporalInput::from(zoned);
        assert_eq!(conv.to_plain_date(&input).unwrap().to_string(), "2023-12-25");
        assert_eq!(conv.to_plain_time(&input).unwrap().to_string(), "14:30:00");
        assert_eq!(conv.to_instant(&input).unwrap().to_string(), "2023-12-25T19:30:00Z");
    }

    #[test]
    fn test_widening_without_fields_fails() {
        let c = config();
        let conv = Converter::new(&c);
        let date = TemporalInput::from(PlainDate::new(2023, 12, 25).unwrap());
        assert!(conv.to_plain_date_time(&date).is_err());
        assert!(conv.to_instant(&date).is_err());
        let dt: PlainDateTime = "2023-12-25T10:00".parse().unwrap();
        assert!(conv.to_instant(&dt.into()).is_err());
    }

    #[test]
    fn test_plain_string_to_zoned() {
        let c = config();
        let conv = Converter::new(&c);
        let z = conv
            .to_zoned_date_time(&"2023-12-25T10:00".into(), Some("Asia/Tokyo"))
            .unwrap();
        assert_eq!(z.to_string(), "2023-12-25T10:00:00+09:00[Asia/Tokyo]");
        let z = conv.to_zoned_date_time(&"2023-12-25T10:00".into(), None).unwrap();
        assert_eq!(z.time_zone_id(), "UTC");
    }

    #[test]
    fn test_annotated_string_reprojected_by_explicit_zone() {
        let c = config();
        let conv = Converter::new(&c);
        let z = conv
            .to_zoned_date_time(&"2023-12-25T10:00:00+09:00[Asia/Tokyo]".into(), Some("UTC"))
            .unwrap();
        assert_eq!(z.to_string(), "2023-12-25T01:00:00+00:00[UTC]");
    }

    #[test]
    fn test_instant_from_annotation_without_offset() {
        let c = config();
        let conv = Converter::new(&c);
        let i = conv.to_instant(&"2023-12-25T10:00[Europe/Paris]".into()).unwrap();
        assert_eq!(i.to_string(), "2023-12-25T09:00:00Z");
    }

    #[test]
    fn test_bad_input_reports_both_kinds() {
        let c = config();
        let conv = Converter::new(&c);
        let err = conv.to_plain_date(&"not a date".into()).unwrap_err();
        assert!(matches!(
            err,
            TemporalError::Conversion {
                input: InputKind::Text,
                target: ValueKind::PlainDate,
                ..
            }
        ));
        let err = conv.to_duration(&"2023-12-25".into()).unwrap_err();
        assert!(matches!(err, TemporalError::Conversion { target: ValueKind::Duration, .. }));
        let err = conv.to_plain_time(&TemporalInput::from(Duration::days(1))).unwrap_err();
        assert!(matches!(
            err,
            TemporalError::Conversion {
                input: InputKind::Value(ValueKind::Duration),
                ..
            }
        ));
    }

    #[test]
    fn test_unknown_zone_fails() {
        let c = config();
        let conv = Converter::new(&c);
        assert!(conv
            .to_zoned_date_time(&"2023-12-25T10:00".into(), Some("Mars/Olympus"))
            .is_err());
    }

    #[test]
    fn test_convert_dispatches_on_kind() {
        let c = config();
        let conv = Converter::new(&c);
        for kind in [ValueKind::PlainDate, ValueKind::PlainDateTime, ValueKind::ZonedDateTime] {
            let v = conv.convert(&"2023-12-25".into(), kind).unwrap();
            assert_eq!(v.kind(), kind);
        }
    }
}
