//! Date-times anchored to an IANA time zone.
//!
//! Offset rules come from `chrono-tz`. The offset is never stored on its
//! own: it is derived from the instant and the zone every time it is read.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use chrono::{DateTime, LocalResult, NaiveDateTime, Offset, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::calendar::CalendarId;
use crate::date::PlainDate;
use crate::datetime::PlainDateTime;
use crate::duration::Duration;
use crate::error::{Result, TemporalError};
use crate::input::InputKind;
use crate::instant::Instant;
use crate::parse::{self, IsoOffset};
use crate::time::PlainTime;
use crate::unit::Unit;
use crate::value::ValueKind;

/// How to resolve a wall-clock reading that occurs twice (fold) or never
/// (gap) in a time zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Disambiguation {
    /// Earlier instant in a fold; shift forward by the gap length in a gap.
    #[default]
    Compatible,
    Earlier,
    Later,
    Reject,
}

/// A date-time in a specific time zone, e.g.
/// `2023-12-25T14:30:00-05:00[America/New_York]`.
#[derive(Debug, Clone, Copy)]
pub struct ZonedDateTime {
    inner: DateTime<Tz>,
    calendar: CalendarId,
}

/// Parse an IANA time zone name.
pub(crate) fn parse_time_zone(s: &str) -> Result<Tz> {
    s.trim()
        .parse::<Tz>()
        .map_err(|_| TemporalError::InvalidTimeZone(format!("'{s}'")))
}

/// Resolve a wall-clock reading in `tz` to exactly one instant.
pub(crate) fn resolve_local(
    tz: Tz,
    naive: NaiveDateTime,
    disambiguation: Disambiguation,
) -> Result<DateTime<Tz>> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Ok(dt),
        LocalResult::Ambiguous(a, b) => {
            let (earlier, later) = if a <= b { (a, b) } else { (b, a) };
            match disambiguation {
                Disambiguation::Compatible | Disambiguation::Earlier => Ok(earlier),
                Disambiguation::Later => Ok(later),
                Disambiguation::Reject => Err(TemporalError::validation(
                    "time",
                    format!("{naive} is ambiguous in {}", tz.name()),
                )),
            }
        }
        LocalResult::None => {
            let gap_error = || {
                TemporalError::validation("time", format!("{naive} does not exist in {}", tz.name()))
            };
            let offset_near = |delta: TimeDelta| {
                naive
                    .checked_add_signed(delta)
                    .map(|probe| tz.offset_from_utc_datetime(&probe).fix())
                    .ok_or_else(gap_error)
            };
            let offset = match disambiguation {
                Disambiguation::Compatible | Disambiguation::Later => {
                    offset_near(TimeDelta::days(-1))?
                }
                Disambiguation::Earlier => offset_near(TimeDelta::days(1))?,
                Disambiguation::Reject => return Err(gap_error()),
            };
            let utc = naive
                .checked_sub_signed(TimeDelta::seconds(i64::from(offset.local_minus_utc())))
                .ok_or_else(gap_error)?;
            Ok(tz.from_utc_datetime(&utc))
        }
    }
}

impl ZonedDateTime {
    pub(crate) fn from_parts(inner: DateTime<Tz>, calendar: CalendarId) -> Self {
        ZonedDateTime { inner, calendar }
    }

    /// Anchor a wall-clock reading in `time_zone`.
    pub fn from_plain(
        plain: &PlainDateTime,
        time_zone: &str,
        disambiguation: Disambiguation,
    ) -> Result<Self> {
        let tz = parse_time_zone(time_zone)?;
        let inner = resolve_local(tz, plain.naive(), disambiguation)?;
        Ok(Self::from_parts(inner, CalendarId::Iso8601))
    }

    /// Project an instant into `time_zone`.
    pub fn from_instant(instant: &Instant, time_zone: &str) -> Result<Self> {
        let tz = parse_time_zone(time_zone)?;
        Ok(Self::from_parts(
            instant.utc().with_timezone(&tz),
            CalendarId::Iso8601,
        ))
    }

    pub fn time_zone_id(&self) -> &'static str {
        self.inner.timezone().name()
    }

    pub(crate) fn tz(&self) -> Tz {
        self.inner.timezone()
    }

    pub(crate) fn inner(&self) -> &DateTime<Tz> {
        &self.inner
    }

    pub fn calendar(&self) -> CalendarId {
        self.calendar
    }

    /// UTC offset in seconds derived from the zone rules at this instant.
    pub fn offset_seconds(&self) -> i32 {
        self.inner.offset().fix().local_minus_utc()
    }

    pub fn to_instant(&self) -> Instant {
        Instant::from_utc(self.inner.with_timezone(&Utc))
    }

    pub fn to_plain_date_time(&self) -> PlainDateTime {
        PlainDateTime::from_naive(self.inner.naive_local())
    }

    pub fn to_plain_date(&self) -> PlainDate {
        self.to_plain_date_time().to_plain_date()
    }

    pub fn to_plain_time(&self) -> PlainTime {
        self.to_plain_date_time().to_plain_time()
    }

    /// Same instant, viewed from another time zone.
    pub fn with_time_zone(&self, time_zone: &str) -> Result<Self> {
        let tz = parse_time_zone(time_zone)?;
        Ok(Self::from_parts(self.inner.with_timezone(&tz), self.calendar))
    }

    pub fn with_calendar(&self, calendar: CalendarId) -> Self {
        Self::from_parts(self.inner, calendar)
    }

    /// Order by the underlying instant only, ignoring zone and calendar.
    pub fn compare_instant(a: &ZonedDateTime, b: &ZonedDateTime) -> Ordering {
        a.inner.cmp(&b.inner)
    }

    /// Add a duration. Calendar units move the wall clock (and are
    /// re-resolved in the zone); clock units move the exact instant.
    pub fn add(&self, duration: &Duration) -> Result<Self> {
        let tz = self.tz();
        let shifted = if duration.has_date_units() {
            let local = self.to_plain_date_time();
            let date = local.date().add_calendar(duration, 0)?;
            resolve_local(tz, date.naive().and_time(local.time().naive()), Disambiguation::Compatible)?
        } else {
            self.inner
        };
        let nanos = i64::try_from(duration.time_nanos())
            .map_err(|_| TemporalError::overflow("duration time part"))?;
        let inner = shifted
            .checked_add_signed(TimeDelta::nanoseconds(nanos))
            .ok_or_else(|| TemporalError::overflow(format!("{self} plus {duration}")))?;
        Ok(Self::from_parts(inner, self.calendar))
    }

    pub fn subtract(&self, duration: &Duration) -> Result<Self> {
        self.add(&duration.negated())
    }

    /// Duration from `self` to `other`.
    ///
    /// Calendar units are measured on wall clocks in `self`'s zone; clock
    /// units are exact elapsed time.
    pub fn until(&self, other: &ZonedDateTime, largest: Unit) -> Result<Duration> {
        if largest < Unit::Day {
            return self.to_instant().until(&other.to_instant(), largest);
        }
        let other_local = PlainDateTime::from_naive(other.inner.with_timezone(&self.tz()).naive_local());
        self.to_plain_date_time().until(&other_local, largest)
    }

    pub fn since(&self, other: &ZonedDateTime, largest: Unit) -> Result<Duration> {
        other.until(self, largest)
    }
}

impl PartialEq for ZonedDateTime {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner && self.tz() == other.tz() && self.calendar == other.calendar
    }
}

impl Eq for ZonedDateTime {}

impl Hash for ZonedDateTime {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.timestamp().hash(state);
        self.inner.timestamp_subsec_nanos().hash(state);
        self.time_zone_id().hash(state);
        self.calendar.hash(state);
    }
}

impl PartialOrd for ZonedDateTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ZonedDateTime {
    /// Instant first, then zone name and calendar so that `Ord` agrees with `Eq`.
    fn cmp(&self, other: &Self) -> Ordering {
        Self::compare_instant(self, other)
            .then_with(|| self.time_zone_id().cmp(other.time_zone_id()))
            .then_with(|| self.calendar.cmp(&other.calendar))
    }
}

impl fmt::Display for ZonedDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}[{}]",
            self.to_plain_date_time(),
            parse::format_offset(self.offset_seconds()),
            self.time_zone_id()
        )?;
        if self.calendar != CalendarId::Iso8601 {
            write!(f, "[u-ca={}]", self.calendar)?;
        }
        Ok(())
    }
}

impl FromStr for ZonedDateTime {
    type Err = TemporalError;

    /// Requires a `[Zone]` annotation. A numeric offset, when present, must
    /// match one of the offsets the zone uses at that wall-clock time.
    fn from_str(s: &str) -> Result<Self> {
        let fail = |reason: String| TemporalError::Conversion {
            input: InputKind::Text,
            target: ValueKind::ZonedDateTime,
            reason,
        };
        let parsed = parse::parse_date_time(s).map_err(fail)?;
        let zone = parsed
            .zone
            .as_deref()
            .ok_or_else(|| fail(format!("missing [time zone] annotation in '{s}'")))?;
        let tz = parse_time_zone(zone)?;
        let calendar = match &parsed.calendar {
            Some(c) => c.parse::<CalendarId>()?,
            None => CalendarId::Iso8601,
        };
        let d = parsed.date.ok_or_else(|| fail(format!("no date in '{s}'")))?;
        let t = parsed.time.unwrap_or_default();
        let plain = PlainDateTime::new(
            PlainDate::from_iso(&d).map_err(|e| fail(e.to_string()))?,
            PlainTime::from_iso(&t).map_err(|e| fail(e.to_string()))?,
        );
        let naive = plain.naive();

        let inner = match parsed.offset {
            None => resolve_local(tz, naive, Disambiguation::Compatible)?,
            Some(IsoOffset::Utc) => tz.from_utc_datetime(&naive),
            Some(IsoOffset::Fixed(offset)) => {
                let candidates: Vec<DateTime<Tz>> = match tz.from_local_datetime(&naive) {
                    LocalResult::Single(dt) => vec![dt],
                    LocalResult::Ambiguous(a, b) => vec![a, b],
                    LocalResult::None => Vec::new(),
                };
                candidates
                    .into_iter()
                    .find(|dt| dt.offset().fix().local_minus_utc() == offset)
                    .ok_or_else(|| {
                        fail(format!(
                            "offset {} does not match {zone} at {plain}",
                            parse::format_offset(offset)
                        ))
                    })?
            }
        };
        Ok(Self::from_parts(inner, calendar))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zdt(s: &str) -> ZonedDateTime {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_and_display() {
        let v = zdt("2023-12-25T14:30:00[America/New_York]");
        assert_eq!(v.to_string(), "2023-12-25T14:30:00-05:00[America/New_York]");
        assert_eq!(v.time_zone_id(), "America/New_York");
        assert_eq!(v.offset_seconds(), -18_000);
    }

    #[test]
    fn test_parse_calendar_annotation_round_trips() {
        let s = "2023-07-01T09:00:00+02:00[Europe/Paris][u-ca=gregory]";
        assert_eq!(zdt(s).to_string(), s);
        assert_eq!(zdt(s).calendar(), CalendarId::Gregory);
    }

    #[test]
    fn test_parse_requires_zone() {
        assert!("2023-12-25T14:30:00-05:00".parse::<ZonedDateTime>().is_err());
        assert!("2023-12-25T14:30:00[Mars/Olympus]".parse::<ZonedDateTime>().is_err());
    }

    #[test]
    fn test_parse_rejects_mismatched_offset() {
        assert!("2023-12-25T14:30:00+01:00[America/New_York]"
            .parse::<ZonedDateTime>()
            .is_err());
    }

    #[test]
    fn test_parse_z_is_exact_instant() {
        let v = zdt("2023-12-25T19:30:00Z[America/New_York]");
        assert_eq!(v.to_plain_time().hour(), 14);
    }

    #[test]
    fn test_offset_picks_fold_candidate() {
        // 2026-11-01 01:30 happens twice in New York.
        let first = zdt("2026-11-01T01:30:00-04:00[America/New_York]");
        let second = zdt("2026-11-01T01:30:00-05:00[America/New_York]");
        assert!(first < second);
        assert_eq!(second.to_instant().epoch_seconds() - first.to_instant().epoch_seconds(), 3600);
    }

    #[test]
    fn test_gap_compatible_shifts_forward() {
        // 2026-03-08 02:30 does not exist in New York.
        let plain: PlainDateTime = "2026-03-08T02:30".parse().unwrap();
        let v = plain.to_zoned("America/New_York", Disambiguation::Compatible).unwrap();
        assert_eq!(v.to_string(), "2026-03-08T03:30:00-04:00[America/New_York]");
        let v = plain.to_zoned("America/New_York", Disambiguation::Earlier).unwrap();
        assert_eq!(v.to_string(), "2026-03-08T01:30:00-05:00[America/New_York]");
        assert!(plain.to_zoned("America/New_York", Disambiguation::Reject).is_err());
    }

    #[test]
    fn test_fold_disambiguation() {
        let plain: PlainDateTime = "2026-11-01T01:30".parse().unwrap();
        let early = plain.to_zoned("America/New_York", Disambiguation::Compatible).unwrap();
        assert_eq!(early.offset_seconds(), -4 * 3600);
        let late = plain.to_zoned("America/New_York", Disambiguation::Later).unwrap();
        assert_eq!(late.offset_seconds(), -5 * 3600);
        assert!(plain.to_zoned("America/New_York", Disambiguation::Reject).is_err());
    }

    #[test]
    fn test_add_day_across_dst_keeps_wall_clock() {
        // March 7 → March 8, 2026 crosses the New York spring-forward.
        let v = zdt("2026-03-07T12:00:00-05:00[America/New_York]");
        let next = v.add(&Duration::days(1)).unwrap();
        assert_eq!(next.to_string(), "2026-03-08T12:00:00-04:00[America/New_York]");
        let exact = v.add(&Duration::hours(24)).unwrap();
        assert_eq!(exact.to_string(), "2026-03-08T13:00:00-04:00[America/New_York]");
    }

    #[test]
    fn test_with_time_zone_keeps_instant() {
        let v = zdt("2026-03-15T14:00:00+00:00[UTC]");
        let ny = v.with_time_zone("America/New_York").unwrap();
        assert_eq!(ny.to_plain_time().hour(), 10);
        assert_eq!(ZonedDateTime::compare_instant(&v, &ny), Ordering::Equal);
        assert_ne!(v, ny);
    }

    #[test]
    fn test_until_exact_vs_calendar() {
        let a = zdt("2026-03-07T12:00:00-05:00[America/New_York]");
        let b = zdt("2026-03-08T12:00:00-04:00[America/New_York]");
        assert_eq!(a.until(&b, Unit::Hour).unwrap().get_hours(), 23);
        let d = a.until(&b, Unit::Day).unwrap();
        assert_eq!((d.get_days(), d.get_hours()), (1, 0));
    }
}
