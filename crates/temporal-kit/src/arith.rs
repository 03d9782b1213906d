//! Arithmetic, differences, ordering and ranges over [`TemporalValue`]s.

use std::cmp::Ordering;

use serde::Serialize;

use crate::datetime::PlainDateTime;
use crate::duration::Duration;
use crate::error::{Result, TemporalError};
use crate::input::InputKind;
use crate::time::PlainTime;
use crate::unit::Unit;
use crate::value::{TemporalValue, ValueKind};

// ── Add / subtract ─────────────────────────────────────────────────────────

/// Add `duration` to `value`, returning a value of the same kind.
///
/// Durations can be added to each other only when neither carries years,
/// months or weeks; the sum is balanced up to days.
///
/// # Errors
///
/// Returns [`TemporalError::Overflow`] when the result leaves the supported
/// range, or [`TemporalError::Unsupported`] when two durations carry
/// calendar units.
///
/// # Examples
///
/// ```
/// use temporal_kit::{arith, Duration, PlainDate, TemporalValue};
///
/// let jan31 = TemporalValue::from(PlainDate::new(2024, 1, 31).unwrap());
/// let feb = arith::add(&jan31, &Duration::months(1)).unwrap();
/// assert_eq!(feb.to_string(), "2024-02-29");
/// ```
pub fn add(value: &TemporalValue, duration: &Duration) -> Result<TemporalValue> {
    Ok(match value {
        TemporalValue::PlainDate(v) => v.add(duration)?.into(),
        TemporalValue::PlainTime(v) => v.add(duration).into(),
        TemporalValue::PlainDateTime(v) => v.add(duration)?.into(),
        TemporalValue::ZonedDateTime(v) => v.add(duration)?.into(),
        TemporalValue::Instant(v) => v.add(duration)?.into(),
        TemporalValue::Duration(v) => add_durations(v, duration)?.into(),
    })
}

/// Subtract `duration` from `value`; the same as adding its negation.
///
/// # Errors
///
/// As for [`add`].
pub fn subtract(value: &TemporalValue, duration: &Duration) -> Result<TemporalValue> {
    add(value, &duration.negated())
}

fn add_durations(a: &Duration, b: &Duration) -> Result<Duration> {
    if a.has_calendar_units() || b.has_calendar_units() {
        return Err(TemporalError::Unsupported(format!(
            "adding {b} to {a} needs a reference date for years, months and weeks"
        )));
    }
    let total = a.total_nanoseconds()? + b.total_nanoseconds()?;
    Duration::from_nanos_balanced(total, Unit::Day)
}

// ── Ordering ───────────────────────────────────────────────────────────────

/// Order two values of the same kind. Zoned values compare by instant.
///
/// # Errors
///
/// Returns [`TemporalError::Conversion`] when the kinds differ.
///
/// # Examples
///
/// ```
/// use std::cmp::Ordering;
/// use temporal_kit::{arith, TemporalValue, ValueKind};
///
/// let utc = TemporalValue::parse("2024-01-01T12:00:00+00:00[UTC]", ValueKind::ZonedDateTime).unwrap();
/// let ny = TemporalValue::parse(
///     "2024-01-01T07:00:00-05:00[America/New_York]",
///     ValueKind::ZonedDateTime,
/// )
/// .unwrap();
/// assert_eq!(arith::compare(&utc, &ny).unwrap(), Ordering::Equal);
/// ```
pub fn compare(a: &TemporalValue, b: &TemporalValue) -> Result<Ordering> {
    a.try_compare(b).ok_or_else(|| mismatch(a, b))
}

pub fn is_before(a: &TemporalValue, b: &TemporalValue) -> Result<bool> {
    Ok(compare(a, b)? == Ordering::Less)
}

pub fn is_after(a: &TemporalValue, b: &TemporalValue) -> Result<bool> {
    Ok(compare(a, b)? == Ordering::Greater)
}

/// Equal by ordering, so zoned values in different zones are equal when they
/// denote the same instant.
pub fn is_equal(a: &TemporalValue, b: &TemporalValue) -> Result<bool> {
    Ok(compare(a, b)? == Ordering::Equal)
}

fn mismatch(a: &TemporalValue, b: &TemporalValue) -> TemporalError {
    TemporalError::Conversion {
        input: InputKind::Value(b.kind()),
        target: a.kind(),
        reason: "values of different kinds cannot be compared".into(),
    }
}

// ── Differences ────────────────────────────────────────────────────────────

/// Duration from `a` to `b`, carrying into units no coarser than `largest`.
///
/// The result is negative when `b` is before `a`, and adding it to `a`
/// gives back `b`.
///
/// # Errors
///
/// Returns [`TemporalError::Conversion`] when the kinds differ,
/// [`TemporalError::InvalidUnit`] when `largest` does not suit the kind
/// (days for a time of day, years for an instant), or
/// [`TemporalError::Unsupported`] for two durations.
///
/// # Examples
///
/// ```
/// use temporal_kit::{arith, TemporalValue, Unit, ValueKind};
///
/// let a = TemporalValue::parse("2023-01-01", ValueKind::PlainDate).unwrap();
/// let b = TemporalValue::parse("2024-03-05", ValueKind::PlainDate).unwrap();
/// assert_eq!(arith::difference(&a, &b, Unit::Year).unwrap().to_string(), "P1Y2M4D");
/// assert_eq!(arith::difference(&b, &a, Unit::Day).unwrap().to_string(), "-P429D");
/// ```
pub fn difference(a: &TemporalValue, b: &TemporalValue, largest: Unit) -> Result<Duration> {
    match (a, b) {
        (TemporalValue::PlainDate(x), TemporalValue::PlainDate(y)) => {
            if largest < Unit::Day {
                let midnight = |d| PlainDateTime::new(d, PlainTime::MIDNIGHT);
                midnight(*x).until(&midnight(*y), largest)
            } else {
                x.until(y, largest)
            }
        }
        (TemporalValue::PlainTime(x), TemporalValue::PlainTime(y)) => x.until(y, largest),
        (TemporalValue::PlainDateTime(x), TemporalValue::PlainDateTime(y)) => x.until(y, largest),
        (TemporalValue::ZonedDateTime(x), TemporalValue::ZonedDateTime(y)) => x.until(y, largest),
        (TemporalValue::Instant(x), TemporalValue::Instant(y)) => x.until(y, largest),
        (TemporalValue::Duration(_), TemporalValue::Duration(_)) => Err(TemporalError::Unsupported(
            "the difference of two durations is not defined".into(),
        )),
        _ => Err(mismatch(a, b)),
    }
}

/// Signed difference from `a` to `b` expressed as a whole number of `unit`.
///
/// Partial units are truncated toward zero.
///
/// ```
/// use temporal_kit::{arith, PlainDate, TemporalValue, Unit};
///
/// let a = TemporalValue::from(PlainDate::new(2023, 1, 1).unwrap());
/// let b = TemporalValue::from(PlainDate::new(2024, 3, 5).unwrap());
/// assert_eq!(arith::difference_in(Unit::Year, &a, &b).unwrap(), 1);
/// assert_eq!(arith::difference_in(Unit::Month, &a, &b).unwrap(), 14);
/// assert_eq!(arith::difference_in(Unit::Day, &a, &b).unwrap(), 429);
/// ```
pub fn difference_in(unit: Unit, a: &TemporalValue, b: &TemporalValue) -> Result<i64> {
    if let (TemporalValue::Instant(x), TemporalValue::Instant(y)) = (a, b) {
        let size = unit.nanos().ok_or_else(|| {
            TemporalError::InvalidUnit(format!("instants cannot be measured in {unit}s"))
        })?;
        let delta = (y.epoch_nanoseconds() - x.epoch_nanoseconds()) / size;
        return i64::try_from(delta).map_err(|_| TemporalError::overflow(format!("{delta} {unit}s")));
    }
    Ok(difference(a, b, unit)?.get(unit))
}

/// Outcome of comparing `a` against `b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    pub is_before: bool,
    pub is_after: bool,
    pub is_equal: bool,
    /// Duration from `a` to `b` in the kind's default largest unit.
    pub difference: Duration,
}

/// Ordering flags and the difference from `a` to `b` in one result.
///
/// # Errors
///
/// As for [`compare`] and [`difference`].
pub fn compare_detailed(a: &TemporalValue, b: &TemporalValue) -> Result<ComparisonResult> {
    let ordering = compare(a, b)?;
    let difference = difference(a, b, a.kind().default_largest_unit())?;
    Ok(ComparisonResult {
        is_before: ordering == Ordering::Less,
        is_after: ordering == Ordering::Greater,
        is_equal: ordering == Ordering::Equal,
        difference,
    })
}

// ── Ranges ─────────────────────────────────────────────────────────────────

/// An inclusive span `[start, end]` of one value kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TemporalRange {
    start: TemporalValue,
    end: TemporalValue,
}

impl TemporalRange {
    /// Fails when the kinds differ, when they are durations, or when
    /// `start` is after `end`.
    pub fn new(start: TemporalValue, end: TemporalValue) -> Result<Self> {
        if start.kind() == ValueKind::Duration {
            return Err(TemporalError::Unsupported("ranges of durations".into()));
        }
        if compare(&start, &end)? == Ordering::Greater {
            return Err(TemporalError::validation(
                "range",
                format!("start {start} is after end {end}"),
            ));
        }
        Ok(TemporalRange { start, end })
    }

    pub fn start(&self) -> &TemporalValue {
        &self.start
    }

    pub fn end(&self) -> &TemporalValue {
        &self.end
    }

    pub fn kind(&self) -> ValueKind {
        self.start.kind()
    }

    /// Whether `value` is not before `start` and not after `end`.
    pub fn contains(&self, value: &TemporalValue) -> Result<bool> {
        Ok(!is_before(value, &self.start)? && !is_after(value, &self.end)?)
    }

    /// Length of the range in the kind's default largest unit.
    pub fn duration(&self) -> Result<Duration> {
        difference(&self.start, &self.end, self.kind().default_largest_unit())
    }
}
