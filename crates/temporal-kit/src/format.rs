//! Locale-aware rendering of canonical values.
//!
//! This module picks and checks an option set, resolves defaults from the
//! configuration and turns the result into a `strftime`-style pattern. The
//! locale text itself (month and weekday names, day periods, the locale's
//! numeric date layout) comes from a [`LocaleFormatter`]; the default
//! [`ChronoFormatter`] uses chrono's bundled locale tables.
//!
//! Field order follows the locale: `12/25/2023` and `December 25, 2023` in
//! en-US, `25.12.2023` and `25. Dezember 2023` in de-DE, `2023年12月25日` in
//! ja-JP.
//!
//! Formatting never fails from the caller's point of view: [`format`]
//! returns an empty string and logs a warning when the value cannot be
//! rendered with the given options. Use [`try_format`] to see the error.

use std::fmt::Write as _;

use chrono::{
    Datelike, DateTime, Locale, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Timelike, Utc,
};
use chrono_tz::Tz;
use tracing::warn;

use crate::calendar::CalendarId;
use crate::config::TemporalConfig;
use crate::date::PlainDate;
use crate::duration::Duration;
use crate::error::{Result, TemporalError};
use crate::options::{
    DurationStyle, FormatOptions, MonthStyle, NumericStyle, Style, TextStyle, TimeZoneNameStyle,
};
use crate::parse;
use crate::unit::Unit;
use crate::value::TemporalValue;
use crate::zoned::parse_time_zone;

// ── Host seam ──────────────────────────────────────────────────────────────

/// Produces locale text for a wall-clock reading.
///
/// Patterns use chrono's `strftime` syntax and never contain zone
/// specifiers; zone names are resolved before the pattern is built.
pub trait LocaleFormatter: Send + Sync {
    fn render(&self, wall: &NaiveDateTime, pattern: &str, locale: &str) -> Result<String>;

    fn supports_locale(&self, locale: &str) -> bool;

    /// Whether the locale marks the day period (AM/PM), which makes a
    /// 12-hour clock its default.
    fn uses_day_period(&self, locale: &str) -> bool {
        let noon = NaiveDate::from_ymd_opt(2000, 1, 1).and_then(|d| d.and_hms_opt(12, 0, 0));
        match noon {
            Some(noon) => self
                .render(&noon, "%p", locale)
                .map(|s| !s.trim().is_empty())
                .unwrap_or(false),
            None => false,
        }
    }

    /// Field order and punctuation of the locale's numeric date, read back
    /// from its `%x` rendering of a sample date.
    fn date_layout(&self, locale: &str) -> DateLayout {
        NaiveDate::from_ymd_opt(2033, 11, 22)
            .and_then(|d| self.render(&d.and_time(NaiveTime::MIN), "%x", locale).ok())
            .and_then(|sample| DateLayout::from_sample(&sample))
            .unwrap_or_default()
    }
}

/// A field of a numeric date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateField {
    Year,
    Month,
    Day,
}

/// The three fields of a numeric date in locale order, with the text
/// before, between and after them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateLayout {
    pub fields: [DateField; 3],
    pub literals: [String; 4],
}

impl Default for DateLayout {
    /// `M/D/Y`.
    fn default() -> Self {
        DateLayout {
            fields: [DateField::Month, DateField::Day, DateField::Year],
            literals: [String::new(), "/".into(), "/".into(), String::new()],
        }
    }
}

impl DateLayout {
    /// Read the layout from a rendering of 2033-11-22, e.g. `22.11.2033`,
    /// `11/22/33` or `2033年11月22日`.
    ///
    /// Returns `None` when a field cannot be located, as with month names.
    pub fn from_sample(sample: &str) -> Option<Self> {
        let year = match sample.find("2033") {
            Some(at) => (at, 4),
            None => (sample.find("33")?, 2),
        };
        let month = (sample.find("11")?, 2);
        let day = (sample.find("22")?, 2);
        let mut found = [(year, DateField::Year), (month, DateField::Month), (day, DateField::Day)];
        found.sort_by_key(|((at, _), _)| *at);

        let mut literals: [String; 4] = Default::default();
        let mut cursor = 0;
        for (slot, ((at, len), _)) in found.iter().enumerate() {
            // Overlapping matches leave `cursor` past `at`.
            literals[slot] = sample.get(cursor..*at)?.to_string();
            cursor = at + len;
        }
        literals[3] = sample.get(cursor..)?.to_string();
        Some(DateLayout {
            fields: found.map(|(_, field)| field),
            literals,
        })
    }

    fn leading(&self) -> DateField {
        self.fields[0]
    }

    /// CJK layouts mark fields with ideographs instead of punctuation.
    fn is_ideographic(&self) -> bool {
        self.literals.iter().any(|l| !l.is_ascii())
    }

    /// Punctuation between numeric fields built from options.
    fn separator(&self) -> &str {
        let sep = self.literals[1].trim();
        if sep.len() == 1 && sep.bytes().all(|b| b.is_ascii_punctuation()) {
            sep
        } else {
            "/"
        }
    }

    /// `.` for locales that write the day as an ordinal, as in `25. Dezember`.
    fn day_suffix(&self) -> &'static str {
        if self.leading() == DateField::Day && self.literals[1] == "." {
            "."
        } else {
            ""
        }
    }

    /// The numeric date with unpadded day and month and a full year.
    fn numeric_pattern(&self) -> String {
        let mut out = literal(&self.literals[0]);
        for (field, after) in self.fields.iter().zip(&self.literals[1..]) {
            out.push_str(match field {
                DateField::Year => "%Y",
                DateField::Month => "%-m",
                DateField::Day => "%-d",
            });
            out.push_str(&literal(after));
        }
        out
    }

    /// Put the three field patterns in locale order.
    fn order<T: Clone>(&self, year: &T, month: &T, day: &T) -> [T; 3] {
        self.fields.map(|field| match field {
            DateField::Year => year.clone(),
            DateField::Month => month.clone(),
            DateField::Day => day.clone(),
        })
    }
}

/// [`LocaleFormatter`] backed by chrono's `unstable-locales` tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChronoFormatter;

impl LocaleFormatter for ChronoFormatter {
    fn render(&self, wall: &NaiveDateTime, pattern: &str, locale: &str) -> Result<String> {
        let locale = resolve_locale(locale)?;
        let mut out = String::new();
        write!(out, "{}", Utc.from_utc_datetime(wall).format_localized(pattern, locale))
            .map_err(|_| TemporalError::Options(format!("pattern '{pattern}' cannot be rendered")))?;
        Ok(out)
    }

    fn supports_locale(&self, locale: &str) -> bool {
        resolve_locale(locale).is_ok()
    }
}

/// Resolve a BCP-47 style tag (`en-US`, `de`, `fr_CA`) to a chrono locale.
///
/// A bare language is completed with its main region.
pub fn resolve_locale(tag: &str) -> Result<Locale> {
    let unknown = || TemporalError::Options(format!("unknown locale '{tag}'"));
    let mut parts = tag.trim().split(['-', '_']);
    let language = parts.next().filter(|l| !l.is_empty()).ok_or_else(unknown)?.to_ascii_lowercase();
    let region = parts.next().map(str::to_ascii_uppercase);
    let candidate = match region {
        Some(region) => format!("{language}_{region}"),
        None => match language.as_str() {
            "en" => "en_US".to_string(),
            "ja" => "ja_JP".to_string(),
            "zh" => "zh_CN".to_string(),
            "ko" => "ko_KR".to_string(),
            other => format!("{other}_{}", other.to_ascii_uppercase()),
        },
    };
    Locale::try_from(candidate.as_str()).map_err(|_| unknown())
}

// ── Values ─────────────────────────────────────────────────────────────────

/// Render `value`, or an empty string when it cannot be rendered.
pub fn format(
    value: &TemporalValue,
    options: &FormatOptions,
    config: &TemporalConfig,
    formatter: &dyn LocaleFormatter,
) -> String {
    match try_format(value, options, config, formatter) {
        Ok(s) => s,
        Err(err) => {
            warn!(value = %value, error = %err, "formatting failed, rendering empty string");
            String::new()
        }
    }
}

/// Render `value`, reporting why it cannot be rendered.
pub fn try_format(
    value: &TemporalValue,
    options: &FormatOptions,
    config: &TemporalConfig,
    formatter: &dyn LocaleFormatter,
) -> Result<String> {
    let locale = options.locale.as_deref().unwrap_or(&config.default_locale);
    if !formatter.supports_locale(locale) {
        return Err(TemporalError::Options(format!("unknown locale '{locale}'")));
    }
    if let Some(calendar) = &options.calendar {
        calendar.parse::<CalendarId>()?;
    }
    if let Some(digits) = options.fractional_second_digits {
        if !(1..=3).contains(&digits) {
            return Err(TemporalError::Options(format!(
                "fractionalSecondDigits must be 1, 2 or 3, got {digits}"
            )));
        }
    }
    if options.has_style() && (options.has_date_fields() || options.has_time_fields()) {
        return Err(TemporalError::Options(
            "dateStyle and timeStyle cannot be combined with individual fields".into(),
        ));
    }

    let subject = match value {
        TemporalValue::Duration(d) => {
            return Ok(format_duration(d, options.duration_style.unwrap_or_default()));
        }
        other => Subject::new(other, options, config)?,
    };
    subject.check(options, value)?;

    let hour12 = options
        .hour12
        .unwrap_or_else(|| formatter.uses_day_period(locale));
    let layout = if subject.has_date {
        formatter.date_layout(locale)
    } else {
        DateLayout::default()
    };
    let builder = PatternBuilder {
        subject: &subject,
        options,
        locale,
        hour12,
        layout,
        formatter,
    };
    let pattern = builder.build()?;
    formatter.render(&subject.wall, &pattern, locale)
}

/// What is being rendered, reduced to a wall-clock reading.
struct Subject {
    wall: NaiveDateTime,
    has_date: bool,
    has_time: bool,
    zone: Option<ZoneInfo>,
}

struct ZoneInfo {
    id: &'static str,
    abbreviation: String,
    offset_seconds: i32,
}

impl ZoneInfo {
    fn of(dt: &DateTime<Tz>) -> Self {
        ZoneInfo {
            id: dt.timezone().name(),
            abbreviation: dt.offset().to_string(),
            offset_seconds: dt.offset().fix().local_minus_utc(),
        }
    }
}

impl Subject {
    fn new(value: &TemporalValue, options: &FormatOptions, config: &TemporalConfig) -> Result<Self> {
        let zoned = |dt: DateTime<Tz>| Subject {
            wall: dt.naive_local(),
            has_date: true,
            has_time: true,
            zone: Some(ZoneInfo::of(&dt)),
        };
        Ok(match value {
            TemporalValue::PlainDate(d) => Subject {
                wall: d.naive().and_time(chrono::NaiveTime::MIN),
                has_date: true,
                has_time: false,
                zone: None,
            },
            TemporalValue::PlainTime(t) => Subject {
                wall: NaiveDate::default().and_time(t.naive()),
                has_date: false,
                has_time: true,
                zone: None,
            },
            TemporalValue::PlainDateTime(dt) => Subject {
                wall: dt.naive(),
                has_date: true,
                has_time: true,
                zone: None,
            },
            TemporalValue::ZonedDateTime(z) => match &options.time_zone {
                Some(zone) => zoned(z.with_time_zone(zone)?.inner().to_owned()),
                None => zoned(*z.inner()),
            },
            TemporalValue::Instant(i) => {
                let zone = options
                    .time_zone
                    .as_deref()
                    .unwrap_or(&config.default_time_zone);
                zoned(i.utc().with_timezone(&parse_time_zone(zone)?))
            }
            TemporalValue::Duration(_) => {
                return Err(TemporalError::Unsupported("durations have no wall clock".into()))
            }
        })
    }

    /// Reject options that ask for fields the value does not have.
    fn check(&self, options: &FormatOptions, value: &TemporalValue) -> Result<()> {
        let kind = value.kind();
        if !self.has_time && (options.time_style.is_some() || options.has_time_fields()) {
            return Err(TemporalError::Options(format!("{kind} has no time of day to format")));
        }
        if !self.has_date && (options.date_style.is_some() || options.has_date_fields()) {
            return Err(TemporalError::Options(format!("{kind} has no date to format")));
        }
        if self.zone.is_none() && options.time_zone_name.is_some() {
            return Err(TemporalError::Options(format!("{kind} has no time zone to name")));
        }
        Ok(())
    }
}

struct PatternBuilder<'a> {
    subject: &'a Subject,
    options: &'a FormatOptions,
    locale: &'a str,
    hour12: bool,
    layout: DateLayout,
    formatter: &'a dyn LocaleFormatter,
}

impl PatternBuilder<'_> {
    fn build(&self) -> Result<String> {
        let o = self.options;
        let (date, time) = if o.has_style() {
            (self.date_style(), self.time_style())
        } else if o.has_date_fields() || o.has_time_fields() {
            (self.date_fields()?, self.time_fields())
        } else {
            (self.default_date(), self.default_time())
        };

        let mut time = time;
        let zone_name = match o.time_zone_name {
            Some(style) => self.zone_name(style),
            // Long and full time styles name the zone of zoned values.
            None => match o.time_style {
                Some(Style::Full) => self.zone_name(TimeZoneNameStyle::Long),
                Some(Style::Long) => self.zone_name(TimeZoneNameStyle::Short),
                _ => None,
            },
        };
        if let Some(name) = zone_name {
            let name = literal(&name);
            time = Some(match time {
                Some(t) => format!("{t} {name}"),
                None => name,
            });
        }

        Ok(match (date, time) {
            (Some(d), Some(t)) => format!("{d}, {t}"),
            (Some(d), None) => d,
            (None, Some(t)) => t,
            (None, None) => String::new(),
        })
    }

    fn date_style(&self) -> Option<String> {
        Some(match self.options.date_style? {
            Style::Full => self.text_date("%B", true),
            Style::Long => self.text_date("%B", false),
            Style::Medium => self.text_date("%b", false),
            Style::Short => "%x".to_string(),
        })
    }

    /// Day, month name and year in locale order, optionally led (or, for
    /// CJK layouts, followed) by the weekday.
    fn text_date(&self, month: &str, weekday: bool) -> String {
        let layout = &self.layout;
        match layout.leading() {
            DateField::Month => {
                let date = format!("{month} %-d, %Y");
                if weekday { format!("%A, {date}") } else { date }
            }
            DateField::Day => {
                let suffix = layout.day_suffix();
                let date = format!("%-d{suffix} {month} %Y");
                match (weekday, suffix.is_empty()) {
                    (false, _) => date,
                    (true, true) => format!("%A {date}"),
                    (true, false) => format!("%A, {date}"),
                }
            }
            DateField::Year if layout.is_ideographic() => {
                let date = layout.numeric_pattern();
                if weekday { format!("{date}%A") } else { date }
            }
            DateField::Year => {
                let date = format!("%Y {month} %-d");
                if weekday { format!("%A, {date}") } else { date }
            }
        }
    }

    fn time_style(&self) -> Option<String> {
        let with_seconds = !matches!(self.options.time_style?, Style::Short);
        let hour = if self.hour12 { "%-I" } else { "%H" };
        let mut pattern = format!("{hour}:%M");
        if with_seconds {
            pattern.push_str(":%S");
        }
        if self.hour12 {
            pattern.push_str(" %p");
        }
        Some(pattern)
    }

    fn default_date(&self) -> Option<String> {
        self.subject.has_date.then(|| self.layout.numeric_pattern())
    }

    fn default_time(&self) -> Option<String> {
        if !self.subject.has_time {
            return None;
        }
        Some(if self.hour12 {
            "%-I:%M:%S %p".to_string()
        } else {
            "%H:%M:%S".to_string()
        })
    }

    fn date_fields(&self) -> Result<Option<String>> {
        let o = self.options;
        if !o.has_date_fields() {
            return Ok(None);
        }
        let month = match o.month {
            Some(MonthStyle::Numeric) => Some("%-m".to_string()),
            Some(MonthStyle::TwoDigit) => Some("%m".to_string()),
            Some(MonthStyle::Long) => Some("%B".to_string()),
            Some(MonthStyle::Short) => Some("%b".to_string()),
            Some(MonthStyle::Narrow) => Some(self.initial("%B")?),
            None => None,
        };
        let day = o.day.map(|s| numeric(s, "%-d", "%d").to_string());
        let year = o.year.map(|s| numeric(s, "%Y", "%y").to_string());

        let layout = &self.layout;
        let mut body = if o.month.is_some_and(MonthStyle::is_text) {
            match layout.leading() {
                DateField::Month => {
                    let year_sep = if day.is_some() { ", " } else { " " };
                    let month_day = join([month, day], " ");
                    join([month_day, year], year_sep)
                }
                DateField::Day => {
                    let day = day.map(|d| format!("{d}{}", layout.day_suffix()));
                    join([day, month, year], " ")
                }
                DateField::Year => join([year, month, day], " "),
            }
            .unwrap_or_default()
        } else {
            join(layout.order(&year, &month, &day), layout.separator()).unwrap_or_default()
        };
        if let Some(style) = o.era {
            let era = era_name(self.subject.wall.date().year_ce().0, style);
            body = join([Some(body), Some(literal(era))], " ").unwrap_or_default();
        }
        let weekday = match o.weekday {
            Some(TextStyle::Long) => Some("%A".to_string()),
            Some(TextStyle::Short) => Some("%a".to_string()),
            Some(TextStyle::Narrow) => Some(self.initial("%A")?),
            None => None,
        };
        let body = (!body.is_empty()).then_some(body);
        Ok(join([weekday, body], ", "))
    }

    fn time_fields(&self) -> Option<String> {
        let o = self.options;
        if !o.has_time_fields() {
            return None;
        }
        let hour = o.hour.map(|s| {
            match (s, self.hour12) {
                (NumericStyle::Numeric, true) => "%-I",
                (NumericStyle::TwoDigit, true) => "%I",
                (NumericStyle::Numeric, false) => "%-H",
                (NumericStyle::TwoDigit, false) => "%H",
            }
            .to_string()
        });
        let minute = o.minute.map(|s| {
            if hour.is_some() { "%M" } else { numeric(s, "%-M", "%M") }.to_string()
        });
        let second = o.second.map(|s| {
            if hour.is_some() || minute.is_some() { "%S" } else { numeric(s, "%-S", "%S") }
                .to_string()
        });
        let has_hour = hour.is_some();
        let mut body = join([hour, minute, second], ":").unwrap_or_default();
        if let Some(digits) = o.fractional_second_digits {
            let nanos = format!("{:09}", self.subject.wall.nanosecond() % 1_000_000_000);
            let digits = usize::from(digits).min(9);
            body.push('.');
            body.push_str(&nanos[..digits]);
        }
        if self.hour12 && has_hour {
            body.push_str(" %p");
        }
        Some(body)
    }

    fn zone_name(&self, style: TimeZoneNameStyle) -> Option<String> {
        let zone = self.subject.zone.as_ref()?;
        Some(match style {
            TimeZoneNameStyle::Short => zone.abbreviation.clone(),
            TimeZoneNameStyle::ShortOffset => gmt_offset(zone.offset_seconds, false),
            TimeZoneNameStyle::LongOffset => gmt_offset(zone.offset_seconds, true),
            TimeZoneNameStyle::Long
            | TimeZoneNameStyle::ShortGeneric
            | TimeZoneNameStyle::LongGeneric => zone.id.to_string(),
        })
    }

    /// First letter of a localized name, as an escaped literal.
    fn initial(&self, pattern: &str) -> Result<String> {
        let name = self.formatter.render(&self.subject.wall, pattern, self.locale)?;
        Ok(literal(&name.chars().take(1).collect::<String>()))
    }
}

fn numeric(style: NumericStyle, plain: &'static str, padded: &'static str) -> &'static str {
    match style {
        NumericStyle::Numeric => plain,
        NumericStyle::TwoDigit => padded,
    }
}

fn join<const N: usize>(parts: [Option<String>; N], sep: &str) -> Option<String> {
    let parts: Vec<String> = parts.into_iter().flatten().filter(|p| !p.is_empty()).collect();
    (!parts.is_empty()).then(|| parts.join(sep))
}

fn literal(text: &str) -> String {
    text.replace('%', "%%")
}

fn era_name(is_ce: bool, style: TextStyle) -> &'static str {
    match (is_ce, style) {
        (true, TextStyle::Long) => "Anno Domini",
        (true, TextStyle::Short) => "AD",
        (true, TextStyle::Narrow) => "A",
        (false, TextStyle::Long) => "Before Christ",
        (false, TextStyle::Short) => "BC",
        (false, TextStyle::Narrow) => "B",
    }
}

/// `GMT`, `GMT-5`, `GMT+5:30` or, in long form, `GMT-05:00`.
fn gmt_offset(seconds: i32, long: bool) -> String {
    if seconds == 0 {
        return "GMT".to_string();
    }
    let sign = if seconds < 0 { '-' } else { '+' };
    let abs = seconds.unsigned_abs();
    let (hours, minutes) = (abs / 3600, (abs % 3600) / 60);
    match (long, minutes) {
        (true, _) => format!("GMT{sign}{hours:02}:{minutes:02}"),
        (false, 0) => format!("GMT{sign}{hours}"),
        (false, _) => format!("GMT{sign}{hours}:{minutes:02}"),
    }
}

// ── Durations ──────────────────────────────────────────────────────────────

struct UnitNames {
    unit: Unit,
    long: (&'static str, &'static str),
    short: (&'static str, &'static str),
    narrow: &'static str,
}

const UNIT_NAMES: [UnitNames; 10] = [
    UnitNames { unit: Unit::Year, long: ("year", "years"), short: ("yr", "yrs"), narrow: "y" },
    UnitNames { unit: Unit::Month, long: ("month", "months"), short: ("mth", "mths"), narrow: "m" },
    UnitNames { unit: Unit::Week, long: ("week", "weeks"), short: ("wk", "wks"), narrow: "w" },
    UnitNames { unit: Unit::Day, long: ("day", "days"), short: ("day", "days"), narrow: "d" },
    UnitNames { unit: Unit::Hour, long: ("hour", "hours"), short: ("hr", "hr"), narrow: "h" },
    UnitNames { unit: Unit::Minute, long: ("minute", "minutes"), short: ("min", "min"), narrow: "min" },
    UnitNames { unit: Unit::Second, long: ("second", "seconds"), short: ("sec", "sec"), narrow: "s" },
    UnitNames {
        unit: Unit::Millisecond,
        long: ("millisecond", "milliseconds"),
        short: ("ms", "ms"),
        narrow: "ms",
    },
    UnitNames {
        unit: Unit::Microsecond,
        long: ("microsecond", "microseconds"),
        short: ("μs", "μs"),
        narrow: "μs",
    },
    UnitNames {
        unit: Unit::Nanosecond,
        long: ("nanosecond", "nanoseconds"),
        short: ("ns", "ns"),
        narrow: "ns",
    },
];

/// Spell out a duration in English.
///
/// ```
/// use temporal_kit::{format::format_duration, Duration, DurationStyle};
///
/// let d: Duration = "P1Y2M3D".parse().unwrap();
/// assert_eq!(format_duration(&d, DurationStyle::Long), "1 year, 2 months, 3 days");
/// assert_eq!(format_duration(&d, DurationStyle::Narrow), "1y 2m 3d");
/// ```
pub fn format_duration(duration: &Duration, style: DurationStyle) -> String {
    let sign = if duration.sign() < 0 { "-" } else { "" };
    let abs = duration.abs();
    if style == DurationStyle::Digital {
        return format!("{sign}{}", digital(&abs));
    }

    let pieces: Vec<String> = UNIT_NAMES
        .iter()
        .filter(|names| abs.get(names.unit) != 0)
        .map(|names| unit_piece(abs.get(names.unit), names, style))
        .collect();
    if pieces.is_empty() {
        return match style {
            DurationStyle::Short => "0 sec".to_string(),
            DurationStyle::Narrow => "0s".to_string(),
            _ => "0 seconds".to_string(),
        };
    }
    let sep = if style == DurationStyle::Narrow { " " } else { ", " };
    format!("{sign}{}", pieces.join(sep))
}

fn unit_piece(n: i64, names: &UnitNames, style: DurationStyle) -> String {
    let pick = |(one, many): (&str, &'static str)| if n == 1 { one.to_string() } else { many.to_string() };
    match style {
        DurationStyle::Short => format!("{n} {}", pick(names.short)),
        DurationStyle::Narrow => format!("{n}{}", names.narrow),
        _ => format!("{n} {}", pick(names.long)),
    }
}

/// `HH:MM:SS[.fff]` with days folded into hours. Years, months and weeks,
/// which have no fixed length, lead in narrow form.
fn digital(abs: &Duration) -> String {
    let calendar: Vec<String> = UNIT_NAMES[..3]
        .iter()
        .filter(|names| abs.get(names.unit) != 0)
        .map(|names| unit_piece(abs.get(names.unit), names, DurationStyle::Narrow))
        .collect();
    // Widened: `P9223372036854775807D` has more hours than an i64 holds.
    let hours = i128::from(abs.get_days()) * 24 + i128::from(abs.get_hours());
    let sub = i128::from(abs.get_milliseconds()) * 1_000_000
        + i128::from(abs.get_microseconds()) * 1_000
        + i128::from(abs.get_nanoseconds());
    let clock = format!(
        "{hours:02}:{:02}:{:02}{}",
        abs.get_minutes(),
        abs.get_seconds(),
        parse::fraction_suffix(u32::try_from(sub).unwrap_or(0))
    );
    if calendar.is_empty() {
        clock
    } else {
        format!("{} {clock}", calendar.join(" "))
    }
}

// ── Relative ───────────────────────────────────────────────────────────────

/// Describe `date` relative to `reference`: `today`, `tomorrow`,
/// `in 3 days`, `2 weeks ago`, `in 1 month`, `3 years ago`.
pub fn format_relative(date: &PlainDate, reference: &PlainDate) -> String {
    let diff = match reference.until(date, Unit::Year) {
        Ok(diff) => diff,
        Err(err) => {
            warn!(%date, %reference, error = %err, "relative formatting failed");
            return String::new();
        }
    };
    let (n, unit) = if diff.get_years() != 0 {
        (diff.get_years(), "year")
    } else if diff.get_months() != 0 {
        (diff.get_months(), "month")
    } else {
        match diff.get_days() {
            0 => return "today".to_string(),
            1 => return "tomorrow".to_string(),
            -1 => return "yesterday".to_string(),
            days if days.abs() >= 7 => (days / 7, "week"),
            days => (days, "day"),
        }
    };
    let plural = if n.abs() == 1 { "" } else { "s" };
    if n > 0 {
        format!("in {n} {unit}{plural}")
    } else {
        format!("{} {unit}{plural} ago", n.abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::FormatPreset;
    use crate::value::ValueKind;

    fn render(value: &str, kind: ValueKind, options: &FormatOptions) -> String {
        let value = TemporalValue::parse(value, kind).unwrap();
        format(&value, options, &TemporalConfig::default(), &ChronoFormatter)
    }

    fn try_render(value: &str, kind: ValueKind, options: &FormatOptions) -> Result<String> {
        let value = TemporalValue::parse(value, kind).unwrap();
        try_format(&value, options, &TemporalConfig::default(), &ChronoFormatter)
    }

    #[test]
    fn test_resolve_locale_tags() {
        assert!(resolve_locale("en-US").is_ok());
        assert!(resolve_locale("en_us").is_ok());
        assert!(resolve_locale("de").is_ok());
        assert!(resolve_locale("fr-CA").is_ok());
        assert!(resolve_locale("xx-YY").is_err());
        assert!(resolve_locale("").is_err());
    }

    #[test]
    fn test_date_styles_en_us() {
        let full = render("2023-12-25", ValueKind::PlainDate, &FormatOptions::date_style(Style::Full));
        assert_eq!(full, "Monday, December 25, 2023");
        let long = render("2023-12-25", ValueKind::PlainDate, &FormatOptions::date_style(Style::Long));
        assert_eq!(long, "December 25, 2023");
        let medium =
            render("2023-12-25", ValueKind::PlainDate, &FormatOptions::date_style(Style::Medium));
        assert_eq!(medium, "Dec 25, 2023");
        let short = render("2023-12-25", ValueKind::PlainDate, &FormatOptions::date_style(Style::Short));
        assert!(short.starts_with("12/25/"), "{short}");
    }

    #[test]
    fn test_locale_changes_names() {
        let options = FormatOptions::date_style(Style::Long).with_locale("fr-FR");
        let text = render("2023-12-25", ValueKind::PlainDate, &options);
        assert!(text.contains("décembre"), "{text}");
    }

    #[test]
    fn test_layout_from_sample() {
        let us = DateLayout::from_sample("11/22/2033").unwrap();
        assert_eq!(us, DateLayout::default());

        let de = DateLayout::from_sample("22.11.2033").unwrap();
        assert_eq!(de.fields, [DateField::Day, DateField::Month, DateField::Year]);
        assert_eq!(de.separator(), ".");
        assert_eq!(de.day_suffix(), ".");
        assert_eq!(de.numeric_pattern(), "%-d.%-m.%Y");

        let gb = DateLayout::from_sample("22/11/33").unwrap();
        assert_eq!(gb.fields[0], DateField::Day);
        assert_eq!(gb.day_suffix(), "");

        let ja = DateLayout::from_sample("2033年11月22日").unwrap();
        assert_eq!(ja.fields, [DateField::Year, DateField::Month, DateField::Day]);
        assert!(ja.is_ideographic());
        assert_eq!(ja.separator(), "/");
        assert_eq!(ja.numeric_pattern(), "%Y年%-m月%-d日");

        assert_eq!(DateLayout::from_sample("Nov 22, 2033"), None);
    }

    #[test]
    fn test_day_first_locales() {
        let at = |style: Style, locale: &str| {
            let options = FormatOptions::date_style(style).with_locale(locale);
            render("2023-12-25", ValueKind::PlainDate, &options)
        };
        assert_eq!(at(Style::Long, "de-DE"), "25. Dezember 2023");
        assert_eq!(at(Style::Full, "de-DE"), "Montag, 25. Dezember 2023");
        assert_eq!(at(Style::Long, "fr-FR"), "25 décembre 2023");
        assert_eq!(at(Style::Long, "en-GB"), "25 December 2023");

        let default = |locale: &str| {
            let options = FormatOptions::default().with_locale(locale);
            render("2023-12-05", ValueKind::PlainDate, &options)
        };
        assert_eq!(default("de-DE"), "5.12.2023");
        assert_eq!(default("fr-FR"), "5/12/2023");
        assert_eq!(default("ja-JP"), "2023年12月5日");

        let numeric = FormatPreset::IsoDate.options().with_locale("de-DE");
        assert_eq!(render("2023-01-05", ValueKind::PlainDate, &numeric), "05.01.2023");
        let text = FormatOptions {
            month: Some(MonthStyle::Long),
            day: Some(NumericStyle::Numeric),
            locale: Some("de-DE".into()),
            ..Default::default()
        };
        assert_eq!(render("2023-01-05", ValueKind::PlainDate, &text), "5. Januar");
    }

    #[test]
    fn test_default_rendering() {
        let none = FormatOptions::default();
        assert_eq!(render("2023-12-05", ValueKind::PlainDate, &none), "12/5/2023");
        assert_eq!(render("14:05:09", ValueKind::PlainTime, &none), "2:05:09 PM");
        assert_eq!(
            render("2023-12-05T14:05:09", ValueKind::PlainDateTime, &none),
            "12/5/2023, 2:05:09 PM"
        );
    }

    #[test]
    fn test_hour12_false_and_24h_locale() {
        let options = FormatOptions {
            hour12: Some(false),
            ..FormatOptions::time_style(Style::Short)
        };
        assert_eq!(render("14:05:09", ValueKind::PlainTime, &options), "14:05");
        let german = FormatOptions::time_style(Style::Medium).with_locale("de-DE");
        assert_eq!(render("14:05:09", ValueKind::PlainTime, &german), "14:05:09");
    }

    #[test]
    fn test_individual_fields() {
        let iso = FormatPreset::IsoDate.options();
        assert_eq!(render("2023-01-05", ValueKind::PlainDate, &iso), "01/05/2023");
        let text = FormatOptions {
            weekday: Some(TextStyle::Short),
            month: Some(MonthStyle::Short),
            day: Some(NumericStyle::Numeric),
            ..Default::default()
        };
        assert_eq!(render("2023-01-05", ValueKind::PlainDate, &text), "Thu, Jan 5");
        let narrow = FormatOptions {
            month: Some(MonthStyle::Narrow),
            year: Some(NumericStyle::Numeric),
            era: Some(TextStyle::Short),
            ..Default::default()
        };
        assert_eq!(render("2023-01-05", ValueKind::PlainDate, &narrow), "J 2023 AD");
    }

    #[test]
    fn test_fractional_seconds() {
        let options = FormatOptions {
            minute: Some(NumericStyle::TwoDigit),
            second: Some(NumericStyle::TwoDigit),
            fractional_second_digits: Some(2),
            ..Default::default()
        };
        assert_eq!(render("10:04:05.678", ValueKind::PlainTime, &options), "04:05.67");
    }

    #[test]
    fn test_zoned_names() {
        let options = FormatOptions {
            time_zone_name: Some(TimeZoneNameStyle::ShortOffset),
            hour: Some(NumericStyle::Numeric),
            minute: Some(NumericStyle::TwoDigit),
            hour12: Some(false),
            ..Default::default()
        };
        let text = render(
            "2023-12-25T14:30:00-05:00[America/New_York]",
            ValueKind::ZonedDateTime,
            &options,
        );
        assert_eq!(text, "14:30 GMT-5");
        let long = FormatOptions {
            time_zone_name: Some(TimeZoneNameStyle::LongOffset),
            ..options.clone()
        };
        let text = render("2023-12-25T14:30:00+05:30[Asia/Kolkata]", ValueKind::ZonedDateTime, &long);
        assert_eq!(text, "14:30 GMT+05:30");
    }

    #[test]
    fn test_instant_uses_option_zone() {
        let options = FormatOptions {
            hour: Some(NumericStyle::TwoDigit),
            minute: Some(NumericStyle::TwoDigit),
            hour12: Some(false),
            time_zone: Some("Asia/Tokyo".into()),
            ..Default::default()
        };
        assert_eq!(render("2023-12-25T14:30:00Z", ValueKind::Instant, &options), "23:30");
    }

    #[test]
    fn test_malformed_options_render_empty() {
        let bad_digits = FormatOptions {
            fractional_second_digits: Some(7),
            ..Default::default()
        };
        assert_eq!(render("10:00", ValueKind::PlainTime, &bad_digits), "");
        assert!(matches!(
            try_render("10:00", ValueKind::PlainTime, &bad_digits),
            Err(TemporalError::Options(_))
        ));
        let time_on_date = FormatOptions::time_style(Style::Short);
        assert_eq!(render("2023-12-25", ValueKind::PlainDate, &time_on_date), "");
        let zone_on_plain = FormatOptions {
            time_zone_name: Some(TimeZoneNameStyle::Short),
            ..Default::default()
        };
        assert_eq!(render("2023-12-25T10:00", ValueKind::PlainDateTime, &zone_on_plain), "");
        let bad_locale = FormatOptions::default().with_locale("xx-YY");
        assert_eq!(render("2023-12-25", ValueKind::PlainDate, &bad_locale), "");
    }

    #[test]
    fn test_duration_styles() {
        let d: Duration = "P1Y2M3D".parse().unwrap();
        assert_eq!(format_duration(&d, DurationStyle::Long), "1 year, 2 months, 3 days");
        assert_eq!(format_duration(&d, DurationStyle::Short), "1 yr, 2 mths, 3 days");
        assert_eq!(format_duration(&d, DurationStyle::Narrow), "1y 2m 3d");
        let clock: Duration = "-P1DT2H3M4.5S".parse().unwrap();
        assert_eq!(format_duration(&clock, DurationStyle::Digital), "-26:03:04.5");
        assert_eq!(format_duration(&Duration::ZERO, DurationStyle::Long), "0 seconds");
        assert_eq!(format_duration(&Duration::ZERO, DurationStyle::Narrow), "0s");
        assert_eq!(format_duration(&Duration::ZERO, DurationStyle::Digital), "00:00:00");
        assert_eq!(format_duration(&Duration::hours(1), DurationStyle::Long), "1 hour");
    }

    #[test]
    fn test_extreme_durations_render_in_every_style() {
        let huge: Duration = "P9223372036854775807D".parse().unwrap();
        let styles = [
            DurationStyle::Long,
            DurationStyle::Short,
            DurationStyle::Narrow,
            DurationStyle::Digital,
        ];
        for d in [huge, huge.negated(), Duration::years(i64::MIN), Duration::hours(i64::MAX)] {
            for style in styles {
                assert!(!format_duration(&d, style).is_empty(), "{d} as {style:?}");
            }
        }
        assert_eq!(
            format_duration(&huge, DurationStyle::Digital),
            "221360928884514619368:00:00"
        );
        assert_eq!(
            format_duration(&huge.negated(), DurationStyle::Narrow),
            "-9223372036854775807d"
        );
    }

    #[test]
    fn test_duration_value_uses_style_option() {
        let options = FormatPreset::DurationNarrow.options();
        assert_eq!(render("PT1H30M", ValueKind::Duration, &options), "1h 30min");
    }

    #[test]
    fn test_relative() {
        let today = PlainDate::new(2024, 3, 15).unwrap();
        let at = |y, m, d| PlainDate::new(y, m, d).unwrap();
        assert_eq!(format_relative(&today, &today), "today");
        assert_eq!(format_relative(&at(2024, 3, 16), &today), "tomorrow");
        assert_eq!(format_relative(&at(2024, 3, 14), &today), "yesterday");
        assert_eq!(format_relative(&at(2024, 3, 18), &today), "in 3 days");
        assert_eq!(format_relative(&at(2024, 3, 1), &today), "2 weeks ago");
        assert_eq!(format_relative(&at(2024, 4, 15), &today), "in 1 month");
        assert_eq!(format_relative(&at(2021, 1, 1), &today), "3 years ago");
    }

    #[test]
    fn test_gmt_offset() {
        assert_eq!(gmt_offset(0, false), "GMT");
        assert_eq!(gmt_offset(-18_000, false), "GMT-5");
        assert_eq!(gmt_offset(19_800, false), "GMT+5:30");
        assert_eq!(gmt_offset(-18_000, true), "GMT-05:00");
    }
}
