//! Display options for the formatting engine, with named presets.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TemporalError;

/// Overall length of a date or time rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    Full,
    Long,
    Medium,
    Short,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NumericStyle {
    #[serde(rename = "numeric")]
    Numeric,
    #[serde(rename = "2-digit")]
    TwoDigit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MonthStyle {
    #[serde(rename = "numeric")]
    Numeric,
    #[serde(rename = "2-digit")]
    TwoDigit,
    #[serde(rename = "long")]
    Long,
    #[serde(rename = "short")]
    Short,
    #[serde(rename = "narrow")]
    Narrow,
}

impl MonthStyle {
    pub fn is_text(self) -> bool {
        matches!(self, MonthStyle::Long | MonthStyle::Short | MonthStyle::Narrow)
    }
}

/// Width of a textual field such as weekday or era.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextStyle {
    Long,
    Short,
    Narrow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimeZoneNameStyle {
    Long,
    Short,
    ShortOffset,
    LongOffset,
    ShortGeneric,
    LongGeneric,
}

/// How durations are spelled out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationStyle {
    /// `1 year, 2 months, 3 days`
    #[default]
    Long,
    /// `1 yr, 2 mths, 3 days`
    Short,
    /// `1y 2m 3d`
    Narrow,
    /// `01:30:00`
    Digital,
}

impl FromStr for DurationStyle {
    type Err = TemporalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "long" => Ok(DurationStyle::Long),
            "short" => Ok(DurationStyle::Short),
            "narrow" => Ok(DurationStyle::Narrow),
            "digital" => Ok(DurationStyle::Digital),
            _ => Err(TemporalError::Options(format!("unknown duration style '{s}'"))),
        }
    }
}

/// Formatting options. Every field is optional; unset fields fall back to
/// the kind's default rendering and the configured locale, zone and calendar.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FormatOptions {
    pub date_style: Option<Style>,
    pub time_style: Option<Style>,
    pub year: Option<NumericStyle>,
    pub month: Option<MonthStyle>,
    pub day: Option<NumericStyle>,
    pub weekday: Option<TextStyle>,
    pub era: Option<TextStyle>,
    pub hour: Option<NumericStyle>,
    pub minute: Option<NumericStyle>,
    pub second: Option<NumericStyle>,
    pub fractional_second_digits: Option<u8>,
    pub time_zone_name: Option<TimeZoneNameStyle>,
    pub hour12: Option<bool>,
    pub time_zone: Option<String>,
    pub calendar: Option<String>,
    pub locale: Option<String>,
    #[serde(rename = "style")]
    pub duration_style: Option<DurationStyle>,
}

impl FormatOptions {
    pub fn date_style(style: Style) -> Self {
        FormatOptions {
            date_style: Some(style),
            ..Default::default()
        }
    }

    pub fn time_style(style: Style) -> Self {
        FormatOptions {
            time_style: Some(style),
            ..Default::default()
        }
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    pub fn with_time_zone(mut self, time_zone: impl Into<String>) -> Self {
        self.time_zone = Some(time_zone.into());
        self
    }

    /// `self` with every field set in `other` taking precedence.
    pub fn merge(&self, other: &FormatOptions) -> FormatOptions {
        FormatOptions {
            date_style: other.date_style.or(self.date_style),
            time_style: other.time_style.or(self.time_style),
            year: other.year.or(self.year),
            month: other.month.or(self.month),
            day: other.day.or(self.day),
            weekday: other.weekday.or(self.weekday),
            era: other.era.or(self.era),
            hour: other.hour.or(self.hour),
            minute: other.minute.or(self.minute),
            second: other.second.or(self.second),
            fractional_second_digits: other.fractional_second_digits.or(self.fractional_second_digits),
            time_zone_name: other.time_zone_name.or(self.time_zone_name),
            hour12: other.hour12.or(self.hour12),
            time_zone: other.time_zone.clone().or_else(|| self.time_zone.clone()),
            calendar: other.calendar.clone().or_else(|| self.calendar.clone()),
            locale: other.locale.clone().or_else(|| self.locale.clone()),
            duration_style: other.duration_style.or(self.duration_style),
        }
    }

    pub fn has_style(&self) -> bool {
        self.date_style.is_some() || self.time_style.is_some()
    }

    pub fn has_date_fields(&self) -> bool {
        self.year.is_some()
            || self.month.is_some()
            || self.day.is_some()
            || self.weekday.is_some()
            || self.era.is_some()
    }

    pub fn has_time_fields(&self) -> bool {
        self.hour.is_some()
            || self.minute.is_some()
            || self.second.is_some()
            || self.fractional_second_digits.is_some()
    }

    /// Names of the individual field options that are set.
    pub(crate) fn field_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        let fields = [
            ("year", self.year.is_some()),
            ("month", self.month.is_some()),
            ("day", self.day.is_some()),
            ("weekday", self.weekday.is_some()),
            ("era", self.era.is_some()),
            ("hour", self.hour.is_some()),
            ("minute", self.minute.is_some()),
            ("second", self.second.is_some()),
            ("fractionalSecondDigits", self.fractional_second_digits.is_some()),
            ("timeZoneName", self.time_zone_name.is_some()),
        ];
        for (name, set) in fields {
            if set {
                names.push(name);
            }
        }
        names
    }
}

/// Named option sets for common renderings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FormatPreset {
    DateFull,
    DateLong,
    DateMedium,
    DateShort,
    TimeFull,
    TimeLong,
    TimeMedium,
    TimeShort,
    DateTimeFull,
    DateTimeLong,
    DateTimeMedium,
    DateTimeShort,
    IsoDate,
    IsoTime,
    IsoDateTime,
    DurationLong,
    DurationShort,
    DurationNarrow,
    DurationDigital,
}

impl FormatPreset {
    pub const ALL: [FormatPreset; 19] = [
        FormatPreset::DateFull,
        FormatPreset::DateLong,
        FormatPreset::DateMedium,
        FormatPreset::DateShort,
        FormatPreset::TimeFull,
        FormatPreset::TimeLong,
        FormatPreset::TimeMedium,
        FormatPreset::TimeShort,
        FormatPreset::DateTimeFull,
        FormatPreset::DateTimeLong,
        FormatPreset::DateTimeMedium,
        FormatPreset::DateTimeShort,
        FormatPreset::IsoDate,
        FormatPreset::IsoTime,
        FormatPreset::IsoDateTime,
        FormatPreset::DurationLong,
        FormatPreset::DurationShort,
        FormatPreset::DurationNarrow,
        FormatPreset::DurationDigital,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FormatPreset::DateFull => "dateFull",
            FormatPreset::DateLong => "dateLong",
            FormatPreset::DateMedium => "dateMedium",
            FormatPreset::DateShort => "dateShort",
            FormatPreset::TimeFull => "timeFull",
            FormatPreset::TimeLong => "timeLong",
            FormatPreset::TimeMedium => "timeMedium",
            FormatPreset::TimeShort => "timeShort",
            FormatPreset::DateTimeFull => "dateTimeFull",
            FormatPreset::DateTimeLong => "dateTimeLong",
            FormatPreset::DateTimeMedium => "dateTimeMedium",
            FormatPreset::DateTimeShort => "dateTimeShort",
            FormatPreset::IsoDate => "isoDate",
            FormatPreset::IsoTime => "isoTime",
            FormatPreset::IsoDateTime => "isoDateTime",
            FormatPreset::DurationLong => "durationLong",
            FormatPreset::DurationShort => "durationShort",
            FormatPreset::DurationNarrow => "durationNarrow",
            FormatPreset::DurationDigital => "durationDigital",
        }
    }

    pub fn options(self) -> FormatOptions {
        let both = |style| FormatOptions {
            date_style: Some(style),
            time_style: Some(style),
            ..Default::default()
        };
        let iso_date = FormatOptions {
            year: Some(NumericStyle::Numeric),
            month: Some(MonthStyle::TwoDigit),
            day: Some(NumericStyle::TwoDigit),
            ..Default::default()
        };
        let iso_time = FormatOptions {
            hour: Some(NumericStyle::TwoDigit),
            minute: Some(NumericStyle::TwoDigit),
            second: Some(NumericStyle::TwoDigit),
            hour12: Some(false),
            ..Default::default()
        };
        let duration = |style| FormatOptions {
            duration_style: Some(style),
            ..Default::default()
        };
        match self {
            FormatPreset::DateFull => FormatOptions::date_style(Style::Full),
            FormatPreset::DateLong => FormatOptions::date_style(Style::Long),
            FormatPreset::DateMedium => FormatOptions::date_style(Style::Medium),
            FormatPreset::DateShort => FormatOptions::date_style(Style::Short),
            FormatPreset::TimeFull => FormatOptions::time_style(Style::Full),
            FormatPreset::TimeLong => FormatOptions::time_style(Style::Long),
            FormatPreset::TimeMedium => FormatOptions::time_style(Style::Medium),
            FormatPreset::TimeShort => FormatOptions::time_style(Style::Short),
            FormatPreset::DateTimeFull => both(Style::Full),
            FormatPreset::DateTimeLong => both(Style::Long),
            FormatPreset::DateTimeMedium => both(Style::Medium),
            FormatPreset::DateTimeShort => both(Style::Short),
            FormatPreset::IsoDate => iso_date,
            FormatPreset::IsoTime => iso_time,
            FormatPreset::IsoDateTime => iso_date.merge(&iso_time),
            FormatPreset::DurationLong => duration(DurationStyle::Long),
            FormatPreset::DurationShort => duration(DurationStyle::Short),
            FormatPreset::DurationNarrow => duration(DurationStyle::Narrow),
            FormatPreset::DurationDigital => duration(DurationStyle::Digital),
        }
    }
}

impl fmt::Display for FormatPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormatPreset {
    type Err = TemporalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FormatPreset::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| TemporalError::Options(format!("unknown preset '{s}'")))
    }
}

impl From<FormatPreset> for FormatOptions {
    fn from(preset: FormatPreset) -> Self {
        preset.options()
    }
}
