//! # temporal-kit
//!
//! Immutable, calendar-aware date and time values with one consistent
//! surface for parsing, conversion, arithmetic, comparison and display.
//!
//! Six value kinds share the ISO-8601 grammar: [`PlainDate`],
//! [`PlainTime`], [`PlainDateTime`], [`ZonedDateTime`], [`Instant`] and
//! [`Duration`]. [`TemporalValue`] is the tagged union over them and
//! [`TemporalInput`] the union of everything that can be turned into one.
//!
//! ## Modules
//!
//! - [`date`], [`time`], [`datetime`], [`zoned`], [`instant`], [`duration`] — the value types
//! - [`calendar`] — leap years, month lengths, calendar identifiers
//! - [`value`] / [`input`] — tagged unions over values and over inputs
//! - [`convert`] — any input → any value kind
//! - [`arith`] — add, subtract, compare, differences, ranges
//! - [`format`] / [`options`] — locale-aware display and its option sets
//! - [`validate`] — non-raising checks over inputs and options
//! - [`config`] — shared defaults for locale, time zone and calendar
//! - [`clock`] — wall-clock source
//! - [`engine`] — [`TemporalEngine`], the facade over all of the above
//! - [`error`] — Error types
//!
//! ```
//! use temporal_kit::{FormatOptions, Style, TemporalEngine, Unit, ValueKind};
//!
//! let engine = TemporalEngine::default();
//! let start = engine.convert("2023-12-25", ValueKind::PlainDate).unwrap();
//! let end = engine.add(&start, "P1Y2M").unwrap();
//! assert_eq!(end.to_string(), "2025-02-25");
//! assert_eq!(engine.difference_in(Unit::Day, &start, &end).unwrap(), 428);
//! assert_eq!(
//!     engine.format(&end, &FormatOptions::date_style(Style::Long)),
//!     "February 25, 2025"
//! );
//! ```

pub mod arith;
pub mod calendar;
pub mod clock;
pub mod config;
pub mod convert;
pub mod date;
pub mod datetime;
pub mod duration;
pub mod engine;
pub mod error;
pub mod format;
pub mod input;
pub mod instant;
pub mod options;
mod parse;
pub mod time;
pub mod unit;
pub mod validate;
pub mod value;
pub mod zoned;

pub use arith::{ComparisonResult, TemporalRange};
pub use calendar::{days_in_month, days_in_year, is_leap_year, CalendarId};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{ConfigPatch, SharedConfig, TemporalConfig};
pub use convert::Converter;
pub use date::PlainDate;
pub use datetime::PlainDateTime;
pub use duration::{Duration, DurationFields};
pub use engine::{Now, TemporalEngine};
pub use error::{Result, TemporalError};
pub use format::{ChronoFormatter, DateField, DateLayout, LocaleFormatter};
pub use input::{DateTimeFields, InputKind, TemporalInput};
pub use instant::Instant;
pub use options::{
    DurationStyle, FormatOptions, FormatPreset, MonthStyle, NumericStyle, Style, TextStyle,
    TimeZoneNameStyle,
};
pub use time::PlainTime;
pub use unit::Unit;
pub use validate::ValidationResult;
pub use value::{TemporalValue, ValueKind};
pub use zoned::{Disambiguation, ZonedDateTime};
