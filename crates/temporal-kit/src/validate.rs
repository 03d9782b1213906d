//! Non-raising checks over inputs and format options.
//!
//! Every function here turns would-be errors into a [`ValidationResult`]
//! instead of returning `Err`.

use serde::Serialize;

use crate::calendar::CalendarId;
use crate::convert::Converter;
use crate::error::{Result, TemporalError};
use crate::format::LocaleFormatter;
use crate::input::TemporalInput;
use crate::options::{FormatOptions, NumericStyle};
use crate::value::ValueKind;
use crate::zoned::parse_time_zone;

/// Outcome of a validation pass: `{ "isValid": bool, "errors": [..] }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl ValidationResult {
    pub fn ok() -> Self {
        ValidationResult {
            is_valid: true,
            errors: Vec::new(),
        }
    }

    pub fn from_errors(errors: Vec<String>) -> Self {
        ValidationResult {
            is_valid: errors.is_empty(),
            errors,
        }
    }

    /// Fold the messages into a single [`TemporalError::Options`].
    pub fn into_result(self) -> Result<()> {
        if self.is_valid {
            Ok(())
        } else {
            Err(TemporalError::Options(self.errors.join("; ")))
        }
    }
}

/// Whether `input` can become a value of `kind`, with the reason if not.
pub fn validate_input(
    converter: &Converter<'_>,
    input: &TemporalInput,
    kind: ValueKind,
) -> ValidationResult {
    match converter.convert(input, kind) {
        Ok(_) => ValidationResult::ok(),
        Err(err) => ValidationResult::from_errors(vec![err.to_string()]),
    }
}

/// Check a format option set for internal consistency.
///
/// Locale support is checked against `formatter`, so hosts plugging in a
/// different backend get answers that match what they can render.
pub fn validate_options(options: &FormatOptions, formatter: &dyn LocaleFormatter) -> ValidationResult {
    let mut errors = Vec::new();

    if !options.has_style()
        && !options.has_date_fields()
        && !options.has_time_fields()
        && options.time_zone_name.is_none()
        && options.duration_style.is_none()
    {
        errors.push("Either dateStyle/timeStyle or individual components must be specified".to_string());
    }
    if options.has_style() {
        let fields = options.field_names();
        if !fields.is_empty() {
            errors.push(format!(
                "dateStyle/timeStyle cannot be combined with individual components ({})",
                fields.join(", ")
            ));
        }
    }
    if let Some(digits) = options.fractional_second_digits {
        if !(1..=3).contains(&digits) {
            errors.push("fractionalSecondDigits must be 1, 2, or 3".to_string());
        }
    }
    if options.hour12 == Some(true) && options.hour == Some(NumericStyle::TwoDigit) {
        errors.push(r#"hour12: true with hour: "2-digit" may cause formatting issues"#.to_string());
    }
    if let Some(zone) = &options.time_zone {
        if let Err(err) = parse_time_zone(zone) {
            errors.push(err.to_string());
        }
    }
    if let Some(calendar) = &options.calendar {
        if let Err(err) = calendar.parse::<CalendarId>() {
            errors.push(err.to_string());
        }
    }
    if let Some(locale) = &options.locale {
        if !formatter.supports_locale(locale) {
            errors.push(format!("Unsupported locale: {locale}"));
        }
    }

    ValidationResult::from_errors(errors)
}
