//! Error types for temporal-kit operations.

use thiserror::Error;

use crate::input::InputKind;
use crate::value::ValueKind;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemporalError {
    /// A field-level invariant was violated while constructing a value.
    #[error("Invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    /// An input could not be mapped to the requested value kind.
    #[error("Cannot convert {input} to {target}: {reason}")]
    Conversion {
        input: InputKind,
        target: ValueKind,
        reason: String,
    },

    /// A format-options object is internally inconsistent.
    #[error("Invalid format options: {0}")]
    Options(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimeZone(String),

    #[error("Invalid calendar: {0}")]
    InvalidCalendar(String),

    #[error("Invalid unit: {0}")]
    InvalidUnit(String),

    #[error("Out of range: {0}")]
    Overflow(String),

    /// The operation has no meaning for the given value kind.
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl TemporalError {
    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        TemporalError::Validation {
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn overflow(what: impl Into<String>) -> Self {
        TemporalError::Overflow(what.into())
    }
}

pub type Result<T> = std::result::Result<T, TemporalError>;
