//! The engine facade: one object carrying the configuration, the clock and
//! the locale backend, exposing conversion, arithmetic, formatting and
//! validation over them.
//!
//! There is no global engine. Hosts build one at startup and share it; every
//! method takes `&self`, and configuration updates swap a snapshot that
//! in-flight calls are unaffected by.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::arith::{self, ComparisonResult, TemporalRange};
use crate::clock::{Clock, SystemClock};
use crate::config::{ConfigPatch, SharedConfig, TemporalConfig};
use crate::convert::Converter;
use crate::date::PlainDate;
use crate::datetime::PlainDateTime;
use crate::duration::Duration;
use crate::error::Result;
use crate::format::{self, ChronoFormatter, LocaleFormatter};
use crate::input::TemporalInput;
use crate::instant::Instant;
use crate::options::{DurationStyle, FormatOptions, FormatPreset};
use crate::time::PlainTime;
use crate::unit::Unit;
use crate::validate::{self, ValidationResult};
use crate::value::{TemporalValue, ValueKind};
use crate::zoned::ZonedDateTime;

/// Conversion, arithmetic, formatting and validation against one shared
/// configuration, clock and locale backend.
///
/// Cloning is cheap and clones share configuration updates.
///
/// ```
/// use temporal_kit::{FormatOptions, Style, TemporalEngine, ValueKind};
///
/// let engine = TemporalEngine::default();
/// let start = engine.convert("2023-12-25", ValueKind::PlainDate).unwrap();
/// let end = engine.add(&start, "P1Y2M").unwrap();
/// assert_eq!(end.to_string(), "2025-02-25");
/// assert_eq!(engine.format(&end, &FormatOptions::date_style(Style::Long)), "February 25, 2025");
/// ```
#[derive(Clone)]
pub struct TemporalEngine {
    config: SharedConfig,
    clock: Arc<dyn Clock>,
    formatter: Arc<dyn LocaleFormatter>,
}

impl fmt::Debug for TemporalEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemporalEngine")
            .field("config", &self.config.snapshot())
            .finish_non_exhaustive()
    }
}

impl Default for TemporalEngine {
    fn default() -> Self {
        TemporalEngine::from_shared(SharedConfig::default())
    }
}

impl TemporalEngine {
    /// Build an engine over a validated configuration, the system clock and
    /// chrono's locale tables.
    ///
    /// # Errors
    ///
    /// Returns [`TemporalError::InvalidTimeZone`](crate::TemporalError::InvalidTimeZone)
    /// for an unknown zone and [`TemporalError::Config`](crate::TemporalError::Config)
    /// for an unknown locale.
    pub fn new(config: TemporalConfig) -> Result<Self> {
        debug!(
            locale = %config.default_locale,
            time_zone = %config.default_time_zone,
            calendar = %config.default_calendar,
            "creating temporal engine"
        );
        Ok(TemporalEngine::from_shared(SharedConfig::new(config)?))
    }

    /// Build an engine over configuration shared with other components.
    pub fn from_shared(config: SharedConfig) -> Self {
        TemporalEngine {
            config,
            clock: Arc::new(SystemClock),
            formatter: Arc::new(ChronoFormatter),
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn with_formatter(mut self, formatter: impl LocaleFormatter + 'static) -> Self {
        self.formatter = Arc::new(formatter);
        self
    }

    // ── Configuration ───────────────────────────────────────────────────

    pub fn config(&self) -> Arc<TemporalConfig> {
        self.config.snapshot()
    }

    /// Merge `patch` into the configuration. Calls already running keep the
    /// snapshot they started with.
    ///
    /// # Errors
    ///
    /// Rejects a patch that would leave the configuration invalid; the
    /// previous configuration stays in place.
    pub fn set_config(&self, patch: &ConfigPatch) -> Result<Arc<TemporalConfig>> {
        self.config.update(patch)
    }

    pub fn shared_config(&self) -> &SharedConfig {
        &self.config
    }

    // ── Conversion ──────────────────────────────────────────────────────

    /// Convert any supported input to a value of `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`TemporalError::Conversion`](crate::TemporalError::Conversion)
    /// naming the input shape and `kind`; see [`Converter::convert`].
    ///
    /// ```
    /// use temporal_kit::{TemporalEngine, TemporalValue, ValueKind, PlainDate};
    ///
    /// let engine = TemporalEngine::default();
    /// let value = engine.convert("2023-12-25", ValueKind::PlainDate).unwrap();
    /// assert_eq!(value, TemporalValue::from(PlainDate::new(2023, 12, 25).unwrap()));
    /// ```
    pub fn convert(&self, input: impl Into<TemporalInput>, kind: ValueKind) -> Result<TemporalValue> {
        let config = self.config();
        Converter::new(&config).convert(&input.into(), kind)
    }

    pub fn to_plain_date(&self, input: impl Into<TemporalInput>) -> Result<PlainDate> {
        let config = self.config();
        Converter::new(&config).to_plain_date(&input.into())
    }

    pub fn to_plain_time(&self, input: impl Into<TemporalInput>) -> Result<PlainTime> {
        let config = self.config();
        Converter::new(&config).to_plain_time(&input.into())
    }

    pub fn to_plain_date_time(&self, input: impl Into<TemporalInput>) -> Result<PlainDateTime> {
        let config = self.config();
        Converter::new(&config).to_plain_date_time(&input.into())
    }

    /// `time_zone` overrides the configured default zone.
    pub fn to_zoned_date_time(
        &self,
        input: impl Into<TemporalInput>,
        time_zone: Option<&str>,
    ) -> Result<ZonedDateTime> {
        let config = self.config();
        Converter::new(&config).to_zoned_date_time(&input.into(), time_zone)
    }

    pub fn to_instant(&self, input: impl Into<TemporalInput>) -> Result<Instant> {
        let config = self.config();
        Converter::new(&config).to_instant(&input.into())
    }

    pub fn to_duration(&self, input: impl Into<TemporalInput>) -> Result<Duration> {
        let config = self.config();
        Converter::new(&config).to_duration(&input.into())
    }

    // ── Arithmetic & comparison ─────────────────────────────────────────

    /// Add a duration given as text, milliseconds, fields or a value.
    ///
    /// # Errors
    ///
    /// Fails when `duration` is not a duration, or as [`arith::add`] does.
    pub fn add(&self, value: &TemporalValue, duration: impl Into<TemporalInput>) -> Result<TemporalValue> {
        arith::add(value, &self.to_duration(duration)?)
    }

    pub fn subtract(
        &self,
        value: &TemporalValue,
        duration: impl Into<TemporalInput>,
    ) -> Result<TemporalValue> {
        arith::subtract(value, &self.to_duration(duration)?)
    }

    pub fn compare(&self, a: &TemporalValue, b: &TemporalValue) -> Result<Ordering> {
        arith::compare(a, b)
    }

    pub fn is_before(&self, a: &TemporalValue, b: &TemporalValue) -> Result<bool> {
        arith::is_before(a, b)
    }

    pub fn is_after(&self, a: &TemporalValue, b: &TemporalValue) -> Result<bool> {
        arith::is_after(a, b)
    }

    pub fn is_equal(&self, a: &TemporalValue, b: &TemporalValue) -> Result<bool> {
        arith::is_equal(a, b)
    }

    pub fn compare_detailed(&self, a: &TemporalValue, b: &TemporalValue) -> Result<ComparisonResult> {
        arith::compare_detailed(a, b)
    }

    /// Duration from `a` to `b`. Without `largest` the kind's default is used.
    ///
    /// # Errors
    ///
    /// As for [`arith::difference`].
    pub fn difference(
        &self,
        a: &TemporalValue,
        b: &TemporalValue,
        largest: Option<Unit>,
    ) -> Result<Duration> {
        let largest = largest.unwrap_or_else(|| a.kind().default_largest_unit());
        arith::difference(a, b, largest)
    }

    pub fn difference_in(&self, unit: Unit, a: &TemporalValue, b: &TemporalValue) -> Result<i64> {
        arith::difference_in(unit, a, b)
    }

    pub fn range(&self, start: TemporalValue, end: TemporalValue) -> Result<TemporalRange> {
        TemporalRange::new(start, end)
    }

    /// Inclusive on both ends.
    pub fn is_in_range(
        &self,
        value: &TemporalValue,
        start: &TemporalValue,
        end: &TemporalValue,
    ) -> Result<bool> {
        Ok(!arith::is_before(value, start)? && !arith::is_after(value, end)?)
    }

    // ── Formatting ──────────────────────────────────────────────────────

    /// Render `value`; an empty string when the options cannot apply.
    pub fn format(&self, value: &TemporalValue, options: &FormatOptions) -> String {
        format::format(value, options, &self.config(), self.formatter.as_ref())
    }

    pub fn try_format(&self, value: &TemporalValue, options: &FormatOptions) -> Result<String> {
        format::try_format(value, options, &self.config(), self.formatter.as_ref())
    }

    pub fn format_preset(&self, value: &TemporalValue, preset: FormatPreset) -> String {
        self.format(value, &preset.options())
    }

    /// Convert then render. Absent or unconvertible input renders as `""`.
    pub fn format_input<I: Into<TemporalInput>>(
        &self,
        input: Option<I>,
        kind: ValueKind,
        options: &FormatOptions,
    ) -> String {
        let Some(input) = input else {
            return String::new();
        };
        match self.convert(input, kind) {
            Ok(value) => self.format(&value, options),
            Err(err) => {
                warn!(%kind, error = %err, "input could not be converted for display");
                String::new()
            }
        }
    }

    pub fn format_duration(&self, duration: &Duration, style: DurationStyle) -> String {
        format::format_duration(duration, style)
    }

    /// Describe `value` relative to `reference`, or to today in the
    /// configured zone. An empty string when either has no calendar date.
    ///
    /// ```
    /// use temporal_kit::{TemporalEngine, ValueKind};
    ///
    /// let engine = TemporalEngine::default();
    /// let date = engine.convert("2024-03-01", ValueKind::PlainDate).unwrap();
    /// let today = engine.convert("2024-03-15", ValueKind::PlainDate).unwrap();
    /// assert_eq!(engine.format_relative(&date, Some(&today)), "2 weeks ago");
    /// ```
    pub fn format_relative(&self, value: &TemporalValue, reference: Option<&TemporalValue>) -> String {
        let dates = self.to_plain_date(value).and_then(|date| {
            let reference = match reference {
                Some(r) => self.to_plain_date(r)?,
                None => self.now().plain_date()?,
            };
            Ok((date, reference))
        });
        match dates {
            Ok((date, reference)) => format::format_relative(&date, &reference),
            Err(err) => {
                warn!(value = %value, error = %err, "relative formatting failed");
                String::new()
            }
        }
    }

    // ── Validation ──────────────────────────────────────────────────────

    /// Whether `input` converts to `kind`. Never fails.
    pub fn is_valid(&self, input: impl Into<TemporalInput>, kind: ValueKind) -> bool {
        self.validate(input, kind).is_valid
    }

    /// Like [`TemporalEngine::is_valid`], with the reasons for rejection.
    pub fn validate(&self, input: impl Into<TemporalInput>, kind: ValueKind) -> ValidationResult {
        let config = self.config();
        validate::validate_input(&Converter::new(&config), &input.into(), kind)
    }

    pub fn validate_options(&self, options: &FormatOptions) -> ValidationResult {
        validate::validate_options(options, self.formatter.as_ref())
    }

    // ── Current time ────────────────────────────────────────────────────

    /// Read the clock once; every view of the returned [`Now`] agrees.
    pub fn now(&self) -> Now {
        Now {
            instant: self.clock.now(),
            config: self.config(),
        }
    }
}

/// One clock reading, viewable as any kind.
#[derive(Debug, Clone)]
pub struct Now {
    instant: Instant,
    config: Arc<TemporalConfig>,
}

impl Now {
    pub fn instant(&self) -> Instant {
        self.instant
    }

    /// The reading in `time_zone`, or in the configured default zone.
    pub fn zoned_date_time(&self, time_zone: Option<&str>) -> Result<ZonedDateTime> {
        let zone = time_zone.unwrap_or(&self.config.default_time_zone);
        Ok(ZonedDateTime::from_instant(&self.instant, zone)?.with_calendar(self.config.default_calendar))
    }

    pub fn plain_date_time(&self) -> Result<PlainDateTime> {
        Ok(self.zoned_date_time(None)?.to_plain_date_time())
    }

    pub fn plain_date(&self) -> Result<PlainDate> {
        Ok(self.zoned_date_time(None)?.to_plain_date())
    }

    pub fn plain_time(&self) -> Result<PlainTime> {
        Ok(self.zoned_date_time(None)?.to_plain_time())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::error::TemporalError;
    use crate::options::Style;

    fn engine() -> TemporalEngine {
        let at: Instant = "2024-03-15T23:30:00Z".parse().unwrap();
        TemporalEngine::default().with_clock(FixedClock(at))
    }

    #[test]
    fn test_convert_and_add() {
        let engine = engine();
        let date = engine.convert("2023-12-25", ValueKind::PlainDate).unwrap();
        let later = engine.add(&date, "P1Y2M").unwrap();
        assert_eq!(later.to_string(), "2025-02-25");
        let back = engine.subtract(&later, "P1Y2M").unwrap();
        assert_eq!(back, date);
    }

    #[test]
    fn test_add_rejects_bad_duration() {
        let engine = engine();
        let date = engine.convert("2023-12-25", ValueKind::PlainDate).unwrap();
        assert!(matches!(
            engine.add(&date, "one month"),
            Err(TemporalError::Conversion { .. })
        ));
    }

    #[test]
    fn test_difference_defaults_to_kind_unit() {
        let engine = engine();
        let a = engine.convert("2023-12-25", ValueKind::PlainDate).unwrap();
        let b = engine.convert("2025-02-25", ValueKind::PlainDate).unwrap();
        assert_eq!(engine.difference(&a, &b, None).unwrap().get_days(), 428);
        assert_eq!(engine.difference_in(Unit::Day, &a, &b).unwrap(), 428);
    }

    #[test]
    fn test_in_range() {
        let engine = engine();
        let v = |s: &str| engine.convert(s, ValueKind::PlainDate).unwrap();
        assert!(engine.is_in_range(&v("2024-01-01"), &v("2024-01-01"), &v("2024-12-31")).unwrap());
        assert!(!engine.is_in_range(&v("2025-01-01"), &v("2024-01-01"), &v("2024-12-31")).unwrap());
    }

    #[test]
    fn test_now_uses_configured_zone() {
        let engine = engine();
        assert_eq!(engine.now().plain_date().unwrap().to_string(), "2024-03-15");
        engine
            .set_config(&ConfigPatch::default().time_zone("Asia/Tokyo"))
            .unwrap();
        let now = engine.now();
        assert_eq!(now.plain_date().unwrap().to_string(), "2024-03-16");
        assert_eq!(now.plain_time().unwrap().to_string(), "08:30:00");
        assert_eq!(
            now.zoned_date_time(Some("America/New_York")).unwrap().to_string(),
            "2024-03-15T19:30:00-04:00[America/New_York]"
        );
    }

    #[test]
    fn test_format_input_handles_absent_and_bad_input() {
        let engine = engine();
        let options = FormatOptions::date_style(Style::Long);
        assert_eq!(engine.format_input(None::<&str>, ValueKind::PlainDate, &options), "");
        assert_eq!(engine.format_input(Some("garbage"), ValueKind::PlainDate, &options), "");
        assert_eq!(
            engine.format_input(Some("2023-12-25"), ValueKind::PlainDate, &options),
            "December 25, 2023"
        );
    }

    #[test]
    fn test_format_relative_defaults_to_today() {
        let engine = engine();
        let date = engine.convert("2024-03-18", ValueKind::PlainDate).unwrap();
        assert_eq!(engine.format_relative(&date, None), "in 3 days");
        let reference = engine.convert("2024-03-18T09:00", ValueKind::PlainDateTime).unwrap();
        assert_eq!(engine.format_relative(&date, Some(&reference)), "today");
    }

    #[test]
    fn test_locale_follows_config() {
        let engine = engine();
        let date = engine.convert("2023-12-25", ValueKind::PlainDate).unwrap();
        let options = FormatOptions::date_style(Style::Long);
        engine
            .set_config(&ConfigPatch::default().locale("fr-FR"))
            .unwrap();
        assert!(engine.format(&date, &options).contains("décembre"));
    }

    #[test]
    fn test_validation() {
        let engine = engine();
        assert!(engine.is_valid("2024-02-29", ValueKind::PlainDate));
        assert!(!engine.is_valid("2023-02-29", ValueKind::PlainDate));
        assert!(!engine.validate_options(&FormatOptions::default()).is_valid);
    }
}
