//! Process-wide defaults for locale, time zone and calendar.
//!
//! A [`SharedConfig`] holds one immutable [`TemporalConfig`] snapshot behind a
//! read-write lock. Readers clone the `Arc` and never block writers for longer
//! than the pointer swap; an update validates the merged result before it
//! becomes visible.

use std::sync::Arc;

use chrono_tz::Tz;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calendar::CalendarId;
use crate::error::{Result, TemporalError};
use crate::format;
use crate::zoned::parse_time_zone;

pub const DEFAULT_LOCALE: &str = "en-US";
pub const DEFAULT_TIME_ZONE: &str = "UTC";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TemporalConfig {
    pub default_locale: String,
    pub default_time_zone: String,
    pub default_calendar: CalendarId,
}

impl Default for TemporalConfig {
    fn default() -> Self {
        TemporalConfig {
            default_locale: DEFAULT_LOCALE.to_string(),
            default_time_zone: DEFAULT_TIME_ZONE.to_string(),
            default_calendar: CalendarId::Iso8601,
        }
    }
}

impl TemporalConfig {
    /// Load and validate a configuration from JSON. Missing keys keep their
    /// defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: TemporalConfig =
            serde_json::from_str(json).map_err(|e| TemporalError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the time zone and locale resolve.
    pub fn validate(&self) -> Result<()> {
        parse_time_zone(&self.default_time_zone)?;
        format::resolve_locale(&self.default_locale)
            .map_err(|_| TemporalError::Config(format!("unknown locale '{}'", self.default_locale)))?;
        Ok(())
    }

    pub(crate) fn time_zone(&self) -> Result<Tz> {
        parse_time_zone(&self.default_time_zone)
    }

    /// `self ⊕ patch`: fields present in the patch win.
    pub fn merged(&self, patch: &ConfigPatch) -> TemporalConfig {
        TemporalConfig {
            default_locale: patch
                .default_locale
                .clone()
                .unwrap_or_else(|| self.default_locale.clone()),
            default_time_zone: patch
                .default_time_zone
                .clone()
                .unwrap_or_else(|| self.default_time_zone.clone()),
            default_calendar: patch.default_calendar.unwrap_or(self.default_calendar),
        }
    }
}

/// A partial configuration update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConfigPatch {
    pub default_locale: Option<String>,
    pub default_time_zone: Option<String>,
    pub default_calendar: Option<CalendarId>,
}

impl ConfigPatch {
    pub fn locale(mut self, locale: impl Into<String>) -> Self {
        self.default_locale = Some(locale.into());
        self
    }

    pub fn time_zone(mut self, time_zone: impl Into<String>) -> Self {
        self.default_time_zone = Some(time_zone.into());
        self
    }

    pub fn calendar(mut self, calendar: CalendarId) -> Self {
        self.default_calendar = Some(calendar);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.default_locale.is_none()
            && self.default_time_zone.is_none()
            && self.default_calendar.is_none()
    }
}

/// Shared, atomically swapped configuration. Cloning shares the same state.
#[derive(Debug, Clone)]
pub struct SharedConfig {
    inner: Arc<RwLock<Arc<TemporalConfig>>>,
}

impl SharedConfig {
    pub fn new(config: TemporalConfig) -> Result<Self> {
        config.validate()?;
        Ok(SharedConfig {
            inner: Arc::new(RwLock::new(Arc::new(config))),
        })
    }

    /// The latest committed configuration.
    pub fn snapshot(&self) -> Arc<TemporalConfig> {
        Arc::clone(&self.inner.read())
    }

    /// Merge `patch` into the current configuration and publish the result.
    ///
    /// On error the previous snapshot stays in place.
    pub fn update(&self, patch: &ConfigPatch) -> Result<Arc<TemporalConfig>> {
        let mut guard = self.inner.write();
        let next = guard.merged(patch);
        next.validate()?;
        debug!(
            locale = %next.default_locale,
            time_zone = %next.default_time_zone,
            calendar = %next.default_calendar,
            "configuration updated"
        );
        let next = Arc::new(next);
        *guard = Arc::clone(&next);
        Ok(next)
    }
}

impl Default for SharedConfig {
    fn default() -> Self {
        SharedConfig {
            inner: Arc::new(RwLock::new(Arc::new(TemporalConfig::default()))),
        }
    }
}
