//! Wall-clock source.
//!
//! The engine never reads the system time directly; it asks a [`Clock`].
//! Tests and deterministic hosts inject a [`FixedClock`].

use chrono::Utc;

use crate::instant::Instant;

pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Reads `chrono::Utc::now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::from(Utc::now())
    }
}

/// Always reports the same instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub Instant);

impl Clock for FixedClock {
    fn now(&self) -> Instant {
        self.0
    }
}
