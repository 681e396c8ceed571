//! Wall-clock sources
//!
//! The engine never reads the system time directly; it asks a [`Clock`].
//! Production uses [`SystemClock`], tests and simulations drive a
//! [`ManualClock`] forward explicitly.

use crate::types::Timestamp;
use chrono::Utc;
use parking_lot::RwLock;
use std::sync::Arc;

/// Source of the current time
pub trait Clock: Send + Sync + 'static {
    /// Current time in seconds since the Unix epoch
    fn now(&self) -> Timestamp;
}

/// System wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now().timestamp()
    }
}

/// Manually advanced clock
///
/// Clones share the same underlying time, so a test can keep one handle while
/// the engine (or its actor task) owns another.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<RwLock<Timestamp>>,
    seconds_per_day: i64,
}

impl ManualClock {
    /// Create clock starting at `start`
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: Arc::new(RwLock::new(start)),
            seconds_per_day: 86_400,
        }
    }

    /// Use a custom day length for [`ManualClock::advance_days`]
    pub fn with_day_length(mut self, seconds_per_day: i64) -> Self {
        self.seconds_per_day = seconds_per_day;
        self
    }

    /// Jump to an absolute time
    pub fn set(&self, now: Timestamp) {
        *self.now.write() = now;
    }

    /// Move forward by `secs`
    pub fn advance_secs(&self, secs: i64) {
        *self.now.write() += secs;
    }

    /// Move forward by whole days
    pub fn advance_days(&self, days: i64) {
        self.advance_secs(days * self.seconds_per_day);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.now.read()
    }
}
