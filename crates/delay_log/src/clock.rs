//! Time sources backing delay computation.

use std::{
    fmt,
    sync::{Mutex, PoisonError},
};

use time::OffsetDateTime;

/// A source of the current time.
///
/// The delay field on every record is computed as `clock.now()` minus the
/// facility start timestamp. Injecting a clock makes that computation
/// deterministic in tests, without real wall-clock waits.
pub trait Clock: fmt::Debug + Send + Sync {
    /// Returns the current instant in UTC.
    fn now(&self) -> OffsetDateTime;
}

/// The wall clock. This is the clock used by
/// [`LoggingFacility::initialize`][crate::LoggingFacility::initialize].
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// A manually advanced clock for deterministic tests.
///
/// Time only moves when [`ManualClock::advance`] is called.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<OffsetDateTime>,
}

impl ManualClock {
    /// Creates a clock frozen at the given instant.
    pub fn starting_at(start: OffsetDateTime) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Moves the clock forward by the given duration.
    pub fn advance(&self, by: time::Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> OffsetDateTime {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
