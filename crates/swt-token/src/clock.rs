//! Time sources for issuance and expiry checks.

use chrono::{DateTime, TimeDelta, Utc};
use std::sync::{PoisonError, RwLock};

/// Source of the current instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: RwLock<DateTime<Utc>>,
}

impl ManualClock {
    /// Create a clock frozen at `start`.
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: RwLock::new(start),
        }
    }

    /// Jump to `instant`.
    pub fn set(&self, instant: DateTime<Utc>) {
        *self.now.write().unwrap_or_else(PoisonError::into_inner) = instant;
    }

    /// Move forward (or backward, for negative deltas) by `delta`.
    ///
    /// Returns `false` and leaves the clock unchanged if the result would
    /// fall outside chrono's range.
    pub fn advance(&self, delta: TimeDelta) -> bool {
        let mut now = self.now.write().unwrap_or_else(PoisonError::into_inner);
        match now.checked_add_signed(delta) {
            Some(next) => {
                *now = next;
                true
            }
            None => false,
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read().unwrap_or_else(PoisonError::into_inner)
    }
}
