//! Clock abstraction so time-dependent behavior is testable.

use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

/// Source of the current time.
///
/// The cache and index stats read time through this trait instead of calling
/// `Utc::now()` directly, so tests can drive TTL expiry deterministically.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
/// use chrono::Utc;
/// use knowledgescout::clock::{Clock, ManualClock};
///
/// let clock = ManualClock::new(Utc::now());
/// let before = clock.now();
/// clock.advance(Duration::from_secs(61));
/// assert_eq!(clock.now() - before, chrono::Duration::seconds(61));
/// ```
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, duration: Duration) {
        let mut guard = self.now.lock();
        *guard += chrono::Duration::from_std(duration).unwrap_or(chrono::Duration::zero());
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}
