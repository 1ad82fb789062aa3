//! The source of the current time for token expiry and transaction timestamps.

use std::fmt::Debug;

use time::OffsetDateTime;

/// Something that can tell the current time.
pub trait Clock: Debug + Send + Sync {
    /// The current date and time in UTC.
    fn now(&self) -> OffsetDateTime;
}

/// A [Clock] that reads the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

#[cfg(test)]
pub use fixed::FixedClock;
