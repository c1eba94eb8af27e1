//! Time source for cooldowns, buff expiry and spawn tracking.
//!
//! Services never call `Utc::now()` directly; they read the engine clock so
//! tests can move time forward explicitly.

use chrono::{DateTime, Duration, TimeZone, Utc};
use parking_lot::Mutex;

pub type Timestamp = DateTime<Utc>;

pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now()
    }
}

/// Clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Timestamp>,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Clock starting at the Unix epoch
    pub fn at_epoch() -> Self {
        Self::new(Utc.timestamp_opt(0, 0).single().unwrap_or_default())
    }

    pub fn advance_secs(&self, secs: f64) {
        let mut now = self.now.lock();
        *now += secs_to_duration(secs);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.now.lock()
    }
}

/// Fractional seconds to a chrono duration (millisecond precision)
pub fn secs_to_duration(secs: f64) -> Duration {
    Duration::milliseconds((secs * 1000.0).round() as i64)
}

/// Seconds from `now` until `until`, clamped at zero
pub fn secs_until(now: Timestamp, until: Timestamp) -> f64 {
    let millis = (until - now).num_milliseconds().max(0);
    millis as f64 / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_advances() {
        let clock = ManualClock::at_epoch();
        let start = clock.now();
        clock.advance_secs(2.5);
        assert_eq!((clock.now() - start).num_milliseconds(), 2500);
    }

    #[test]
    fn test_secs_until_clamps() {
        let clock = ManualClock::at_epoch();
        let start = clock.now();
        clock.advance_secs(10.0);
        assert_eq!(secs_until(clock.now(), start), 0.0);
        assert!((secs_until(start, clock.now()) - 10.0).abs() < 1e-9);
    }
}
