//! Time source for note timestamps.
//!
//! Store code reads time only through `Clock` so tests can drive it.

use crate::model::note::Timestamp;
use chrono::Utc;
use std::cell::Cell;

pub trait Clock {
    fn now(&self) -> Timestamp;
}

/// Wall-clock time in UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_datetime(Utc::now())
    }
}

/// Manually advanced clock for deterministic tests and replays.
#[derive(Debug)]
pub struct ManualClock {
    epoch_ms: Cell<i64>,
}

impl ManualClock {
    pub fn starting_at(epoch_ms: i64) -> Self {
        Self {
            epoch_ms: Cell::new(epoch_ms),
        }
    }

    pub fn set(&self, epoch_ms: i64) {
        self.epoch_ms.set(epoch_ms);
    }

    pub fn advance(&self, delta_ms: i64) {
        self.epoch_ms.set(self.epoch_ms.get() + delta_ms);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_epoch_ms(self.epoch_ms.get()).unwrap_or_else(|| SystemClock.now())
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

#[cfg(test)]
mod tests {
    use super::{Clock, ManualClock};

    #[test]
    fn manual_clock_advances() {
        let clock = ManualClock::starting_at(1_000);
        assert_eq!(clock.now().epoch_ms(), 1_000);
        clock.advance(250);
        assert_eq!(clock.now().epoch_ms(), 1_250);
        clock.set(10);
        assert_eq!(clock.now().epoch_ms(), 10);
    }
}
