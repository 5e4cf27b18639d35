use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeDelta};

/// Source of the local wall-clock time used for day-scoped keys
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;

    fn today(&self) -> NaiveDate {
        self.now().date()
    }

    /// Time left until the next local midnight
    fn until_midnight(&self) -> Duration {
        let now = self.now();
        let midnight = now
            .date()
            .succ_opt()
            .and_then(|tomorrow| tomorrow.and_hms_opt(0, 0, 0));
        match midnight {
            Some(midnight) => (midnight - now).to_std().unwrap_or(Duration::ZERO),
            None => Duration::ZERO,
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Clock that only moves when told to
#[derive(Debug)]
pub struct FixedClock {
    timestamp: AtomicI64,
}

impl FixedClock {
    /// Noon on `date`
    pub fn new(date: NaiveDate) -> Self {
        let noon = date.and_hms_opt(12, 0, 0).unwrap_or_default();
        Self::at(noon)
    }

    pub fn at(now: NaiveDateTime) -> Self {
        Self {
            timestamp: AtomicI64::new(now.and_utc().timestamp()),
        }
    }

    pub fn set(&self, now: NaiveDateTime) {
        self.timestamp
            .store(now.and_utc().timestamp(), Ordering::SeqCst);
    }

    pub fn advance(&self, by: TimeDelta) {
        self.timestamp.fetch_add(by.num_seconds(), Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        DateTime::from_timestamp(self.timestamp.load(Ordering::SeqCst), 0)
            .map(|dt| dt.naive_utc())
            .unwrap_or_default()
    }
}
