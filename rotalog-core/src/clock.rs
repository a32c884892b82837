//! Time source and archive naming.
//!
//! Archives are named after the local calendar day of the write, so the clock
//! decides when the log rotates. Tests swap in a [`ManualClock`] to cross day
//! boundaries deterministically.

use chrono::{DateTime, Local, NaiveDate};
use std::sync::{Arc, Mutex, PoisonError};

/// Extension shared by every archive file.
pub const ARCHIVE_EXTENSION: &str = "tar.gz";

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

impl<T: Clock + ?Sized> Clock for Arc<T> {
    fn now(&self) -> DateTime<Local> {
        (**self).now()
    }
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Local>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Local>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Replace the current time.
    pub fn set(&self, now: DateTime<Local>) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = now;
    }

    /// Move the clock forward by `days` calendar days.
    pub fn advance_days(&self, days: i64) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += chrono::Duration::days(days);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Local> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// File name of the archive that holds records written on `date`.
pub fn archive_file_name(date: NaiveDate) -> String {
    format!("{}.{}", date.format("%Y-%m-%d"), ARCHIVE_EXTENSION)
}
