//! Source of "today" for availability decisions.

use chrono::{Local, NaiveDate};

pub trait Clock: Send + Sync {
    /// The facility's current local date
    fn today(&self) -> NaiveDate;
}

/// Local date of the host
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Always the same date; for tests and replaying a day
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
