//! Availability resolver and facility capacity policy.
//!
//! A date is selectable only when the calendar classifies it as
//! [`DayStatus::Available`] and the owner has no confirmed booking on it.
//! Dates the owner already booked are reported as [`Availability::Booked`]
//! so a calendar can render them apart from closed days.

use super::calendar::{DayStatus, classify};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use utoipa::ToSchema;

/// How a date presents to a particular owner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    /// Open weekday with no existing booking by this owner
    Available,
    /// The owner already holds a confirmed booking on this date
    Booked,
    /// In the past
    Past,
    /// Saturday or Sunday
    Weekend,
    /// Facility headcount has reached the configured cap
    Full,
}

impl Availability {
    pub fn is_selectable(self) -> bool {
        self == Availability::Available
    }
}

/// "Today" plus the owner's confirmed booking dates, the inputs every
/// availability question needs.
#[derive(Debug, Clone, Default)]
pub struct AvailabilityContext {
    pub today: NaiveDate,
    pub booked: BTreeSet<NaiveDate>,
}

impl AvailabilityContext {
    pub fn new(today: NaiveDate, booked: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self {
            today,
            booked: booked.into_iter().collect(),
        }
    }

    pub fn resolve(&self, date: NaiveDate) -> Availability {
        resolve(date, self.today, &self.booked)
    }

    pub fn is_selectable(&self, date: NaiveDate) -> bool {
        is_selectable(date, self.today, &self.booked)
    }
}

/// Presentation status for `date`. An owner's existing booking is reported
/// ahead of the calendar status.
pub fn resolve(date: NaiveDate, today: NaiveDate, owner_booked: &BTreeSet<NaiveDate>) -> Availability {
    if owner_booked.contains(&date) {
        return Availability::Booked;
    }
    match classify(date, today) {
        DayStatus::Past => Availability::Past,
        DayStatus::Weekend => Availability::Weekend,
        DayStatus::Available => Availability::Available,
    }
}

/// Whether `date` may be added to a new selection
pub fn is_selectable(date: NaiveDate, today: NaiveDate, owner_booked: &BTreeSet<NaiveDate>) -> bool {
    classify(date, today) == DayStatus::Available && !owner_booked.contains(&date)
}

/// Facility-wide daily headcount cap.
///
/// `max_dogs_per_day = None` leaves headcount unchecked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CapacityPolicy {
    pub max_dogs_per_day: Option<u32>,
}

impl CapacityPolicy {
    pub fn new(max_dogs_per_day: Option<u32>) -> Self {
        Self { max_dogs_per_day }
    }

    pub fn is_enforced(&self) -> bool {
        self.max_dogs_per_day.is_some()
    }

    /// Whether `requested` more dogs fit on a day that already has `booked` dogs
    pub fn admits(&self, booked: u32, requested: u32) -> bool {
        match self.max_dogs_per_day {
            Some(cap) => booked.saturating_add(requested) <= cap,
            None => true,
        }
    }

    /// Whether a day with `booked` dogs is already at the cap
    pub fn is_full(&self, booked: u32) -> bool {
        self.max_dogs_per_day.is_some_and(|cap| booked >= cap)
    }
}
