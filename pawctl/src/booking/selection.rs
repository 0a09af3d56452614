//! In-progress selection of dates and dogs, built before a confirmation.
//!
//! A [`Selection`] is a plain value: it can be built and tested without any
//! UI, and handed to [`BookingAllocator::confirm`](super::allocator::BookingAllocator::confirm)
//! via [`Selection::into_request`]. One session type applies to every date.

use super::{
    allocator::ConfirmRequest,
    availability::AvailabilityContext,
    pricing::PricingTable,
};
use crate::models::{Dog, SessionType, Tier};
use crate::types::{DogId, OwnerId};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    dates: BTreeSet<NaiveDate>,
    dogs: BTreeSet<DogId>,
    session_type: SessionType,
}

impl Selection {
    pub fn new(session_type: SessionType) -> Self {
        Self {
            session_type,
            ..Default::default()
        }
    }

    /// Add or remove `date`. Dates that are not selectable are ignored.
    ///
    /// Returns whether the date is selected afterwards.
    pub fn toggle_date(&mut self, date: NaiveDate, availability: &AvailabilityContext) -> bool {
        if !availability.is_selectable(date) {
            return false;
        }
        if self.dates.remove(&date) {
            false
        } else {
            self.dates.insert(date);
            true
        }
    }

    /// Add or remove a dog. Only approved dogs may be added; removal is always allowed.
    ///
    /// Returns whether the dog is selected afterwards.
    pub fn toggle_dog(&mut self, dog: &Dog) -> bool {
        if self.dogs.remove(&dog.id) {
            return false;
        }
        if !dog.is_approved {
            return false;
        }
        self.dogs.insert(dog.id);
        true
    }

    /// Drop dates that stopped being selectable (e.g. after refreshing availability)
    pub fn retain_selectable(&mut self, availability: &AvailabilityContext) {
        self.dates.retain(|date| availability.is_selectable(*date));
    }

    pub fn clear(&mut self) {
        self.dates.clear();
        self.dogs.clear();
    }

    pub fn dates(&self) -> &BTreeSet<NaiveDate> {
        &self.dates
    }

    pub fn dogs(&self) -> &BTreeSet<DogId> {
        &self.dogs
    }

    pub fn session_type(&self) -> SessionType {
        self.session_type
    }

    /// Both dates and dogs chosen: the allocator may be invoked
    pub fn is_ready(&self) -> bool {
        !self.dates.is_empty() && !self.dogs.is_empty()
    }

    /// Price the selection against `tier`
    pub fn quote(&self, tier: Tier, pricing: &PricingTable) -> Quote {
        Quote::new(tier, self.session_type, self.dogs.len(), self.dates.len(), pricing)
    }

    pub fn into_request(self, owner_id: OwnerId, today: NaiveDate) -> ConfirmRequest {
        ConfirmRequest {
            owner_id,
            dates: self.dates,
            dog_ids: self.dogs,
            session_type: self.session_type,
            today,
        }
    }
}

/// Displayed cost of a selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub tier: Tier,
    pub session_type: SessionType,
    pub dog_count: usize,
    pub date_count: usize,
    /// Per dog, per day
    pub daily_rate: Decimal,
    /// `daily_rate` x `dog_count`
    pub per_date_total: Decimal,
    /// `per_date_total` x `date_count`
    pub grand_total: Decimal,
}

impl Quote {
    pub fn new(tier: Tier, session_type: SessionType, dog_count: usize, date_count: usize, pricing: &PricingTable) -> Self {
        let daily_rate = pricing.daily_rate(tier, session_type);
        let per_date_total = pricing.total_for_selection(tier, session_type, dog_count);
        Self {
            tier,
            session_type,
            dog_count,
            date_count,
            daily_rate,
            per_date_total,
            grand_total: per_date_total.saturating_mul(Decimal::from(date_count)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn ctx() -> AvailabilityContext {
        AvailabilityContext::new(date(2026, 10, 19), [date(2026, 10, 22)])
    }

    fn dog(approved: bool) -> Dog {
        Dog {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            name: "Biscuit".to_string(),
            is_approved: approved,
        }
    }

    #[test]
    fn test_toggle_date_adds_then_removes() {
        let mut selection = Selection::default();
        assert!(selection.toggle_date(date(2026, 10, 20), &ctx()));
        assert_eq!(selection.dates().len(), 1);
        assert!(!selection.toggle_date(date(2026, 10, 20), &ctx()));
        assert!(selection.dates().is_empty());
    }

    #[test]
    fn test_toggle_date_ignores_unselectable_dates() {
        let mut selection = Selection::default();
        // weekend, past, already booked
        for d in [date(2026, 10, 24), date(2026, 10, 16), date(2026, 10, 22)] {
            assert!(!selection.toggle_date(d, &ctx()));
        }
        assert!(selection.dates().is_empty());
    }

    #[test]
    fn test_toggle_dog_requires_approval() {
        let mut selection = Selection::default();
        let approved = dog(true);
        let pending = dog(false);

        assert!(selection.toggle_dog(&approved));
        assert!(!selection.toggle_dog(&pending));
        assert_eq!(selection.dogs().len(), 1);

        assert!(!selection.toggle_dog(&approved));
        assert!(selection.dogs().is_empty());
    }

    #[test]
    fn test_is_ready_needs_dates_and_dogs() {
        let mut selection = Selection::default();
        assert!(!selection.is_ready());
        selection.toggle_date(date(2026, 10, 20), &ctx());
        assert!(!selection.is_ready());
        selection.toggle_dog(&dog(true));
        assert!(selection.is_ready());
        selection.clear();
        assert!(!selection.is_ready());
    }

    #[test]
    fn test_retain_selectable_drops_stale_dates() {
        let mut selection = Selection::default();
        selection.toggle_date(date(2026, 10, 20), &ctx());
        selection.toggle_date(date(2026, 10, 21), &ctx());

        let refreshed = AvailabilityContext::new(date(2026, 10, 19), [date(2026, 10, 21)]);
        selection.retain_selectable(&refreshed);
        assert_eq!(selection.dates().iter().copied().collect::<Vec<_>>(), vec![date(2026, 10, 20)]);
    }

    #[test]
    fn test_quote_multiplies_per_date_total_by_dates() {
        let mut selection = Selection::new(SessionType::FullDay);
        selection.toggle_date(date(2026, 10, 20), &ctx());
        selection.toggle_date(date(2026, 10, 21), &ctx());
        selection.toggle_date(date(2026, 10, 23), &ctx());
        selection.toggle_dog(&dog(true));
        selection.toggle_dog(&dog(true));

        let quote = selection.quote(Tier::EightDays, &PricingTable::default());
        assert_eq!(quote.daily_rate, Decimal::from(38));
        assert_eq!(quote.per_date_total, Decimal::from(76));
        assert_eq!(quote.grand_total, Decimal::from(228));
        assert_eq!(quote.date_count, 3);
        assert_eq!(quote.dog_count, 2);
    }

    #[test]
    fn test_quote_saturates_on_huge_totals() {
        let pricing = PricingTable::new(Decimal::MAX / Decimal::from(2), Decimal::from(25));
        let quote = Quote::new(Tier::FourDays, SessionType::FullDay, 1, 3, &pricing);
        assert_eq!(quote.per_date_total, Decimal::MAX / Decimal::from(2));
        assert_eq!(quote.grand_total, Decimal::MAX);
    }

    #[test]
    fn test_into_request_carries_selection() {
        let mut selection = Selection::new(SessionType::HalfDay);
        selection.toggle_date(date(2026, 10, 20), &ctx());
        let approved = dog(true);
        selection.toggle_dog(&approved);

        let owner = Uuid::new_v4();
        let request = selection.into_request(owner, date(2026, 10, 19));
        assert_eq!(request.owner_id, owner);
        assert_eq!(request.session_type, SessionType::HalfDay);
        assert!(request.dog_ids.contains(&approved.id));
        assert!(request.dates.contains(&date(2026, 10, 20)));
    }
}
