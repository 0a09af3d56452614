//! In-memory booking store.
//!
//! All state sits behind one async mutex. A unit of work holds the mutex from
//! `begin` until it is committed or dropped, and edits a working copy of the
//! state; commit swaps the copy in. Dropping the unit of work discards the copy,
//! so a failure part way through a confirmation leaves nothing behind.
//!
//! Suitable for tests, demos and single-process deployments. State is lost on restart.

use super::{BookingStore, BookingUnitOfWork, Result, StoreError};
use crate::models::{Booking, Dog, NewBooking, Subscription, Tier};
use crate::types::{DogId, OwnerId, SubscriptionId};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, instrument};
use uuid::Uuid;

const NO_FAULT: usize = usize::MAX;

#[derive(Debug, Clone, Default)]
struct State {
    subscriptions: HashMap<SubscriptionId, Subscription>,
    dogs: HashMap<DogId, Dog>,
    bookings: Vec<Booking>,
}

impl State {
    fn active_subscription(&self, owner_id: OwnerId) -> Option<&Subscription> {
        self.subscriptions
            .values()
            .filter(|s| s.owner_id == owner_id && s.active)
            .max_by_key(|s| s.created_at)
    }

    fn confirmed(&self) -> impl Iterator<Item = &Booking> {
        self.bookings.iter().filter(|b| b.is_confirmed())
    }

    fn headcount(&self, date: NaiveDate) -> u32 {
        self.confirmed()
            .filter(|b| b.booking_date == date)
            .map(|b| u32::try_from(b.dog_ids.len()).unwrap_or(u32::MAX))
            .fold(0u32, u32::saturating_add)
    }
}

/// Seed data for an in-memory store, loadable from configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Fixtures {
    #[serde(default)]
    pub subscriptions: Vec<SubscriptionFixture>,
    #[serde(default)]
    pub dogs: Vec<DogFixture>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubscriptionFixture {
    pub owner_id: OwnerId,
    pub tier: Tier,
    /// Defaults to the tier's allowance
    #[serde(default)]
    pub days_remaining: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DogFixture {
    #[serde(default)]
    pub id: Option<DogId>,
    pub owner_id: OwnerId,
    pub name: String,
    #[serde(default = "default_approved")]
    pub is_approved: bool,
}

fn default_approved() -> bool {
    true
}

#[derive(Clone)]
pub struct InMemoryBookingStore {
    state: Arc<Mutex<State>>,
    lock_timeout: Duration,
    fail_inserts_after: Arc<AtomicUsize>,
}

impl InMemoryBookingStore {
    pub fn new(lock_timeout: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(State::default())),
            lock_timeout,
            fail_inserts_after: Arc::new(AtomicUsize::new(NO_FAULT)),
        }
    }

    pub async fn from_fixtures(fixtures: &Fixtures, lock_timeout: Duration) -> Result<Self> {
        let store = Self::new(lock_timeout);
        for fixture in &fixtures.subscriptions {
            let mut subscription = Subscription::issue(fixture.owner_id, fixture.tier);
            if let Some(days) = fixture.days_remaining {
                if days < 0 {
                    return Err(StoreError::Other(anyhow::anyhow!(
                        "negative days_remaining ({days}) for owner {}",
                        fixture.owner_id
                    )));
                }
                subscription = subscription.with_days_remaining(days);
            }
            store.insert_subscription(subscription).await;
        }
        for fixture in &fixtures.dogs {
            store
                .insert_dog(Dog {
                    id: fixture.id.unwrap_or_else(Uuid::new_v4),
                    owner_id: fixture.owner_id,
                    name: fixture.name.clone(),
                    is_approved: fixture.is_approved,
                })
                .await;
        }
        debug!(
            subscriptions = fixtures.subscriptions.len(),
            dogs = fixtures.dogs.len(),
            "Seeded in-memory store"
        );
        Ok(store)
    }

    pub async fn insert_subscription(&self, subscription: Subscription) {
        self.state.lock().await.subscriptions.insert(subscription.id, subscription);
    }

    pub async fn insert_dog(&self, dog: Dog) {
        self.state.lock().await.dogs.insert(dog.id, dog);
    }

    /// Committed state of one subscription
    pub async fn subscription(&self, id: SubscriptionId) -> Option<Subscription> {
        self.state.lock().await.subscriptions.get(&id).cloned()
    }

    /// Every booking row, in insertion order
    pub async fn bookings(&self) -> Vec<Booking> {
        self.state.lock().await.bookings.clone()
    }

    /// Make the insert after the next `n` successful ones fail. Lets tests
    /// exercise rollback of a partially written confirmation.
    pub fn fail_inserts_after(&self, n: usize) {
        self.fail_inserts_after.store(n, Ordering::SeqCst);
    }

    pub fn clear_faults(&self) {
        self.fail_inserts_after.store(NO_FAULT, Ordering::SeqCst);
    }
}

impl Default for InMemoryBookingStore {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}

#[async_trait]
impl BookingStore for InMemoryBookingStore {
    #[instrument(skip(self), err)]
    async fn begin(&self) -> Result<Box<dyn BookingUnitOfWork + '_>> {
        let guard = tokio::time::timeout(self.lock_timeout, self.state.clone().lock_owned())
            .await
            .map_err(|_| StoreError::Contention(format!("store lock not acquired within {:?}", self.lock_timeout)))?;
        let working = (*guard).clone();
        Ok(Box::new(InMemoryUnitOfWork {
            guard,
            working,
            fail_inserts_after: self.fail_inserts_after.load(Ordering::SeqCst),
        }))
    }

    async fn active_subscription(&self, owner_id: OwnerId) -> Result<Option<Subscription>> {
        Ok(self.state.lock().await.active_subscription(owner_id).cloned())
    }

    async fn dogs(&self, owner_id: OwnerId) -> Result<Vec<Dog>> {
        let state = self.state.lock().await;
        let mut dogs: Vec<Dog> = state.dogs.values().filter(|d| d.owner_id == owner_id).cloned().collect();
        dogs.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(dogs)
    }

    async fn booked_dates(&self, owner_id: OwnerId, from: NaiveDate, to: NaiveDate) -> Result<BTreeSet<NaiveDate>> {
        let state = self.state.lock().await;
        Ok(state
            .confirmed()
            .filter(|b| b.owner_id == owner_id && (from..=to).contains(&b.booking_date))
            .map(|b| b.booking_date)
            .collect())
    }

    async fn headcounts(&self, from: NaiveDate, to: NaiveDate) -> Result<BTreeMap<NaiveDate, u32>> {
        let state = self.state.lock().await;
        let mut counts = BTreeMap::new();
        for booking in state.confirmed().filter(|b| (from..=to).contains(&b.booking_date)) {
            let count: &mut u32 = counts.entry(booking.booking_date).or_default();
            *count = count.saturating_add(u32::try_from(booking.dog_ids.len()).unwrap_or(u32::MAX));
        }
        Ok(counts)
    }

    async fn list_bookings(&self, owner_id: OwnerId) -> Result<Vec<Booking>> {
        let state = self.state.lock().await;
        let mut bookings: Vec<Booking> = state.bookings.iter().filter(|b| b.owner_id == owner_id).cloned().collect();
        bookings.sort_by(|a, b| b.booking_date.cmp(&a.booking_date).then(b.created_at.cmp(&a.created_at)));
        Ok(bookings)
    }
}

struct InMemoryUnitOfWork {
    guard: OwnedMutexGuard<State>,
    working: State,
    fail_inserts_after: usize,
}

#[async_trait]
impl BookingUnitOfWork for InMemoryUnitOfWork {
    async fn lock_active_subscription(&mut self, owner_id: OwnerId) -> Result<Option<Subscription>> {
        // The whole store is already held
        Ok(self.working.active_subscription(owner_id).cloned())
    }

    async fn booked_dates(&mut self, owner_id: OwnerId, dates: &BTreeSet<NaiveDate>) -> Result<BTreeSet<NaiveDate>> {
        Ok(self
            .working
            .confirmed()
            .filter(|b| b.owner_id == owner_id && dates.contains(&b.booking_date))
            .map(|b| b.booking_date)
            .collect())
    }

    async fn lock_dates_for_capacity(&mut self, _dates: &BTreeSet<NaiveDate>) -> Result<()> {
        Ok(())
    }

    async fn headcounts(&mut self, dates: &BTreeSet<NaiveDate>) -> Result<BTreeMap<NaiveDate, u32>> {
        Ok(dates.iter().map(|date| (*date, self.working.headcount(*date))).collect())
    }

    async fn approved_dog_ids(&mut self, owner_id: OwnerId) -> Result<BTreeSet<DogId>> {
        Ok(self
            .working
            .dogs
            .values()
            .filter(|d| d.owner_id == owner_id && d.is_approved)
            .map(|d| d.id)
            .collect())
    }

    async fn insert_booking(&mut self, booking: &NewBooking) -> Result<Booking> {
        if self.fail_inserts_after == 0 {
            return Err(StoreError::Other(anyhow::anyhow!("injected insert failure")));
        }
        if self.fail_inserts_after != NO_FAULT {
            self.fail_inserts_after -= 1;
        }

        let clash = self
            .working
            .confirmed()
            .any(|b| b.owner_id == booking.owner_id && b.booking_date == booking.booking_date);
        if clash {
            return Err(StoreError::UniqueViolation {
                constraint: Some("bookings_owner_date_confirmed".to_string()),
                table: Some("bookings".to_string()),
                message: format!("owner already booked {}", booking.booking_date),
            });
        }

        let row = booking.clone().into_booking(Utc::now());
        self.working.bookings.push(row.clone());
        Ok(row)
    }

    async fn debit_days(&mut self, subscription_id: SubscriptionId, days: i32) -> Result<Option<Subscription>> {
        let subscription = self.working.subscriptions.get_mut(&subscription_id).ok_or(StoreError::NotFound)?;
        if subscription.days_remaining < days {
            return Ok(None);
        }
        subscription.days_remaining -= days;
        subscription.days_used += days;
        Ok(Some(subscription.clone()))
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let InMemoryUnitOfWork { mut guard, working, .. } = *self;
        *guard = working;
        Ok(())
    }
}
