//! Durable state behind the allocation engine.
//!
//! The engine reads owners' subscriptions and dogs and writes bookings and
//! subscription debits. Writes happen only inside a [`BookingUnitOfWork`],
//! which either commits as a whole or, when dropped without
//! [`commit`](BookingUnitOfWork::commit), leaves the store exactly as it was.
//!
//! Two backends are provided:
//!
//! - [`InMemoryBookingStore`]: a single mutex over the whole state; suitable
//!   for tests, demos and single-process deployments. State is lost on restart.
//! - [`PgBookingStore`]: PostgreSQL via sqlx; row locks on the subscription
//!   serialize confirmations per subscription.

use crate::models::{Booking, Dog, NewBooking, Subscription};
use crate::types::{DogId, OwnerId, SubscriptionId};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};

pub mod errors;
pub mod in_memory;
pub mod postgres;

pub use errors::{Result, StoreError};
pub use in_memory::InMemoryBookingStore;
pub use postgres::PgBookingStore;

/// Storage seam for the booking engine.
///
/// Read-side methods serve calendar rendering and listings; they see only
/// committed state. All mutation goes through [`BookingStore::begin`].
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Start an atomic unit of work
    async fn begin(&self) -> Result<Box<dyn BookingUnitOfWork + '_>>;

    /// The owner's active subscription, if any
    async fn active_subscription(&self, owner_id: OwnerId) -> Result<Option<Subscription>>;

    /// All of the owner's dogs, approved or not
    async fn dogs(&self, owner_id: OwnerId) -> Result<Vec<Dog>>;

    /// Dates in `[from, to]` on which the owner holds a confirmed booking
    async fn booked_dates(&self, owner_id: OwnerId, from: NaiveDate, to: NaiveDate) -> Result<BTreeSet<NaiveDate>>;

    /// Confirmed dog headcount per date in `[from, to]`; dates with no bookings are omitted
    async fn headcounts(&self, from: NaiveDate, to: NaiveDate) -> Result<BTreeMap<NaiveDate, u32>>;

    /// The owner's bookings, most recent date first
    async fn list_bookings(&self, owner_id: OwnerId) -> Result<Vec<Booking>>;
}

/// One atomic check-then-write sequence.
///
/// Implementations hold whatever lock makes the sequence exclusive for the
/// subscription being debited, from [`lock_active_subscription`](Self::lock_active_subscription)
/// until commit or drop.
#[async_trait]
pub trait BookingUnitOfWork: Send {
    /// Fetch the owner's active subscription and hold it exclusively
    async fn lock_active_subscription(&mut self, owner_id: OwnerId) -> Result<Option<Subscription>>;

    /// Which of `dates` the owner already holds a confirmed booking on
    async fn booked_dates(&mut self, owner_id: OwnerId, dates: &BTreeSet<NaiveDate>) -> Result<BTreeSet<NaiveDate>>;

    /// Serialize headcount checks on `dates` across owners
    async fn lock_dates_for_capacity(&mut self, dates: &BTreeSet<NaiveDate>) -> Result<()>;

    /// Confirmed dog headcount on each of `dates` (missing = 0)
    async fn headcounts(&mut self, dates: &BTreeSet<NaiveDate>) -> Result<BTreeMap<NaiveDate, u32>>;

    /// IDs of the owner's approved dogs
    async fn approved_dog_ids(&mut self, owner_id: OwnerId) -> Result<BTreeSet<DogId>>;

    async fn insert_booking(&mut self, booking: &NewBooking) -> Result<Booking>;

    /// Move `days` from remaining to used. Returns `None` if the subscription
    /// no longer has that many days left.
    async fn debit_days(&mut self, subscription_id: SubscriptionId, days: i32) -> Result<Option<Subscription>>;

    async fn commit(self: Box<Self>) -> Result<()>;
}
