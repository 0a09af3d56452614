//! Booking allocator: turns a selection into bookings and a subscription debit.
//!
//! [`BookingAllocator::confirm`] runs every check and every write inside one
//! [`BookingUnitOfWork`](crate::store::BookingUnitOfWork). The subscription is
//! re-read under lock rather than trusted from the caller, and dates are
//! re-validated against the owner's bookings as of that lock, so a stale
//! selection or a second tab cannot overspend the balance or book a date twice.
//! The pricing table is read once, before the unit of work opens.
//!
//! Checks run in a fixed order and the first failure wins:
//!
//! 1. at least one dog ([`BookingError::NoDogsSelected`])
//! 2. at least one date ([`BookingError::NoDatesSelected`])
//! 3. an active subscription ([`BookingError::NoActiveSubscription`])
//! 4. enough days left ([`BookingError::InsufficientDaysRemaining`])
//! 5. every date still selectable ([`BookingError::DateNoLongerAvailable`])
//! 6. every dog the owner's and approved ([`BookingError::DogNotEligible`])
//! 7. facility headcount, when capped ([`BookingError::DayAtCapacity`])

use super::availability::{self, CapacityPolicy};
use super::pricing::PricingSource;
use super::selection::Quote;
use crate::metrics::BookingMetrics;
use crate::models::{Booking, NewBooking, SessionType, Subscription};
use crate::store::{BookingStore, StoreError};
use crate::types::{DogId, OwnerId, abbrev_uuid};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

/// Everything `confirm` needs from the caller. Sets make duplicate dates and
/// dogs collapse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmRequest {
    pub owner_id: OwnerId,
    pub dates: BTreeSet<NaiveDate>,
    pub dog_ids: BTreeSet<DogId>,
    pub session_type: SessionType,
    /// The caller's local date; dates before it are past
    pub today: NaiveDate,
}

/// Result of a successful confirmation
#[derive(Debug, Clone)]
pub struct Confirmation {
    /// One per selected date, in date order
    pub bookings: Vec<Booking>,
    /// The subscription after the debit
    pub subscription: Subscription,
    pub quote: Quote,
}

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("Select at least one dog")]
    NoDogsSelected,

    #[error("Select at least one date")]
    NoDatesSelected,

    #[error("No active subscription")]
    NoActiveSubscription,

    #[error("{requested} dates selected but only {remaining} days remaining ({deficit} short)")]
    InsufficientDaysRemaining { requested: usize, remaining: i32, deficit: u32 },

    #[error("{0} is no longer available")]
    DateNoLongerAvailable(NaiveDate),

    #[error("Dog {0} cannot be booked")]
    DogNotEligible(DogId),

    #[error("{date} is fully booked ({capacity} dogs)")]
    DayAtCapacity { date: NaiveDate, capacity: u32 },

    /// Another confirmation held the subscription for too long
    #[error("Booking is busy, try again: {0}")]
    Contention(String),

    /// The atomic write failed and was rolled back
    #[error("Storage failure: {0}")]
    Storage(StoreError),
}

impl BookingError {
    /// Whether retrying the same request may succeed. True only where the
    /// rollback guarantee means nothing was written.
    pub fn is_retryable(&self) -> bool {
        matches!(self, BookingError::Contention(_) | BookingError::Storage(_))
    }

    /// Stable label for logs and metrics
    pub fn reason(&self) -> &'static str {
        match self {
            BookingError::NoDogsSelected => "no_dogs_selected",
            BookingError::NoDatesSelected => "no_dates_selected",
            BookingError::NoActiveSubscription => "no_active_subscription",
            BookingError::InsufficientDaysRemaining { .. } => "insufficient_days_remaining",
            BookingError::DateNoLongerAvailable(_) => "date_no_longer_available",
            BookingError::DogNotEligible(_) => "dog_not_eligible",
            BookingError::DayAtCapacity { .. } => "day_at_capacity",
            BookingError::Contention(_) => "contention",
            BookingError::Storage(_) => "storage_failure",
        }
    }
}

impl From<StoreError> for BookingError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Contention(msg) => BookingError::Contention(msg),
            other => BookingError::Storage(other),
        }
    }
}

pub struct BookingAllocator {
    store: Arc<dyn BookingStore>,
    pricing: Arc<dyn PricingSource>,
    capacity: CapacityPolicy,
    metrics: Option<BookingMetrics>,
}

impl BookingAllocator {
    pub fn new(store: Arc<dyn BookingStore>, pricing: Arc<dyn PricingSource>, capacity: CapacityPolicy) -> Self {
        Self {
            store,
            pricing,
            capacity,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: BookingMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn capacity(&self) -> CapacityPolicy {
        self.capacity
    }

    /// Validate the request and, if every check passes, create one booking per
    /// date and debit the subscription by the number of dates, atomically.
    #[instrument(skip_all, fields(owner_id = %abbrev_uuid(&request.owner_id), dates = request.dates.len(), dogs = request.dog_ids.len()))]
    pub async fn confirm(&self, request: ConfirmRequest) -> Result<Confirmation, BookingError> {
        let started = Instant::now();
        let result = self.allocate(&request).await;
        let elapsed = started.elapsed().as_secs_f64();

        match &result {
            Ok(confirmation) => {
                info!(
                    subscription_id = %abbrev_uuid(&confirmation.subscription.id),
                    days_remaining = confirmation.subscription.days_remaining,
                    grand_total = %confirmation.quote.grand_total,
                    "Confirmed bookings"
                );
                if let Some(metrics) = &self.metrics {
                    metrics.record_confirmed(
                        request.session_type,
                        confirmation.bookings.len(),
                        confirmation.bookings.len() as u64,
                        elapsed,
                    );
                }
            }
            Err(e) => {
                if e.is_retryable() {
                    warn!(reason = e.reason(), error = %e, "Confirmation failed");
                } else {
                    debug!(reason = e.reason(), error = %e, "Confirmation rejected");
                }
                if let Some(metrics) = &self.metrics {
                    metrics.record_rejected(e.reason(), elapsed);
                }
            }
        }
        result
    }

    async fn allocate(&self, request: &ConfirmRequest) -> Result<Confirmation, BookingError> {
        if request.dog_ids.is_empty() {
            return Err(BookingError::NoDogsSelected);
        }
        if request.dates.is_empty() {
            return Err(BookingError::NoDatesSelected);
        }

        // Read before the unit of work opens: a source backed by the same
        // connection pool must not need a second connection mid-transaction
        let pricing = self.pricing.pricing_table().await?;

        // Dropping `uow` on any early return rolls everything back
        let mut uow = self.store.begin().await?;

        let subscription = uow
            .lock_active_subscription(request.owner_id)
            .await?
            .ok_or(BookingError::NoActiveSubscription)?;

        let requested = request.dates.len();
        let deficit = subscription.deficit_for(requested);
        if deficit > 0 {
            return Err(BookingError::InsufficientDaysRemaining {
                requested,
                remaining: subscription.days_remaining,
                deficit,
            });
        }

        let booked = uow.booked_dates(request.owner_id, &request.dates).await?;
        if let Some(date) = request
            .dates
            .iter()
            .find(|date| !availability::is_selectable(**date, request.today, &booked))
        {
            return Err(BookingError::DateNoLongerAvailable(*date));
        }

        let approved = uow.approved_dog_ids(request.owner_id).await?;
        if let Some(dog_id) = request.dog_ids.iter().find(|id| !approved.contains(*id)) {
            return Err(BookingError::DogNotEligible(*dog_id));
        }

        if let Some(capacity) = self.capacity.max_dogs_per_day {
            uow.lock_dates_for_capacity(&request.dates).await?;
            let headcounts = uow.headcounts(&request.dates).await?;
            let dogs = u32::try_from(request.dog_ids.len()).unwrap_or(u32::MAX);
            for date in &request.dates {
                let current = headcounts.get(date).copied().unwrap_or(0);
                if !self.capacity.admits(current, dogs) {
                    return Err(BookingError::DayAtCapacity { date: *date, capacity });
                }
            }
        }

        let quote = Quote::new(
            subscription.tier,
            request.session_type,
            request.dog_ids.len(),
            requested,
            &pricing,
        );

        let dog_ids: Vec<DogId> = request.dog_ids.iter().copied().collect();
        let mut bookings = Vec::with_capacity(requested);
        for date in &request.dates {
            let new_booking = NewBooking {
                owner_id: request.owner_id,
                subscription_id: subscription.id,
                dog_ids: dog_ids.clone(),
                booking_date: *date,
                session_type: request.session_type,
                daily_rate: quote.daily_rate,
                total_amount: quote.per_date_total,
            };
            let booking = uow.insert_booking(&new_booking).await.map_err(|e| match e {
                StoreError::UniqueViolation { .. } => BookingError::DateNoLongerAvailable(*date),
                other => BookingError::from(other),
            })?;
            bookings.push(booking);
        }

        let days = i32::try_from(requested).unwrap_or(i32::MAX);
        let insufficient = || BookingError::InsufficientDaysRemaining {
            requested,
            remaining: subscription.days_remaining,
            deficit: subscription.deficit_for(requested).max(1),
        };
        let debited = match uow.debit_days(subscription.id, days).await {
            Ok(Some(debited)) => debited,
            Ok(None) | Err(StoreError::CheckViolation { .. }) => return Err(insufficient()),
            Err(e) => return Err(e.into()),
        };

        uow.commit().await?;

        Ok(Confirmation {
            bookings,
            subscription: debited,
            quote,
        })
    }
}
