//! PostgreSQL booking store.
//!
//! A unit of work is one transaction. Confirmations for the same subscription
//! serialize on a `FOR UPDATE` lock of the subscription row; the facility
//! headcount check serializes on per-date advisory locks. `lock_timeout` is set
//! per transaction so a stuck peer surfaces as [`StoreError::Contention`]
//! instead of an indefinite wait.
//!
//! The schema backs the engine's invariants independently: a partial unique
//! index allows one confirmed booking per owner per date, and a check
//! constraint keeps `days_remaining` non-negative.

use super::{BookingStore, BookingUnitOfWork, Result};
use crate::booking::pricing::{PricingSource, PricingTable, RateEntry};
use crate::models::{Booking, Dog, NewBooking, SessionType, Subscription, Tier};
use crate::store::StoreError;
use crate::types::{DogId, OwnerId, SubscriptionId, abbrev_uuid};
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;
use tracing::{debug, instrument, warn};

const SUBSCRIPTION_COLUMNS: &str = "id, owner_id, tier, days_included, days_remaining, days_used, active, created_at";
const BOOKING_COLUMNS: &str = "id, owner_id, subscription_id, dog_ids, booking_date, session_type, start_time, end_time, \
                               daily_rate, total_amount, status, created_at";

/// High bits of the advisory lock key used for per-date capacity locks
const CAPACITY_LOCK_NAMESPACE: i64 = 0x5041_5700 << 32;

fn capacity_lock_key(date: NaiveDate) -> i64 {
    CAPACITY_LOCK_NAMESPACE | i64::from(date.num_days_from_ce())
}

#[derive(Clone)]
pub struct PgBookingStore {
    pool: PgPool,
    lock_timeout: Duration,
    pricing: PricingTable,
}

impl PgBookingStore {
    /// `pricing` is the configured table; rows in `pricing_rates` override it.
    pub fn new(pool: PgPool, lock_timeout: Duration, pricing: PricingTable) -> Self {
        Self {
            pool,
            lock_timeout,
            pricing,
        }
    }

    pub async fn insert_subscription(&self, subscription: &Subscription) -> Result<()> {
        sqlx::query(
            "INSERT INTO subscriptions (id, owner_id, tier, days_included, days_remaining, days_used, active, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(subscription.id)
        .bind(subscription.owner_id)
        .bind(subscription.tier)
        .bind(subscription.days_included)
        .bind(subscription.days_remaining)
        .bind(subscription.days_used)
        .bind(subscription.active)
        .bind(subscription.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn insert_dog(&self, dog: &Dog) -> Result<()> {
        sqlx::query("INSERT INTO dogs (id, owner_id, name, is_approved) VALUES ($1, $2, $3, $4)")
            .bind(dog.id)
            .bind(dog.owner_id)
            .bind(&dog.name)
            .bind(dog.is_approved)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Insert or replace a persisted rate override
    pub async fn upsert_rate(&self, entry: &RateEntry) -> Result<()> {
        sqlx::query(
            "INSERT INTO pricing_rates (tier, session_type, rate) VALUES ($1, $2, $3) \
             ON CONFLICT (tier, session_type) DO UPDATE SET rate = EXCLUDED.rate, updated_at = NOW()",
        )
        .bind(entry.tier)
        .bind(entry.session_type)
        .bind(entry.rate)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl BookingStore for PgBookingStore {
    #[instrument(skip(self), err)]
    async fn begin(&self) -> Result<Box<dyn BookingUnitOfWork + '_>> {
        let mut tx = self.pool.begin().await?;
        // SET does not take bind parameters
        let millis = self.lock_timeout.as_millis().max(1);
        sqlx::query(&format!("SET LOCAL lock_timeout = '{millis}ms'"))
            .execute(&mut *tx)
            .await?;
        Ok(Box::new(PgUnitOfWork { tx }))
    }

    async fn active_subscription(&self, owner_id: OwnerId) -> Result<Option<Subscription>> {
        let subscription = sqlx::query_as::<_, Subscription>(&format!(
            "SELECT {SUBSCRIPTION_COLUMNS} FROM subscriptions WHERE owner_id = $1 AND active \
             ORDER BY created_at DESC LIMIT 1"
        ))
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(subscription)
    }

    async fn dogs(&self, owner_id: OwnerId) -> Result<Vec<Dog>> {
        let dogs = sqlx::query_as::<_, Dog>("SELECT id, owner_id, name, is_approved FROM dogs WHERE owner_id = $1 ORDER BY name")
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(dogs)
    }

    async fn booked_dates(&self, owner_id: OwnerId, from: NaiveDate, to: NaiveDate) -> Result<BTreeSet<NaiveDate>> {
        let dates = sqlx::query_scalar::<_, NaiveDate>(
            "SELECT booking_date FROM bookings \
             WHERE owner_id = $1 AND status = 'confirmed' AND booking_date BETWEEN $2 AND $3",
        )
        .bind(owner_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;
        Ok(dates.into_iter().collect())
    }

    async fn headcounts(&self, from: NaiveDate, to: NaiveDate) -> Result<BTreeMap<NaiveDate, u32>> {
        let rows = sqlx::query_as::<_, (NaiveDate, i64)>(
            "SELECT booking_date, SUM(cardinality(dog_ids))::BIGINT FROM bookings \
             WHERE status = 'confirmed' AND booking_date BETWEEN $1 AND $2 GROUP BY booking_date",
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|(date, dogs)| (date, to_headcount(dogs))).collect())
    }

    async fn list_bookings(&self, owner_id: OwnerId) -> Result<Vec<Booking>> {
        let bookings = sqlx::query_as::<_, Booking>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE owner_id = $1 ORDER BY booking_date DESC, created_at DESC"
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(bookings)
    }
}

fn to_headcount(dogs: i64) -> u32 {
    u32::try_from(dogs.max(0)).unwrap_or(u32::MAX)
}

#[async_trait]
impl PricingSource for PgBookingStore {
    async fn pricing_table(&self) -> Result<PricingTable> {
        let rows = sqlx::query_as::<_, (String, SessionType, Decimal)>("SELECT tier, session_type, rate FROM pricing_rates")
            .fetch_all(&self.pool)
            .await?;

        let mut table = self.pricing.clone();
        table.extend(rows.into_iter().filter_map(|(tier, session_type, rate)| match tier.parse::<Tier>() {
            Ok(tier) => Some(RateEntry { tier, session_type, rate }),
            Err(e) => {
                warn!(error = %e, "Ignoring stored rate");
                None
            }
        }));
        Ok(table)
    }
}

struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl BookingUnitOfWork for PgUnitOfWork {
    #[instrument(skip(self), fields(owner_id = %abbrev_uuid(&owner_id)), err)]
    async fn lock_active_subscription(&mut self, owner_id: OwnerId) -> Result<Option<Subscription>> {
        let subscription = sqlx::query_as::<_, Subscription>(&format!(
            "SELECT {SUBSCRIPTION_COLUMNS} FROM subscriptions WHERE owner_id = $1 AND active \
             ORDER BY created_at DESC LIMIT 1 FOR UPDATE"
        ))
        .bind(owner_id)
        .fetch_optional(&mut *self.tx)
        .await?;
        if let Some(s) = &subscription {
            debug!(subscription_id = %abbrev_uuid(&s.id), "Locked subscription");
        }
        Ok(subscription)
    }

    async fn booked_dates(&mut self, owner_id: OwnerId, dates: &BTreeSet<NaiveDate>) -> Result<BTreeSet<NaiveDate>> {
        let dates: Vec<NaiveDate> = dates.iter().copied().collect();
        let booked = sqlx::query_scalar::<_, NaiveDate>(
            "SELECT booking_date FROM bookings \
             WHERE owner_id = $1 AND status = 'confirmed' AND booking_date = ANY($2)",
        )
        .bind(owner_id)
        .bind(&dates)
        .fetch_all(&mut *self.tx)
        .await?;
        Ok(booked.into_iter().collect())
    }

    async fn lock_dates_for_capacity(&mut self, dates: &BTreeSet<NaiveDate>) -> Result<()> {
        // Ascending order keeps concurrent confirmations from deadlocking
        for date in dates {
            sqlx::query("SELECT pg_advisory_xact_lock($1)")
                .bind(capacity_lock_key(*date))
                .execute(&mut *self.tx)
                .await?;
        }
        Ok(())
    }

    async fn headcounts(&mut self, dates: &BTreeSet<NaiveDate>) -> Result<BTreeMap<NaiveDate, u32>> {
        let wanted: Vec<NaiveDate> = dates.iter().copied().collect();
        let rows = sqlx::query_as::<_, (NaiveDate, i64)>(
            "SELECT booking_date, SUM(cardinality(dog_ids))::BIGINT FROM bookings \
             WHERE status = 'confirmed' AND booking_date = ANY($1) GROUP BY booking_date",
        )
        .bind(&wanted)
        .fetch_all(&mut *self.tx)
        .await?;

        let mut counts: BTreeMap<NaiveDate, u32> = dates.iter().map(|d| (*d, 0)).collect();
        for (date, dogs) in rows {
            counts.insert(date, to_headcount(dogs));
        }
        Ok(counts)
    }

    async fn approved_dog_ids(&mut self, owner_id: OwnerId) -> Result<BTreeSet<DogId>> {
        let ids = sqlx::query_scalar::<_, DogId>("SELECT id FROM dogs WHERE owner_id = $1 AND is_approved")
            .bind(owner_id)
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(ids.into_iter().collect())
    }

    #[instrument(skip_all, fields(booking_date = %booking.booking_date, dogs = booking.dog_ids.len()), err)]
    async fn insert_booking(&mut self, booking: &NewBooking) -> Result<Booking> {
        let (start_time, end_time) = booking.session_type.window();
        let row = sqlx::query_as::<_, Booking>(&format!(
            "INSERT INTO bookings (id, owner_id, subscription_id, dog_ids, booking_date, session_type, \
                                   start_time, end_time, daily_rate, total_amount, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, 'confirmed') \
             RETURNING {BOOKING_COLUMNS}"
        ))
        .bind(uuid::Uuid::new_v4())
        .bind(booking.owner_id)
        .bind(booking.subscription_id)
        .bind(&booking.dog_ids)
        .bind(booking.booking_date)
        .bind(booking.session_type)
        .bind(start_time)
        .bind(end_time)
        .bind(booking.daily_rate)
        .bind(booking.total_amount)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(row)
    }

    #[instrument(skip(self), fields(subscription_id = %abbrev_uuid(&subscription_id)), err)]
    async fn debit_days(&mut self, subscription_id: SubscriptionId, days: i32) -> Result<Option<Subscription>> {
        // Conditional update: never drives days_remaining below zero
        let updated = sqlx::query_as::<_, Subscription>(&format!(
            "UPDATE subscriptions SET days_remaining = days_remaining - $2, days_used = days_used + $2 \
             WHERE id = $1 AND days_remaining >= $2 RETURNING {SUBSCRIPTION_COLUMNS}"
        ))
        .bind(subscription_id)
        .bind(days)
        .fetch_optional(&mut *self.tx)
        .await?;
        if updated.is_none() {
            let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM subscriptions WHERE id = $1)")
                .bind(subscription_id)
                .fetch_one(&mut *self.tx)
                .await?;
            if !exists {
                return Err(StoreError::NotFound);
            }
        }
        Ok(updated)
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }
}
