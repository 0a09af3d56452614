use crate::booking::{Confirmation, Quote};
use crate::models::{Booking, BookingStatus, SessionType, Tier};
use crate::types::{BookingId, DogId};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Dates, dogs and session type chosen by the owner. Used for both quoting
/// and confirming; duplicate entries are ignored.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct SelectionRequest {
    pub dates: Vec<NaiveDate>,
    #[schema(value_type = Vec<String>)]
    pub dog_ids: Vec<DogId>,
    #[serde(default)]
    pub session_type: SessionType,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookingResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: BookingId,
    pub booking_date: NaiveDate,
    pub session_type: SessionType,
    #[schema(value_type = String, example = "07:00:00")]
    pub start_time: NaiveTime,
    #[schema(value_type = String, example = "19:00:00")]
    pub end_time: NaiveTime,
    #[schema(value_type = Vec<String>)]
    pub dog_ids: Vec<DogId>,
    /// Per dog
    #[schema(value_type = String)]
    pub daily_rate: Decimal,
    /// `daily_rate` x number of dogs
    #[schema(value_type = String)]
    pub total_amount: Decimal,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

impl From<Booking> for BookingResponse {
    fn from(b: Booking) -> Self {
        Self {
            id: b.id,
            booking_date: b.booking_date,
            session_type: b.session_type,
            start_time: b.start_time,
            end_time: b.end_time,
            dog_ids: b.dog_ids,
            daily_rate: b.daily_rate,
            total_amount: b.total_amount,
            status: b.status,
            created_at: b.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QuoteResponse {
    pub tier: Tier,
    pub session_type: SessionType,
    /// Dates from the request that can be booked, in order
    pub dates: Vec<NaiveDate>,
    /// Dates from the request that cannot be booked (past, weekend or already booked)
    pub unavailable_dates: Vec<NaiveDate>,
    /// Requested dogs that are unknown, not the owner's, or not approved
    #[schema(value_type = Vec<String>)]
    pub ineligible_dog_ids: Vec<DogId>,
    pub dog_count: usize,
    pub date_count: usize,
    #[schema(value_type = String)]
    pub daily_rate: Decimal,
    #[schema(value_type = String)]
    pub per_date_total: Decimal,
    #[schema(value_type = String)]
    pub grand_total: Decimal,
    pub days_remaining: i32,
    /// Whether the subscription covers every bookable date
    pub sufficient_days: bool,
}

impl QuoteResponse {
    pub fn new(
        quote: Quote,
        dates: Vec<NaiveDate>,
        unavailable_dates: Vec<NaiveDate>,
        ineligible_dog_ids: Vec<DogId>,
        days_remaining: i32,
    ) -> Self {
        Self {
            tier: quote.tier,
            session_type: quote.session_type,
            sufficient_days: i64::try_from(quote.date_count).unwrap_or(i64::MAX) <= i64::from(days_remaining),
            dates,
            unavailable_dates,
            ineligible_dog_ids,
            dog_count: quote.dog_count,
            date_count: quote.date_count,
            daily_rate: quote.daily_rate,
            per_date_total: quote.per_date_total,
            grand_total: quote.grand_total,
            days_remaining,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConfirmationResponse {
    pub bookings: Vec<BookingResponse>,
    pub days_remaining: i32,
    pub days_used: i32,
    #[schema(value_type = String)]
    pub grand_total: Decimal,
}

impl From<Confirmation> for ConfirmationResponse {
    fn from(c: Confirmation) -> Self {
        Self {
            bookings: c.bookings.into_iter().map(BookingResponse::from).collect(),
            days_remaining: c.subscription.days_remaining,
            days_used: c.subscription.days_used,
            grand_total: c.quote.grand_total,
        }
    }
}
