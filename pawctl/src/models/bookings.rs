//! Booking records and session types.

use crate::types::{BookingId, DogId, OwnerId, SubscriptionId};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Attendance window for a booked day, stored as TEXT in the database
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SessionType {
    /// 07:00 - 19:00
    #[default]
    FullDay,
    /// 10:00 - 14:00
    HalfDay,
}

impl SessionType {
    pub const ALL: [SessionType; 2] = [SessionType::FullDay, SessionType::HalfDay];

    /// Drop-off and pick-up times attached to bookings of this session type
    pub fn window(self) -> (NaiveTime, NaiveTime) {
        let (start, end) = match self {
            SessionType::FullDay => (7, 19),
            SessionType::HalfDay => (10, 14),
        };
        (hour(start), hour(end))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SessionType::FullDay => "full_day",
            SessionType::HalfDay => "half_day",
        }
    }
}

fn hour(h: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, 0, 0).unwrap_or(NaiveTime::MIN)
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
}

/// A persisted booking: one calendar date, one or more dogs, one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Booking {
    pub id: BookingId,
    pub owner_id: OwnerId,
    pub subscription_id: SubscriptionId,
    pub dog_ids: Vec<DogId>,
    pub booking_date: NaiveDate,
    pub session_type: SessionType,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub daily_rate: Decimal,
    /// `daily_rate` x number of dogs
    pub total_amount: Decimal,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    pub fn is_confirmed(&self) -> bool {
        self.status == BookingStatus::Confirmed
    }
}

/// Insert request for a booking, built by the allocator
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub owner_id: OwnerId,
    pub subscription_id: SubscriptionId,
    pub dog_ids: Vec<DogId>,
    pub booking_date: NaiveDate,
    pub session_type: SessionType,
    pub daily_rate: Decimal,
    pub total_amount: Decimal,
}

impl NewBooking {
    /// Materialize the row as the in-memory store records it
    pub fn into_booking(self, created_at: DateTime<Utc>) -> Booking {
        let (start_time, end_time) = self.session_type.window();
        Booking {
            id: BookingId::new_v4(),
            owner_id: self.owner_id,
            subscription_id: self.subscription_id,
            dog_ids: self.dog_ids,
            booking_date: self.booking_date,
            session_type: self.session_type,
            start_time,
            end_time,
            daily_rate: self.daily_rate,
            total_amount: self.total_amount,
            status: BookingStatus::Confirmed,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_windows() {
        let (start, end) = SessionType::FullDay.window();
        assert_eq!(start, NaiveTime::from_hms_opt(7, 0, 0).unwrap());
        assert_eq!(end, NaiveTime::from_hms_opt(19, 0, 0).unwrap());

        let (start, end) = SessionType::HalfDay.window();
        assert_eq!(start, NaiveTime::from_hms_opt(10, 0, 0).unwrap());
        assert_eq!(end, NaiveTime::from_hms_opt(14, 0, 0).unwrap());
    }

    #[test]
    fn test_session_type_wire_names() {
        assert_eq!(serde_json::to_string(&SessionType::HalfDay).unwrap(), "\"half_day\"");
        assert_eq!(SessionType::FullDay.to_string(), "full_day");
    }
}
