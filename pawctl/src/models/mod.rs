//! Records the allocation engine reads and writes.
//!
//! - [`subscriptions`]: prepaid-days [`Subscription`](subscriptions::Subscription) and its [`Tier`](subscriptions::Tier)
//! - [`dogs`]: [`Dog`](dogs::Dog) records supplied by the owner directory
//! - [`bookings`]: [`Booking`](bookings::Booking) rows and the [`SessionType`](bookings::SessionType) they carry
//!
//! Each struct derives `sqlx::FromRow` so the PostgreSQL store can map rows
//! directly, and `Clone` so the in-memory store can keep working copies.

pub mod bookings;
pub mod dogs;
pub mod subscriptions;

pub use bookings::{Booking, BookingStatus, NewBooking, SessionType};
pub use dogs::Dog;
pub use subscriptions::{Subscription, Tier};
