//! Common type definitions.
//!
//! All entity IDs are UUIDs wrapped in type aliases for readability:
//!
//! - [`OwnerId`]: Owner (family) account identifier
//! - [`DogId`]: Dog record identifier
//! - [`SubscriptionId`]: Prepaid-days subscription identifier
//! - [`BookingId`]: Booking record identifier
//!
//! # Utility Functions
//!
//! - [`abbrev_uuid`]: Abbreviate UUIDs to first 8 chars for logging

use uuid::Uuid;

// Type aliases for IDs
pub type OwnerId = Uuid;
pub type DogId = Uuid;
pub type SubscriptionId = Uuid;
pub type BookingId = Uuid;

/// Abbreviate a UUID to its first 8 characters for more readable logs and traces
/// Example: "550e8400-e29b-41d4-a716-446655440000" -> "550e8400"
pub fn abbrev_uuid(uuid: &Uuid) -> String {
    uuid.to_string().chars().take(8).collect()
}
