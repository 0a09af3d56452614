//! The allocation engine.
//!
//! Data flows one way through the submodules:
//!
//! - [`calendar`]: month layouts and weekday/weekend/past classification
//! - [`availability`]: combines the calendar with an owner's existing bookings
//! - [`selection`]: the dates, dogs and session type an owner has picked
//! - [`pricing`]: per-dog daily rates by tier and session type
//! - [`allocator`]: validates a selection and books it, atomically
//!
//! Everything except the allocator is pure and needs no storage.

pub mod allocator;
pub mod availability;
pub mod calendar;
pub mod pricing;
pub mod selection;

pub use allocator::{BookingAllocator, BookingError, ConfirmRequest, Confirmation};
pub use availability::{Availability, AvailabilityContext, CapacityPolicy};
pub use calendar::{BookingDate, DayStatus, MonthLayout};
pub use pricing::{PricingSource, PricingTable, RateEntry};
pub use selection::{Quote, Selection};
