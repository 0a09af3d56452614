//! Request and response bodies for the HTTP API.

pub mod bookings;
pub mod calendar;
pub mod owners;
pub mod pricing;
