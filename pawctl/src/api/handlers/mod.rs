//! HTTP request handlers, one module per resource.
//!
//! - [`calendar`]: month view with per-date availability
//! - [`owners`]: an owner's subscription and dogs
//! - [`bookings`]: quoting, confirming and listing bookings
//! - [`pricing`]: the effective rate table
//!
//! Handlers validate and deserialize the request, call into
//! [`crate::booking`] or [`crate::store`], and map the result to a response
//! model from [`crate::api::models`]. Failures surface as
//! [`crate::errors::Error`].

pub mod bookings;
pub mod calendar;
pub mod owners;
pub mod pricing;
