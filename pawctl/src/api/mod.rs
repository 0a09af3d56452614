//! HTTP API for the allocation engine.
//!
//! - **[`handlers`]**: Axum route handlers
//! - **[`models`]**: Request/response bodies
//!
//! # API Structure
//!
//! - **Calendar** (`/api/v1/calendar/{year}/{month}`): month grid with per-date availability
//! - **Owners** (`/api/v1/owners/{owner_id}/...`): subscription, dogs, bookings, quotes and confirmations
//! - **Pricing** (`/api/v1/pricing`): the effective rate table
//!
//! All endpoints are documented with `utoipa`; the document is served at `/api/openapi.json`.

pub mod handlers;
pub mod models;
