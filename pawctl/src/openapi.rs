//! OpenAPI document for the booking API at `/api/v1/*`.

use utoipa::OpenApi;

use crate::api;
use crate::api::models::{bookings, calendar, owners, pricing};
use crate::booking::{Availability, RateEntry};
use crate::models::{BookingStatus, SessionType, Tier};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "pawctl",
        description = "Dog daycare bookings against prepaid subscription days"
    ),
    servers(
        (url = "/api/v1", description = "Booking API")
    ),
    paths(
        api::handlers::calendar::get_month,
        api::handlers::owners::get_subscription,
        api::handlers::owners::list_dogs,
        api::handlers::bookings::quote,
        api::handlers::bookings::confirm,
        api::handlers::bookings::list_bookings,
        api::handlers::pricing::get_pricing,
    ),
    components(
        schemas(
            calendar::CalendarMonthResponse,
            calendar::CalendarDay,
            calendar::MonthCursor,
            owners::SubscriptionResponse,
            owners::DogResponse,
            bookings::SelectionRequest,
            bookings::QuoteResponse,
            bookings::ConfirmationResponse,
            bookings::BookingResponse,
            pricing::PricingResponse,
            RateEntry,
            Availability,
            Tier,
            SessionType,
            BookingStatus,
        )
    ),
    tags(
        (name = "calendar", description = "Month view and per-date availability"),
        (name = "owners", description = "Subscriptions and dogs"),
        (name = "bookings", description = "Quote, confirm and list bookings"),
        (name = "pricing", description = "Daily rates by tier and session type"),
    )
)]
pub struct ApiDoc;
