//! HTTP handlers for quoting, confirming and listing bookings.

use crate::{
    AppState,
    api::models::bookings::{BookingResponse, ConfirmationResponse, QuoteResponse, SelectionRequest},
    booking::{AvailabilityContext, BookingError, ConfirmRequest, Selection},
    errors::{Error, Result},
    types::OwnerId,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::NaiveDate;
use std::collections::BTreeSet;

fn bounded_dates(state: &AppState, dates: Vec<NaiveDate>) -> Result<BTreeSet<NaiveDate>> {
    let dates: BTreeSet<NaiveDate> = dates.into_iter().collect();
    let max = state.config.booking.max_dates_per_confirmation;
    if dates.len() > max {
        return Err(Error::BadRequest {
            message: format!("At most {max} dates can be booked at once, got {}", dates.len()),
        });
    }
    Ok(dates)
}

/// Price a selection without booking it
#[utoipa::path(
    post,
    path = "/owners/{owner_id}/quote",
    tag = "bookings",
    summary = "Quote a selection",
    description = "Price the bookable part of a selection against the owner's active tier. \
                   Dates and dogs that cannot be booked are listed separately instead of failing the request.",
    request_body = SelectionRequest,
    params(
        ("owner_id" = String, Path, description = "Owner ID", format = "uuid"),
    ),
    responses(
        (status = 200, description = "Quote for the selection", body = QuoteResponse),
        (status = 400, description = "Too many dates"),
        (status = 402, description = "Owner has no active subscription"),
        (status = 500, description = "Internal server error"),
    ),
)]
#[tracing::instrument(skip_all, fields(owner_id = %owner_id))]
pub async fn quote(
    State(state): State<AppState>,
    Path(owner_id): Path<OwnerId>,
    Json(request): Json<SelectionRequest>,
) -> Result<Json<QuoteResponse>> {
    let requested_dates = bounded_dates(&state, request.dates)?;
    let subscription = state
        .store
        .active_subscription(owner_id)
        .await?
        .ok_or(BookingError::NoActiveSubscription)?;

    let booked = match (requested_dates.first(), requested_dates.last()) {
        (Some(&from), Some(&to)) => state.store.booked_dates(owner_id, from, to).await?,
        _ => BTreeSet::new(),
    };
    let availability = AvailabilityContext {
        today: state.clock.today(),
        booked,
    };

    let mut selection = Selection::new(request.session_type);
    let mut unavailable_dates = Vec::new();
    for date in requested_dates {
        if !selection.toggle_date(date, &availability) {
            unavailable_dates.push(date);
        }
    }

    let dogs = state.store.dogs(owner_id).await?;
    let requested_dogs: BTreeSet<_> = request.dog_ids.into_iter().collect();
    let mut ineligible_dog_ids = Vec::new();
    for dog_id in requested_dogs {
        match dogs.iter().find(|dog| dog.id == dog_id) {
            Some(dog) if selection.toggle_dog(dog) => {}
            _ => ineligible_dog_ids.push(dog_id),
        }
    }

    let pricing = state.pricing.pricing_table().await?;
    let quote = selection.quote(subscription.tier, &pricing);

    Ok(Json(QuoteResponse::new(
        quote,
        selection.dates().iter().copied().collect(),
        unavailable_dates,
        ineligible_dog_ids,
        subscription.days_remaining,
    )))
}

/// Confirm a selection
#[utoipa::path(
    post,
    path = "/owners/{owner_id}/bookings",
    tag = "bookings",
    summary = "Confirm bookings",
    description = "Book every selected date for every selected dog and debit one subscription day per date. \
                   Either all dates are booked or none are.",
    request_body = SelectionRequest,
    params(
        ("owner_id" = String, Path, description = "Owner ID", format = "uuid"),
    ),
    responses(
        (status = 201, description = "Bookings created", body = ConfirmationResponse),
        (status = 400, description = "No dogs or dates selected, a dog is not eligible, or too many dates"),
        (status = 402, description = "Owner has no active subscription"),
        (status = 409, description = "Not enough days left, a date is no longer available, or a day is full"),
        (status = 503, description = "Another confirmation holds the lock; retry"),
        (status = 500, description = "Internal server error"),
    ),
)]
#[tracing::instrument(skip_all, fields(owner_id = %owner_id))]
pub async fn confirm(
    State(state): State<AppState>,
    Path(owner_id): Path<OwnerId>,
    Json(request): Json<SelectionRequest>,
) -> Result<(StatusCode, Json<ConfirmationResponse>)> {
    let dates = bounded_dates(&state, request.dates)?;
    let confirmation = state
        .allocator
        .confirm(ConfirmRequest {
            owner_id,
            dates,
            dog_ids: request.dog_ids.into_iter().collect(),
            session_type: request.session_type,
            today: state.clock.today(),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(ConfirmationResponse::from(confirmation))))
}

/// List the owner's bookings
#[utoipa::path(
    get,
    path = "/owners/{owner_id}/bookings",
    tag = "bookings",
    summary = "List bookings",
    params(
        ("owner_id" = String, Path, description = "Owner ID", format = "uuid"),
    ),
    responses(
        (status = 200, description = "Bookings, latest date first", body = Vec<BookingResponse>),
        (status = 500, description = "Internal server error"),
    ),
)]
#[tracing::instrument(skip_all, fields(owner_id = %owner_id))]
pub async fn list_bookings(State(state): State<AppState>, Path(owner_id): Path<OwnerId>) -> Result<Json<Vec<BookingResponse>>> {
    let bookings = state.store.list_bookings(owner_id).await?;
    Ok(Json(bookings.into_iter().map(BookingResponse::from).collect()))
}
