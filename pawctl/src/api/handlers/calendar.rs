//! HTTP handler for the month calendar.

use crate::{
    AppState,
    api::models::calendar::{CalendarDay, CalendarMonthResponse, CalendarQuery},
    booking::{Availability, AvailabilityContext, calendar},
    errors::{Error, Result},
};
use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use std::collections::{BTreeMap, BTreeSet};

/// Month view with the status of every date
#[utoipa::path(
    get,
    path = "/calendar/{year}/{month}",
    tag = "calendar",
    summary = "Get a month of availability",
    description = "Lay out a month for grid rendering and resolve each date to past, weekend, available, booked or full. \
                   Pass `owner_id` to mark that owner's confirmed bookings.",
    params(
        ("year" = i32, Path, description = "Calendar year"),
        ("month" = u32, Path, description = "Month, 1-12"),
        CalendarQuery,
    ),
    responses(
        (status = 200, description = "Month layout and per-date availability", body = CalendarMonthResponse),
        (status = 400, description = "Invalid month"),
        (status = 500, description = "Internal server error"),
    ),
)]
#[tracing::instrument(skip_all, fields(year = year, month = month))]
pub async fn get_month(
    State(state): State<AppState>,
    Path((year, month)): Path<(i32, u32)>,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<CalendarMonthResponse>> {
    let invalid = || Error::BadRequest {
        message: format!("{year}-{month:02} is not a valid month"),
    };
    let today = state.clock.today();
    let layout = calendar::days_in_month(year, month).ok_or_else(invalid)?;
    let dates = calendar::month_dates(year, month, today).ok_or_else(invalid)?;
    let (Some(first), Some(last)) = (dates.first(), dates.last()) else {
        return Err(invalid());
    };
    let (first, last) = (first.date, last.date);

    let booked = match query.owner_id {
        Some(owner_id) => state.store.booked_dates(owner_id, first, last).await?,
        None => BTreeSet::new(),
    };

    let capacity = state.allocator.capacity();
    let headcounts = if capacity.is_enforced() {
        state.store.headcounts(first, last).await?
    } else {
        BTreeMap::new()
    };

    let availability = AvailabilityContext { today, booked };
    let days = dates
        .iter()
        .map(|d| {
            let headcount = headcounts.get(&d.date).copied().unwrap_or(0);
            let mut status = availability.resolve(d.date);
            if status == Availability::Available && capacity.is_full(headcount) {
                status = Availability::Full;
            }
            CalendarDay {
                date: d.date,
                status,
                selectable: status.is_selectable(),
                headcount: capacity.is_enforced().then_some(headcount),
            }
        })
        .collect();

    Ok(Json(CalendarMonthResponse::new(
        layout,
        today,
        calendar::previous_month(first),
        calendar::next_month(first),
        days,
    )))
}
