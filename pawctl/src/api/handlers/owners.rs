//! HTTP handlers for an owner's subscription and dogs.

use crate::{
    AppState,
    api::models::owners::{DogResponse, SubscriptionResponse},
    errors::{Error, Result},
    types::OwnerId,
};
use axum::{
    extract::{Path, State},
    response::Json,
};

/// Get the owner's active subscription
#[utoipa::path(
    get,
    path = "/owners/{owner_id}/subscription",
    tag = "owners",
    summary = "Get the active subscription",
    params(
        ("owner_id" = String, Path, description = "Owner ID", format = "uuid"),
    ),
    responses(
        (status = 200, description = "Active subscription and day balance", body = SubscriptionResponse),
        (status = 404, description = "Owner has no active subscription"),
        (status = 500, description = "Internal server error"),
    ),
)]
#[tracing::instrument(skip_all, fields(owner_id = %owner_id))]
pub async fn get_subscription(State(state): State<AppState>, Path(owner_id): Path<OwnerId>) -> Result<Json<SubscriptionResponse>> {
    let subscription = state.store.active_subscription(owner_id).await?.ok_or_else(|| Error::NotFound {
        resource: "Active subscription".to_string(),
        id: owner_id.to_string(),
    })?;

    Ok(Json(SubscriptionResponse::from(subscription)))
}

/// List the owner's dogs
#[utoipa::path(
    get,
    path = "/owners/{owner_id}/dogs",
    tag = "owners",
    summary = "List dogs",
    description = "All of the owner's dogs. Only approved dogs can be booked.",
    params(
        ("owner_id" = String, Path, description = "Owner ID", format = "uuid"),
    ),
    responses(
        (status = 200, description = "The owner's dogs", body = Vec<DogResponse>),
        (status = 500, description = "Internal server error"),
    ),
)]
#[tracing::instrument(skip_all, fields(owner_id = %owner_id))]
pub async fn list_dogs(State(state): State<AppState>, Path(owner_id): Path<OwnerId>) -> Result<Json<Vec<DogResponse>>> {
    let dogs = state.store.dogs(owner_id).await?;
    Ok(Json(dogs.into_iter().map(DogResponse::from).collect()))
}
