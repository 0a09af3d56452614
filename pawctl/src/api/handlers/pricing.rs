use crate::{AppState, api::models::pricing::PricingResponse, errors::Result};
use axum::{extract::State, response::Json};

/// Effective per-dog daily rates
#[utoipa::path(
    get,
    path = "/pricing",
    tag = "pricing",
    summary = "Get the pricing table",
    responses(
        (status = 200, description = "Default and per-tier rates", body = PricingResponse),
        (status = 500, description = "Internal server error"),
    ),
)]
#[tracing::instrument(skip_all)]
pub async fn get_pricing(State(state): State<AppState>) -> Result<Json<PricingResponse>> {
    let table = state.pricing.pricing_table().await?;
    Ok(Json(PricingResponse::from(&table)))
}
