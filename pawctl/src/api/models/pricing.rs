use crate::booking::{PricingTable, RateEntry};
use crate::models::SessionType;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Effective daily rates, per dog
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PricingResponse {
    #[schema(value_type = String)]
    pub default_full_day_rate: Decimal,
    #[schema(value_type = String)]
    pub default_half_day_rate: Decimal,
    /// One entry per tier and session type
    pub rates: Vec<RateEntry>,
}

impl From<&PricingTable> for PricingResponse {
    fn from(table: &PricingTable) -> Self {
        Self {
            default_full_day_rate: table.default_rate(SessionType::FullDay),
            default_half_day_rate: table.default_rate(SessionType::HalfDay),
            rates: table.entries(),
        }
    }
}
