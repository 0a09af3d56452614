use crate::models::{Dog, Subscription, Tier};
use crate::types::{DogId, SubscriptionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// An owner's active subscription and its day balance
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubscriptionResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: SubscriptionId,
    pub tier: Tier,
    pub days_included: i32,
    pub days_remaining: i32,
    pub days_used: i32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Subscription> for SubscriptionResponse {
    fn from(s: Subscription) -> Self {
        Self {
            id: s.id,
            tier: s.tier,
            days_included: s.days_included,
            days_remaining: s.days_remaining,
            days_used: s.days_used,
            active: s.active,
            created_at: s.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DogResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: DogId,
    pub name: String,
    /// Only approved dogs can be booked
    pub is_approved: bool,
}

impl From<Dog> for DogResponse {
    fn from(dog: Dog) -> Self {
        Self {
            id: dog.id,
            name: dog.name,
            is_approved: dog.is_approved,
        }
    }
}
