//! Dog records supplied by the owner directory. Read-only to the engine.

use crate::types::{DogId, OwnerId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Dog {
    pub id: DogId,
    pub owner_id: OwnerId,
    pub name: String,
    /// Passed the facility's assessment; only approved dogs may be booked
    pub is_approved: bool,
}
