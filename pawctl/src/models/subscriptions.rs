//! Prepaid-days subscriptions.

use crate::types::{OwnerId, SubscriptionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use utoipa::ToSchema;

/// Subscription plan, named by the number of daycare days included per month.
///
/// Stored as TEXT (`"4_days"`, `"8_days"`, ...) in the database and on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "text")]
pub enum Tier {
    #[serde(rename = "4_days")]
    #[sqlx(rename = "4_days")]
    FourDays,
    #[serde(rename = "8_days")]
    #[sqlx(rename = "8_days")]
    EightDays,
    #[serde(rename = "12_days")]
    #[sqlx(rename = "12_days")]
    TwelveDays,
    #[serde(rename = "16_days")]
    #[sqlx(rename = "16_days")]
    SixteenDays,
    #[serde(rename = "20_days")]
    #[sqlx(rename = "20_days")]
    TwentyDays,
}

impl Tier {
    pub const ALL: [Tier; 5] = [Tier::FourDays, Tier::EightDays, Tier::TwelveDays, Tier::SixteenDays, Tier::TwentyDays];

    /// Days granted per month at issuance
    pub fn days_included(self) -> i32 {
        match self {
            Tier::FourDays => 4,
            Tier::EightDays => 8,
            Tier::TwelveDays => 12,
            Tier::SixteenDays => 16,
            Tier::TwentyDays => 20,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tier::FourDays => "4_days",
            Tier::EightDays => "8_days",
            Tier::TwelveDays => "12_days",
            Tier::SixteenDays => "16_days",
            Tier::TwentyDays => "20_days",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tier::ALL
            .into_iter()
            .find(|tier| tier.as_str() == s)
            .ok_or_else(|| format!("unknown subscription tier '{s}'"))
    }
}

/// An owner's subscription and its day counters.
///
/// `days_remaining` never goes negative. The engine does not assume it stays at
/// or below `days_included`: bonus days are the renewal process's business.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub owner_id: OwnerId,
    pub tier: Tier,
    pub days_included: i32,
    pub days_remaining: i32,
    pub days_used: i32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Subscription {
    /// A freshly purchased, active subscription with the tier's full allowance
    pub fn issue(owner_id: OwnerId, tier: Tier) -> Self {
        Self {
            id: SubscriptionId::new_v4(),
            owner_id,
            tier,
            days_included: tier.days_included(),
            days_remaining: tier.days_included(),
            days_used: 0,
            active: true,
            created_at: Utc::now(),
        }
    }

    /// Set the balance, keeping `days_used` in step with the tier's allowance
    pub fn with_days_remaining(mut self, days_remaining: i32) -> Self {
        self.days_remaining = days_remaining;
        self.days_used = (self.days_included - days_remaining).max(0);
        self
    }

    /// How many more days would be needed to cover `requested` dates (0 if covered)
    pub fn deficit_for(&self, requested: usize) -> u32 {
        let requested = i64::try_from(requested).unwrap_or(i64::MAX);
        let remaining = i64::from(self.days_remaining.max(0));
        u32::try_from((requested - remaining).max(0)).unwrap_or(u32::MAX)
    }
}
