//! Pricing calculator.
//!
//! The [`PricingTable`] is the single source of truth for daily rates. Rates are
//! per dog, per day, and depend on the subscription [`Tier`] and the
//! [`SessionType`]. A tier/session pair with no configured rate falls back to
//! the table's default for that session type, so an unpriced tier still books.
//!
//! The calculator is per-day: [`PricingTable::total_for_selection`] prices one
//! date for a number of dogs. Multiplying by the number of selected dates is
//! the caller's job (see [`crate::booking::selection::Selection::quote`]).

use crate::models::{SessionType, Tier};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;

use crate::store::StoreError;

/// Largest daily rate accepted from configuration; rates and booking amounts
/// are stored as `NUMERIC(10, 2)`
pub fn max_daily_rate() -> Decimal {
    Decimal::new(99_999_999_99, 2)
}

/// One configured rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct RateEntry {
    pub tier: Tier,
    pub session_type: SessionType,
    #[schema(value_type = String)]
    pub rate: Decimal,
}

/// Tier x session type -> daily rate, with per-session fallbacks
#[derive(Debug, Clone, PartialEq)]
pub struct PricingTable {
    rates: HashMap<(Tier, SessionType), Decimal>,
    default_full_day: Decimal,
    default_half_day: Decimal,
}

impl PricingTable {
    /// An empty table: every lookup resolves to the given defaults
    pub fn new(default_full_day: Decimal, default_half_day: Decimal) -> Self {
        Self {
            rates: HashMap::new(),
            default_full_day,
            default_half_day,
        }
    }

    pub fn with_rates(mut self, entries: impl IntoIterator<Item = RateEntry>) -> Self {
        self.extend(entries);
        self
    }

    /// Insert or replace rates
    pub fn extend(&mut self, entries: impl IntoIterator<Item = RateEntry>) {
        for entry in entries {
            self.rates.insert((entry.tier, entry.session_type), entry.rate);
        }
    }

    /// Fallback rate used when a tier has no entry for `session_type`
    pub fn default_rate(&self, session_type: SessionType) -> Decimal {
        match session_type {
            SessionType::FullDay => self.default_full_day,
            SessionType::HalfDay => self.default_half_day,
        }
    }

    /// Per-dog rate for one day
    pub fn daily_rate(&self, tier: Tier, session_type: SessionType) -> Decimal {
        self.rates
            .get(&(tier, session_type))
            .copied()
            .unwrap_or_else(|| self.default_rate(session_type))
    }

    /// Price of one date for `dog_count` dogs. Saturates at `Decimal::MAX`.
    pub fn total_for_selection(&self, tier: Tier, session_type: SessionType, dog_count: usize) -> Decimal {
        self.daily_rate(tier, session_type).saturating_mul(Decimal::from(dog_count))
    }

    /// The effective rate for every tier/session pair, defaults filled in
    pub fn entries(&self) -> Vec<RateEntry> {
        Tier::ALL
            .into_iter()
            .flat_map(|tier| {
                SessionType::ALL.into_iter().map(move |session_type| RateEntry {
                    tier,
                    session_type,
                    rate: self.daily_rate(tier, session_type),
                })
            })
            .collect()
    }
}

impl Default for PricingTable {
    /// House rates: GBP per dog per day
    fn default() -> Self {
        let gbp = |pence: i64| Decimal::new(pence, 2);
        let rates = [
            (Tier::FourDays, 4000, 2500),
            (Tier::EightDays, 3800, 2400),
            (Tier::TwelveDays, 3700, 2300),
            (Tier::SixteenDays, 3600, 2200),
            (Tier::TwentyDays, 3500, 2100),
        ];

        PricingTable::new(gbp(4000), gbp(2500)).with_rates(rates.into_iter().flat_map(|(tier, full, half)| {
            [
                RateEntry {
                    tier,
                    session_type: SessionType::FullDay,
                    rate: gbp(full),
                },
                RateEntry {
                    tier,
                    session_type: SessionType::HalfDay,
                    rate: gbp(half),
                },
            ]
        }))
    }
}

/// Where the allocator reads rates from. Implementations may return a
/// different table on each call; the allocator reads it once per confirmation.
#[async_trait]
pub trait PricingSource: Send + Sync {
    async fn pricing_table(&self) -> Result<PricingTable, StoreError>;
}

#[async_trait]
impl PricingSource for PricingTable {
    async fn pricing_table(&self) -> Result<PricingTable, StoreError> {
        Ok(self.clone())
    }
}
