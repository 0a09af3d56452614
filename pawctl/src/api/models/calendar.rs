use crate::booking::{Availability, MonthLayout};
use crate::types::OwnerId;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Query parameters for the calendar view
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CalendarQuery {
    /// Mark this owner's confirmed bookings as `booked`
    #[param(value_type = Option<String>, format = "uuid")]
    pub owner_id: Option<OwnerId>,
}

/// A year/month pair for navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MonthCursor {
    pub year: i32,
    pub month: u32,
}

impl From<NaiveDate> for MonthCursor {
    fn from(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub status: Availability,
    /// Whether the date can be added to a selection
    pub selectable: bool,
    /// Dogs already booked facility-wide; present only when a daily cap is configured
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headcount: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CalendarMonthResponse {
    pub year: i32,
    pub month: u32,
    pub day_count: u32,
    /// Leading blank cells in a Sunday-first grid
    pub first_weekday_offset: u32,
    pub today: NaiveDate,
    pub previous: MonthCursor,
    pub next: MonthCursor,
    pub days: Vec<CalendarDay>,
}

impl CalendarMonthResponse {
    pub fn new(layout: MonthLayout, today: NaiveDate, previous: NaiveDate, next: NaiveDate, days: Vec<CalendarDay>) -> Self {
        Self {
            year: layout.year,
            month: layout.month,
            day_count: layout.day_count,
            first_weekday_offset: layout.first_weekday_offset,
            today,
            previous: previous.into(),
            next: next.into(),
            days,
        }
    }
}
