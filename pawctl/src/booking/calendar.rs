//! Calendar model: month layout and per-date status.
//!
//! Everything here is a pure function of the calendar and "today". The daycare
//! operates Monday to Friday; weekends are closed. Dates before today are past.
//! Comparisons are date-only, there is no time-of-day component.

use chrono::{Datelike, Months, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Derived status of a calendar date. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DayStatus {
    Past,
    Weekend,
    Available,
}

/// A calendar date together with its derived status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingDate {
    pub date: NaiveDate,
    pub status: DayStatus,
}

/// Shape of a month for grid rendering.
///
/// `first_weekday_offset` counts the leading blank cells in a Sunday-first
/// grid (0 = the 1st is a Sunday, 6 = the 1st is a Saturday).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthLayout {
    pub year: i32,
    pub month: u32,
    pub day_count: u32,
    pub first_weekday_offset: u32,
}

/// Layout of `year`/`month`, or `None` if the month is out of range
pub fn days_in_month(year: i32, month: u32) -> Option<MonthLayout> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = first.checked_add_months(Months::new(1))?;
    let day_count = u32::try_from((next - first).num_days()).ok()?;

    Some(MonthLayout {
        year,
        month,
        day_count,
        first_weekday_offset: first.weekday().num_days_from_sunday(),
    })
}

/// Classify `date` relative to `today`
pub fn classify(date: NaiveDate, today: NaiveDate) -> DayStatus {
    if date < today {
        DayStatus::Past
    } else if is_weekend(date) {
        DayStatus::Weekend
    } else {
        DayStatus::Available
    }
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// First day of the month containing `date`
pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// First day of the month after the one containing `current`
pub fn next_month(current: NaiveDate) -> NaiveDate {
    let first = first_of_month(current);
    first.checked_add_months(Months::new(1)).unwrap_or(first)
}

/// First day of the month before the one containing `current`
pub fn previous_month(current: NaiveDate) -> NaiveDate {
    let first = first_of_month(current);
    first.checked_sub_months(Months::new(1)).unwrap_or(first)
}

/// Every date of the month with its status, in order
pub fn month_dates(year: i32, month: u32, today: NaiveDate) -> Option<Vec<BookingDate>> {
    let layout = days_in_month(year, month)?;
    let dates = (1..=layout.day_count)
        .filter_map(|day| NaiveDate::from_ymd_opt(year, month, day))
        .map(|date| BookingDate {
            date,
            status: classify(date, today),
        })
        .collect();
    Some(dates)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // Monday
    fn today() -> NaiveDate {
        date(2026, 10, 19)
    }

    #[test]
    fn test_days_in_month_counts_and_offsets() {
        let oct = days_in_month(2026, 10).unwrap();
        assert_eq!(oct.day_count, 31);
        // 2026-10-01 is a Thursday
        assert_eq!(oct.first_weekday_offset, 4);

        let feb_leap = days_in_month(2024, 2).unwrap();
        assert_eq!(feb_leap.day_count, 29);
        assert_eq!(feb_leap.first_weekday_offset, 4);

        let feb = days_in_month(2026, 2).unwrap();
        assert_eq!(feb.day_count, 28);
        // 2026-02-01 is a Sunday
        assert_eq!(feb.first_weekday_offset, 0);

        assert_eq!(days_in_month(2026, 11).unwrap().day_count, 30);
        assert_eq!(days_in_month(1900, 2).unwrap().day_count, 28);
        assert_eq!(days_in_month(2000, 2).unwrap().day_count, 29);
    }

    #[test]
    fn test_days_in_month_rejects_invalid_month() {
        assert!(days_in_month(2026, 0).is_none());
        assert!(days_in_month(2026, 13).is_none());
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify(date(2026, 10, 18), today()), DayStatus::Past);
        assert_eq!(classify(today(), today()), DayStatus::Available);
        assert_eq!(classify(date(2026, 10, 23), today()), DayStatus::Available);
        assert_eq!(classify(date(2026, 10, 24), today()), DayStatus::Weekend);
        assert_eq!(classify(date(2026, 10, 25), today()), DayStatus::Weekend);
    }

    #[test]
    fn test_past_wins_over_weekend() {
        // Saturday before today
        assert_eq!(classify(date(2026, 10, 17), today()), DayStatus::Past);
    }

    #[test]
    fn test_month_navigation() {
        assert_eq!(next_month(date(2026, 10, 19)), date(2026, 11, 1));
        assert_eq!(previous_month(date(2026, 10, 19)), date(2026, 9, 1));
        assert_eq!(next_month(date(2026, 12, 31)), date(2027, 1, 1));
        assert_eq!(previous_month(date(2027, 1, 15)), date(2026, 12, 1));
        // Month-end days don't skip a month
        assert_eq!(next_month(date(2026, 1, 31)), date(2026, 2, 1));
    }

    #[test]
    fn test_month_dates() {
        let dates = month_dates(2026, 10, today()).unwrap();
        assert_eq!(dates.len(), 31);
        assert_eq!(dates[0].date, date(2026, 10, 1));
        assert_eq!(dates[0].status, DayStatus::Past);
        assert_eq!(dates[18].date, today());
        assert_eq!(dates[18].status, DayStatus::Available);
        assert_eq!(dates[23].status, DayStatus::Weekend);
        let available = dates.iter().filter(|d| d.status == DayStatus::Available).count();
        // 19-23, 26-30 October
        assert_eq!(available, 10);
    }
}
