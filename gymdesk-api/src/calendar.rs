use axum::{extract::Query, Json};
use chrono::NaiveDate;
use gymdesk_shared::dates::week_days;
use gymdesk_shared::{local_date_stamp, weeks_overlapping_month};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct MonthQuery {
    pub year: i32,
    pub month: u32,
}

#[derive(Debug, Serialize)]
pub struct CalendarWeek {
    /// Monday, `YYYY-MM-DD`.
    pub monday: String,
    pub friday: String,
}

#[derive(Debug, Serialize)]
pub struct CalendarWeeksResponse {
    pub year: i32,
    pub month: u32,
    pub weeks: Vec<CalendarWeek>,
}

fn calendar_week(monday: NaiveDate) -> CalendarWeek {
    let [_, _, _, _, friday] = week_days(monday);
    CalendarWeek {
        monday: local_date_stamp(monday),
        friday: local_date_stamp(friday),
    }
}

/// GET /v1/calendar/weeks?year=&month=
/// Every working week with at least one weekday inside the month.
pub async fn month_weeks(Query(query): Query<MonthQuery>) -> Result<Json<CalendarWeeksResponse>, AppError> {
    let weeks = weeks_overlapping_month(query.month, query.year)?
        .map(calendar_week)
        .collect();

    Ok(Json(CalendarWeeksResponse {
        year: query.year,
        month: query.month,
        weeks,
    }))
}
