//! Calendar helpers shared by the scheduling and vacation code.
//!
//! Everything here works on `NaiveDate` calendar fields. Nothing is converted
//! through UTC, so a date never shifts by a day because of the host offset.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone};

const STAMP_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DateError {
    #[error("Invalid date stamp: {0}")]
    InvalidStamp(String),

    #[error("Invalid time (expected HH:MM): {0}")]
    InvalidTime(String),

    #[error("Invalid month {month} for year {year}")]
    InvalidMonth { year: i32, month: u32 },
}

/// Formats a date as `YYYY-MM-DD` from its own year/month/day fields.
pub fn local_date_stamp(date: NaiveDate) -> String {
    date.format(STAMP_FORMAT).to_string()
}

/// Stamp of the wall-clock date of `instant` in its own time zone.
pub fn local_date_stamp_at<Tz: TimeZone>(instant: &DateTime<Tz>) -> String {
    local_date_stamp(instant.date_naive())
}

pub fn parse_date_stamp(raw: &str) -> Result<NaiveDate, DateError> {
    NaiveDate::parse_from_str(raw.trim(), STAMP_FORMAT)
        .map_err(|_| DateError::InvalidStamp(raw.to_string()))
}

/// Accepts `HH:MM` and, for values coming back from SQL, `HH:MM:SS`.
pub fn parse_hhmm(raw: &str) -> Result<NaiveTime, DateError> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|_| DateError::InvalidTime(raw.to_string()))
}

/// Monday on or before `date`.
pub fn monday_of(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// 1 = Monday .. 7 = Sunday.
pub fn weekday_index(date: NaiveDate) -> u8 {
    date.weekday().number_from_monday() as u8
}

pub fn is_weekday(date: NaiveDate) -> bool {
    weekday_index(date) <= 5
}

/// Monday to Friday of the week starting at `monday`.
pub fn week_days(monday: NaiveDate) -> [NaiveDate; 5] {
    let monday = monday_of(monday);
    [0, 1, 2, 3, 4].map(|offset| monday + Duration::days(offset))
}

/// First and last calendar day of a month.
pub fn month_bounds(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate), DateError> {
    let invalid = || DateError::InvalidMonth { year, month };
    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
    let next_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(invalid)?;
    Ok((first, next_first - Duration::days(1)))
}

/// Mondays of every week whose Monday–Friday span touches the month.
///
/// The first week may start in the previous month and the last one may end in
/// the next. A week whose only days inside the month fall on a weekend is
/// left out.
pub fn weeks_overlapping_month(month: u32, year: i32) -> Result<MonthWeeks, DateError> {
    let (first, last) = month_bounds(year, month)?;
    Ok(MonthWeeks {
        next: monday_of(first),
        first,
        last,
    })
}

/// Iterator returned by [`weeks_overlapping_month`].
#[derive(Debug, Clone)]
pub struct MonthWeeks {
    next: NaiveDate,
    first: NaiveDate,
    last: NaiveDate,
}

impl Iterator for MonthWeeks {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        while self.next <= self.last {
            let monday = self.next;
            self.next = monday + Duration::days(7);
            if monday + Duration::days(4) >= self.first {
                return Some(monday);
            }
        }
        None
    }
}

/// Serde codec for `HH:MM` times.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse_hhmm(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Timelike};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_stamp_round_trip_ignores_offset() {
        // 23:30 on the 31st in UTC-5 is already the 1st in UTC.
        for hours in [-12, -5, 0, 5, 14] {
            let tz = FixedOffset::east_opt(hours * 3600).unwrap();
            let local = tz.with_ymd_and_hms(2025, 1, 31, 23, 30, 0).unwrap();
            let stamp = local_date_stamp_at(&local);
            assert_eq!(stamp, "2025-01-31");
            assert_eq!(parse_date_stamp(&stamp).unwrap(), d(2025, 1, 31));
        }
    }

    #[test]
    fn test_monday_of() {
        assert_eq!(monday_of(d(2025, 6, 4)), d(2025, 6, 2));
        assert_eq!(monday_of(d(2025, 6, 2)), d(2025, 6, 2));
        assert_eq!(monday_of(d(2025, 6, 8)), d(2025, 6, 2));
        // crosses a year boundary
        assert_eq!(monday_of(d(2025, 1, 1)), d(2024, 12, 30));
    }

    #[test]
    fn test_monday_of_is_idempotent() {
        let mut day = d(2024, 12, 1);
        while day < d(2025, 3, 1) {
            let monday = monday_of(day);
            assert_eq!(monday_of(monday), monday);
            assert_eq!(weekday_index(monday), 1);
            day = day.succ_opt().unwrap();
        }
    }

    #[test]
    fn test_february_2025_skips_week_of_jan_27() {
        let weeks: Vec<_> = weeks_overlapping_month(2, 2025).unwrap().collect();
        // Feb 1st is a Saturday, so Jan 27..31 never touches February.
        assert!(!weeks.contains(&d(2025, 1, 27)));
        assert_eq!(weeks, vec![d(2025, 2, 3), d(2025, 2, 10), d(2025, 2, 17), d(2025, 2, 24)]);
    }

    #[test]
    fn test_weeks_spilling_into_adjacent_months() {
        // Jan 1st 2025 is a Wednesday; Jan 31st a Friday.
        let weeks: Vec<_> = weeks_overlapping_month(1, 2025).unwrap().collect();
        assert_eq!(weeks.first(), Some(&d(2024, 12, 30)));
        assert_eq!(weeks.last(), Some(&d(2025, 1, 27)));
        assert_eq!(weeks.len(), 5);

        // March 31st 2025 is a Monday: the last week ends in April.
        let march: Vec<_> = weeks_overlapping_month(3, 2025).unwrap().collect();
        assert_eq!(march.first(), Some(&d(2025, 3, 3)));
        assert_eq!(march.last(), Some(&d(2025, 3, 31)));
        assert!(march.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_invalid_month() {
        assert!(weeks_overlapping_month(13, 2025).is_err());
        assert!(month_bounds(2025, 0).is_err());
        assert_eq!(month_bounds(2024, 2).unwrap().1, d(2024, 2, 29));
        assert_eq!(month_bounds(2025, 12).unwrap().1, d(2025, 12, 31));
    }

    #[test]
    fn test_week_days_and_hhmm() {
        let days = week_days(d(2025, 6, 4));
        assert_eq!(days[0], d(2025, 6, 2));
        assert_eq!(days[4], d(2025, 6, 6));

        let t = parse_hhmm("07:45").unwrap();
        assert_eq!((t.hour(), t.minute()), (7, 45));
        assert_eq!(parse_hhmm("18:00:00").unwrap().hour(), 18);
        assert!(parse_hhmm("25:00").is_err());
    }
}
