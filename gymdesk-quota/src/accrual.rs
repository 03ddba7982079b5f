use chrono::{Datelike, NaiveDate};
use gymdesk_core::PeriodType;
use gymdesk_shared::dates::is_weekday;
use serde::{Deserialize, Serialize};

/// June through September.
pub fn is_summer(date: NaiveDate) -> bool {
    (6..=9).contains(&date.month())
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkingDays {
    pub working_days: u32,
    pub summer_days: u32,
    pub period_type: PeriodType,
}

impl WorkingDays {
    pub fn rest_of_year_days(&self) -> u32 {
        self.working_days.saturating_sub(self.summer_days)
    }
}

/// Counts Monday–Friday days in `[start, end]` and how many of them fall in
/// summer. Holidays are not modeled. Returns `None` when `end < start`.
///
/// The whole range is classified by majority: summer when at least half of
/// its working days are summer days. A range with no working days at all is
/// classified by its start date.
pub fn compute_working_days(start: NaiveDate, end: NaiveDate) -> Option<WorkingDays> {
    if end < start {
        return None;
    }

    let (working_days, summer_days) = start
        .iter_days()
        .take_while(|day| *day <= end)
        .filter(|day| is_weekday(*day))
        .fold((0u32, 0u32), |(working, summer), day| {
            (working + 1, summer + u32::from(is_summer(day)))
        });

    let summer = if working_days == 0 {
        is_summer(start)
    } else {
        summer_days * 2 >= working_days
    };

    Some(WorkingDays {
        working_days,
        summer_days,
        period_type: if summer { PeriodType::Summer } else { PeriodType::RestOfYear },
    })
}

/// Working days of `[start, end]` that fall inside `year`. `None` when the
/// range is inverted or misses the year entirely.
pub fn working_days_in_year(start: NaiveDate, end: NaiveDate, year: i32) -> Option<WorkingDays> {
    let first = NaiveDate::from_ymd_opt(year, 1, 1)?;
    let last = NaiveDate::from_ymd_opt(year, 12, 31)?;
    if end < start || end < first || start > last {
        return None;
    }
    compute_working_days(start.max(first), end.min(last))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_full_june_week() {
        let result = compute_working_days(d(2025, 6, 2), d(2025, 6, 6)).unwrap();
        assert_eq!(
            result,
            WorkingDays { working_days: 5, summer_days: 5, period_type: PeriodType::Summer }
        );
    }

    #[test]
    fn test_full_january_week() {
        let result = compute_working_days(d(2025, 1, 6), d(2025, 1, 10)).unwrap();
        assert_eq!(
            result,
            WorkingDays { working_days: 5, summer_days: 0, period_type: PeriodType::RestOfYear }
        );
    }

    #[test]
    fn test_end_before_start_is_none() {
        assert_eq!(compute_working_days(d(2025, 1, 10), d(2025, 1, 6)), None);
    }

    #[test]
    fn test_weekends_never_count() {
        // Saturday to the following Sunday: 5 working days
        let result = compute_working_days(d(2025, 1, 4), d(2025, 1, 12)).unwrap();
        assert_eq!(result.working_days, 5);

        let weekend = compute_working_days(d(2025, 1, 4), d(2025, 1, 5)).unwrap();
        assert_eq!(weekend.working_days, 0);
        assert_eq!(weekend.period_type, PeriodType::RestOfYear);
    }

    #[test]
    fn test_boundary_classified_by_majority() {
        // Thu 2025-05-29 .. Wed 2025-06-04: May 29, 30 | Jun 2, 3, 4
        let straddle = compute_working_days(d(2025, 5, 29), d(2025, 6, 4)).unwrap();
        assert_eq!((straddle.working_days, straddle.summer_days), (5, 3));
        assert_eq!(straddle.period_type, PeriodType::Summer);
        assert_eq!(straddle.rest_of_year_days(), 2);

        // Mon 2025-09-29 .. Fri 2025-10-03: Sep 29, 30 | Oct 1, 2, 3
        let autumn = compute_working_days(d(2025, 9, 29), d(2025, 10, 3)).unwrap();
        assert_eq!(autumn.summer_days, 2);
        assert_eq!(autumn.period_type, PeriodType::RestOfYear);

        // Exactly half counts as summer
        let half = compute_working_days(d(2025, 9, 29), d(2025, 10, 2)).unwrap();
        assert_eq!((half.working_days, half.summer_days), (4, 2));
        assert_eq!(half.period_type, PeriodType::Summer);
    }

    #[test]
    fn test_new_year_range_split_by_year() {
        // Mon 2025-12-29 .. Fri 2026-01-02
        let old = working_days_in_year(d(2025, 12, 29), d(2026, 1, 2), 2025).unwrap();
        let new = working_days_in_year(d(2025, 12, 29), d(2026, 1, 2), 2026).unwrap();
        assert_eq!((old.working_days, new.working_days), (3, 2));
        assert_eq!(old.rest_of_year_days() + new.rest_of_year_days(), 5);

        assert_eq!(working_days_in_year(d(2025, 12, 29), d(2026, 1, 2), 2027), None);
        assert_eq!(working_days_in_year(d(2026, 1, 2), d(2025, 12, 29), 2025), None);
    }
}
