use chrono::Datelike;
use gymdesk_core::VacationRequest;
use serde::{Deserialize, Serialize};

use crate::accrual::{working_days_in_year, WorkingDays};

fn default_annual_days() -> u32 { 22 }
fn default_min_summer_days() -> u32 { 10 }
fn default_max_rest_of_year_days() -> u32 { 12 }

/// Yearly vacation limits, loaded from the `vacation_policy` config section.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct VacationPolicy {
    #[serde(default = "default_annual_days")]
    pub annual_days: u32,
    #[serde(default = "default_min_summer_days")]
    pub min_summer_days: u32,
    #[serde(default = "default_max_rest_of_year_days")]
    pub max_rest_of_year_days: u32,
}

impl Default for VacationPolicy {
    fn default() -> Self {
        Self {
            annual_days: default_annual_days(),
            min_summer_days: default_min_summer_days(),
            max_rest_of_year_days: default_max_rest_of_year_days(),
        }
    }
}

/// Days already taken or requested by a trainer in a year.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct VacationUsage {
    pub summer_days: u32,
    pub rest_of_year_days: u32,
}

impl VacationUsage {
    /// Sums the days that pending and approved requests place in `year`.
    /// A request across New Year only counts its days inside `year`.
    pub fn in_year<'a, I>(requests: I, year: i32) -> Self
    where
        I: IntoIterator<Item = &'a VacationRequest>,
    {
        requests
            .into_iter()
            .filter(|r| r.status.holds_days())
            .filter_map(|r| split_for_year(r, year))
            .fold(Self::default(), |acc, (summer, rest)| Self {
                summer_days: acc.summer_days + summer,
                rest_of_year_days: acc.rest_of_year_days + rest,
            })
    }

    pub fn total(&self) -> u32 {
        self.summer_days + self.rest_of_year_days
    }
}

/// (summer, rest of year) days of `request` inside `year`. Stored counts are
/// used as is unless the request crosses into another year.
fn split_for_year(request: &VacationRequest, year: i32) -> Option<(u32, u32)> {
    if request.start_date.year() == year && request.end_date.year() == year {
        return Some((request.summer_days, request.rest_of_year_days()));
    }
    working_days_in_year(request.start_date, request.end_date, year)
        .map(|days| (days.summer_days, days.rest_of_year_days()))
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BalanceWarning {
    ExceedsAnnualAllowance,
    ExceedsRestOfYearMaximum,
    /// Not enough allowance left to ever reach the summer minimum.
    SummerMinimumUnreachable,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BalanceCheck {
    pub projected_summer_days: u32,
    pub projected_rest_of_year_days: u32,
    pub projected_total: u32,
    /// Negative when the request goes over the annual allowance.
    pub remaining_days: i64,
    pub warnings: Vec<BalanceWarning>,
}

impl BalanceCheck {
    pub fn within_policy(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Advisory only: flags a request that breaks the policy but never blocks it.
pub fn check_balance(policy: &VacationPolicy, usage: &VacationUsage, request: &WorkingDays) -> BalanceCheck {
    let summer = usage.summer_days + request.summer_days;
    let rest = usage.rest_of_year_days + request.rest_of_year_days();
    let total = summer + rest;
    let remaining = i64::from(policy.annual_days) - i64::from(total);

    let mut warnings = Vec::new();
    if remaining < 0 {
        warnings.push(BalanceWarning::ExceedsAnnualAllowance);
    }
    if rest > policy.max_rest_of_year_days {
        warnings.push(BalanceWarning::ExceedsRestOfYearMaximum);
    }
    if i64::from(summer) + remaining.max(0) < i64::from(policy.min_summer_days) {
        warnings.push(BalanceWarning::SummerMinimumUnreachable);
    }

    BalanceCheck {
        projected_summer_days: summer,
        projected_rest_of_year_days: rest,
        projected_total: total,
        remaining_days: remaining,
        warnings,
    }
}
