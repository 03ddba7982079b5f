use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::{CoreError, CoreResult};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PeriodType {
    Summer,
    RestOfYear,
}

impl PeriodType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodType::Summer => "summer",
            PeriodType::RestOfYear => "rest_of_year",
        }
    }
}

impl FromStr for PeriodType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "summer" => Ok(PeriodType::Summer),
            "rest_of_year" => Ok(PeriodType::RestOfYear),
            other => Err(CoreError::ValidationError(format!("unknown period type '{other}'"))),
        }
    }
}

/// Pending is the only non-terminal status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VacationStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

impl VacationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VacationStatus::Pending => "pending",
            VacationStatus::Approved => "approved",
            VacationStatus::Rejected => "rejected",
            VacationStatus::Cancelled => "cancelled",
        }
    }

    /// Pending and approved requests hold days against the trainer's allowance.
    pub fn holds_days(&self) -> bool {
        matches!(self, VacationStatus::Pending | VacationStatus::Approved)
    }
}

impl fmt::Display for VacationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VacationStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(VacationStatus::Pending),
            "approved" => Ok(VacationStatus::Approved),
            "rejected" => Ok(VacationStatus::Rejected),
            "cancelled" => Ok(VacationStatus::Cancelled),
            other => Err(CoreError::ValidationError(format!("unknown vacation status '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VacationRequest {
    pub id: Uuid,
    pub trainer_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub working_days: u32,
    pub summer_days: u32,
    pub period_type: PeriodType,
    pub status: VacationStatus,
    pub notes: Option<String>,
    pub rejection_reason: Option<String>,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl VacationRequest {
    /// Working days outside summer. Zero when a stored row has more summer days than working days.
    pub fn rest_of_year_days(&self) -> u32 {
        self.working_days.saturating_sub(self.summer_days)
    }

    /// Intersects `[start, end]` (both inclusive).
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.start_date <= end && start <= self.end_date
    }

    /// Transition: Pending → Approved
    pub fn approve(&mut self, reviewer: Uuid, at: DateTime<Utc>) -> CoreResult<()> {
        self.ensure_pending(VacationStatus::Approved)?;
        self.status = VacationStatus::Approved;
        self.reviewed_by = Some(reviewer);
        self.reviewed_at = Some(at);
        Ok(())
    }

    /// Transition: Pending → Rejected. A reason is mandatory.
    pub fn reject(&mut self, reviewer: Uuid, reason: &str, at: DateTime<Utc>) -> CoreResult<()> {
        self.ensure_pending(VacationStatus::Rejected)?;
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(CoreError::ValidationError("a rejection reason is required".to_string()));
        }
        self.status = VacationStatus::Rejected;
        self.rejection_reason = Some(reason.to_string());
        self.reviewed_by = Some(reviewer);
        self.reviewed_at = Some(at);
        Ok(())
    }

    /// Transition: Pending → Cancelled, by the requester or a manager.
    pub fn cancel(&mut self) -> CoreResult<()> {
        self.ensure_pending(VacationStatus::Cancelled)?;
        self.status = VacationStatus::Cancelled;
        Ok(())
    }

    fn ensure_pending(&self, to: VacationStatus) -> CoreResult<()> {
        if self.status != VacationStatus::Pending {
            return Err(CoreError::InvalidTransition {
                from: self.status.to_string(),
                to: to.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending() -> VacationRequest {
        VacationRequest {
            id: Uuid::new_v4(),
            trainer_id: Uuid::new_v4(),
            start_date: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 6, 6).unwrap(),
            working_days: 5,
            summer_days: 5,
            period_type: PeriodType::Summer,
            status: VacationStatus::Pending,
            notes: None,
            rejection_reason: None,
            reviewed_by: None,
            reviewed_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_terminal_states_are_final() {
        let reviewer = Uuid::new_v4();

        let mut approved = pending();
        approved.approve(reviewer, Utc::now()).unwrap();
        assert_eq!(approved.reviewed_by, Some(reviewer));
        assert!(approved.cancel().is_err());
        assert!(approved.reject(reviewer, "late", Utc::now()).is_err());

        let mut cancelled = pending();
        cancelled.cancel().unwrap();
        assert!(cancelled.approve(reviewer, Utc::now()).is_err());
    }

    #[test]
    fn test_reject_requires_reason() {
        let mut request = pending();
        assert!(request.reject(Uuid::new_v4(), "   ", Utc::now()).is_err());
        assert_eq!(request.status, VacationStatus::Pending);

        request.reject(Uuid::new_v4(), "peak season", Utc::now()).unwrap();
        assert_eq!(request.rejection_reason.as_deref(), Some("peak season"));
    }

    #[test]
    fn test_overlaps_is_inclusive() {
        let request = pending();
        let d = |day| NaiveDate::from_ymd_opt(2025, 6, day).unwrap();
        assert!(request.overlaps(d(6), d(10)));
        assert!(request.overlaps(d(1), d(2)));
        assert!(!request.overlaps(d(7), d(9)));
    }
}
