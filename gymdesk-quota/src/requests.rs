use chrono::{NaiveDate, Utc};
use gymdesk_core::{CoreError, VacationRequest, VacationStatus};
use tracing::debug;
use uuid::Uuid;

use crate::accrual::compute_working_days;

#[derive(Debug, thiserror::Error)]
pub enum VacationError {
    #[error("Vacation ends ({end}) before it starts ({start})")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("Vacation overlaps request {0}")]
    Overlapping(Uuid),

    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Builds a new pending request, computing its working days.
///
/// `existing` should hold the trainer's other requests; any pending or
/// approved one that intersects the new range is refused.
pub fn open_request(
    trainer_id: Uuid,
    start: NaiveDate,
    end: NaiveDate,
    notes: Option<String>,
    existing: &[VacationRequest],
) -> Result<VacationRequest, VacationError> {
    let days = compute_working_days(start, end).ok_or(VacationError::InvalidRange { start, end })?;

    if let Some(clash) = existing
        .iter()
        .find(|r| r.trainer_id == trainer_id && r.status.holds_days() && r.overlaps(start, end))
    {
        return Err(VacationError::Overlapping(clash.id));
    }

    debug!(
        "Vacation for {} from {} to {}: {} working day(s), {} in summer",
        trainer_id, start, end, days.working_days, days.summer_days
    );

    Ok(VacationRequest {
        id: Uuid::new_v4(),
        trainer_id,
        start_date: start,
        end_date: end,
        working_days: days.working_days,
        summer_days: days.summer_days,
        period_type: days.period_type,
        status: VacationStatus::Pending,
        notes: notes.filter(|n| !n.trim().is_empty()),
        rejection_reason: None,
        reviewed_by: None,
        reviewed_at: None,
        created_at: Utc::now(),
    })
}
