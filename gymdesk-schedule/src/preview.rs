use chrono::{Duration, NaiveDate};
use gymdesk_core::repository::ReservationRepository;
use gymdesk_core::{Reservation, WeeklyTemplate};
use gymdesk_shared::dates::monday_of;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::conflicts::{resolve_week, ConflictCheck};
use crate::error::ScheduleError;
use crate::projection::project;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct PreviewSummary {
    pub without_conflict: usize,
    pub with_conflict: usize,
}

/// What applying a template to one week would do, without writing anything.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeekPreview {
    pub week: NaiveDate,
    pub summary: PreviewSummary,
    pub checks: Vec<ConflictCheck>,
}

impl WeekPreview {
    pub fn from_checks(week: NaiveDate, checks: Vec<ConflictCheck>) -> Self {
        let with_conflict = checks.iter().filter(|c| c.conflict).count();
        Self {
            week,
            summary: PreviewSummary {
                without_conflict: checks.len() - with_conflict,
                with_conflict,
            },
            checks,
        }
    }
}

/// Existing reservations of `trainers` during the week starting at `monday`.
pub async fn load_week_reservations(
    repo: &dyn ReservationRepository,
    trainers: &[Uuid],
    monday: NaiveDate,
) -> Result<Vec<Reservation>, ScheduleError> {
    let sunday = monday + Duration::days(6);
    let mut existing = Vec::new();
    for trainer_id in trainers {
        let mut rows = repo
            .list_by_trainer(*trainer_id, monday, sunday)
            .await
            .map_err(ScheduleError::persistence)?;
        existing.append(&mut rows);
    }
    Ok(existing)
}

pub async fn preview_week(
    template: &WeeklyTemplate,
    week: NaiveDate,
    repo: &dyn ReservationRepository,
) -> Result<WeekPreview, ScheduleError> {
    let monday = monday_of(week);
    let candidates = project(template, monday)?;
    let existing = load_week_reservations(repo, &template.trainer_ids(), monday).await?;
    Ok(WeekPreview::from_checks(monday, resolve_week(&candidates, &existing)))
}
