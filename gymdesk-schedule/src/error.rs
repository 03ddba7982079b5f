use chrono::NaiveDate;
use gymdesk_core::repository::OverlapError;
use gymdesk_core::{CoreError, RepoError, Reservation};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    #[error("Invalid template slot #{slot}: {reason}")]
    InvalidTemplate { slot: usize, reason: String },

    #[error("Template {0} has no slots")]
    EmptyTemplate(Uuid),

    #[error("Template {0} is archived")]
    TemplateArchived(Uuid),

    #[error("No target weeks given")]
    NoWeeks,

    #[error("Trainer {trainer_id} is already booked on {date}")]
    Conflict {
        trainer_id: Uuid,
        date: NaiveDate,
        conflicting_with: Option<Uuid>,
    },

    #[error("Persistence failed: {0}")]
    Persistence(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl ScheduleError {
    pub fn persistence(err: RepoError) -> Self {
        ScheduleError::Persistence(err.to_string())
    }

    /// Maps a failed reservation write. An overlap caught by the store is a conflict.
    pub fn from_write(err: RepoError, reservation: &Reservation) -> Self {
        match OverlapError::find(&err).map(|overlap| overlap.existing) {
            Some(existing) => ScheduleError::Conflict {
                trainer_id: reservation.trainer_id,
                date: reservation.date,
                conflicting_with: existing,
            },
            None => ScheduleError::persistence(err),
        }
    }
}
