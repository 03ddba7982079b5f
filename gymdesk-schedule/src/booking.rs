use gymdesk_core::repository::ReservationRepository;
use gymdesk_core::{Reservation, ReservationStatus};
use tracing::info;
use uuid::Uuid;

use crate::conflicts::find_conflict;
use crate::error::ScheduleError;

/// Books a single reservation made directly by a user.
///
/// Runs the same trainer conflict check as template application and refuses
/// the booking instead of skipping it.
pub async fn book(repo: &dyn ReservationRepository, reservation: Reservation) -> Result<Reservation, ScheduleError> {
    let same_day = repo
        .list_by_trainer(reservation.trainer_id, reservation.date, reservation.date)
        .await
        .map_err(ScheduleError::persistence)?;

    if let Some(existing) = find_conflict(&reservation, &same_day) {
        return Err(ScheduleError::Conflict {
            trainer_id: reservation.trainer_id,
            date: reservation.date,
            conflicting_with: Some(existing.id),
        });
    }

    // Another writer may have taken the slot since the read
    repo.create_reservation(&reservation)
        .await
        .map_err(|e| ScheduleError::from_write(e, &reservation))?;

    info!("Reservation booked: {} on {}", reservation.id, reservation.date);
    Ok(reservation)
}

/// Loads a reservation and moves it to `next`.
pub async fn change_status(
    repo: &dyn ReservationRepository,
    id: Uuid,
    next: ReservationStatus,
) -> Result<Reservation, ScheduleError> {
    let mut reservation = repo
        .get_reservation(id)
        .await
        .map_err(ScheduleError::persistence)?
        .ok_or_else(|| gymdesk_core::CoreError::NotFound {
            entity: "reservation",
            id: id.to_string(),
        })?;

    reservation.transition(next)?;
    repo.update_reservation_status(id, next)
        .await
        .map_err(ScheduleError::persistence)?;

    Ok(reservation)
}
