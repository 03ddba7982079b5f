use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{NaiveDate, NaiveTime, Utc};
use gymdesk_core::{Reservation, ReservationStatus, SessionType};
use gymdesk_schedule::booking::{book, change_status};
use gymdesk_shared::dates::hhmm;
use gymdesk_shared::models::{ReservationBookedEvent, ScheduleEvent};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateReservationRequest {
    pub trainer_id: Uuid,
    pub client_id: Option<Uuid>,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    pub session_type: SessionType,
}

#[derive(Debug, Deserialize)]
pub struct ListReservationsQuery {
    pub trainer_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
    pub from: NaiveDate,
    pub to: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct StatusChangeRequest {
    pub status: ReservationStatus,
}

/// POST /v1/reservations
/// Direct booking: a trainer collision is refused with 409.
pub async fn create_reservation(
    State(state): State<AppState>,
    Json(req): Json<CreateReservationRequest>,
) -> Result<(StatusCode, Json<Reservation>), AppError> {
    let reservation = Reservation::new(
        req.trainer_id,
        req.client_id,
        req.date,
        req.start_time,
        req.end_time,
        req.session_type,
    )?;
    let reservation = book(state.reservations.as_ref(), reservation).await?;

    state.publish(ScheduleEvent::ReservationBooked(ReservationBookedEvent {
        reservation_id: reservation.id,
        trainer_id: reservation.trainer_id,
        client_id: reservation.client_id,
        date: reservation.date,
        timestamp: Utc::now().timestamp(),
    }));

    Ok((StatusCode::CREATED, Json(reservation)))
}

/// GET /v1/reservations?trainer_id=&from=&to=
/// `client_id` may be given instead of `trainer_id`.
pub async fn list_reservations(
    State(state): State<AppState>,
    Query(query): Query<ListReservationsQuery>,
) -> Result<Json<Vec<Reservation>>, AppError> {
    if query.to < query.from {
        return Err(AppError::ValidationError(format!(
            "range ends ({}) before it starts ({})",
            query.to, query.from
        )));
    }

    let rows = match (query.trainer_id, query.client_id) {
        (Some(trainer_id), _) => state.reservations.list_by_trainer(trainer_id, query.from, query.to).await?,
        (None, Some(client_id)) => state.reservations.list_by_client(client_id, query.from, query.to).await?,
        (None, None) => {
            return Err(AppError::ValidationError("trainer_id or client_id is required".to_string()));
        }
    };

    Ok(Json(rows))
}

/// POST /v1/reservations/{id}/status
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<StatusChangeRequest>,
) -> Result<Json<Reservation>, AppError> {
    let reservation = change_status(state.reservations.as_ref(), id, req.status).await?;
    tracing::info!("Reservation {} is now {}", id, reservation.status);
    Ok(Json(reservation))
}
