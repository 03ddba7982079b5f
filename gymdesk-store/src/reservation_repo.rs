use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use gymdesk_core::repository::{OverlapError, ReservationRepository};
use gymdesk_core::{RepoError, RepoResult, Reservation, ReservationStatus};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::violates_exclusion;

pub struct StoreReservationRepository {
    pool: PgPool,
}

impl StoreReservationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ReservationRow {
    id: Uuid,
    trainer_id: Uuid,
    client_id: Option<Uuid>,
    date: NaiveDate,
    start_time: NaiveTime,
    end_time: NaiveTime,
    session_type: String,
    status: String,
    source_template_id: Option<Uuid>,
    created_at: DateTime<Utc>,
}

impl TryFrom<ReservationRow> for Reservation {
    type Error = RepoError;

    fn try_from(row: ReservationRow) -> Result<Self, Self::Error> {
        Ok(Reservation {
            id: row.id,
            trainer_id: row.trainer_id,
            client_id: row.client_id,
            date: row.date,
            start_time: row.start_time,
            end_time: row.end_time,
            session_type: row.session_type.parse()?,
            status: row.status.parse()?,
            source_template_id: row.source_template_id,
            created_at: row.created_at,
        })
    }
}

const SELECT_RESERVATION: &str = "SELECT id, trainer_id, client_id, date, start_time, end_time, session_type, status, source_template_id, created_at FROM reservations";

#[async_trait]
impl ReservationRepository for StoreReservationRepository {
    async fn list_by_trainer(&self, trainer_id: Uuid, from: NaiveDate, to: NaiveDate) -> RepoResult<Vec<Reservation>> {
        let rows = sqlx::query_as::<_, ReservationRow>(&format!(
            "{SELECT_RESERVATION} WHERE trainer_id = $1 AND date BETWEEN $2 AND $3 ORDER BY date, start_time"
        ))
        .bind(trainer_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Reservation::try_from).collect()
    }

    async fn list_by_client(&self, client_id: Uuid, from: NaiveDate, to: NaiveDate) -> RepoResult<Vec<Reservation>> {
        let rows = sqlx::query_as::<_, ReservationRow>(&format!(
            "{SELECT_RESERVATION} WHERE client_id = $1 AND date BETWEEN $2 AND $3 ORDER BY date, start_time"
        ))
        .bind(client_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Reservation::try_from).collect()
    }

    async fn create_reservation(&self, reservation: &Reservation) -> RepoResult<Uuid> {
        let inserted = sqlx::query(
            r#"
            INSERT INTO reservations (id, trainer_id, client_id, date, start_time, end_time, session_type, status, source_template_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(reservation.id)
        .bind(reservation.trainer_id)
        .bind(reservation.client_id)
        .bind(reservation.date)
        .bind(reservation.start_time)
        .bind(reservation.end_time)
        .bind(reservation.session_type.as_str())
        .bind(reservation.status.as_str())
        .bind(reservation.source_template_id)
        .bind(reservation.created_at)
        .execute(&self.pool)
        .await;

        match inserted {
            Ok(_) => Ok(reservation.id),
            Err(e) if violates_exclusion(&e, "reservations_no_trainer_overlap") => {
                let existing = sqlx::query_scalar::<_, Uuid>(
                    r#"
                    SELECT id FROM reservations
                    WHERE trainer_id = $1 AND date = $2 AND start_time < $4 AND $3 < end_time
                      AND status NOT IN ('cancelled_by_client', 'cancelled_by_center')
                    LIMIT 1
                    "#,
                )
                .bind(reservation.trainer_id)
                .bind(reservation.date)
                .bind(reservation.start_time)
                .bind(reservation.end_time)
                .fetch_optional(&self.pool)
                .await?;

                Err(Box::new(OverlapError { entity: "reservation", existing }))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn get_reservation(&self, id: Uuid) -> RepoResult<Option<Reservation>> {
        let row = sqlx::query_as::<_, ReservationRow>(&format!("{SELECT_RESERVATION} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Reservation::try_from).transpose()
    }

    async fn update_reservation_status(&self, id: Uuid, status: ReservationStatus) -> RepoResult<()> {
        let result = sqlx::query("UPDATE reservations SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status.as_str())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(format!("reservation {id} not found").into());
        }
        Ok(())
    }
}
