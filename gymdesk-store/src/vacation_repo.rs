use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use gymdesk_core::repository::{OverlapError, VacationFilter, VacationRepository};
use gymdesk_core::{RepoError, RepoResult, VacationRequest};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::violates_exclusion;

pub struct StoreVacationRepository {
    pool: PgPool,
}

impl StoreVacationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct VacationRow {
    id: Uuid,
    trainer_id: Uuid,
    start_date: NaiveDate,
    end_date: NaiveDate,
    working_days: i32,
    summer_days: i32,
    period_type: String,
    status: String,
    notes: Option<String>,
    rejection_reason: Option<String>,
    reviewed_by: Option<Uuid>,
    reviewed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl TryFrom<VacationRow> for VacationRequest {
    type Error = RepoError;

    fn try_from(row: VacationRow) -> Result<Self, Self::Error> {
        Ok(VacationRequest {
            id: row.id,
            trainer_id: row.trainer_id,
            start_date: row.start_date,
            end_date: row.end_date,
            working_days: u32::try_from(row.working_days)?,
            summer_days: u32::try_from(row.summer_days)?,
            period_type: row.period_type.parse()?,
            status: row.status.parse()?,
            notes: row.notes,
            rejection_reason: row.rejection_reason,
            reviewed_by: row.reviewed_by,
            reviewed_at: row.reviewed_at,
            created_at: row.created_at,
        })
    }
}

const SELECT_REQUEST: &str = "SELECT id, trainer_id, start_date, end_date, working_days, summer_days, period_type, status, notes, rejection_reason, reviewed_by, reviewed_at, created_at FROM vacation_requests";

#[async_trait]
impl VacationRepository for StoreVacationRepository {
    async fn create_request(&self, request: &VacationRequest) -> RepoResult<Uuid> {
        let inserted = sqlx::query(
            r#"
            INSERT INTO vacation_requests
                (id, trainer_id, start_date, end_date, working_days, summer_days, period_type, status, notes, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(request.id)
        .bind(request.trainer_id)
        .bind(request.start_date)
        .bind(request.end_date)
        .bind(i32::try_from(request.working_days)?)
        .bind(i32::try_from(request.summer_days)?)
        .bind(request.period_type.as_str())
        .bind(request.status.as_str())
        .bind(request.notes.as_deref())
        .bind(request.created_at)
        .execute(&self.pool)
        .await;

        match inserted {
            Ok(_) => Ok(request.id),
            Err(e) if violates_exclusion(&e, "vacation_requests_no_overlap") => {
                let existing = sqlx::query_scalar::<_, Uuid>(
                    r#"
                    SELECT id FROM vacation_requests
                    WHERE trainer_id = $1 AND start_date <= $3 AND $2 <= end_date
                      AND status IN ('pending', 'approved')
                    LIMIT 1
                    "#,
                )
                .bind(request.trainer_id)
                .bind(request.start_date)
                .bind(request.end_date)
                .fetch_optional(&self.pool)
                .await?;

                Err(Box::new(OverlapError { entity: "vacation request", existing }))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn get_request(&self, id: Uuid) -> RepoResult<Option<VacationRequest>> {
        let row = sqlx::query_as::<_, VacationRow>(&format!("{SELECT_REQUEST} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(VacationRequest::try_from).transpose()
    }

    async fn list_requests(&self, filter: &VacationFilter) -> RepoResult<Vec<VacationRequest>> {
        // NULL parameters disable their filter
        let rows = sqlx::query_as::<_, VacationRow>(&format!(
            r#"{SELECT_REQUEST}
            WHERE ($1::UUID IS NULL OR trainer_id = $1)
              AND ($2::TEXT IS NULL OR status = $2)
              AND ($3::INT IS NULL OR (EXTRACT(YEAR FROM start_date)::INT <= $3 AND EXTRACT(YEAR FROM end_date)::INT >= $3))
            ORDER BY start_date, created_at"#
        ))
        .bind(filter.trainer_id)
        .bind(filter.status.map(|s| s.as_str()))
        .bind(filter.year)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(VacationRequest::try_from).collect()
    }

    async fn update_request(&self, request: &VacationRequest) -> RepoResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE vacation_requests
            SET status = $2, rejection_reason = $3, reviewed_by = $4, reviewed_at = $5, notes = $6
            WHERE id = $1
            "#,
        )
        .bind(request.id)
        .bind(request.status.as_str())
        .bind(request.rejection_reason.as_deref())
        .bind(request.reviewed_by)
        .bind(request.reviewed_at)
        .bind(request.notes.as_deref())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(format!("vacation request {} not found", request.id).into());
        }
        Ok(())
    }
}
