use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use gymdesk_core::repository::TemplateRepository;
use gymdesk_core::{RepoError, RepoResult, TemplateState, WeeklyTemplate};
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

pub struct StoreTemplateRepository {
    pool: PgPool,
}

impl StoreTemplateRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal struct for type-safe querying
#[derive(sqlx::FromRow)]
struct TemplateRow {
    id: Uuid,
    name: String,
    reference_week_start: NaiveDate,
    slots: Value,
    state: String,
    is_month_base: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TemplateRow> for WeeklyTemplate {
    type Error = RepoError;

    fn try_from(row: TemplateRow) -> Result<Self, Self::Error> {
        Ok(WeeklyTemplate {
            id: row.id,
            name: row.name,
            reference_week_start: row.reference_week_start,
            slots: serde_json::from_value(row.slots)?,
            state: row.state.parse()?,
            is_month_base: row.is_month_base,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const SELECT_TEMPLATE: &str = "SELECT id, name, reference_week_start, slots, state, is_month_base, created_at, updated_at FROM weekly_templates";

#[async_trait]
impl TemplateRepository for StoreTemplateRepository {
    async fn create_template(&self, template: &WeeklyTemplate) -> RepoResult<Uuid> {
        sqlx::query(
            r#"
            INSERT INTO weekly_templates (id, name, reference_week_start, slots, state, is_month_base, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(template.id)
        .bind(&template.name)
        .bind(template.reference_week_start)
        .bind(serde_json::to_value(&template.slots)?)
        .bind(template.state.as_str())
        .bind(template.is_month_base)
        .bind(template.created_at)
        .bind(template.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(template.id)
    }

    async fn get_template(&self, id: Uuid) -> RepoResult<Option<WeeklyTemplate>> {
        let row = sqlx::query_as::<_, TemplateRow>(&format!("{SELECT_TEMPLATE} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(WeeklyTemplate::try_from).transpose()
    }

    async fn list_templates(&self) -> RepoResult<Vec<WeeklyTemplate>> {
        let rows = sqlx::query_as::<_, TemplateRow>(&format!("{SELECT_TEMPLATE} ORDER BY reference_week_start DESC, name"))
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(WeeklyTemplate::try_from).collect()
    }

    async fn update_template(&self, template: &WeeklyTemplate) -> RepoResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE weekly_templates
            SET name = $2, reference_week_start = $3, slots = $4, state = $5, is_month_base = $6, updated_at = $7
            WHERE id = $1
            "#,
        )
        .bind(template.id)
        .bind(&template.name)
        .bind(template.reference_week_start)
        .bind(serde_json::to_value(&template.slots)?)
        .bind(template.state.as_str())
        .bind(template.is_month_base)
        .bind(template.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(format!("template {} not found", template.id).into());
        }
        Ok(())
    }

    async fn mark_applied(&self, id: Uuid) -> RepoResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE weekly_templates
            SET state = $2, updated_at = NOW()
            WHERE id = $1 AND state <> $3
            "#,
        )
        .bind(id)
        .bind(TemplateState::Applied.as_str())
        .bind(TemplateState::Archived.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn clear_month_base(&self, year: i32, month: u32, keep: Uuid) -> RepoResult<()> {
        sqlx::query(
            r#"
            UPDATE weekly_templates
            SET is_month_base = FALSE, updated_at = NOW()
            WHERE is_month_base
              AND id <> $1
              AND EXTRACT(YEAR FROM reference_week_start)::INT = $2
              AND EXTRACT(MONTH FROM reference_week_start)::INT = $3
            "#,
        )
        .bind(keep)
        .bind(year)
        .bind(month as i32)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
