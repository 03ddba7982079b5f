use async_trait::async_trait;
use chrono::NaiveDate;
use gymdesk_core::repository::ClientRepository;
use gymdesk_core::{QuotaLedgerEntry, RepoError, RepoResult, Subscription};
use sqlx::PgPool;
use uuid::Uuid;

pub struct StoreClientRepository {
    pool: PgPool,
}

impl StoreClientRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct SubscriptionRow {
    client_id: Uuid,
    training_days: Vec<i16>,
    active_from: NaiveDate,
    active_until: Option<NaiveDate>,
}

impl TryFrom<SubscriptionRow> for Subscription {
    type Error = RepoError;

    fn try_from(row: SubscriptionRow) -> Result<Self, Self::Error> {
        let training_days = row
            .training_days
            .into_iter()
            .map(u8::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Subscription {
            client_id: row.client_id,
            training_days,
            active_from: row.active_from,
            active_until: row.active_until,
        })
    }
}

#[derive(sqlx::FromRow)]
struct LedgerRow {
    client_id: Uuid,
    year: i32,
    month: i32,
    carried_over: i32,
    adjustment: i32,
}

impl TryFrom<LedgerRow> for QuotaLedgerEntry {
    type Error = RepoError;

    fn try_from(row: LedgerRow) -> Result<Self, Self::Error> {
        Ok(QuotaLedgerEntry {
            client_id: row.client_id,
            year: row.year,
            month: u32::try_from(row.month)?,
            carried_over: row.carried_over,
            adjustment: row.adjustment,
        })
    }
}

#[async_trait]
impl ClientRepository for StoreClientRepository {
    async fn get_subscription(&self, client_id: Uuid) -> RepoResult<Option<Subscription>> {
        let row = sqlx::query_as::<_, SubscriptionRow>(
            "SELECT client_id, training_days, active_from, active_until FROM subscriptions WHERE client_id = $1",
        )
        .bind(client_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Subscription::try_from).transpose()
    }

    async fn save_subscription(&self, subscription: &Subscription) -> RepoResult<()> {
        let days: Vec<i16> = subscription.training_days.iter().map(|d| i16::from(*d)).collect();

        sqlx::query(
            r#"
            INSERT INTO subscriptions (client_id, training_days, active_from, active_until)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (client_id) DO UPDATE
            SET training_days = EXCLUDED.training_days,
                active_from = EXCLUDED.active_from,
                active_until = EXCLUDED.active_until
            "#,
        )
        .bind(subscription.client_id)
        .bind(days)
        .bind(subscription.active_from)
        .bind(subscription.active_until)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_ledger_entries(&self, client_id: Uuid) -> RepoResult<Vec<QuotaLedgerEntry>> {
        let rows = sqlx::query_as::<_, LedgerRow>(
            r#"
            SELECT client_id, year, month, carried_over, adjustment
            FROM session_ledger
            WHERE client_id = $1
            ORDER BY year, month
            "#,
        )
        .bind(client_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(QuotaLedgerEntry::try_from).collect()
    }

    async fn upsert_ledger_entry(&self, entry: &QuotaLedgerEntry) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO session_ledger (client_id, year, month, carried_over, adjustment)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (client_id, year, month) DO UPDATE
            SET carried_over = EXCLUDED.carried_over,
                adjustment = EXCLUDED.adjustment
            "#,
        )
        .bind(entry.client_id)
        .bind(entry.year)
        .bind(i32::try_from(entry.month)?)
        .bind(entry.carried_over)
        .bind(entry.adjustment)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
