use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::client::{QuotaLedgerEntry, Subscription};
use crate::reservation::{Reservation, ReservationStatus};
use crate::template::WeeklyTemplate;
use crate::vacation::{VacationRequest, VacationStatus};
use crate::{RepoError, RepoResult};

/// Returned by a store when a write would overlap a row it already holds:
/// a second booking of a trainer's time or a second vacation over the same days.
#[derive(Debug, thiserror::Error)]
#[error("{entity} overlaps an existing one")]
pub struct OverlapError {
    pub entity: &'static str,
    /// The row in the way, when the store can tell.
    pub existing: Option<Uuid>,
}

impl OverlapError {
    pub fn find(err: &RepoError) -> Option<&OverlapError> {
        err.downcast_ref::<OverlapError>()
    }
}

/// Repository trait for weekly templates
#[async_trait]
pub trait TemplateRepository: Send + Sync {
    async fn create_template(&self, template: &WeeklyTemplate) -> RepoResult<Uuid>;

    async fn get_template(&self, id: Uuid) -> RepoResult<Option<WeeklyTemplate>>;

    async fn list_templates(&self) -> RepoResult<Vec<WeeklyTemplate>>;

    async fn update_template(&self, template: &WeeklyTemplate) -> RepoResult<()>;

    /// Moves the template to `applied` without touching anything else.
    /// An archived template is left alone and `false` is returned.
    async fn mark_applied(&self, id: Uuid) -> RepoResult<bool>;

    /// Clears the month-base flag on every template of (year, month) except `keep`.
    async fn clear_month_base(&self, year: i32, month: u32, keep: Uuid) -> RepoResult<()>;
}

/// Repository trait for calendar reservations
#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// Reservations of a trainer with `from <= date <= to`, ordered by date and start time.
    async fn list_by_trainer(
        &self,
        trainer_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> RepoResult<Vec<Reservation>>;

    async fn list_by_client(
        &self,
        client_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> RepoResult<Vec<Reservation>>;

    /// Fails with [`OverlapError`] when the trainer already holds an overlapping live reservation.
    async fn create_reservation(&self, reservation: &Reservation) -> RepoResult<Uuid>;

    async fn get_reservation(&self, id: Uuid) -> RepoResult<Option<Reservation>>;

    async fn update_reservation_status(&self, id: Uuid, status: ReservationStatus) -> RepoResult<()>;
}

#[derive(Debug, Clone, Default)]
pub struct VacationFilter {
    pub trainer_id: Option<Uuid>,
    pub status: Option<VacationStatus>,
    /// Requests intersecting this calendar year.
    pub year: Option<i32>,
}

/// Repository trait for vacation requests
#[async_trait]
pub trait VacationRepository: Send + Sync {
    /// Fails with [`OverlapError`] when a pending or approved request of the trainer shares a day.
    async fn create_request(&self, request: &VacationRequest) -> RepoResult<Uuid>;

    async fn get_request(&self, id: Uuid) -> RepoResult<Option<VacationRequest>>;

    async fn list_requests(&self, filter: &VacationFilter) -> RepoResult<Vec<VacationRequest>>;

    async fn update_request(&self, request: &VacationRequest) -> RepoResult<()>;
}

/// Repository trait for client subscriptions and session ledger
#[async_trait]
pub trait ClientRepository: Send + Sync {
    async fn get_subscription(&self, client_id: Uuid) -> RepoResult<Option<Subscription>>;

    async fn save_subscription(&self, subscription: &Subscription) -> RepoResult<()>;

    /// Every ledger entry of a client, oldest month first.
    async fn list_ledger_entries(&self, client_id: Uuid) -> RepoResult<Vec<QuotaLedgerEntry>>;

    async fn upsert_ledger_entry(&self, entry: &QuotaLedgerEntry) -> RepoResult<()>;
}
