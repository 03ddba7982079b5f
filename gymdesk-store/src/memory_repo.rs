use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, Utc};
use gymdesk_core::repository::{
    ClientRepository, OverlapError, ReservationRepository, TemplateRepository, VacationFilter, VacationRepository,
};
use gymdesk_core::{
    QuotaLedgerEntry, RepoResult, Reservation, ReservationStatus, Subscription, VacationRequest, WeeklyTemplate,
};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Process-local storage backend, selected with `storage.backend = "memory"`.
///
/// Everything is lost on restart. Each collection sits behind its own lock so
/// that a write to one never waits on readers of another.
#[derive(Default)]
pub struct InMemoryStore {
    templates: RwLock<HashMap<Uuid, WeeklyTemplate>>,
    reservations: RwLock<Vec<Reservation>>,
    vacations: RwLock<Vec<VacationRequest>>,
    subscriptions: RwLock<HashMap<Uuid, Subscription>>,
    ledger: RwLock<HashMap<(Uuid, i32, u32), QuotaLedgerEntry>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn sort_by_slot(rows: &mut [Reservation]) {
    rows.sort_by_key(|r| (r.date, r.start_time));
}

#[async_trait]
impl TemplateRepository for InMemoryStore {
    async fn create_template(&self, template: &WeeklyTemplate) -> RepoResult<Uuid> {
        let mut templates = self.templates.write().await;
        if templates.contains_key(&template.id) {
            return Err(format!("template {} already exists", template.id).into());
        }
        templates.insert(template.id, template.clone());
        Ok(template.id)
    }

    async fn get_template(&self, id: Uuid) -> RepoResult<Option<WeeklyTemplate>> {
        Ok(self.templates.read().await.get(&id).cloned())
    }

    async fn list_templates(&self) -> RepoResult<Vec<WeeklyTemplate>> {
        let mut all: Vec<WeeklyTemplate> = self.templates.read().await.values().cloned().collect();
        all.sort_by(|a, b| {
            b.reference_week_start
                .cmp(&a.reference_week_start)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(all)
    }

    async fn update_template(&self, template: &WeeklyTemplate) -> RepoResult<()> {
        match self.templates.write().await.get_mut(&template.id) {
            Some(stored) => {
                *stored = template.clone();
                Ok(())
            }
            None => Err(format!("template {} not found", template.id).into()),
        }
    }

    async fn mark_applied(&self, id: Uuid) -> RepoResult<bool> {
        match self.templates.write().await.get_mut(&id) {
            Some(template) => Ok(template.mark_applied().is_ok()),
            None => Err(format!("template {id} not found").into()),
        }
    }

    async fn clear_month_base(&self, year: i32, month: u32, keep: Uuid) -> RepoResult<()> {
        let now = Utc::now();
        for template in self.templates.write().await.values_mut() {
            let start = template.reference_week_start;
            if template.id != keep && template.is_month_base && start.year() == year && start.month() == month {
                template.is_month_base = false;
                template.updated_at = now;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ReservationRepository for InMemoryStore {
    async fn list_by_trainer(&self, trainer_id: Uuid, from: NaiveDate, to: NaiveDate) -> RepoResult<Vec<Reservation>> {
        let mut rows: Vec<Reservation> = self
            .reservations
            .read()
            .await
            .iter()
            .filter(|r| r.trainer_id == trainer_id && r.date >= from && r.date <= to)
            .cloned()
            .collect();
        sort_by_slot(&mut rows);
        Ok(rows)
    }

    async fn list_by_client(&self, client_id: Uuid, from: NaiveDate, to: NaiveDate) -> RepoResult<Vec<Reservation>> {
        let mut rows: Vec<Reservation> = self
            .reservations
            .read()
            .await
            .iter()
            .filter(|r| r.client_id == Some(client_id) && r.date >= from && r.date <= to)
            .cloned()
            .collect();
        sort_by_slot(&mut rows);
        Ok(rows)
    }

    async fn create_reservation(&self, reservation: &Reservation) -> RepoResult<Uuid> {
        let mut reservations = self.reservations.write().await;
        if let Some(existing) = reservations.iter().find(|r| r.double_books(reservation)) {
            return Err(Box::new(OverlapError { entity: "reservation", existing: Some(existing.id) }));
        }
        reservations.push(reservation.clone());
        Ok(reservation.id)
    }

    async fn get_reservation(&self, id: Uuid) -> RepoResult<Option<Reservation>> {
        Ok(self.reservations.read().await.iter().find(|r| r.id == id).cloned())
    }

    async fn update_reservation_status(&self, id: Uuid, status: ReservationStatus) -> RepoResult<()> {
        match self.reservations.write().await.iter_mut().find(|r| r.id == id) {
            Some(reservation) => {
                reservation.status = status;
                Ok(())
            }
            None => Err(format!("reservation {id} not found").into()),
        }
    }
}

#[async_trait]
impl VacationRepository for InMemoryStore {
    async fn create_request(&self, request: &VacationRequest) -> RepoResult<Uuid> {
        let mut vacations = self.vacations.write().await;
        if request.status.holds_days() {
            let clash = vacations.iter().find(|r| {
                r.trainer_id == request.trainer_id
                    && r.status.holds_days()
                    && r.overlaps(request.start_date, request.end_date)
            });
            if let Some(existing) = clash {
                return Err(Box::new(OverlapError { entity: "vacation request", existing: Some(existing.id) }));
            }
        }
        vacations.push(request.clone());
        Ok(request.id)
    }

    async fn get_request(&self, id: Uuid) -> RepoResult<Option<VacationRequest>> {
        Ok(self.vacations.read().await.iter().find(|r| r.id == id).cloned())
    }

    async fn list_requests(&self, filter: &VacationFilter) -> RepoResult<Vec<VacationRequest>> {
        let mut rows: Vec<VacationRequest> = self
            .vacations
            .read()
            .await
            .iter()
            .filter(|r| filter.trainer_id.map_or(true, |t| r.trainer_id == t))
            .filter(|r| filter.status.map_or(true, |s| r.status == s))
            .filter(|r| filter.year.map_or(true, |y| r.start_date.year() <= y && r.end_date.year() >= y))
            .cloned()
            .collect();
        rows.sort_by_key(|r| (r.start_date, r.created_at));
        Ok(rows)
    }

    async fn update_request(&self, request: &VacationRequest) -> RepoResult<()> {
        match self.vacations.write().await.iter_mut().find(|r| r.id == request.id) {
            Some(stored) => {
                *stored = request.clone();
                Ok(())
            }
            None => Err(format!("vacation request {} not found", request.id).into()),
        }
    }
}

#[async_trait]
impl ClientRepository for InMemoryStore {
    async fn get_subscription(&self, client_id: Uuid) -> RepoResult<Option<Subscription>> {
        Ok(self.subscriptions.read().await.get(&client_id).cloned())
    }

    async fn save_subscription(&self, subscription: &Subscription) -> RepoResult<()> {
        self.subscriptions
            .write()
            .await
            .insert(subscription.client_id, subscription.clone());
        Ok(())
    }

    async fn list_ledger_entries(&self, client_id: Uuid) -> RepoResult<Vec<QuotaLedgerEntry>> {
        let mut entries: Vec<QuotaLedgerEntry> = self
            .ledger
            .read()
            .await
            .values()
            .filter(|entry| entry.client_id == client_id)
            .cloned()
            .collect();
        entries.sort_by_key(|entry| (entry.year, entry.month));
        Ok(entries)
    }

    async fn upsert_ledger_entry(&self, entry: &QuotaLedgerEntry) -> RepoResult<()> {
        self.ledger
            .write()
            .await
            .insert((entry.client_id, entry.year, entry.month), entry.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use gymdesk_core::{PeriodType, SessionType, TemplateState, VacationStatus};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn reservation(trainer: Uuid, date: NaiveDate, hour: u32) -> Reservation {
        Reservation::new(
            trainer,
            Some(Uuid::from_u128(7)),
            date,
            NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(hour + 1, 0, 0).unwrap(),
            SessionType::Individual,
        )
        .unwrap()
    }

    fn vacation(trainer: Uuid, start: NaiveDate, end: NaiveDate, status: VacationStatus) -> VacationRequest {
        VacationRequest {
            id: Uuid::new_v4(),
            trainer_id: trainer,
            start_date: start,
            end_date: end,
            working_days: 5,
            summer_days: 0,
            period_type: PeriodType::RestOfYear,
            status,
            notes: None,
            rejection_reason: None,
            reviewed_by: None,
            reviewed_at: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_trainer_range_is_inclusive_and_ordered() {
        let store = InMemoryStore::new();
        let trainer = Uuid::from_u128(1);
        store.create_reservation(&reservation(trainer, d(2025, 6, 4), 9)).await.unwrap();
        store.create_reservation(&reservation(trainer, d(2025, 6, 2), 11)).await.unwrap();
        store.create_reservation(&reservation(trainer, d(2025, 6, 2), 8)).await.unwrap();
        store.create_reservation(&reservation(trainer, d(2025, 6, 9), 8)).await.unwrap();
        store.create_reservation(&reservation(Uuid::from_u128(2), d(2025, 6, 3), 8)).await.unwrap();

        let week = store.list_by_trainer(trainer, d(2025, 6, 2), d(2025, 6, 8)).await.unwrap();
        let keys: Vec<_> = week.iter().map(|r| (r.date, r.start_time)).collect();
        assert_eq!(week.len(), 3);
        assert!(keys.windows(2).all(|w| w[0] <= w[1]));

        let by_client = store.list_by_client(Uuid::from_u128(7), d(2025, 6, 1), d(2025, 6, 30)).await.unwrap();
        assert_eq!(by_client.len(), 5);
    }

    #[tokio::test]
    async fn test_concurrent_writes_of_one_slot_keep_one() {
        let store = InMemoryStore::new();
        let trainer = Uuid::from_u128(1);
        let a = reservation(trainer, d(2025, 6, 2), 9);
        let b = reservation(trainer, d(2025, 6, 2), 9);

        let (ra, rb) = tokio::join!(store.create_reservation(&a), store.create_reservation(&b));
        assert!(ra.is_ok() != rb.is_ok());
        let err = ra.err().or(rb.err()).unwrap();
        let overlap = OverlapError::find(&err).expect("overlap error");
        assert_eq!(overlap.existing, Some(a.id));
        assert_eq!(store.list_by_trainer(trainer, d(2025, 6, 2), d(2025, 6, 2)).await.unwrap().len(), 1);

        // cancelling frees the slot
        store.update_reservation_status(a.id, ReservationStatus::CancelledByCenter).await.unwrap();
        store.create_reservation(&b).await.unwrap();
    }

    #[tokio::test]
    async fn test_overlapping_vacations_are_refused() {
        let store = InMemoryStore::new();
        let trainer = Uuid::from_u128(1);
        let first = vacation(trainer, d(2025, 6, 2), d(2025, 6, 6), VacationStatus::Pending);
        store.create_request(&first).await.unwrap();

        let err = store
            .create_request(&vacation(trainer, d(2025, 6, 6), d(2025, 6, 10), VacationStatus::Pending))
            .await
            .unwrap_err();
        assert_eq!(OverlapError::find(&err).unwrap().existing, Some(first.id));

        store
            .create_request(&vacation(Uuid::from_u128(2), d(2025, 6, 2), d(2025, 6, 6), VacationStatus::Pending))
            .await
            .unwrap();
        store
            .create_request(&vacation(trainer, d(2025, 6, 9), d(2025, 6, 13), VacationStatus::Pending))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_status_update_of_unknown_reservation_fails() {
        let store = InMemoryStore::new();
        assert!(store
            .update_reservation_status(Uuid::new_v4(), ReservationStatus::Confirmed)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_clear_month_base_keeps_one_per_month() {
        let store = InMemoryStore::new();
        let mut june_a = WeeklyTemplate::new("A".into(), d(2025, 6, 2), Vec::new());
        june_a.set_month_base(true).unwrap();
        let mut june_b = WeeklyTemplate::new("B".into(), d(2025, 6, 16), Vec::new());
        june_b.set_month_base(true).unwrap();
        let mut july = WeeklyTemplate::new("C".into(), d(2025, 7, 7), Vec::new());
        july.set_month_base(true).unwrap();
        for t in [&june_a, &june_b, &july] {
            store.create_template(t).await.unwrap();
        }

        store.clear_month_base(2025, 6, june_b.id).await.unwrap();

        assert!(!store.get_template(june_a.id).await.unwrap().unwrap().is_month_base);
        assert!(store.get_template(june_b.id).await.unwrap().unwrap().is_month_base);
        assert!(store.get_template(july.id).await.unwrap().unwrap().is_month_base);
    }

    #[tokio::test]
    async fn test_mark_applied_leaves_archived_template() {
        let store = InMemoryStore::new();
        let live = WeeklyTemplate::new("Live".into(), d(2025, 6, 2), Vec::new());
        let mut gone = WeeklyTemplate::new("Gone".into(), d(2025, 6, 2), Vec::new());
        store.create_template(&live).await.unwrap();
        store.create_template(&gone).await.unwrap();
        gone.archive().unwrap();
        store.update_template(&gone).await.unwrap();

        assert!(store.mark_applied(live.id).await.unwrap());
        assert!(!store.mark_applied(gone.id).await.unwrap());
        assert!(store.mark_applied(Uuid::new_v4()).await.is_err());

        assert_eq!(store.get_template(live.id).await.unwrap().unwrap().state, TemplateState::Applied);
        assert_eq!(store.get_template(gone.id).await.unwrap().unwrap().state, TemplateState::Archived);
    }

    #[tokio::test]
    async fn test_vacation_filters() {
        let store = InMemoryStore::new();
        let trainer = Uuid::from_u128(1);
        store
            .create_request(&vacation(trainer, d(2024, 12, 30), d(2025, 1, 3), VacationStatus::Approved))
            .await
            .unwrap();
        store
            .create_request(&vacation(trainer, d(2025, 6, 2), d(2025, 6, 6), VacationStatus::Pending))
            .await
            .unwrap();
        store
            .create_request(&vacation(Uuid::from_u128(2), d(2025, 6, 2), d(2025, 6, 6), VacationStatus::Pending))
            .await
            .unwrap();

        let filter = VacationFilter { trainer_id: Some(trainer), year: Some(2025), ..Default::default() };
        assert_eq!(store.list_requests(&filter).await.unwrap().len(), 2);

        let filter = VacationFilter { year: Some(2024), ..Default::default() };
        assert_eq!(store.list_requests(&filter).await.unwrap().len(), 1);

        let filter = VacationFilter { status: Some(VacationStatus::Pending), ..Default::default() };
        assert_eq!(store.list_requests(&filter).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_ledger_upsert_overwrites() {
        let store = InMemoryStore::new();
        let client = Uuid::from_u128(9);
        let mut entry = QuotaLedgerEntry { client_id: client, year: 2025, month: 3, carried_over: 2, adjustment: 0 };
        store.upsert_ledger_entry(&entry).await.unwrap();
        entry.adjustment = -1;
        store.upsert_ledger_entry(&entry).await.unwrap();

        let earlier = QuotaLedgerEntry { client_id: client, year: 2024, month: 11, carried_over: 0, adjustment: 3 };
        store.upsert_ledger_entry(&earlier).await.unwrap();
        let other = QuotaLedgerEntry { client_id: Uuid::from_u128(10), ..earlier.clone() };
        store.upsert_ledger_entry(&other).await.unwrap();

        assert_eq!(store.list_ledger_entries(client).await.unwrap(), vec![earlier, entry]);
    }
}
