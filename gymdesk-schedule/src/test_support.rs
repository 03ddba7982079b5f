use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use gymdesk_core::repository::{OverlapError, ReservationRepository};
use gymdesk_core::{RepoResult, Reservation, ReservationStatus, SessionType, SlotDefinition, WeeklyTemplate};
use gymdesk_shared::dates::monday_of;
use std::sync::Mutex;
use uuid::Uuid;

pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

pub fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

/// Slot for trainer #1 on `weekday` from `start`:00 to `end`:00.
pub fn slot(weekday: u8, start: u32, end: u32) -> SlotDefinition {
    SlotDefinition {
        trainer_id: Uuid::from_u128(1),
        weekday,
        start_time: t(start, 0),
        end_time: t(end, 0),
        client_id: Some(Uuid::from_u128(100 + u128::from(weekday))),
        session_type: SessionType::Individual,
    }
}

pub fn template(slots: Vec<SlotDefinition>) -> WeeklyTemplate {
    WeeklyTemplate::new("Test".to_string(), d(2025, 6, 2), slots)
}

#[derive(Default)]
pub struct MemoryReservations {
    rows: Mutex<Vec<Reservation>>,
    fail_week: Option<NaiveDate>,
    blind: bool,
}

impl MemoryReservations {
    pub fn with(rows: Vec<Reservation>) -> Self {
        Self { rows: Mutex::new(rows), ..Self::default() }
    }

    /// Every write for the week of `date` fails.
    pub fn failing_on(date: NaiveDate) -> Self {
        Self { fail_week: Some(monday_of(date)), ..Self::default() }
    }

    /// Trainer listings come back empty, as if every row was written after the read.
    pub fn blind(mut self) -> Self {
        self.blind = true;
        self
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl ReservationRepository for MemoryReservations {
    async fn list_by_trainer(&self, trainer_id: Uuid, from: NaiveDate, to: NaiveDate) -> RepoResult<Vec<Reservation>> {
        if self.blind {
            return Ok(Vec::new());
        }
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .filter(|r| r.trainer_id == trainer_id && r.date >= from && r.date <= to)
            .cloned()
            .collect())
    }

    async fn list_by_client(&self, client_id: Uuid, from: NaiveDate, to: NaiveDate) -> RepoResult<Vec<Reservation>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .filter(|r| r.client_id == Some(client_id) && r.date >= from && r.date <= to)
            .cloned()
            .collect())
    }

    async fn create_reservation(&self, reservation: &Reservation) -> RepoResult<Uuid> {
        if self.fail_week == Some(monday_of(reservation.date)) {
            return Err("connection reset".into());
        }
        let mut rows = self.rows.lock().unwrap();
        if let Some(existing) = rows.iter().find(|r| r.double_books(reservation)) {
            return Err(Box::new(OverlapError { entity: "reservation", existing: Some(existing.id) }));
        }
        rows.push(reservation.clone());
        Ok(reservation.id)
    }

    async fn get_reservation(&self, id: Uuid) -> RepoResult<Option<Reservation>> {
        Ok(self.rows.lock().unwrap().iter().find(|r| r.id == id).cloned())
    }

    async fn update_reservation_status(&self, id: Uuid, status: ReservationStatus) -> RepoResult<()> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows.iter_mut().find(|r| r.id == id).ok_or("not found")?;
        row.status = status;
        Ok(())
    }
}
