use gymdesk_core::repository::{ClientRepository, ReservationRepository, TemplateRepository, VacationRepository};
use gymdesk_quota::VacationPolicy;
use gymdesk_shared::models::ScheduleEvent;
use gymdesk_store::{
    DbClient, InMemoryStore, StoreClientRepository, StoreReservationRepository, StoreTemplateRepository,
    StoreVacationRepository,
};
use std::sync::Arc;
use tokio::sync::broadcast;

#[derive(Clone)]
pub struct AppState {
    pub templates: Arc<dyn TemplateRepository>,
    pub reservations: Arc<dyn ReservationRepository>,
    pub vacations: Arc<dyn VacationRepository>,
    pub clients: Arc<dyn ClientRepository>,
    pub events_tx: broadcast::Sender<ScheduleEvent>,
    pub vacation_policy: VacationPolicy,
}

impl AppState {
    pub fn in_memory(vacation_policy: VacationPolicy, event_buffer: usize) -> Self {
        let store = Arc::new(InMemoryStore::new());
        let (events_tx, _) = broadcast::channel(event_buffer);

        Self {
            templates: store.clone(),
            reservations: store.clone(),
            vacations: store.clone(),
            clients: store,
            events_tx,
            vacation_policy,
        }
    }

    pub fn postgres(db: &DbClient, vacation_policy: VacationPolicy, event_buffer: usize) -> Self {
        let (events_tx, _) = broadcast::channel(event_buffer);

        Self {
            templates: Arc::new(StoreTemplateRepository::new(db.pool.clone())),
            reservations: Arc::new(StoreReservationRepository::new(db.pool.clone())),
            vacations: Arc::new(StoreVacationRepository::new(db.pool.clone())),
            clients: Arc::new(StoreClientRepository::new(db.pool.clone())),
            events_tx,
            vacation_policy,
        }
    }

    /// Fire-and-forget: nobody listening is not an error.
    pub fn publish(&self, event: ScheduleEvent) {
        let kind = event.kind();
        match self.events_tx.send(event) {
            Ok(receivers) => tracing::debug!("Event {} sent to {} subscriber(s)", kind, receivers),
            Err(_) => tracing::debug!("Event {} dropped, no subscribers", kind),
        }
    }
}
