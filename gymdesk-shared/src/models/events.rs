use chrono::NaiveDate;
use uuid::Uuid;

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct TemplateAppliedEvent {
    pub template_id: Uuid,
    pub weeks: Vec<NaiveDate>,
    pub reservations_created: usize,
    pub conflicts_skipped: usize,
    pub weeks_failed: usize,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct ReservationBookedEvent {
    pub reservation_id: Uuid,
    pub trainer_id: Uuid,
    pub client_id: Option<Uuid>,
    pub date: NaiveDate,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct VacationReviewedEvent {
    pub request_id: Uuid,
    pub trainer_id: Uuid,
    pub status: String,
    pub reviewed_by: Option<Uuid>,
    pub timestamp: i64,
}

/// Everything pushed to the live event stream.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScheduleEvent {
    TemplateApplied(TemplateAppliedEvent),
    ReservationBooked(ReservationBookedEvent),
    VacationReviewed(VacationReviewedEvent),
}

impl ScheduleEvent {
    /// SSE event name.
    pub fn kind(&self) -> &'static str {
        match self {
            ScheduleEvent::TemplateApplied(_) => "template_applied",
            ScheduleEvent::ReservationBooked(_) => "reservation_booked",
            ScheduleEvent::VacationReviewed(_) => "vacation_reviewed",
        }
    }
}
