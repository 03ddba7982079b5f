pub mod events;

pub use events::{ReservationBookedEvent, ScheduleEvent, TemplateAppliedEvent, VacationReviewedEvent};
