pub mod client;
pub mod repository;
pub mod reservation;
pub mod template;
pub mod vacation;

pub use client::{QuotaLedgerEntry, Subscription};
pub use reservation::{Reservation, ReservationStatus, SessionType};
pub use template::{SlotDefinition, TemplateState, WeeklyTemplate};
pub use vacation::{PeriodType, VacationRequest, VacationStatus};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
    #[error("Invalid state transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },
    #[error("Internal service error: {0}")]
    InternalError(String),
}

pub type CoreResult<T> = Result<T, CoreError>;

/// Error type returned by repository adapters.
pub type RepoError = Box<dyn std::error::Error + Send + Sync>;
pub type RepoResult<T> = Result<T, RepoError>;
