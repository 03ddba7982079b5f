use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use gymdesk_core::repository::OverlapError;
use gymdesk_core::{CoreError, RepoError};
use gymdesk_quota::VacationError;
use gymdesk_schedule::ScheduleError;
use gymdesk_shared::DateError;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    ValidationError(String),
    #[error("{0}")]
    NotFoundError(String),
    #[error("{0}")]
    ConflictError(String),
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl AppError {
    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        AppError::NotFoundError(format!("{entity} not found: {id}"))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::ConflictError(msg) => (StatusCode::CONFLICT, msg),
            AppError::Anyhow(err) => {
                tracing::error!("Internal Server Error: {:#}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ValidationError(_) => AppError::ValidationError(err.to_string()),
            CoreError::NotFound { .. } => AppError::NotFoundError(err.to_string()),
            CoreError::InvalidTransition { .. } => AppError::ConflictError(err.to_string()),
            CoreError::InternalError(msg) => AppError::Anyhow(anyhow::anyhow!(msg)),
        }
    }
}

impl From<ScheduleError> for AppError {
    fn from(err: ScheduleError) -> Self {
        match err {
            ScheduleError::InvalidTemplate { .. }
            | ScheduleError::EmptyTemplate(_)
            | ScheduleError::TemplateArchived(_)
            | ScheduleError::NoWeeks => AppError::ValidationError(err.to_string()),
            ScheduleError::Conflict { .. } => AppError::ConflictError(err.to_string()),
            ScheduleError::Persistence(_) => AppError::Anyhow(anyhow::Error::new(err)),
            ScheduleError::Core(core) => core.into(),
        }
    }
}

impl From<VacationError> for AppError {
    fn from(err: VacationError) -> Self {
        match err {
            VacationError::InvalidRange { .. } => AppError::ValidationError(err.to_string()),
            VacationError::Overlapping(_) => AppError::ConflictError(err.to_string()),
            VacationError::Core(core) => core.into(),
        }
    }
}

impl From<DateError> for AppError {
    fn from(err: DateError) -> Self {
        AppError::ValidationError(err.to_string())
    }
}

/// Repository adapters fail with boxed errors. Only an overlap refused by
/// the store reaches the client; everything else is internal.
impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        if let Some(overlap) = OverlapError::find(&err) {
            return AppError::ConflictError(overlap.to_string());
        }
        AppError::Anyhow(anyhow::anyhow!(err))
    }
}
