use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use gymdesk_core::repository::VacationFilter;
use gymdesk_core::{PeriodType, VacationRequest, VacationStatus};
use gymdesk_quota::{
    check_balance, compute_working_days, open_request, working_days_in_year, BalanceCheck, VacationUsage, WorkingDays,
};
use gymdesk_shared::models::{ScheduleEvent, VacationReviewedEvent};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateVacationRequest {
    pub trainer_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct ListVacationsQuery {
    pub trainer_id: Option<Uuid>,
    pub status: Option<VacationStatus>,
    pub year: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub reviewer_id: Uuid,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct BalanceQuery {
    pub year: Option<i32>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct VacationResponse {
    pub id: Uuid,
    pub trainer_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(rename = "diasLaborables")]
    pub working_days: u32,
    #[serde(rename = "diasVerano")]
    pub summer_days: u32,
    #[serde(rename = "tipoPeriodo")]
    pub period_type: PeriodType,
    pub status: VacationStatus,
    pub notes: Option<String>,
    pub rejection_reason: Option<String>,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    /// Only filled in on creation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<BalanceCheck>,
}

impl From<VacationRequest> for VacationResponse {
    fn from(r: VacationRequest) -> Self {
        Self {
            id: r.id,
            trainer_id: r.trainer_id,
            start_date: r.start_date,
            end_date: r.end_date,
            working_days: r.working_days,
            summer_days: r.summer_days,
            period_type: r.period_type,
            status: r.status,
            notes: r.notes,
            rejection_reason: r.rejection_reason,
            reviewed_by: r.reviewed_by,
            reviewed_at: r.reviewed_at,
            created_at: r.created_at,
            balance: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WorkingDaysResponse {
    #[serde(rename = "diasLaborables")]
    pub working_days: u32,
    #[serde(rename = "diasVerano")]
    pub summer_days: u32,
    #[serde(rename = "tipoPeriodo")]
    pub period_type: PeriodType,
}

impl From<WorkingDays> for WorkingDaysResponse {
    fn from(days: WorkingDays) -> Self {
        Self {
            working_days: days.working_days,
            summer_days: days.summer_days,
            period_type: days.period_type,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub trainer_id: Uuid,
    pub year: i32,
    pub usage: VacationUsage,
    pub check: BalanceCheck,
}

async fn load_request(state: &AppState, id: Uuid) -> Result<VacationRequest, AppError> {
    state
        .vacations
        .get_request(id)
        .await?
        .ok_or_else(|| AppError::not_found("vacation request", id))
}

/// Pending and approved days of `trainer_id` in `year`.
async fn year_usage(state: &AppState, trainer_id: Uuid, year: i32) -> Result<VacationUsage, AppError> {
    let filter = VacationFilter {
        trainer_id: Some(trainer_id),
        year: Some(year),
        ..Default::default()
    };
    let requests = state.vacations.list_requests(&filter).await?;
    Ok(VacationUsage::in_year(&requests, year))
}

async fn store_review(state: &AppState, request: VacationRequest) -> Result<Json<VacationResponse>, AppError> {
    state.vacations.update_request(&request).await?;
    tracing::info!("Vacation request {} is now {}", request.id, request.status);

    state.publish(ScheduleEvent::VacationReviewed(VacationReviewedEvent {
        request_id: request.id,
        trainer_id: request.trainer_id,
        status: request.status.to_string(),
        reviewed_by: request.reviewed_by,
        timestamp: Utc::now().timestamp(),
    }));

    Ok(Json(request.into()))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /v1/vacations
/// The balance check is advisory: a request over the policy is still stored.
pub async fn create_vacation(
    State(state): State<AppState>,
    Json(req): Json<CreateVacationRequest>,
) -> Result<(StatusCode, Json<VacationResponse>), AppError> {
    let existing = state
        .vacations
        .list_requests(&VacationFilter {
            trainer_id: Some(req.trainer_id),
            ..Default::default()
        })
        .await?;

    let request = open_request(req.trainer_id, req.start_date, req.end_date, req.notes, &existing)?;

    // Checked against the year it starts in
    let year = request.start_date.year();
    let usage = year_usage(&state, request.trainer_id, year).await?;
    let days = working_days_in_year(request.start_date, request.end_date, year).unwrap_or(WorkingDays {
        working_days: request.working_days,
        summer_days: request.summer_days,
        period_type: request.period_type,
    });
    let balance = check_balance(&state.vacation_policy, &usage, &days);
    if !balance.within_policy() {
        tracing::warn!("Vacation for {} breaks policy: {:?}", request.trainer_id, balance.warnings);
    }

    state.vacations.create_request(&request).await?;

    let mut response = VacationResponse::from(request);
    response.balance = Some(balance);
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /v1/vacations?trainer_id=&status=&year=
pub async fn list_vacations(
    State(state): State<AppState>,
    Query(query): Query<ListVacationsQuery>,
) -> Result<Json<Vec<VacationResponse>>, AppError> {
    let filter = VacationFilter {
        trainer_id: query.trainer_id,
        status: query.status,
        year: query.year,
    };
    let requests = state.vacations.list_requests(&filter).await?;
    Ok(Json(requests.into_iter().map(VacationResponse::from).collect()))
}

/// GET /v1/vacations/{id}
pub async fn get_vacation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<VacationResponse>, AppError> {
    Ok(Json(load_request(&state, id).await?.into()))
}

/// POST /v1/vacations/{id}/approve
pub async fn approve_vacation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ReviewRequest>,
) -> Result<Json<VacationResponse>, AppError> {
    let mut request = load_request(&state, id).await?;
    request.approve(req.reviewer_id, Utc::now())?;
    store_review(&state, request).await
}

/// POST /v1/vacations/{id}/reject
pub async fn reject_vacation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ReviewRequest>,
) -> Result<Json<VacationResponse>, AppError> {
    let mut request = load_request(&state, id).await?;
    request.reject(req.reviewer_id, req.reason.as_deref().unwrap_or_default(), Utc::now())?;
    store_review(&state, request).await
}

/// POST /v1/vacations/{id}/cancel
pub async fn cancel_vacation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<VacationResponse>, AppError> {
    let mut request = load_request(&state, id).await?;
    request.cancel()?;
    store_review(&state, request).await
}

/// GET /v1/vacations/calculate?start=&end=
/// Answers `null` when the range ends before it starts.
pub async fn calculate(Query(query): Query<RangeQuery>) -> Json<Option<WorkingDaysResponse>> {
    Json(compute_working_days(query.start, query.end).map(WorkingDaysResponse::from))
}

/// GET /v1/trainers/{id}/vacation-balance?year=&start=&end=
/// Without a range, reports the balance of what is already requested.
pub async fn trainer_balance(
    State(state): State<AppState>,
    Path(trainer_id): Path<Uuid>,
    Query(query): Query<BalanceQuery>,
) -> Result<Json<BalanceResponse>, AppError> {
    let range = match (query.start, query.end) {
        (Some(start), Some(end)) if end < start => {
            return Err(AppError::ValidationError(format!("range ends ({end}) before it starts ({start})")));
        }
        (Some(start), Some(end)) => Some((start, end)),
        (None, None) => None,
        _ => return Err(AppError::ValidationError("start and end go together".to_string())),
    };
    let year = query
        .year
        .or(query.start.map(|s| s.year()))
        .unwrap_or_else(|| Utc::now().year());

    // Only the part of the range inside `year` counts
    let candidate = range
        .and_then(|(start, end)| working_days_in_year(start, end, year))
        .unwrap_or(WorkingDays {
            working_days: 0,
            summer_days: 0,
            period_type: PeriodType::RestOfYear,
        });

    let usage = year_usage(&state, trainer_id, year).await?;
    let check = check_balance(&state.vacation_policy, &usage, &candidate);

    Ok(Json(BalanceResponse {
        trainer_id,
        year,
        usage,
        check,
    }))
}
