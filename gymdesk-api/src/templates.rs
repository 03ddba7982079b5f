use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{NaiveDate, Utc};
use futures_util::future::try_join_all;
use gymdesk_core::{SlotDefinition, WeeklyTemplate};
use gymdesk_schedule::{
    preview_week, ApplicationReport, ApplyOptions, BatchApplier, ConflictCheck, WeekOutcome, WeekPreview,
};
use gymdesk_shared::dates::parse_date_stamp;
use gymdesk_shared::models::{ScheduleEvent, TemplateAppliedEvent};
use gymdesk_shared::weeks_overlapping_month;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateTemplateRequest {
    pub name: String,
    pub reference_week: NaiveDate,
    #[serde(default)]
    pub slots: Vec<SlotDefinition>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTemplateRequest {
    pub name: Option<String>,
    pub reference_week: Option<NaiveDate>,
    pub slots: Option<Vec<SlotDefinition>>,
}

#[derive(Debug, Deserialize)]
pub struct MonthBaseRequest {
    pub enabled: bool,
}

#[derive(Debug, Deserialize)]
pub struct PreviewQuery {
    /// Any date of the target week, `YYYY-MM-DD`.
    pub week: String,
}

#[derive(Debug, Deserialize)]
pub struct MonthQuery {
    pub year: i32,
    pub month: u32,
}

#[derive(Debug, Deserialize)]
pub struct ApplyRequest {
    pub weeks: Vec<NaiveDate>,
    #[serde(default)]
    pub skip_conflicts: bool,
}

#[derive(Debug, Serialize)]
pub struct PreviewSummaryResponse {
    #[serde(rename = "sinConflicto")]
    pub without_conflict: usize,
    #[serde(rename = "conConflicto")]
    pub with_conflict: usize,
}

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    #[serde(rename = "resumen")]
    pub summary: PreviewSummaryResponse,
    #[serde(rename = "semana")]
    pub week: NaiveDate,
    #[serde(rename = "detalle")]
    pub detail: Vec<ConflictCheck>,
}

impl From<WeekPreview> for PreviewResponse {
    fn from(preview: WeekPreview) -> Self {
        Self {
            summary: PreviewSummaryResponse {
                without_conflict: preview.summary.without_conflict,
                with_conflict: preview.summary.with_conflict,
            },
            week: preview.week,
            detail: preview.checks,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WeekErrorResponse {
    #[serde(rename = "semana")]
    pub week: NaiveDate,
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct ApplyResponse {
    #[serde(rename = "reservasCreadas")]
    pub reservations_created: usize,
    #[serde(rename = "conflictosOmitidos")]
    pub conflicts_skipped: usize,
    #[serde(rename = "semanasAplicadas")]
    pub weeks_succeeded: usize,
    #[serde(rename = "errores")]
    pub errors: Vec<WeekErrorResponse>,
    #[serde(rename = "semanas")]
    pub weeks: Vec<WeekOutcome>,
}

impl From<ApplicationReport> for ApplyResponse {
    fn from(report: ApplicationReport) -> Self {
        Self {
            reservations_created: report.reservations_created,
            conflicts_skipped: report.conflicts_skipped,
            weeks_succeeded: report.weeks_succeeded,
            errors: report
                .errors
                .into_iter()
                .map(|e| WeekErrorResponse { week: e.week, error: e.message })
                .collect(),
            weeks: report.weeks,
        }
    }
}

async fn load_template(state: &AppState, id: Uuid) -> Result<WeeklyTemplate, AppError> {
    state
        .templates
        .get_template(id)
        .await?
        .ok_or_else(|| AppError::not_found("template", id))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /v1/templates
pub async fn create_template(
    State(state): State<AppState>,
    Json(req): Json<CreateTemplateRequest>,
) -> Result<(StatusCode, Json<WeeklyTemplate>), AppError> {
    if req.name.trim().is_empty() {
        return Err(AppError::ValidationError("template name is required".to_string()));
    }
    let template = WeeklyTemplate::new(req.name.trim().to_string(), req.reference_week, req.slots);
    state.templates.create_template(&template).await?;

    tracing::info!("Template created: {} ({} slot(s))", template.id, template.slots.len());
    Ok((StatusCode::CREATED, Json(template)))
}

/// GET /v1/templates
pub async fn list_templates(State(state): State<AppState>) -> Result<Json<Vec<WeeklyTemplate>>, AppError> {
    Ok(Json(state.templates.list_templates().await?))
}

/// GET /v1/templates/{id}
pub async fn get_template(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<WeeklyTemplate>, AppError> {
    Ok(Json(load_template(&state, id).await?))
}

/// PUT /v1/templates/{id}
/// Slots are only validated when the template is projected.
pub async fn update_template(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTemplateRequest>,
) -> Result<Json<WeeklyTemplate>, AppError> {
    let mut template = load_template(&state, id).await?;
    template.ensure_not_archived()?;

    if let Some(name) = req.name {
        if name.trim().is_empty() {
            return Err(AppError::ValidationError("template name is required".to_string()));
        }
        template.name = name.trim().to_string();
        template.updated_at = Utc::now();
    }
    if let Some(week) = req.reference_week {
        template.set_reference_week(week);
    }
    if let Some(slots) = req.slots {
        template.replace_slots(slots)?;
    }

    state.templates.update_template(&template).await?;
    Ok(Json(template))
}

/// POST /v1/templates/{id}/activate
pub async fn activate_template(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<WeeklyTemplate>, AppError> {
    let mut template = load_template(&state, id).await?;
    template.activate()?;
    state.templates.update_template(&template).await?;
    Ok(Json(template))
}

/// POST /v1/templates/{id}/archive
pub async fn archive_template(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<WeeklyTemplate>, AppError> {
    let mut template = load_template(&state, id).await?;
    template.archive()?;
    state.templates.update_template(&template).await?;

    tracing::info!("Template archived: {}", id);
    Ok(Json(template))
}

/// POST /v1/templates/{id}/month-base
/// At most one base template per month: enabling it clears the others.
pub async fn set_month_base(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<MonthBaseRequest>,
) -> Result<Json<WeeklyTemplate>, AppError> {
    let mut template = load_template(&state, id).await?;
    template.set_month_base(req.enabled)?;

    if req.enabled {
        let (year, month) = template.reference_month();
        state.templates.clear_month_base(year, month, template.id).await?;
    }
    state.templates.update_template(&template).await?;
    Ok(Json(template))
}

/// GET /v1/templates/{id}/preview?week=YYYY-MM-DD
pub async fn preview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<PreviewQuery>,
) -> Result<Json<PreviewResponse>, AppError> {
    let week = parse_date_stamp(&query.week)?;
    let template = load_template(&state, id).await?;
    let preview = preview_week(&template, week, state.reservations.as_ref()).await?;
    Ok(Json(preview.into()))
}

/// GET /v1/templates/{id}/preview/month?year=&month=
/// Previews are read-only, so the weeks are fetched concurrently.
pub async fn preview_month(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<Vec<PreviewResponse>>, AppError> {
    let weeks: Vec<NaiveDate> = weeks_overlapping_month(query.month, query.year)?.collect();
    let template = load_template(&state, id).await?;

    let previews = try_join_all(
        weeks
            .iter()
            .map(|week| preview_week(&template, *week, state.reservations.as_ref())),
    )
    .await?;

    Ok(Json(previews.into_iter().map(PreviewResponse::from).collect()))
}

/// POST /v1/templates/{id}/apply
/// Always answers 200 once the template itself is usable; per-week failures
/// are reported in `errores`.
pub async fn apply(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ApplyRequest>,
) -> Result<Json<ApplyResponse>, AppError> {
    let template = load_template(&state, id).await?;

    let report = BatchApplier::new(state.reservations.as_ref())
        .apply_to_weeks(&template, &req.weeks, ApplyOptions { skip_conflicts: req.skip_conflicts })
        .await?;

    // Reservations are already written, so the report goes out whatever happens here
    if report.is_success() {
        match state.templates.mark_applied(template.id).await {
            Ok(true) => {}
            Ok(false) => tracing::warn!("Template {} was archived during apply; state left as is", template.id),
            Err(e) => tracing::error!("Failed to mark template {} applied: {}", template.id, e),
        }
    }

    state.publish(ScheduleEvent::TemplateApplied(TemplateAppliedEvent {
        template_id: template.id,
        weeks: report.weeks.iter().map(|w| w.week).collect(),
        reservations_created: report.reservations_created,
        conflicts_skipped: report.conflicts_skipped,
        weeks_failed: report.errors.len(),
        timestamp: Utc::now().timestamp(),
    }));

    Ok(Json(report.into()))
}
