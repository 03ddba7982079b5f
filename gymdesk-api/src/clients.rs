use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use gymdesk_core::{QuotaLedgerEntry, Subscription};
use gymdesk_quota::{chain_start, rolling_session_quota, SessionQuotaInfo};
use gymdesk_shared::dates::month_bounds;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct QuotaQuery {
    pub year: i32,
    pub month: u32,
}

#[derive(Debug, Deserialize)]
pub struct QuotaAdjustmentRequest {
    pub adjustment: i32,
    /// Overrides the carried-over sessions. When absent on a new ledger
    /// entry, the value computed from the previous month is frozen.
    pub carried_over: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct SubscriptionRequest {
    pub training_days: Vec<u8>,
    pub active_from: NaiveDate,
    pub active_until: Option<NaiveDate>,
}

/// Quota of (year, month). The carry is rolled forward from the latest ledger
/// entry or the subscription start, whichever is nearer.
async fn compute_quota(state: &AppState, client_id: Uuid, year: i32, month: u32) -> Result<SessionQuotaInfo, AppError> {
    let (_, last) = month_bounds(year, month)?;

    let subscription = state.clients.get_subscription(client_id).await?;
    let ledger = state.clients.list_ledger_entries(client_id).await?;
    let start = chain_start(year, month, subscription.as_ref(), &ledger);
    let (first, _) = month_bounds(start.0, start.1)?;
    let reservations = state.reservations.list_by_client(client_id, first, last).await?;

    Ok(rolling_session_quota(
        client_id,
        start,
        year,
        month,
        subscription.as_ref(),
        &ledger,
        &reservations,
    )?)
}

/// GET /v1/clients/{id}/quota?year=&month=
pub async fn get_quota(
    State(state): State<AppState>,
    Path(client_id): Path<Uuid>,
    Query(query): Query<QuotaQuery>,
) -> Result<Json<SessionQuotaInfo>, AppError> {
    Ok(Json(compute_quota(&state, client_id, query.year, query.month).await?))
}

/// PUT /v1/clients/{id}/quota?year=&month=
pub async fn set_quota_adjustment(
    State(state): State<AppState>,
    Path(client_id): Path<Uuid>,
    Query(query): Query<QuotaQuery>,
    Json(req): Json<QuotaAdjustmentRequest>,
) -> Result<Json<SessionQuotaInfo>, AppError> {
    let current = compute_quota(&state, client_id, query.year, query.month).await?;

    let entry = QuotaLedgerEntry {
        client_id,
        year: query.year,
        month: query.month,
        carried_over: req.carried_over.unwrap_or(current.carried_over),
        adjustment: req.adjustment,
    };
    state.clients.upsert_ledger_entry(&entry).await?;
    tracing::info!(
        "Session ledger {} {}-{:02}: carried {}, adjustment {}",
        client_id,
        entry.year,
        entry.month,
        entry.carried_over,
        entry.adjustment
    );

    Ok(Json(compute_quota(&state, client_id, query.year, query.month).await?))
}

/// PUT /v1/clients/{id}/subscription
pub async fn set_subscription(
    State(state): State<AppState>,
    Path(client_id): Path<Uuid>,
    Json(req): Json<SubscriptionRequest>,
) -> Result<Json<Subscription>, AppError> {
    let subscription = Subscription::new(client_id, req.training_days, req.active_from, req.active_until)?;
    state.clients.save_subscription(&subscription).await?;
    Ok(Json(subscription))
}
