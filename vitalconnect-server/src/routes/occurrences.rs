use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use database_layer::{OccurrenceFilter, OccurrenceHistoryEntry, OccurrenceStatus, OutcomeKind};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::{invalid_input, ApiError};
use crate::state::AppState;
use database_layer::Occurrence;

const DEFAULT_PAGE_SIZE: i64 = 50;
const MAX_PAGE_SIZE: i64 = 200;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    status: Option<OccurrenceStatus>,
    hospital_id: Option<Uuid>,
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
    #[serde(default)]
    page: Option<i64>,
    #[serde(default)]
    page_size: Option<i64>,
}

pub async fn list(
    user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Occurrence>>, ApiError> {
    let ctx = user.tenant_context();

    let page_size = query.page_size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    let page = query.page.unwrap_or(0).max(0);

    let filter = OccurrenceFilter {
        status: query.status,
        hospital_id: query.hospital_id,
        from: query.from,
        to: query.to,
        limit: page_size,
        offset: page * page_size,
    };

    let occurrences = state.occurrences.list(&ctx, &filter).await.map_err(|e| ApiError(e.into()))?;
    Ok(Json(occurrences))
}

pub async fn detail(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Occurrence>, ApiError> {
    let ctx = user.tenant_context();
    let occurrence = state.occurrences.find_by_id(&ctx, id).await.map_err(|e| ApiError(e.into()))?;
    Ok(Json(occurrence))
}

pub async fn history(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<OccurrenceHistoryEntry>>, ApiError> {
    let ctx = user.tenant_context();
    let entries = state.occurrences.history(&ctx, id).await.map_err(|e| ApiError(e.into()))?;
    Ok(Json(entries))
}

#[derive(Debug, Deserialize)]
pub struct TransitionRequest {
    pub new_status: OccurrenceStatus,
    pub outcome: Option<OutcomeKind>,
}

/// Handles both plain status transitions and outcome recording in one
/// endpoint: the fsm validates the `(from, to, outcome)` triple itself, so
/// a transition into `CONCLUIDA` without an `outcome` is rejected by the
/// same check that rejects an invalid `from -> to` pair (§4.2).
pub async fn transition(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<TransitionRequest>,
) -> Result<Json<Occurrence>, ApiError> {
    let ctx = user.tenant_context();

    let current = state.occurrences.find_by_id(&ctx, id).await.map_err(|e| ApiError(e.into()))?;

    if !triage_motor::validate_transition(current.status, request.new_status, request.outcome) {
        return Err(invalid_input(format!(
            "cannot transition occurrence from {:?} to {:?}",
            current.status, request.new_status
        )));
    }

    let updated = state
        .occurrences
        .transition_status(&ctx, id, Some(user.user_id), request.new_status, request.outcome)
        .await
        .map_err(|e| ApiError(e.into()))?;

    Ok(Json(updated))
}
