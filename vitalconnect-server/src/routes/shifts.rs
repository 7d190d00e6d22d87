use axum::extract::{Path, State};
use axum::Json;
use chrono::{NaiveTime, Utc};
use database_layer::{Shift, UserRole};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

const ADMIN_GESTOR: &[UserRole] = &[UserRole::Admin, UserRole::Gestor];

#[derive(Debug, Deserialize)]
pub struct CreateShiftRequest {
    pub hospital_id: Uuid,
    pub user_id: Uuid,
    pub weekday: i16,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

pub async fn create(
    user: AuthUser,
    State(state): State<AppState>,
    Json(request): Json<CreateShiftRequest>,
) -> Result<Json<Shift>, ApiError> {
    user.require_role(ADMIN_GESTOR)?;
    let ctx = user.tenant_context();

    let shift = state
        .shifts
        .create(&ctx, request.hospital_id, request.user_id, request.weekday, request.start_time, request.end_time)
        .await
        .map_err(|e| ApiError(e.into()))?;

    state.shift_router.invalidate_cache(shift.hospital_id).await.map_err(|e| ApiError(e.into()))?;

    Ok(Json(shift))
}

#[derive(Debug, Deserialize)]
pub struct UpdateShiftRequest {
    pub user_id: Uuid,
    pub weekday: i16,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

pub async fn update(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateShiftRequest>,
) -> Result<Json<Shift>, ApiError> {
    user.require_role(ADMIN_GESTOR)?;
    let ctx = user.tenant_context();

    let shift = state
        .shifts
        .update(&ctx, id, request.user_id, request.weekday, request.start_time, request.end_time)
        .await
        .map_err(|e| ApiError(e.into()))?;

    state.shift_router.invalidate_cache(shift.hospital_id).await.map_err(|e| ApiError(e.into()))?;

    Ok(Json(shift))
}

pub async fn delete(user: AuthUser, State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<(), ApiError> {
    user.require_role(ADMIN_GESTOR)?;
    let ctx = user.tenant_context();

    let shift = state.shifts.delete(&ctx, id).await.map_err(|e| ApiError(e.into()))?;
    state.shift_router.invalidate_cache(shift.hospital_id).await.map_err(|e| ApiError(e.into()))?;

    Ok(())
}

pub async fn mine(user: AuthUser, State(state): State<AppState>) -> Result<Json<Vec<Shift>>, ApiError> {
    let ctx = user.tenant_context();
    let shifts = state.shifts.find_active_by_user(&ctx, user.user_id).await.map_err(|e| ApiError(e.into()))?;
    Ok(Json(shifts))
}

pub async fn today(
    user: AuthUser,
    State(state): State<AppState>,
    Path(hospital_id): Path<Uuid>,
) -> Result<Json<Vec<Shift>>, ApiError> {
    let ctx = user.tenant_context();
    let weekday = chrono::Datelike::weekday(&Utc::now()).num_days_from_sunday() as i16;
    let shifts = state
        .shifts
        .find_active_by_hospital_weekday(&ctx, hospital_id, weekday)
        .await
        .map_err(|e| ApiError(e.into()))?;
    Ok(Json(shifts))
}

pub async fn coverage(
    user: AuthUser,
    State(state): State<AppState>,
    Path(hospital_id): Path<Uuid>,
) -> Result<Json<[shift_routing::WeekdayGaps; 7]>, ApiError> {
    let ctx = user.tenant_context();
    let shifts = state.shifts.find_active_by_hospital(&ctx, hospital_id).await.map_err(|e| ApiError(e.into()))?;
    Ok(Json(shift_routing::weekly_gaps(&shifts)))
}
