use std::net::SocketAddr;

use auth_identity::handlers::IdentityHandlers;
use auth_identity::{LoginRequest, LoginResponse, RefreshRequest, TokenPair};
use axum::extract::{ConnectInfo, State};
use axum::Json;
use database_layer::UserRole;
use serde::Serialize;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

pub async fn login(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let handlers = IdentityHandlers::new(state.auth.clone());
    let response = handlers
        .login(&addr.ip().to_string(), request)
        .await
        .map_err(|e| ApiError(e.into()))?;
    Ok(Json(response))
}

pub async fn refresh(State(state): State<AppState>, Json(request): Json<RefreshRequest>) -> Result<Json<TokenPair>, ApiError> {
    let handlers = IdentityHandlers::new(state.auth.clone());
    let pair = handlers.refresh(request).await.map_err(|e| ApiError(e.into()))?;
    Ok(Json(pair))
}

pub async fn logout(State(state): State<AppState>) -> Result<(), ApiError> {
    let handlers = IdentityHandlers::new(state.auth.clone());
    handlers.logout().map_err(|e| ApiError(e.into()))
}

#[derive(Serialize)]
pub struct MeResponse {
    pub user_id: Uuid,
    pub tenant_id: Uuid,
    pub role: UserRole,
    pub is_super_admin: bool,
}

pub async fn me(user: AuthUser) -> Json<MeResponse> {
    Json(MeResponse {
        user_id: user.user_id,
        tenant_id: user.tenant_id,
        role: user.role,
        is_super_admin: user.is_super_admin,
    })
}
