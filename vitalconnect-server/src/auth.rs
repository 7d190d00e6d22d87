use async_trait::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum::http::header;
use database_layer::{TenantContext, UserRole};
use uuid::Uuid;

use crate::error::{auth_required, ApiError};
use crate::state::AppState;

/// The authenticated caller, resolved from the `Authorization: Bearer`
/// header and the `X-Tenant-Context` super-admin override (§4.6). Extracted
/// once per request; handlers build a [`TenantContext`] from it rather than
/// re-parsing the header themselves.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub tenant_id: Uuid,
    pub role: UserRole,
    pub is_super_admin: bool,
}

impl AuthUser {
    pub fn tenant_context(&self) -> TenantContext {
        TenantContext::new(self.tenant_id, self.user_id, self.role, self.is_super_admin)
    }

    pub fn require_role(&self, allowed: &[UserRole]) -> Result<(), ApiError> {
        if self.is_super_admin || allowed.contains(&self.role) {
            return Ok(());
        }
        Err(crate::error::role_mismatch())
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let token = bearer_token(parts).ok_or_else(auth_required)?;
        let claims = app_state.auth.validate_access_token(&token).map_err(|e| ApiError(e.into()))?;

        let tenant_header = parts
            .headers
            .get("X-Tenant-Context")
            .and_then(|v| v.to_str().ok());
        let effective = app_state
            .auth
            .resolve_tenant_context(&claims, tenant_header)
            .await
            .map_err(|e| ApiError(e.into()))?;

        Ok(AuthUser {
            user_id: claims.sub,
            tenant_id: effective.tenant_id,
            role: claims.role,
            is_super_admin: claims.is_super_admin,
        })
    }
}

/// Extracts the bearer token from `Authorization`, or (for the SSE endpoint
/// only, which can't set a header from an `EventSource`) a `token` query
/// parameter (§6: "accepts either Authorization header or a short-lived
/// query-param token").
fn bearer_token(parts: &Parts) -> Option<String> {
    if let Some(value) = parts.headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        if let Some(token) = value.strip_prefix("Bearer ") {
            return Some(token.to_string());
        }
    }

    parts.uri.query().and_then(|query| {
        query
            .split('&')
            .find_map(|pair| pair.strip_prefix("token=").map(ToString::to_string))
    })
}
