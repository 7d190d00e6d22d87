use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use database_layer::UserRole;

/// Distinguishes an access token from its refresh companion so a validator
/// can reject a refresh token presented where an access token is expected,
/// and vice versa (§4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

/// JWT claim set carried by both the access and refresh token, signed with
/// distinct HMAC-SHA256 secrets per `kind` (§4.6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub role: UserRole,
    pub hospital_id: Option<Uuid>,
    pub tenant_id: Uuid,
    pub is_super_admin: bool,
    pub kind: TokenKind,
    pub iss: String,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
}

/// The pair issued on login and on a successful refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
    pub access_expires_at: DateTime<Utc>,
    pub refresh_expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub tokens: TokenPair,
    pub user_id: Uuid,
    pub tenant_id: Uuid,
    pub role: UserRole,
    pub is_super_admin: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Resolved effective tenant for a request, after applying the super-admin
/// `X-Tenant-Context` override rule (§4.6).
#[derive(Debug, Clone, Copy)]
pub struct EffectiveTenant {
    pub tenant_id: Uuid,
    pub is_override: bool,
}
