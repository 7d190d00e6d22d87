use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable string error codes surfaced to API clients, matching the engine's
/// error handling design table (§7): `TOKEN_EXPIRED`, `TENANT_CONTEXT_DENIED`,
/// and friends are contract, not presentation — callers may match on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    InvalidInput,
    MissingRequiredField,
    AuthRequired,
    InvalidToken,
    TokenExpired,
    InvalidCredentials,
    AccountDisabled,
    SuperAdminRequired,
    TenantRequired,
    TenantContextDenied,
    RoleMismatch,
    NotFound,
    Conflict,
    RateLimited,
    TransientInfra,
    Internal,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::InvalidInput => "INVALID_INPUT",
            ErrorCode::MissingRequiredField => "MISSING_REQUIRED_FIELD",
            ErrorCode::AuthRequired => "AUTH_REQUIRED",
            ErrorCode::InvalidToken => "INVALID_TOKEN",
            ErrorCode::TokenExpired => "TOKEN_EXPIRED",
            ErrorCode::InvalidCredentials => "INVALID_CREDENTIALS",
            ErrorCode::AccountDisabled => "ACCOUNT_DISABLED",
            ErrorCode::SuperAdminRequired => "SUPER_ADMIN_REQUIRED",
            ErrorCode::TenantRequired => "TENANT_REQUIRED",
            ErrorCode::TenantContextDenied => "TENANT_CONTEXT_DENIED",
            ErrorCode::RoleMismatch => "ROLE_MISMATCH",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::Conflict => "CONFLICT",
            ErrorCode::RateLimited => "RATE_LIMITED",
            ErrorCode::TransientInfra => "TRANSIENT_INFRA",
            ErrorCode::Internal => "INTERNAL",
        };
        write!(f, "{s}")
    }
}
