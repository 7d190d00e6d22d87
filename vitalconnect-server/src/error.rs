use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use error_common::{EngineError, ErrorCode, ErrorKind};
use serde::Serialize;

/// Maps an [`EngineError`] onto an HTTP response per the error handling
/// design (§7): `kind` decides the status code, `code` and `message` travel
/// through unchanged so clients can match on the stable string.
pub struct ApiError(pub EngineError);

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        Self(err)
    }
}

#[derive(Serialize)]
struct ErrorBody {
    code: String,
    message: String,
    error_id: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status = match err.kind {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::Authentication => match err.code {
                ErrorCode::AuthRequired => StatusCode::UNAUTHORIZED,
                _ => StatusCode::UNAUTHORIZED,
            },
            ErrorKind::Authorization => StatusCode::FORBIDDEN,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ErrorKind::Transient => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::Fatal => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let retry_after_secs = matches!(err.code, ErrorCode::RateLimited).then(|| retry_after_from(&err.message)).flatten();

        let body = ErrorBody {
            code: err.code.to_string(),
            message: err.message,
            error_id: err.error_id.to_string(),
        };

        let mut response = (status, Json(body)).into_response();
        if let Some(secs) = retry_after_secs {
            if let Ok(value) = HeaderValue::from_str(&secs.to_string()) {
                response.headers_mut().insert("Retry-After", value);
            }
        }
        response
    }
}

/// Pulls the seconds count back out of `IdentityError::RateLimited`'s
/// display message ("rate limited, retry after {n}s"), since the `Retry-After`
/// header (§6) needs it as a number, not prose.
fn retry_after_from(message: &str) -> Option<u64> {
    message.rsplit("after ").next()?.trim_end_matches('s').parse().ok()
}

/// Raised directly by handlers for request-shape problems that never reach
/// a domain crate (missing field, malformed path param) rather than
/// threaded through `EngineError`'s database/kv variants.
pub fn missing_field(field: &str) -> ApiError {
    ApiError(EngineError::new(
        ErrorKind::Validation,
        ErrorCode::MissingRequiredField,
        format!("missing required field: {field}"),
    ))
}

pub fn invalid_input(message: impl Into<String>) -> ApiError {
    ApiError(EngineError::new(ErrorKind::Validation, ErrorCode::InvalidInput, message))
}

pub fn auth_required() -> ApiError {
    ApiError(EngineError::new(ErrorKind::Authentication, ErrorCode::AuthRequired, "authentication required"))
}

pub fn role_mismatch() -> ApiError {
    ApiError(EngineError::new(ErrorKind::Authorization, ErrorCode::RoleMismatch, "role does not permit this action"))
}

/// PEP ingest's API key didn't match the static table (§6). Authentication
/// rather than authorization: there's no identity to be forbidden, just a
/// missing or wrong key.
pub fn invalid_api_key() -> ApiError {
    ApiError(EngineError::new(ErrorKind::Authentication, ErrorCode::InvalidCredentials, "invalid or missing API key"))
}
