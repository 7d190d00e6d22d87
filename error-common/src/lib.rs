//! Shared error taxonomy for the VitalConnect engine.
//!
//! Every engine crate defines its own `thiserror` enum for its own domain
//! (see `auth-identity::IdentityError`, `events-bus::EventBusError`, and so
//! on); this crate only supplies the cross-cutting `ErrorKind` classification
//! used to map any of those domain errors onto the stable surface the
//! engine's error handling design promises: a kind, a stable code, a
//! sanitized message, and whether the failure is worth retrying.
//!
//! `error-common` has no HTTP dependency on purpose. The axum boundary
//! (status codes, `Retry-After`, field-level validation details) lives in
//! `vitalconnect-server`, which maps `EngineError` onto responses.

pub mod codes;
pub mod context;
pub mod reporting;
pub mod types;

pub use codes::ErrorCode;
pub use context::RequestContext;
pub use types::{EngineError, ErrorKind, Result};
